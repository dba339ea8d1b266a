use serde::Serialize;

use crate::api::PostSource;
use crate::error::FollowerError;
use crate::models::{Post, Stance};

const LONG_TOKEN: &str = "long";
const SHORT_TOKEN: &str = "short";

/// Why a keyword-matching post did not resolve cleanly
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Ambiguity {
    /// Neither token present; resolves to `Unknown`
    NoDirection,
    /// Both tokens present; resolves to `Long`
    BothDirections,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentReading {
    pub stance: Stance,
    /// Most recent post mentioning the keyword, if any
    pub matched_post: Option<Post>,
    pub ambiguity: Option<Ambiguity>,
    /// Set when the timeline could not be fetched
    pub source_error: Option<FollowerError>,
}

impl SentimentReading {
    fn unavailable(err: FollowerError) -> Self {
        Self {
            stance: Stance::Unknown,
            matched_post: None,
            ambiguity: None,
            source_error: Some(err),
        }
    }
}

/// Infers a stance from the latest post that mentions a market keyword
#[derive(Debug, Clone)]
pub struct SentimentExtractor {
    keyword: String,
}

impl SentimentExtractor {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Classify `posts` (most recent first). Only the first post containing the
    /// keyword is inspected; older mentions are ignored.
    pub fn extract(&self, posts: &[Post]) -> SentimentReading {
        let Some(post) = posts.iter().find(|p| p.text.contains(&self.keyword)) else {
            tracing::info!(keyword = %self.keyword, scanned = posts.len(), "No post mentions keyword");
            return SentimentReading {
                stance: Stance::Unknown,
                matched_post: None,
                ambiguity: None,
                source_error: None,
            };
        };

        let (stance, ambiguity) = classify_text(&post.text);
        if let Some(ambiguity) = ambiguity {
            tracing::warn!(
                keyword = %self.keyword,
                post_id = %post.id,
                ?ambiguity,
                resolved = %stance,
                "Ambiguous signal"
            );
        }

        SentimentReading {
            stance,
            matched_post: Some(post.clone()),
            ambiguity,
            source_error: None,
        }
    }

    /// Fetch the timeline and classify it. A fetch failure degrades to
    /// `Unknown` instead of propagating.
    pub async fn read(
        &self,
        source: &dyn PostSource,
        handle: &str,
        window: usize,
    ) -> SentimentReading {
        match source.fetch_recent_posts(handle, window).await {
            Ok(posts) => self.extract(&posts),
            Err(e) => {
                let err = FollowerError::source_unavailable(format!("timeline @{handle}"), &e);
                tracing::warn!("{}; sentiment is unknown", err);
                SentimentReading::unavailable(err)
            }
        }
    }
}

/// `long` wins over `short` when both occur
pub fn classify_text(text: &str) -> (Stance, Option<Ambiguity>) {
    match (text.contains(LONG_TOKEN), text.contains(SHORT_TOKEN)) {
        (true, true) => (Stance::Long, Some(Ambiguity::BothDirections)),
        (true, false) => (Stance::Long, None),
        (false, true) => (Stance::Short, None),
        (false, false) => (Stance::Unknown, Some(Ambiguity::NoDirection)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::fakes::FakeTimeline;

    fn posts(texts: &[&str]) -> Vec<Post> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Post::new(i.to_string(), *t))
            .collect()
    }

    #[test]
    fn test_no_keyword_match_is_unknown() {
        let extractor = SentimentExtractor::new("ETHUSD");
        let reading = extractor.extract(&posts(&[
            "going long on BTCUSD",
            "going short on LTCUSD",
        ]));

        assert_eq!(reading.stance, Stance::Unknown);
        assert!(reading.matched_post.is_none());
        assert!(reading.ambiguity.is_none());
    }

    #[test]
    fn test_empty_timeline_is_unknown() {
        let reading = SentimentExtractor::new("ETHUSD").extract(&[]);
        assert_eq!(reading.stance, Stance::Unknown);
    }

    #[test]
    fn test_only_most_recent_mention_counts() {
        let extractor = SentimentExtractor::new("ETHUSD");
        let reading = extractor.extract(&posts(&[
            "unrelated chatter",
            "I am going short on ETHUSD",
            "I am going long on ETHUSD",
            "I am going long on ETHUSD",
        ]));

        assert_eq!(reading.stance, Stance::Short);
        assert_eq!(reading.matched_post.unwrap().id, "1");
    }

    #[test]
    fn test_keyword_match_is_case_sensitive() {
        let extractor = SentimentExtractor::new("ETHUSD");
        let reading = extractor.extract(&posts(&["going long on ethusd"]));
        assert_eq!(reading.stance, Stance::Unknown);
    }

    #[test]
    fn test_both_tokens_resolve_long() {
        let reading =
            SentimentExtractor::new("ETHUSD").extract(&posts(&["closed short, now long ETHUSD"]));

        assert_eq!(reading.stance, Stance::Long);
        assert_eq!(reading.ambiguity, Some(Ambiguity::BothDirections));
    }

    #[test]
    fn test_mention_without_direction() {
        let reading = SentimentExtractor::new("ETHUSD").extract(&posts(&["watching ETHUSD"]));

        assert_eq!(reading.stance, Stance::Unknown);
        assert_eq!(reading.ambiguity, Some(Ambiguity::NoDirection));
        assert!(reading.matched_post.is_some());
    }

    #[test]
    fn test_tokens_are_substrings() {
        // "longer" contains "long"; matching is plain substring
        assert_eq!(classify_text("ETHUSD longer term").0, Stance::Long);
        assert_eq!(classify_text("ETHUSD shortly").0, Stance::Short);
        assert_eq!(classify_text("ETHUSD LONG").0, Stance::Unknown);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_unknown() {
        let source = FakeTimeline::failing();
        let reading = SentimentExtractor::new("ETHUSD")
            .read(&source, "Vickicryptobot", 10)
            .await;

        assert_eq!(reading.stance, Stance::Unknown);
        assert!(matches!(
            reading.source_error,
            Some(FollowerError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_respects_window() {
        let source = FakeTimeline::new(&["a", "b", "going long ETHUSD"]);
        let reading = SentimentExtractor::new("ETHUSD")
            .read(&source, "Vickicryptobot", 2)
            .await;

        assert_eq!(reading.stance, Stance::Unknown);
        assert!(reading.source_error.is_none());
    }
}
