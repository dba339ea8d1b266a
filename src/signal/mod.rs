// Social signal module
pub mod sentiment;

pub use sentiment::{classify_text, Ambiguity, SentimentExtractor, SentimentReading};
