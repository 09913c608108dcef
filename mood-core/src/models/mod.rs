pub mod sentiment;

pub use sentiment::{NewSentiment, SentimentLabel, SentimentRecord};
