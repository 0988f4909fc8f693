pub mod deserializers;
pub mod pipeline;
pub mod types;

pub use pipeline::{normalize_review, parse_reviews_file, parse_reviews_json, parse_reviews_reader, ParseOutput};
pub use types::{ImportResult, ParseWarning, RawSentiment, Review, ReviewRaw, Sentiment, Source};
