pub mod preprocessing;
pub mod themes;

pub use preprocessing::{bigrams, grams, tokenize, StopWordFilter};
pub use themes::{product_phrases, top_themes, word_cloud, FontRange, ProductPhrases, ThemeEntry, ThemeTable, WordCloudEntry};
