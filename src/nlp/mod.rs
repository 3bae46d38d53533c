// NLP module for comment classification
pub mod lexicon;
pub mod normalize;
pub mod opportunity;
pub mod sentiment;

pub use lexicon::Lexicon;
pub use normalize::normalize;
pub use opportunity::{detect_opportunity, detect_opportunity_with, PhraseMatching};
pub use sentiment::{classify, Sentiment};
