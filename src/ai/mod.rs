//! Generative text: the completion seam and the summarizer built on it

pub mod generator;
pub mod summarizer;

pub use generator::{CompletionRequest, TextGenerator, text_message};
pub use summarizer::{SummaryRequest, Summarizer};
