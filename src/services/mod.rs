//! Service clients built on the dispatch core.
//!
//! Each client is a thin layer that names the operation, fills in path,
//! query and body, and picks a response converter.

pub mod natural_language_classifier;
pub mod speech_to_text;
pub mod text_to_speech;

pub use natural_language_classifier::NaturalLanguageClassifier;
pub use speech_to_text::SpeechToText;
pub use text_to_speech::TextToSpeech;
