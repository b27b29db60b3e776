//! Domain models for the classifier.

mod patient;
mod record;
mod taxonomy;

pub use patient::*;
pub use record::*;
pub use taxonomy::*;
