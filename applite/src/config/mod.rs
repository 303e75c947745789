//! Boot-configuration documents: deep merge and synthesis.

mod merge;
mod seed;

pub use merge::merge_values;
pub use seed::{SeedDocuments, Synthesizer};
