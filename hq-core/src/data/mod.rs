pub mod source;

pub use source::{DataSource, EmbeddedSeed, JsonFileSource, Seed, source_for, typed_items};
