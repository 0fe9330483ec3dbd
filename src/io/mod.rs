//! Reference model persistence.
//!
//! - [`write_model`] / [`read_model`]: compact .prati binary format
//! - [`ModelStore`]: save/load by name ([`DirectoryStore`], [`MemoryStore`])

mod error;
mod format;
mod store;

pub use error::ModelIoError;
pub use format::{FORMAT_VERSION, ReferenceModel, read_model, write_model};
pub use store::{DirectoryStore, MODEL_EXTENSION, MemoryStore, ModelStore};
