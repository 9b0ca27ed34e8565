//! Error types produced while loading packs.

mod constructors;
mod types;

pub use types::{PackError, PackResult};
