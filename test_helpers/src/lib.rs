//! Test helpers shared across crates.
//!
//! - [`packs`]: sample built-in, external and user documents.
//! - [`fetch`]: in-memory fetchers preloaded with pack bodies.
//! - [`text`]: scalar normalisation for behavioural step arguments.
//! - [`figment`]: isolated settings sources staged in a `figment::Jail`.

pub mod fetch;
pub mod figment;
pub mod packs;
pub mod text;
