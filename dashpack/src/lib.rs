//! Layered merge and provenance engine for dashboard configuration packs.
//!
//! A user document selects built-in packs and external pack URLs. The
//! [`MergeEngine`] folds `[built-in..., external (sorted by URL)..., user]`
//! into one [`ConfigDocument`], records the [`Provenance`] of every item,
//! anchor and palette, and reports authoring problems as [`Issue`]s instead
//! of failing. [`validate`] checks the merged output; [`collapse`] exports a
//! user document reduced to the keys a merge reads.
//!
//! ```rust
//! use dashpack::{BuiltinRegistry, MergeEngine};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .build()
//! #     .expect("runtime")
//! #     .block_on(async {
//! let registry = BuiltinRegistry::new().with_pack(
//!     "lcars",
//!     json!({"overlays": [{"id": "frame", "type": "box", "color": "orange"}]}),
//! );
//! let engine = MergeEngine::new(registry);
//! let result = engine
//!     .merge(&json!({
//!         "use_packs": {"builtin": ["lcars"]},
//!         "overlays": [{"id": "frame", "type": "box", "color": "teal"}]
//!     }))
//!     .await;
//! assert_eq!(result.merged.overlays[0].fields["color"], json!("teal"));
//! assert_eq!(result.checksum().len(), dashpack::canonical::FINGERPRINT_LEN);
//! # });
//! ```

pub mod canonical;
pub mod collapse;
pub mod document;
mod error;
pub mod fetch;
pub mod issue;
pub mod layer;
pub mod merge;
pub mod provenance;
pub mod registry;
pub mod validate;

pub use collapse::collapse;
pub use document::{Collection, ConfigDocument};
pub use error::{PackError, PackResult};
pub use fetch::{FetchOptions, PackFetcher};
pub use issue::{Issue, IssueCode, IssueSink, MetricsRecorder, Severity};
pub use merge::{MergeEngine, MergeResult, merge_layers};
pub use provenance::{Provenance, ProvenanceEntry};
pub use registry::BuiltinRegistry;
pub use validate::{ValidationReport, validate};
