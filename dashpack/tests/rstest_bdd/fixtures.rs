//! Shared fixtures for the behavioural suite.

use dashpack::{MergeResult, ValidationReport};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use serde_json::Value;
use test_helpers::fetch::MemoryPacks;

/// State shared between the steps of one merge scenario.
#[derive(Debug, Default, ScenarioState)]
pub struct MergeContext {
    /// User document under construction.
    pub user: Slot<Value>,
    /// External packs served to the engine.
    pub packs: Slot<MemoryPacks>,
    /// Outcome of the last merge.
    pub result: Slot<MergeResult>,
    /// Outcome of the last validation.
    pub report: Slot<ValidationReport>,
}

/// Creates an empty merge context.
#[fixture]
pub fn merge_context() -> MergeContext {
    MergeContext::default()
}
