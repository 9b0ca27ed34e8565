//! `rstest-bdd` behavioural suite for `dashpack`.
//!
//! Fixtures hold the scenario state, step definitions drive the merge engine,
//! and the scenario bindings attach both to the `.feature` files under
//! `tests/features`.

mod fixtures;
mod scenarios;
mod steps;
