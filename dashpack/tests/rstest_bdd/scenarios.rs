//! Binds the feature files to the merge fixtures.

use crate::fixtures::{MergeContext, merge_context};
use rstest_bdd_macros::scenarios;

scenarios!(
    "tests/features/merge.feature",
    fixtures = [merge_context: MergeContext]
);
scenarios!(
    "tests/features/validation.feature",
    fixtures = [merge_context: MergeContext]
);
