// Batch scoring pipeline — request-scoped orchestration.
//
// One call scores one job against one batch of candidate records. All
// intermediate state (the vector-space model, per-candidate features, the
// sensitive-attribute table) lives inside the call and is dropped with it;
// only the ScoringOutcome escapes.

pub mod batch;

pub use batch::{score_batch, score_batch_at};
