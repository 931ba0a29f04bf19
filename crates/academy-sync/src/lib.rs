//! academy-sync — the client-side half of the progress engine.
//!
//! The disconnected progress cache, the cache/server reconciliation
//! protocol, the chapter certification trigger, and the session tracker
//! that ties one learner action together end to end.

pub mod cache;
pub mod reconcile;
pub mod session;
pub mod trigger;

pub use cache::{ProgressCache, SubjectState};
pub use reconcile::{reconcile, ReconcileSummary, BACKFILL_BATCH_LIMIT};
pub use session::ProgressTracker;
