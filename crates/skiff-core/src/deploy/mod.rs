//! Create-or-update reconciliation of applications against Cloud Run.

mod reconciler;

pub use reconciler::{ReconcileOutcome, Reconciler};
