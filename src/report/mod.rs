//! Failure aggregation and status classification.
//!
//! Each phase of a session (pre-hooks, transfers, post-hooks) records its
//! failures into an [`ErrorStream`]. Once all three are closed the
//! classifier drains them, computes the fail rate and renders the report
//! that is sent as the status notification.

mod channel;
mod classify;
mod severity;

pub use channel::{error_channel, ErrorSender, ErrorStream, PhaseErrors};
pub use classify::{
    classify, classify_phases, fail_rate, StatusReport, NEAR_TOTAL_FAILURE_THRESHOLD,
    TRANSFER_SUMMARY_THRESHOLD,
};
pub use severity::{Severity, SEVERITY_THRESHOLDS};
