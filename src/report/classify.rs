//! Turns the three drained failure streams into one localized status report.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::channel::{ErrorStream, PhaseErrors};
use super::severity::Severity;
use crate::i18n::Localizer;

/// Fail rate (percent) above which the report is not itemized and the
/// session is classified as a near-total failure.
pub const NEAR_TOTAL_FAILURE_THRESHOLD: u32 = 97;

/// The transfer phase only gets a summary line above this own fail rate.
pub const TRANSFER_SUMMARY_THRESHOLD: u32 = 10;

/// Result of classifying a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Localized, human-readable report
    pub body: String,
    pub severity: Severity,
    /// Number of recorded failures across all phases
    pub failures: usize,
    /// Number of attempted items (hooks + paths) across all phases
    pub attempted: usize,
    /// `failures / attempted` as a rounded percentage
    pub fail_rate: u32,
}

/// Rounded failure percentage; zero when nothing was attempted.
pub fn fail_rate(failures: usize, attempted: usize) -> u32 {
    if attempted == 0 {
        return 0;
    }
    (failures as f64 / attempted as f64 * 100.0).round() as u32
}

/// Drain the three phase streams and classify the session.
///
/// Every stream is fully drained before anything is computed, so the
/// classification never sees a partially populated phase.
pub fn classify(
    transfers: ErrorStream,
    pre: ErrorStream,
    post: ErrorStream,
    localizer: &Localizer,
    languages: &[String],
) -> StatusReport {
    let transfers = transfers.drain();
    let pre = pre.drain();
    let post = post.drain();
    classify_phases(&transfers, &pre, &post, localizer, languages)
}

/// Classify already drained phases.
pub fn classify_phases(
    transfers: &PhaseErrors,
    pre: &PhaseErrors,
    post: &PhaseErrors,
    localizer: &Localizer,
    languages: &[String],
) -> StatusReport {
    let attempted = transfers.slots + pre.slots + post.slots;
    let failures = transfers.count() + pre.count() + post.count();

    if failures == 0 {
        return StatusReport {
            body: localizer.localize("Success", languages),
            severity: Severity::Success,
            failures,
            attempted,
            fail_rate: 0,
        };
    }

    let total_rate = fail_rate(failures, attempted);
    tracing::warn!("Failures: {failures}/{attempted} ({total_rate}%)");

    let mut body = localizer.localize_template(
        "Fail",
        &HashMap::from([("Failed", total_rate.to_string().as_str())]),
        languages,
    );
    body.push_str("\n\n");

    if total_rate > NEAR_TOTAL_FAILURE_THRESHOLD {
        return StatusReport {
            body: body.trim_end().to_string(),
            severity: Severity::Total,
            failures,
            attempted,
            fail_rate: total_rate,
        };
    }

    if !transfers.is_empty() {
        let transfer_rate = fail_rate(transfers.count(), transfers.slots);
        tracing::warn!(
            "Failed transfers: {}/{} ({transfer_rate}%)",
            transfers.count(),
            transfers.slots
        );
        let summary = (transfer_rate > TRANSFER_SUMMARY_THRESHOLD)
            .then(|| format!("{transfer_rate}%"));
        append_phase(&mut body, "FailedTransferNum", summary, transfers, localizer, languages);
    }

    if !pre.is_empty() {
        tracing::warn!("Failed pre-transfer commands: {}/{}", pre.count(), pre.slots);
        let summary = Some(pre.count().to_string());
        append_phase(&mut body, "FailedPreNum", summary, pre, localizer, languages);
    }

    if !post.is_empty() {
        tracing::warn!("Failed post-transfer commands: {}/{}", post.count(), post.slots);
        let summary = Some(post.count().to_string());
        append_phase(&mut body, "FailedPostNum", summary, post, localizer, languages);
    }

    StatusReport {
        body: body.trim_end().to_string(),
        severity: Severity::for_fail_rate(total_rate),
        failures,
        attempted,
        fail_rate: total_rate,
    }
}

fn append_phase(
    body: &mut String,
    summary_id: &str,
    summary: Option<String>,
    phase: &PhaseErrors,
    localizer: &Localizer,
    languages: &[String],
) {
    if let Some(value) = summary {
        let line = localizer.localize_template(
            summary_id,
            &HashMap::from([("Failed", value.as_str())]),
            languages,
        );
        body.push_str(&line);
        body.push('\n');
    }
    for (i, error) in phase.errors.iter().enumerate() {
        let _ = writeln!(body, "{}° | {}", i + 1, error.localize(localizer, languages));
    }
    body.push('\n');
}
