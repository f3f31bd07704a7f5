use std::fmt;

/// Overall outcome of a session, derived from its total failure rate.
///
/// Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// No failure at all
    Success,
    /// At most 10% of the attempted items failed
    Minor,
    /// At most 50%
    Moderate,
    /// At most 80%
    Major,
    /// More than 80%
    Critical,
    /// Near-total failure; the report is not itemized
    Total,
}

/// Percentage thresholds of the failure tiers, in order: the first threshold
/// the fail rate does not exceed selects the tier.
pub const SEVERITY_THRESHOLDS: [(u32, Severity); 4] = [
    (10, Severity::Minor),
    (50, Severity::Moderate),
    (80, Severity::Major),
    (100, Severity::Critical),
];

/// Notification tags of the failure tiers, parallel to [`SEVERITY_THRESHOLDS`].
const TIER_TAGS: [&str; 4] = ["green_circle", "yellow_circle", "orange_circle", "red_circle"];

const TOTAL_TAG: &str = "black_circle";

impl Severity {
    /// Tier for a failure rate of `fail_rate` percent with at least one failure.
    pub fn for_fail_rate(fail_rate: u32) -> Severity {
        SEVERITY_THRESHOLDS
            .iter()
            .find(|(threshold, _)| fail_rate <= *threshold)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Critical)
    }

    /// Position in the tier table. `Success` shares the lowest tier.
    fn tier(&self) -> Option<usize> {
        match self {
            Severity::Success | Severity::Minor => Some(0),
            Severity::Moderate => Some(1),
            Severity::Major => Some(2),
            Severity::Critical => Some(3),
            Severity::Total => None,
        }
    }

    /// Emoji tag attached to the status notification.
    pub fn tag(&self) -> &'static str {
        match self.tier() {
            Some(tier) => TIER_TAGS[tier % TIER_TAGS.len()],
            None => TOTAL_TAG,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Minor => write!(f, "minor"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
            Severity::Total => write!(f, "total"),
        }
    }
}
