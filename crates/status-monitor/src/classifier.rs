//! Incident classification for status page updates.
//!
//! Decides whether a feed entry describes an ongoing problem worth alerting
//! on. Two keyword tables are scanned in order:
//! 1. Resolved keywords: any hit means the update is a resolution
//! 2. Incident keywords: any hit means the update is an active incident
//! 3. Default: no hit in either table means stay silent

use tracing::debug;

/// Keywords indicating a resolved or normal status. Checked first.
pub const RESOLVED_KEYWORDS: &[&str] = &[
    "resolved",
    "recovered",
    "fixed",
    "completed",
    "restored",
    "all services operational",
    "all impacted services have now fully recovered",
    "post-mortem",
    "has been resolved",
    "issue has been fixed",
];

/// Keywords indicating an active incident.
pub const INCIDENT_KEYWORDS: &[&str] = &[
    "investigating",
    "identified",
    "monitoring",
    "degraded",
    "outage",
    "down",
    "unavailable",
    "elevated error",
    "high error rate",
    "partial outage",
    "major outage",
    "service disruption",
    "experiencing issues",
    "incident",
    "problem",
    "failing",
    "not loading",
    "broken",
];

/// Outcome of classifying a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A resolved keyword matched
    Resolved(&'static str),
    /// An incident keyword matched and no resolved keyword did
    Incident(&'static str),
    /// Neither table matched
    Unclear,
}

impl Classification {
    /// Whether this update should trigger a notification.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Incident(_))
    }

    /// The keyword that decided the outcome, if any.
    #[must_use]
    pub const fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Resolved(k) | Self::Incident(k) => Some(*k),
            Self::Unclear => None,
        }
    }
}

/// Classify a status update by its title and description.
///
/// Matching is case-insensitive on raw substrings, so "downtime" matches
/// "down". Resolved keywords always win over incident keywords.
#[must_use]
pub fn classify(title: &str, description: &str) -> Classification {
    let text = format!("{title} {description}").to_lowercase();

    if let Some(keyword) = first_match(&text, RESOLVED_KEYWORDS) {
        debug!(keyword, "Status update marked as resolved");
        return Classification::Resolved(keyword);
    }

    if let Some(keyword) = first_match(&text, INCIDENT_KEYWORDS) {
        debug!(keyword, "Active incident detected");
        return Classification::Incident(keyword);
    }

    debug!("No clear incident markers found, defaulting to skip");
    Classification::Unclear
}

/// Returns true only for updates describing an ongoing incident.
#[must_use]
pub fn is_active_incident(title: &str, description: &str) -> bool {
    classify(title, description).is_active()
}

fn first_match(text: &str, keywords: &'static [&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|k| text.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_takes_precedence() {
        assert!(!is_active_incident(
            "Investigating issue - now resolved",
            "The outage has been resolved and service is operational"
        ));
    }

    #[test]
    fn test_case_insensitive_incident() {
        assert!(is_active_incident("INVESTIGATING OUTAGE", "Service is DOWN"));
    }

    #[test]
    fn test_empty_defaults_to_silence() {
        assert!(!is_active_incident("", ""));
        assert_eq!(classify("", ""), Classification::Unclear);
    }

    #[test]
    fn test_no_keywords_defaults_to_silence() {
        assert!(!is_active_incident(
            "New model available",
            "We have launched a new model in the API."
        ));
    }

    #[test]
    fn test_substring_match_without_word_boundary() {
        assert_eq!(
            classify("Planned downtime", ""),
            Classification::Incident("down")
        );
    }

    #[test]
    fn test_real_incident_updates() {
        let cases = [
            (
                "Elevated errors for requests to Claude 4.5 Haiku",
                "Service disruption affecting Claude 4.5 Haiku. A fix has been implemented and we are monitoring the results.",
            ),
            (
                "Elevated errors with uploading files to claude.ai",
                "File upload functionality issues. Investigating the problem.",
            ),
            (
                "High error rates on gpt-4o-audio-preview",
                "Audio component experiencing elevated errors. Issue identified.",
            ),
            (
                "API service degraded performance",
                "Users may experience slower response times. We are investigating.",
            ),
            (
                "Members Page in Admin Settings not loading",
                "The members page is currently unavailable. We are working on a fix.",
            ),
        ];

        for (title, description) in cases {
            assert!(is_active_incident(title, description), "{title}");
        }
    }

    #[test]
    fn test_real_resolved_updates() {
        let cases = [
            (
                "Elevated errors for requests to Claude 4.5 Sonnet",
                "The issue has been identified and a fix has been implemented. All services are now operational. Resolved.",
            ),
            (
                "High error rates on gpt-4o-audio-preview",
                "Audio component has fully recovered. All impacted services have now fully recovered.",
            ),
            (
                "API latency issues",
                "The latency issue has been fixed and services are restored to normal.",
            ),
            (
                "Scheduled Maintenance Completed",
                "The scheduled maintenance has completed successfully. All systems operational.",
            ),
            (
                "Post-mortem: API Outage on Oct 25",
                "Analysis of the outage that occurred last week.",
            ),
        ];

        for (title, description) in cases {
            assert!(!is_active_incident(title, description), "{title}");
        }
    }

    #[test]
    fn test_every_resolved_keyword_beats_every_incident_keyword() {
        for resolved in RESOLVED_KEYWORDS {
            for incident in INCIDENT_KEYWORDS {
                assert!(
                    !is_active_incident(incident, resolved),
                    "{resolved} should win over {incident}"
                );
            }
        }
    }

    #[test]
    fn test_classification_reports_first_keyword() {
        let result = classify("Partial outage", "");
        // "outage" precedes "partial outage" in the table
        assert_eq!(result.keyword(), Some("outage"));
        assert!(result.is_active());

        let result = classify("Fixed", "investigating");
        assert_eq!(result, Classification::Resolved("fixed"));
        assert!(!result.is_active());
    }
}
