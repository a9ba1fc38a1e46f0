//! Derived per-party aggregates.
//!
//! Nothing in this module touches storage; every function is a pure fold
//! over records the caller already fetched, so the same numbers come out
//! whether the inputs came from the in-memory store, Postgres, or the HTTP
//! client. All ratios divide by zero safely by reporting 0 for an empty
//! input.

use serde::{Deserialize, Serialize};

use crate::{CombatCheckin, Encounter, Issue, IssuePriority};

/// Status strings that count an issue as no longer needing attention.
///
/// Status text is freeform, so "closed" is a soft convention shared with
/// the status suggestions the UI offers.
pub const DEFAULT_CLOSED_STATUSES: &[&str] = &["Resolved", "Hopefully fixed"];

/// Percentage (0.0 to 100.0) of the given encounters marked complete.
/// An empty slice is 0.0, not NaN.
pub fn completion_percent(encounters: &[Encounter]) -> f64 {
    if encounters.is_empty() {
        return 0.0;
    }
    let completed = encounters.iter().filter(|e| e.completed).count();
    completed as f64 / encounters.len() as f64 * 100.0
}

/// Counts of encountered versus total checkins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatProgress {
    /// Checkins with the encountered flag set.
    pub encountered: usize,
    /// All checkins considered.
    pub total: usize,
}

/// Progress of a party (or any other grouping) through its checkins.
pub fn combat_progress(checkins: &[CombatCheckin]) -> CombatProgress {
    CombatProgress {
        encountered: checkins.iter().filter(|c| c.encountered).count(),
        total: checkins.len(),
    }
}

/// The issues for one party whose status is not in `closed_statuses`.
///
/// Matching on both party name and status text is exact and
/// case-sensitive.
pub fn open_issues<'a>(
    issues: &'a [Issue],
    party_name: &str,
    closed_statuses: &[&str],
) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| i.party == party_name)
        .filter(|i| !closed_statuses.contains(&i.status.as_str()))
        .collect()
}

/// Whether any of the given issues is High priority.
pub fn has_high_priority(issues: &[&Issue]) -> bool {
    issues.iter().any(|i| i.priority == IssuePriority::High)
}

/// The dashboard row for one party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    /// Party name.
    pub name: String,
    /// Percentage of the party's encounters marked complete.
    pub completion_percent: f64,
    /// Encountered/total across the party's combat checkins.
    pub combat: CombatProgress,
    /// Number of issues still needing attention.
    pub open_issue_count: usize,
    /// Whether any open issue is High priority.
    pub has_high_priority_issue: bool,
}

/// Folds one party's records into its dashboard row.
///
/// `encounters` and `checkins` must already be filtered to the party;
/// `issues` may be the full listing because issues carry the party name.
pub fn summarize(
    party_name: &str,
    encounters: &[Encounter],
    checkins: &[CombatCheckin],
    issues: &[Issue],
) -> PartySummary {
    let open = open_issues(issues, party_name, DEFAULT_CLOSED_STATUSES);
    PartySummary {
        name: party_name.to_string(),
        completion_percent: completion_percent(encounters),
        combat: combat_progress(checkins),
        open_issue_count: open.len(),
        has_high_priority_issue: has_high_priority(&open),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn encounter(completed: bool) -> Encounter {
        Encounter {
            id: "encounter:a".to_string(),
            party_id: "party:a".to_string(),
            name: "beat".to_string(),
            time: None,
            location: None,
            activity: None,
            item: None,
            completed,
            notes: String::new(),
        }
    }

    fn checkin(encountered: bool) -> CombatCheckin {
        CombatCheckin {
            id: "checkin:a".to_string(),
            combat_id: "combat:a".to_string(),
            party_id: "party:a".to_string(),
            encountered,
            notes: String::new(),
        }
    }

    fn issue(party: &str, status: &str, priority: IssuePriority) -> Issue {
        Issue {
            id: "issue:a".to_string(),
            party: party.to_string(),
            job: "Marshal".to_string(),
            kind: "General".to_string(),
            priority,
            status: status.to_string(),
            situation: String::new(),
            timestamp: Utc::now(),
            has_details: false,
        }
    }

    #[test]
    fn completion_percent_of_empty_is_zero() {
        assert_eq!(completion_percent(&[]), 0.0);
    }

    #[test]
    fn completion_percent_counts_completed() {
        let encounters = vec![encounter(true), encounter(false), encounter(true), encounter(true)];
        assert_eq!(completion_percent(&encounters), 75.0);
    }

    #[test]
    fn combat_progress_counts() {
        let checkins = vec![checkin(true), checkin(false), checkin(false)];
        assert_eq!(
            combat_progress(&checkins),
            CombatProgress {
                encountered: 1,
                total: 3
            }
        );
        assert_eq!(
            combat_progress(&[]),
            CombatProgress {
                encountered: 0,
                total: 0
            }
        );
    }

    #[test]
    fn open_issues_filters_party_and_closed_statuses() {
        let issues = vec![
            issue("Arden", "Monitoring", IssuePriority::Low),
            issue("Arden", "Resolved", IssuePriority::High),
            issue("Arden", "Hopefully fixed", IssuePriority::High),
            issue("Briar", "Monitoring", IssuePriority::High),
        ];

        let open = open_issues(&issues, "Arden", DEFAULT_CLOSED_STATUSES);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].status, "Monitoring");
        // The only open issue is Low, even though closed High issues exist.
        assert!(!has_high_priority(&open));
    }

    #[test]
    fn status_matching_is_case_sensitive() {
        let issues = vec![issue("Arden", "resolved", IssuePriority::Low)];
        let open = open_issues(&issues, "Arden", DEFAULT_CLOSED_STATUSES);
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn summarize_folds_everything() {
        let encounters = vec![encounter(true), encounter(false)];
        let checkins = vec![checkin(true), checkin(true), checkin(false)];
        let issues = vec![
            issue("Arden", "Monitoring", IssuePriority::High),
            issue("Arden", "Resolved", IssuePriority::High),
            issue("Briar", "Monitoring", IssuePriority::Low),
        ];

        let summary = summarize("Arden", &encounters, &checkins, &issues);
        assert_eq!(summary.name, "Arden");
        assert_eq!(summary.completion_percent, 50.0);
        assert_eq!(summary.combat.encountered, 2);
        assert_eq!(summary.combat.total, 3);
        assert_eq!(summary.open_issue_count, 1);
        assert!(summary.has_high_priority_issue);
    }

    #[test]
    fn summarize_empty_party_is_all_zeros() {
        let summary = summarize("Arden", &[], &[], &[]);
        assert_eq!(summary.completion_percent, 0.0);
        assert_eq!(summary.combat.total, 0);
        assert_eq!(summary.open_issue_count, 0);
        assert!(!summary.has_high_priority_issue);
    }
}
