//! Per-character sync cursor.

use chrono::{DateTime, Utc};

use crate::platform::ActivityDetail;

/// Where the last successful pass for a character stopped.
///
/// `last_instance_id` is the newest activity already stored and marks the
/// discovery boundary. `last_retrieved_date` normally holds that activity's
/// period, but a pass that finds nothing new moves it to the character's
/// last-played date instead so the character stops looking due.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncWatermark {
    pub last_instance_id: Option<String>,
    pub last_retrieved_date: Option<DateTime<Utc>>,
}

impl SyncWatermark {
    pub fn new(last_instance_id: impl Into<String>, last_retrieved_date: DateTime<Utc>) -> Self {
        Self {
            last_instance_id: Some(last_instance_id.into()),
            last_retrieved_date: Some(last_retrieved_date),
        }
    }

    /// The watermark of a character that has never been synced.
    pub fn never_synced() -> Self {
        Self::default()
    }

    pub fn is_never_synced(&self) -> bool {
        self.last_retrieved_date.is_none()
    }

    /// True if `instance_id` is the last stored activity.
    ///
    /// An absent or empty id never matches, so a first sync walks the whole
    /// history.
    pub fn is_boundary(&self, instance_id: &str) -> bool {
        self.last_instance_id
            .as_deref()
            .is_some_and(|id| !id.is_empty() && id == instance_id)
    }

    /// Whole hours between the last sync and `date_last_played`.
    ///
    /// `None` if the character has never been synced.
    pub fn hours_since_last_sync(&self, date_last_played: DateTime<Utc>) -> Option<i64> {
        self.last_retrieved_date
            .map(|last| (date_last_played - last).num_hours())
    }

    /// A character is due when it was played more than `cutoff_hours` after
    /// its last sync. Never-synced characters are always due.
    pub fn is_due(&self, date_last_played: DateTime<Utc>, cutoff_hours: i64) -> bool {
        self.hours_since_last_sync(date_last_played)
            .is_none_or(|hours| hours > cutoff_hours)
    }

    /// Compute the watermark after a pass.
    ///
    /// `candidate` is the fetched report with the greatest period, stored new
    /// or already present. When the pass retrieved something, the candidate
    /// becomes the watermark unless it is older than the current date. When
    /// it retrieved nothing, only the date moves, to `date_last_played`.
    pub fn advance(
        &self,
        candidate: Option<&ActivityDetail>,
        retrieved: usize,
        date_last_played: DateTime<Utc>,
    ) -> Self {
        match candidate {
            Some(detail) if retrieved > 0 => {
                let older = self
                    .last_retrieved_date
                    .is_some_and(|current| detail.period < current);
                if older {
                    self.clone()
                } else {
                    Self::new(detail.instance_id.clone(), detail.period)
                }
            }
            _ => Self {
                last_instance_id: self.last_instance_id.clone(),
                last_retrieved_date: Some(date_last_played),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1 + n, 0, 0, 0).unwrap()
    }

    fn detail(instance_id: &str, period: DateTime<Utc>) -> ActivityDetail {
        ActivityDetail {
            instance_id: instance_id.to_string(),
            period,
            reference_id: 0,
            director_activity_hash: 0,
            mode: 0,
            modes: Vec::new(),
            is_private: false,
            entries: Vec::new(),
        }
    }

    #[test]
    fn test_never_synced_matches_no_boundary_and_is_due() {
        let wm = SyncWatermark::never_synced();
        assert!(wm.is_never_synced());
        assert!(!wm.is_boundary("A1"));
        assert!(!wm.is_boundary(""));
        assert!(wm.is_due(day(0), 1));
        assert_eq!(wm.hours_since_last_sync(day(0)), None);
    }

    #[test]
    fn test_empty_instance_id_is_not_a_boundary() {
        let wm = SyncWatermark {
            last_instance_id: Some(String::new()),
            last_retrieved_date: Some(day(0)),
        };
        assert!(!wm.is_boundary(""));
    }

    #[test]
    fn test_is_due_uses_strict_cutoff() {
        let wm = SyncWatermark::new("A1", day(0));
        assert!(!wm.is_due(day(0) + Duration::minutes(59), 0));
        assert!(!wm.is_due(day(0) + Duration::hours(1), 1));
        assert!(wm.is_due(day(0) + Duration::hours(2), 1));
        assert_eq!(wm.hours_since_last_sync(day(5)), Some(120));
    }

    #[test]
    fn test_advance_commits_candidate() {
        let wm = SyncWatermark::new("A1", day(0));
        let newest = detail("A4", day(3));
        let next = wm.advance(Some(&newest), 3, day(4));
        assert_eq!(next, SyncWatermark::new("A4", day(3)));
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let wm = SyncWatermark::new("A9", day(5));
        let older = detail("A4", day(3));
        assert_eq!(wm.advance(Some(&older), 1, day(6)), wm);
    }

    #[test]
    fn test_advance_with_nothing_retrieved_moves_date_only() {
        let wm = SyncWatermark::new("A1", day(0));
        let next = wm.advance(None, 0, day(5));
        assert_eq!(next, SyncWatermark::new("A1", day(5)));

        let first = SyncWatermark::never_synced().advance(None, 0, day(2));
        assert_eq!(first.last_instance_id, None);
        assert_eq!(first.last_retrieved_date, Some(day(2)));
    }
}
