//! Check-in timing classification against the configured shift window.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;

/// Grace period of the [`ClassifyPolicy::Strict30`] policy, in minutes.
pub const STRICT_GRACE_MINUTES: i64 = 30;

/// Half-window of the [`ClassifyPolicy::Narrow15`] policy, in minutes.
pub const NARROW_WINDOW_MINUTES: i64 = 15;

/// Two classification rules coexist in production and disagree on what
/// "on time" means. They stay separate named policies until product picks
/// one; do not merge them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClassifyPolicy {
    /// Anything up to 30 minutes past shift start still counts as on time.
    Strict30,
    /// On time only inside the 15 minutes before shift start.
    Narrow15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
pub enum CheckInClass {
    Early,
    #[strum(to_string = "On-time")]
    OnTime,
    Late,
}

/// Where a single attendance row lands in the timing report. Absence-like
/// statuses report as themselves rather than a timing category, and a
/// Present row without a clock-in gets its own bucket distinct from Absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
pub enum TimingBucket {
    Early,
    #[strum(to_string = "On-time")]
    OnTime,
    Late,
    #[strum(to_string = "No Clock-in")]
    NoClockIn,
    Absent,
    Leave,
    Holiday,
    Friday,
}

impl From<CheckInClass> for TimingBucket {
    fn from(class: CheckInClass) -> Self {
        match class {
            CheckInClass::Early => TimingBucket::Early,
            CheckInClass::OnTime => TimingBucket::OnTime,
            CheckInClass::Late => TimingBucket::Late,
        }
    }
}

fn minutes_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Classify a check-in time-of-day against the shift start.
///
/// Both instants are taken in the zone the attendance rows were written in;
/// the comparison itself is zone-agnostic minute arithmetic.
pub fn classify_check_in(
    check_in: NaiveTime,
    shift_start: NaiveTime,
    policy: ClassifyPolicy,
) -> CheckInClass {
    let delta = minutes_of_day(check_in) - minutes_of_day(shift_start);

    match policy {
        ClassifyPolicy::Strict30 => {
            if delta < 0 {
                CheckInClass::Early
            } else if delta <= STRICT_GRACE_MINUTES {
                CheckInClass::OnTime
            } else {
                CheckInClass::Late
            }
        }
        ClassifyPolicy::Narrow15 => {
            if delta < -NARROW_WINDOW_MINUTES {
                CheckInClass::Early
            } else if delta <= 0 {
                CheckInClass::OnTime
            } else {
                CheckInClass::Late
            }
        }
    }
}

/// Classify a full attendance row: absence-like statuses short-circuit,
/// Present rows fall through to timing classification.
pub fn classify_record(
    status: AttendanceStatus,
    check_in: Option<NaiveDateTime>,
    shift_start: NaiveTime,
    policy: ClassifyPolicy,
) -> TimingBucket {
    match status {
        AttendanceStatus::Absent => TimingBucket::Absent,
        AttendanceStatus::Leave => TimingBucket::Leave,
        AttendanceStatus::Holiday => TimingBucket::Holiday,
        AttendanceStatus::Friday => TimingBucket::Friday,
        AttendanceStatus::Present => match check_in {
            None => TimingBucket::NoClockIn,
            Some(ts) => classify_check_in(ts.time(), shift_start, policy).into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn strict30_threshold_table() {
        let shift = t(8, 0);
        assert_eq!(classify_check_in(t(7, 59), shift, ClassifyPolicy::Strict30), CheckInClass::Early);
        assert_eq!(classify_check_in(t(8, 0), shift, ClassifyPolicy::Strict30), CheckInClass::OnTime);
        assert_eq!(classify_check_in(t(8, 30), shift, ClassifyPolicy::Strict30), CheckInClass::OnTime);
        assert_eq!(classify_check_in(t(8, 31), shift, ClassifyPolicy::Strict30), CheckInClass::Late);
    }

    #[test]
    fn strict30_two_hours_late() {
        // check-in at minute 600 against shift start at minute 480
        assert_eq!(
            classify_check_in(t(10, 0), t(8, 0), ClassifyPolicy::Strict30),
            CheckInClass::Late
        );
    }

    #[test]
    fn narrow15_threshold_table() {
        let shift = t(8, 0);
        assert_eq!(classify_check_in(t(7, 44), shift, ClassifyPolicy::Narrow15), CheckInClass::Early);
        assert_eq!(classify_check_in(t(7, 45), shift, ClassifyPolicy::Narrow15), CheckInClass::OnTime);
        assert_eq!(classify_check_in(t(8, 0), shift, ClassifyPolicy::Narrow15), CheckInClass::OnTime);
        assert_eq!(classify_check_in(t(8, 1), shift, ClassifyPolicy::Narrow15), CheckInClass::Late);
    }

    #[test]
    fn policies_disagree_inside_the_grace_period() {
        // 08:10 against an 08:00 shift: on time for one rule, late for the other
        let shift = t(8, 0);
        assert_eq!(classify_check_in(t(8, 10), shift, ClassifyPolicy::Strict30), CheckInClass::OnTime);
        assert_eq!(classify_check_in(t(8, 10), shift, ClassifyPolicy::Narrow15), CheckInClass::Late);
    }

    #[test]
    fn classification_is_monotonic_in_delta() {
        let shift = t(8, 0);
        for policy in [ClassifyPolicy::Strict30, ClassifyPolicy::Narrow15] {
            let mut last_rank = 0;
            for minute in 0..24 * 60 {
                let check_in = t((minute / 60) as u32, (minute % 60) as u32);
                let rank = match classify_check_in(check_in, shift, policy) {
                    CheckInClass::Early => 0,
                    CheckInClass::OnTime => 1,
                    CheckInClass::Late => 2,
                };
                assert!(rank >= last_rank, "{policy} regressed at minute {minute}");
                last_rank = rank;
            }
        }
    }

    #[test]
    fn absence_statuses_short_circuit() {
        let shift = t(8, 0);
        let checked_in = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(8, 5, 0);

        assert_eq!(
            classify_record(AttendanceStatus::Holiday, checked_in, shift, ClassifyPolicy::Strict30),
            TimingBucket::Holiday
        );
        assert_eq!(
            classify_record(AttendanceStatus::Absent, None, shift, ClassifyPolicy::Narrow15),
            TimingBucket::Absent
        );
    }

    #[test]
    fn present_without_clock_in_is_its_own_bucket() {
        assert_eq!(
            classify_record(AttendanceStatus::Present, None, t(8, 0), ClassifyPolicy::Strict30),
            TimingBucket::NoClockIn
        );
    }

    #[test]
    fn policy_parses_from_query_labels() {
        assert_eq!("strict30".parse::<ClassifyPolicy>(), Ok(ClassifyPolicy::Strict30));
        assert_eq!("narrow15".parse::<ClassifyPolicy>(), Ok(ClassifyPolicy::Narrow15));
        assert!("lenient".parse::<ClassifyPolicy>().is_err());
    }
}
