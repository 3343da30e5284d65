//! Working-hours string handling: parsing `"10h 40m"` / `"08:15"` style
//! durations, the inverse formatter, and overtime/shortfall math.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use derive_more::Display;

/// Rendered for a zero or unknown working duration.
pub const ZERO_LABEL: &str = "0h 0m";

/// Rendered where overtime or shortfall is zero or inputs are missing.
pub const DASH_LABEL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "invalid duration format: {:?}", _0)]
pub struct InvalidDurationFormat(pub String);

impl std::error::Error for InvalidDurationFormat {}

/// Parse a working-hours string into total minutes.
///
/// Accepts `"<H>h <M>m"` (minutes part optional, treated as 0) and `"HH:MM"`.
/// Anything else is an error; callers that want the stored fails-soft
/// behavior map it to 0 themselves.
pub fn parse_duration(text: &str) -> Result<i64, InvalidDurationFormat> {
    let invalid = || InvalidDurationFormat(text.to_string());
    let cleaned = text.trim();

    if cleaned.is_empty() {
        return Err(invalid());
    }

    // "HH:MM" form
    if let Some((h, m)) = cleaned.split_once(':') {
        let hours: i64 = h.trim().parse().map_err(|_| invalid())?;
        let minutes: i64 = m.trim().parse().map_err(|_| invalid())?;
        if hours < 0 || minutes < 0 {
            return Err(invalid());
        }
        return Ok(hours * 60 + minutes);
    }

    // "<H>h <M>m" form: digit runs tagged by an h/m suffix
    let lowered = cleaned.to_lowercase();
    let mut hours: Option<i64> = None;
    let mut minutes: Option<i64> = None;
    let mut num = String::new();

    for ch in lowered.chars() {
        if ch.is_ascii_digit() {
            num.push(ch);
        } else if ch == 'h' {
            if num.is_empty() || hours.is_some() {
                return Err(invalid());
            }
            hours = Some(num.parse().map_err(|_| invalid())?);
            num.clear();
        } else if ch == 'm' {
            if num.is_empty() || minutes.is_some() {
                return Err(invalid());
            }
            minutes = Some(num.parse().map_err(|_| invalid())?);
            num.clear();
        } else if ch.is_whitespace() {
            if !num.is_empty() {
                // digit run without an h/m suffix
                return Err(invalid());
            }
        } else {
            return Err(invalid());
        }
    }

    if !num.is_empty() || (hours.is_none() && minutes.is_none()) {
        return Err(invalid());
    }

    Ok(hours.unwrap_or(0) * 60 + minutes.unwrap_or(0))
}

/// Render minutes as `"Hh Mm"`. Zero (or negative) renders the zero sentinel.
pub fn format_duration(minutes: i64) -> String {
    let m = minutes.max(0);
    format!("{}h {}m", m / 60, m % 60)
}

/// Display string for a day's worked time. A missing check-out renders the
/// zero sentinel rather than an open-ended duration.
pub fn working_hours_label(
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
) -> String {
    match (check_in, check_out) {
        (Some(start), Some(end)) => format_duration((end - start).num_minutes().max(0)),
        _ => ZERO_LABEL.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct OvertimeShortfall {
    pub overtime_minutes: i64,
    pub shortfall_minutes: i64,
}

/// Overtime is time past the standard shift, shortfall the symmetric gap.
/// At most one of the two is nonzero.
pub fn compute_overtime_and_shortfall(
    working_minutes: i64,
    standard_minutes: i64,
) -> OvertimeShortfall {
    OvertimeShortfall {
        overtime_minutes: (working_minutes - standard_minutes).max(0),
        shortfall_minutes: (standard_minutes - working_minutes).max(0),
    }
}

/// Overtime display: `"-"` when there is none.
pub fn overtime_label(overtime_minutes: i64) -> String {
    if overtime_minutes <= 0 {
        DASH_LABEL.to_string()
    } else {
        format_duration(overtime_minutes)
    }
}

/// Length of the configured shift window in minutes, computed naively from
/// the two times-of-day. An overnight window (end before start) comes out
/// negative; such windows are rejected at employee-configuration time and
/// never reach this function through stored data.
pub fn standard_shift_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let start_min = i64::from(start.hour()) * 60 + i64::from(start.minute());
    let end_min = i64::from(end.hour()) * 60 + i64::from(end.minute());
    end_min - start_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn parses_hours_and_minutes_form() {
        assert_eq!(parse_duration("10h 40m"), Ok(640));
        assert_eq!(parse_duration("8h"), Ok(480));
        assert_eq!(parse_duration("45m"), Ok(45));
        assert_eq!(parse_duration("  7h 5m "), Ok(425));
    }

    #[test]
    fn parses_colon_form() {
        assert_eq!(parse_duration("08:15"), Ok(495));
        assert_eq!(parse_duration("0:00"), Ok(0));
        assert_eq!(parse_duration("12:05"), Ok(725));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "-", "abc", "10", "h m", "10x 40m", "08:xx", "-1:30"] {
            assert!(parse_duration(bad).is_err(), "expected failure for {bad:?}");
        }
    }

    #[test]
    fn format_renders_sentinel_for_zero() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(-30), "0h 0m");
        assert_eq!(format_duration(640), "10h 40m");
    }

    #[test]
    fn round_trips_nonnegative_minutes() {
        for m in [0, 1, 59, 60, 61, 495, 640, 1439, 3000] {
            assert_eq!(parse_duration(&format_duration(m)), Ok(m));
        }
    }

    #[test]
    fn working_hours_label_handles_missing_checkout() {
        assert_eq!(working_hours_label(Some(dt(8, 0)), Some(dt(18, 40))), "10h 40m");
        assert_eq!(working_hours_label(Some(dt(8, 0)), None), ZERO_LABEL);
        assert_eq!(working_hours_label(None, None), ZERO_LABEL);
    }

    #[test]
    fn overtime_and_shortfall_are_exclusive() {
        let over = compute_overtime_and_shortfall(700, 600);
        assert_eq!(over.overtime_minutes, 100);
        assert_eq!(over.shortfall_minutes, 0);

        let short = compute_overtime_and_shortfall(500, 600);
        assert_eq!(short.overtime_minutes, 0);
        assert_eq!(short.shortfall_minutes, 100);

        let even = compute_overtime_and_shortfall(600, 600);
        assert_eq!(even.overtime_minutes, 0);
        assert_eq!(even.shortfall_minutes, 0);
    }

    #[test]
    fn overtime_label_uses_dash_for_zero() {
        assert_eq!(overtime_label(0), DASH_LABEL);
        assert_eq!(overtime_label(90), "1h 30m");
    }

    #[test]
    fn standard_shift_is_naive_difference() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(standard_shift_minutes(t(8, 0), t(17, 0)), 540);
        // overnight window is negative, not clamped
        assert_eq!(standard_shift_minutes(t(22, 0), t(6, 0)), -960);
    }
}
