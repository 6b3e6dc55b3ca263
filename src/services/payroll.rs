//! Timesheet arithmetic: payable minutes and payment amounts.

use chrono::{DateTime, Utc};

/// Longest span a single timesheet may cover.
pub const MAX_SPAN_MINUTES: i64 = 24 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error("clock-out must be after clock-in")]
    NonPositiveSpan,

    #[error("timesheet spans {0} minutes, more than 24 hours")]
    SpanTooLong(i64),

    #[error("break minutes must not be negative")]
    NegativeBreak,

    #[error("break of {break_minutes} minutes leaves nothing payable in a {span} minute span")]
    BreakTooLong { break_minutes: i64, span: i64 },
}

/// Minutes worked between clock-in and clock-out, less the unpaid break.
pub fn payable_minutes(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    break_minutes: i64,
) -> Result<i64, PayrollError> {
    let span = clock_out.signed_duration_since(clock_in).num_minutes();

    if clock_out <= clock_in || span <= 0 {
        return Err(PayrollError::NonPositiveSpan);
    }
    if span > MAX_SPAN_MINUTES {
        return Err(PayrollError::SpanTooLong(span));
    }
    if break_minutes < 0 {
        return Err(PayrollError::NegativeBreak);
    }
    if break_minutes >= span {
        return Err(PayrollError::BreakTooLong { break_minutes, span });
    }

    Ok(span - break_minutes)
}

/// Amount owed for `minutes` at `hourly_rate_cents`, rounded half-up to the cent.
pub fn amount_cents(minutes: i64, hourly_rate_cents: i64) -> i64 {
    let numerator = i128::from(minutes) * i128::from(hourly_rate_cents);
    ((numerator + 30) / 60) as i64
}

/// Render cents as a plain decimal string, e.g. `1250` -> `"12.50"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_payable_minutes_subtracts_break() {
        assert_eq!(payable_minutes(at(9, 0), at(17, 0), 30), Ok(450));
        assert_eq!(payable_minutes(at(9, 0), at(9, 1), 0), Ok(1));
    }

    #[test]
    fn test_payable_minutes_overnight() {
        let clock_in = at(22, 0);
        let clock_out = clock_in + Duration::hours(8);
        assert_eq!(payable_minutes(clock_in, clock_out, 0), Ok(480));
    }

    #[test]
    fn test_payable_minutes_rejects_bad_spans() {
        assert_eq!(
            payable_minutes(at(17, 0), at(9, 0), 0),
            Err(PayrollError::NonPositiveSpan)
        );
        assert_eq!(
            payable_minutes(at(9, 0), at(9, 0), 0),
            Err(PayrollError::NonPositiveSpan)
        );

        let start = at(8, 0);
        assert_eq!(
            payable_minutes(start, start + Duration::hours(25), 0),
            Err(PayrollError::SpanTooLong(1500))
        );
    }

    #[test]
    fn test_payable_minutes_rejects_bad_breaks() {
        assert_eq!(
            payable_minutes(at(9, 0), at(10, 0), -5),
            Err(PayrollError::NegativeBreak)
        );
        assert_eq!(
            payable_minutes(at(9, 0), at(10, 0), 60),
            Err(PayrollError::BreakTooLong {
                break_minutes: 60,
                span: 60
            })
        );
    }

    #[test]
    fn test_amount_rounding() {
        // 7.5h at 18.00/h
        assert_eq!(amount_cents(450, 1800), 13_500);
        // 1 min at 10.00/h = 16.666.. cents -> 17
        assert_eq!(amount_cents(1, 1000), 17);
        // 1 min at 9.00/h = 15 cents exactly
        assert_eq!(amount_cents(1, 900), 15);
        // 1 min at 0.30/h = 0.5 cents -> rounds up
        assert_eq!(amount_cents(1, 30), 1);
        assert_eq!(amount_cents(1, 29), 0);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(13_500), "135.00");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-1250), "-12.50");
    }
}
