use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::error::{GribError, Result};

/// Advances a GRIB reference time (`time` is HHMM) by `amount` forecast
/// units, rolling days, months and leap years the Gregorian way.
/// Units follow GRIB code table 4: 0 = minutes, 1 = hours, 2 = days.
pub fn add_duration(yr: i32, mo: u32, dy: u32, time: u32, amount: i64, units: u8) -> Result<(i32, u32, u32, u32)> {
    let start = NaiveDate::from_ymd_opt(yr, mo, dy)
        .and_then(|d| d.and_hms_opt(time / 100, time % 100, 0))
        .ok_or_else(|| GribError::InvariantViolation(format!("bad reference time {:04}-{:02}-{:02} {:04}", yr, mo, dy, time)))?;
    let span = match units {
        0 => Duration::minutes(amount),
        1 => Duration::hours(amount),
        2 => Duration::days(amount),
        n => {
            return Err(GribError::UnmappedProcess(format!("cannot add time for unit {}", n)));
        }
    };
    let end = start + span;
    Ok((end.year(), end.month(), end.day(), end.hour() * 100 + end.minute()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_over_a_month_boundary() {
        // reference 2023-01-31T18:00 + 6h => end 2023-02-01T00:00
        let (yr, mo, dy, time) = add_duration(2023, 1, 31, 1800, 6, 1).unwrap();
        assert_eq!((yr, mo, dy, time), (2023, 2, 1, 0));
    }

    #[test]
    fn respects_leap_years() {
        let (yr, mo, dy, _) = add_duration(2024, 2, 28, 0, 1, 2).unwrap();
        assert_eq!((yr, mo, dy), (2024, 2, 29));
        let (yr, mo, dy, _) = add_duration(2023, 2, 28, 0, 1, 2).unwrap();
        assert_eq!((yr, mo, dy), (2023, 3, 1));
        // 1900 was not a leap year, 2000 was
        let (yr, mo, dy, _) = add_duration(1900, 2, 28, 0, 24, 1).unwrap();
        assert_eq!((yr, mo, dy), (1900, 3, 1));
        let (yr, mo, dy, _) = add_duration(2000, 2, 28, 0, 24, 1).unwrap();
        assert_eq!((yr, mo, dy), (2000, 2, 29));
    }

    #[test]
    fn minutes_accumulate_into_hours() {
        let (_, _, _, time) = add_duration(2023, 6, 15, 2345, 30, 0).unwrap();
        assert_eq!(time, 15);
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(add_duration(2023, 1, 1, 0, 1, 7).is_err());
    }
}
