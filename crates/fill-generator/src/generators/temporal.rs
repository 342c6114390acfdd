//! Date and time value generators.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use fill_core::FieldValue;
use rand::Rng;

/// First year of the generated calendar range.
pub const FIRST_YEAR: i32 = 1970;

/// Last year of the generated calendar range (fits a 32-bit TIMESTAMP).
pub const LAST_YEAR: i32 = 2037;

const SECONDS_PER_DAY: u32 = 86_400;

/// January 2nd: TIMESTAMP columns on servers east of UTC reject the first
/// hours of 1970-01-01.
fn range_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 2).unwrap_or(NaiveDate::MIN)
}

fn range_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(LAST_YEAR, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Number of distinct dates in the generated range.
pub fn days_in_range() -> u64 {
    (range_end() - range_start()).num_days() as u64 + 1
}

/// Generate a random date in the calendar range.
pub fn generate_date<R: Rng>(rng: &mut R) -> FieldValue {
    FieldValue::Date(random_date(rng))
}

/// Generate a random time of day with second precision.
pub fn generate_time<R: Rng>(rng: &mut R) -> FieldValue {
    FieldValue::Time(random_time(rng))
}

/// Generate a random date and time with second precision.
pub fn generate_datetime<R: Rng>(rng: &mut R) -> FieldValue {
    FieldValue::DateTime(NaiveDateTime::new(random_date(rng), random_time(rng)))
}

/// Generate a random year in the calendar range.
pub fn generate_year<R: Rng>(rng: &mut R) -> FieldValue {
    FieldValue::Year(rng.gen_range(FIRST_YEAR..=LAST_YEAR))
}

fn random_date<R: Rng>(rng: &mut R) -> NaiveDate {
    let offset = rng.gen_range(0..days_in_range()) as i64;
    range_start() + Duration::days(offset)
}

fn random_time<R: Rng>(rng: &mut R) -> NaiveTime {
    let secs = rng.gen_range(0..SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_date_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            if let FieldValue::Date(d) = generate_date(&mut rng) {
                assert!((FIRST_YEAR..=LAST_YEAR).contains(&d.year()));
            } else {
                panic!("Expected Date value");
            }
        }
    }

    #[test]
    fn test_generate_datetime_second_precision() {
        let mut rng = StdRng::seed_from_u64(42);

        if let FieldValue::DateTime(dt) = generate_datetime(&mut rng) {
            assert!((FIRST_YEAR..=LAST_YEAR).contains(&dt.year()));
            assert_eq!(dt.nanosecond(), 0);
        } else {
            panic!("Expected DateTime value");
        }
    }

    #[test]
    fn test_generate_year() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let value = generate_year(&mut rng);
            let year = value.as_i64().unwrap() as i32;
            assert!((FIRST_YEAR..=LAST_YEAR).contains(&year));
        }
    }

    #[test]
    fn test_days_in_range() {
        // 1970..=2037 spans 68 years, 17 of them leap years, less January 1st
        assert_eq!(days_in_range(), 68 * 365 + 17 - 1);
    }

    #[test]
    fn test_datetimes_skip_first_day_of_epoch() {
        let mut rng = StdRng::seed_from_u64(7);
        let first_day = NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 1).unwrap();

        for _ in 0..5000 {
            let FieldValue::DateTime(dt) = generate_datetime(&mut rng) else {
                panic!("Expected DateTime value");
            };
            assert!(dt.date() > first_day);
        }
        assert_eq!(range_start(), NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 2).unwrap());
    }

    #[test]
    fn test_deterministic_generation() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(generate_time(&mut rng1), generate_time(&mut rng2));
    }
}
