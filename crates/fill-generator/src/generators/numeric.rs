//! Numeric value generators.

use fill_core::FieldValue;
use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> FieldValue {
    FieldValue::Int(rng.gen_range(min..=max))
}

/// Intersect the policy range with a column's storage range.
///
/// Falls back to the storage range when the two do not overlap.
pub fn effective_int_range(policy: (i64, i64), storage: (i64, i64)) -> (i64, i64) {
    let min = policy.0.max(storage.0);
    let max = policy.1.min(storage.1);
    if min <= max {
        (min, max)
    } else {
        storage
    }
}

/// Generate a positive float with two digits on each side of the point.
///
/// Values fall in `0.01..=99.99` and carry at most two fractional digits.
pub fn generate_float<R: Rng>(rng: &mut R) -> FieldValue {
    let hundredths: u32 = rng.gen_range(1..=9999);
    FieldValue::Float(hundredths as f64 / 100.0)
}

/// Generate a positive decimal with exactly `left_digits` integer digits
/// and `right_digits` fractional digits.
///
/// With no integer digits the value renders as `0.xx`.
pub fn generate_decimal<R: Rng>(rng: &mut R, left_digits: u8, right_digits: u8) -> FieldValue {
    let mut value = if left_digits == 0 {
        "0".to_string()
    } else {
        generate_random_digits(rng, left_digits as usize)
    };

    if right_digits > 0 {
        value.push('.');
        for _ in 0..right_digits {
            value.push(random_digit(rng, 0));
        }
        // 0.000 is not positive
        if left_digits == 0 && value.bytes().all(|b| b == b'0' || b == b'.') {
            value.pop();
            value.push(random_digit(rng, 1));
        }
    }

    FieldValue::Decimal(value)
}

/// Generate a random number with exactly N digits (no leading zero).
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    if digits == 0 {
        return String::new();
    }

    let mut result = String::with_capacity(digits);

    // First digit should be 1-9 to avoid leading zeros
    result.push(random_digit(rng, 1));

    for _ in 1..digits {
        result.push(random_digit(rng, 0));
    }

    result
}

fn random_digit<R: Rng>(rng: &mut R, low: u8) -> char {
    (b'0' + rng.gen_range(low..10)) as char
}
