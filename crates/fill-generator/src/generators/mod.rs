//! Individual value generators for each type category.
//!
//! This module provides the generation logic for each [`TypeCategory`] and
//! the size of the value space each one can reach, which bounds uniqueness
//! retries.

pub mod choice;
pub mod numeric;
pub mod temporal;
pub mod text;

use crate::policy::GenerationPolicy;
use fill_core::{FieldValue, TypeCategory};
use rand::Rng;

/// Generate one candidate value for a type category.
///
/// Unsupported categories produce [`FieldValue::Null`]; callers omit such
/// columns before getting here.
pub fn generate_value<R: Rng>(
    category: &TypeCategory,
    rng: &mut R,
    policy: &GenerationPolicy,
) -> FieldValue {
    match category {
        TypeCategory::ShortText { max_length } => text::generate_short_text(rng, *max_length),

        TypeCategory::LongText => text::generate_long_text(rng),

        TypeCategory::Integer { min, max } => {
            let (min, max) = numeric::effective_int_range(policy.integer_range, (*min, *max));
            numeric::generate_int_range(rng, min, max)
        }

        TypeCategory::Float => numeric::generate_float(rng),

        TypeCategory::Decimal {
            left_digits,
            right_digits,
        } => numeric::generate_decimal(rng, *left_digits, *right_digits),

        TypeCategory::Date => temporal::generate_date(rng),

        TypeCategory::Time => temporal::generate_time(rng),

        TypeCategory::DateTime => temporal::generate_datetime(rng),

        TypeCategory::Year => temporal::generate_year(rng),

        TypeCategory::Bool => choice::generate_bool(rng),

        TypeCategory::Enumerated { options } => choice::generate_one_of(rng, options),

        TypeCategory::Binary { max_length } => choice::generate_binary(rng, *max_length),

        TypeCategory::Unsupported { .. } => FieldValue::Null,
    }
}

/// Number of distinct values a category can produce, or `None` when the
/// space is too large to matter.
pub fn value_space(category: &TypeCategory, policy: &GenerationPolicy) -> Option<u128> {
    match category {
        TypeCategory::ShortText { max_length } => {
            let cap = (*max_length).min(text::MAX_SHORT_TEXT_LENGTH);
            if cap == 0 {
                return Some(1);
            }
            let alphabet = text::TEXT_ALPHABET.len() as u128;
            let mut total: u128 = 0;
            let mut per_length: u128 = 1;
            for _ in 0..cap {
                per_length = per_length.saturating_mul(alphabet);
                total = total.saturating_add(per_length);
            }
            Some(total)
        }

        TypeCategory::Integer { min, max } => {
            let (min, max) = numeric::effective_int_range(policy.integer_range, (*min, *max));
            Some((max as i128 - min as i128 + 1) as u128)
        }

        TypeCategory::Float => Some(9999),

        TypeCategory::Decimal {
            left_digits,
            right_digits,
        } => {
            let fraction = 10u128.saturating_pow(*right_digits as u32);
            if *left_digits == 0 {
                Some(fraction.saturating_sub(1).max(1))
            } else {
                let integer = 9u128.saturating_mul(10u128.saturating_pow(*left_digits as u32 - 1));
                Some(integer.saturating_mul(fraction))
            }
        }

        TypeCategory::Date => Some(temporal::days_in_range() as u128),

        TypeCategory::Time => Some(86_400),

        TypeCategory::Year => Some((temporal::LAST_YEAR - temporal::FIRST_YEAR + 1) as u128),

        TypeCategory::Bool => Some(2),

        TypeCategory::Enumerated { options } => Some(options.len() as u128),

        TypeCategory::Binary { max_length } => {
            let length = choice::binary_length(*max_length);
            Some(256u128.saturating_pow(length))
        }

        TypeCategory::LongText | TypeCategory::DateTime | TypeCategory::Unsupported { .. } => None,
    }
}
