//! Boolean, enumerated and binary value generators.

use fill_core::FieldValue;
use rand::Rng;

/// Default length of generated binary values.
pub const BINARY_LENGTH: u32 = 10;

/// Generate a fair random boolean.
pub fn generate_bool<R: Rng>(rng: &mut R) -> FieldValue {
    FieldValue::Bool(rng.gen_bool(0.5))
}

/// Pick one option uniformly; null when there is nothing to pick.
pub fn generate_one_of<R: Rng>(rng: &mut R, options: &[String]) -> FieldValue {
    if options.is_empty() {
        FieldValue::Null
    } else {
        let idx = rng.gen_range(0..options.len());
        FieldValue::Text(options[idx].clone())
    }
}

/// Length of generated binary values for a column.
pub fn binary_length(max_length: Option<u32>) -> u32 {
    max_length.map_or(BINARY_LENGTH, |max| max.min(BINARY_LENGTH))
}

/// Generate random bytes, ten unless the column is narrower.
pub fn generate_binary<R: Rng>(rng: &mut R, max_length: Option<u32>) -> FieldValue {
    let mut bytes = vec![0u8; binary_length(max_length) as usize];
    rng.fill(bytes.as_mut_slice());
    FieldValue::Bytes(bytes)
}
