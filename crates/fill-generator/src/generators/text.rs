//! Text value generators.

use fill_core::FieldValue;
use rand::Rng;

/// Characters drawn for bounded text.
///
/// Single case only: MySQL's default `_ci` collations compare `a` and `A`
/// as equal in unique indexes, so values that differ only in case would be
/// rejected at insert.
pub const TEXT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Longest bounded string ever produced, whatever the declared length.
pub const MAX_SHORT_TEXT_LENGTH: u32 = 255;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum",
];

/// Generate a random lowercase ASCII-letter string no longer than `max_length`.
///
/// The length is uniform in `1..=min(max_length, 255)`; a zero maximum
/// yields the empty string.
pub fn generate_short_text<R: Rng>(rng: &mut R, max_length: u32) -> FieldValue {
    let cap = max_length.min(MAX_SHORT_TEXT_LENGTH);
    if cap == 0 {
        return FieldValue::Text(String::new());
    }

    let length = rng.gen_range(1..=cap) as usize;
    let text: String = (0..length)
        .map(|_| TEXT_ALPHABET[rng.gen_range(0..TEXT_ALPHABET.len())] as char)
        .collect();
    FieldValue::Text(text)
}

/// Generate a paragraph of 3-6 lorem-style sentences.
pub fn generate_long_text<R: Rng>(rng: &mut R) -> FieldValue {
    let sentences = rng.gen_range(3..=6);
    let mut paragraph = String::new();

    for i in 0..sentences {
        if i > 0 {
            paragraph.push(' ');
        }
        let words = rng.gen_range(4..=12);
        for w in 0..words {
            let word = WORDS[rng.gen_range(0..WORDS.len())];
            if w == 0 {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    paragraph.extend(first.to_uppercase());
                    paragraph.push_str(chars.as_str());
                }
            } else {
                paragraph.push(' ');
                paragraph.push_str(word);
            }
        }
        paragraph.push('.');
    }

    FieldValue::Text(paragraph)
}
