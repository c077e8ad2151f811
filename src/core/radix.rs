//! Purpose: Decode digit strings written in bases 2..=36 into exact integers.
//! Exports: `decode`, `digit_value`, `DecodeError`, `MIN_BASE`, `MAX_BASE`.
//! Role: The only arithmetic-bearing step of root decoding; pure and allocation-light.
//! Invariants: Alphabet is `0-9` then `a-z`, case-insensitive, values 0..=35.
//! Invariants: Every digit is checked against the base; nothing is silently coerced.
//! Invariants: Accumulation is arbitrary precision; an empty string decodes to zero.
use std::error::Error as StdError;
use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;

pub const MIN_BASE: u32 = 2;
pub const MAX_BASE: u32 = 36;

const NO_DIGIT: u8 = u8::MAX;

// Indexed by ASCII byte; built at compile time and shared by every decode.
static DIGIT_TABLE: [u8; 256] = build_digit_table();

const fn build_digit_table() -> [u8; 256] {
    let mut table = [NO_DIGIT; 256];
    let mut i = 0;
    while i < 10 {
        table[b'0' as usize + i] = i as u8;
        i += 1;
    }
    let mut i = 0;
    while i < 26 {
        table[b'a' as usize + i] = 10 + i as u8;
        table[b'A' as usize + i] = 10 + i as u8;
        i += 1;
    }
    table
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    BaseOutOfRange {
        base: u32,
    },
    InvalidDigit {
        ch: char,
        position: usize,
        base: u32,
    },
    DigitOutOfRange {
        ch: char,
        digit: u32,
        position: usize,
        base: u32,
    },
}

impl DecodeError {
    /// Character index of the offending digit, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            DecodeError::BaseOutOfRange { .. } => None,
            DecodeError::InvalidDigit { position, .. }
            | DecodeError::DigitOutOfRange { position, .. } => Some(*position),
        }
    }

    pub fn base(&self) -> u32 {
        match self {
            DecodeError::BaseOutOfRange { base }
            | DecodeError::InvalidDigit { base, .. }
            | DecodeError::DigitOutOfRange { base, .. } => *base,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BaseOutOfRange { base } => {
                write!(f, "base {base} is outside {MIN_BASE}..={MAX_BASE}")
            }
            DecodeError::InvalidDigit { ch, position, base } => write!(
                f,
                "character {ch:?} at position {position} is not a base-{base} digit"
            ),
            DecodeError::DigitOutOfRange {
                ch,
                digit,
                position,
                base,
            } => write!(
                f,
                "digit {ch:?} (value {digit}) at position {position} is not valid in base {base}"
            ),
        }
    }
}

impl StdError for DecodeError {}

/// Value of `ch` in the `0-9a-z` alphabet, ignoring case.
pub fn digit_value(ch: char) -> Option<u32> {
    if !ch.is_ascii() {
        return None;
    }
    match DIGIT_TABLE[ch as usize] {
        NO_DIGIT => None,
        digit => Some(u32::from(digit)),
    }
}

/// Interprets `value` as a base-`base` numeral using Horner's rule.
///
/// ```
/// use num_bigint::BigUint;
/// use vieta::core::radix::decode;
///
/// assert_eq!(decode("ff", 16).unwrap(), BigUint::from(255u32));
/// assert_eq!(decode("101", 2).unwrap(), BigUint::from(5u32));
/// ```
pub fn decode(value: &str, base: u32) -> Result<BigUint, DecodeError> {
    if !(MIN_BASE..=MAX_BASE).contains(&base) {
        return Err(DecodeError::BaseOutOfRange { base });
    }

    let mut acc = BigUint::zero();
    for (position, ch) in value.chars().enumerate() {
        let digit = digit_value(ch).ok_or(DecodeError::InvalidDigit { ch, position, base })?;
        if digit >= base {
            return Err(DecodeError::DigitOutOfRange {
                ch,
                digit,
                position,
                base,
            });
        }
        acc *= base;
        acc += digit;
    }
    Ok(acc)
}
