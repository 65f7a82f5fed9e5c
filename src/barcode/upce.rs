//! UPC-E encoding.
//!
//! Accepted input:
//!
//! | Digits | Meaning |
//! |--------|---------|
//! | 6 | payload, number system 0, check digit computed |
//! | 7 | number system + payload, check digit computed |
//! | 8 | number system + payload + check digit (verified) |
//!
//! The check digit comes from the zero-expanded UPC-A form and selects the
//! odd/even parity pattern of the six payload digits.
//!
//! ```text
//! 101 | d1 d2 d3 d4 d5 d6 (7 modules each) | 010101
//! ```

use super::gtin_check_digit;

const START_GUARD: [u8; 3] = [1, 0, 1];
const END_GUARD: [u8; 6] = [0, 1, 0, 1, 0, 1];

/// Odd parity (set A) digit patterns.
const ODD: [[u8; 7]; 10] = [
    [0, 0, 0, 1, 1, 0, 1],
    [0, 0, 1, 1, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];

/// Even parity (set B) digit patterns.
const EVEN: [[u8; 7]; 10] = [
    [0, 1, 0, 0, 1, 1, 1],
    [0, 1, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1],
    [0, 1, 0, 0, 0, 0, 1],
    [0, 0, 1, 1, 1, 0, 1],
    [0, 1, 1, 1, 0, 0, 1],
    [0, 0, 0, 0, 1, 0, 1],
    [0, 0, 1, 0, 0, 0, 1],
    [0, 0, 0, 1, 0, 0, 1],
    [0, 0, 1, 0, 1, 1, 1],
];

/// Parity per payload digit for number system 0, indexed by check digit.
/// `true` = even parity. Number system 1 inverts every entry.
const PARITY: [[bool; 6]; 10] = [
    [true, true, true, false, false, false],
    [true, true, false, true, false, false],
    [true, true, false, false, true, false],
    [true, true, false, false, false, true],
    [true, false, true, true, false, false],
    [true, false, false, true, true, false],
    [true, false, false, false, true, true],
    [true, false, true, false, true, false],
    [true, false, true, false, false, true],
    [true, false, false, true, false, true],
];

/// Expand number system + six payload digits to the 11-digit UPC-A body.
fn expand(number_system: u8, d: &[u8; 6]) -> [u8; 11] {
    let ns = number_system;
    match d[5] {
        0..=2 => [ns, d[0], d[1], d[5], 0, 0, 0, 0, d[2], d[3], d[4]],
        3 => [ns, d[0], d[1], d[2], 0, 0, 0, 0, 0, d[3], d[4]],
        4 => [ns, d[0], d[1], d[2], d[3], 0, 0, 0, 0, 0, d[4]],
        _ => [ns, d[0], d[1], d[2], d[3], d[4], 0, 0, 0, 0, d[5]],
    }
}

/// Module pattern for a UPC-E value.
pub(super) fn modules(value: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = value
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect::<Option<_>>()
        .ok_or_else(|| "value must contain only digits".to_string())?;

    let (number_system, payload, given_check) = match digits.len() {
        6 => (0, &digits[..], None),
        7 => (digits[0], &digits[1..], None),
        8 => (digits[0], &digits[1..7], Some(digits[7])),
        n => return Err(format!("expected 6, 7 or 8 digits, got {}", n)),
    };
    if number_system > 1 {
        return Err(format!("number system must be 0 or 1, got {}", number_system));
    }

    let mut payload_digits = [0u8; 6];
    payload_digits.copy_from_slice(payload);
    let check = gtin_check_digit(&expand(number_system, &payload_digits));
    if given_check.is_some_and(|c| c != check) {
        return Err("check digit mismatch".to_string());
    }

    let parity = PARITY[check as usize];
    let mut out = Vec::with_capacity(51);
    out.extend_from_slice(&START_GUARD);
    for (i, &d) in payload_digits.iter().enumerate() {
        let even = parity[i] != (number_system == 1);
        let pattern = if even { &EVEN[d as usize] } else { &ODD[d as usize] };
        out.extend_from_slice(pattern);
    }
    out.extend_from_slice(&END_GUARD);
    Ok(out)
}
