//! http status codes that have a cat picture, and how user input maps onto them.

use std::num::IntErrorKind;

use rand::Rng;

/// returned when no code was given at all
pub const MISSING: u16 = 400;
/// returned for a well-formed number without a cat
pub const NOT_FOUND: u16 = 404;
/// returned when the input isn't a number
pub const UNPARSEABLE: u16 = 422;

#[rustfmt::skip]
pub const VALID_CODES: [u16; 62] = [
    100, 101, 102, 200, 201, 202, 203, 204,
    206, 207, 300, 301, 302, 303, 304, 305,
    307, 308, 400, 401, 402, 403, 404, 405,
    406, 407, 408, 409, 410, 411, 412, 413,
    414, 415, 416, 417, 418, 420, 421, 422,
    423, 424, 425, 426, 429, 431, 444, 450,
    451, 499, 500, 501, 502, 503, 504, 506,
    507, 508, 509, 510, 511, 599,
];

/// What a user may hand to [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeInput<'a> {
    Number(i64),
    Text(&'a str),
}

impl From<i64> for CodeInput<'_> {
    fn from(n: i64) -> Self {
        CodeInput::Number(n)
    }
}

impl From<u16> for CodeInput<'_> {
    fn from(n: u16) -> Self {
        CodeInput::Number(n.into())
    }
}

impl<'a> From<&'a str> for CodeInput<'a> {
    fn from(s: &'a str) -> Self {
        CodeInput::Text(s)
    }
}

impl<'a> From<&'a String> for CodeInput<'a> {
    fn from(s: &'a String) -> Self {
        CodeInput::Text(s.as_str())
    }
}

/// true if there's a cat for this code
pub fn is_valid(code: i64) -> bool {
    VALID_CODES.iter().any(|&c| i64::from(c) == code)
}

/// Maps user input onto a status code. Never fails: bad input becomes
/// [`MISSING`], [`UNPARSEABLE`] or [`NOT_FOUND`].
pub fn resolve(input: Option<CodeInput<'_>>) -> u16 {
    let number = match input {
        None => return MISSING,
        Some(CodeInput::Number(n)) => n,
        Some(CodeInput::Text(text)) => match parse_integer(text) {
            Ok(n) => n,
            // still an integer, just not one we could ever have a cat for
            Err(IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => return NOT_FOUND,
            Err(_) => return UNPARSEABLE,
        },
    };

    if is_valid(number) {
        number as u16
    } else {
        NOT_FOUND
    }
}

fn parse_integer(text: &str) -> Result<i64, IntErrorKind> {
    let digits = without_separators(text.trim()).ok_or(IntErrorKind::InvalidDigit)?;
    digits.parse::<i64>().map_err(|e| e.kind().clone())
}

/// Drops `_` digit separators (`4_04`). Each one must sit between two digits.
fn without_separators(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'_' {
            continue;
        }
        let before = i > 0 && bytes[i - 1].is_ascii_digit();
        let after = bytes.get(i + 1).map_or(false, |c| c.is_ascii_digit());
        if !(before && after) {
            return None;
        }
    }
    Some(text.replace('_', ""))
}

/// Picks any code with a cat, uniformly.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    VALID_CODES[rng.gen_range(0..VALID_CODES.len())]
}

pub fn cat_url(code: u16) -> String {
    format!("https://http.cat/{}.jpg", code)
}
