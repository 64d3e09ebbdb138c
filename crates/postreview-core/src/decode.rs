//! Decoding of git's octal-escaped path names.
//!
//! git prints bytes outside printable ASCII as `\ooo` (three octal digits),
//! so `日本.txt` arrives as `\346\227\245\346\234\254.txt`. Consecutive
//! escapes are collected into one byte buffer before UTF-8 decoding because a
//! single character spans several escapes.

use crate::DecodeError;

/// Decode octal-byte escapes in a path token into a literal UTF-8 path.
///
/// A backslash begins an escape only when at least three characters follow
/// it; a shorter tail is copied through unchanged. Escaped byte runs that are
/// not valid UTF-8 decode with replacement characters. A non-octal digit is
/// the only way this fails.
pub fn decode_path(path: &str) -> Result<String, DecodeError> {
    if !path.contains('\\') {
        return Ok(path.to_string());
    }

    let chars: Vec<char> = path.chars().collect();
    let mut output = String::with_capacity(path.len());
    let mut pending: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\\' && i + 3 < chars.len() {
            pending.push(escaped_byte(path, i, &chars[i + 1..i + 4])?);
            i += 4;
        } else {
            flush(&mut pending, &mut output);
            output.push(chars[i]);
            i += 1;
        }
    }
    flush(&mut pending, &mut output);

    Ok(output)
}

fn escaped_byte(path: &str, offset: usize, digits: &[char]) -> Result<u8, DecodeError> {
    let mut value: u32 = 0;
    for &digit in digits {
        let d = digit.to_digit(8).ok_or_else(|| DecodeError::InvalidDigit {
            path: path.to_string(),
            offset,
            digit,
        })?;
        value = value * 8 + d;
    }

    // `\777` and friends keep the low byte
    Ok((value & 0xFF) as u8)
}

fn flush(pending: &mut Vec<u8>, output: &mut String) {
    if !pending.is_empty() {
        output.push_str(&String::from_utf8_lossy(pending));
        pending.clear();
    }
}
