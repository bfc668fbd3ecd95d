// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt::Write;

use crate::error::{Error, Result};

/// Renders bytes as uppercase hex pairs separated by `'`, the form used in
/// the JSON rendering of byte columns: `00'0B'C3`.
pub fn format_hex_bytes(bytes: &[u8], prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + bytes.len() * 3);
    out.push_str(prefix);
    for (index, byte) in bytes.iter().enumerate() {
        write!(&mut out, "{byte:02X}").expect("Writing to String cannot fail");
        if index + 1 != bytes.len() {
            out.push('\'');
        }
    }
    out
}

/// Parses the [`format_hex_bytes`] form; `'` separators are optional and may
/// appear anywhere between digit pairs.
pub fn parse_hex_bytes(text: &str, prefix: &str) -> Result<Vec<u8>> {
    let text = text.strip_prefix(prefix).ok_or_else(|| {
        Error::invalid_format(format!("prefix \"{prefix}\" not found"))
    })?;

    let mut bytes = Vec::with_capacity(text.len() / 2);
    let mut chars = text.chars().filter(|&c| c != '\'');
    while let Some(high) = chars.next() {
        let low = chars.next().ok_or_else(|| {
            Error::invalid_format("bytes must have an even number of hexadecimal digits")
        })?;
        let high = high.to_digit(16);
        let low = low.to_digit(16);
        match (high, low) {
            (Some(high), Some(low)) => bytes.push((high << 4 | low) as u8),
            _ => {
                return Err(Error::invalid_format("invalid character in byte data"));
            },
        }
    }
    Ok(bytes)
}
