// src/sysfs/attr.rs

//! Text attribute I/O and address parsing.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

/// Read a whole attribute file. Content is returned raw: deciding whether it
/// makes sense is up to the caller, only I/O failures are errors here.
pub fn read_attribute(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Write `value` into an existing attribute with a single write.
/// The file is never created: a missing attribute is an error.
pub fn write_attribute(path: &Path, value: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).open(path)?;
    f.write_all(value.as_bytes())
}

/// Parse an address the way `strtoul(text, &end, 0)` does.
///
/// Leading whitespace is skipped, `0x`/`0X` selects hex, a leading `0`
/// selects octal, anything else is decimal. Only the longest run of valid
/// digits is consumed, so the kernel's trailing newline is fine.
/// Returns `None` when there are no digits or the value overflows `u32`.
pub fn parse_address(text: &str) -> Option<u32> {
    let s = text.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);

    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_hexdigit()) => (16, rest),
        // "0x" without hex digits: strtoul stops after the zero
        Some(_) => return Some(0),
        None if s.starts_with('0') => (8, s),
        None => (10, s),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    u32::from_str_radix(&digits[..end], radix).ok()
}
