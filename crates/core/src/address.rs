//! MAC address normalization.
//!
//! Addresses arrive in many notations (`84:7B:EB:DD:EE:FF`,
//! `34-E6-D7-80-45-8F`, `0011.9343.152e`, `00119343152e`). All of them are
//! reduced to a canonical token: uppercase hex digits with no separators.
//! Partial addresses are accepted as long as they carry the full OUI
//! (at least 3 bytes).

use std::fmt;

use crate::error::{LookupError, Result};

/// Characters stripped from input before validation.
pub const SEPARATORS: [char; 3] = [':', '-', '.'];

/// Minimum canonical length (the 24-bit OUI).
pub const MIN_HEX_DIGITS: usize = 6;

/// Maximum canonical length (a full 48-bit address).
pub const MAX_HEX_DIGITS: usize = 12;

/// A validated MAC address (or OUI-bearing prefix of one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacAddress {
    input: String,
    canonical: String,
}

impl MacAddress {
    /// The literal string the caller supplied.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Uppercase hex digits without separators (6 to 12 characters).
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The 6-digit Organizationally Unique Identifier.
    pub fn oui(&self) -> &str {
        &self.canonical[..MIN_HEX_DIGITS]
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_display(&self.canonical))
    }
}

impl std::str::FromStr for MacAddress {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

/// Validate `raw` and reduce it to canonical form.
///
/// Only `:`, `-` and `.` are treated as separators; anything else that is
/// not a hex digit makes the address invalid.
///
/// # Examples
///
/// ```
/// use macvendor_core::normalize;
///
/// let mac = normalize("0011.9343.152e").unwrap();
/// assert_eq!(mac.canonical(), "00119343152E");
/// assert_eq!(mac.oui(), "001193");
///
/// assert!(normalize("00:11").is_err());
/// ```
pub fn normalize(raw: &str) -> Result<MacAddress> {
    let canonical: String = raw
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .collect::<String>()
        .to_uppercase();

    let len = canonical.chars().count();
    if !(MIN_HEX_DIGITS..=MAX_HEX_DIGITS).contains(&len) {
        return Err(LookupError::invalid(
            raw,
            format!(
                "expected {} to {} hex digits, found {}",
                MIN_HEX_DIGITS, MAX_HEX_DIGITS, len
            ),
        ));
    }

    if let Some(bad) = canonical.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(LookupError::invalid(
            raw,
            format!("'{}' is not a hex digit", bad),
        ));
    }

    tracing::trace!("normalized '{}' -> {}", raw, canonical);

    Ok(MacAddress {
        input: raw.to_string(),
        canonical,
    })
}

/// Re-insert `:` every two characters of a canonical token.
///
/// Partial addresses keep a short trailing group: `1234567` → `12:34:56:7`.
#[must_use]
pub fn format_display(canonical: &str) -> String {
    let mut out = String::with_capacity(canonical.len() + canonical.len() / 2);
    for (i, c) in canonical.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(':');
        }
        out.push(c);
    }
    out
}
