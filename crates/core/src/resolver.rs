//! Vendor resolution against a local OUI registry file.
//!
//! The registry is the plain-text export published by the IEEE. Each
//! assignment appears as a block; the line we care about starts with the
//! six-digit prefix and ends with the organization name after a tab:
//!
//! ```text
//! 84-7B-EB   (hex)		Dell Inc.
//! 847BEB     (base 16)		Dell Inc.
//! ```
//!
//! Matching is anchored at the start of the line so that hex-looking text
//! inside vendor names or street addresses never produces a hit. The first
//! matching line wins.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::address::MIN_HEX_DIGITS;
use crate::error::{LookupError, Result};

/// Scan the registry at `path` for the OUI of `canonical`.
///
/// Returns `Ok(None)` when no line carries the prefix. Each call rescans
/// from the start of the file.
pub fn resolve(canonical: &str, path: &Path) -> Result<Option<String>> {
    let prefix = oui_prefix(canonical)?;
    let file = File::open(path).map_err(|e| LookupError::io(path, e))?;

    let found = scan(BufReader::new(file), prefix).map_err(|e| LookupError::io(path, e))?;
    match &found {
        Some(vendor) => tracing::debug!("{} -> {}", prefix, vendor),
        None => tracing::debug!("{} not in {}", prefix, path.display()),
    }
    Ok(found)
}

/// Line-by-line scan over any buffered reader.
///
/// Lines are read as bytes so a stray non-UTF-8 byte elsewhere in the
/// registry does not abort the search.
pub fn scan<R: BufRead>(mut reader: R, prefix: &str) -> io::Result<Option<String>> {
    let mut line = Vec::with_capacity(128);
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        if line.starts_with(prefix.as_bytes()) {
            return Ok(Some(vendor_field(&String::from_utf8_lossy(&line))));
        }
    }
}

/// Extract the organization name: the last tab-separated field.
fn vendor_field(line: &str) -> String {
    let line = line.trim();
    line.rsplit('\t').next().unwrap_or(line).trim().to_string()
}

fn oui_prefix(canonical: &str) -> Result<&str> {
    canonical
        .get(..MIN_HEX_DIGITS)
        .ok_or_else(|| LookupError::invalid(canonical, "too short to contain an OUI"))
}

/// In-memory prefix index built from one pass over the registry.
///
/// Gives the same answers as [`resolve`] for every canonical address,
/// including first-match-wins for duplicated prefixes, without rescanning
/// the file per lookup.
#[derive(Debug, Clone, Default)]
pub struct VendorIndex {
    vendors: HashMap<String, String>,
}

impl VendorIndex {
    /// Build the index from a registry file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LookupError::io(path, e))?;
        let index = Self::from_reader(BufReader::new(file)).map_err(|e| LookupError::io(path, e))?;
        tracing::debug!("indexed {} prefixes from {}", index.len(), path.display());
        Ok(index)
    }

    /// Build the index from any buffered reader.
    pub fn from_reader<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut vendors = HashMap::new();
        let mut line = Vec::with_capacity(128);
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            // Only lines a canonical prefix could match: six uppercase hex digits
            let Some(head) = line.get(..MIN_HEX_DIGITS) else {
                continue;
            };
            if !head.iter().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F')) {
                continue;
            }
            let prefix = String::from_utf8_lossy(head).into_owned();
            vendors
                .entry(prefix)
                .or_insert_with(|| vendor_field(&String::from_utf8_lossy(&line)));
        }
        Ok(Self { vendors })
    }

    /// Look up the vendor for a canonical address.
    pub fn get(&self, canonical: &str) -> Result<Option<&str>> {
        let prefix = oui_prefix(canonical)?;
        Ok(self.vendors.get(prefix).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const REGISTRY: &str = "OUI/MA-L\t\t\t\tOrganization\n\
company_id\t\t\t\tOrganization\n\
\t\t\t\tAddress\n\
\n\
84-7B-EB   (hex)\t\tDell Inc.\n\
847BEB     (base 16)\t\tDell Inc.\n\
\t\t\t\tOne Dell Way\n\
\t\t\t\tRound Rock  TX  78682\n\
\t\t\t\tUS\n\
\n\
34-E6-D7   (hex)\t\tDell Inc.\n\
34E6D7     (base 16)\t\tDell Inc.\n\
\t\t\t\tSuite 00ABCD\n\
\n\
00-11-93   (hex)\t\tCisco Systems, Inc\n\
001193     (base 16)\t\tCisco Systems, Inc\r\n\
\t\t\t\t80 West Tasman Drive\n\
\n\
AABBCC     (base 16)\t\tFirst Owner\n\
AABBCC     (base 16)\t\tSecond Owner\n";

    fn registry_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_resolve_dell() {
        let file = registry_file(REGISTRY);
        let vendor = resolve("847BEBDDEEFF", file.path()).unwrap();
        assert_eq!(vendor.as_deref(), Some("Dell Inc."));
    }

    #[test]
    fn test_resolve_strips_crlf() {
        let file = registry_file(REGISTRY);
        let vendor = resolve("00119343152E", file.path()).unwrap();
        assert_eq!(vendor.as_deref(), Some("Cisco Systems, Inc"));
    }

    #[test]
    fn test_resolve_uses_only_oui() {
        let file = registry_file(REGISTRY);
        assert_eq!(
            resolve("34E6D7", file.path()).unwrap(),
            resolve("34E6D780458F", file.path()).unwrap()
        );
    }

    #[test]
    fn test_not_found_is_none() {
        let file = registry_file(REGISTRY);
        assert_eq!(resolve("123456789ABC", file.path()).unwrap(), None);
    }

    #[test]
    fn test_prefix_must_anchor_line() {
        // "00ABCD" only appears inside a street address line
        let file = registry_file(REGISTRY);
        assert_eq!(resolve("00ABCD000000", file.path()).unwrap(), None);
    }

    #[test]
    fn test_first_match_wins() {
        let file = registry_file(REGISTRY);
        assert_eq!(
            resolve("AABBCC112233", file.path()).unwrap().as_deref(),
            Some("First Owner")
        );
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let file = registry_file(REGISTRY);
        let first = resolve("847BEB", file.path()).unwrap();
        let second = resolve("847BEB", file.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_registry_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve("847BEB", &dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, LookupError::Io { .. }));
    }

    #[test]
    fn test_short_canonical_is_rejected() {
        let file = registry_file(REGISTRY);
        let err = resolve("847BE", file.path()).unwrap_err();
        assert!(matches!(err, LookupError::InvalidAddress { .. }));
    }

    #[test]
    fn test_scan_tolerates_invalid_utf8() {
        let mut data = b"FFFFFF\t\t\xff\xfe broken\n".to_vec();
        data.extend_from_slice(b"847BEB     (base 16)\t\tDell Inc.\n");
        let vendor = scan(Cursor::new(data), "847BEB").unwrap();
        assert_eq!(vendor.as_deref(), Some("Dell Inc."));
    }

    #[test]
    fn test_vendor_field_trailing_tab() {
        assert_eq!(vendor_field("847BEB (base 16)\t\tDell Inc.\t\n"), "Dell Inc.");
        assert_eq!(vendor_field("847BEB no tabs here"), "847BEB no tabs here");
    }

    #[test]
    fn test_index_matches_scan() {
        let file = registry_file(REGISTRY);
        let index = VendorIndex::load(file.path()).unwrap();

        for canonical in [
            "847BEBDDEEFF",
            "34E6D780458F",
            "00119343152E",
            "AABBCC112233",
            "00ABCD000000",
            "123456",
        ] {
            let scanned = resolve(canonical, file.path()).unwrap();
            let indexed = index.get(canonical).unwrap().map(str::to_string);
            assert_eq!(indexed, scanned, "canonical {}", canonical);
        }
    }

    #[test]
    fn test_index_skips_non_prefix_lines() {
        let index = VendorIndex::from_reader(Cursor::new(REGISTRY)).unwrap();
        // 847BEB, 34E6D7, 001193, AABBCC
        assert_eq!(index.len(), 4);
        assert!(!index.is_empty());
    }
}
