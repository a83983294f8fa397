//! Rendering of lookup results.
//!
//! Every looked-up address produces exactly one line, echoing the address
//! as the user typed it:
//!
//! ```text
//! 84:7b:eb:dd:ee:ff - Dell Inc.
//! 12:34:56:78:9a:bc - Not found
//! 12:34             - Invalid MAC address
//! ```

use colored::Colorize;
use macvendor_core::Lookup;

/// Width of the address column (a colon-separated MAC).
const ADDRESS_WIDTH: usize = 17;

pub const NOT_FOUND: &str = "Not found";
pub const INVALID: &str = "Invalid MAC address";

/// Human-readable line for one result.
pub fn render(lookup: &Lookup) -> String {
    let status = match lookup {
        Lookup::Found { vendor, .. } => vendor.green().to_string(),
        Lookup::NotFound { .. } => NOT_FOUND.dimmed().to_string(),
        Lookup::Invalid { .. } => INVALID.red().to_string(),
    };
    format!(
        "{:width$} - {}",
        lookup.address(),
        status,
        width = ADDRESS_WIDTH
    )
}

/// One JSON object per result, for scripting.
pub fn render_json(lookup: &Lookup) -> serde_json::Result<String> {
    serde_json::to_string(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_found_pads_address() {
        plain();
        let line = render(&Lookup::Found {
            address: "0011.9343.152e".to_string(),
            vendor: "Cisco Systems, Inc".to_string(),
        });
        assert_eq!(line, "0011.9343.152e    - Cisco Systems, Inc");
    }

    #[test]
    fn test_render_full_width_address() {
        plain();
        let line = render(&Lookup::Found {
            address: "34-E6-D7-80-45-8F".to_string(),
            vendor: "Dell Inc.".to_string(),
        });
        assert_eq!(line, "34-E6-D7-80-45-8F - Dell Inc.");
    }

    #[test]
    fn test_render_not_found_and_invalid() {
        plain();
        let missing = render(&Lookup::NotFound {
            address: "123456".to_string(),
        });
        assert!(missing.ends_with(" - Not found"));

        let invalid = render(&Lookup::Invalid {
            address: "12:34".to_string(),
            reason: "expected 6 to 12 hex digits, found 4".to_string(),
        });
        assert!(invalid.starts_with("12:34 "));
        assert!(invalid.ends_with(" - Invalid MAC address"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&Lookup::Invalid {
            address: "zz".to_string(),
            reason: "bad".to_string(),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "invalid");
        assert_eq!(value["address"], "zz");
        assert_eq!(value["reason"], "bad");
    }
}
