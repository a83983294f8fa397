//! Address-to-vendor lookup.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::address::{normalize, MacAddress};
use crate::error::{LookupError, Result};
use crate::resolver::{self, VendorIndex};

/// Result of looking up one address.
///
/// A malformed address and an unregistered one are separate variants so
/// callers cannot mistake one for the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup {
    /// The OUI is registered to `vendor`.
    Found { address: String, vendor: String },
    /// Well-formed address, but no registry entry for its OUI.
    NotFound { address: String },
    /// The input is not a MAC address.
    Invalid { address: String, reason: String },
}

impl Lookup {
    /// The address exactly as the caller wrote it.
    pub fn address(&self) -> &str {
        match self {
            Self::Found { address, .. }
            | Self::NotFound { address }
            | Self::Invalid { address, .. } => address,
        }
    }

    pub fn vendor(&self) -> Option<&str> {
        match self {
            Self::Found { vendor, .. } => Some(vendor),
            _ => None,
        }
    }
}

/// Resolves addresses against one registry file.
///
/// # Examples
///
/// ```no_run
/// use macvendor_core::{Lookup, LookupService};
///
/// let service = LookupService::new("/home/ada/.oui.txt");
/// match service.lookup("84:7b:eb:dd:ee:ff")? {
///     Lookup::Found { vendor, .. } => println!("{}", vendor),
///     Lookup::NotFound { .. } => println!("unregistered"),
///     Lookup::Invalid { reason, .. } => println!("bad input: {}", reason),
/// }
/// # Ok::<(), macvendor_core::LookupError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LookupService {
    registry: PathBuf,
    index: Option<VendorIndex>,
}

impl LookupService {
    /// Scan `registry` on every lookup.
    pub fn new(registry: impl Into<PathBuf>) -> Self {
        Self {
            registry: registry.into(),
            index: None,
        }
    }

    /// Read `registry` once into memory and answer lookups from the index.
    pub fn indexed(registry: impl Into<PathBuf>) -> Result<Self> {
        let registry = registry.into();
        let index = VendorIndex::load(&registry)?;
        Ok(Self::new(registry).with_index(index))
    }

    /// Answer lookups from `index` instead of rescanning the registry file.
    #[must_use]
    pub fn with_index(mut self, index: VendorIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn registry(&self) -> &Path {
        &self.registry
    }

    /// Look up one address, reporting malformed input as [`Lookup::Invalid`].
    ///
    /// Only registry I/O failures are returned as errors.
    pub fn lookup(&self, raw: &str) -> Result<Lookup> {
        let mac = match normalize(raw) {
            Ok(mac) => mac,
            Err(LookupError::InvalidAddress { reason, .. }) => {
                return Ok(Lookup::Invalid {
                    address: raw.to_string(),
                    reason,
                })
            }
            Err(e) => return Err(e),
        };

        let address = mac.input().to_string();
        Ok(match self.resolve(&mac)? {
            Some(vendor) => Lookup::Found { address, vendor },
            None => Lookup::NotFound { address },
        })
    }

    /// Vendor for one address; malformed input is an error.
    pub fn get_vendor(&self, raw: &str) -> Result<Option<String>> {
        let mac = normalize(raw)?;
        self.resolve(&mac)
    }

    fn resolve(&self, mac: &MacAddress) -> Result<Option<String>> {
        match &self.index {
            Some(index) => Ok(index.get(mac.canonical())?.map(str::to_string)),
            None => resolver::resolve(mac.canonical(), &self.registry),
        }
    }
}

/// One-shot lookup against the registry at `registry`.
///
/// Returns `Ok(None)` for a well-formed address with no registry entry and
/// [`LookupError::InvalidAddress`] for malformed input.
pub fn get_vendor(address: &str, registry: &Path) -> Result<Option<String>> {
    LookupService::new(registry).get_vendor(address)
}
