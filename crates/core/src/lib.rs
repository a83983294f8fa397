//! macvendor core
//!
//! Resolve the vendor of a network interface from its MAC address using the
//! IEEE OUI registry, cached locally as a single text file.
//!
//! # Quick Start
//!
//! ```
//! use std::io::Write;
//! use macvendor_core::{Lookup, LookupService};
//!
//! let mut registry = tempfile::NamedTempFile::new().unwrap();
//! writeln!(registry, "847BEB     (base 16)\t\tDell Inc.").unwrap();
//!
//! let service = LookupService::new(registry.path());
//! let result = service.lookup("84:7b:eb:dd:ee:ff").unwrap();
//! assert_eq!(result.vendor(), Some("Dell Inc."));
//!
//! // Unregistered and malformed addresses are different outcomes
//! assert!(matches!(service.lookup("12:34:56").unwrap(), Lookup::NotFound { .. }));
//! assert!(matches!(service.lookup("12:34").unwrap(), Lookup::Invalid { .. }));
//! ```
//!
//! # Keeping the registry current
//!
//! ```no_run
//! use macvendor_core::{RegistryCache, RegistryConfig};
//!
//! let cache = RegistryCache::new(RegistryConfig::default());
//! // Downloads if missing, replaces if the remote size changed,
//! // and falls back to the existing copy when offline.
//! cache.ensure_fresh()?;
//! # Ok::<(), macvendor_core::LookupError>(())
//! ```

pub mod address;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod resolver;

pub use address::{format_display, normalize, MacAddress};
pub use error::{LookupError, Result};
pub use lookup::{get_vendor, Lookup, LookupService};
pub use registry::{Freshness, HttpSource, Platform, RegistryCache, RegistryConfig, RemoteSource};
pub use resolver::{resolve, VendorIndex};
