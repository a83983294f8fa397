//! Local cache of the IEEE OUI registry.
//!
//! The registry is a single text file mirrored from a remote URL. It is
//! never edited in place: a fetch streams into a uniquely named
//! `<file>XXXXXX.part` next to the target and renames it over the old copy
//! once the transfer is complete, so readers only ever see a whole file and
//! concurrent fetches never share a temporary.
//!
//! Freshness is judged by size alone. If the remote `Content-Length`
//! differs from the local file size, the local copy is replaced.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LookupError, Result};

/// Library version, sent in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where the IEEE publishes the MA-L registry.
pub const DEFAULT_URL: &str = "http://standards-oui.ieee.org/oui.txt";

/// File name of the cached registry inside the home directory.
pub const DEFAULT_FILE_NAME: &str = ".oui.txt";

/// Connect timeout, and the limit on each socket read, for registry requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read buffer size while streaming the registry to disk.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Platform family, used only to choose the default registry location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux, macOS and other Unix-likes.
    Unix,
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    pub fn separator(self) -> char {
        match self {
            Self::Unix => '/',
            Self::Windows => '\\',
        }
    }
}

/// Default registry path for `platform` under the given home directory.
///
/// Non-UTF-8 home directories are kept byte for byte.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use macvendor_core::registry::{default_registry_path, Platform};
///
/// assert_eq!(
///     default_registry_path(Platform::Unix, Path::new("/home/ada")),
///     PathBuf::from("/home/ada/.oui.txt")
/// );
/// assert_eq!(
///     default_registry_path(Platform::Windows, Path::new(r"C:\Users\ada")),
///     PathBuf::from(r"C:\Users\ada\.oui.txt")
/// );
/// ```
#[must_use]
pub fn default_registry_path(platform: Platform, home: &Path) -> PathBuf {
    let sep = platform.separator();
    let mut path = home.as_os_str().to_os_string();
    if !home.as_os_str().as_encoded_bytes().ends_with(&[sep as u8]) {
        path.push(sep.to_string());
    }
    path.push(DEFAULT_FILE_NAME);
    PathBuf::from(path)
}

/// Settings for a [`RegistryCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Remote registry URL.
    pub url: String,
    /// Local cache file.
    pub path: PathBuf,
    /// Connect timeout and per-read timeout for network requests. A slow
    /// download that keeps making progress is never cut off.
    pub timeout: Duration,
    /// Buffer size used while streaming the download.
    pub chunk_size: usize,
}

impl RegistryConfig {
    /// Defaults with a different cache location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for RegistryConfig {
    /// `~/.oui.txt` for the current platform; falls back to the working
    /// directory if no home directory is known.
    fn default() -> Self {
        let path = match dirs::home_dir() {
            Some(home) => default_registry_path(Platform::current(), &home),
            None => PathBuf::from(DEFAULT_FILE_NAME),
        };

        Self {
            url: DEFAULT_URL.to_string(),
            path,
            timeout: DEFAULT_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Where registry bytes come from.
pub trait RemoteSource {
    /// Declared size of the remote registry, without downloading it.
    fn content_length(&self) -> Result<u64>;

    /// Open the remote registry for streaming.
    fn open(&self) -> Result<Box<dyn Read>>;
}

/// Registry served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    /// `timeout` bounds connecting and each individual read, not the whole
    /// transfer.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(&format!("macvendor/{}", VERSION))
            .build();
        Self {
            url: url.into(),
            agent,
        }
    }

    fn request(&self, method: &str) -> Result<ureq::Response> {
        self.agent
            .request(method, &self.url)
            .call()
            .map_err(|e| LookupError::Network(format!("{} {}: {}", method, self.url, e)))
    }
}

impl RemoteSource for HttpSource {
    fn content_length(&self) -> Result<u64> {
        let response = self.request("HEAD")?;
        let header = response.header("Content-Length").ok_or_else(|| {
            LookupError::Network(format!("{} did not report a Content-Length", self.url))
        })?;
        header.trim().parse().map_err(|_| {
            LookupError::Network(format!("{} sent a bad Content-Length: {}", self.url, header))
        })
    }

    fn open(&self) -> Result<Box<dyn Read>> {
        let response = self.request("GET")?;
        Ok(Box::new(response.into_reader()))
    }
}

/// Outcome of [`RegistryCache::ensure_fresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Local size matches the remote size.
    Current,
    /// There was no local copy; one was downloaded.
    Downloaded { bytes: u64 },
    /// The local copy differed in size and was replaced.
    Updated { bytes: u64 },
    /// The remote could not be reached; the existing copy is used as is.
    Offline,
    /// A newer copy exists but could not be downloaded; the existing copy
    /// is used as is.
    Stale { reason: String },
}

/// Manages the on-disk registry file.
pub struct RegistryCache<S = HttpSource> {
    config: RegistryConfig,
    source: S,
}

impl RegistryCache<HttpSource> {
    /// Cache backed by HTTP downloads from `config.url`.
    pub fn new(config: RegistryConfig) -> Self {
        let source = HttpSource::new(config.url.clone(), config.timeout);
        Self { config, source }
    }
}

impl<S: RemoteSource> RegistryCache<S> {
    /// Cache backed by an arbitrary source.
    pub fn with_source(config: RegistryConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Path of the local registry file.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Whether a local copy is present.
    pub fn exists(&self) -> bool {
        self.config.path.is_file()
    }

    /// Size in bytes of the local copy.
    pub fn local_size(&self) -> Result<u64> {
        fs::metadata(&self.config.path)
            .map(|m| m.len())
            .map_err(|e| LookupError::io(&self.config.path, e))
    }

    /// Size in bytes the remote declares, without downloading.
    pub fn remote_size(&self) -> Result<u64> {
        self.source.content_length()
    }

    /// Download the remote registry, replacing any local copy.
    ///
    /// Returns the number of bytes written. On failure the previous file,
    /// if any, is left untouched.
    pub fn fetch(&self) -> Result<u64> {
        let path = &self.config.path;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| LookupError::io(dir, e))?;

        let reader = self.source.open()?;

        // Dropped (and deleted) on any early return
        let mut partial = tempfile::Builder::new()
            .prefix(path.file_name().unwrap_or(OsStr::new(DEFAULT_FILE_NAME)))
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| LookupError::io(dir, e))?;
        let partial_path = partial.path().to_path_buf();
        tracing::debug!("downloading {} to {}", self.config.url, partial_path.display());

        let bytes = copy_chunked(reader, partial.as_file_mut(), &partial_path, self.config.chunk_size)?;
        partial
            .persist(path)
            .map_err(|e| LookupError::io(path, e.error))?;

        tracing::debug!("wrote {} bytes to {}", bytes, path.display());
        Ok(bytes)
    }

    /// Unconditionally replace the local copy.
    pub fn refresh(&self) -> Result<u64> {
        self.fetch()
    }

    /// Make sure a usable registry exists, updating it if the remote
    /// size differs.
    ///
    /// Only fails when there is no local copy and none can be downloaded.
    /// A network failure with a local copy present is not an error.
    pub fn ensure_fresh(&self) -> Result<Freshness> {
        let remote = match self.remote_size() {
            Ok(size) => Some(size),
            Err(e) => {
                tracing::warn!("cannot check registry freshness: {}", e);
                None
            }
        };

        if !self.exists() {
            return match remote {
                Some(_) => {
                    let bytes = self.fetch()?;
                    Ok(Freshness::Downloaded { bytes })
                }
                None => Err(LookupError::Unavailable {
                    path: self.config.path.clone(),
                }),
            };
        }

        let Some(remote) = remote else {
            return Ok(Freshness::Offline);
        };

        let local = self.local_size()?;
        tracing::debug!("registry size: local {} / remote {}", local, remote);
        if local == remote {
            return Ok(Freshness::Current);
        }

        match self.fetch() {
            Ok(bytes) => Ok(Freshness::Updated { bytes }),
            Err(e) => {
                tracing::warn!("registry update failed, keeping existing copy: {}", e);
                Ok(Freshness::Stale {
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Stream `reader` into `file` (located at `dest`), `chunk_size` bytes at a time.
fn copy_chunked(mut reader: impl Read, file: &mut File, dest: &Path, chunk_size: usize) -> Result<u64> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(LookupError::Network(format!(
                    "transfer interrupted after {} bytes: {}",
                    total, e
                )))
            }
        };
        file.write_all(&buf[..n])
            .map_err(|e| LookupError::io(dest, e))?;
        total += n as u64;
    }

    file.sync_all().map_err(|e| LookupError::io(dest, e))?;
    Ok(total)
}
