mod config;
mod output;

use config::Config;

use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use colored::{control::set_override, Colorize};
use macvendor_core::{
    format_display, normalize, Freshness, Lookup, LookupError, LookupService, RegistryCache,
    RegistryConfig,
};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const LONG_ABOUT: &str = r##"
macvendor looks up the organization that registered the OUI (first three
bytes) of a MAC address, using a local copy of the IEEE OUI registry.

ADDRESS FORMATS:
  84:7b:eb:dd:ee:ff           Colon-separated
  34-E6-D7-80-45-8F           Hyphen-separated
  0011.9343.152e              Cisco dot notation
  00119343152e                Raw hex
  84:7b:eb                    Partial (at least the 6-digit OUI)

EXAMPLES:
  macvendor 84:7b:eb:dd:ee:ff
  macvendor 34-E6-D7-80-45-8F 0011.9343.152e
  macvendor -f addresses.txt
  arp -an | awk '{print $4}' | macvendor -f -
  macvendor --refresh

REGISTRY:
  The registry is downloaded on first use and re-downloaded whenever the
  remote size differs from the local copy. Without network access an
  existing copy is used as is.

CONFIGURATION:
  Precedence: CLI args > Environment vars > Config file > Defaults

  Setting       | CLI flag    | Env var             | Default
  --------------|-------------|---------------------|---------------------
  registry_path | --registry  | MACVENDOR_REGISTRY  | ~/.oui.txt
  registry_url  | --url       | MACVENDOR_URL       | IEEE standards site
  timeout       | --timeout   | MACVENDOR_TIMEOUT   | 5
  no_color      | -C          | MACVENDOR_NO_COLOR  | false

  Config file location: macvendor --config-path
  Generate default config: macvendor --config-init

  Note: NO_COLOR env var is also respected (https://no-color.org/)"##;

#[derive(Parser)]
#[command(name = "macvendor")]
#[command(version)]
#[command(about = "Look up the vendor of MAC addresses in the IEEE OUI registry")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// MAC addresses to look up
    #[arg(value_name = "ADDRESS")]
    addresses: Vec<String>,

    /// File with one address per line (use - for stdin)
    #[arg(long, short = 'f', value_name = "PATH", conflicts_with = "addresses")]
    file: Option<PathBuf>,

    /// Re-download the registry before looking anything up
    #[arg(long, short = 'r', visible_alias = "repair")]
    refresh: bool,

    /// Use the local registry as is, without checking for updates
    #[arg(long, conflicts_with = "refresh")]
    offline: bool,

    /// Path of the local registry file
    #[arg(long, value_name = "PATH")]
    registry: Option<PathBuf>,

    /// URL the registry is downloaded from
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Network timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output one JSON object per address
    #[arg(long, short = 'j')]
    json: bool,

    /// Disable colored output
    #[arg(long, short = 'C')]
    no_color: bool,

    /// Enable verbose logging (use multiple times for more detail)
    ///
    /// -v shows debug messages, -vv shows trace messages.
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// Generate default config file (see --config-path for location)
    #[arg(long)]
    config_init: bool,
}

/// Print an error and exit with status 1.
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(1);
}

fn warn(message: impl std::fmt::Display) {
    eprintln!("{}: {}", "warning".yellow().bold(), message);
}

/// Pick a setting by precedence and log where it came from.
fn merge<T: Debug + FromStr>(
    name: &str,
    cli: Option<T>,
    env: &str,
    in_file: bool,
    resolved: impl FnOnce() -> T,
) -> T {
    if let Some(value) = cli {
        tracing::debug!("{} = {:?} (from CLI)", name, value);
        return value;
    }

    let value = resolved();
    tracing::debug!("{} = {:?} (from {})", name, value, source_of::<T>(env, in_file));
    value
}

/// Where a setting not given on the command line came from. Matches the
/// precedence in [`Config`]: empty or unparsable env values are ignored.
fn source_of<T: FromStr>(env: &str, in_file: bool) -> String {
    if Config::env_var::<T>(env).is_some() {
        format!("env {}", env)
    } else if in_file {
        "config file".to_string()
    } else {
        "default".to_string()
    }
}

/// Bring the registry up to date, or exit if there is no usable copy.
fn prepare_registry(cache: &RegistryCache, refresh: bool, offline: bool) {
    let path = cache.path().display();

    if refresh {
        eprintln!("Downloading OUI registry from {}...", cache.config().url);
        match cache.refresh() {
            Ok(bytes) => eprintln!("Saved {} bytes to {}", bytes, path),
            Err(e) => fail(e),
        }
        return;
    }

    if offline {
        if !cache.exists() {
            fail(LookupError::Unavailable {
                path: cache.path().to_path_buf(),
            });
        }
        tracing::debug!("offline mode, using {} as is", path);
        return;
    }

    match cache.ensure_fresh() {
        Ok(Freshness::Current) => tracing::debug!("registry {} is current", path),
        Ok(Freshness::Offline) => tracing::debug!("offline, using existing {}", path),
        Ok(Freshness::Downloaded { bytes }) => {
            eprintln!("No OUI registry found. Downloaded {} bytes to {}", bytes, path)
        }
        Ok(Freshness::Updated { bytes }) => {
            eprintln!("Newer OUI registry found. Downloaded {} bytes to {}", bytes, path)
        }
        Ok(Freshness::Stale { reason }) => {
            warn(format!("could not update OUI registry, using existing copy ({})", reason))
        }
        Err(e) => fail(e),
    }
}

/// Look up and print one address. Registry failures abort the run.
fn report(service: &LookupService, address: &str, json: bool) {
    let lookup = match service.lookup(address) {
        Ok(lookup) => lookup,
        Err(e) => fail(e),
    };

    match &lookup {
        Lookup::Invalid { address, reason } => tracing::debug!("{}: {}", address, reason),
        _ => {
            if let Ok(mac) = normalize(address) {
                tracing::debug!("{} -> {}", address, format_display(mac.canonical()));
            }
        }
    }

    if json {
        match output::render_json(&lookup) {
            Ok(line) => println!("{}", line),
            Err(e) => fail(e),
        }
    } else {
        println!("{}", output::render(&lookup));
    }
}

/// Open a batch file, with `-` meaning stdin.
fn open_batch(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    Ok(Box::new(BufReader::new(File::open(path)?)))
}

fn main() {
    let cli = Cli::parse();

    // Handle --config-path
    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => fail("Cannot determine config directory"),
        }
        return;
    }

    // Handle --config-init
    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => fail(e),
        }
        return;
    }

    // Initialize tracing based on verbosity level (before config loading for logging)
    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config file and merge with CLI args
    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    let no_color = cli.no_color || file_config.no_color();
    if no_color {
        set_override(false);
    }

    if cli.addresses.is_empty() && cli.file.is_none() && !cli.refresh {
        fail("no MAC address given (see --help)");
    }

    let registry = merge(
        "registry_path",
        cli.registry.clone(),
        config::ENV_REGISTRY,
        file_config.registry_path.is_some(),
        || file_config.registry_path(),
    );
    let url = merge(
        "registry_url",
        cli.url.clone(),
        config::ENV_URL,
        file_config.registry_url.is_some(),
        || file_config.registry_url(),
    );
    let timeout = merge(
        "timeout",
        cli.timeout,
        config::ENV_TIMEOUT,
        file_config.timeout.is_some(),
        || file_config.timeout(),
    );

    let cache = RegistryCache::new(RegistryConfig {
        url,
        path: registry,
        timeout: Duration::from_secs(timeout),
        ..RegistryConfig::default()
    });

    prepare_registry(&cache, cli.refresh, cli.offline);

    if let Some(ref path) = cli.file {
        // Batch mode: index the registry once instead of rescanning per line
        let service = match LookupService::indexed(cache.path()) {
            Ok(service) => service,
            Err(e) => fail(e),
        };
        let mut reader = match open_batch(path) {
            Ok(reader) => reader,
            Err(e) => fail(format!("Failed to read '{}': {}", path.display(), e)),
        };

        // Non-UTF-8 lines are decoded lossily and come out as invalid
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => fail(format!("Failed to read '{}': {}", path.display(), e)),
            }
            let line = String::from_utf8_lossy(&buf);
            let address = line.trim();
            if address.is_empty() {
                continue;
            }
            report(&service, address, cli.json);
        }
    } else {
        let service = LookupService::new(cache.path());
        for address in &cli.addresses {
            report(&service, address, cli.json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_of_ignores_empty_env() {
        std::env::set_var("MACVENDOR_TEST_SOURCE_EMPTY", "");
        assert_eq!(source_of::<String>("MACVENDOR_TEST_SOURCE_EMPTY", false), "default");
        assert_eq!(
            source_of::<String>("MACVENDOR_TEST_SOURCE_EMPTY", true),
            "config file"
        );
    }

    #[test]
    fn test_source_of_env() {
        std::env::set_var("MACVENDOR_TEST_SOURCE_SET", "http://localhost/oui.txt");
        assert_eq!(
            source_of::<String>("MACVENDOR_TEST_SOURCE_SET", true),
            "env MACVENDOR_TEST_SOURCE_SET"
        );
    }

    #[test]
    fn test_source_of_unparsable_env() {
        std::env::set_var("MACVENDOR_TEST_SOURCE_BAD", "soon");
        assert_eq!(source_of::<u64>("MACVENDOR_TEST_SOURCE_BAD", false), "default");
    }
}
