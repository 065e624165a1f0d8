//! Configuration and command-line argument parsing

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value for {option}: {value}")]
    InvalidValue { option: String, value: String },
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Feed
    pub feed_host: String,
    pub feed_port: u16,

    // HTTP
    pub http_port: u16,

    // Input
    pub filename: Option<String>,

    // Output
    /// Print every record, not just identification messages
    pub all: bool,
    pub json: bool,
    pub stats: bool,

    pub help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_host: "127.0.0.1".to_string(),
            feed_port: 30002,
            http_port: 8080,
            filename: None,
            all: false,
            json: false,
            stats: false,
            help: false,
        }
    }
}

/// On-disk layout, e.g. `{"adsb": {"host": "10.0.0.5", "port": 30002}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    adsb: FeedSection,
    http: HttpSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HttpSection {
    port: Option<u16>,
}

impl Config {
    /// Parse the process arguments, printing help or the error and exiting
    /// when appropriate.
    pub fn from_args() -> Self {
        match Self::parse(env::args().skip(1)) {
            Ok(config) if config.help => {
                print_help();
                std::process::exit(0);
            }
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                print_help();
                std::process::exit(1);
            }
        }
    }

    /// Parse arguments (without the program name). Options are applied in
    /// order, so flags after `--config` override the file.
    pub fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = next_value(&mut args, &arg)?;
                    config.merge_file(Path::new(&path))?;
                }
                "--feed-host" => config.feed_host = next_value(&mut args, &arg)?,
                "--feed-port" => config.feed_port = parse_value(&mut args, &arg)?,
                "--http-port" => config.http_port = parse_value(&mut args, &arg)?,
                "--ifile" => config.filename = Some(next_value(&mut args, &arg)?),
                "--all" => config.all = true,
                "--json" => config.json = true,
                "--stats" => config.stats = true,
                "--help" => config.help = true,
                _ => return Err(ConfigError::UnknownOption(arg.clone())),
            }
        }

        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(host) = file.adsb.host {
            self.feed_host = host;
        }
        if let Some(port) = file.adsb.port {
            self.feed_port = port;
        }
        if let Some(port) = file.http.port {
            self.http_port = port;
        }
        Ok(())
    }

    pub fn feed_addr(&self) -> String {
        format!("{}:{}", self.feed_host, self.feed_port)
    }
}

fn next_value<I>(args: &mut I, option: &str) -> Result<String, ConfigError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(option.to_string()))
}

fn parse_value<I, T>(args: &mut I, option: &str) -> Result<T, ConfigError>
where
    I: Iterator<Item = String>,
    T: std::str::FromStr,
{
    let value = next_value(args, option)?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        option: option.to_string(),
        value,
    })
}

fn print_help() {
    println!(
        r#"squitter-decode - ADS-B extended squitter decoder

Usage: squitter-decode [OPTIONS]

Options:
  --config <file>        JSON config file ({{"adsb": {{"host", "port"}}, "http": {{"port"}}}})
  --feed-host <host>     Raw Mode S feed host (default: 127.0.0.1)
  --feed-port <port>     Raw Mode S feed port (default: 30002)
  --http-port <port>     HTTP server port (default: 8080)
  --ifile <filename>     Decode messages from file, one per line ('-' for stdin)
  --all                  Print every decoded message, not only identification
  --json                 Print decoded messages as JSON lines
  --stats                With --ifile print stats at exit
  --help                 Show this help
"#
    );
}
