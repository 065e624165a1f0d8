//!   squitter-decode:   ADS-B extended squitter decoder
//!
//!  Decodes `*<28 hex digits>;` Mode S frames from a raw TCP feed or a file
//!  and serves the decoder over HTTP.

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::RwLock;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use squitter_decode::config::Config;
use squitter_decode::decoder::DecodedMessage;
use squitter_decode::network::{self, AppState};
use squitter_decode::stats::{FeedStats, SharedStats};
use squitter_decode::stream::{self, FeedSink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_args();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
    info!("squitter-decode starting...");
    info!("Configuration: {:?}", config);

    let stats: SharedStats = Arc::new(RwLock::new(FeedStats::default()));

    // Channel for decoded messages
    let (msg_tx, msg_rx): (Sender<DecodedMessage>, Receiver<DecodedMessage>) = bounded(1024);
    let sink = FeedSink::new(msg_tx, Arc::clone(&stats));

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let config_for_processor = config.clone();
        let processor_handle = tokio::task::spawn_blocking(move || {
            process_messages(msg_rx, &config_for_processor);
        });

        if let Some(ref filename) = config.filename {
            info!("Reading from file: {}", filename);
            if let Err(e) = decode_file(filename, &sink) {
                error!("Error processing file: {}", e);
            }
            // closing the last sender lets the processor drain and exit
            drop(sink);
            processor_handle.await.ok();

            if config.stats {
                println!("{}", stats.read());
            }
            return;
        }

        let http_port = config.http_port;
        let state = AppState {
            config: config.clone(),
            sink,
            stats: Arc::clone(&stats),
        };
        let http_handle = tokio::spawn(async move {
            if let Err(e) = network::run_http_server(http_port, state).await {
                error!("HTTP server error: {}", e);
            }
        });

        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down");

        http_handle.abort();
        info!("Feed totals: {:?}", *stats.read());
    });

    // feed tasks may still hold senders; don't wait on the processor forever
    rt.shutdown_timeout(Duration::from_secs(1));

    Ok(())
}

fn decode_file(filename: &str, sink: &FeedSink) -> io::Result<()> {
    if filename == "-" {
        stream::run_reader(io::stdin().lock(), sink)
    } else {
        stream::run_reader(BufReader::new(File::open(filename)?), sink)
    }
}

/// Print decoded records until every sender is gone.
fn process_messages(rx: Receiver<DecodedMessage>, config: &Config) {
    while let Ok(msg) = rx.recv() {
        if let Some(line) = render(&msg, config) {
            println!("{}", line);
        }
    }
}

fn render(msg: &DecodedMessage, config: &Config) -> Option<String> {
    if !config.all && !msg.is_identification() {
        return None;
    }
    Some(if config.json { msg.to_json() } else { msg.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use squitter_decode::decoder;

    #[test]
    fn test_render_filters_identification_by_default() {
        let ident = decoder::decode("*8D4840D6202CC371C32CE0576098;").unwrap();
        let position = decoder::decode("*8D40621D58C382D690C8AC2863A7;").unwrap();
        let config = Config::default();

        assert!(render(&ident, &config).is_some());
        assert!(render(&position, &config).is_none());
    }

    #[test]
    fn test_render_all_as_json() {
        let position = decoder::decode("*8D40621D58C382D690C8AC2863A7;").unwrap();
        let config = Config {
            all: true,
            json: true,
            ..Config::default()
        };
        let line = render(&position, &config).unwrap();
        assert!(line.starts_with("{\"DF\":17,"));
        assert!(line.contains("\"ICAO\":\"40621D\""));
    }

    #[test]
    fn test_decode_file_missing() {
        let (tx, _rx) = bounded(1);
        let sink = FeedSink::new(tx, Arc::new(RwLock::new(FeedStats::default())));
        assert!(decode_file("/nonexistent/squitter-frames.txt", &sink).is_err());
    }
}
