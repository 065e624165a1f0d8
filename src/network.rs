//! HTTP front end
//!
//!  A minimal HTTP/1.1 server: one request per connection, GET only.
//!
//! | Path      | Response                                            |
//! |-----------|-----------------------------------------------------|
//! | `/`       | `error` query parameter, or "ADSB data"             |
//! | `/data`   | connects to the feed and starts decoding it         |
//! | `/decode` | decodes the `msg` query parameter to JSON           |
//! | `/stats`  | feed counters as JSON                               |

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::decoder;
use crate::stats::SharedStats;
use crate::status;
use crate::stream::{self, FeedSink};

const MAX_REQUEST: usize = 8192;

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sink: FeedSink,
    pub stats: SharedStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain;charset=utf-8",
            body: body.into(),
        }
    }

    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json;charset=utf-8",
            body,
        }
    }

    fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Server: squitter-decode\r\n\
             Content-Type: {}\r\n\
             Connection: close\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             \r\n\
             {}",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub async fn run_http_server(
    port: u16,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("HTTP server listening on port {}", port);
    serve(listener, state).await
}

pub async fn serve(
    listener: TcpListener,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (socket, addr) = listener.accept().await?;
        debug!("HTTP client connected: {}", addr);

        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_http_request(socket, &state).await {
                debug!("HTTP error: {}", e);
            }
        });
    }
}

async fn handle_http_request(
    mut socket: TcpStream,
    state: &AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buffer = vec![0u8; MAX_REQUEST];
    let n = socket.read(&mut buffer).await?;

    if n == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..n]);
    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();

    let response = match parts.as_slice() {
        ["GET", target, ..] => route(state, target).await,
        [_, _, ..] => Response::text(405, "Method not allowed"),
        _ => return Ok(()),
    };

    socket.write_all(response.to_http().as_bytes()).await?;
    socket.shutdown().await?;
    Ok(())
}

/// Dispatch a request target such as `/decode?msg=...`.
pub async fn route(state: &AppState, target: &str) -> Response {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    match path {
        "/" => {
            let body = query_param(query, "error").unwrap_or_else(|| status::INDEX.to_string());
            Response::text(200, body)
        }
        "/data" => start_feed(state).await,
        "/decode" => {
            let raw = query_param(query, "msg").unwrap_or_default();
            match decoder::decode(&raw) {
                Ok(msg) => Response::json(200, msg.to_json()),
                Err(e) => Response::json(400, serde_json::json!({ "error": e.to_string() }).to_string()),
            }
        }
        "/stats" => {
            let stats = state.stats.read().clone();
            Response::json(200, serde_json::to_string(&stats).unwrap_or_default())
        }
        _ => Response::text(404, "Not found"),
    }
}

async fn start_feed(state: &AppState) -> Response {
    let addr = state.config.feed_addr();

    match stream::connect(&addr).await {
        Ok(socket) => {
            let sink = state.sink.clone();
            tokio::spawn(async move {
                if let Err(e) = stream::run_feed(socket, sink).await {
                    error!("Feed error: {}", e);
                }
            });
            Response::text(200, status::DECODING)
        }
        Err(e) => {
            warn!("Cannot connect to feed {}: {}", addr, e);
            Response::text(502, format!("{} {}", status::UNABLE_TO_CONNECT, addr))
        }
    }
}

/// First value of `name` in an `a=1&b=2` query string, percent-decoded.
fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode(value))
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        502 => "Bad Gateway",
        _ => "",
    }
}
