//! Dev server for the audio classification dashboard.
//!
//! Serves the wasm bundle with correct MIME types and forwards
//! `POST /api/classify` to the remote inference endpoint, so the browser
//! app talks same-origin and never fights the endpoint's CORS policy.

use clap::Parser;
use mime_guess::MimeGuess;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

const CLASSIFY_ROUTE: &str = "/api/classify";

#[derive(Parser, Debug)]
#[command(name = "viz-serve")]
#[command(about = "Serves the audio-viz dashboard and proxies inference requests")]
struct Args {
    /// Directory to serve files from
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Inference endpoint that /api/classify forwards to
    #[arg(long)]
    inference_url: Option<String>,
}

/// Error type for the classify proxy
#[derive(Debug)]
enum ProxyError {
    /// Server started without --inference-url
    NotConfigured,
    /// Client body unreadable or empty
    BadRequest(String),
    /// Upstream endpoint failed
    Upstream(String),
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::NotConfigured => write!(f, "no inference endpoint configured"),
            ProxyError::BadRequest(e) => write!(f, "bad request: {}", e),
            ProxyError::Upstream(e) => write!(f, "upstream error: {}", e),
        }
    }
}

impl std::error::Error for ProxyError {}

fn main() {
    let args = Args::parse();

    let root_dir = args.directory.canonicalize().unwrap_or_else(|_| {
        eprintln!("Error: Directory '{}' not found", args.directory.display());
        std::process::exit(1);
    });

    let addr = format!("{}:{}", args.host, args.port);
    let server = Server::http(&addr).unwrap_or_else(|e| {
        eprintln!("Error starting server: {}", e);
        std::process::exit(1);
    });

    println!("Serving '{}' at http://{}", root_dir.display(), addr);
    match &args.inference_url {
        Some(url) => println!("Proxying {} -> {}", CLASSIFY_ROUTE, url),
        None => println!("No --inference-url set; {} will answer 503", CLASSIFY_ROUTE),
    }
    println!("Press Ctrl+C to stop");

    for mut request in server.incoming_requests() {
        let url_path = request.url().to_string();
        let url_path = url_path.split('?').next().unwrap_or(&url_path).to_string();

        if *request.method() == Method::Post && url_path == CLASSIFY_ROUTE {
            let response = match proxy_classify(&mut request, args.inference_url.as_deref()) {
                Ok(body) => {
                    println!("POST {} -> 200", url_path);
                    json_response(body, 200)
                }
                Err(e) => {
                    eprintln!("POST {} failed: {}", url_path, e);
                    json_response(error_body(&e), proxy_status(&e))
                }
            };
            let _ = request.respond(response);
            continue;
        }

        let response = serve_static(&root_dir, &url_path);
        let ok = response.status_code().0 == 200;
        println!(
            "{} {} -> {}",
            request.method(),
            url_path,
            response.status_code().0
        );
        if !ok && url_path == "/" {
            eprintln!("Hint: build the wasm bundle into the served directory first");
        }
        let _ = request.respond(response);
    }
}

/// Forward the request body to the inference endpoint and relay its reply.
fn proxy_classify(
    request: &mut Request,
    inference_url: Option<&str>,
) -> Result<String, ProxyError> {
    let url = inference_url.ok_or(ProxyError::NotConfigured)?;

    let mut payload = String::new();
    request
        .as_reader()
        .read_to_string(&mut payload)
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;
    if payload.is_empty() {
        return Err(ProxyError::BadRequest("empty body".to_string()));
    }

    let mut response = ureq::post(url)
        .header("Content-Type", "application/json")
        .send(payload.as_str())
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| ProxyError::Upstream(e.to_string()))
}

fn proxy_status(error: &ProxyError) -> u16 {
    match error {
        ProxyError::NotConfigured => 503,
        ProxyError::BadRequest(_) => 400,
        ProxyError::Upstream(_) => 502,
    }
}

fn error_body(error: &ProxyError) -> String {
    serde_json::json!({ "error": error.to_string() }).to_string()
}

fn json_response(body: String, status: u16) -> Response<Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(Header::from_bytes("Content-Type", "application/json").unwrap())
        .with_header(Header::from_bytes("Access-Control-Allow-Origin", "*").unwrap())
}

/// Resolve and serve a static file under `root_dir`.
fn serve_static(root_dir: &Path, url_path: &str) -> Response<Cursor<Vec<u8>>> {
    let decoded = percent_decode(url_path);
    let relative = decoded.trim_start_matches('/');
    let file_path = if relative.is_empty() {
        root_dir.join("index.html")
    } else {
        root_dir.join(relative)
    };

    // prevent directory traversal
    let canonical = match file_path.canonicalize() {
        Ok(path) => path,
        Err(_) => return not_found(),
    };
    if !canonical.starts_with(root_dir) {
        return forbidden();
    }

    let final_path = if canonical.is_dir() {
        canonical.join("index.html")
    } else {
        canonical
    };

    match serve_file(&final_path) {
        Ok(response) => response,
        Err(_) => not_found(),
    }
}

fn serve_file(path: &Path) -> Result<Response<Cursor<Vec<u8>>>, std::io::Error> {
    let mut file = fs::File::open(path)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;

    let mime = get_mime_type(path);
    let content_type = Header::from_bytes("Content-Type", mime).unwrap();

    // CORS plus the isolation headers wasm threads need
    let cors = Header::from_bytes("Access-Control-Allow-Origin", "*").unwrap();
    let coop = Header::from_bytes("Cross-Origin-Opener-Policy", "same-origin").unwrap();
    let coep = Header::from_bytes("Cross-Origin-Embedder-Policy", "require-corp").unwrap();

    Ok(Response::from_data(contents)
        .with_header(content_type)
        .with_header(cors)
        .with_header(coop)
        .with_header(coep))
}

fn get_mime_type(path: &Path) -> &'static str {
    // mime_guess may not know wasm
    if let Some(ext) = path.extension() {
        match ext.to_str() {
            Some("wasm") => return "application/wasm",
            Some("js") => return "application/javascript",
            Some("mjs") => return "application/javascript",
            _ => {}
        }
    }

    MimeGuess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    Response::from_string("404 Not Found").with_status_code(StatusCode(404))
}

fn forbidden() -> Response<Cursor<Vec<u8>>> {
    Response::from_string("403 Forbidden").with_status_code(StatusCode(403))
}

fn percent_decode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                result.push(byte as char);
            } else {
                result.push('%');
                result.push_str(&hex);
            }
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}
