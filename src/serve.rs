//! HTTP API
//!
//! `humanmark serve` → JSON API on tiny_http
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | API description |
//! | `GET /health` | liveness plus database ping |
//! | `POST /verify` | analyze content, store the verdict |
//! | `GET /verify/{id}` | fetch a stored verdict |
//!
//! `POST /verify` takes either a JSON body
//! (`{text?, url?, data? (base64), filename?, content_type?}`) or, for any
//! other Content-Type, the raw content itself. `?detailed=true` adds the
//! forensic breakdown to the response.

use crate::analyzer::{AnalysisError, AnalysisInput, Analyzer};
use crate::db::Database;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Read;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

const MIN_TEXT_CHARS: usize = 10;

/// Everything a request handler needs
pub struct ServerState {
    pub analyzer: Analyzer,
    pub db: Database,
    pub max_upload_size: u64,
}

/// An error response: status code plus `{"error": message}`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn body(&self) -> Value {
        json!({ "error": self.message })
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        let status = match e {
            AnalysisError::UnsupportedContentType(_) | AnalysisError::NoContent => 400,
            AnalysisError::Fetch(_) => 500,
        };
        Self::new(status, e.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    pub text: Option<String>,
    pub url: Option<String>,
    /// Base64-encoded content
    pub data: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VerifyQuery {
    #[serde(default)]
    detailed: Option<String>,
    filename: Option<String>,
}

fn is_truthy(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// http(s) scheme and a non-empty host
pub fn is_valid_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().map_or(false, |h| !h.is_empty())
        }
        Err(_) => false,
    }
}

pub fn check_upload_size(len: u64, max: u64) -> Result<(), ApiError> {
    if len > max {
        return Err(ApiError::new(
            413,
            format!("request body exceeds {} bytes", max),
        ));
    }
    Ok(())
}

/// Check a JSON request and turn it into analysis input
pub fn validate(req: VerifyRequest) -> Result<AnalysisInput, ApiError> {
    let text = req.text.filter(|t| !t.is_empty());
    let url = req.url.filter(|u| !u.is_empty());
    let data = req.data.filter(|d| !d.is_empty());

    if text.is_none() && url.is_none() && data.is_none() {
        return Err(ApiError::bad_request(
            "no content provided: send text, url or data",
        ));
    }

    if let Some(t) = &text {
        if t.trim().chars().count() < MIN_TEXT_CHARS {
            return Err(ApiError::bad_request(format!(
                "text must be at least {} characters",
                MIN_TEXT_CHARS
            )));
        }
    }

    if let Some(u) = &url {
        if !is_valid_url(u) {
            return Err(ApiError::bad_request("url must be an absolute http(s) URL"));
        }
    }

    let data = match data {
        Some(encoded) => Some(
            base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|_| ApiError::bad_request("data must be base64-encoded"))?,
        ),
        None => None,
    };

    Ok(AnalysisInput {
        text,
        data,
        url,
        filename: req.filename,
        content_type: req.content_type,
    })
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| {
        ct.split(';')
            .next()
            .map_or(false, |m| m.trim().eq_ignore_ascii_case("application/json"))
    })
}

/// Parse a `POST /verify` body into analysis input plus the `detailed` flag
pub fn parse_verify(
    content_type: Option<&str>,
    query: &str,
    body: Vec<u8>,
) -> Result<(AnalysisInput, bool), ApiError> {
    let params: VerifyQuery = serde_urlencoded::from_str(query).unwrap_or_default();
    let detailed = params.detailed.as_deref().map_or(false, is_truthy);

    let input = if is_json(content_type) {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ApiError::bad_request("request body is empty"));
        }
        let req: VerifyRequest = serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {}", e)))?;
        validate(req)?
    } else {
        if body.is_empty() {
            return Err(ApiError::bad_request("request body is empty"));
        }
        let mut input = AnalysisInput::bytes(body);
        input.filename = params.filename;
        input.content_type = content_type.map(str::to_string);
        input
    };

    Ok((input, detailed))
}

/// Route a request to a handler and produce `(status, body)`
pub fn dispatch(
    state: &ServerState,
    method: &Method,
    path: &str,
    query: &str,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (u16, Value) {
    let outcome = match (method, path) {
        (Method::Get, "/") => Ok((200, index())),
        (Method::Get, "/health") => Ok(health(state)),
        (Method::Post, "/verify") => verify(state, content_type, query, body),
        (Method::Get, p) if p.starts_with("/verify/") || p == "/verify" => {
            get_job(state, p.trim_start_matches("/verify").trim_start_matches('/'))
        }
        _ => Err(ApiError::new(404, "not found")),
    };

    outcome.unwrap_or_else(|e| (e.status, e.body()))
}

fn index() -> Value {
    json!({
        "name": "HumanMark API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /",
            "GET /health",
            "POST /verify",
            "GET /verify/{id}",
        ],
    })
}

fn health(state: &ServerState) -> (u16, Value) {
    match state.db.ping() {
        Ok(()) => (200, json!({ "status": "healthy" })),
        Err(e) => {
            warn!(error = %e, "database ping failed");
            (503, json!({ "status": "degraded" }))
        }
    }
}

fn verify(
    state: &ServerState,
    content_type: Option<&str>,
    query: &str,
    body: Vec<u8>,
) -> Result<(u16, Value), ApiError> {
    let (input, detailed) = parse_verify(content_type, query, body)?;
    let result = state.analyzer.analyze(&input)?;

    let job = state
        .db
        .create_job(&result)
        .map_err(|e| ApiError::new(500, e.to_string()))?;

    info!(
        id = %job.id,
        content_type = %result.content_type,
        ai_score = result.ai_score,
        "verified content"
    );

    let mut result = if detailed { result } else { result.without_details() };
    result.id = Some(job.id);

    let body = serde_json::to_value(&result).map_err(|e| ApiError::new(500, e.to_string()))?;
    Ok((200, body))
}

fn get_job(state: &ServerState, id: &str) -> Result<(u16, Value), ApiError> {
    if id.is_empty() {
        return Err(ApiError::bad_request("job id is required"));
    }

    let job = state
        .db
        .get_job(id)
        .map_err(|e| ApiError::new(500, e.to_string()))?
        .ok_or_else(|| ApiError::new(404, format!("job not found: {}", id)))?;

    let body = serde_json::to_value(&job).map_err(|e| ApiError::new(500, e.to_string()))?;
    Ok((200, body))
}

// ============================================================================
// tiny_http glue
// ============================================================================

/// Bind and serve until the process is stopped
pub fn start(port: u16, state: ServerState) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let server = Server::http(&addr).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    eprintln!("\n\x1b[1;32mHumanMark API\x1b[0m");
    eprintln!("   http://localhost:{}", port);
    info!(port, detectors = ?state.analyzer.detector_names(), "server listening");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &state) {
            warn!(error = %e, "failed to respond");
        }
    }

    Ok(())
}

fn json_header() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("static header")
}

fn respond(request: Request, status: u16, body: &Value) -> std::io::Result<()> {
    let response = Response::from_string(body.to_string())
        .with_status_code(status)
        .with_header(json_header());
    request.respond(response)
}

fn handle_request(mut request: Request, state: &ServerState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let mut body = Vec::new();
    if method == Method::Post {
        if let Some(len) = request.body_length() {
            if let Err(e) = check_upload_size(len as u64, state.max_upload_size) {
                return respond(request, e.status, &e.body());
            }
        }
        request
            .as_reader()
            .take(state.max_upload_size + 1)
            .read_to_end(&mut body)?;
        if let Err(e) = check_upload_size(body.len() as u64, state.max_upload_size) {
            return respond(request, e.status, &e.body());
        }
    }

    let (status, value) = dispatch(state, &method, path, query, content_type.as_deref(), body);
    info!(method = %method, path, status, "request");
    respond(request, status, &value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID_TEXT: &str = "This is valid test content for validation.";

    fn state() -> (TempDir, ServerState) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(dir.path().join("api.db")).unwrap();
        let state = ServerState {
            analyzer: Analyzer::new(),
            db,
            max_upload_size: 10 * 1024 * 1024,
        };
        (dir, state)
    }

    fn post_json(state: &ServerState, query: &str, body: &str) -> (u16, Value) {
        dispatch(
            state,
            &Method::Post,
            "/verify",
            query,
            Some("application/json"),
            body.as_bytes().to_vec(),
        )
    }

    // ==========================================================================
    // INPUT VALIDATION TESTS
    // ==========================================================================

    #[test]
    fn test_validate_cases() {
        let cases: Vec<(&str, VerifyRequest, bool)> = vec![
            ("empty input", VerifyRequest::default(), false),
            (
                "valid text",
                VerifyRequest { text: Some(VALID_TEXT.to_string()), ..Default::default() },
                true,
            ),
            (
                "text too short",
                VerifyRequest { text: Some("short".to_string()), ..Default::default() },
                false,
            ),
            (
                "valid url",
                VerifyRequest { url: Some("https://example.com/image.jpg".to_string()), ..Default::default() },
                true,
            ),
            (
                "invalid url",
                VerifyRequest { url: Some("not-a-url".to_string()), ..Default::default() },
                false,
            ),
            (
                "valid data",
                VerifyRequest { data: Some("ZmlsZSBjb250ZW50".to_string()), ..Default::default() },
                true,
            ),
            (
                "bad base64",
                VerifyRequest { data: Some("***".to_string()), ..Default::default() },
                false,
            ),
        ];

        for (name, req, ok) in cases {
            assert_eq!(validate(req).is_ok(), ok, "case: {}", name);
        }
    }

    #[test]
    fn test_padded_short_text_rejected() {
        // Whitespace doesn't count toward the minimum
        let req = VerifyRequest { text: Some("   short      ".to_string()), ..Default::default() };
        assert_eq!(validate(req).unwrap_err().status, 400);
    }

    #[test]
    fn test_data_is_decoded() {
        let req = VerifyRequest { data: Some("ZmlsZSBjb250ZW50".to_string()), ..Default::default() };
        let input = validate(req).unwrap();
        assert_eq!(input.data.as_deref(), Some(&b"file content"[..]));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("http://example.com"));
        assert!(is_valid_url("https://example.com/a/b.png?x=1"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("example.com/image.jpg"));
        assert!(!is_valid_url("https://"));
    }

    #[test]
    fn test_upload_size() {
        assert!(check_upload_size(100, 100).is_ok());
        assert_eq!(check_upload_size(101, 100).unwrap_err().status, 413);
    }

    #[test]
    fn test_parse_raw_body() {
        let (input, detailed) =
            parse_verify(Some("image/png"), "detailed=true&filename=cat.png", vec![1, 2, 3]).unwrap();
        assert!(detailed);
        assert_eq!(input.data.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(input.filename.as_deref(), Some("cat.png"));
        assert_eq!(input.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_json_content_type_with_charset() {
        assert!(is_json(Some("application/json; charset=utf-8")));
        assert!(!is_json(Some("text/plain")));
        assert!(!is_json(None));
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(ApiError::from(AnalysisError::NoContent).status, 400);
        assert_eq!(
            ApiError::from(AnalysisError::UnsupportedContentType("x".into())).status,
            400
        );
        let fetch = AnalysisError::Fetch(crate::external::ExternalError::Status(502));
        assert_eq!(ApiError::from(fetch).status, 500);
    }

    // ==========================================================================
    // ROUTE TESTS
    // ==========================================================================

    #[test]
    fn test_index() {
        let (_dir, state) = state();
        let (status, body) = dispatch(&state, &Method::Get, "/", "", None, vec![]);
        assert_eq!(status, 200);
        assert_eq!(body["name"], "HumanMark API");
        assert!(body["endpoints"].as_array().unwrap().len() >= 4);
    }

    #[test]
    fn test_health() {
        let (_dir, state) = state();
        let (status, body) = dispatch(&state, &Method::Get, "/health", "", None, vec![]);
        assert_eq!(status, 200);
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_unknown_route() {
        let (_dir, state) = state();
        let (status, body) = dispatch(&state, &Method::Get, "/nope", "", None, vec![]);
        assert_eq!(status, 404);
        assert!(body["error"].is_string());
    }

    #[test]
    fn test_verify_text_and_fetch_job() {
        let (_dir, state) = state();
        let (status, body) = post_json(&state, "", &json!({ "text": VALID_TEXT }).to_string());

        assert_eq!(status, 200);
        assert_eq!(body["content_type"], "text");
        assert!(body.get("details").is_none());
        let id = body["id"].as_str().unwrap().to_string();

        let (status, job) = dispatch(&state, &Method::Get, &format!("/verify/{}", id), "", None, vec![]);
        assert_eq!(status, 200);
        assert_eq!(job["id"], id.as_str());
        assert_eq!(job["human"], body["human"]);
    }

    #[test]
    fn test_verify_detailed() {
        let (_dir, state) = state();
        let (status, body) = post_json(&state, "detailed=true", &json!({ "text": VALID_TEXT }).to_string());
        assert_eq!(status, 200);
        assert!(body["details"]["text"].is_object());
    }

    #[test]
    fn test_verify_rejections() {
        let (_dir, state) = state();

        assert_eq!(post_json(&state, "", "").0, 400);
        assert_eq!(post_json(&state, "", "{invalid json}").0, 400);
        assert_eq!(post_json(&state, "", "{}").0, 400);
        assert_eq!(post_json(&state, "", r#"{"text": "short"}"#).0, 400);
        assert_eq!(post_json(&state, "", r#"{"url": "not-a-valid-url"}"#).0, 400);
    }

    #[test]
    fn test_verify_unsupported_bytes() {
        let (_dir, state) = state();
        let (status, body) = dispatch(
            &state,
            &Method::Post,
            "/verify",
            "",
            Some("application/octet-stream"),
            vec![9u8; 32],
        );
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("unsupported"));
    }

    #[test]
    fn test_get_job_errors() {
        let (_dir, state) = state();
        assert_eq!(dispatch(&state, &Method::Get, "/verify/missing", "", None, vec![]).0, 404);
        assert_eq!(dispatch(&state, &Method::Get, "/verify/", "", None, vec![]).0, 400);
    }
}
