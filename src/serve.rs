//! HTTP server for the interactive viewer
//!
//! `deepview serve ./results` → starts server, opens browser, shows evidence
//!
//! Routing is split from the socket loop: [`route`] maps a method, URL and
//! body to a [`Reply`], and [`start`] only moves bytes.

use crate::config::ServerSettings;
use crate::evidence::{Deriver, EvidenceRecord};
use crate::geometry::{ContainFit, Size};
use crate::model::{AnalysisResult, MediaType};
use crate::overlay::{self, Overlay, OverlayOption, RenderContext};
use crate::report::Summary;
use crate::scan;
use crate::view::ViewState;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(message.into()) }
    }
}

/// A response ready to be written to the socket.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        let body = serde_json::to_string(payload).unwrap_or_else(|e| {
            format!(r#"{{"ok":false,"data":null,"error":"serialization failed: {e}"}}"#)
        });
        Self { status, content_type: "application/json", body }
    }

    fn ok<T: Serialize>(data: T) -> Self {
        Self::json(200, &ApiResponse::success(data))
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ApiResponse::failure(message))
    }
}

/// What the server needs between requests.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// File or directory served by `/api/results`
    pub path: PathBuf,
    pub deriver: Deriver,
}

impl ServerState {
    pub fn new(path: PathBuf, deriver: Deriver) -> Self {
        Self { path, deriver }
    }

    fn path_display(&self) -> String {
        self.path
            .canonicalize()
            .unwrap_or_else(|_| self.path.clone())
            .display()
            .to_string()
    }
}

/// Query parameters of `POST /api/overlay`
#[derive(Deserialize, Debug, Default)]
pub struct OverlayParams {
    pub kind: Option<String>,
    pub natural_width: Option<f64>,
    pub natural_height: Option<f64>,
    pub container_width: Option<f64>,
    pub container_height: Option<f64>,
    /// Index into the navigable frame list
    #[serde(default)]
    pub frame: usize,
    /// Walk every frame instead of only the suspicious ones
    #[serde(default)]
    pub all_frames: bool,
}

impl OverlayParams {
    fn fit(&self) -> Option<ContainFit> {
        let natural = Size::new(self.natural_width?, self.natural_height?);
        let container = Size::new(self.container_width?, self.container_height?);
        ContainFit::new(natural, container)
    }
}

#[derive(Deserialize, Debug, Default)]
struct OverlaysQuery {
    #[serde(rename = "type")]
    media_type: Option<String>,
}

#[derive(Serialize)]
struct OverlayMenu {
    default: &'static str,
    options: Vec<OverlayOption>,
}

#[derive(Serialize)]
struct OverlayReply {
    /// Frame actually rendered after clamping
    frame: Option<usize>,
    frame_count: usize,
    overlay: Overlay,
}

/// Derived evidence for everything under the served path
#[derive(Serialize)]
pub struct ResultsReport {
    pub generated: String,
    pub path: String,
    pub summary: Summary,
    pub files: Vec<EvidenceRecord>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Start server, open browser, serve UI
pub fn start(settings: &ServerSettings, state: ServerState, open_browser: bool) -> Result<()> {
    let addr = settings.addr();
    let server = Server::http(&addr).map_err(|e| Error::Server(format!("{addr}: {e}")))?;

    let url = format!("http://{}:{}", browser_host(&settings.host), settings.port);

    eprintln!("\n\x1b[1;34mdeepview\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Serving: {}\n", state.path_display());

    if open_browser {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &state) {
            warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn browser_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "127.0.0.1" | "::" => "localhost",
        other => other,
    }
}

fn handle_request(mut request: Request, state: &ServerState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();

    let mut body = String::new();
    if method == Method::Post {
        request.as_reader().read_to_string(&mut body)?;
    }

    let reply = route(&method, &url, &body, state);
    info!(%method, url = %url, status = reply.status, "request");

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    request.respond(response)
}

/// Map one request to its reply.
pub fn route(method: &Method, url: &str, body: &str, state: &ServerState) -> Reply {
    let mut parts = url.splitn(2, '?');
    let path = parts.next().unwrap_or("/");
    let query = parts.next().unwrap_or("");

    match (method, path) {
        (&Method::Get, "/") => {
            let html = UI_HTML.replace("{{DEFAULT_PATH}}", &html_attr(&state.path_display()));
            Reply::html(html)
        }

        (&Method::Get, "/health") => Reply::ok(Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),

        (&Method::Post, "/api/derive") => match parse_result(body) {
            Ok(result) => Reply::ok(state.deriver.derive(&result)),
            Err(reply) => reply,
        },

        (&Method::Post, "/api/overlay") => {
            let params = match serde_urlencoded::from_str::<OverlayParams>(query) {
                Ok(params) => params,
                Err(e) => return Reply::error(400, format!("invalid query: {e}")),
            };
            match parse_result(body) {
                Ok(result) => Reply::ok(render_overlay(&state.deriver, &result, &params)),
                Err(reply) => reply,
            }
        }

        (&Method::Get, "/api/overlays") => {
            let query: OverlaysQuery = serde_urlencoded::from_str(query).unwrap_or_default();
            let media = MediaType::parse(query.media_type.as_deref().unwrap_or(""));
            Reply::ok(OverlayMenu {
                default: overlay::OverlayKind::default_for(media).id(),
                options: overlay::options(media),
            })
        }

        (&Method::Get, "/api/results") => Reply::ok(collect_results(state)),

        _ => Reply::error(404, "Not found"),
    }
}

fn parse_result(body: &str) -> std::result::Result<AnalysisResult, Reply> {
    if body.trim().is_empty() {
        return Err(Reply::error(400, "request body must be an analysis result"));
    }
    AnalysisResult::from_json_str(body).map_err(|e| Reply::error(400, format!("invalid JSON: {e}")))
}

fn render_overlay(deriver: &Deriver, result: &AnalysisResult, params: &OverlayParams) -> OverlayReply {
    let evidence = deriver.derive(result);
    let ctx = RenderContext::new(result, &evidence)
        .with_fit(params.fit())
        .with_filter_suspicious(!params.all_frames)
        .with_suspicious_confidence(deriver.options.suspicious_confidence);

    let frame_count = ctx.navigable_frames().len();
    let view = ViewState::new(result.media_type)
        .select_overlay_id(params.kind.as_deref().unwrap_or(""))
        .with_frame_count(frame_count)
        .select_frame(params.frame.min(frame_count.saturating_sub(1)));
    let frame = (frame_count > 0).then_some(view.frame_index);

    let ctx = ctx.with_frame_index(view.frame_index);
    OverlayReply {
        frame,
        frame_count,
        overlay: overlay::render(view.overlay, &ctx),
    }
}

fn collect_results(state: &ServerState) -> ResultsReport {
    let files = scan::collect_result_files(&state.path);
    let records = scan::derive_files(&state.deriver, &files);
    ResultsReport {
        generated: chrono::Local::now().to_rfc3339(),
        path: state.path_display(),
        summary: Summary::from_records(&records),
        files: records,
    }
}

fn html_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    fn state() -> ServerState {
        ServerState::new(PathBuf::from("/nonexistent/results"), Deriver::new())
    }

    fn data(reply: &Reply) -> Value {
        let v: Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(v["ok"], true, "unexpected failure: {}", reply.body);
        v["data"].clone()
    }

    fn video_body() -> String {
        json!({
            "type": "video", "prediction": "FAKE", "confidence": 0.8,
            "frame_analysis": {"frame_results": [
                {"frame_number": 0, "timestamp": 0.0, "prediction": "REAL", "confidence": 0.9},
                {"frame_number": 30, "timestamp": 1.0, "prediction": "FAKE", "confidence": 0.3,
                 "face_detection": {"detected": true, "confidence": 0.9,
                                    "bounding_box": {"x": 960, "y": 540, "width": 192, "height": 108}}},
                {"frame_number": 60, "timestamp": 2.0, "prediction": "FAKE", "confidence": 0.4}
            ]}
        })
        .to_string()
    }

    // ==========================================================================
    // ROUTING
    // ==========================================================================

    #[test]
    fn test_index_injects_path() {
        let reply = route(&Method::Get, "/", "", &state());
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(!reply.body.contains("{{DEFAULT_PATH}}"));
        assert!(reply.body.contains("/nonexistent/results"));
    }

    #[test]
    fn test_health() {
        let reply = route(&Method::Get, "/health", "", &state());
        assert_eq!(data(&reply)["status"], "ok");
    }

    #[test]
    fn test_unknown_route_is_404_envelope() {
        let reply = route(&Method::Get, "/api/nope", "", &state());
        assert_eq!(reply.status, 404);
        let v: Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"], "Not found");
    }

    #[test]
    fn test_wrong_method_is_404() {
        assert_eq!(route(&Method::Get, "/api/derive", "", &state()).status, 404);
    }

    // ==========================================================================
    // DERIVE + OVERLAY
    // ==========================================================================

    #[test]
    fn test_derive_returns_bundle() {
        let reply = route(&Method::Post, "/api/derive", &video_body(), &state());
        let bundle = data(&reply);
        assert_eq!(bundle["frame_analysis"]["total_frames"], 3);
        assert_eq!(bundle["frame_analysis"]["fake_frames"], 2);
        assert!(bundle["temporal_analysis"]["consistency_score"].as_f64().unwrap() <= 1.0);
    }

    #[test]
    fn test_derive_rejects_bad_body() {
        let reply = route(&Method::Post, "/api/derive", "{ not json", &state());
        assert_eq!(reply.status, 400);
        assert!(reply.body.contains("invalid JSON"));

        let empty = route(&Method::Post, "/api/derive", "  ", &state());
        assert_eq!(empty.status, 400);
    }

    #[test]
    fn test_overlay_places_face_box_with_contain_fit() {
        // 1920x1080 into 960x540: scale 0.5, no letterbox
        let url = "/api/overlay?kind=suspicious-frames&natural_width=1920&natural_height=1080\
                   &container_width=960&container_height=540&frame=0";
        let reply = route(&Method::Post, url, &video_body(), &state());
        let d = data(&reply);
        assert_eq!(d["frame_count"], 2);
        assert_eq!(d["frame"], 0);
        assert_eq!(d["overlay"]["kind"], "suspicious-frames");
        let b = &d["overlay"]["boxes"][0];
        assert_eq!(b["x"], 480.0);
        assert_eq!(b["y"], 270.0);
        assert_eq!(b["width"], 96.0);
        assert_eq!(b["height"], 54.0);
    }

    #[test]
    fn test_overlay_clamps_frame_and_falls_back_kind() {
        let url = "/api/overlay?kind=waveform&frame=99";
        let d = data(&route(&Method::Post, url, &video_body(), &state()));
        // waveform isn't a video overlay
        assert_eq!(d["overlay"]["kind"], "frame-analysis");
        assert_eq!(d["frame"], 1);
    }

    #[test]
    fn test_overlay_all_frames() {
        let url = "/api/overlay?kind=frame-by-frame&all_frames=true";
        let d = data(&route(&Method::Post, url, &video_body(), &state()));
        assert_eq!(d["frame_count"], 3);
    }

    #[test]
    fn test_overlay_bad_query() {
        let reply = route(&Method::Post, "/api/overlay?frame=minus-one", &video_body(), &state());
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_overlay_menu_per_media_type() {
        let d = data(&route(&Method::Get, "/api/overlays?type=audio", "", &state()));
        assert_eq!(d["default"], "audio-analysis");
        let ids: Vec<_> = d["options"].as_array().unwrap().iter().map(|o| o["id"].clone()).collect();
        assert!(ids.contains(&json!("spectral")));
        assert!(!ids.contains(&json!("face-detection")));
    }

    // ==========================================================================
    // RESULTS
    // ==========================================================================

    #[test]
    fn test_results_for_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("clip.json"), video_body()).unwrap();
        fs::write(dir.path().join("broken.json"), "oops").unwrap();
        let state = ServerState::new(dir.path().to_path_buf(), Deriver::new());

        let d = data(&route(&Method::Get, "/api/results", "", &state));
        assert_eq!(d["summary"]["total"], 2);
        assert_eq!(d["summary"]["fake"], 1);
        assert_eq!(d["summary"]["error"], 1);
        assert_eq!(d["files"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_results_for_missing_path_is_empty() {
        let d = data(&route(&Method::Get, "/api/results", "", &state()));
        assert_eq!(d["summary"]["total"], 0);
    }

    #[test]
    fn test_browser_host() {
        assert_eq!(browser_host("0.0.0.0"), "localhost");
        assert_eq!(browser_host("192.168.1.4"), "192.168.1.4");
    }
}
