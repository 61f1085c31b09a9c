//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Requests go through two stages:
//! the path is validated into a `Route` first, then the route is dispatched
//! to its page handler. A rejected path never reaches the page store.

use crate::config::AppState;
use crate::handler::pages::{self, HandlerError};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Operation, Route};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.http_version = version_label(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let response = route_request(req, &state).await;

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Validate, then dispatch
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // 1. Path grammar
    let Some(route) = routing::resolve(req.uri().path()) else {
        return http::build_404_response();
    };

    // 2. Method
    if !route.operation.accepts(req.method()) {
        logger::log_warning(&format!(
            "Method not allowed: {} {}",
            req.method(),
            req.uri().path()
        ));
        return http::build_405_response(route.operation.allow_header());
    }

    // 3. Declared body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    // 4. Dispatch
    let is_head = *req.method() == Method::HEAD;
    match route.operation {
        Operation::View => pages::view(state, &route.title, is_head).await,
        Operation::Edit => pages::edit(state, &route.title, is_head).await,
        Operation::Save => match read_form(req, state.config.http.max_body_size).await {
            Ok(form) => pages::save(state, &route.title, &form)
                .await
                .unwrap_or_else(|e| error_response(&route, &e)),
            Err(resp) => resp,
        },
    }
}

/// Turn a handler failure into a response; the request is not retried
fn error_response(route: &Route, err: &HandlerError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("{}: {err}", route.operation.path(&route.title)));
    http::build_500_response(&err.to_string())
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            _ => None,
        },
    )
}

/// Read the whole request body, enforcing the size limit for chunked uploads
async fn read_form<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("failed to read request body"))
        }
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::pages::tests::test_state;
    use crate::page::{Page, Title};
    use hyper::StatusCode;

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn request(method: Method, path: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        body: &'static str,
    ) -> Response<Full<Bytes>> {
        handle_request(request(method, path, body), Arc::clone(state), addr())
            .await
            .unwrap()
    }

    async fn text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn quiet_state(name: &str) -> Arc<AppState> {
        let mut state = test_state(name);
        state.config.logging.access_log = false;
        Arc::new(state)
    }

    #[tokio::test]
    async fn test_illegal_paths_are_404_and_touch_nothing() {
        let state = quiet_state("router-404");
        for path in [
            "/view/../../etc/passwd",
            "/view/",
            "/edit/",
            "/save/",
            "/delete/Page",
            "/",
            "/view/a.b",
            "/view/a/b",
            "/favicon.ico",
        ] {
            let method = if path.starts_with("/save") { Method::POST } else { Method::GET };
            let resp = send(&state, method, path, "body=x").await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {path}");
        }
        let written = std::fs::read_dir(state.store.dir()).unwrap().count();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let state = quiet_state("router-405");
        let resp = send(&state, Method::GET, "/save/Page", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "POST");

        let resp = send(&state, Method::POST, "/view/Page", "body=x").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(!state.store.path_for(&Title::parse("Page").unwrap()).exists());
    }

    #[tokio::test]
    async fn test_save_view_cycle() {
        let state = quiet_state("router-cycle");

        let resp = send(&state, Method::GET, "/view/FrontPage", "").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], "/edit/FrontPage");

        let resp = send(&state, Method::GET, "/edit/FrontPage", "").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&state, Method::POST, "/save/FrontPage", "body=Welcome+home").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], "/view/FrontPage");

        let resp = send(&state, Method::GET, "/view/FrontPage", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.contains("Welcome home"));
    }

    #[tokio::test]
    async fn test_percent_encoded_title_is_decoded() {
        let state = quiet_state("router-encoded");
        let resp = send(&state, Method::POST, "/save/%46oo", "body=x").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], "/view/Foo");

        let resp = send(&state, Method::GET, "/edit/%46oo", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.contains("Editing Foo"));

        let resp = send(&state, Method::GET, "/view/..%2F..%2Fetc%2Fpasswd", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_utf8_page_round_trips() {
        let state = quiet_state("router-binary");
        let resp = send(&state, Method::POST, "/save/Bin", "body=h%FFi").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let on_disk = std::fs::read(state.store.path_for(&Title::parse("Bin").unwrap())).unwrap();
        assert_eq!(on_disk, [b'h', 0xff, b'i']);

        for path in ["/view/Bin", "/edit/Bin"] {
            let resp = send(&state, Method::GET, path, "").await;
            assert_eq!(resp.status(), StatusCode::OK, "path {path}");
        }
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let state = quiet_state("router-head");
        state
            .store
            .save(&Page::new(Title::parse("Home").unwrap(), b"content".to_vec()))
            .await
            .unwrap();

        let resp = send(&state, Method::HEAD, "/view/Home", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let mut state = test_state("router-413");
        state.config.logging.access_log = false;
        state.config.http.max_body_size = 8;
        let state = Arc::new(state);

        let resp = send(&state, Method::POST, "/save/Big", "body=far+too+long").await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!state.store.path_for(&Title::parse("Big").unwrap()).exists());
    }

    #[tokio::test]
    async fn test_save_failure_is_500() {
        let mut state = test_state("router-500");
        state.config.logging.access_log = false;
        state.store = crate::page::PageStore::new(state.store.dir().join("missing-dir"));
        let state = Arc::new(state);

        let resp = send(&state, Method::POST, "/save/Page", "body=x").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(text(resp).await.contains("Page.txt"));
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
