//! Page operation handlers
//!
//! `view`, `edit` and `save` take an already validated title. A missing page
//! is a normal state here, so `view` and `edit` always answer; only `save`
//! can fail.

use crate::config::AppState;
use crate::http;
use crate::page::{Page, StoreError, Title};
use crate::render::Mode;
use crate::routing::Operation;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode;

/// Form field carrying the page body on save
const BODY_FIELD: &str = "body";

/// Failure while handling a page operation
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

type HandlerResult = Result<Response<Full<Bytes>>, HandlerError>;

/// Show a page, or send the client to the editor if it does not exist yet
pub async fn view(state: &AppState, title: &Title, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.load(title).await {
        Some(page) => render(state, Mode::View, &page, is_head),
        None => http::build_redirect_response(&Operation::Edit.path(title)),
    }
}

/// Show the edit form, pre-filled with the current body or blank for a new page
///
/// Nothing is written until the form is submitted to `save`.
pub async fn edit(state: &AppState, title: &Title, is_head: bool) -> Response<Full<Bytes>> {
    let page = state
        .store
        .load(title)
        .await
        .unwrap_or_else(|| Page::blank(title.clone()));
    render(state, Mode::Edit, &page, is_head)
}

/// Persist the submitted form body and redirect to the page view
pub async fn save(state: &AppState, title: &Title, form: &[u8]) -> HandlerResult {
    let page = Page::new(title.clone(), form_body(form));
    state.store.save(&page).await?;
    Ok(http::build_redirect_response(&Operation::View.path(title)))
}

fn render(state: &AppState, mode: Mode, page: &Page, is_head: bool) -> Response<Full<Bytes>> {
    let html = state.renderer.render(mode, page);
    http::build_html_response(html, &state.config.http.server_name, is_head)
}

/// Extract the first `body` field of a urlencoded form, empty if absent
///
/// The value is decoded to raw bytes, so bytes that are not UTF-8 are stored
/// exactly as submitted.
fn form_body(form: &[u8]) -> Vec<u8> {
    form.split(|&b| b == b'&')
        .find_map(|pair| {
            let (name, value) = match pair.iter().position(|&b| b == b'=') {
                Some(eq) => (&pair[..eq], &pair[eq + 1..]),
                None => (pair, &[][..]),
            };
            (form_decode(name) == BODY_FIELD.as_bytes()).then(|| form_decode(value))
        })
        .unwrap_or_default()
}

/// `application/x-www-form-urlencoded` decoding: `+` is a space, then `%XX`
fn form_decode(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}
