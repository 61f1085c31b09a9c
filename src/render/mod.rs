//! HTML template rendering
//!
//! One template per mode. Templates are plain HTML with `$title` and `$body`
//! placeholders, loaded once at startup and never modified afterwards.

use crate::page::Page;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_VIEW_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>$title</title>
</head>
<body>
<h1>$title</h1>
<p>[<a href="/edit/$title">edit</a>]</p>
<div>$body</div>
</body>
</html>
"#;

const DEFAULT_EDIT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Editing $title</title>
</head>
<body>
<h1>Editing $title</h1>
<form action="/save/$title" method="POST">
<div><textarea name="body" rows="20" cols="80">$body</textarea></div>
<div><input type="submit" value="Save"></div>
</form>
</body>
</html>
"#;

/// Rendering mode, one template each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit,
}

impl Mode {
    /// Template file name inside a templates directory
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::View => "view.html",
            Self::Edit => "edit.html",
        }
    }
}

/// Template loading failure at startup
#[derive(Debug, thiserror::Error)]
#[error("failed to load template '{}': {source}", .path.display())]
pub struct TemplateLoadError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Immutable set of parsed templates
#[derive(Debug, Clone)]
pub struct Renderer {
    view: String,
    edit: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            view: DEFAULT_VIEW_TEMPLATE.to_string(),
            edit: DEFAULT_EDIT_TEMPLATE.to_string(),
        }
    }
}

impl Renderer {
    /// Load `view.html` and `edit.html` from `dir`, or use the built-in
    /// templates when no directory is configured
    pub fn load(dir: Option<&Path>) -> Result<Self, TemplateLoadError> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        Ok(Self {
            view: read_template(dir, Mode::View)?,
            edit: read_template(dir, Mode::Edit)?,
        })
    }

    fn template(&self, mode: Mode) -> &str {
        match mode {
            Mode::View => &self.view,
            Mode::Edit => &self.edit,
        }
    }

    /// Render `page` with the template for `mode`
    ///
    /// Body bytes that are not valid UTF-8 show up as U+FFFD; the stored page
    /// is left as it is.
    pub fn render(&self, mode: Mode, page: &Page) -> String {
        let body = String::from_utf8_lossy(&page.body);

        // $body is substituted last so page content is never re-scanned for
        // placeholders
        let html = self
            .template(mode)
            .replace("$title", &escape_html(page.title.as_str()));
        html.replace("$body", &escape_html(&body))
    }
}

fn read_template(dir: &Path, mode: Mode) -> Result<String, TemplateLoadError> {
    let path = dir.join(mode.file_name());
    std::fs::read_to_string(&path).map_err(|source| TemplateLoadError { path, source })
}

/// Escape text for HTML element content and quoted attributes
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
