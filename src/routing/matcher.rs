//! Route matching module
//!
//! Implements the `/{operation}/{title}` grammar.

use crate::page::Title;
use hyper::Method;
use percent_encoding::percent_decode_str;

/// Page operation named by the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    Edit,
    Save,
}

impl Operation {
    /// All operations, in route table order
    pub const ALL: [Self; 3] = [Self::View, Self::Edit, Self::Save];

    /// Path segment naming this operation
    pub const fn segment(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.segment() == segment)
    }

    /// Value for the `Allow` header
    pub const fn allow_header(self) -> &'static str {
        match self {
            Self::View | Self::Edit => "GET, HEAD",
            Self::Save => "POST",
        }
    }

    pub fn accepts(self, method: &Method) -> bool {
        match self {
            Self::View | Self::Edit => *method == Method::GET || *method == Method::HEAD,
            Self::Save => *method == Method::POST,
        }
    }

    /// Path of this operation for `title`, e.g. `/view/FrontPage`
    pub fn path(self, title: &Title) -> String {
        format!("/{}/{}", self.segment(), title)
    }
}

/// A validated operation + title pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub operation: Operation,
    pub title: Title,
}

/// Resolve a request path into a route
///
/// The path is percent-decoded first. Returns `None` unless the decoded path
/// is exactly `/{operation}/{title}` with a known operation and a title
/// matching `[A-Za-z0-9]+`.
pub fn resolve(path: &str) -> Option<Route> {
    let path = percent_decode_str(path).decode_utf8().ok()?;
    let rest = path.strip_prefix('/')?;
    let (segment, raw_title) = rest.split_once('/')?;
    let operation = Operation::from_segment(segment)?;
    let title = Title::parse(raw_title)?;
    Some(Route { operation, title })
}
