//! Routing module
//!
//! Maps a request path onto one of the page operations:
//! - `/view/{title}`
//! - `/edit/{title}`
//! - `/save/{title}`
//!
//! Titles are validated here, so every handler receives a `Title`.

mod matcher;

pub use matcher::{resolve, Operation, Route};
