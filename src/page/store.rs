//! File-backed page store
//!
//! Each page lives in `{dir}/{title}.txt`. The file is the only source of
//! truth: there is no index and no existence check beyond attempting a read.

use super::{Page, Title};
use crate::logger;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const PAGE_EXTENSION: &str = "txt";

/// Failure to persist a page
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write page '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Stateless store rooted at a directory
#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the page with `title`
    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.dir
            .join(format!("{}.{PAGE_EXTENSION}", title.as_str()))
    }

    /// Load a page, `None` if it does not exist or cannot be read
    pub async fn load(&self, title: &Title) -> Option<Page> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Some(Page::new(title.clone(), body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                logger::log_warning(&format!(
                    "Failed to read page '{}': {e}",
                    path.display()
                ));
                None
            }
        }
    }

    /// Write the page body, creating the file or truncating an existing one
    ///
    /// Not atomic: on error the previous content may already be gone.
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let path = self.path_for(&page.title);
        write_file(&path, &page.body)
            .await
            .map_err(|source| StoreError::Write { path, source })
    }
}

async fn write_file(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.flush().await
}
