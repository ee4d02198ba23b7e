use log::debug;
use std::path::PathBuf;

use crate::clients::entities::{PlaylistPage, RawPlaylistItem};
use crate::clients::errors::Result;

/// A saved page of the playlist items endpoint, used instead of the live API.
pub struct FixtureFile {
    path: PathBuf,
}

impl FixtureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FixtureFile { path: path.into() }
    }

    // Only the first page is stored, `next` is ignored
    pub async fn load(&self) -> Result<Vec<RawPlaylistItem>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let page: PlaylistPage = serde_json::from_str(&contents)?;
        debug!(
            "Loaded {} playlist items from fixture {:?}",
            page.items.len(),
            self.path
        );
        Ok(page.items)
    }
}
