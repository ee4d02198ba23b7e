/// Track records and raw playlist payloads
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Playlist pages stored as local JSON
pub mod fixture;
/// Spotify API client
pub mod spotify;

pub use fixture::FixtureFile;
pub use spotify::SpotifyClient;

use entities::RawPlaylistItem;
use errors::Result;

/// Where playlist items come from for a request.
pub enum PlaylistSource {
    Spotify(SpotifyClient),
    Fixture(FixtureFile),
}

impl PlaylistSource {
    pub async fn fetch_items(&self, playlist_url: &str) -> Result<Vec<RawPlaylistItem>> {
        match self {
            PlaylistSource::Spotify(client) => {
                client.authorize_client().await?;
                client.get_playlist_items(playlist_url).await
            }
            PlaylistSource::Fixture(fixture) => fixture.load().await,
        }
    }
}
