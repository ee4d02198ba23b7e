use log::debug;

use crate::clients::{
    entities::{RawAlbum, RawArtist, RawPlaylistItem, RawTrack},
    errors::{Error, Result},
};
use futures::stream::TryStreamExt;
use rspotify::{
    ClientCredsSpotify, Credentials,
    model::{Country, FullTrack, Market, PlayableItem, PlaylistId, PlaylistItem},
    prelude::*,
};

// Track availability and release data are resolved for the Swedish catalogue
const MARKET: Market = Market::Country(Country::Sweden);

impl From<FullTrack> for RawTrack {
    fn from(f: FullTrack) -> RawTrack {
        RawTrack {
            name: Some(f.name),
            artists: f
                .artists
                .into_iter()
                .map(|a| RawArtist { name: Some(a.name) })
                .collect(),
            album: Some(RawAlbum {
                name: Some(f.album.name),
                release_date: f.album.release_date,
            }),
            external_urls: f.external_urls,
        }
    }
}

impl From<PlaylistItem> for RawPlaylistItem {
    fn from(item: PlaylistItem) -> RawPlaylistItem {
        let track = match item.track {
            Some(PlayableItem::Track(track)) => Some(RawTrack::from(track)),
            // episodes and unavailable entries carry no card data
            _ => None,
        };
        RawPlaylistItem { track }
    }
}

/// Extract the playlist id from a share URL (`https://open.spotify.com/playlist/<id>?si=...`),
/// a `spotify:playlist:<id>` URI or a bare id.
pub fn playlist_id_from_url(playlist_url: &str) -> Result<PlaylistId<'static>> {
    let trimmed = playlist_url.trim().trim_end_matches('/');
    let candidate = trimmed
        .rsplit('/')
        .next()
        .and_then(|segment| segment.split('?').next())
        .unwrap_or_default();
    if candidate.is_empty() {
        return Err(Error::InvalidPlaylist(playlist_url.to_string()));
    }
    PlaylistId::from_id_or_uri(candidate)
        .map(PlaylistId::into_static)
        .map_err(|e| Error::InvalidPlaylist(format!("{playlist_url}: {e}")))
}

pub struct SpotifyClient {
    pub spotify: ClientCredsSpotify,
}

impl SpotifyClient {
    pub fn new(spotify: ClientCredsSpotify) -> Self {
        SpotifyClient { spotify }
    }

    // Fetch every item of a playlist; the paginator follows `next` until the last page
    pub async fn get_playlist_items(&self, playlist_url: &str) -> Result<Vec<RawPlaylistItem>> {
        let playlist_id = playlist_id_from_url(playlist_url)?;
        debug!("Fetching items of playlist {} ...", playlist_id.id());
        let stream = self.spotify.playlist_items(playlist_id, None, Some(MARKET));
        let items: Vec<RawPlaylistItem> = stream.map_ok(RawPlaylistItem::from).try_collect().await?;
        debug!("Fetched {} playlist items", items.len());
        Ok(items)
    }

    // Client credentials flow, no user interaction involved
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Requesting Spotify client credentials token ...");
        self.spotify.request_token().await?;
        Ok(())
    }

    // Create a SpotifyClient from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let creds = match (std::env::var("SPOTIFY_ID"), std::env::var("SPOTIFY_SECRET")) {
            (Ok(id), Ok(secret)) => Credentials::new(&id, &secret),
            _ => Credentials::from_env().ok_or_else(|| {
                Error::ConfigurationError(
                    "Missing Spotify credentials, set SPOTIFY_ID and SPOTIFY_SECRET.".into(),
                )
            })?,
        };
        Ok(Self::new(ClientCredsSpotify::new(creds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_id_from_share_url() {
        let id = playlist_id_from_url(
            "https://open.spotify.com/playlist/37i9dQZF1DX0Ew6u9sRtTY?si=60e601795fec428b",
        )
        .unwrap();
        assert_eq!(id.id(), "37i9dQZF1DX0Ew6u9sRtTY");
    }

    #[test]
    fn playlist_id_from_uri_and_bare_id() {
        let from_uri = playlist_id_from_url("spotify:playlist:37i9dQZF1DX0Ew6u9sRtTY").unwrap();
        assert_eq!(from_uri.id(), "37i9dQZF1DX0Ew6u9sRtTY");
        let bare = playlist_id_from_url("37i9dQZF1DX0Ew6u9sRtTY/").unwrap();
        assert_eq!(bare.id(), "37i9dQZF1DX0Ew6u9sRtTY");
    }

    #[test]
    fn rejects_empty_playlist_reference() {
        assert!(matches!(
            playlist_id_from_url("  "),
            Err(Error::InvalidPlaylist(_))
        ));
        assert!(matches!(
            playlist_id_from_url("https://open.spotify.com/playlist/not-an-id!"),
            Err(Error::InvalidPlaylist(_))
        ));
    }
}
