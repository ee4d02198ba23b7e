use std::collections::HashMap;

use log::warn;
use serde::Deserialize;

use crate::clients::errors::{Error, Result};

/// A single card's worth of track metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub artist: String, // first listed artist only
    pub song: String,
    pub year: i32,
    pub album: Option<String>,
    pub link: String,
}

/// One page of the playlist items endpoint, as returned by the API or stored
/// in a fixture file.
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistPage {
    #[serde(default)]
    pub items: Vec<RawPlaylistItem>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPlaylistItem {
    #[serde(default)]
    pub track: Option<RawTrack>,
}

/// Loosely typed track payload. Every field may be missing, extraction decides
/// what is required.
#[derive(Debug, Default, Deserialize)]
pub struct RawTrack {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    pub album: Option<RawAlbum>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawArtist {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAlbum {
    pub name: Option<String>,
    pub release_date: Option<String>,
}

/// Year part of a `YYYY`, `YYYY-MM` or `YYYY-MM-DD` release date.
pub fn release_year(release_date: &str) -> Option<i32> {
    release_date.split('-').next()?.trim().parse().ok()
}

impl TryFrom<RawTrack> for TrackRecord {
    type Error = Error;

    fn try_from(raw: RawTrack) -> Result<TrackRecord> {
        let song = raw.name.ok_or(Error::MissingField("name"))?;
        let artist = raw
            .artists
            .into_iter()
            .next()
            .and_then(|a| a.name)
            .ok_or(Error::MissingField("artists"))?;
        let album = raw.album.ok_or(Error::MissingField("album"))?;
        let year = album
            .release_date
            .as_deref()
            .and_then(release_year)
            .ok_or(Error::MissingField("album.release_date"))?;
        let link = raw
            .external_urls
            .get("spotify")
            .cloned()
            .ok_or(Error::MissingField("external_urls.spotify"))?;

        Ok(TrackRecord {
            artist,
            song,
            year,
            album: album.name.filter(|n| !n.is_empty()),
            link,
        })
    }
}

/// Turn raw playlist items into records, skipping empty items and tracks that
/// lack a required field.
pub fn extract_records<I>(items: I) -> Vec<TrackRecord>
where
    I: IntoIterator<Item = RawPlaylistItem>,
{
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let Some(track) = item.track else {
                warn!("Skipping playlist item {position}: no track");
                return None;
            };
            match TrackRecord::try_from(track) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping playlist item {position}: {e}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: &str) -> RawPlaylistItem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn release_year_accepts_all_precisions() {
        assert_eq!(release_year("1991-09-24"), Some(1991));
        assert_eq!(release_year("1977-05"), Some(1977));
        assert_eq!(release_year("2003"), Some(2003));
        assert_eq!(release_year(""), None);
        assert_eq!(release_year("unknown"), None);
    }

    #[test]
    fn uses_first_artist_only() {
        let raw = item(
            r#"{"track": {
                "name": "Under Pressure",
                "artists": [{"name": "Queen"}, {"name": "David Bowie"}],
                "album": {"name": "Hot Space", "release_date": "1982-05-21"},
                "external_urls": {"spotify": "https://open.spotify.com/track/abc"}
            }}"#,
        );
        let records = extract_records(vec![raw]);
        assert_eq!(
            records,
            vec![TrackRecord {
                artist: "Queen".into(),
                song: "Under Pressure".into(),
                year: 1982,
                album: Some("Hot Space".into()),
                link: "https://open.spotify.com/track/abc".into(),
            }]
        );
    }

    #[test]
    fn skips_items_missing_release_date() {
        let missing_date = item(
            r#"{"track": {
                "name": "No Date",
                "artists": [{"name": "Somebody"}],
                "album": {"name": "Undated"},
                "external_urls": {"spotify": "https://open.spotify.com/track/x"}
            }}"#,
        );
        let bad_date = item(
            r#"{"track": {
                "name": "Bad Date",
                "artists": [{"name": "Somebody"}],
                "album": {"name": "Undated", "release_date": "0000?"},
                "external_urls": {"spotify": "https://open.spotify.com/track/y"}
            }}"#,
        );
        let no_track = item(r#"{"track": null}"#);
        assert!(extract_records(vec![missing_date, bad_date, no_track]).is_empty());
    }

    #[test]
    fn album_name_is_optional() {
        let raw = item(
            r#"{"track": {
                "name": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"release_date": "2010"},
                "external_urls": {"spotify": "https://open.spotify.com/track/z"}
            }}"#,
        );
        let records = extract_records(vec![raw]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].album, None);
    }

    #[test]
    fn missing_link_is_reported() {
        let raw = RawTrack {
            name: Some("Song".into()),
            artists: vec![RawArtist {
                name: Some("Artist".into()),
            }],
            album: Some(RawAlbum {
                name: None,
                release_date: Some("1999".into()),
            }),
            external_urls: HashMap::new(),
        };
        assert!(matches!(
            TrackRecord::try_from(raw),
            Err(Error::MissingField("external_urls.spotify"))
        ));
    }
}
