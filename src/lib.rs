//! Songcards - Printable song cards from a Spotify playlist
//!
//! This library fetches the tracks of a playlist, samples a subset by release
//! year and renders a double-sided PDF: QR codes on the front, year, artist,
//! song and album on the back.

/// Card sampling, layout and rendering
pub mod cards;
/// Client modules for the Spotify API and local fixtures
pub mod clients;
/// Entry point tying sources, sampling and rendering together
pub mod generator;
/// HTTP form and download endpoint
pub mod server;
