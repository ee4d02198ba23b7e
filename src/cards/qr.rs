use image::{DynamicImage, Luma};
use log::{debug, warn};
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::clients::errors::Result;

/// Produces the scannable image printed on the front of a card.
pub trait CodeImageProducer: Send + Sync {
    /// `card_index` is the card's position in the whole document.
    fn produce(&self, card_index: usize, url: &str) -> Result<DynamicImage>;
}

/// Plain QR encoder: low error correction, 10 px modules, no quiet zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeProducer;

impl CodeImageProducer for QrCodeProducer {
    fn produce(&self, _card_index: usize, url: &str) -> Result<DynamicImage> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::L)?;
        let image = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .module_dimensions(10, 10)
            .build();
        Ok(DynamicImage::ImageLuma8(image))
    }
}

/// Writes every produced image to a request-scoped scratch directory.
///
/// Each session gets its own `songcards-<uuid>` directory, so two requests
/// rendering at the same time never touch each other's files. The directory
/// is removed when the session is dropped.
pub struct ScratchSession<'a> {
    inner: &'a dyn CodeImageProducer,
    dir: PathBuf,
}

impl<'a> ScratchSession<'a> {
    pub fn create(root: &Path, inner: &'a dyn CodeImageProducer) -> Result<Self> {
        let dir = root.join(format!("songcards-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir)?;
        debug!("Created scratch directory {dir:?}");
        Ok(ScratchSession { inner, dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, card_index: usize) -> PathBuf {
        self.dir.join(format!("qr_{card_index}.png"))
    }
}

impl CodeImageProducer for ScratchSession<'_> {
    fn produce(&self, card_index: usize, url: &str) -> Result<DynamicImage> {
        let image = self.inner.produce(card_index, url)?;
        image.save(self.image_path(card_index))?;
        Ok(image)
    }
}

impl Drop for ScratchSession<'_> {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!("Removed scratch directory {:?}", self.dir),
            Err(e) => warn!("Failed to remove scratch directory {:?}: {e}", self.dir),
        }
    }
}

/// Default root for scratch directories.
pub fn default_scratch_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
        .join("songcards")
}
