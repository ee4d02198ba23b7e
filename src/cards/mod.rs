/// Page and slot geometry
pub mod layout;
/// QR code images and scratch directories
pub mod qr;
/// PDF output
pub mod render;
/// Year filtering and random selection of tracks
pub mod sampler;
/// Helvetica text metrics
pub mod text;

pub use layout::{LayoutParameters, Page, layout_pages};
pub use qr::{CodeImageProducer, QrCodeProducer, ScratchSession};
pub use render::{BackFields, RenderSummary, render_cards};
pub use sampler::{YearRange, sample};
