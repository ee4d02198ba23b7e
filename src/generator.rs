use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cards::{
    BackFields, CodeImageProducer, LayoutParameters, QrCodeProducer, RenderSummary,
    ScratchSession, YearRange, layout::DEFAULT_CARDS_PER_ROW, layout::DEFAULT_ROWS_PER_PAGE,
    layout_pages, render_cards, sample,
};
use crate::clients::{
    FixtureFile, PlaylistSource, SpotifyClient,
    entities::extract_records,
    errors::{Error, Result},
};

pub const DEFAULT_CARD_LIMIT: i64 = 100;

// Configuration for the Generator struct
pub struct Config {
    pub source: PlaylistSource,
    pub producer: Arc<dyn CodeImageProducer>,
    pub scratch_root: Option<PathBuf>,
}

pub struct ConfigBuilder {
    fixture: Option<PathBuf>,
    producer: Option<Arc<dyn CodeImageProducer>>,
    scratch_root: Option<PathBuf>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            fixture: None,
            producer: None,     // QR codes unless replaced
            scratch_root: None, // images stay in memory unless set
        }
    }

    /// Read playlist items from a saved API page instead of Spotify.
    pub fn fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture = Some(path.into());
        self
    }

    /// Replace the QR encoder with another image producer.
    pub fn producer(mut self, producer: impl CodeImageProducer + 'static) -> Self {
        self.producer = Some(Arc::new(producer));
        self
    }

    /// Materialise code images under `root` while rendering.
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Fill unset options from `SONGCARDS_FIXTURE` and `SONGCARDS_SCRATCH_DIR`.
    pub fn with_env(mut self) -> Self {
        if self.fixture.is_none() {
            self.fixture = non_empty_env("SONGCARDS_FIXTURE").map(PathBuf::from);
        }
        if self.scratch_root.is_none() {
            self.scratch_root = non_empty_env("SONGCARDS_SCRATCH_DIR").map(PathBuf::from);
        }
        self
    }

    pub fn build(self) -> Result<Config> {
        let source = match self.fixture {
            Some(path) => PlaylistSource::Fixture(FixtureFile::new(path)),
            None => PlaylistSource::Spotify(SpotifyClient::try_default()?),
        };
        Ok(Config {
            source,
            producer: self.producer.unwrap_or_else(|| Arc::new(QrCodeProducer)),
            scratch_root: self.scratch_root,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Everything one set of cards is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub playlist_url: String,
    pub card_limit: i64,
    pub cards_per_row: usize,
    pub rows_per_page: usize,
    pub years: YearRange,
    pub seed: Option<u64>,
    pub fields: BackFields,
}

impl GenerateRequest {
    pub fn new(playlist_url: impl Into<String>) -> Self {
        GenerateRequest {
            playlist_url: playlist_url.into(),
            card_limit: DEFAULT_CARD_LIMIT,
            cards_per_row: DEFAULT_CARDS_PER_ROW,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            years: YearRange::default(),
            seed: None,
            fields: BackFields::default(),
        }
    }

    pub fn layout(&self) -> LayoutParameters {
        LayoutParameters::new(self.cards_per_row, self.rows_per_page)
    }
}

// Fetches a playlist and renders its cards
pub struct Generator {
    config: Config,
}

impl Generator {
    pub fn new(config: Config) -> Self {
        Generator { config }
    }

    pub async fn generate<W: Write>(
        &self,
        request: &GenerateRequest,
        mut destination: W,
    ) -> Result<RenderSummary> {
        info!("Generating cards for {} ...", request.playlist_url);
        let items = self.config.source.fetch_items(&request.playlist_url).await?;
        let records = extract_records(items);
        debug!("Extracted {} track records", records.len());

        let records = sample(records, request.years, request.card_limit, request.seed);
        let params = request.layout();
        let pages = layout_pages(records.len(), &params);
        info!(
            "Rendering {} cards on {} pages ({} per row)",
            records.len(),
            pages.len(),
            params.cards_per_row
        );

        // QR encoding and PDF assembly are CPU bound, keep them off the runtime
        let producer = Arc::clone(&self.config.producer);
        let scratch_root = self.config.scratch_root.clone();
        let fields = request.fields;
        let (summary, pdf) = tokio::task::spawn_blocking(move || -> Result<_> {
            let mut pdf = Vec::new();
            let summary = match scratch_root {
                Some(root) => {
                    let session = ScratchSession::create(&root, producer.as_ref())?;
                    debug!("Writing code images to {:?}", session.dir());
                    render_cards(&records, &pages, &params, &fields, &session, &mut pdf)?
                }
                None => render_cards(&records, &pages, &params, &fields, producer.as_ref(), &mut pdf)?,
            };
            Ok((summary, pdf))
        })
        .await
        .map_err(|e| Error::TaskError(e.to_string()))??;

        destination.write_all(&pdf)?;
        info!("Generated {} cards", summary.cards);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::sync::Mutex;

    /// Blank images, remembering which cards asked for one.
    #[derive(Clone, Default)]
    struct RecordingProducer {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl CodeImageProducer for RecordingProducer {
        fn produce(&self, card_index: usize, _url: &str) -> Result<DynamicImage> {
            self.seen.lock().unwrap().push(card_index);
            Ok(DynamicImage::new_luma8(8, 8))
        }
    }

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/playlist_page.json")
    }

    fn generator(scratch: Option<&std::path::Path>) -> Generator {
        let mut builder = ConfigBuilder::new().fixture(fixture_path());
        if let Some(root) = scratch {
            builder = builder.scratch_root(root);
        }
        Generator::new(builder.build().unwrap())
    }

    #[tokio::test]
    async fn twenty_fixture_records_six_per_row() {
        let mut request = GenerateRequest::new("https://open.spotify.com/playlist/37i9dQZF1DX0Ew6u9sRtTY");
        request.cards_per_row = 6;
        let mut pdf = Vec::new();
        let summary = generator(None).generate(&request, &mut pdf).await.unwrap();
        assert_eq!(summary, RenderSummary { sheet_sides: 4, cards: 20 });
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn limit_and_years_narrow_the_cards() {
        let mut request = GenerateRequest::new("fixture");
        request.card_limit = 6;
        request.cards_per_row = 3;
        request.years = YearRange::new(Some(1980), Some(1999));
        request.seed = Some(42);
        let summary = generator(None)
            .generate(&request, &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(summary, RenderSummary { sheet_sides: 2, cards: 6 });
    }

    #[tokio::test]
    async fn empty_year_range_gives_blank_document() {
        let mut request = GenerateRequest::new("fixture");
        request.years = YearRange::new(Some(2050), None);
        let mut pdf = Vec::new();
        let summary = generator(None).generate(&request, &mut pdf).await.unwrap();
        assert_eq!(summary.cards, 0);
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn scratch_directory_is_cleaned_up() {
        let root = tempfile::tempdir().unwrap();
        let mut request = GenerateRequest::new("fixture");
        request.card_limit = 4;
        generator(Some(root.path()))
            .generate(&request, &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn injected_producer_sees_every_card() {
        let producer = RecordingProducer::default();
        let config = ConfigBuilder::new()
            .fixture(fixture_path())
            .producer(producer.clone())
            .build()
            .unwrap();
        let mut request = GenerateRequest::new("fixture");
        request.card_limit = 7;
        request.seed = Some(1);
        let summary = Generator::new(config)
            .generate(&request, &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(summary.cards, 7);
        assert_eq!(*producer.seen.lock().unwrap(), (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn huge_cards_per_row_is_capped() {
        let mut request = GenerateRequest::new("fixture");
        request.cards_per_row = usize::MAX;
        request.rows_per_page = usize::MAX;
        let summary = generator(None)
            .generate(&request, &mut Vec::new())
            .await
            .unwrap();
        // 20 cards fit on one 10 x 10 page
        assert_eq!(summary, RenderSummary { sheet_sides: 2, cards: 20 });
    }

    #[tokio::test]
    async fn missing_fixture_fails_the_request() {
        let config = ConfigBuilder::new()
            .fixture("/nonexistent/songcards/fixture.json")
            .build()
            .unwrap();
        let result = Generator::new(config)
            .generate(&GenerateRequest::new("fixture"), &mut Vec::new())
            .await;
        assert!(result.is_err());
    }
}
