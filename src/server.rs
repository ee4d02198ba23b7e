use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::cards::{
    BackFields, YearRange,
    layout::{DEFAULT_CARDS_PER_ROW, MAX_CARDS_PER_ROW},
};
use crate::clients::errors::{Error, Result};
use crate::generator::{Config, ConfigBuilder, DEFAULT_CARD_LIMIT, GenerateRequest, Generator};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const PDF_FILENAME: &str = "playlist_cards.pdf";

const FORM_PAGE: &str = include_str!("../templates/form.html");

/// Builds the generator config for each request.
pub type ConfigFactory = Arc<dyn Fn() -> Result<Config> + Send + Sync>;

/// Raw form fields; every value is free text.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    pub playlist_url: Option<String>,
    pub card_limit: Option<String>,
    pub cards_per_row: Option<String>,
    pub years_from: Option<String>,
    pub years_to: Option<String>,
    pub seed: Option<String>,
    pub hide_album: Option<String>,
}

/// Parse `value` as a number, falling back to `default` when it is absent or
/// not a number.
pub fn safe_int_cast<T: FromStr>(value: Option<&str>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl From<GenerateForm> for GenerateRequest {
    fn from(form: GenerateForm) -> GenerateRequest {
        let mut request = GenerateRequest::new(form.playlist_url.unwrap_or_default());
        request.card_limit = safe_int_cast(form.card_limit.as_deref(), DEFAULT_CARD_LIMIT);
        request.cards_per_row = match safe_int_cast(form.cards_per_row.as_deref(), 0usize) {
            n @ 1..=MAX_CARDS_PER_ROW => n,
            _ => DEFAULT_CARDS_PER_ROW,
        };
        request.years = YearRange {
            from: safe_int_cast(form.years_from.as_deref(), YearRange::DEFAULT_FROM),
            to: safe_int_cast(form.years_to.as_deref(), YearRange::DEFAULT_TO),
        };
        request.seed = form.seed.as_deref().and_then(|s| s.trim().parse().ok());
        if form.hide_album.is_some_and(|v| !v.is_empty()) {
            request.fields = BackFields::without_album();
        }
        request
    }
}

/// Request failure, reported as a 500 with the error text.
pub struct ServerError(Error);

impl From<Error> for ServerError {
    fn from(err: Error) -> Self {
        ServerError(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Failed to generate cards: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

async fn home() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn generate_cards(
    State(config): State<ConfigFactory>,
    Form(form): Form<GenerateForm>,
) -> std::result::Result<Response, ServerError> {
    let request = GenerateRequest::from(form);
    let generator = Generator::new(config()?);

    let mut pdf = Vec::new();
    generator.generate(&request, &mut pdf).await?;
    Ok(pdf_response(pdf))
}

fn pdf_response(pdf: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename={PDF_FILENAME}"),
            ),
        ],
        pdf,
    )
        .into_response()
}

/// Router whose config comes from the environment on every request, so
/// credentials and fixture changes apply without a restart.
pub fn router() -> Router {
    router_with(Arc::new(|| ConfigBuilder::new().with_env().build()))
}

pub fn router_with(config: ConfigFactory) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/generate", post(generate_cards))
        .with_state(config)
}

pub async fn serve(bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}
