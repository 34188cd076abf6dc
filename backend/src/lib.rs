pub mod config;
pub mod font;
pub mod types;
pub mod util;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    async_trait,
    extract::{multipart::MultipartError, DefaultBodyLimit, FromRequestParts, Multipart},
    http::{header, request::Parts, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::prelude::*;

use crate::config::{Config, Mode};
use crate::font::FontError;
use crate::types::{ErrorBody, NameField, PingResponse, UploadForm};

/// Header carrying the shared secret in production.
pub const API_KEY_HEADER: &str = "x-api-key";
pub const FONT_MIME: &str = "font/ttf";

#[derive(Clone, Default)]
pub struct AppState {
    config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config());
    let body_limit = state.config().max_upload_bytes;
    Router::new()
        .route("/modify-font", post(modify_font))
        .route("/ping", get(ping))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

fn cors_layer(config: &Config) -> CorsLayer {
    match config.mode {
        Mode::Development => CorsLayer::permissive(),
        Mode::Production => {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();
            if origins.is_empty() {
                tracing::warn!("no ALLOWED_ORIGINS configured; browsers cannot call the API");
            }
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
                .expose_headers([header::CONTENT_DISPOSITION])
        }
    }
}

/// Proof that the request may use the font endpoint.
///
/// Resolved from headers alone, so a rejected request never has its body read.
pub struct Authorized;

#[async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let config = state.config();
        if !config.requires_api_key() {
            return Ok(Authorized);
        }
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .map(HeaderValue::as_bytes)
            .unwrap_or_default();
        match config.api_key.as_deref() {
            Some(expected) if util::secret::constant_time_eq(presented, expected.as_bytes()) => {
                Ok(Authorized)
            }
            _ => {
                tracing::warn!(path = %parts.uri.path(), "rejected request with bad api key");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

async fn modify_font(
    _auth: Authorized,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(key) = field.name().map(str::to_owned) else {
            continue;
        };
        if key == "font" {
            form.font = Some(field.bytes().await?);
        } else if let Some(name_field) = NameField::from_form_key(&key) {
            form.set_field(name_field, field.text().await?);
        }
    }

    let font_bytes = form
        .font
        .take()
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ApiError::MissingField("font"))?;
    let fields = form.name_fields();
    tracing::info!(
        size = font_bytes.len(),
        family = %fields.family_name,
        subfamily = %fields.subfamily_name,
        full = %fields.full_name,
        "rewriting font names"
    );

    let job_fields = fields.clone();
    let renamed = tokio::task::spawn_blocking(move || font::rename_font(&font_bytes, &job_fields))
        .await
        .context("font worker stopped unexpectedly")??;

    let disposition = util::disposition::attachment(&fields.download_name())
        .context("building content-disposition")?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(FONT_MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        renamed,
    )
        .into_response())
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse::ok())
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("missing {0} file")]
    MissingField(&'static str),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            ApiError::MissingField(part) => (StatusCode::BAD_REQUEST, format!("missing {part} file")),
            ApiError::Multipart(err) => {
                tracing::error!(error = %err, "multipart error");
                let status = err.status();
                let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "upload too large"
                } else {
                    "invalid multipart payload"
                };
                (status, message.to_owned())
            }
            ApiError::Font(err) => {
                tracing::warn!(error = %err, "font rejected");
                let status = match &err {
                    FontError::NameTableOverflow => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
