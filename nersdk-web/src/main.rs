//! Servidor HTTP Axum para rotulagem BIO com pacotes de domínio

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use nersdk_core::{
    HookRegistry, Labeler, LoaderConfig, NerError, PackInfo, PackLoader, Record, Span, Token,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const BIND_ENV: &str = "NERSDK_BIND";
const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    labeler: Labeler,
}

#[derive(Deserialize)]
struct TagRequest {
    text: String,
    #[serde(default)]
    domains: Vec<String>,
}

#[derive(Deserialize)]
struct BatchRequest {
    texts: Vec<String>,
    #[serde(default)]
    domains: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TagResponse {
    text: String,
    labels: String,
    tokens: Vec<Token>,
    spans: Vec<Span>,
    processing_ms: u64,
}

/// Erro de rotulagem convertido em resposta HTTP
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Ner(NerError),
    Internal(String),
}

impl From<NerError> for AppError {
    fn from(err: NerError) -> Self {
        AppError::Ner(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Ner(err) => {
                let status = match err {
                    NerError::PackNotFound { .. } => StatusCode::NOT_FOUND,
                    NerError::PackConfigInvalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let loader = PackLoader::new(LoaderConfig::from_env(), HookRegistry::builtin());
    let state = Arc::new(AppState {
        labeler: Labeler::new(loader),
    });

    let bind = std::env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("Servidor nersdk iniciado em http://{bind}");
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tag", post(tag_handler))
        .route("/tag/batch", post(batch_handler))
        .route("/domains", get(domains_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Rotula um texto; roda em `spawn_blocking` porque o carregamento de pacotes lê disco
async fn tag_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("empty text".into()));
    }

    let started = Instant::now();
    let TagRequest { text, domains } = req;
    let (text, analysis) = tokio::task::spawn_blocking(move || {
        let analysis = state.labeler.analyze(&text, &domains);
        (text, analysis)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;
    let analysis = analysis?;

    Ok(Json(TagResponse {
        text,
        labels: analysis.labels(),
        tokens: analysis.tokens,
        spans: analysis.spans,
        processing_ms: started.elapsed().as_millis() as u64,
    }))
}

async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<Vec<Record>>, AppError> {
    info!(texts = req.texts.len(), domains = ?req.domains, "batch tagging");
    let records = tokio::task::spawn_blocking(move || {
        state.labeler.bulk_tag(&req.texts, &req.domains)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(Json(records))
}

/// Pacotes embutidos que carregam sem erro
async fn domains_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PackInfo>> {
    let loader = state.labeler.loader();
    let infos = loader
        .discover_builtin()
        .iter()
        .filter_map(|name| match loader.load(name) {
            Ok(pack) => Some(pack.info()),
            Err(e) => {
                warn!(pack = %name, error = %e, "skipping pack that failed to load");
                None
            }
        })
        .collect();
    Json(infos)
}

async fn health_handler() -> &'static str {
    "ok"
}
