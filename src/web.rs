//! Two-route web form: `GET /` shows the form, `POST /` scrapes and renders.

use crate::analysis::AnalysisConfig;
use crate::pipeline::{self, ReportConfig, NO_MATCH_DATA};
use crate::report::{render_index, IndexPage, RenderedReport};
use crate::{DEFAULT_BASE_URL, DEFAULT_ROUNDS};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Settings fixed for the lifetime of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Form default for the results URL
    pub default_base_url: String,
    /// Form default for the rounds specifier
    pub default_rounds: String,
    pub cache_dir: PathBuf,
    pub analysis: AnalysisConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            default_base_url: DEFAULT_BASE_URL.to_string(),
            default_rounds: DEFAULT_ROUNDS.to_string(),
            cache_dir: PathBuf::from("."),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Submitted form fields. Missing or empty fields fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct IndexForm {
    pub base_url: Option<String>,
    pub rounds: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_get).post(index_post))
        .with_state(Arc::new(state))
}

async fn index_get(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&IndexPage {
        base_url: &state.default_base_url,
        rounds: &state.default_rounds,
        error: None,
        report: None,
    }))
}

async fn index_post(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IndexForm>,
) -> Html<String> {
    let base_url = non_empty(form.base_url).unwrap_or_else(|| state.default_base_url.clone());
    let rounds = non_empty(form.rounds).unwrap_or_else(|| state.default_rounds.clone());

    let config = ReportConfig {
        base_url: base_url.clone(),
        rounds: rounds.clone(),
        cache_dir: state.cache_dir.clone(),
        use_local: true,
        analysis: state.analysis.clone(),
    };

    // reqwest's blocking client must not run on the async executor
    let outcome = tokio::task::spawn_blocking(move || pipeline::build_report(&config)).await;
    let (report, error) = resolve_outcome(outcome);

    Html(render_index(&IndexPage {
        base_url: &base_url,
        rounds: &rounds,
        error: error.as_deref(),
        report: report.as_ref(),
    }))
}

/// Map the pipeline outcome to what the page shows.
fn resolve_outcome(
    outcome: Result<anyhow::Result<Option<RenderedReport>>, tokio::task::JoinError>,
) -> (Option<RenderedReport>, Option<String>) {
    match outcome {
        Ok(Ok(Some(report))) => (Some(report), None),
        Ok(Ok(None)) => (None, Some(NO_MATCH_DATA.to_string())),
        Ok(Err(e)) => {
            log::warn!("Report failed: {:#}", e);
            (None, Some(format!("Error: {:#}", e)))
        }
        Err(e) => {
            log::error!("Report task failed: {}", e);
            (None, Some(format!("Error: {}", e)))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
