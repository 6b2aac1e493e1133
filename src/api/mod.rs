mod store;

use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::{
    Asset, AssetCategory, DEFAULT_SETTINGS, ForecastSettings, Frequency, IncomeStream, Milestone,
    MilestoneKind, ScenarioSnapshot, flexible_date, project,
};

pub use store::{ScenarioRecord, ScenarioStore};

#[derive(Parser, Debug)]
#[command(
    name = "horizon",
    about = "Net worth forecast API (assets + income streams + milestones over a 30-year horizon)"
)]
pub struct Cli {
    #[arg(long, default_value_t = 8080, help = "Port for the HTTP API")]
    pub port: u16,
    #[arg(
        long,
        default_value_t = DEFAULT_SETTINGS.inflation_rate,
        help = "Default annual inflation rate in percent"
    )]
    pub inflation_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_SETTINGS.stock_growth_rate,
        help = "Default annual growth rate for stock-like asset categories in percent"
    )]
    pub stock_growth_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_SETTINGS.real_estate_growth,
        help = "Default annual growth rate for real estate in percent"
    )]
    pub real_estate_growth: f64,
}

pub fn build_default_settings(cli: &Cli) -> Result<ForecastSettings, String> {
    for (name, rate) in [
        ("--inflation-rate", cli.inflation_rate),
        ("--stock-growth-rate", cli.stock_growth_rate),
        ("--real-estate-growth", cli.real_estate_growth),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be a finite percentage > -100"));
        }
    }

    Ok(ForecastSettings {
        inflation_rate: cli.inflation_rate,
        stock_growth_rate: cli.stock_growth_rate,
        real_estate_growth: cli.real_estate_growth,
    })
}

#[derive(Clone)]
struct AppState {
    store: ScenarioStore,
    defaults: ForecastSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonalProfilePayload {
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetPayload {
    #[serde(default)]
    id: Option<String>,
    name: String,
    amount: f64,
    category: AssetCategory,
    #[serde(default)]
    growth_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStreamPayload {
    #[serde(default)]
    id: Option<String>,
    name: String,
    amount: f64,
    frequency: Frequency,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    start_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_date::deserialize_opt")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    raise_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestonePayload {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    kind: MilestoneKind,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    date: DateTime<Utc>,
    impact: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DraftForecastPayload {
    personal_profile: Option<PersonalProfilePayload>,
    assets: Vec<AssetPayload>,
    income_streams: Vec<IncomeStreamPayload>,
    milestones: Vec<MilestonePayload>,
    settings: Option<ForecastSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateScenarioPayload {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    personal_profile: Option<PersonalProfilePayload>,
    #[serde(default)]
    assets: Vec<AssetPayload>,
    #[serde(default)]
    income_streams: Vec<IncomeStreamPayload>,
    #[serde(default)]
    milestones: Vec<MilestonePayload>,
    #[serde(default)]
    settings: Option<ForecastSettings>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn draft_id() -> String {
    format!("draft-{}", Uuid::new_v4())
}

fn stored_id() -> String {
    Uuid::new_v4().to_string()
}

fn resolve_assets(assets: Vec<AssetPayload>, make_id: fn() -> String) -> Vec<Asset> {
    assets
        .into_iter()
        .map(|payload| Asset {
            id: payload.id.unwrap_or_else(make_id),
            name: payload.name,
            amount: payload.amount,
            category: payload.category,
            growth_rate: payload.growth_rate,
        })
        .collect()
}

fn resolve_income_streams(
    streams: Vec<IncomeStreamPayload>,
    make_id: fn() -> String,
) -> Vec<IncomeStream> {
    streams
        .into_iter()
        .map(|payload| IncomeStream {
            id: payload.id.unwrap_or_else(make_id),
            name: payload.name,
            amount: payload.amount,
            frequency: payload.frequency,
            start_date: payload.start_date,
            end_date: payload.end_date,
            raise_rate: payload.raise_rate,
        })
        .collect()
}

fn resolve_milestones(milestones: Vec<MilestonePayload>, make_id: fn() -> String) -> Vec<Milestone> {
    milestones
        .into_iter()
        .map(|payload| Milestone {
            id: payload.id.unwrap_or_else(make_id),
            name: payload.name,
            kind: payload.kind,
            date: payload.date,
            impact: payload.impact,
        })
        .collect()
}

fn has_location(profile: Option<&PersonalProfilePayload>) -> bool {
    profile.is_some_and(|profile| profile.location.as_deref().is_some_and(|l| !l.is_empty()))
}

// Draft forecasts carry the minimum-data precondition; the engine itself
// never validates.
fn draft_snapshot(
    payload: DraftForecastPayload,
) -> Result<(ScenarioSnapshot, Option<ForecastSettings>), String> {
    let mut missing = Vec::new();
    if !has_location(payload.personal_profile.as_ref()) {
        missing.push("location");
    }
    if payload.assets.is_empty() {
        missing.push("assets");
    }
    if payload.income_streams.is_empty() {
        missing.push("income streams");
    }
    if !missing.is_empty() {
        return Err(format!("Missing required data: {}", missing.join(", ")));
    }

    let snapshot = ScenarioSnapshot {
        assets: resolve_assets(payload.assets, draft_id),
        income_streams: resolve_income_streams(payload.income_streams, draft_id),
        milestones: resolve_milestones(payload.milestones, draft_id),
    };
    Ok((snapshot, payload.settings))
}

fn scenario_record_from_payload(payload: CreateScenarioPayload) -> Result<ScenarioRecord, String> {
    if payload.name.trim().is_empty() {
        return Err("Scenario name is required".to_string());
    }

    Ok(ScenarioRecord {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
        location: payload
            .personal_profile
            .and_then(|profile| profile.location),
        assets: resolve_assets(payload.assets, stored_id),
        income_streams: resolve_income_streams(payload.income_streams, stored_id),
        milestones: resolve_milestones(payload.milestones, stored_id),
        settings: payload.settings,
        created_at: Utc::now(),
    })
}

pub async fn run_http_server(port: u16, defaults: ForecastSettings) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState {
        store: ScenarioStore::default(),
        defaults,
    });

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "forecast API listening");
    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/api/scenarios", post(create_scenario_handler))
        .route("/api/scenarios/:scenario_id", get(get_scenario_handler))
        .route("/api/forecast/draft", post(draft_forecast_handler))
        .route("/api/forecast/:scenario_id", post(forecast_scenario_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn create_scenario_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateScenarioPayload>,
) -> Response {
    match scenario_record_from_payload(payload) {
        Ok(record) => {
            state.store.insert(record.clone());
            tracing::info!(scenario_id = %record.id, name = %record.name, "scenario created");
            json_response(StatusCode::CREATED, record)
        }
        Err(message) => {
            tracing::warn!(error = %message, "rejected scenario payload");
            error_response(StatusCode::BAD_REQUEST, &message)
        }
    }
}

async fn get_scenario_handler(
    State(state): State<AppState>,
    Path(scenario_id): Path<Uuid>,
) -> Response {
    match state.store.get(scenario_id) {
        Some(record) => json_response(StatusCode::OK, record),
        None => error_response(StatusCode::NOT_FOUND, "Scenario not found"),
    }
}

async fn forecast_scenario_handler(
    State(state): State<AppState>,
    Path(scenario_id): Path<Uuid>,
) -> Response {
    // The not-found check runs before the engine is ever invoked.
    let Some(record) = state.store.get(scenario_id) else {
        return error_response(StatusCode::NOT_FOUND, "Scenario not found");
    };

    let settings = record.settings.clone().unwrap_or_else(|| state.defaults.clone());
    let snapshot = ScenarioSnapshot {
        assets: record.assets,
        income_streams: record.income_streams,
        milestones: record.milestones,
    };
    json_response(StatusCode::OK, project(&snapshot, &settings))
}

async fn draft_forecast_handler(
    State(state): State<AppState>,
    Json(payload): Json<DraftForecastPayload>,
) -> Response {
    match draft_snapshot(payload) {
        Ok((snapshot, settings)) => {
            let settings = settings.unwrap_or_else(|| state.defaults.clone());
            json_response(StatusCode::OK, project(&snapshot, &settings))
        }
        Err(message) => {
            tracing::warn!(error = %message, "rejected draft forecast");
            error_response(StatusCode::BAD_REQUEST, &message)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn draft_snapshot_from_json(
    json: &str,
) -> Result<(ScenarioSnapshot, Option<ForecastSettings>), String> {
    let payload = serde_json::from_str::<DraftForecastPayload>(json)
        .map_err(|e| format!("Invalid draft JSON payload: {e}"))?;
    draft_snapshot(payload)
}
