mod engine;
mod types;

pub use engine::{ASSUMED_SAVINGS_RATE, PROJECTION_YEARS, START_YEAR, project};
pub use types::{
    Asset, AssetCategory, AssetProjection, DEFAULT_SETTINGS, ForecastResult, ForecastSettings,
    ForecastSummary, Frequency, IncomeStream, Milestone, MilestoneKind, ScenarioSnapshot,
    YearlyProjection,
};

pub(crate) use types::flexible_date;
