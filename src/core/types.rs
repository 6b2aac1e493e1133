use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    Taxable,
    TaxDeferred,
    TaxFree,
    RealEstate,
    Crypto,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annually,
    // Any unrecognized frequency value lands here; the engine treats it as monthly.
    #[serde(other)]
    Other,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneKind {
    Retirement,
    College,
    MajorPurchase,
    IncomeChange,
    DeathOfSpouse,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub category: AssetCategory,
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStream {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub start_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_date::deserialize_opt")]
    pub end_date: Option<DateTime<Utc>>,
    pub raise_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub date: DateTime<Utc>,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSettings {
    pub inflation_rate: f64,
    pub stock_growth_rate: f64,
    pub real_estate_growth: f64,
}

pub const DEFAULT_SETTINGS: ForecastSettings = ForecastSettings {
    inflation_rate: 2.5,
    stock_growth_rate: 7.0,
    real_estate_growth: 3.0,
};

impl Default for ForecastSettings {
    fn default() -> Self {
        DEFAULT_SETTINGS
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioSnapshot {
    pub assets: Vec<Asset>,
    pub income_streams: Vec<IncomeStream>,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProjection {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub growth_rate: f64,
    pub category: AssetCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjection {
    pub year: i32,
    pub net_worth: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub assets: Vec<AssetProjection>,
    pub milestones: Vec<Milestone>,
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub starting_net_worth: f64,
    pub ending_net_worth: f64,
    pub total_years: u32,
    pub total_income_projected: f64,
    pub average_annual_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub timeline: Vec<YearlyProjection>,
    pub summary: ForecastSummary,
}

pub(crate) mod flexible_date {
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use serde::{Deserialize, Deserializer};

    // Persisted rows carry RFC 3339 timestamps; draft forms send bare dates.
    pub(crate) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Ok(timestamp.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|_| format!("invalid date: {raw:?} (expected RFC 3339 or YYYY-MM-DD)"))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(crate) fn deserialize_opt<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| parse(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn unknown_frequency_deserializes_to_other() {
        let frequency: Frequency = serde_json::from_str("\"BIWEEKLY\"").expect("should parse");
        assert_eq!(frequency, Frequency::Other);
    }

    #[test]
    fn known_frequencies_deserialize_exactly() {
        for (raw, expected) in [
            ("\"MONTHLY\"", Frequency::Monthly),
            ("\"QUARTERLY\"", Frequency::Quarterly),
            ("\"ANNUALLY\"", Frequency::Annually),
        ] {
            let frequency: Frequency = serde_json::from_str(raw).expect("should parse");
            assert_eq!(frequency, expected);
        }
    }

    #[test]
    fn flexible_date_accepts_bare_dates_and_timestamps() {
        let bare = flexible_date::parse("2026-06-01").expect("bare date should parse");
        assert_eq!((bare.year(), bare.month(), bare.day()), (2026, 6, 1));

        let stamped =
            flexible_date::parse("2026-06-01T12:30:00.000Z").expect("timestamp should parse");
        assert_eq!(stamped.year(), 2026);
    }

    #[test]
    fn flexible_date_rejects_garbage() {
        let err = flexible_date::parse("June 1st").expect_err("must reject");
        assert!(err.contains("invalid date"));
    }

    #[test]
    fn milestone_kind_uses_wire_field_name_type() {
        let json = r#"{
          "id": "m-1",
          "name": "New Car Purchase",
          "type": "MAJOR_PURCHASE",
          "date": "2026-06-01",
          "impact": -30000
        }"#;
        let milestone: Milestone = serde_json::from_str(json).expect("should parse");
        assert_eq!(milestone.kind, MilestoneKind::MajorPurchase);
        assert_eq!(milestone.impact, -30000.0);
    }

    #[test]
    fn default_settings_match_documented_values() {
        let settings = ForecastSettings::default();
        assert_eq!(settings.inflation_rate, 2.5);
        assert_eq!(settings.stock_growth_rate, 7.0);
        assert_eq!(settings.real_estate_growth, 3.0);
    }
}
