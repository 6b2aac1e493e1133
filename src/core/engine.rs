use chrono::Datelike;

use super::types::{
    Asset, AssetCategory, AssetProjection, ForecastResult, ForecastSettings, ForecastSummary,
    Frequency, IncomeStream, Milestone, ScenarioSnapshot, YearlyProjection,
};

// Fixed reference year so identical inputs always produce identical timelines.
pub const START_YEAR: i32 = 2024;
pub const PROJECTION_YEARS: usize = 30;
pub const ASSUMED_SAVINGS_RATE: f64 = 0.20;

pub fn project(snapshot: &ScenarioSnapshot, settings: &ForecastSettings) -> ForecastResult {
    // Effective growth rates are resolved once here and stay frozen for the run.
    let mut assets: Vec<AssetProjection> = snapshot
        .assets
        .iter()
        .map(|asset| AssetProjection {
            id: asset.id.clone(),
            name: asset.name.clone(),
            amount: asset.amount,
            growth_rate: resolve_growth_rate(asset, settings),
            category: asset.category,
        })
        .collect();

    let mut timeline = Vec::with_capacity(PROJECTION_YEARS);
    for year_index in 0..PROJECTION_YEARS {
        let year = START_YEAR + year_index as i32;

        let total_income = project_income_for_year(
            &snapshot.income_streams,
            year,
            year_index,
            settings.inflation_rate,
        );

        assets = grow_assets(&assets);

        let year_milestones = milestones_in_year(&snapshot.milestones, year);
        let milestone_impact: f64 = year_milestones.iter().map(|m| m.impact).sum();
        if milestone_impact != 0.0 {
            if let Some(target) = injection_target(&assets) {
                assets[target].amount += milestone_impact;
            }
        }

        // Net worth is recorded before this year's forced savings land.
        let net_worth: f64 = assets.iter().map(|asset| asset.amount).sum();

        let savings_from_income = total_income * ASSUMED_SAVINGS_RATE;
        if savings_from_income > 0.0 {
            if let Some(target) = injection_target(&assets) {
                assets[target].amount += savings_from_income;
            }
        }

        timeline.push(YearlyProjection {
            year,
            net_worth,
            total_income,
            total_expenses: total_income - savings_from_income,
            assets: assets.clone(),
            milestones: year_milestones,
            savings_rate: if total_income > 0.0 {
                savings_from_income / total_income * 100.0
            } else {
                0.0
            },
        });
    }

    let starting_net_worth = timeline.first().map_or(0.0, |entry| entry.net_worth);
    let ending_net_worth = timeline.last().map_or(0.0, |entry| entry.net_worth);
    let summary = ForecastSummary {
        starting_net_worth,
        ending_net_worth,
        total_years: PROJECTION_YEARS as u32,
        total_income_projected: timeline.iter().map(|entry| entry.total_income).sum(),
        average_annual_growth: compound_annual_growth(
            starting_net_worth,
            ending_net_worth,
            PROJECTION_YEARS as u32,
        ),
    };

    ForecastResult { timeline, summary }
}

fn resolve_growth_rate(asset: &Asset, settings: &ForecastSettings) -> f64 {
    if let Some(rate) = asset.growth_rate {
        return rate;
    }
    match asset.category {
        AssetCategory::RealEstate => settings.real_estate_growth,
        AssetCategory::Taxable
        | AssetCategory::TaxDeferred
        | AssetCategory::TaxFree
        | AssetCategory::Crypto => settings.stock_growth_rate,
    }
}

fn grow_assets(assets: &[AssetProjection]) -> Vec<AssetProjection> {
    assets
        .iter()
        .map(|asset| AssetProjection {
            amount: asset.amount * (1.0 + asset.growth_rate / 100.0),
            ..asset.clone()
        })
        .collect()
}

fn project_income_for_year(
    streams: &[IncomeStream],
    target_year: i32,
    year_index: usize,
    inflation_rate: f64,
) -> f64 {
    streams
        .iter()
        .filter(|stream| stream_is_active(stream, target_year))
        .map(|stream| {
            let mut annual = annualized_base(stream);
            if let Some(raise_rate) = stream.raise_rate {
                if year_index > 0 {
                    annual *= (1.0 + raise_rate / 100.0).powi(year_index as i32);
                }
            }
            // Inflation compounds from the projection start, not the stream start.
            annual * (1.0 + inflation_rate / 100.0).powi(year_index as i32)
        })
        .sum()
}

fn stream_is_active(stream: &IncomeStream, target_year: i32) -> bool {
    stream.start_date.year() <= target_year
        && stream.end_date.is_none_or(|end| end.year() >= target_year)
}

fn annualized_base(stream: &IncomeStream) -> f64 {
    match stream.frequency {
        Frequency::Quarterly => stream.amount * 4.0,
        Frequency::Annually => stream.amount,
        // Unrecognized frequencies behave as monthly.
        Frequency::Monthly | Frequency::Other => stream.amount * 12.0,
    }
}

fn milestones_in_year(milestones: &[Milestone], target_year: i32) -> Vec<Milestone> {
    milestones
        .iter()
        .filter(|milestone| milestone.date.year() == target_year)
        .cloned()
        .collect()
}

// One-time impacts and forced savings all land in a single asset: the first
// taxable account, or the first asset when no taxable account exists.
fn injection_target(assets: &[AssetProjection]) -> Option<usize> {
    assets
        .iter()
        .position(|asset| asset.category == AssetCategory::Taxable)
        .or_else(|| (!assets.is_empty()).then_some(0))
}

fn compound_annual_growth(starting: f64, ending: f64, years: u32) -> f64 {
    if starting <= 0.0 || years == 0 {
        return 0.0;
    }
    ((ending / starting).powf(1.0 / f64::from(years)) - 1.0) * 100.0
}
