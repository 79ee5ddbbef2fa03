//! Flat-stake performance metrics over a set of picks.
//! Everything here is pure: same rows and stake always give the same result.

use super::odds::decimal_odds;
use super::outcome::Outcome;
use crate::dataset::pick::Pick;
use std::str::FromStr;

/// How ROI is normalized. The two dashboards disagree, so both are kept
/// and the caller picks one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RoiMode {
    /// `100 * profit / (total * stake)`: return on money staked.
    #[default]
    #[serde(rename = "stake")]
    StakeNormalized,
    /// `100 * profit / total`: profit per pick, stake ignored.
    #[serde(rename = "count")]
    CountNormalized,
}

impl RoiMode {
    #[inline]
    pub fn roi(self, total_profit: f64, total: usize, stake: f64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let denom = match self {
            RoiMode::StakeNormalized => total as f64 * stake,
            RoiMode::CountNormalized => total as f64,
        };
        if denom == 0.0 {
            return 0.0;
        }
        100.0 * total_profit / denom
    }
}

impl FromStr for RoiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stake" | "stake_normalized" => Ok(Self::StakeNormalized),
            "count" | "count_normalized" => Ok(Self::CountNormalized),
            other => Err(format!("unknown ROI mode {other:?}")),
        }
    }
}

/// Profit of one pick at flat stake `stake`.
///
/// A win with no usable price earns nothing rather than failing; void,
/// error and unrecognized rows are flat.
#[inline]
pub fn row_profit(outcome: Outcome, decimal: Option<f64>, stake: f64) -> f64 {
    match outcome {
        Outcome::Win => decimal.map(|d| (d - 1.0) * stake).unwrap_or(0.0),
        Outcome::Loss => -stake,
        Outcome::Void | Outcome::Error | Outcome::Unrecognized => 0.0,
    }
}

/// A pick plus the values derived from it. This is the table/CSV row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EnrichedPick {
    #[serde(flatten)]
    pub pick: Pick,
    pub outcome: Outcome,
    pub decimal_odds: Option<f64>,
    pub profit: f64,
}

impl EnrichedPick {
    pub fn new(pick: &Pick, stake: f64) -> Self {
        let outcome = Outcome::classify(&pick.result);
        let decimal = decimal_odds(pick.odds_american);
        Self {
            pick: pick.clone(),
            outcome,
            decimal_odds: decimal,
            profit: row_profit(outcome, decimal, stake),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricsSummary {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub voids: usize,
    pub errors: usize,
    pub unrecognized: usize,
    /// Percent, rounded to 2 dp.
    pub accuracy: f64,
    pub accuracy_raw: f64,
    pub stake: f64,
    pub total_staked: f64,
    pub total_profit: f64,
    /// Percent, rounded to 2 dp.
    pub roi: f64,
    pub roi_mode: RoiMode,
}

impl MetricsSummary {
    /// All-zero metrics for an empty selection.
    pub fn empty(stake: f64, roi_mode: RoiMode) -> Self {
        Self {
            total: 0,
            wins: 0,
            losses: 0,
            voids: 0,
            errors: 0,
            unrecognized: 0,
            accuracy: 0.0,
            accuracy_raw: 0.0,
            stake,
            total_staked: 0.0,
            total_profit: 0.0,
            roi: 0.0,
            roi_mode,
        }
    }
}

/// Single-pass accumulator. Each row is classified once, when pushed.
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    stake: f64,
    total: usize,
    wins: usize,
    losses: usize,
    voids: usize,
    errors: usize,
    unrecognized: usize,
    total_profit: f64,
}

impl MetricsAccumulator {
    pub fn new(stake: f64) -> Self {
        Self {
            stake,
            total: 0,
            wins: 0,
            losses: 0,
            voids: 0,
            errors: 0,
            unrecognized: 0,
            total_profit: 0.0,
        }
    }

    pub fn push(&mut self, pick: &Pick) -> EnrichedPick {
        let row = EnrichedPick::new(pick, self.stake);
        self.total += 1;
        match row.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Void => self.voids += 1,
            Outcome::Error => self.errors += 1,
            Outcome::Unrecognized => self.unrecognized += 1,
        }
        self.total_profit += row.profit;
        row
    }

    pub fn finish(&self, roi_mode: RoiMode) -> MetricsSummary {
        if self.total == 0 {
            return MetricsSummary::empty(self.stake, roi_mode);
        }
        let accuracy_raw = 100.0 * self.wins as f64 / self.total as f64;
        MetricsSummary {
            total: self.total,
            wins: self.wins,
            losses: self.losses,
            voids: self.voids,
            errors: self.errors,
            unrecognized: self.unrecognized,
            accuracy: round2(accuracy_raw),
            accuracy_raw,
            stake: self.stake,
            total_staked: self.total as f64 * self.stake,
            total_profit: self.total_profit,
            roi: round2(roi_mode.roi(self.total_profit, self.total, self.stake)),
            roi_mode,
        }
    }
}

/// Enrich every row and aggregate in one pass. Row order is kept.
pub fn compute_metrics<'a, I>(rows: I, stake: f64, roi_mode: RoiMode) -> (Vec<EnrichedPick>, MetricsSummary)
where
    I: IntoIterator<Item = &'a Pick>,
{
    let mut acc = MetricsAccumulator::new(stake);
    let enriched: Vec<EnrichedPick> = rows.into_iter().map(|p| acc.push(p)).collect();
    (enriched, acc.finish(roi_mode))
}

#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
