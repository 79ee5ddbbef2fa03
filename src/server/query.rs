use crate::dataset::filters::{FilterSpec, PlayerMatch, ProbabilityRange, Selection};
use crate::errors::{DashError, DashResult};
use crate::metrics::summary::RoiMode;
use crate::report::{DateSelection, ReportOptions};
use chrono::NaiveDate;

/// Query string shared by the summary, facets and export endpoints.
///
/// Dates: `date=YYYY-MM-DD`, or `from`/`to` (inclusive, either may be
/// omitted); neither means the latest snapshot. Categorical filters take one
/// value, or several by repeating the parameter (`side=over&side=under`).
/// Values are matched verbatim, commas included. A range filter is on when
/// any of its bounds is given.
#[derive(Debug, Default)]
pub struct ReportQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sport: Vec<String>,
    pub player: Vec<String>,
    pub player_match: Option<String>,
    pub bet_type: Vec<String>,
    pub side: Vec<String>,
    pub result: Vec<String>,
    pub prob_min: Option<String>,
    pub prob_max: Option<String>,
    pub odds_min: Option<String>,
    pub streak_min: Option<String>,
    pub roi: Option<String>,
}

impl ReportQuery {
    /// Collect decoded `key=value` pairs. Repeated categorical keys
    /// accumulate; for scalar keys the last occurrence wins. Unknown keys
    /// are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut q = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "date" => q.date = Some(value),
                "from" => q.from = Some(value),
                "to" => q.to = Some(value),
                "sport" => q.sport.push(value),
                "player" => q.player.push(value),
                "player_match" => q.player_match = Some(value),
                "bet_type" => q.bet_type.push(value),
                "side" => q.side.push(value),
                "result" => q.result.push(value),
                "prob_min" => q.prob_min = Some(value),
                "prob_max" => q.prob_max = Some(value),
                "odds_min" => q.odds_min = Some(value),
                "streak_min" => q.streak_min = Some(value),
                "roi" => q.roi = Some(value),
                _ => {}
            }
        }
        q
    }

    pub fn date_selection(&self) -> DashResult<DateSelection> {
        if let Some(date) = non_empty(&self.date) {
            return Ok(DateSelection::Single(parse_date(date)?));
        }
        let from = non_empty(&self.from).map(parse_date).transpose()?;
        let to = non_empty(&self.to).map(parse_date).transpose()?;
        if from.is_none() && to.is_none() {
            return Ok(DateSelection::Latest);
        }
        Ok(DateSelection::Range { from, to })
    }

    pub fn filter_spec(&self, default_player_match: PlayerMatch) -> DashResult<FilterSpec> {
        let player_match = match non_empty(&self.player_match) {
            Some(mode) => mode.parse::<PlayerMatch>().map_err(DashError::InvalidQuery)?,
            None => default_player_match,
        };

        let prob_min = parse_bound("prob_min", &self.prob_min)?;
        let prob_max = parse_bound("prob_max", &self.prob_max)?;
        let probability = match (prob_min, prob_max) {
            (None, None) => None,
            (min, max) => Some(ProbabilityRange::clamped(min.unwrap_or(0.0), max.unwrap_or(1.0))),
        };

        Ok(FilterSpec {
            sport: Selection::from_values(self.sport.iter().cloned()),
            player: Selection::from_values(self.player.iter().cloned()),
            player_match,
            bet_type: Selection::from_values(self.bet_type.iter().cloned()),
            side: Selection::from_values(self.side.iter().cloned()),
            result: Selection::from_values(self.result.iter().cloned()),
            probability,
            min_odds: parse_bound("odds_min", &self.odds_min)?,
            min_streak: parse_bound("streak_min", &self.streak_min)?,
        })
    }

    pub fn report_options(&self, defaults: ReportOptions) -> DashResult<ReportOptions> {
        let roi_mode = match non_empty(&self.roi) {
            Some(mode) => mode.parse::<RoiMode>().map_err(DashError::InvalidQuery)?,
            None => defaults.roi_mode,
        };
        Ok(ReportOptions { roi_mode, ..defaults })
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> DashResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| DashError::InvalidDate(format!("{s}: {e}")))
}

/// Empty means "not given"; anything else must be a finite number.
fn parse_bound(name: &str, v: &Option<String>) -> DashResult<Option<f64>> {
    let Some(raw) = non_empty(v) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Some(x)),
        _ => Err(DashError::InvalidQuery(format!("{name}: not a number: {raw:?}"))),
    }
}
