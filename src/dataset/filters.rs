use super::pick::Pick;
use std::collections::BTreeSet;
use std::str::FromStr;

// ── Equality filters ──

/// Restriction on one categorical column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// No restriction.
    #[default]
    Any,
    Exactly(String),
    /// Any of several values (multiselect).
    OneOf(BTreeSet<String>),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::Any => true,
            Selection::Exactly(want) => want == value,
            Selection::OneOf(set) => set.contains(value),
        }
    }

    /// Build from every value given for one query parameter. Values are
    /// taken verbatim, commas included. No values, or only empty/`*`
    /// values, is `Any`; one value is `Exactly`; several are `OneOf`.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut set: BTreeSet<String> = values
            .into_iter()
            .map(Into::into)
            .filter(|v| !v.is_empty() && v.as_str() != "*")
            .collect();
        match set.len() {
            0 => Selection::Any,
            1 => match set.pop_first() {
                Some(only) => Selection::Exactly(only),
                None => Selection::Any,
            },
            _ => Selection::OneOf(set),
        }
    }
}

/// How the player selection is compared against a pick's player.
/// `Exact` is the multi-date dashboard; `Contains` is the single-date
/// dashboard's case-insensitive search box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMatch {
    #[default]
    Exact,
    Contains,
}

impl FromStr for PlayerMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "contains" | "search" => Ok(Self::Contains),
            other => Err(format!("unknown player match mode {other:?}")),
        }
    }
}

// ── Range filters ──

/// Inclusive probability window.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ProbabilityRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ProbabilityRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ProbabilityRange {
    /// Bounds clamped into [0, 1] and put in order.
    pub fn clamped(min: f64, max: f64) -> Self {
        let lo = min.clamp(0.0, 1.0);
        let hi = max.clamp(0.0, 1.0);
        Self {
            min: lo.min(hi),
            max: lo.max(hi),
        }
    }

    /// Missing probability never matches.
    #[inline]
    pub fn contains(&self, probability: Option<f64>) -> bool {
        probability.is_some_and(|p| p >= self.min && p <= self.max)
    }
}

// ── Filter spec ──

/// Every active criterion must hold (logical AND). A range filter that is
/// `None` is disabled and excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub sport: Selection,
    pub player: Selection,
    pub player_match: PlayerMatch,
    pub bet_type: Selection,
    pub side: Selection,
    pub result: Selection,
    pub probability: Option<ProbabilityRange>,
    /// Lower bound on American odds.
    pub min_odds: Option<f64>,
    /// Lower bound on streak; missing streak counts as 0.
    pub min_streak: Option<f64>,
}

impl FilterSpec {
    fn matches_player(&self, player: &str) -> bool {
        match self.player_match {
            PlayerMatch::Exact => self.player.matches(player),
            PlayerMatch::Contains => {
                let haystack = player.to_lowercase();
                let found = |needle: &String| {
                    needle.trim().is_empty() || haystack.contains(&needle.to_lowercase())
                };
                match &self.player {
                    Selection::Any => true,
                    Selection::Exactly(needle) => found(needle),
                    Selection::OneOf(needles) => needles.iter().any(found),
                }
            }
        }
    }

    pub fn matches_selection(&self, pick: &Pick) -> bool {
        self.sport.matches(&pick.sport)
            && self.matches_player(&pick.player)
            && self.bet_type.matches(&pick.bet_type)
            && self.side.matches(&pick.side)
            && self.result.matches(&pick.result)
    }

    pub fn matches_range(&self, pick: &Pick) -> bool {
        if let Some(range) = &self.probability {
            if !range.contains(pick.probability) {
                return false;
            }
        }
        if let Some(min) = self.min_odds {
            if !pick.odds_american.is_some_and(|o| o >= min) {
                return false;
            }
        }
        if let Some(min) = self.min_streak {
            if pick.streak.unwrap_or(0.0) < min {
                return false;
            }
        }
        true
    }

    pub fn has_range_filters(&self) -> bool {
        self.probability.is_some() || self.min_odds.is_some() || self.min_streak.is_some()
    }
}

/// Rows that survived filtering, with how many each stage removed.
#[derive(Debug, Clone)]
pub struct FilteredPicks<'a> {
    pub rows: Vec<&'a Pick>,
    pub removed_by_selection: usize,
    pub removed_by_range: usize,
}

/// Apply equality filters, then range filters. Order of `picks` is kept.
pub fn apply_filters<'a>(picks: &'a [Pick], spec: &FilterSpec) -> FilteredPicks<'a> {
    let selected: Vec<&Pick> = picks.iter().filter(|p| spec.matches_selection(p)).collect();
    let removed_by_selection = picks.len() - selected.len();

    let before_range = selected.len();
    let rows: Vec<&Pick> = selected.into_iter().filter(|p| spec.matches_range(p)).collect();
    let removed_by_range = before_range - rows.len();

    FilteredPicks {
        rows,
        removed_by_selection,
        removed_by_range,
    }
}

// ── Facets ──

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

/// Min/max over the values that are present. Missing values are skipped,
/// never read as zero.
pub fn observed_range<F>(picks: &[Pick], field: F) -> Option<NumericRange>
where
    F: Fn(&Pick) -> Option<f64>,
{
    picks.iter().filter_map(field).fold(None, |acc, v| match acc {
        None => Some(NumericRange { min: v, max: v }),
        Some(r) => Some(NumericRange {
            min: r.min.min(v),
            max: r.max.max(v),
        }),
    })
}

/// Option lists and bounds for building filter controls.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Facets {
    pub sports: Vec<String>,
    pub players: Vec<String>,
    pub bet_types: Vec<String>,
    pub sides: Vec<String>,
    pub results: Vec<String>,
    pub probability: Option<NumericRange>,
    pub odds_american: Option<NumericRange>,
    pub streak: Option<NumericRange>,
}

impl Facets {
    pub fn from_picks(picks: &[Pick]) -> Self {
        Self {
            sports: distinct(picks, |p| &p.sport),
            players: distinct(picks, |p| &p.player),
            bet_types: distinct(picks, |p| &p.bet_type),
            sides: distinct(picks, |p| &p.side),
            results: distinct(picks, |p| &p.result),
            probability: observed_range(picks, |p| p.probability),
            odds_american: observed_range(picks, |p| p.odds_american),
            streak: observed_range(picks, |p| p.streak),
        }
    }
}

fn distinct<F>(picks: &[Pick], field: F) -> Vec<String>
where
    F: Fn(&Pick) -> &String,
{
    picks
        .iter()
        .map(field)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
