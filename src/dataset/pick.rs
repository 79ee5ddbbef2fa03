use chrono::NaiveDate;
use serde_json::Value;

/// One loosely-typed row exactly as it came out of a snapshot file.
pub type RawRow = serde_json::Map<String, Value>;

// ── Column names ──
//
// Canonical name first, then the Spanish name older snapshots use for the
// same column. The first non-null key wins. Only columns whose meaning is
// unambiguous get an alias; a price column in another convention is not
// American odds and is never read as such.

const SPORT: &[&str] = &["sport"];
const PLAYER: &[&str] = &["player", "jugador"];
const TEAM: &[&str] = &["team"];
const BET_TYPE: &[&str] = &["bet_type", "tipo"];
const LINE: &[&str] = &["line"];
const SIDE: &[&str] = &["side", "lado"];
const PROBABILITY: &[&str] = &["probability"];
const RESULT: &[&str] = &["result", "resultado"];
const ODDS_AMERICAN: &[&str] = &["odds_american"];
const STREAK: &[&str] = &["streak"];
const STREAK_TYPE: &[&str] = &["streak_type"];

/// Defaults injected for base fields a snapshot does not carry.
#[derive(Debug, Clone)]
pub struct PickDefaults {
    pub sport: String,
}

impl Default for PickDefaults {
    fn default() -> Self {
        Self { sport: "NBA".into() }
    }
}

/// A single pick after normalization. Text fields are never null;
/// numeric fields are `None` when absent or not coercible.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Pick {
    /// Snapshot date. Comes from the file identity, never from row content.
    pub date: NaiveDate,
    pub sport: String,
    pub player: String,
    pub team: String,
    pub bet_type: String,
    pub line: Option<f64>,
    pub side: String,
    pub probability: Option<f64>,
    pub result: String,
    pub odds_american: Option<f64>,
    pub streak: Option<f64>,
    pub streak_type: String,
}

impl Pick {
    /// Normalize a raw row. Any embedded date field in `row` is ignored.
    pub fn from_raw(date: NaiveDate, row: &RawRow, defaults: &PickDefaults) -> Self {
        Self {
            date,
            sport: text_or(row, SPORT, &defaults.sport),
            player: text_or(row, PLAYER, ""),
            team: text_or(row, TEAM, ""),
            bet_type: text_or(row, BET_TYPE, ""),
            line: number(row, LINE),
            side: text_or(row, SIDE, ""),
            probability: number(row, PROBABILITY),
            result: text_or(row, RESULT, ""),
            odds_american: number(row, ODDS_AMERICAN),
            streak: number(row, STREAK),
            streak_type: text_or(row, STREAK_TYPE, ""),
        }
    }
}

fn lookup<'a>(row: &'a RawRow, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| row.get(*k)).find(|v| !v.is_null())
}

fn text_or(row: &RawRow, keys: &[&str], default: &str) -> String {
    lookup(row, keys)
        .and_then(coerce_text)
        .unwrap_or_else(|| default.to_string())
}

fn number(row: &RawRow, keys: &[&str]) -> Option<f64> {
    lookup(row, keys).and_then(coerce_number)
}

/// Render a scalar as text. Null-like values yield `None`.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Coerce a JSON value to a finite number. Anything that does not parse is
/// missing, not zero.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> RawRow {
        match v {
            Value::Object(m) => m,
            _ => panic!("test row must be an object"),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 3).unwrap()
    }

    #[test]
    fn test_absent_fields_get_defaults() {
        let pick = Pick::from_raw(day(), &RawRow::new(), &PickDefaults::default());
        assert_eq!(pick.sport, "NBA");
        assert_eq!(pick.player, "");
        assert_eq!(pick.team, "");
        assert_eq!(pick.result, "");
        assert_eq!(pick.line, None);
        assert_eq!(pick.probability, None);
        assert_eq!(pick.odds_american, None);
        assert_eq!(pick.streak, None);
    }

    #[test]
    fn test_null_text_becomes_empty() {
        let r = row(json!({"player": null, "side": null, "sport": null}));
        let pick = Pick::from_raw(day(), &r, &PickDefaults { sport: "NHL".into() });
        assert_eq!(pick.player, "");
        assert_eq!(pick.side, "");
        assert_eq!(pick.sport, "NHL");
    }

    #[test]
    fn test_numeric_coercion() {
        let r = row(json!({
            "odds_american": "+150",
            "probability": "0.62",
            "line": 24.5,
            "streak": "n/a",
        }));
        let pick = Pick::from_raw(day(), &r, &PickDefaults::default());
        assert_eq!(pick.odds_american, Some(150.0));
        assert_eq!(pick.probability, Some(0.62));
        assert_eq!(pick.line, Some(24.5));
        assert_eq!(pick.streak, None, "unparseable streak must be missing, not zero");
    }

    #[test]
    fn test_non_finite_strings_are_missing() {
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn test_spanish_aliases() {
        let r = row(json!({
            "jugador": "Luka Doncic",
            "tipo": "puntos",
            "lado": "over",
            "resultado": "✅ 34 pts",
        }));
        let pick = Pick::from_raw(day(), &r, &PickDefaults::default());
        assert_eq!(pick.player, "Luka Doncic");
        assert_eq!(pick.bet_type, "puntos");
        assert_eq!(pick.side, "over");
        assert_eq!(pick.result, "✅ 34 pts");
    }

    #[test]
    fn test_other_price_columns_are_not_american_odds() {
        let r = row(json!({"cuota": 1.91, "odds": 1.91, "result": "✅"}));
        let pick = Pick::from_raw(day(), &r, &PickDefaults::default());
        assert_eq!(
            pick.odds_american, None,
            "a decimal price must not be read as American odds"
        );
    }

    #[test]
    fn test_embedded_date_is_ignored() {
        let r = row(json!({"date": "1999-01-01", "player": "X"}));
        let pick = Pick::from_raw(day(), &r, &PickDefaults::default());
        assert_eq!(pick.date, day());
    }

    #[test]
    fn test_numeric_text_fields_render() {
        let r = row(json!({"team": 76, "player": "Embiid"}));
        let pick = Pick::from_raw(day(), &r, &PickDefaults::default());
        assert_eq!(pick.team, "76");
    }
}
