use crate::errors::DashResult;
use crate::metrics::summary::EnrichedPick;
use std::io::Write;

/// CSV column set, in output order. Fixed regardless of which fields the
/// underlying snapshots happened to carry.
pub const CSV_COLUMNS: [&str; 15] = [
    "date",
    "sport",
    "player",
    "team",
    "bet_type",
    "line",
    "side",
    "probability",
    "result",
    "outcome",
    "odds_american",
    "decimal_odds",
    "profit",
    "streak",
    "streak_type",
];

/// Write rows as CSV with a header. Missing values are empty cells.
pub fn write_csv<W: Write>(rows: &[EnrichedPick], writer: W) -> DashResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;

    for row in rows {
        let p = &row.pick;
        wtr.write_record([
            p.date.to_string(),
            p.sport.clone(),
            p.player.clone(),
            p.team.clone(),
            p.bet_type.clone(),
            num(p.line),
            p.side.clone(),
            num(p.probability),
            p.result.clone(),
            row.outcome.to_string(),
            num(p.odds_american),
            row.decimal_odds.map(|d| format!("{d:.3}")).unwrap_or_default(),
            format!("{:.2}", row.profit),
            num(p.streak),
            p.streak_type.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// CSV as UTF-8 bytes, ready for a download response.
pub fn to_csv_bytes(rows: &[EnrichedPick]) -> DashResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(buf)
}

fn num(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}
