// Text report and CSV export of a loaded cohort.
//
// The text report goes to stdout: a ranked summary table, a shot-zone
// histogram for the configured view and the provider's per-bucket totals.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use hoopscope_core::event::HalfcourtAction;
use hoopscope_core::filter::{
    player_name, selection_label, zone_counts_with, EventFilter, PlayerSelection,
};
use hoopscope_core::geometry::{CourtGeometry, ShotZone};
use hoopscope_core::summary::{BucketTotals, CountKey, PlayerSummary};

use crate::loader::Cohort;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

const NAME_WIDTH: usize = 22;
const BAR_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Write the full text report for `cohort` as seen through `view`.
pub fn render<W: Write>(
    out: &mut W,
    cohort: &Cohort,
    view: &EventFilter,
    court: &CourtGeometry,
) -> io::Result<()> {
    write_summary_table(out, &cohort.summaries)?;
    writeln!(out)?;

    let label = selection_label(&cohort.players, view.selection);
    let visible = view.apply(&cohort.events);
    let zones = zone_counts_with(court, visible);
    write_zone_histogram(out, &label, &zones)?;

    for player in &cohort.players {
        if !view.selection.matches(player.id) {
            continue;
        }
        if let Some(rows) = cohort.breakdown(player.id).filter(|rows| !rows.is_empty()) {
            writeln!(out)?;
            write_breakdown(out, &player_name(&cohort.players, player.id), rows)?;
        }
    }

    if !cohort.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "Failed to load:")?;
        for (id, message) in &cohort.failures {
            writeln!(out, "  {id}: {message}")?;
        }
    }

    Ok(())
}

/// One row per player: each count followed by its cohort rank.
pub fn write_summary_table<W: Write>(out: &mut W, summaries: &[PlayerSummary]) -> io::Result<()> {
    write!(out, "{:<NAME_WIDTH$}", "Player")?;
    for key in CountKey::ALL {
        write!(out, " {:>11}", key.label())?;
    }
    writeln!(out)?;

    if summaries.is_empty() {
        return writeln!(out, "(no players loaded)");
    }

    for s in summaries {
        write!(out, "{:<NAME_WIDTH$}", truncate(&s.player.name, NAME_WIDTH))?;
        for (key, value) in s.counts.iter() {
            let cell = match s.rank(key) {
                Some(rank) => format!("{value} (#{rank})"),
                None => value.to_string(),
            };
            write!(out, " {cell:>11}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Zone counts as a horizontal bar chart, longest bar first.
pub fn write_zone_histogram<W: Write>(
    out: &mut W,
    label: &str,
    zones: &[(ShotZone, usize)],
) -> io::Result<()> {
    writeln!(out, "Zones: {label}")?;
    let Some(max) = zones.iter().map(|(_, n)| *n).max() else {
        return writeln!(out, "  (no events)");
    };
    for (zone, n) in zones {
        let len = (n * BAR_WIDTH).div_ceil(max.max(1));
        writeln!(out, "  {:<22} {:>4} {}", zone.label(), n, "#".repeat(len))?;
    }
    Ok(())
}

pub fn write_breakdown<W: Write>(
    out: &mut W,
    name: &str,
    rows: &[(HalfcourtAction, BucketTotals)],
) -> io::Result<()> {
    writeln!(out, "{name} by action")?;
    writeln!(
        out,
        "  {:<16} {:>5} {:>5} {:>5} {:>7} {:>5} {:>8}",
        "", "FGA", "PTS", "PASS", "POTAST", "TOV", "PASSTOV"
    )?;
    for (action, t) in rows {
        writeln!(
            out,
            "  {:<16} {:>5} {:>5} {:>5} {:>7} {:>5} {:>8}",
            action.label(),
            t.shot_attempts,
            t.points,
            t.passes,
            t.potential_assists,
            t.turnovers,
            t.passing_turnovers
        )?;
    }
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width - 1).collect();
        t.push('~');
        t
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Header row: `player_id, name, team`, then each count and its rank.
pub fn csv_header() -> Vec<String> {
    let mut header = vec!["player_id".to_string(), "name".to_string(), "team".to_string()];
    for key in CountKey::ALL {
        header.push(key.wire_name().to_string());
        header.push(key.rank_name().to_string());
    }
    header
}

/// Write summaries as CSV. Missing ranks are empty cells.
pub fn write_summaries_csv<W: Write>(writer: W, summaries: &[PlayerSummary]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(csv_header())?;
    for s in summaries {
        let mut record = vec![
            s.player.id.to_string(),
            s.player.name.clone(),
            s.player.team.clone().unwrap_or_default(),
        ];
        for (key, value) in s.counts.iter() {
            record.push(value.to_string());
            record.push(s.rank(key).map(|r| r.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_summaries_csv(path: &Path, summaries: &[PlayerSummary]) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_summaries_csv(file, summaries).map_err(|e| ReportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Selection shorthand used by log lines.
pub fn describe_selection(selection: PlayerSelection) -> String {
    match selection {
        PlayerSelection::All => "all players".into(),
        PlayerSelection::Player(id) => format!("player {id}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
