//! Output formatting and persistence for cycle results.
//!
//! Supports a plain-text report, JSON serialization, and CSV append.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::align::RankedPrediction;
use crate::delays::{DelayNotice, NO_DELAYS};
use crate::pipeline::CycleOutcome;

/// One CSV row: a single ranked cause for a single train.
#[derive(Debug, Serialize)]
pub struct PredictionRecord {
    pub fetched_at: DateTime<Utc>,
    pub trip_id: String,
    pub branch: String,
    pub station: String,
    pub departure: String,
    pub rank: usize,
    pub cause: String,
    pub probability: f64,
}

pub fn records(fetched_at: DateTime<Utc>, predictions: &[RankedPrediction]) -> Vec<PredictionRecord> {
    predictions
        .iter()
        .flat_map(|p| {
            p.causes.iter().enumerate().map(move |(i, c)| PredictionRecord {
                fetched_at,
                trip_id: p.observation.trip_id.clone(),
                branch: p.observation.branch.clone(),
                station: p.observation.station.clone(),
                departure: p.observation.departure.to_rfc3339(),
                rank: i + 1,
                cause: c.cause.clone(),
                probability: c.probability,
            })
        })
        .collect()
}

/// Logs ranked predictions using Rust's debug pretty-print format.
pub fn print_pretty(predictions: &[RankedPrediction]) {
    debug!("{:#?}", predictions);
}

/// Renders ranked predictions as pretty-printed JSON.
pub fn to_json(predictions: &[RankedPrediction], limit: usize) -> Result<String> {
    let shown = &predictions[..predictions.len().min(limit)];
    Ok(serde_json::to_string_pretty(shown)?)
}

/// Renders a cycle outcome for the terminal, showing at most `limit` trains.
pub fn render_outcome(outcome: &CycleOutcome, limit: usize) -> String {
    let predictions = match outcome {
        CycleOutcome::Success(predictions) => predictions,
        other => return other.message().unwrap_or_default(),
    };

    let mut out = format!(
        "Found {} active trains. Showing top predictions:\n",
        predictions.len()
    );
    for p in predictions.iter().take(limit) {
        let o = &p.observation;
        let _ = writeln!(
            out,
            "\n{} Train departing from {} at {}",
            o.branch,
            o.station,
            o.departure.format("%H:%M")
        );
        let _ = writeln!(out, "  Top {} Likely Delay Causes:", p.causes.len());
        for c in &p.causes {
            let _ = writeln!(out, "    {:<32} {:>5.1}%", c.cause, c.probability * 100.0);
        }
    }
    out
}

pub fn render_delays(delays: &[DelayNotice]) -> String {
    if delays.is_empty() {
        return NO_DELAYS.to_string();
    }
    let mut out = String::from("--- LIVE LIRR DELAY REPORT ---\n");
    for d in delays {
        let _ = writeln!(
            out,
            "Train on route '{}' ({}) is delayed by {} minutes.",
            d.route_id, d.branch, d.minutes
        );
    }
    out
}

/// Appends prediction records as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, records: &[PredictionRecord]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
