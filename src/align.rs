//! Alignment of feature rows to the trained column layout, and ranking of the
//! model's per-class probabilities.
//!
//! Categorical features are expanded over the values observed in the batch,
//! as the training pipeline did, and the result is then reindexed onto the
//! trained columns: columns the batch never produced are zero, columns the
//! model does not know are dropped.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::ModelError;
use crate::extract::Observation;
use crate::features::FeatureRow;
use crate::model::{Classifier, FeatureMatrix};

/// Number of causes kept per train.
pub const TOP_CAUSES: usize = 3;

const NUMERIC_COLUMNS: [&str; 4] = ["is_holiday", "is_hub_station", "day_of_week", "hour"];
const BRANCH_PREFIX: &str = "Branch";
const RUSH_HOUR_PREFIX: &str = "rush_hour";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseProbability {
    pub cause: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub observation: Observation,
    pub causes: Vec<CauseProbability>,
}

/// One-hot encodes a batch. Numeric columns come first, then one indicator
/// column per distinct category value, sorted, named `<feature>_<value>`.
pub fn encode_batch(rows: &[FeatureRow]) -> FeatureMatrix {
    let branches: BTreeSet<&str> = rows.iter().map(|r| r.branch.as_str()).collect();
    let rush_hours: BTreeSet<&str> = rows.iter().map(|r| r.rush_hour.as_str()).collect();

    let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(branches.iter().map(|b| format!("{BRANCH_PREFIX}_{b}")));
    columns.extend(rush_hours.iter().map(|r| format!("{RUSH_HOUR_PREFIX}_{r}")));

    let indicator = |set: &BTreeSet<&str>, value: &str| {
        set.iter()
            .map(move |v| if *v == value { 1.0 } else { 0.0 })
            .collect::<Vec<f64>>()
    };

    let encoded = rows
        .iter()
        .map(|r| {
            let mut values = vec![
                r.is_holiday as f64,
                r.is_hub_station as f64,
                r.day_of_week as f64,
                r.hour as f64,
            ];
            values.extend(indicator(&branches, &r.branch));
            values.extend(indicator(&rush_hours, r.rush_hour.as_str()));
            values
        })
        .collect();

    FeatureMatrix {
        columns,
        rows: encoded,
    }
}

/// Reorders `matrix` to exactly `columns`, filling missing columns with 0
/// and dropping the rest.
pub fn reindex(matrix: &FeatureMatrix, columns: &[String]) -> FeatureMatrix {
    let position: HashMap<&str, usize> = matrix
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let sources: Vec<Option<usize>> = columns.iter().map(|c| position.get(c.as_str()).copied()).collect();

    let dropped = matrix.columns.iter().filter(|c| !columns.contains(c)).count();
    if dropped > 0 {
        debug!(dropped, "Dropping columns unknown to the model");
    }

    FeatureMatrix {
        columns: columns.to_vec(),
        rows: matrix
            .rows
            .iter()
            .map(|row| sources.iter().map(|s| s.map_or(0.0, |i| row[i])).collect())
            .collect(),
    }
}

/// Keeps the `n` most likely classes, highest first. Equal probabilities keep
/// the model's class order.
pub fn top_n(probabilities: &[f64], classes: &[String], n: usize) -> Vec<CauseProbability> {
    let mut ranked: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(i, probability)| CauseProbability {
            cause: classes[i].clone(),
            probability,
        })
        .collect()
}

/// Aligns feature batches to a model's trained columns and scores them.
pub struct PredictionAligner<'a, M: Classifier + ?Sized> {
    model: &'a M,
    columns: &'a [String],
}

impl<'a, M: Classifier + ?Sized> PredictionAligner<'a, M> {
    pub fn new(model: &'a M, columns: &'a [String]) -> Self {
        Self { model, columns }
    }

    pub fn align(&self, rows: &[FeatureRow]) -> FeatureMatrix {
        reindex(&encode_batch(rows), self.columns)
    }

    /// Scores the whole batch with one model call and ranks each row.
    pub fn predict(
        &self,
        observations: Vec<Observation>,
        rows: &[FeatureRow],
    ) -> Result<Vec<RankedPrediction>, ModelError> {
        let aligned = self.align(rows);
        let probabilities = self.model.predict_proba(&aligned)?;
        if probabilities.len() != observations.len() {
            return Err(ModelError::RowCountMismatch {
                got: probabilities.len(),
                expected: observations.len(),
            });
        }

        let classes = self.model.classes();
        if let Some(row) = probabilities.iter().find(|p| p.len() != classes.len()) {
            return Err(ModelError::ClassCountMismatch {
                got: row.len(),
                expected: classes.len(),
            });
        }

        Ok(observations
            .into_iter()
            .zip(&probabilities)
            .map(|(observation, probs)| RankedPrediction {
                observation,
                causes: top_n(probs, classes, TOP_CAUSES),
            })
            .collect())
    }
}
