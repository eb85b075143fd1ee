//! Scoring model seam and the artifacts loaded at startup.
//!
//! The classifier is opaque to the pipeline: it sees a feature matrix in the
//! trained column order and returns one probability row per input row, over
//! the label order reported by [`Classifier::classes`].

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ModelError, StartupError};

/// Row-major matrix with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row` for the named column, if the column exists.
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[idx])
    }
}

pub trait Classifier: Send + Sync {
    /// Class labels in the order of each probability row.
    fn classes(&self) -> &[String];

    /// Number of input columns the model was trained on.
    fn n_features(&self) -> usize;

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ModelError>;
}

/// Multinomial logistic regression exported as JSON:
/// ```json
/// { "classes": ["A", "B", "C"], "coefficients": [[..], [..], [..]], "intercepts": [..] }
/// ```
/// A two-class model may carry a single coefficient row, scored with a
/// sigmoid for the second class.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    classes: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

fn read_artifact(kind: &'static str, path: &Path) -> Result<String, StartupError> {
    std::fs::read_to_string(path).map_err(|source| StartupError::ArtifactMissing {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(kind: &'static str, path: &Path, reason: impl ToString) -> StartupError {
    StartupError::ArtifactInvalid {
        kind,
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Loads the trained column list, a JSON array of column names.
pub fn load_columns(path: impl AsRef<Path>) -> Result<Vec<String>, StartupError> {
    const KIND: &str = "model column list";
    let path = path.as_ref();
    let columns: Vec<String> =
        serde_json::from_str(&read_artifact(KIND, path)?).map_err(|e| invalid(KIND, path, e))?;
    if columns.is_empty() {
        return Err(invalid(KIND, path, "column list is empty"));
    }
    Ok(columns)
}

impl LinearModel {
    pub fn new(
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, String> {
        let model = Self {
            classes,
            coefficients,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        const KIND: &str = "model";
        let path = path.as_ref();
        let model: LinearModel =
            serde_json::from_str(&read_artifact(KIND, path)?).map_err(|e| invalid(KIND, path, e))?;
        model.validate().map_err(|e| invalid(KIND, path, e))?;

        info!(
            path = %path.display(),
            classes = model.classes.len(),
            features = model.n_features(),
            "Loaded delay-cause model"
        );
        Ok(model)
    }

    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coefficients.len() == 1
    }

    fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err(format!("expected at least 2 classes, got {}", self.classes.len()));
        }
        if !self.is_binary() && self.coefficients.len() != self.classes.len() {
            return Err(format!(
                "{} coefficient rows for {} classes",
                self.coefficients.len(),
                self.classes.len()
            ));
        }
        if self.intercepts.len() != self.coefficients.len() {
            return Err(format!(
                "{} intercepts for {} coefficient rows",
                self.intercepts.len(),
                self.coefficients.len()
            ));
        }
        let width = self.n_features();
        if self.coefficients.iter().any(|row| row.len() != width) {
            return Err("coefficient rows have different widths".to_string());
        }
        Ok(())
    }

    fn decision(&self, x: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| b + w.iter().zip(x).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }
}

fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = z.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|v| v / sum).collect()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LinearModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ModelError> {
        if x.width() != self.n_features() {
            return Err(ModelError::WidthMismatch {
                got: x.width(),
                expected: self.n_features(),
            });
        }

        Ok(x.rows
            .iter()
            .map(|row| {
                let z = self.decision(row);
                if self.is_binary() {
                    let p = sigmoid(z[0]);
                    vec![1.0 - p, p]
                } else {
                    softmax(&z)
                }
            })
            .collect())
    }
}

/// Model plus its trained column list, both required before serving.
pub struct ModelArtifacts<M: Classifier = LinearModel> {
    pub model: M,
    pub columns: Vec<String>,
}

impl ModelArtifacts<LinearModel> {
    pub fn load(
        model_path: impl AsRef<Path>,
        columns_path: impl AsRef<Path>,
    ) -> Result<Self, StartupError> {
        let model = LinearModel::load(model_path)?;
        let columns_path = columns_path.as_ref();
        let columns = load_columns(columns_path)?;
        Self::new(model, columns).map_err(|e| invalid("model column list", columns_path, e))
    }
}

impl<M: Classifier> ModelArtifacts<M> {
    pub fn new(model: M, columns: Vec<String>) -> Result<Self, String> {
        if columns.len() != model.n_features() {
            return Err(format!(
                "{} columns but the model expects {} features",
                columns.len(),
                model.n_features()
            ));
        }
        Ok(Self { model, columns })
    }
}
