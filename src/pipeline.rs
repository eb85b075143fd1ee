//! One fetch cycle: fetch → decode → extract → features → align → rank.
//!
//! Every recoverable failure inside a cycle ends up as a [`CycleOutcome`]
//! variant; nothing in here panics or propagates past the cycle.

use std::collections::HashSet;

use anyhow::Result;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::align::{PredictionAligner, RankedPrediction};
use crate::config::AppConfig;
use crate::error::CycleError;
use crate::extract::IncidentExtractor;
use crate::features::FeatureBuilder;
use crate::fetch::{HttpClient, read_source};
use crate::holidays::HolidayCalendar;
use crate::mapping::IdentifierMapper;
use crate::model::{Classifier, LinearModel, ModelArtifacts};
use crate::parser::{RawTripUpdate, decode_trip_updates};
use crate::static_data::StaticData;

pub const NO_ACTIVE_TRAINS: &str = "No active trains found in the live feed.";

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Success(Vec<RankedPrediction>),
    /// The feed was valid but no trip produced an observation.
    NoActiveTrains,
    TransportError(String),
    ParseError(String),
    ScoringError(String),
}

impl From<CycleError> for CycleOutcome {
    fn from(err: CycleError) -> Self {
        let message = err.to_string();
        match err {
            CycleError::Transport(_) => CycleOutcome::TransportError(message),
            CycleError::FeedParse(_) => CycleOutcome::ParseError(message),
            CycleError::Scoring(_) => CycleOutcome::ScoringError(message),
        }
    }
}

impl CycleOutcome {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            CycleOutcome::TransportError(_) | CycleOutcome::ParseError(_) | CycleOutcome::ScoringError(_)
        )
    }

    /// User-facing message for every outcome other than `Success`.
    pub fn message(&self) -> Option<String> {
        match self {
            CycleOutcome::Success(_) => None,
            CycleOutcome::NoActiveTrains => Some(NO_ACTIVE_TRAINS.to_string()),
            CycleOutcome::TransportError(e)
            | CycleOutcome::ParseError(e)
            | CycleOutcome::ScoringError(e) => Some(format!("An error occurred: {e}")),
        }
    }
}

/// Process-wide, read-only state: lookup tables, calendar and model
/// artifacts. Built once and shared by reference with every cycle.
pub struct Predictor<M: Classifier = LinearModel> {
    mapper: IdentifierMapper,
    holidays: HolidayCalendar,
    hub_stations: HashSet<String>,
    artifacts: ModelArtifacts<M>,
    timezone: Tz,
}

impl Predictor<LinearModel> {
    /// Loads every startup artifact named in `config`. Any failure is fatal.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let static_data = match &config.static_data_path {
            Some(path) => StaticData::load(path)?,
            None => StaticData::lirr(),
        };
        let artifacts = ModelArtifacts::load(&config.model_path, &config.columns_path)?;

        info!(
            routes = static_data.routes.len(),
            stops = static_data.stops.len(),
            hubs = static_data.hub_stations.len(),
            columns = artifacts.columns.len(),
            timezone = %config.timezone,
            "Predictor ready"
        );
        Ok(Self::new(static_data, artifacts, config.timezone))
    }
}

impl<M: Classifier> Predictor<M> {
    pub fn new(static_data: StaticData, artifacts: ModelArtifacts<M>, timezone: Tz) -> Self {
        let holidays = HolidayCalendar::default().with_extra(static_data.extra_holidays.iter().copied());
        Self {
            mapper: IdentifierMapper::from_static(&static_data),
            holidays,
            hub_stations: static_data.hub_stations,
            artifacts,
            timezone,
        }
    }

    pub fn classes(&self) -> &[String] {
        self.artifacts.model.classes()
    }

    /// Runs extraction, feature derivation and scoring over decoded updates.
    pub fn predict_updates(&self, updates: &[RawTripUpdate]) -> CycleOutcome {
        let (observations, stats) = IncidentExtractor::new(&self.mapper, self.timezone).extract(updates);
        info!(
            trip_updates = stats.trip_updates,
            duplicates = stats.duplicates,
            empty_updates = stats.empty_updates,
            invalid_times = stats.invalid_times,
            observations = stats.observations,
            "Extracted observations"
        );

        if observations.is_empty() {
            return CycleOutcome::NoActiveTrains;
        }

        let rows = FeatureBuilder::new(&self.holidays, &self.hub_stations).build_batch(&observations);
        let aligner = PredictionAligner::new(&self.artifacts.model, &self.artifacts.columns);

        match aligner.predict(observations, &rows) {
            Ok(ranked) => CycleOutcome::Success(ranked),
            Err(e) => {
                let outcome = CycleOutcome::from(CycleError::from(e));
                warn!(outcome = ?outcome, "Scoring failed");
                outcome
            }
        }
    }

    /// Decodes a feed snapshot and scores it.
    pub fn process_bytes(&self, bytes: &[u8]) -> CycleOutcome {
        match decode_trip_updates(bytes) {
            Ok(updates) => self.predict_updates(&updates),
            Err(e) => {
                warn!(error = %e, "Feed parse failed");
                CycleError::from(e).into()
            }
        }
    }

    /// Runs one full cycle against a feed URL or file.
    #[tracing::instrument(skip(self, client))]
    pub async fn run_cycle<C: HttpClient + ?Sized>(&self, client: &C, source: &str) -> CycleOutcome {
        match read_source(client, source).await {
            Ok(bytes) => self.process_bytes(&bytes),
            Err(e) => {
                warn!(error = %e, "Feed fetch failed");
                CycleError::Transport(format!("{e:#}")).into()
            }
        }
    }
}
