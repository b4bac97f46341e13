use thiserror::Error;

use crate::models::CandidateKey;
use crate::validation::ValidationError;

use super::model::ModelError;
use super::solver::SolveStatus;

/// Failure to build a promotion model.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid catalogue: {} error(s)", .0.len())]
    InvalidCatalogue(Vec<ValidationError>),
    #[error("candidate {0} references a missing partner or mechanic")]
    UnknownReference(CandidateKey),
    #[error(transparent)]
    InvalidModel(#[from] ModelError),
}

/// Failure to turn a solved run into a plan.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no solution to decode (status {0})")]
    NoSolution(SolveStatus),
    #[error("solution carries no value for candidate {0}")]
    MissingValue(CandidateKey),
}

/// Failure to write a model to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write model: {0}")]
    Io(#[from] std::io::Error),
}
