use thiserror::Error;

use crate::model::RideId;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Missing required fields ({0})")]
    MissingFields(String),

    #[error("Ride not found: {0}")]
    RideNotFound(RideId),

    #[error("No seats available")]
    NoSeatsAvailable,

    #[error("board file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("board file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
