use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Coordinates out of map bounds: ({x}, {y})")]
    InvalidCoordinates { x: i32, y: i32 },

    #[error("Unknown agent kind code: {0}")]
    UnknownAgentKind(i32),

    #[error("Malformed roster record: {0}")]
    MalformedRecord(String),

    #[error("Simulation is not {expected}")]
    InvalidState { expected: &'static str },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
