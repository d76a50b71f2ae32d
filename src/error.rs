use thiserror::Error;

/// Malformed or missing caller input. Raised before any modeling begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Sales history is empty.")]
    EmptyHistory,
    #[error("Sales record {index} is missing required field '{field}'.")]
    MissingField { index: usize, field: &'static str },
    #[error("Sales record {index} has an invalid date '{value}'.")]
    InvalidDate { index: usize, value: String },
    #[error("Sales record {index} has an invalid quantity {value} (must be finite and >= 0).")]
    InvalidQuantity { index: usize, value: f64 },
    #[error("Forecast horizon must be > 0 days.")]
    InvalidHorizon,
    #[error("Current inventory must be finite and >= 0 (got {0}).")]
    InvalidInventory(f64),
    #[error("{0}")]
    Other(String),
}

/// A single candidate model failed to fit.
///
/// Always recovered by the fallback chain; never surfaces to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelFitError {
    #[error("insufficient data: need {required} points, have {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("fit produced non-finite values")]
    NonFinite,
    #[error("singular or ill-conditioned system")]
    Singular,
    #[error("fit exceeded its {0} ms deadline")]
    Timeout(u64),
    #[error("model not available in this build")]
    Unavailable,
}

/// Errors returned by the public forecasting entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Application-level error carried out to `main` with a process exit code.
#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::Input(e) => AppError::new(3, format!("Invalid input: {e}")),
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        ForecastError::from(err).into()
    }
}
