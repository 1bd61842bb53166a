pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid tour file {path}: {message}")]
    TourFile { path: String, message: String },
    #[error("hook for step {step} failed: {message}")]
    Hook { step: usize, message: String },
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn tour_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TourFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Failure reported by a step's `on_next`/`on_prev` hook. `step` is 1-based.
    pub fn hook(step: usize, message: impl Into<String>) -> Self {
        Self::Hook {
            step,
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging(message.into())
    }
}
