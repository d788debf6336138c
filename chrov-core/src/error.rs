//! Error handling for chrov

use thiserror::Error;

/// Errors raised by layout and rendering calls.
///
/// Every error is raised synchronously; a call either fully succeeds or
/// returns one of these.
#[derive(Error, Debug)]
pub enum ChrovError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    #[error("Input/Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl ChrovError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData { message: message.into() }
    }

    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Whether this error came from a bad parameter combination rather than bad input data
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChrovError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_category() {
        let err = ChrovError::config("either interval or intervals should be provided");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: either interval or intervals should be provided"
        );

        let err = ChrovError::invalid_data("multiple chromosomes provided: 1, 2");
        assert!(err.is_invalid_data());
        assert!(err.to_string().contains("1, 2"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChrovError = io.into();
        assert!(matches!(err, ChrovError::Io(_)));
    }
}
