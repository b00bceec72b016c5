use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid history: {0}")]
    InvalidHistory(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_history_error() {
        let err = CoreError::InvalidHistory("system message at index 2".to_string());
        assert_eq!(err.to_string(), "invalid history: system message at index 2");
    }
}
