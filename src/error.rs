//! Error type for the outer layers (file loading, reports, config, server).
//!
//! Evidence derivation itself never fails; this only covers I/O around it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "cli")]
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "I/O error: gone");

        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid JSON:"));

        assert_eq!(Error::Server("port in use".into()).to_string(), "server error: port in use");
    }
}
