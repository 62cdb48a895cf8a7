use thiserror::Error;

use crate::responses::ReadIndexTableStatus;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that end the console loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fingerprint sensor error: {0}")]
    Sensor(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to read templates: {0:?}")]
    TemplateIndex(ReadIndexTableStatus),
}

impl Error {
    pub fn sensor<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Sensor(Box::new(error))
    }
}
