//! errors.rs
//! Error común de la capa de servicios.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Fila con un valor que no se puede mapear (enum o fecha inválida).
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
