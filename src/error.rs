use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A non-database collaborator failed to deliver a series.
    #[error("data source error: {0}")]
    Source(String),
}
