use errand_core::error::CoreError;

/// Error returned by the lifecycle services.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for LifecycleError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LifecycleError::Core(errors.into())
    }
}
