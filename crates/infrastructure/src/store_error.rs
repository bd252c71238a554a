use galley_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a driver error, classifying connectivity failures as unavailable.
pub(crate) fn map_store_error(error: sqlx::Error, context: &str) -> AppError {
    match &error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::Unavailable(format!("{context}: {error}"))
        }
        _ => AppError::Internal(format!("{context}: {error}")),
    }
}

/// Maps write errors, turning unique and foreign key violations into domain errors.
pub(crate) fn map_write_error(
    error: sqlx::Error,
    context: &str,
    conflict: impl FnOnce() -> String,
    missing: impl FnOnce() -> String,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return AppError::Conflict(conflict()),
            Some(FOREIGN_KEY_VIOLATION) => return AppError::NotFound(missing()),
            _ => {}
        }
    }

    map_store_error(error, context)
}
