use crate::error::AppError;
use diesel::result::Error as DieselError;

/// Utility for converting database errors to AppError variants.
///
/// The products table has no constraint a validated payload can violate,
/// so every failure here is a server-side `Database` error labelled with
/// the operation that hit it.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to [`AppError::Database`].
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        let source = match error {
            DieselError::DatabaseError(kind, info) => {
                anyhow::Error::msg(format!("{:?}: {}", kind, info.message()))
            }
            other => anyhow::Error::from(other),
        };

        AppError::Database {
            operation: operation.to_string(),
            source,
        }
    }
}
