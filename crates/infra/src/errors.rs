//! Error bridging between the storage layer and the domain error type

use reservo_domain::ScheduleError;

/// Wrapper turning adapter-level failures into domain storage errors.
///
/// Repository code maps with `InfraError::from` and lets `?` convert the
/// wrapper back into [`ScheduleError`].
pub struct InfraError(pub ScheduleError);

impl From<rusqlite::Error> for InfraError {
    fn from(err: rusqlite::Error) -> Self {
        Self(ScheduleError::Storage(format!("sqlite error: {err}")))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        Self(ScheduleError::Storage(format!("pool error: {err}")))
    }
}

impl From<InfraError> for ScheduleError {
    fn from(err: InfraError) -> Self {
        err.0
    }
}
