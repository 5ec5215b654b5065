use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;

use crate::errors::AppError;

/// Runs a store call under a deadline.
///
/// Elapsing drops the in-flight future and yields [`ErrorKind::Unavailable`](crate::ErrorKind::Unavailable).
pub async fn with_deadline<F, T, E>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<AppError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(AppError::unavailable(anyhow!(
            "store call exceeded deadline of {}ms",
            limit.as_millis()
        ))),
    }
}
