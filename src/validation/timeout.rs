use std::future::Future;
use std::time::Duration;

use crate::error::ValidationError;

/// Races `operation` against a timer of `duration`.
///
/// Whichever settles first wins. When the timer wins the operation future is
/// dropped, which cancels a pending DNS query and closes a half-open socket.
pub async fn with_timeout<F, T>(duration: Duration, operation: F) -> Result<T, ValidationError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, operation)
        .await
        .map_err(|_| ValidationError::Timeout { after: duration })
}
