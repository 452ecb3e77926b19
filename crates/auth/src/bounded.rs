use std::future::Future;
use std::time::Duration;

use crate::{AuthError, AuthResult};

/// Run a store call under a deadline. An elapsed deadline is a transient
/// [`AuthError::StoreUnavailable`], never a negative answer.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::store_unavailable(format!(
            "{operation} timed out after {}ms",
            limit.as_millis()
        ))),
    }
}
