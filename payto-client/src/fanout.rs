//! Concurrent request helpers.

use crate::error::ApiError;
use futures::future::try_join_all;
use std::future::Future;

/// Run every request concurrently; the first failure aborts the batch.
///
/// Requests that already completed are not rolled back. The error wraps the
/// first failure in [`ApiError::Batch`].
pub async fn all_or_abort<I, F, T>(requests: I) -> Result<Vec<T>, ApiError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, ApiError>>,
{
    try_join_all(requests).await.map_err(|first| {
        tracing::warn!(error = %first, "Batch aborted");
        ApiError::Batch {
            first: Box::new(first),
        }
    })
}

/// Outcome of one independently loaded source.
pub type Settled<T> = Result<T, ApiError>;

/// Messages of the failed sources, for display next to the loaded ones.
pub fn failure_messages<'a>(outcomes: impl IntoIterator<Item = (&'a str, Option<&'a ApiError>)>) -> Vec<String> {
    outcomes
        .into_iter()
        .filter_map(|(label, error)| error.map(|err| format!("{label}: {}", err.user_message())))
        .collect()
}
