//! Lazy page-by-page listing.

use crate::client::{Session, Verb};
use crate::error::ApiError;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

/// Stream every item of a `page`/`limit` list endpoint.
///
/// Pages are requested one at a time, starting at 1, and only when the
/// consumer asks for more items. The stream ends at the first page whose
/// payload is empty, or after yielding the first error. Dropping the stream
/// stops paging; calling again starts over from page 1.
pub fn paginate<T>(session: &Session, endpoint: &'static str, path: String) -> BoxStream<'static, Result<T, ApiError>>
where
    T: DeserializeOwned + Send + 'static,
{
    let session = session.clone();
    let limit = session.client().page_size();

    stream::try_unfold(1u32, move |page| {
        let session = session.clone();
        let path = path.clone();
        async move {
            let items: Vec<T> = session
                .call(Verb::Get, endpoint, path)
                .query("page", page)
                .query("limit", limit)
                .send()
                .await?;

            tracing::debug!(endpoint, page, count = items.len(), "Fetched page");
            if items.is_empty() {
                return Ok(None);
            }
            let batch = stream::iter(items.into_iter().map(Ok::<T, ApiError>));
            Ok(Some((batch, page + 1)))
        }
    })
    .try_flatten()
    .boxed()
}

/// Drain a paginated listing into memory.
pub async fn collect_all<T>(stream: BoxStream<'static, Result<T, ApiError>>) -> Result<Vec<T>, ApiError> {
    stream.try_collect().await
}
