use futures::stream::{self, Stream};
use std::time::Duration;
use tracing::debug;

use crate::error::HarvestError;
use crate::places::{PlacesApi, RetryPolicy, SearchTextRequest, SearchTextResponse};

enum Cursor {
    First(SearchTextRequest),
    Next(SearchTextRequest),
    Done,
}

/// Lazily fetch every page of one query stream.
///
/// Each page is fetched under the retry policy. When a page carries a
/// continuation token the next request waits `page_delay` first, since the
/// upstream token is not valid immediately. The stream ends after the first
/// page without a token, or after the first error.
pub fn search_pages<'a, A>(
    api: &'a A,
    request: SearchTextRequest,
    page_delay: Duration,
    retry: &'a RetryPolicy,
) -> impl Stream<Item = Result<SearchTextResponse, HarvestError>> + Send + 'a
where
    A: PlacesApi + ?Sized,
{
    stream::try_unfold(Cursor::First(request), move |cursor| async move {
        let request = match cursor {
            Cursor::Done => return Ok(None),
            Cursor::First(request) => request,
            Cursor::Next(request) => {
                tokio::time::sleep(page_delay).await;
                request
            }
        };

        let context = request.describe();
        let pending = &request;
        let page = retry
            .run(&context, move || api.search_text(pending))
            .await?;
        debug!("{}: {} places", context, page.places.len());

        let next = match page.continuation() {
            Some(token) => {
                let mut request = request;
                request.page_token = Some(token.to_string());
                Cursor::Next(request)
            }
            None => Cursor::Done,
        };
        Ok(Some((page, next)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::harvest::testing::{page, place, ScriptedPlaces};
    use futures::TryStreamExt;

    fn unavailable() -> ApiError {
        ApiError::Status {
            operation: "searchText",
            status: 503,
            body: "unavailable".into(),
        }
    }

    #[tokio::test]
    async fn test_follows_tokens_until_exhausted() {
        let api = ScriptedPlaces::new();
        api.push_search(Ok(page(&["a", "b"], Some("t1"))));
        api.push_search(Ok(page(&["c"], Some("t2"))));
        api.push_search(Ok(page(&["d"], None)));
        // Never reached
        api.push_search(Ok(page(&["e"], None)));

        let retry = RetryPolicy::immediate(3);
        let pages: Vec<_> = search_pages(
            &api,
            SearchTextRequest::new("cafe", "th"),
            Duration::ZERO,
            &retry,
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(pages.len(), 3);
        let requests = api.search_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].page_token, None);
        assert_eq!(requests[1].page_token.as_deref(), Some("t1"));
        assert_eq!(requests[2].page_token.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_retries_a_failed_page() {
        let api = ScriptedPlaces::new();
        api.push_search(Err(unavailable()));
        api.push_search(Ok(page(&["a"], None)));

        let retry = RetryPolicy::immediate(3);
        let pages: Vec<_> = search_pages(
            &api,
            SearchTextRequest::new("cafe", "th"),
            Duration::ZERO,
            &retry,
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].places, vec![place("a")]);
        assert_eq!(api.search_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_ends_stream_with_error() {
        let api = ScriptedPlaces::new();
        for _ in 0..3 {
            api.push_search(Err(unavailable()));
        }

        let retry = RetryPolicy::immediate(3);
        let result: Result<Vec<_>, _> = search_pages(
            &api,
            SearchTextRequest::new("cafe", "th"),
            Duration::ZERO,
            &retry,
        )
        .try_collect()
        .await;

        assert!(matches!(
            result,
            Err(HarvestError::UpstreamExhausted { attempts: 3, .. })
        ));
        assert_eq!(api.search_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_lazy_until_polled() {
        let api = ScriptedPlaces::new();
        api.push_search(Ok(page(&["a"], Some("t1"))));
        api.push_search(Ok(page(&["b"], None)));

        let retry = RetryPolicy::immediate(1);
        let pages = search_pages(
            &api,
            SearchTextRequest::new("cafe", "th"),
            Duration::ZERO,
            &retry,
        );
        futures::pin_mut!(pages);
        assert!(api.search_requests().is_empty());

        let first = pages.try_next().await.unwrap().unwrap();
        assert_eq!(first.places, vec![place("a")]);
        assert_eq!(api.search_requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_before_continuation_pages() {
        let api = ScriptedPlaces::new();
        api.push_search(Ok(page(&["a"], Some("t1"))));
        api.push_search(Ok(page(&["b"], Some("t2"))));
        api.push_search(Ok(page(&["c"], None)));

        let delay = Duration::from_millis(1200);
        let retry = RetryPolicy::immediate(1);
        let pages = search_pages(&api, SearchTextRequest::new("cafe", "th"), delay, &retry);
        futures::pin_mut!(pages);

        let slack = Duration::from_millis(10);
        let start = tokio::time::Instant::now();
        pages.try_next().await.unwrap().unwrap();
        assert!(start.elapsed() < slack);

        pages.try_next().await.unwrap().unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= delay && elapsed < delay + slack, "{:?}", elapsed);

        pages.try_next().await.unwrap().unwrap();
        assert!(pages.try_next().await.unwrap().is_none());
        let elapsed = start.elapsed();
        assert!(elapsed >= delay * 2 && elapsed < delay * 2 + slack, "{:?}", elapsed);
        assert_eq!(api.search_requests().len(), 3);
    }
}
