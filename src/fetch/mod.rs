/*!
 * Remote content fetching through a rate-limited worker pool
 */

mod client;
mod error;

pub use client::{
    ContentApi, ContentsRequest, ContentsResponse, ExaClient, LiveCrawl, API_KEY_ENV,
    EXA_CONTENTS_URL,
};
pub use error::{FetchError, FetchResult};

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::pool::{PoolHandle, WorkerContext, WorkerPool};
use crate::types::Item;

/// Number of concurrent fetch workers
pub const POOL_SIZE: usize = 3;

/// Pause between consecutive requests of one worker (about 3 req/s overall)
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(350);

/// Check that `raw` is an absolute HTTP(S) URL
pub fn validate_url(raw: &str) -> FetchResult<Url> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {:?}", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Fetch one URL and turn its context into an item
pub fn fetch_url(api: &dyn ContentApi, raw: &str, live: LiveCrawl) -> FetchResult<Item> {
    let url = validate_url(raw)?;
    let context = api.fetch_context(&url, live)?;
    if context.trim().is_empty() {
        return Err(FetchError::EmptyContent);
    }
    Ok(Item::new(raw, context))
}

/// Pacing and crawl settings for a batch
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub live: LiveCrawl,
    pub pool_size: usize,
    pub delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            live: LiveCrawl::Fallback,
            pool_size: POOL_SIZE,
            delay: RATE_LIMIT_DELAY,
        }
    }
}

/// Delay a worker waits before its next request.
///
/// The first request of worker `i` is staggered by `i * delay / pool_size`;
/// every later request waits the full `delay`.
pub fn pacing_delay(ctx: &WorkerContext, delay: Duration) -> Duration {
    if ctx.completed == 0 {
        let workers = ctx.pool_size.max(1) as u32;
        delay * ctx.index as u32 / workers
    } else {
        delay
    }
}

/// Fetch every URL on a bounded, paced pool.
///
/// Failures are logged with the offending URL and produce no item; they
/// never stop the rest of the batch.
pub fn fetch_all(
    api: Arc<dyn ContentApi>,
    urls: Vec<String>,
    options: FetchOptions,
) -> PoolHandle<Item> {
    let pool = WorkerPool::new("fetch", options.pool_size);
    pool.run(urls, move |ctx, raw| {
        let wait = pacing_delay(ctx, options.delay);
        if !wait.is_zero() {
            thread::sleep(wait);
        }

        debug!(url = %raw, worker = ctx.index, "fetching");
        match fetch_url(api.as_ref(), &raw, options.live) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(url = %raw, error = %err, "error fetching URL");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by URL
    struct FakeApi {
        responses: HashMap<String, FetchResult<String>>,
        calls: Mutex<Vec<(String, LiveCrawl)>>,
    }

    impl FakeApi {
        fn new(responses: Vec<(&str, FetchResult<String>)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(url, r)| (url.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ContentApi for FakeApi {
        fn fetch_context(&self, url: &Url, live: LiveCrawl) -> FetchResult<String> {
            self.calls.lock().unwrap().push((url.to_string(), live));
            match self.responses.get(url.as_str()) {
                Some(Ok(context)) => Ok(context.clone()),
                Some(Err(FetchError::Upstream { status, body })) => Err(FetchError::Upstream {
                    status: *status,
                    body: body.clone(),
                }),
                _ => Err(FetchError::Request("connection refused".to_string())),
            }
        }
    }

    fn fast() -> FetchOptions {
        FetchOptions {
            delay: Duration::ZERO,
            ..FetchOptions::default()
        }
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/page").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_blank_context_is_an_error() {
        let api = FakeApi::new(vec![("https://a.example/", Ok("  \n\t ".to_string()))]);
        let err = fetch_url(&api, "https://a.example/", LiveCrawl::Fallback).unwrap_err();
        assert!(matches!(err, FetchError::EmptyContent));
    }

    #[test]
    fn test_item_keeps_requested_url() {
        let api = FakeApi::new(vec![("https://a.example/", Ok("body".to_string()))]);
        let item = fetch_url(&api, "https://a.example", LiveCrawl::Always).unwrap();
        assert_eq!(item.path, "https://a.example");
        assert_eq!(item.content, "body");
        assert_eq!(api.calls.lock().unwrap()[0].1, LiveCrawl::Always);
    }

    #[test]
    fn test_failed_url_does_not_stop_batch() {
        let api = Arc::new(FakeApi::new(vec![
            ("https://empty.example/", Ok(String::new())),
            ("https://good.example/", Ok("hello\n".to_string())),
            (
                "https://down.example/",
                Err(FetchError::Upstream {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            ),
        ]));

        let items = fetch_all(
            api.clone(),
            vec![
                "https://empty.example/".to_string(),
                "https://good.example/".to_string(),
                "https://down.example/".to_string(),
                "mailto:someone@example.com".to_string(),
            ],
            fast(),
        )
        .collect_all();

        assert_eq!(items, vec![Item::new("https://good.example/", "hello\n")]);
        // The malformed URL never reaches the API
        assert_eq!(api.calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_pacing_delay() {
        let delay = Duration::from_millis(300);
        let first = |index| WorkerContext {
            index,
            pool_size: 3,
            completed: 0,
        };

        assert_eq!(pacing_delay(&first(0), delay), Duration::ZERO);
        assert_eq!(pacing_delay(&first(1), delay), Duration::from_millis(100));
        assert_eq!(pacing_delay(&first(2), delay), Duration::from_millis(200));

        let later = WorkerContext {
            completed: 4,
            ..first(2)
        };
        assert_eq!(pacing_delay(&later, delay), delay);
    }
}
