// Lazy cursor-driven listing

use super::cancellation::CancellationToken;
use crate::domain::{Page, PageCursor};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use futures::Stream;
use std::collections::VecDeque;
use tracing::debug;

/// One remote listing endpoint
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    /// Fetch the page following `cursor` (`None` for the first page)
    async fn fetch(&self, cursor: Option<&PageCursor>) -> Result<Page<Self::Item>>;
}

/// Forward-only, lazy sequence over a paged remote collection
///
/// A page is fetched only when the buffered items run out, so consuming a
/// prefix never fetches more than that prefix needs. One fetch is in flight
/// at a time. The cancellation token is checked before each fetch.
pub struct PagedLister<T> {
    source: Box<dyn PageSource<Item = T>>,
    buffer: VecDeque<T>,
    cursor: Option<PageCursor>,
    exhausted: bool,
    pages_fetched: usize,
    cancel: CancellationToken,
}

impl<T: Send + 'static> PagedLister<T> {
    pub fn new(source: impl PageSource<Item = T> + 'static) -> Self {
        Self {
            source: Box::new(source),
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
            pages_fetched: 0,
            cancel: CancellationToken::never(),
        }
    }

    /// End the sequence with `OperationCancelled` once `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Number of page fetches issued so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Next item, `Ok(None)` at the end of the sequence.
    ///
    /// A failed fetch or a fired cancellation token is reported once, after
    /// which the sequence is over.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.exhausted {
                return Ok(None);
            }
            if self.cancel.is_cancelled() {
                self.exhausted = true;
                debug!(pages_fetched = self.pages_fetched, "Listing cancelled");
                return Err(ClientError::OperationCancelled);
            }

            self.pages_fetched += 1;
            match self.source.fetch(self.cursor.as_ref()).await {
                Ok(page) => {
                    debug!(
                        page = self.pages_fetched,
                        items = page.items.len(),
                        has_next = page.next.is_some(),
                        "Fetched page"
                    );
                    self.exhausted = page.next.is_none();
                    self.cursor = page.next;
                    self.buffer.extend(page.items);
                }
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            }
        }
    }

    /// Take up to `n` items
    pub async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(n);
        while items.len() < n {
            match self.try_next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Drain the whole sequence
    pub async fn try_collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        futures::stream::unfold(self, |mut lister| async move {
            match lister.try_next().await {
                Ok(Some(item)) => Some((Ok(item), lister)),
                Ok(None) => None,
                Err(e) => Some((Err(e), lister)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cancellation::cancellation_channel;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves canned pages keyed by cursor index
    struct CannedPages {
        pages: Vec<Vec<u32>>,
        fetches: Arc<AtomicUsize>,
        seen_cursors: Arc<Mutex<Vec<Option<String>>>>,
        fail_at: Option<usize>,
    }

    impl CannedPages {
        fn new(pages: Vec<Vec<u32>>) -> Self {
            Self {
                pages,
                fetches: Arc::new(AtomicUsize::new(0)),
                seen_cursors: Arc::new(Mutex::new(Vec::new())),
                fail_at: None,
            }
        }
    }

    #[async_trait]
    impl PageSource for CannedPages {
        type Item = u32;

        async fn fetch(&self, cursor: Option<&PageCursor>) -> Result<Page<u32>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.seen_cursors
                .lock()
                .unwrap()
                .push(cursor.map(|c| c.as_str().to_string()));

            let index = cursor.map(|c| c.as_str().parse::<usize>().unwrap()).unwrap_or(0);
            if self.fail_at == Some(index) {
                return Err(ClientError::Transport("connection reset".into()));
            }
            let next = (index + 1 < self.pages.len()).then(|| PageCursor::new((index + 1).to_string()));
            Ok(Page::new(self.pages[index].clone(), next))
        }
    }

    #[tokio::test]
    async fn test_full_iteration_fetches_each_page_once() {
        let source = CannedPages::new(vec![vec![1, 2], vec![3]]);
        let fetches = Arc::clone(&source.fetches);
        let cursors = Arc::clone(&source.seen_cursors);
        let mut lister = PagedLister::new(source);

        let mut items = Vec::new();
        while let Some(item) = lister.try_next().await.unwrap() {
            items.push(item);
        }

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(lister.pages_fetched(), 2);
        assert_eq!(*cursors.lock().unwrap(), vec![None, Some("1".to_string())]);
    }

    #[tokio::test]
    async fn test_partial_iteration_fetches_minimum() {
        let source = CannedPages::new(vec![vec![1, 2], vec![3]]);
        let fetches = Arc::clone(&source.fetches);
        let mut lister = PagedLister::new(source);

        assert_eq!(lister.try_next().await.unwrap(), Some(1));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        assert_eq!(lister.take(1).await.unwrap(), vec![2]);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_intermediate_page_is_followed() {
        let mut lister = PagedLister::new(CannedPages::new(vec![vec![], vec![7], vec![]]));
        assert_eq!(lister.try_next().await.unwrap(), Some(7));
        assert_eq!(lister.try_next().await.unwrap(), None);
        assert_eq!(lister.pages_fetched(), 3);
    }

    #[tokio::test]
    async fn test_cancellation_before_fetch_raises() {
        let (source, token) = cancellation_channel();
        let mut lister =
            PagedLister::new(CannedPages::new(vec![vec![1, 2], vec![3]])).with_cancellation(token);

        assert_eq!(lister.try_next().await.unwrap(), Some(1));
        source.cancel();

        // Buffered item is still served, the next fetch is refused
        assert_eq!(lister.try_next().await.unwrap(), Some(2));
        let err = lister.try_next().await.unwrap_err();
        assert!(matches!(err, ClientError::OperationCancelled));
        assert_eq!(lister.pages_fetched(), 1);
        assert_eq!(lister.try_next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces_then_ends() {
        let mut source = CannedPages::new(vec![vec![1], vec![2], vec![3]]);
        source.fail_at = Some(1);
        let mut lister = PagedLister::new(source);

        assert_eq!(lister.try_next().await.unwrap(), Some(1));
        assert!(matches!(
            lister.try_next().await,
            Err(ClientError::Transport(_))
        ));
        assert_eq!(lister.try_next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stream_adapter_preserves_order() {
        let lister = PagedLister::new(CannedPages::new(vec![vec![1, 2], vec![3, 4], vec![5]]));
        let items: Vec<u32> = lister
            .into_stream()
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }
}
