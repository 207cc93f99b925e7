//! Cursor-following pagination shared by every listing endpoint.
//!
//! The two endpoint families signal "more pages" differently: the
//! `conversations.*` message endpoints carry a `has_more` flag, while the
//! `*.list` endpoints only carry `response_metadata.next_cursor`. Callers pick
//! the matching [`Termination`] per call site.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};

use crate::api::Params;
use crate::error::{ExportError, Result};

pub const CURSOR_KEY: &str = "cursor";

/// Delay applied before every continuation call.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// One page of a listing response.
pub trait Page {
    type Item;

    fn items(&self) -> &[Self::Item];
    fn into_items(self) -> Vec<Self::Item>;
    fn has_more(&self) -> Option<bool>;
    fn next_cursor(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Continue while the page says `has_more: true`.
    HasMoreFlag,
    /// Continue while `response_metadata.next_cursor` is non-empty.
    NextCursorPresence,
}

impl Termination {
    /// Returns the cursor for the following call, or `None` once drained.
    pub fn next_cursor<P: Page>(self, method: &str, page: &P) -> Result<Option<String>> {
        match self {
            Termination::HasMoreFlag => match page.has_more() {
                None => Err(ExportError::malformed(method, "missing has_more")),
                Some(false) => Ok(None),
                Some(true) => match page.next_cursor() {
                    Some(cursor) if !cursor.is_empty() => Ok(Some(cursor.to_string())),
                    _ => Err(ExportError::malformed(
                        method,
                        "has_more is true but next_cursor is empty",
                    )),
                },
            },
            Termination::NextCursorPresence => match page.next_cursor() {
                None => Err(ExportError::malformed(
                    method,
                    "missing response_metadata.next_cursor",
                )),
                Some("") => Ok(None),
                Some(cursor) => Ok(Some(cursor.to_string())),
            },
        }
    }
}

/// Rate limit hook awaited between two calls of the same listing.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn wait(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn wait(&self) {
        trace!("waiting {:?} before next page", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}

pub struct Paginator<T> {
    throttle: T,
}

impl<T: Throttle> Paginator<T> {
    pub fn new(throttle: T) -> Self {
        Self { throttle }
    }

    fn continuation(base_params: &Params, cursor: String) -> Params {
        let mut params = base_params.clone();
        params.insert(CURSOR_KEY.to_string(), cursor);
        params
    }

    /// Fetches every page and concatenates the items in arrival order.
    ///
    /// Errors from `fetch` are returned unchanged and whatever was collected
    /// so far is dropped.
    pub async fn drain<P, F, Fut>(
        &self,
        method: &str,
        mut fetch: F,
        base_params: &Params,
        termination: Termination,
    ) -> Result<Vec<P::Item>>
    where
        P: Page,
        F: FnMut(Params) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut items = Vec::new();
        let mut params = base_params.clone();
        let mut page_no = 1usize;

        loop {
            let page = fetch(params).await?;
            let next = termination.next_cursor(method, &page)?;
            debug!(
                "{method}: page {page_no} returned {} items",
                page.items().len()
            );
            items.extend(page.into_items());

            let Some(cursor) = next else {
                return Ok(items);
            };
            self.throttle.wait().await;
            params = Self::continuation(base_params, cursor);
            page_no += 1;
        }
    }

    /// Walks pages until `pick` matches an item, without fetching further
    /// pages once it does. Returns `None` when the listing ends first.
    pub async fn find<P, F, Fut, R>(
        &self,
        method: &str,
        mut fetch: F,
        base_params: &Params,
        termination: Termination,
        mut pick: impl FnMut(&P::Item) -> Option<R>,
    ) -> Result<Option<R>>
    where
        P: Page,
        F: FnMut(Params) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut params = base_params.clone();

        loop {
            let page = fetch(params).await?;
            if let Some(found) = page.items().iter().find_map(&mut pick) {
                return Ok(Some(found));
            }

            let Some(cursor) = termination.next_cursor(method, &page)? else {
                return Ok(None);
            };
            debug!("{method}: no match on this page, continuing");
            self.throttle.wait().await;
            params = Self::continuation(base_params, cursor);
        }
    }
}
