//! Page-at-a-time results of list endpoints.
//!
//! # Design
//! A paginated value holds the decoded elements of one page, the page
//! metadata the server reported, and a fetch closure bound to the listing
//! that produced it. The closure captures the endpoint, every filter and
//! the credentials; only the page number varies between calls. Turning a
//! page never mutates the current value, it yields a new one.
//!
//! Page numbers are 0-based. `total_pages` is whatever the server reported
//! when this page was fetched and may be stale by the time the next page is
//! requested.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::error::{HubError, Result};
use crate::types::{PageEnvelope, PageInfo};

/// Re-runs the originating listing for another page (blocking).
pub type PageFetcher<T> = Arc<dyn Fn(u32) -> Result<Paginated<T>> + Send + Sync>;

/// Re-runs the originating listing for another page (async).
pub type AsyncPageFetcher<T> =
    Arc<dyn Fn(u32) -> BoxFuture<'static, Result<AsyncPaginated<T>>> + Send + Sync>;

fn has_next(info: &PageInfo) -> bool {
    info.number
        .checked_add(1)
        .is_some_and(|next| next < info.total_pages)
}

/// One page of a listing, able to fetch its siblings over a blocking
/// transport.
pub struct Paginated<T> {
    elements: Vec<T>,
    info: PageInfo,
    fetcher: PageFetcher<T>,
}

impl<T> Paginated<T> {
    pub fn new(envelope: PageEnvelope<T>, fetcher: PageFetcher<T>) -> Self {
        Self {
            elements: envelope.elements,
            info: envelope.page,
            fetcher,
        }
    }

    pub fn current_elements(&self) -> &[T] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }

    pub fn current_page_number(&self) -> u32 {
        self.info.number
    }

    pub fn total_pages(&self) -> u32 {
        self.info.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.info.total_elements
    }

    pub fn page_size(&self) -> u32 {
        self.info.size
    }

    pub fn has_next_page(&self) -> bool {
        has_next(&self.info)
    }

    pub fn has_previous_page(&self) -> bool {
        self.info.number > 0
    }

    /// Request page `page` with the same filters as this one.
    ///
    /// Out-of-range pages are not checked locally; the server decides.
    pub fn fetch_page(&self, page: u32) -> Result<Paginated<T>> {
        tracing::debug!(page, total_pages = self.info.total_pages, "fetching page");
        (self.fetcher)(page)
    }

    /// Fails with [`HubError::NoNextPage`] without issuing a request when
    /// this is the last page.
    pub fn next_page(&self) -> Result<Paginated<T>> {
        if !self.has_next_page() {
            return Err(HubError::NoNextPage {
                page: self.info.number,
                total_pages: self.info.total_pages,
            });
        }
        self.fetch_page(self.info.number + 1)
    }

    pub fn previous_page(&self) -> Result<Paginated<T>> {
        if !self.has_previous_page() {
            return Err(HubError::NoPreviousPage);
        }
        self.fetch_page(self.info.number - 1)
    }

    /// Elements of this page followed by those of every later page.
    pub fn collect_all(self) -> Result<Vec<T>> {
        let mut current = self;
        let mut all = Vec::new();
        loop {
            let next = if current.has_next_page() {
                Some(current.next_page()?)
            } else {
                None
            };
            all.extend(current.into_elements());
            match next {
                Some(page) => current = page,
                None => return Ok(all),
            }
        }
    }
}

impl<T: Clone> Clone for Paginated<T> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            info: self.info,
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Paginated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginated")
            .field("elements", &self.elements)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl<'a, T> IntoIterator for &'a Paginated<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// One page of a listing, able to fetch its siblings over an async
/// transport. Page turns return futures and never block.
pub struct AsyncPaginated<T> {
    elements: Vec<T>,
    info: PageInfo,
    fetcher: AsyncPageFetcher<T>,
}

impl<T> AsyncPaginated<T> {
    pub fn new(envelope: PageEnvelope<T>, fetcher: AsyncPageFetcher<T>) -> Self {
        Self {
            elements: envelope.elements,
            info: envelope.page,
            fetcher,
        }
    }

    pub fn current_elements(&self) -> &[T] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }

    pub fn current_page_number(&self) -> u32 {
        self.info.number
    }

    pub fn total_pages(&self) -> u32 {
        self.info.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.info.total_elements
    }

    pub fn page_size(&self) -> u32 {
        self.info.size
    }

    pub fn has_next_page(&self) -> bool {
        has_next(&self.info)
    }

    pub fn has_previous_page(&self) -> bool {
        self.info.number > 0
    }

    /// Request page `page` with the same filters as this one.
    pub fn fetch_page(&self, page: u32) -> BoxFuture<'static, Result<AsyncPaginated<T>>> {
        tracing::debug!(page, total_pages = self.info.total_pages, "fetching page");
        (self.fetcher)(page)
    }
}

impl<T: Send + 'static> AsyncPaginated<T> {
    /// Resolves to [`HubError::NoNextPage`] without issuing a request when
    /// this is the last page.
    pub fn next_page(&self) -> BoxFuture<'static, Result<AsyncPaginated<T>>> {
        if !self.has_next_page() {
            return future::ready(Err(HubError::NoNextPage {
                page: self.info.number,
                total_pages: self.info.total_pages,
            }))
            .boxed();
        }
        self.fetch_page(self.info.number + 1)
    }

    pub fn previous_page(&self) -> BoxFuture<'static, Result<AsyncPaginated<T>>> {
        if !self.has_previous_page() {
            return future::ready(Err(HubError::NoPreviousPage)).boxed();
        }
        self.fetch_page(self.info.number - 1)
    }

    /// Elements of this page followed by those of every later page.
    pub async fn collect_all(self) -> Result<Vec<T>> {
        let mut current = self;
        let mut all = Vec::new();
        loop {
            let next = if current.has_next_page() {
                Some(current.next_page().await?)
            } else {
                None
            };
            all.extend(current.into_elements());
            match next {
                Some(page) => current = page,
                None => return Ok(all),
            }
        }
    }
}

impl<T: Clone> Clone for AsyncPaginated<T> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            info: self.info,
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AsyncPaginated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPaginated")
            .field("elements", &self.elements)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl<'a, T> IntoIterator for &'a AsyncPaginated<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
