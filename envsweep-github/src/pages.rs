//! Cursor-following paged retrieval.
//!
//! [`PageIter`] walks a page-oriented API lazily: one request per page,
//! strictly sequential, cursor taken from the previous response's `Link`
//! header `rel="next"` relation. Iteration ends when no `next` relation is
//! present; any error ends iteration after being yielded once — there is no
//! partial-result suppression.

use serde_json::Value;

use crate::error::GithubError;

/// One page of results plus the cursor to the next, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<Value>,
    /// Absolute URL of the next page, from `Link: <…>; rel="next"`.
    pub next: Option<String>,
}

/// Fetches a single page by URL.
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> Result<Page, GithubError>;
}

/// Lazy iterator over every record of a paged result set.
pub struct PageIter<'a, S: PageSource + ?Sized> {
    source: &'a S,
    next_url: Option<String>,
    current: std::vec::IntoIter<Value>,
    failed: bool,
}

impl<'a, S: PageSource + ?Sized> PageIter<'a, S> {
    pub fn new(source: &'a S, first_url: String) -> Self {
        Self {
            source,
            next_url: Some(first_url),
            current: Vec::new().into_iter(),
            failed: false,
        }
    }
}

impl<S: PageSource + ?Sized> Iterator for PageIter<'_, S> {
    type Item = Result<Value, GithubError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            let url = self.next_url.take()?;
            match self.source.fetch_page(&url) {
                Ok(page) => {
                    self.next_url = page.next;
                    self.current = page.records.into_iter();
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Collect every record of a paged result set, propagating the first error.
pub fn fetch_all<S: PageSource + ?Sized>(
    source: &S,
    first_url: String,
) -> Result<Vec<Value>, GithubError> {
    PageIter::new(source, first_url).collect()
}

/// Extract the `rel="next"` target from a `Link` header value.
///
/// `<https://api.github.com/…?page=2>; rel="next", <…>; rel="last"` →
/// `https://api.github.com/…?page=2`.
pub fn next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|s| s.trim() == r#"rel="next""#);
        if is_next {
            let url = target.strip_prefix('<')?.strip_suffix('>')?;
            return Some(url.to_string());
        }
    }
    None
}
