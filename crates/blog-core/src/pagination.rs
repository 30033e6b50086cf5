//! Page-number pagination that clamps instead of failing.
//!
//! A page token that is not an integer resolves to the first page. A page
//! number outside `1..=num_pages` resolves to the last page. The caller never
//! sees an error.

use serde::Serialize;

use crate::query::Window;

/// Posts per page on list and search pages.
pub const POSTS_PER_PAGE: u64 = 5;

/// Resolved position of a page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub count: u64,
}

impl PageWindow {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn window(&self) -> Window {
        Window::new(self.offset(), self.per_page)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `count` items. An empty set still has one page.
    pub fn num_pages(&self, count: u64) -> u64 {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw page token (typically the `page` query parameter)
    /// against a result set of `count` items.
    pub fn resolve(&self, token: Option<&str>, count: u64) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match token.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<i64>() {
                Err(_) if is_integer_literal(raw) => num_pages,
                Err(_) => 1,
                Ok(n) if n < 1 || n as u64 > num_pages => num_pages,
                Ok(n) => n as u64,
            },
        };

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            count,
        }
    }

    /// Resolve and slice an in-memory, already ordered collection.
    pub fn paginate<T>(&self, items: Vec<T>, token: Option<&str>) -> Page<T> {
        let window = self.resolve(token, items.len() as u64);
        let slice = window.window().apply(items);
        Page::new(slice, window)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

/// Optional sign followed by digits. Such a token names a page even when it
/// does not fit an `i64`.
fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
    pub start_index: u64,
    pub end_index: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        let (start_index, end_index) = if window.count == 0 {
            (0, 0)
        } else {
            let start = window.offset() + 1;
            (start, window.offset() + items.len() as u64)
        };

        Self {
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(window.number + 1),
            previous_page_number: has_previous.then_some(window.number - 1),
            start_index,
            end_index,
            items,
        }
    }

    /// An empty first page.
    pub fn empty(per_page: u64) -> Self {
        Self::new(Vec::new(), Paginator::new(per_page).resolve(None, 0))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
