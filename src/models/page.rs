//! Page-number pagination.
//!
//! `?page=N` (1-based, or `last`) selects a fixed-size page; responses
//! carry the total count and absolute links to the neighbouring pages.

use serde::Serialize;
use url::Url;

use crate::{Error, Result};

/// Items per page.
pub const PAGE_SIZE: u64 = 10;

const PAGE_PARAM: &str = "page";
const INVALID_PAGE: &str = "Invalid page.";

/// `{count, next, previous, results}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A resolved page within a collection of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
}

impl PageWindow {
    /// Resolve the raw `page` query value against the collection size.
    ///
    /// The first page always exists, even for an empty collection.
    pub fn resolve(raw: Option<&str>, count: u64) -> Result<Self> {
        let num_pages = count.div_ceil(PAGE_SIZE).max(1);

        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| Error::NotFound(INVALID_PAGE.to_string()))?,
        };

        if number < 1 || number > num_pages {
            return Err(Error::NotFound(INVALID_PAGE.to_string()));
        }

        Ok(Self {
            number,
            num_pages,
            count,
        })
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE as i64
    }

    pub fn offset(&self) -> i64 {
        ((self.number - 1) * PAGE_SIZE) as i64
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Wrap one page of results, linking neighbours relative to `endpoint`.
    pub fn paginate<T>(&self, endpoint: &Url, results: Vec<T>) -> Paginated<T> {
        Paginated {
            count: self.count,
            next: self
                .has_next()
                .then(|| page_link(endpoint, self.number + 1)),
            previous: self
                .has_previous()
                .then(|| page_link(endpoint, self.number - 1)),
            results,
        }
    }
}

/// Link to page `number`; page 1 drops the parameter entirely.
fn page_link(endpoint: &Url, number: u64) -> String {
    let mut url = endpoint.clone();
    url.set_query(None);
    if number > 1 {
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &number.to_string());
    }
    url.to_string()
}

/// The `page` value of a raw query string. When repeated, the last one wins.
pub fn page_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == PAGE_PARAM)
        .map(|(_, value)| value.into_owned())
        .last()
}
