//! Offset pagination: `page`/`size`/`sort` binding, page slices and the
//! `X-Total-Count` and `Link` response headers.

use crate::errors::AppError;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use core_config::pagination::PaginationConfig;
use serde::Serialize;
use strum::{Display, EnumString};

pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: SortDirection,
}

/// A zero-based page window with optional ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, PaginationConfig::default().default_size)
    }
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, property: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortOrder {
            property: property.into(),
            direction,
        });
        self
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Bind `page`, `size` and repeated `sort` parameters.
    ///
    /// - `size=0` or a missing size falls back to the configured default;
    ///   larger sizes are clamped to the configured maximum.
    /// - `sort=name` sorts ascending; `sort=name,desc` or `sort=name,price,desc`
    ///   apply the trailing direction to every listed property.
    /// - Properties outside `sortable` are rejected.
    ///
    /// Other keys are ignored.
    pub fn from_query_pairs(
        pairs: &[(String, String)],
        config: &PaginationConfig,
        sortable: &[&str],
    ) -> Result<Self, AppError> {
        let mut request = Self::new(0, config.default_size);

        for (key, value) in pairs {
            match key.as_str() {
                "page" => request.page = parse_number("page", value)?,
                "size" => {
                    request.size = match parse_number("size", value)? {
                        0 => config.default_size,
                        n => n.min(config.max_size),
                    }
                }
                "sort" => request.sort.extend(parse_sort(value, sortable)?),
                _ => {}
            }
        }

        // Offsets are bound as signed 64-bit integers
        match request.page.checked_mul(request.size) {
            Some(offset) if offset <= i64::MAX as u64 => Ok(request),
            _ => Err(AppError::BadRequest(format!(
                "Query parameter 'page' is out of range: {}",
                request.page
            ))),
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, AppError> {
    value.trim().parse().map_err(|_| {
        AppError::BadRequest(format!(
            "Query parameter '{}' must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}

fn parse_sort(value: &str, sortable: &[&str]) -> Result<Vec<SortOrder>, AppError> {
    let mut parts: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let direction = match parts.last().and_then(|p| p.parse::<SortDirection>().ok()) {
        Some(direction) => {
            parts.pop();
            direction
        }
        None => SortDirection::Asc,
    };

    parts
        .into_iter()
        .map(|property| {
            if sortable.contains(&property) {
                Ok(SortOrder {
                    property: property.to_string(),
                    direction,
                })
            } else {
                Err(AppError::BadRequest(format!(
                    "Cannot sort by '{}'; sortable properties are: {}",
                    property,
                    sortable.join(", ")
                )))
            }
        })
        .collect()
}

/// One page of results plus the total number of matches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            1
        } else {
            self.total_elements.div_ceil(self.size)
        }
    }

}

/// `X-Total-Count` and `Link` headers for `page`.
///
/// Link relations appear in the order `next`, `prev`, `last`, `first`;
/// `next` and `prev` only when such a page exists. Each URI is the request
/// URI with its `page` and `size` parameters replaced.
pub fn pagination_headers<T>(uri: &Uri, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total_elements));

    let total_pages = page.total_pages();
    let last_page = total_pages.saturating_sub(1);
    let mut links = Vec::with_capacity(4);

    if let Some(next) = page.page.checked_add(1).filter(|next| *next < total_pages) {
        links.push(link(uri, next, page.size, "next"));
    }
    if page.page > 0 {
        links.push(link(uri, page.page - 1, page.size, "prev"));
    }
    links.push(link(uri, last_page, page.size, "last"));
    links.push(link(uri, 0, page.size, "first"));

    match HeaderValue::from_str(&links.join(",")) {
        Ok(value) => {
            headers.insert(axum::http::header::LINK, value);
        }
        Err(e) => tracing::warn!("Skipping Link header: {}", e),
    }

    headers
}

fn link(uri: &Uri, page: u64, size: u64, rel: &str) -> String {
    format!("<{}>; rel=\"{}\"", page_uri(uri, page, size), rel)
}

fn page_uri(uri: &Uri, page: u64, size: u64) -> String {
    let mut params: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            let key = urlencoding::decode(key)
                .map(|k| k.into_owned())
                .unwrap_or_else(|_| key.to_string());
            key != "page" && key != "size"
        })
        .map(str::to_string)
        .collect();

    params.push(format!("page={}", page));
    params.push(format!("size={}", size));

    format!("{}?{}", uri.path(), params.join("&"))
        .replace(',', "%2C")
        .replace(';', "%3B")
}
