//! Page request sanitization and page metadata.
//!
//! # Invariants
//! - `page >= 1` and `1 <= limit <= 100` for every `PageRequest`.
//! - `total_pages >= 1`, so an empty result is "page 1 of 1", never "of 0".

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Sanitized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamps raw values: `page` to at least 1, `limit` to `[1, 100]`.
    /// Absent values take the defaults.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.map_or(DEFAULT_PAGE, |value| {
            clamp_to_u32(value, 1, i64::from(u32::MAX))
        });
        let limit = limit.map_or(DEFAULT_LIMIT, |value| {
            clamp_to_u32(value, 1, i64::from(MAX_LIMIT))
        });
        Self { page, limit }
    }

    /// Parses query-string values; non-numeric text counts as absent.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(page.and_then(parse_number), limit.and_then(parse_number))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Metadata for this window over `total_items`.
    pub fn meta(&self, total_items: u64) -> PaginationMeta {
        calculate_meta(total_items, self.page, self.limit)
    }
}

fn parse_number(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn clamp_to_u32(value: i64, min: i64, max: i64) -> u32 {
    u32::try_from(value.clamp(min, max)).unwrap_or(u32::MAX)
}

/// Page metadata returned next to every paginated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
}

/// Computes page metadata.
///
/// `limit` of zero is treated as one; callers normally pass values from a
/// `PageRequest`, which is already clamped.
pub fn calculate_meta(total_items: u64, page: u32, limit: u32) -> PaginationMeta {
    let limit = limit.max(1);
    let total_pages = total_items.div_ceil(u64::from(limit)).max(1);
    let has_next_page = u64::from(page) < total_pages;
    let has_previous_page = page > 1;

    PaginationMeta {
        page,
        limit,
        total_items,
        total_pages,
        has_next_page,
        has_previous_page,
        next_page: has_next_page.then(|| page.saturating_add(1)),
        previous_page: has_previous_page.then(|| page - 1),
    }
}

/// `{data, meta}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, meta: PaginationMeta) -> Self {
        Self { data, meta }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive `ASC`/`DESC`; anything else is the default (`DESC`).
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|text| text.trim().to_ascii_uppercase()).as_deref() {
            Some("ASC") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
