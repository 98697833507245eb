//! Offset pagination descriptors and page results.

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Description,
    Version,
    CreatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Description => "description",
            SortField::Version => "version",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for SortField {
    type Err = PaginationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(SortField::Name),
            "description" => Ok(SortField::Description),
            "version" => Ok(SortField::Version),
            "created_at" | "createdAt" => Ok(SortField::CreatedAt),
            other => Err(PaginationError::InvalidSort(format!(
                "unknown sort field `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// `field[,asc|desc]` ordering of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn parse(raw: &str) -> Result<Self, PaginationError> {
        let mut parts = raw.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default().parse::<SortField>()?;
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(PaginationError::InvalidSort(format!(
                    "unknown sort direction `{other}`"
                )));
            }
        };
        if parts.next().is_some() {
            return Err(PaginationError::InvalidSort(format!(
                "sort `{raw}` has too many segments"
            )));
        }
        Ok(Self { field, direction })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

/// Which slice of the collection a caller wants. `page` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, None)
    }
}

impl PageRequest {
    /// `size` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, size: u32, sort: Option<Sort>) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn from_query(
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<&str>,
    ) -> Result<Self, PaginationError> {
        let sort = match sort.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(Sort::parse(raw)?),
            None => None,
        };
        Ok(Self::new(
            page.unwrap_or(0),
            size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        ))
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self { page, ..*self }
    }
}

/// One page of results together with the totals needed for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = u32::try_from(total_elements.div_ceil(size)).unwrap_or(u32::MAX);
        Self {
            items,
            number: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }

    /// Index of the last page; `0` for an empty collection.
    pub fn last_page(&self) -> u32 {
        self.total_pages.saturating_sub(1)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid sort: {0}")]
    InvalidSort(String),
}
