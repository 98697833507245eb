//! Cache key definitions.

use uuid::Uuid;

use crate::application::pagination::{PageRequest, Sort};

/// Independent groups of cache entries, each with its own invalidation epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Items,
    Pages,
}

impl CacheNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheNamespace::Items => "items",
            CacheNamespace::Pages => "pages",
        }
    }
}

/// Pagination descriptor of a cached page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl From<&PageRequest> for PageKey {
    fn from(request: &PageRequest) -> Self {
        Self {
            page: request.page,
            size: request.size,
            sort: request.sort,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Item(Uuid),
    Page(PageKey),
}

impl CacheKey {
    pub fn namespace(&self) -> CacheNamespace {
        match self {
            CacheKey::Item(_) => CacheNamespace::Items,
            CacheKey::Page(_) => CacheNamespace::Pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pagination::{SortDirection, SortField};

    #[test]
    fn page_keys_distinguish_sort() {
        let plain = PageKey::from(&PageRequest::new(0, 20, None));
        let sorted = PageKey::from(&PageRequest::new(
            0,
            20,
            Some(Sort::new(SortField::Name, SortDirection::Asc)),
        ));
        assert_ne!(plain, sorted);
        assert_eq!(CacheKey::Page(plain).namespace(), CacheNamespace::Pages);
    }
}
