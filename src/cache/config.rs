//! Cache configuration.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_ITEM_LIMIT: usize = 1000;
const DEFAULT_PAGE_LIMIT: usize = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false the service reads the repository on every request.
    pub enabled: bool,
    /// Maximum single items kept.
    pub item_limit: usize,
    /// Maximum collection pages kept.
    pub page_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            item_limit: DEFAULT_ITEM_LIMIT,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            item_limit: settings.item_limit,
            page_limit: settings.page_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the item limit as NonZeroUsize, clamping to 1 if zero.
    pub fn item_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.item_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the page limit as NonZeroUsize, clamping to 1 if zero.
    pub fn page_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.page_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.item_limit, 1000);
        assert_eq!(config.page_limit, 200);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            item_limit: 0,
            page_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.item_limit_non_zero().get(), 1);
        assert_eq!(config.page_limit_non_zero().get(), 1);
    }
}
