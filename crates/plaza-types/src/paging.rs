use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Listing order for comment threads. Ids are monotonic, so id order is
/// creation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Oldest,
    Newest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            "newest" | "desc" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Oldest => f.write_str("oldest"),
            SortOrder::Newest => f.write_str("newest"),
        }
    }
}

fn default_page() -> u32 {
    0
}

fn default_size() -> u32 {
    10
}

/// Zero-based page index plus page size, as sent in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub current_size: u32,
    pub total_pages: u32,
    pub total_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub page_info: PageInfo,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, total_size: u64, items: Vec<T>) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_size.div_ceil(size).min(u64::from(u32::MAX)) as u32;
        Self {
            page_info: PageInfo {
                current_page: request.page,
                current_size: items.len() as u32,
                total_pages,
                total_size,
            },
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_info_counts_partial_last_page() {
        let page = Page::new(PageRequest::new(2, 10), 25, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.page_info.total_pages, 3);
        assert_eq!(page.page_info.current_size, 5);
        assert_eq!(page.page_info.current_page, 2);
        assert_eq!(page.page_info.total_size, 25);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: Page<u8> = Page::new(PageRequest::default(), 0, vec![]);
        assert_eq!(page.page_info.total_pages, 0);
        assert_eq!(page.page_info.current_size, 0);
    }

    #[test]
    fn sort_order_parses_config_values() {
        assert_eq!("Newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn query_defaults_apply() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PageRequest::new(0, 10));
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
    }
}
