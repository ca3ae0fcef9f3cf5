//! Pagination shared by every repository.
//!
//! Pages are zero-based. The requested size falls back to the configured default and is
//! clamped to the configured maximum, so a client cannot ask for the whole table at once.

use crate::config::CoreConfig;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    pub fn new(page: Option<usize>, size: Option<usize>, cfg: &CoreConfig) -> Self {
        let size = size
            .filter(|s| *s > 0)
            .unwrap_or(cfg.default_page_size())
            .min(cfg.max_page_size());
        Self {
            page: page.unwrap_or(0),
            size,
        }
    }

    /// First page at the configured default size.
    pub fn first(cfg: &CoreConfig) -> Self {
        Self::new(None, None, cfg)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the totals a client needs to page further.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slices an already ordered result set into the requested page.
pub(crate) fn paginate<T>(rows: Vec<T>, request: PageRequest) -> Page<T> {
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(request.size());
    let items = rows
        .into_iter()
        .skip(request.offset())
        .take(request.size())
        .collect();

    Page {
        items,
        page: request.page(),
        size: request.size(),
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_defaults_and_clamps() {
        let cfg = CoreConfig::default();
        assert_eq!(PageRequest::new(None, None, &cfg).size(), 10);
        assert_eq!(PageRequest::new(None, Some(0), &cfg).size(), 10);
        assert_eq!(PageRequest::new(Some(2), Some(500), &cfg).size(), 100);
        assert_eq!(PageRequest::new(Some(2), Some(5), &cfg).page(), 2);
    }

    #[test]
    fn paginate_reports_totals() {
        let cfg = CoreConfig::default();
        let rows: Vec<u32> = (0..23).collect();

        let page = paginate(rows.clone(), PageRequest::new(Some(2), None, &cfg));
        assert_eq!(page.items, vec![20, 21, 22]);
        assert_eq!(page.total_items, 23);
        assert_eq!(page.total_pages, 3);

        let beyond = paginate(rows, PageRequest::new(Some(9), None, &cfg));
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_pages, 3);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = paginate(Vec::<u32>::new(), PageRequest::first(&CoreConfig::default()));
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
