use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One 1-based page of an ordered result list
///
/// Out-of-range pages are empty but still report the true totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice `items` to page `page`; a `page_size` of 0 means [`DEFAULT_PAGE_SIZE`]
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        let total_count = items.len();
        let total_pages = total_count.div_ceil(page_size);

        let items = match page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) {
            Some(start) if start < total_count => items.into_iter().skip(start).take(page_size).collect(),
            _ => Vec::new(),
        };

        Self { items, page, page_size, total_count, total_pages }
    }

    /// 1-based inclusive positions of this page's items within the full list
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let start = (self.page - 1) * self.page_size + 1;
        Some((start, start + self.items.len() - 1))
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}
