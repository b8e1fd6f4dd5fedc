use std::num::NonZeroUsize;

use crate::filters::{FilterIndex, SHOW_ALL};

/// Current page (1-based) and filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageCursor {
    pub page: usize,
    pub filter: String,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            filter: SHOW_ALL.to_string(),
        }
    }
}

/// Slices a filter's id list into fixed-size pages of groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    page_size: NonZeroUsize,
}

impl Paginator {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Never below 1, even for an empty list.
    pub fn max_page_for(&self, count: usize) -> usize {
        count.div_ceil(self.page_size()).max(1)
    }

    pub fn max_page(&self, index: &FilterIndex, filter: &str) -> usize {
        self.max_page_for(index.len_of(filter))
    }

    pub fn clamp(page: i64, max_page: usize) -> usize {
        let max_page = max_page.max(1);
        if page < 1 {
            return 1;
        }
        usize::try_from(page).map_or(max_page, |p| p.min(max_page))
    }

    /// Ids on `page`; short or empty past the end of the list.
    pub fn slice<'a>(&self, index: &'a FilterIndex, filter: &str, page: usize) -> &'a [String] {
        let ids = index.ids_for(filter);
        let beg = page.saturating_sub(1).saturating_mul(self.page_size());
        let end = beg.saturating_add(self.page_size()).min(ids.len());
        if beg >= ids.len() {
            return &[];
        }
        &ids[beg..end]
    }
}
