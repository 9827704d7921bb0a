use serde::Serialize;

use crate::error::AppError;

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Grid paging. `page` is zero-based; out-of-range moves are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), AppError> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(AppError::InvalidInput(format!(
                "page size must be one of {:?}, got {}",
                PAGE_SIZE_OPTIONS, page_size
            )));
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    /// Returns whether the page changed.
    pub fn next(&mut self, total_rows: usize) -> bool {
        self.go_to(self.page + 1, total_rows)
    }

    pub fn previous(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn go_to(&mut self, page: usize, total_rows: usize) -> bool {
        if page >= self.page_count(total_rows) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn first(&mut self) {
        self.page = 0;
    }

    /// Half-open row range of the current page.
    pub fn range(&self, total_rows: usize) -> (usize, usize) {
        let start = (self.page * self.page_size).min(total_rows);
        let end = (start + self.page_size).min(total_rows);
        (start, end)
    }
}
