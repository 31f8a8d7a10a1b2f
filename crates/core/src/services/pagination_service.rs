/// Slices the table-ordered records into fixed-size pages.
///
/// Stateless: the caller owns the page number and calls [`clamp_page`](Self::clamp_page)
/// whenever the record count changes. Page numbers are 1-based.
pub struct PaginationService {
    page_size: usize,
}

impl PaginationService {
    /// `page_size` of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `items[(page-1)*size .. page*size]`, cut short at the end of the list.
    /// Page 0 reads as page 1; pages past the end are empty.
    pub fn page<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        let start = (page.max(1) - 1).saturating_mul(self.page_size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }

    /// `ceil(count / size)`; zero when there is nothing to show.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Pull `current` back inside the page range after the count shrank.
    ///
    /// With no records at all the page is left alone (the table shows its empty
    /// state); otherwise the result is between 1 and the total page count.
    pub fn clamp_page(&self, current: usize, count: usize) -> usize {
        let total = self.total_pages(count);
        if total == 0 {
            return current.max(1);
        }
        current.clamp(1, total)
    }
}

impl Default for PaginationService {
    fn default() -> Self {
        Self::new(5)
    }
}
