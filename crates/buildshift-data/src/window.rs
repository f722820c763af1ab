//! Paging window behind the infinite-scroll lists.
//!
//! Collections are fetched in full up front; the window exposes a growing
//! prefix of that buffer. A load-more trigger (the selection reaching the
//! bottom of the list) advances the page counter; replacing the items, as a
//! filter or sort change does, resets back to the first page.
//!
//! Invariant: `visible().len() == min(len(), page() * page_size())` after
//! every operation.

/// Default page size for all dashboard lists.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A growing prefix view over a fully-loaded collection.
#[derive(Debug, Clone)]
pub struct PageWindow<T> {
    all: Vec<T>,
    page: usize,
    page_size: usize,
}

impl<T> Default for PageWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<T> PageWindow<T> {
    /// Create an empty window showing the first page.
    ///
    /// A zero `page_size` is treated as the default size.
    pub fn new(page_size: usize) -> Self {
        Self {
            all: Vec::new(),
            page: 1,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Replace the authoritative item set and reset to the first page.
    ///
    /// This is the entry point for both the initial fetch and every
    /// filter/sort change: the window always pages over the set it was
    /// last given, never over the raw fetch.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.all = items;
        self.page = 1;
    }

    /// Advance the window by one page.
    ///
    /// Returns true if the visible slice grew; once every item is visible
    /// further triggers are no-ops.
    pub fn load_more(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.page += 1;
        true
    }

    /// The currently visible prefix.
    pub fn visible(&self) -> &[T] {
        let end = self.visible_len();
        &self.all[..end]
    }

    /// Number of currently visible items: `min(len, page * page_size)`.
    pub fn visible_len(&self) -> usize {
        self.all.len().min(self.page * self.page_size)
    }

    /// Total number of items in the authoritative set.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Returns true if the authoritative set is empty.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Returns true once every item is visible.
    pub fn is_exhausted(&self) -> bool {
        self.visible_len() == self.all.len()
    }

    /// Current page counter (starts at 1).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Configured page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// All items, ignoring the window.
    pub fn items(&self) -> &[T] {
        &self.all
    }

    /// Mutable access to the full set; the page is left untouched so
    /// in-place edits (status flips) do not scroll the list.
    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.all
    }
}
