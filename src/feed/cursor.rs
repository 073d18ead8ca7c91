// ABOUTME: Pagination arithmetic over the ledger's append-only post array.
// ABOUTME: Pages run newest-first; the cursor keeps fetched ranges disjoint.

/// Inclusive range of post indices, walked from `start` down to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u64,
    pub end: u64,
}

impl PageRange {
    /// Range for `page` (1-based) of a log holding `total` posts.
    ///
    /// `lowest_seen` is the smallest index fetched so far in this session; the
    /// range is clamped below it so it never overlaps earlier pages, even if
    /// posts were appended in between. Returns `None` when nothing is left.
    pub fn for_page(total: u64, page: u64, page_size: u64, lowest_seen: Option<u64>) -> Option<Self> {
        if page == 0 || page_size == 0 {
            return None;
        }
        let offset = (page - 1).checked_mul(page_size)?;
        if offset >= total {
            return None;
        }

        let mut start = total - 1 - offset;
        if let Some(seen) = lowest_seen {
            start = start.min(seen.checked_sub(1)?);
        }
        let end = start.saturating_sub(page_size - 1);
        Some(Self { start, end })
    }

    /// Indices in fetch order, newest first.
    pub fn indices(self) -> impl Iterator<Item = u64> {
        (self.end..=self.start).rev()
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.start - self.end + 1) as usize
    }

    /// True if this range reaches the oldest post.
    pub fn is_final(&self) -> bool {
        self.end == 0
    }
}

/// Pagination progress for one session. Reset by a full reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Next page to request, starting at 1.
    pub page: u64,
    pub page_size: u64,
    /// Smallest index fetched so far.
    pub last_seen_index: Option<u64>,
}

impl Cursor {
    pub fn new(page_size: u64) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            last_seen_index: None,
        }
    }

    /// Range for `page` given the current log size.
    pub fn range_for(&self, total: u64, page: u64) -> Option<PageRange> {
        PageRange::for_page(total, page, self.page_size, self.last_seen_index)
    }

    /// Record that `page` was loaded over `range`.
    pub fn advance(&mut self, page: u64, range: Option<PageRange>) {
        self.page = self.page.max(page + 1);
        if let Some(range) = range {
            self.last_seen_index = Some(match self.last_seen_index {
                Some(seen) => seen.min(range.end),
                None => range.end,
            });
        }
    }
}
