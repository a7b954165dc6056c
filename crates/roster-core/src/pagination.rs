//! Pagination arithmetic and the page-position state that goes with it.

use serde::{Deserialize, Serialize};

/// Page sizes offered to the UI: 10, then 50 through 500 in steps of 50.
/// Every entry is positive, so a page size chosen from here is always valid.
pub const PAGE_SIZE_OPTIONS: [usize; 11] =
  [10, 50, 100, 150, 200, 250, 300, 350, 400, 450, 500];

pub const DEFAULT_PAGE_SIZE: usize = PAGE_SIZE_OPTIONS[0];

/// Maximum number of page links shown before ellipses kick in.
const MAX_VISIBLE_PAGES: usize = 5;

// ─── Slicing ─────────────────────────────────────────────────────────────────

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
  pub slice:       &'a [T],
  /// Never less than 1, even for an empty collection.
  pub total_pages: usize,
}

/// `max(1, ceil(len / page_size))`. `page_size` must be positive.
pub fn total_pages(len: usize, page_size: usize) -> usize {
  debug_assert!(page_size > 0, "page size must be positive");
  len.div_ceil(page_size.max(1)).max(1)
}

/// Slice `items` to the 1-based `page`.
///
/// The page is not clamped: a page past the end yields an empty slice, and
/// keeping `page` in range is the caller's job.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
  let total_pages = total_pages(items.len(), page_size);
  let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
  let end = start.saturating_add(page_size).min(items.len());
  Page { slice: &items[start..end], total_pages }
}

// ─── Page links ──────────────────────────────────────────────────────────────

/// One entry in the page-link strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
  Page(usize),
  Ellipsis,
}

/// The visible page-link window for `current` out of `total` pages.
///
/// All pages when there are at most five. Otherwise the first and last page
/// are always shown, with up to three neighbours of `current` in between
/// (pages 2–4 near the start, the last four near the end) and an ellipsis
/// wherever pages are skipped.
pub fn page_numbers(current: usize, total: usize) -> Vec<PageLink> {
  if total <= MAX_VISIBLE_PAGES {
    return (1..=total).map(PageLink::Page).collect();
  }

  let mut start = current.saturating_sub(1).max(2);
  let mut end = (current + 1).min(total - 1);
  if current <= 3 {
    end = 4;
  } else if current >= total - 2 {
    start = total - 3;
  }

  let mut links = vec![PageLink::Page(1)];
  if start > 2 {
    links.push(PageLink::Ellipsis);
  }
  links.extend((start..=end).map(PageLink::Page));
  if end < total - 1 {
    links.push(PageLink::Ellipsis);
  }
  links.push(PageLink::Page(total));
  links
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Current page position and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  page:      usize,
  page_size: usize,
}

impl Default for Pagination {
  fn default() -> Self { Self::new(DEFAULT_PAGE_SIZE) }
}

impl Pagination {
  /// Start on page 1. A zero page size falls back to the default.
  pub fn new(page_size: usize) -> Self {
    let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
    Self { page: 1, page_size }
  }

  pub fn page(&self) -> usize { self.page }

  pub fn page_size(&self) -> usize { self.page_size }

  /// Move to page `n` if it exists for a collection of `len` items.
  /// Returns `false` (and stays put) otherwise.
  pub fn change_page(&mut self, n: usize, len: usize) -> bool {
    if n >= 1 && n <= total_pages(len, self.page_size) {
      self.page = n;
      true
    } else {
      false
    }
  }

  /// Switch page size; the page always resets to 1. Zero is rejected.
  pub fn change_page_size(&mut self, page_size: usize) -> bool {
    if page_size == 0 {
      return false;
    }
    self.page_size = page_size;
    self.page = 1;
    true
  }

  pub fn reset(&mut self) { self.page = 1; }

  /// Pull the page back into range after the collection shrank.
  pub fn clamp(&mut self, len: usize) {
    self.page = self.page.clamp(1, total_pages(len, self.page_size));
  }

  pub fn slice<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
    paginate(items, self.page_size, self.page)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn twenty_five_items_in_pages_of_ten() {
    let items: Vec<usize> = (1..=25).collect();

    let first = paginate(&items, 10, 1);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.slice, &items[0..10]);

    let last = paginate(&items, 10, 3);
    assert_eq!(last.slice, &[21, 22, 23, 24, 25]);
  }

  #[test]
  fn empty_collection_still_has_one_page() {
    let items: Vec<u8> = Vec::new();
    let page = paginate(&items, 10, 1);
    assert_eq!(page.total_pages, 1);
    assert!(page.slice.is_empty());
  }

  #[test]
  fn page_past_the_end_is_empty_not_clamped() {
    let items: Vec<usize> = (0..5).collect();
    assert!(paginate(&items, 10, 4).slice.is_empty());
  }

  #[test]
  fn pages_partition_the_collection() {
    for len in [0usize, 1, 9, 10, 11, 99, 100, 101, 523] {
      let items: Vec<usize> = (0..len).collect();
      for size in PAGE_SIZE_OPTIONS {
        let total = total_pages(len, size);
        assert_eq!(total, len.div_ceil(size).max(1));
        let seen: Vec<usize> = (1..=total)
          .flat_map(|p| paginate(&items, size, p).slice.iter().copied())
          .collect();
        assert_eq!(seen, items, "len={len} size={size}");
      }
    }
  }

  #[test]
  fn changing_page_size_resets_to_first_page() {
    let mut p = Pagination::default();
    assert!(p.change_page(3, 45));
    assert_eq!(p.page(), 3);
    assert!(p.change_page_size(50));
    assert_eq!(p.page(), 1);
    assert_eq!(p.page_size(), 50);
    assert!(!p.change_page_size(0));
    assert_eq!(p.page_size(), 50);
  }

  #[test]
  fn change_page_rejects_out_of_range() {
    let mut p = Pagination::default();
    assert!(!p.change_page(0, 25));
    assert!(!p.change_page(4, 25));
    assert_eq!(p.page(), 1);
  }

  #[test]
  fn clamp_pulls_page_back_after_shrink() {
    let mut p = Pagination::default();
    assert!(p.change_page(3, 30));
    p.clamp(12);
    assert_eq!(p.page(), 2);
    p.clamp(0);
    assert_eq!(p.page(), 1);
  }

  #[test]
  fn page_numbers_small_total_lists_everything() {
    use PageLink::Page as P;
    assert_eq!(page_numbers(1, 3), vec![P(1), P(2), P(3)]);
    assert_eq!(page_numbers(1, 1), vec![P(1)]);
  }

  #[test]
  fn page_numbers_windows_with_ellipses() {
    use PageLink::{Ellipsis as E, Page as P};
    assert_eq!(page_numbers(1, 10), vec![P(1), P(2), P(3), P(4), E, P(10)]);
    assert_eq!(page_numbers(5, 10), vec![P(1), E, P(4), P(5), P(6), E, P(10)]);
    assert_eq!(page_numbers(10, 10), vec![P(1), E, P(7), P(8), P(9), P(10)]);
    assert_eq!(page_numbers(3, 6), vec![P(1), P(2), P(3), P(4), E, P(6)]);
  }
}
