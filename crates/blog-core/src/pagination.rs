//! Page-number resolution and page results.
//!
//! Listing never fails on a bad page parameter: text that is not an integer
//! selects the first page, an integer outside `1..=num_pages` selects the
//! last page.

use serde::Serialize;

/// Raw `page` query parameter, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    /// No parameter given.
    First,
    /// The parameter is not an integer.
    NotAnInteger,
    /// An integer, possibly out of range.
    Number(i64),
}

impl PageSelector {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return PageSelector::First;
        };

        // Decimal and exponent forms ("2.0", "1e1") are not integers.
        match raw.trim().parse::<i64>() {
            Ok(number) => PageSelector::Number(number),
            Err(_) => PageSelector::NotAnInteger,
        }
    }

    /// Resolve to a 1-based page number within `1..=num_pages`.
    pub fn resolve(self, num_pages: u64) -> u64 {
        let last = num_pages.max(1);
        match self {
            PageSelector::First | PageSelector::NotAnInteger => 1,
            PageSelector::Number(n) if n >= 1 && (n as u64) <= last => n as u64,
            PageSelector::Number(_) => last,
        }
    }
}

/// Total number of pages for `total` items. An empty list still has one page.
pub fn num_pages_for(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

/// Zero-based offset of the first item on `page`.
pub fn offset_for(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1) * per_page
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u64,
    pub num_pages: u64,
    /// Total items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, total: u64) -> Self {
        Self {
            items,
            number,
            num_pages,
            total,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_garbage_pages_resolve_to_first() {
        assert_eq!(PageSelector::parse(None).resolve(5), 1);
        assert_eq!(PageSelector::parse(Some("abc")).resolve(5), 1);
        assert_eq!(PageSelector::parse(Some("")).resolve(5), 1);
        assert_eq!(PageSelector::parse(Some("2.5")).resolve(5), 1);
    }

    #[test]
    fn decimal_and_exponent_text_is_not_an_integer() {
        assert_eq!(PageSelector::parse(Some("2.0")), PageSelector::NotAnInteger);
        assert_eq!(PageSelector::parse(Some("2.0")).resolve(4), 1);
        assert_eq!(PageSelector::parse(Some("1e1")).resolve(4), 1);
    }

    #[test]
    fn out_of_range_numbers_resolve_to_last() {
        assert_eq!(PageSelector::parse(Some("99")).resolve(4), 4);
        assert_eq!(PageSelector::parse(Some("0")).resolve(4), 4);
        assert_eq!(PageSelector::parse(Some("-3")).resolve(4), 4);
    }

    #[test]
    fn in_range_numbers_are_kept() {
        assert_eq!(PageSelector::parse(Some("2")).resolve(4), 2);
        assert_eq!(PageSelector::parse(Some(" 3 ")).resolve(4), 3);
        assert_eq!(PageSelector::parse(Some("+2")).resolve(4), 2);
    }

    #[test]
    fn empty_listing_has_a_single_page() {
        assert_eq!(num_pages_for(0, 3), 1);
        assert_eq!(PageSelector::parse(Some("7")).resolve(num_pages_for(0, 3)), 1);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(num_pages_for(3, 3), 1);
        assert_eq!(num_pages_for(4, 3), 2);
        assert_eq!(num_pages_for(7, 3), 3);
        assert_eq!(offset_for(3, 3), 6);
    }

    #[test]
    fn page_navigation() {
        let page = Page::new(vec![4, 5, 6], 2, 3, 7);
        assert_eq!(page.previous_page_number(), Some(1));
        assert_eq!(page.next_page_number(), Some(3));

        let last = Page::new(vec![7], 3, 3, 7);
        assert!(!last.has_next());
        assert_eq!(last.map(|n| n * 10).items, vec![70]);
    }
}
