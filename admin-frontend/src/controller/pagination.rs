//! Page-number window shown under a paginated table.

pub const DEFAULT_WINDOW: u32 = 5;

/// Page numbers to render as buttons, centered on `current` where possible.
///
/// The window is clamped to `1..=total` and shifted back toward page 1 when it
/// would run past the last page, so it always holds `min(size, total)` pages.
/// Out-of-range inputs are clamped first.
pub fn page_window(current: u32, total: u32, size: u32) -> Vec<u32> {
    let total = total.max(1);
    let size = size.max(1);
    let current = current.clamp(1, total);

    let mut start = current.saturating_sub(size / 2).max(1);
    let end = total.min(start + size - 1);

    if end - start + 1 < size {
        start = end.saturating_sub(size - 1).max(1);
    }

    (start..=end).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub current: bool,
}

/// Everything the pagination controls need to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: u32,
    pub total: u32,
    pub links: Vec<PageLink>,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: u32,
    pub next: u32,
}

impl PaginationView {
    pub fn new(current: u32, total: u32, window: u32) -> Self {
        let total = total.max(1);
        let current = current.clamp(1, total);

        let links = page_window(current, total, window)
            .into_iter()
            .map(|number| PageLink {
                number,
                current: number == current,
            })
            .collect();

        Self {
            current,
            total,
            links,
            has_previous: current > 1,
            has_next: current < total,
            previous: current.saturating_sub(1).max(1),
            next: (current + 1).min(total),
        }
    }

    /// Controls are hidden when everything fits on one page.
    pub fn is_multi_page(&self) -> bool {
        self.total > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_total_shows_every_page() {
        assert_eq!(page_window(2, 3, 5), vec![1, 2, 3]);
    }

    #[test]
    fn window_centers_on_current_page() {
        assert_eq!(page_window(10, 20, 5), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn window_shifts_right_at_the_start() {
        assert_eq!(page_window(1, 20, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 20, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_shifts_left_at_the_end() {
        assert_eq!(page_window(20, 20, 5), vec![16, 17, 18, 19, 20]);
        assert_eq!(page_window(19, 20, 5), vec![16, 17, 18, 19, 20]);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(page_window(0, 0, 5), vec![1]);
        assert_eq!(page_window(50, 7, 5), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(3, 4, 0), vec![3]);
    }

    #[test]
    fn window_is_always_increasing_bounded_and_full() {
        for total in 1..=40u32 {
            for current in 1..=total {
                let window = page_window(current, total, DEFAULT_WINDOW);
                assert_eq!(window.len() as u32, DEFAULT_WINDOW.min(total));
                assert!(window.windows(2).all(|pair| pair[0] < pair[1]));
                assert!(window.iter().all(|page| (1..=total).contains(page)));
                assert!(window.contains(&current));
            }
        }
    }

    #[test]
    fn previous_and_next_disable_at_the_edges() {
        let first = PaginationView::new(1, 4, 5);
        assert!(!first.has_previous);
        assert!(first.has_next);
        assert_eq!(first.next, 2);

        let last = PaginationView::new(4, 4, 5);
        assert!(last.has_previous);
        assert!(!last.has_next);
        assert_eq!(last.previous, 3);

        let only = PaginationView::new(1, 1, 5);
        assert!(!only.has_previous && !only.has_next);
        assert!(!only.is_multi_page());
    }

    #[test]
    fn current_page_is_marked() {
        let view = PaginationView::new(3, 10, 5);
        let marked: Vec<u32> = view
            .links
            .iter()
            .filter(|link| link.current)
            .map(|link| link.number)
            .collect();
        assert_eq!(marked, vec![3]);
    }
}
