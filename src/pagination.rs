//! Page-list math for the numbered pagination bar.

/// One slot of the numbered page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(u32),
    Ellipsis,
}

/// Kind of control in the pagination bar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Previous,
    Page(u32),
    Ellipsis,
    Next,
}

/// A rendered pagination control. `target` is `None` for controls that
/// cannot be activated (ellipsis, Previous on the first page, Next on the last).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    pub kind: ControlKind,
    pub target: Option<u32>,
    pub current: bool,
}

impl PageControl {
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    pub fn label(&self) -> String {
        match self.kind {
            ControlKind::Previous => "Previous".to_string(),
            ControlKind::Next => "Next".to_string(),
            ControlKind::Ellipsis => "...".to_string(),
            ControlKind::Page(n) => n.to_string(),
        }
    }
}

/// First page, last page, and the current page with its neighbours, with an
/// ellipsis wherever consecutive entries skip numbers.
pub fn page_slots(page: u32, total_pages: u32) -> Vec<PageSlot> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut candidates = vec![
        1,
        total_pages,
        page.saturating_sub(1),
        page,
        page.saturating_add(1),
    ];
    candidates.retain(|&p| (1..=total_pages).contains(&p));
    candidates.sort_unstable();
    candidates.dedup();

    let mut slots = Vec::with_capacity(candidates.len() * 2);
    let mut prev: Option<u32> = None;
    for p in candidates {
        if let Some(prev) = prev
            && prev + 1 < p
        {
            slots.push(PageSlot::Ellipsis);
        }
        slots.push(PageSlot::Page(p));
        prev = Some(p);
    }
    slots
}

/// The whole bar: Previous, the page list, Next. Empty when there is at most one page.
pub fn page_controls(page: u32, total_pages: u32) -> Vec<PageControl> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let mut controls = Vec::new();
    controls.push(PageControl {
        kind: ControlKind::Previous,
        target: (page > 1).then(|| page - 1),
        current: false,
    });
    for slot in page_slots(page, total_pages) {
        controls.push(match slot {
            PageSlot::Page(p) => PageControl {
                kind: ControlKind::Page(p),
                target: Some(p),
                current: p == page,
            },
            PageSlot::Ellipsis => PageControl {
                kind: ControlKind::Ellipsis,
                target: None,
                current: false,
            },
        });
    }
    controls.push(PageControl {
        kind: ControlKind::Next,
        target: (page < total_pages).then(|| page + 1),
        current: false,
    });
    controls
}
