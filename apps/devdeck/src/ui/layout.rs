//! Greedy left-to-right, top-to-bottom wrapping of fixed-size items.
//!
//! Items keep their natural size; a row breaks when the next item would cross the
//! right edge and the row already holds something. Each row is as tall as its tallest
//! item.

pub const DEFAULT_GAP: i32 = 15;
pub const MIN_ITEM_WIDTH: i32 = 120;
pub const MIN_ITEM_HEIGHT: i32 = 30;
pub const DEFAULT_CONTAINER_WIDTH: i32 = 600;
pub const MIN_TOTAL_HEIGHT: i32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub size: Size,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    pub placements: Vec<Placement>,
    pub size: Size,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapLayout {
    pub hgap: i32,
    pub vgap: i32,
    pub insets: Insets,
    /// Stand-in size for items reporting a non-positive dimension.
    pub fallback_item: Size,
    pub default_width: i32,
    pub min_height: i32,
}

impl Default for WrapLayout {
    fn default() -> Self {
        Self {
            hgap: DEFAULT_GAP,
            vgap: DEFAULT_GAP,
            insets: Insets::default(),
            fallback_item: Size::new(MIN_ITEM_WIDTH, MIN_ITEM_HEIGHT),
            default_width: DEFAULT_CONTAINER_WIDTH,
            min_height: MIN_TOTAL_HEIGHT,
        }
    }
}

impl WrapLayout {
    pub fn with_gaps(hgap: i32, vgap: i32) -> Self {
        Self {
            hgap,
            vgap,
            ..Self::default()
        }
    }

    fn effective(&self, item: Size) -> Size {
        Size {
            width: if item.width <= 0 {
                self.fallback_item.width
            } else {
                item.width
            },
            height: if item.height <= 0 {
                self.fallback_item.height
            } else {
                item.height
            },
        }
    }

    pub fn arrange(&self, items: &[Size], container_width: i32) -> Arrangement {
        let width = if container_width <= 0 {
            self.default_width
        } else {
            container_width
        };
        let right_edge = width - self.insets.right;
        let left = self.insets.left;

        let mut placements = Vec::with_capacity(items.len());
        let mut x = left;
        let mut y = self.insets.top;
        let mut row_height = 0;
        let mut row = 0;

        // Offsets saturate at i32::MAX instead of overflowing on huge items.
        for item in items {
            let size = self.effective(*item);
            if x.saturating_add(size.width) > right_edge && x > left {
                y = y.saturating_add(row_height).saturating_add(self.vgap);
                x = left;
                row_height = 0;
                row += 1;
            }
            placements.push(Placement { x, y, size, row });
            row_height = row_height.max(size.height);
            x = x.saturating_add(size.width).saturating_add(self.hgap);
        }

        let height = y
            .saturating_add(row_height)
            .saturating_add(self.insets.bottom)
            .max(self.min_height);
        Arrangement {
            rows: if placements.is_empty() { 0 } else { row + 1 },
            placements,
            size: Size { width, height },
        }
    }
}
