//! Shelf packing for atlas surfaces
//!
//! The atlas is cut into horizontal shelves stacked from the top. Each shelf
//! keeps a sorted list of free horizontal spans, so released slots can be
//! reused and adjacent holes merge back together. Shelves that become empty
//! merge with empty neighbours, and empty shelves at the bottom are returned
//! to the unshelved area.

/// Region reserved inside an atlas, padding included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Reserved width (requested width plus padding, clamped at the atlas edge)
    pub width: u32,
    /// Reserved height (requested height plus padding, clamped at the atlas edge)
    pub height: u32,
}

impl PackedRect {
    /// Whether two reserved regions share at least one pixel
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    x: u32,
    width: u32,
}

#[derive(Debug, Clone)]
struct Shelf {
    y: u32,
    height: u32,
    free: Vec<Span>,
    occupied: usize,
}

impl Shelf {
    fn new(y: u32, height: u32, width: u32) -> Self {
        Self { y, height, free: vec![Span { x: 0, width }], occupied: 0 }
    }

    fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    fn first_fit(&self, width: u32) -> Option<usize> {
        self.free.iter().position(|span| span.width >= width)
    }

    fn take(&mut self, span_index: usize, width: u32) -> u32 {
        let span = &mut self.free[span_index];
        let x = span.x;
        span.x += width;
        span.width -= width;
        if span.width == 0 {
            self.free.remove(span_index);
        }
        self.occupied += 1;
        x
    }

    fn give_back(&mut self, x: u32, width: u32) {
        let index = self.free.partition_point(|span| span.x < x);
        self.free.insert(index, Span { x, width });

        if index + 1 < self.free.len()
            && self.free[index].x + self.free[index].width == self.free[index + 1].x
        {
            self.free[index].width += self.free[index + 1].width;
            self.free.remove(index + 1);
        }
        if index > 0 && self.free[index - 1].x + self.free[index - 1].width == self.free[index].x {
            self.free[index - 1].width += self.free[index].width;
            self.free.remove(index);
        }
        self.occupied = self.occupied.saturating_sub(1);
    }
}

/// Free-space tracker for a single fixed-size atlas
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    shelves: Vec<Shelf>,
    waste_limit: f64,
}

impl ShelfPacker {
    /// Create a packer for a `width` x `height` atlas
    ///
    /// # Arguments
    /// * `width`, `height` - Atlas size in pixels
    /// * `padding` - Pixels reserved right of and below every slot
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            shelves: Vec::new(),
            waste_limit: 0.1,
        }
    }

    /// Atlas width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a `width` x `height` request could fit into this atlas when empty
    pub fn can_ever_fit(&self, width: u32, height: u32) -> bool {
        width > 0 && height > 0 && width <= self.width && height <= self.height
    }

    /// Whether nothing is allocated
    pub fn is_empty(&self) -> bool {
        self.shelves.iter().all(Shelf::is_empty)
    }

    /// Number of live allocations
    pub fn allocated_count(&self) -> usize {
        self.shelves.iter().map(|shelf| shelf.occupied).sum()
    }

    /// Height not yet claimed by any shelf
    pub fn unshelved_height(&self) -> u32 {
        self.height - self.next_shelf_y()
    }

    /// Forget every allocation
    pub fn clear(&mut self) {
        self.shelves.clear();
    }

    /// Reserve room for a `width` x `height` slot.
    ///
    /// Returns the reserved region, or `None` when there is no room.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<PackedRect> {
        if !self.can_ever_fit(width, height) {
            return None;
        }
        let padded_width = width.saturating_add(self.padding).min(self.width);
        let padded_height = height.saturating_add(self.padding).min(self.height);

        if let Some((shelf_index, span_index)) = self.find_best_shelf(padded_width, padded_height) {
            return Some(self.place(shelf_index, span_index, padded_width));
        }

        if let Some(shelf_index) = self.find_empty_shelf(padded_width, padded_height) {
            self.split_shelf(shelf_index, padded_height);
            return Some(self.place(shelf_index, 0, padded_width));
        }

        let y = self.next_shelf_y();
        if self.height - y < padded_height {
            return None;
        }
        self.shelves.push(Shelf::new(y, padded_height, self.width));
        let shelf_index = self.shelves.len() - 1;
        Some(self.place(shelf_index, 0, padded_width))
    }

    /// Return a region previously handed out by [`ShelfPacker::allocate`]
    ///
    /// Returns `false` if the region does not belong to any shelf.
    pub fn release(&mut self, rect: PackedRect) -> bool {
        let Some(shelf_index) = self.shelves.iter().position(|shelf| shelf.y == rect.y) else {
            return false;
        };

        let shelf = &mut self.shelves[shelf_index];
        shelf.give_back(rect.x, rect.width);
        if shelf.is_empty() {
            shelf.free = vec![Span {
                x: 0,
                width: self.width,
            }];
            self.merge_empty_shelves(shelf_index);
            self.reclaim_trailing_shelves();
        }
        true
    }

    fn place(&mut self, shelf_index: usize, span_index: usize, width: u32) -> PackedRect {
        let shelf = &mut self.shelves[shelf_index];
        let x = shelf.take(span_index, width);
        PackedRect {
            x,
            y: shelf.y,
            width,
            height: shelf.height,
        }
    }

    fn find_best_shelf(&self, width: u32, height: u32) -> Option<(usize, usize)> {
        let mut best = None;
        let mut best_score = f64::INFINITY;

        for (index, shelf) in self.shelves.iter().enumerate() {
            if shelf.is_empty() || shelf.height < height {
                continue;
            }
            let Some(span_index) = shelf.first_fit(width) else {
                continue;
            };

            let waste = f64::from(shelf.height - height) / f64::from(shelf.height);
            if waste > self.waste_limit {
                continue;
            }
            let score = if shelf.height == height { waste - 1.0 } else { waste };
            if score < best_score {
                best_score = score;
                best = Some((index, span_index));
            }
        }

        best
    }

    fn find_empty_shelf(&self, width: u32, height: u32) -> Option<usize> {
        self.shelves
            .iter()
            .enumerate()
            .filter(|(_, shelf)| shelf.is_empty() && shelf.height >= height && width <= self.width)
            .min_by_key(|(_, shelf)| shelf.height)
            .map(|(index, _)| index)
    }

    fn split_shelf(&mut self, shelf_index: usize, height: u32) {
        let shelf = &mut self.shelves[shelf_index];
        let remainder = shelf.height - height;
        if remainder == 0 {
            return;
        }
        shelf.height = height;
        let below = Shelf::new(shelf.y + height, remainder, self.width);
        self.shelves.insert(shelf_index + 1, below);
    }

    fn merge_empty_shelves(&mut self, mut shelf_index: usize) {
        if shelf_index + 1 < self.shelves.len() && self.shelves[shelf_index + 1].is_empty() {
            let below = self.shelves.remove(shelf_index + 1);
            self.shelves[shelf_index].height += below.height;
        }
        if shelf_index > 0 && self.shelves[shelf_index - 1].is_empty() {
            let current = self.shelves.remove(shelf_index);
            shelf_index -= 1;
            self.shelves[shelf_index].height += current.height;
        }
    }

    fn reclaim_trailing_shelves(&mut self) {
        while self.shelves.last().is_some_and(Shelf::is_empty) {
            self.shelves.pop();
        }
    }

    fn next_shelf_y(&self) -> u32 {
        self.shelves.last().map_or(0, |shelf| shelf.y + shelf.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint(rects: &[PackedRect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_padding_is_reserved_and_clamped() {
        let mut packer = ShelfPacker::new(32, 32, 1);
        let a = packer.allocate(10, 8).expect("fits");
        let padded = PackedRect {
            x: 0,
            y: 0,
            width: 11,
            height: 9,
        };
        assert_eq!(a, padded);

        let full_width = packer.allocate(32, 4).expect("clamped padding still fits");
        assert_eq!(full_width.width, 32);
        assert_eq!(full_width.y, 9);
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let mut packer = ShelfPacker::new(16, 16, 0);
        assert!(packer.allocate(0, 4).is_none());
        assert!(packer.allocate(17, 4).is_none());
        assert!(packer.allocate(4, 17).is_none());
        assert!(packer.is_empty());
    }

    #[test]
    fn test_shelves_respect_waste_limit() {
        let mut packer = ShelfPacker::new(100, 100, 0);
        let tall = packer.allocate(10, 20).expect("fits");
        let short = packer.allocate(10, 5).expect("fits");
        // 5/20 is far below the waste limit, so a new shelf is opened
        assert_eq!(tall.y, 0);
        assert_eq!(short.y, 20);

        let similar = packer.allocate(10, 19).expect("fits");
        assert_eq!(similar.y, 0);
        assert_eq!(similar.x, 10);
    }

    #[test]
    fn test_allocations_never_overlap() {
        let mut packer = ShelfPacker::new(64, 64, 1);
        let mut rects = Vec::new();
        for (w, h) in [(7, 9), (12, 9), (30, 15), (5, 5), (8, 9), (20, 14), (3, 3), (40, 10)] {
            if let Some(rect) = packer.allocate(w, h) {
                assert!(rect.x + rect.width <= 64 && rect.y + rect.height <= 64);
                rects.push(rect);
            }
        }
        assert!(rects.len() >= 6);
        assert_eq!(packer.allocated_count(), rects.len());
        assert_disjoint(&rects);
    }

    #[test]
    fn test_released_span_is_reused_and_merged() {
        let mut packer = ShelfPacker::new(30, 10, 0);
        let a = packer.allocate(10, 10).expect("a");
        let b = packer.allocate(10, 10).expect("b");
        let c = packer.allocate(10, 10).expect("c");
        assert!(packer.allocate(10, 10).is_none());

        assert!(packer.release(a));
        assert!(packer.release(b));
        let wide = packer.allocate(20, 10).expect("merged span");
        assert_eq!((wide.x, wide.y), (0, 0));
        assert_disjoint(&[wide, c]);
    }

    #[test]
    fn test_empty_shelves_are_reclaimed() {
        let mut packer = ShelfPacker::new(20, 40, 0);
        let _top = packer.allocate(20, 10).expect("top");
        let middle = packer.allocate(20, 10).expect("middle");
        let bottom = packer.allocate(20, 10).expect("bottom");
        assert_eq!(packer.unshelved_height(), 10);

        packer.release(middle);
        packer.release(bottom);
        assert_eq!(packer.unshelved_height(), 30);

        // An empty interior shelf takes any height that fits and is split
        let mut packer = ShelfPacker::new(20, 40, 0);
        let _ = packer.allocate(20, 10).expect("a");
        let hole = packer.allocate(20, 20).expect("hole");
        let _ = packer.allocate(20, 10).expect("c");
        packer.release(hole);
        let small = packer.allocate(20, 5).expect("reuses hole");
        assert_eq!(small.y, 10);
        let rest = packer.allocate(20, 15).expect("remainder of hole");
        assert_eq!(rest.y, 15);
    }

    #[test]
    fn test_release_unknown_region() {
        let mut packer = ShelfPacker::new(16, 16, 0);
        let stray = PackedRect {
            x: 0,
            y: 3,
            width: 4,
            height: 4,
        };
        assert!(!packer.release(stray));
    }
}
