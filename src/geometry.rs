//! Rectangle model and subdivision geometry over the integer lattice.
//!
//! Child ordering is fixed as NW, NE, SW, SE throughout this crate; both the
//! builder (`crate::builder`) and the runtime traversal (`crate::runtime`)
//! call [`Rectangle::children`] so the two sides of the offline/online
//! boundary can never disagree about where a boundary index falls.

/// An axis-aligned integer box on the lattice, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Index of a child within its parent's fixed NW/NE/SW/SE ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildIndex {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ChildIndex {
    pub fn to_index(self) -> usize {
        match self {
            ChildIndex::Nw => 0,
            ChildIndex::Ne => 1,
            ChildIndex::Sw => 2,
            ChildIndex::Se => 3,
        }
    }

    pub const ALL: [ChildIndex; 4] = [
        ChildIndex::Nw,
        ChildIndex::Ne,
        ChildIndex::Sw,
        ChildIndex::Se,
    ];
}

impl Rectangle {
    pub fn root(x_max: u32, y_max: u32) -> Self {
        Rectangle {
            x0: 0,
            y0: 0,
            x1: x_max,
            y1: y_max,
        }
    }

    pub fn is_point(&self) -> bool {
        self.x0 == self.x1 && self.y0 == self.y1
    }

    fn is_width_degenerate(&self) -> bool {
        self.x0 == self.x1
    }

    fn is_height_degenerate(&self) -> bool {
        self.y0 == self.y1
    }

    /// Number of lattice points contained in this rectangle.
    pub fn point_count(&self) -> u64 {
        (self.x1 - self.x0 + 1) as u64 * (self.y1 - self.y0 + 1) as u64
    }

    /// Floor-divided midpoints, computed as `x0 + (x1 - x0) / 2` rather than
    /// `(x0 + x1) / 2` so the sum never overflows `u32` for wide rectangles
    /// near the top of the lattice (e.g. `x1` close to `Xmax` at high
    /// precision).
    fn midpoints(&self) -> (u32, u32) {
        debug_assert!(self.x1 >= self.x0 && self.y1 >= self.y0);
        let xm = self.x0 + (self.x1 - self.x0) / 2;
        let ym = self.y0 + (self.y1 - self.y0) / 2;
        (xm, ym)
    }

    /// The children of this rectangle in fixed NW, NE, SW, SE order,
    /// respecting the degenerate-axis suppression rule: a rectangle with
    /// zero width yields only NW/SW (sharing the full x range), one with
    /// zero height yields only SW/SE (sharing the full y range). Point
    /// rectangles have no children and this function must not be called on
    /// one (callers check [`Rectangle::is_point`] first).
    pub fn children(&self) -> Vec<(ChildIndex, Rectangle)> {
        debug_assert!(!self.is_point());
        let (xm, ym) = self.midpoints();

        let width_degenerate = self.is_width_degenerate();
        let height_degenerate = self.is_height_degenerate();

        let mut out = Vec::with_capacity(4);

        if width_degenerate {
            // Longitudinal split suppressed: only a N/S pair, sharing x0..=x1.
            out.push((
                ChildIndex::Nw,
                Rectangle {
                    x0: self.x0,
                    y0: ym + 1,
                    x1: self.x1,
                    y1: self.y1,
                },
            ));
            out.push((
                ChildIndex::Sw,
                Rectangle {
                    x0: self.x0,
                    y0: self.y0,
                    x1: self.x1,
                    y1: ym,
                },
            ));
            return out;
        }

        if height_degenerate {
            // Latitudinal split suppressed: only a W/E pair, sharing y0..=y1.
            out.push((
                ChildIndex::Sw,
                Rectangle {
                    x0: self.x0,
                    y0: self.y0,
                    x1: xm,
                    y1: self.y1,
                },
            ));
            out.push((
                ChildIndex::Se,
                Rectangle {
                    x0: xm + 1,
                    y0: self.y0,
                    x1: self.x1,
                    y1: self.y1,
                },
            ));
            return out;
        }

        out.push((
            ChildIndex::Nw,
            Rectangle {
                x0: self.x0,
                y0: ym + 1,
                x1: xm,
                y1: self.y1,
            },
        ));
        out.push((
            ChildIndex::Ne,
            Rectangle {
                x0: xm + 1,
                y0: ym + 1,
                x1: self.x1,
                y1: self.y1,
            },
        ));
        out.push((
            ChildIndex::Sw,
            Rectangle {
                x0: self.x0,
                y0: self.y0,
                x1: xm,
                y1: ym,
            },
        ));
        out.push((
            ChildIndex::Se,
            Rectangle {
                x0: xm + 1,
                y0: self.y0,
                x1: self.x1,
                y1: ym,
            },
        ));
        out
    }

    /// Which child rectangle would contain `(ilat, ilon)`, and that child's
    /// rectangle. Used by both the builder's debug verification and the
    /// runtime traversal (`crate::runtime`); tie rule: the west column owns
    /// `xm`, the south row owns `ym`.
    pub fn child_containing(&self, ilat: u32, ilon: u32) -> (ChildIndex, Rectangle) {
        debug_assert!(!self.is_point());
        let (xm, ym) = self.midpoints();
        let width_degenerate = self.is_width_degenerate();
        let height_degenerate = self.is_height_degenerate();

        if width_degenerate {
            let south = ilat <= ym;
            let idx = if south { ChildIndex::Sw } else { ChildIndex::Nw };
            let rect = if south {
                Rectangle { x0: self.x0, y0: self.y0, x1: self.x1, y1: ym }
            } else {
                Rectangle { x0: self.x0, y0: ym + 1, x1: self.x1, y1: self.y1 }
            };
            return (idx, rect);
        }
        if height_degenerate {
            let west = ilon <= xm;
            let idx = if west { ChildIndex::Sw } else { ChildIndex::Se };
            let rect = if west {
                Rectangle { x0: self.x0, y0: self.y0, x1: xm, y1: self.y1 }
            } else {
                Rectangle { x0: xm + 1, y0: self.y0, x1: self.x1, y1: self.y1 }
            };
            return (idx, rect);
        }

        let west = ilon <= xm;
        let south = ilat <= ym;
        let wanted = match (west, south) {
            (true, false) => ChildIndex::Nw,
            (false, false) => ChildIndex::Ne,
            (true, true) => ChildIndex::Sw,
            (false, true) => ChildIndex::Se,
        };
        let rect = match wanted {
            ChildIndex::Nw => Rectangle {
                x0: self.x0,
                y0: ym + 1,
                x1: xm,
                y1: self.y1,
            },
            ChildIndex::Ne => Rectangle {
                x0: xm + 1,
                y0: ym + 1,
                x1: self.x1,
                y1: self.y1,
            },
            ChildIndex::Sw => Rectangle {
                x0: self.x0,
                y0: self.y0,
                x1: xm,
                y1: ym,
            },
            ChildIndex::Se => Rectangle {
                x0: xm + 1,
                y0: self.y0,
                x1: self.x1,
                y1: ym,
            },
        };
        (wanted, rect)
    }
}
