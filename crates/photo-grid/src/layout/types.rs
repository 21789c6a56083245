//! Layout data types
//!
//! These types represent the intermediate layout calculations between
//! configuration and PDF rendering. All coordinates are page points with
//! the origin at the top-left corner of the page and y growing downwards;
//! the PDF backend flips them into PDF user space.

/// A cell slot: page plus position within the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSlot {
    /// Output page index (0-based)
    pub page: usize,
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl CellSlot {
    pub fn new(page: usize, row: usize, col: usize) -> Self {
        Self { page, row, col }
    }
}

/// One image mapped to one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAssignment {
    /// Index into the caller's image list
    pub image_index: usize,
    pub slot: CellSlot,
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge, measured down from the top of the page)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Orientation of a grid line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDirection {
    Horizontal,
    Vertical,
}

/// A straight grid-line segment in page points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub direction: LineDirection,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Geometry of one grid page
///
/// Identical for every page of a run; computed once from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    /// Page width in points
    pub page_width: f32,
    /// Page height in points
    pub page_height: f32,
    /// Area inside the page margins
    pub usable: Rect,
    pub rows: usize,
    pub cols: usize,
    /// Cell rectangles in row-major order
    pub cells: Vec<Rect>,
    /// Grid-line segments; empty when grid lines are hidden
    pub lines: Vec<LineSegment>,
}

impl PageGeometry {
    /// Cell rectangle at (row, col)
    pub fn cell(&self, row: usize, col: usize) -> Option<&Rect> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Total extent of all cells
    pub fn grid_bounds(&self) -> Rect {
        let right = self
            .cells
            .iter()
            .map(|c| c.right())
            .fold(self.usable.x, f32::max);
        let bottom = self
            .cells
            .iter()
            .map(|c| c.bottom())
            .fold(self.usable.y, f32::max);
        Rect::new(
            self.usable.x,
            self.usable.y,
            right - self.usable.x,
            bottom - self.usable.y,
        )
    }

    /// Whether any cell runs past the usable area
    pub fn overflows(&self) -> bool {
        use crate::constants::OVERFLOW_TOLERANCE_PT;

        let bounds = self.grid_bounds();
        bounds.right() > self.usable.right() + OVERFLOW_TOLERANCE_PT
            || bounds.bottom() > self.usable.bottom() + OVERFLOW_TOLERANCE_PT
    }
}
