//! Layout calculation modules
//!
//! This module handles all the geometric calculations for a grid page:
//! - Cell assignment (which image goes into which page/row/column)
//! - Page geometry (cell rectangles and grid-line segments)

mod assignment;
mod grid;
mod types;

pub use assignment::*;
pub use grid::*;
pub use types::*;
