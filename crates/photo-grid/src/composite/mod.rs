//! Image compositing for grid cells
//!
//! Turns one source image and one cell rectangle into a raster ready for
//! placement:
//! - Format detection against a closed set of raster formats
//! - Aspect-preserving fit and centering
//! - Alpha flattening and output colour conversion

mod color;
mod compositor;
mod fit;
mod format;

pub use color::{CmykConverter, flatten_alpha};
pub(crate) use color::load_cmyk_profile;
pub use compositor::*;
pub use fit::*;
pub use format::*;
