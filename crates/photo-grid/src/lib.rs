pub mod composite;
pub mod constants;
mod flow;
pub mod layout;
mod options;
pub mod render;
mod scratch;
mod stats;
mod types;

pub use composite::{ImageCompositor, ImageSource, PlacedImage, RasterFormat, is_supported_path};
pub use flow::{FlowObserver, NoopObserver, render};
pub use layout::{PageGeometry, assign_cells, compute_layout, page_count};
pub use options::*;
pub use render::{DocumentWriter, PdfDocumentWriter};
pub use scratch::ScratchSpace;
pub use stats::calculate_statistics;
pub use types::*;
