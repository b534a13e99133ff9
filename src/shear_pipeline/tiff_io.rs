//! TIFF reading and writing
//!
//! Grayscale TIFF files carry dark reference frames, replayed captures and
//! exported reduced frames.

mod reader;
mod writer;
pub mod types;

pub use reader::{load_gray_tiff, load_gray_tiff_u16, read_gray_tiff, read_gray_tiff_u16};
pub use types::TiffCompression;
pub use writer::{save_frame_tiff, write_frame_tiff};
