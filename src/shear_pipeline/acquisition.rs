//! Frame acquisition collaborator
//!
//! The camera itself lives behind `AcquisitionSource`. The pipeline only opens
//! it for the duration of one burst and always closes it again.

mod session;
mod source;
mod tiff_replay;
pub mod types;

pub use session::{grab_burst, AcquisitionSession};
pub use source::AcquisitionSource;
pub use tiff_replay::TiffReplaySource;
pub use types::{AcquisitionSettings, GrabStrategy};
