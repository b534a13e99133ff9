//! Shear measurement pipeline
//!
//! A burst of raw frames is averaged and dark-corrected, two regions of
//! interest are cut out and background-subtracted, a sub-pixel centroid is
//! found in each and the difference of the two is the shear.

pub mod acquisition;
pub mod centroid;
pub mod common;
pub mod config;
pub mod measurement;
pub mod reduce;
pub mod reference;
pub mod region;
pub mod shear;
pub mod tiff_io;

#[cfg(test)]
pub(crate) mod test_utils;

pub use common::{
    Centroid,
    ErrorKind,
    Result,
    Roi,
    ShearError,
    ShearVector,
};

pub use acquisition::{
    AcquisitionSession,
    AcquisitionSettings,
    AcquisitionSource,
    GrabStrategy,
    TiffReplaySource,
    grab_burst,
};

pub use centroid::{
    CentroidConfig,
    CentroidEstimate,
    CentroidMode,
    NonConvergencePolicy,
    center_of_mass,
    estimate_centroid,
    iteratively_weighted_center_of_mass,
};

pub use config::{MeterConfig, MeterConfigBuilder, ShearConfig};
pub use measurement::{ShearMeasurement, ShearMeter};
pub use reduce::{BitDepthScale, FrameReducer};
pub use reference::{InMemoryDarkFrame, ReferenceFrameStore, TiffDarkFrameStore};
pub use region::{BackgroundPatch, background_level, extract_region};
pub use shear::{RegionCentroids, ShearCalculator};
pub use tiff_io::TiffCompression;
