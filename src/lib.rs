pub mod logger;
pub mod shear_pipeline;
