use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shear_meter::logger;
use shear_meter::shear_pipeline::tiff_io::save_frame_tiff;
use shear_meter::shear_pipeline::{
    BitDepthScale, CentroidMode, MeterConfig, NonConvergencePolicy, Roi, ShearMeter,
    TiffCompression, TiffDarkFrameStore, TiffReplaySource,
};

use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Measure the shear between two spots in recorded camera frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reduce a burst to one dark-corrected frame
    Grab {
        #[command(flatten)]
        common: CommonArgs,

        /// Write the reduced frame as a 16-bit TIFF
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Compression::None)]
        compression: Compression,
    },
    /// Locate both spots and print the shear between them
    Shear {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Recorded raw frames, replayed in order as the camera
    #[arg(long, num_args = 1.., required = true)]
    frames: Vec<PathBuf>,

    /// Dark reference frame in the rescaled intensity scale
    #[arg(long)]
    dark: PathBuf,

    #[arg(long, default_value_t = 1.0)]
    exposure_ms: f64,

    #[arg(long, default_value_t = 30.0)]
    framerate_hz: f64,

    /// Frames averaged per measurement
    #[arg(long, default_value_t = 30)]
    burst_size: usize,

    /// First region as row_start:row_end,col_start:col_end
    #[arg(long, default_value = "0:500,0:500")]
    box_1: Roi,

    /// Second region as row_start:row_end,col_start:col_end
    #[arg(long, default_value = "600:1000,600:1000")]
    box_2: Roi,

    /// Nominal spot FWHM in pixels
    #[arg(long, default_value_t = 50.0)]
    spot_fwhm: f64,

    /// Convergence threshold in pixels
    #[arg(long, default_value_t = 0.01)]
    end_condition: f64,

    #[arg(long, default_value_t = 100)]
    max_iterations: usize,

    /// Significant bits of the raw samples
    #[arg(long, default_value_t = 10)]
    source_bits: u32,

    /// Bits of the dark frame representation
    #[arg(long, default_value_t = 16)]
    target_bits: u32,

    /// Use the plain center of mass instead of iterative reweighting
    #[arg(long)]
    plain_com: bool,

    /// Report the last estimate instead of failing when the centroid does not converge
    #[arg(long)]
    best_effort: bool,

    /// Evaluate both regions in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Compression {
    None,
    Lzw,
    Deflate,
}

impl From<Compression> for TiffCompression {
    fn from(c: Compression) -> Self {
        match c {
            Compression::None => TiffCompression::None,
            Compression::Lzw => TiffCompression::Lzw,
            Compression::Deflate => TiffCompression::Deflate,
        }
    }
}

impl CommonArgs {
    fn config(&self) -> MeterConfig {
        MeterConfig::builder()
            .box_1(self.box_1)
            .box_2(self.box_2)
            .spot_fwhm(self.spot_fwhm)
            .end_condition(self.end_condition)
            .max_iterations(self.max_iterations)
            .centroid_mode(if self.plain_com {
                CentroidMode::CenterOfMass
            } else {
                CentroidMode::IterativelyWeighted
            })
            .non_convergence(if self.best_effort {
                NonConvergencePolicy::BestEffort
            } else {
                NonConvergencePolicy::Fail
            })
            .parallel_regions(self.parallel)
            .bit_depth(BitDepthScale::new(self.source_bits, self.target_bits))
            .burst_size(self.burst_size)
            // recorded frames need no sensor settling time
            .warmup(Duration::ZERO)
            .build()
    }

    fn meter(&self) -> anyhow::Result<ShearMeter<TiffReplaySource>> {
        let source = TiffReplaySource::new(self.frames.clone());
        let store = TiffDarkFrameStore::new(&self.dark);
        ShearMeter::new(source, &store, self.config()).context("failed to set up shear meter")
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Grab {
            common,
            output,
            compression,
        } => {
            let meter = common.meter()?;
            let frame = meter
                .grab_frame(common.exposure_ms, common.framerate_hz)
                .context("frame capture failed")?;
            info!(rows = frame.nrows(), cols = frame.ncols(), "Reduced frame ready");

            if let Some(path) = output {
                save_frame_tiff(&path, &frame, compression.into())
                    .with_context(|| format!("failed to save {}", path.display()))?;
                info!(path = %path.display(), "Reduced frame written");
            }
        }
        Command::Shear { common } => {
            let meter = common.meter()?;
            let measurement = meter
                .measure(common.exposure_ms, common.framerate_hz)
                .context("shear measurement failed")?;

            println!(
                "box 1: ({:.3}, {:.3}) after {} iterations",
                measurement.box_1.centroid.x,
                measurement.box_1.centroid.y,
                measurement.box_1.iterations
            );
            println!(
                "box 2: ({:.3}, {:.3}) after {} iterations",
                measurement.box_2.centroid.x,
                measurement.box_2.centroid.y,
                measurement.box_2.iterations
            );
            println!("shear: dx = {:.3}, dy = {:.3}", measurement.shear.dx, measurement.shear.dy);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting shear_meter...");

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
