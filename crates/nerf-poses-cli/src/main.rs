use argh::FromArgs;
use std::path::PathBuf;

use nerf_poses::{records, Reconstruction};

mod colmap;
mod config;

use colmap::ColmapRunner;
use config::Config;

#[derive(FromArgs)]
/// Export the camera poses and near/far bounds of a COLMAP reconstruction to CSV
struct Args {
    /// path to a JSON config file
    #[argh(option)]
    config: Option<PathBuf>,

    /// root directory of the scene, overrides the config file
    #[argh(option)]
    basedir: Option<PathBuf>,

    /// path of the output CSV, overrides the config file
    #[argh(option)]
    output: Option<PathBuf>,

    /// read the existing sparse model without running COLMAP
    #[argh(switch)]
    skip_colmap: bool,

    /// the COLMAP executable
    #[argh(option, default = "PathBuf::from(\"colmap\")")]
    colmap_bin: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(basedir) = args.basedir {
        config.basedir = basedir;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }
    config.skip_colmap |= args.skip_colmap;

    // validate the options before spending time in COLMAP
    let options = config.extract_options()?;

    if config.skip_colmap {
        log::info!("skipping COLMAP, reading {}", config.model_path().display());
    } else {
        ColmapRunner::new(&args.colmap_bin, &config).run()?;
    }

    let reconstruction = Reconstruction::read(config.model_path())?;
    let records = nerf_poses::extract_pose_records(&reconstruction, &options)?;
    records::write_records_csv(&config.output_path, &records)?;

    Ok(())
}
