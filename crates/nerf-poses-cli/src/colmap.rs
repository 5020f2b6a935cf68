use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::PathBuf,
    process::{Command, ExitStatus},
};

use crate::config::Config;

/// Error types for running COLMAP.
#[derive(Debug, thiserror::Error)]
pub enum ColmapRunError {
    /// The COLMAP executable could not be started
    #[error("failed to start {step}")]
    Spawn {
        /// the COLMAP command
        step: &'static str,
        /// the underlying error
        #[source]
        source: std::io::Error,
    },

    /// A COLMAP command exited with an error
    #[error("{step} failed with {status}: {stderr}")]
    Failed {
        /// the COLMAP command
        step: &'static str,
        /// exit status of the process
        status: ExitStatus,
        /// captured standard error
        stderr: String,
    },

    /// Error creating the output folders or the log file
    #[error("error reading or writing file")]
    Io(#[from] std::io::Error),
}

/// Runs the COLMAP sparse reconstruction: feature extraction, exhaustive
/// matching and mapping.
#[derive(Debug, Clone)]
pub struct ColmapRunner {
    binary: PathBuf,
    database_path: PathBuf,
    image_path: PathBuf,
    sparse_path: PathBuf,
    log_file_path: PathBuf,
    feature_extractor: BTreeMap<String, String>,
    mapper: BTreeMap<String, String>,
}

impl ColmapRunner {
    /// Create a runner from the configuration of a run.
    pub fn new(binary: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            binary: binary.into(),
            database_path: config.database_path(),
            image_path: config.image_path(),
            sparse_path: config.sparse_path(),
            log_file_path: config.log_file_path(),
            feature_extractor: config.feature_extractor.clone(),
            mapper: config.mapper.clone(),
        }
    }

    /// The steps of the reconstruction with their arguments, in execution order.
    pub fn steps(&self) -> Vec<(&'static str, Vec<OsString>)> {
        let base: [OsString; 4] = [
            "--database_path".into(),
            self.database_path.clone().into(),
            "--image_path".into(),
            self.image_path.clone().into(),
        ];
        let feature_extractor = base
            .into_iter()
            .chain(extra_args(&self.feature_extractor))
            .collect();

        let exhaustive_matcher: Vec<OsString> = vec![
            "--database_path".into(),
            self.database_path.clone().into(),
        ];

        let base: [OsString; 6] = [
            "--database_path".into(),
            self.database_path.clone().into(),
            "--image_path".into(),
            self.image_path.clone().into(),
            "--output_path".into(),
            self.sparse_path.clone().into(),
        ];
        let mapper = base.into_iter().chain(extra_args(&self.mapper)).collect();

        vec![
            ("feature_extractor", feature_extractor),
            ("exhaustive_matcher", exhaustive_matcher),
            ("mapper", mapper),
        ]
    }

    /// Run all the steps and write the output of the feature extractor and
    /// the mapper to the log file.
    pub fn run(&self) -> Result<(), ColmapRunError> {
        std::fs::create_dir_all(&self.sparse_path)?;

        let mut log_text = String::new();
        for (step, args) in self.steps() {
            log::info!("running colmap {}", step);
            let now = std::time::Instant::now();

            let output = Command::new(&self.binary)
                .arg(step)
                .args(&args)
                .output()
                .map_err(|source| ColmapRunError::Spawn { step, source })?;

            if !output.status.success() {
                return Err(ColmapRunError::Failed {
                    step,
                    status: output.status,
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                });
            }

            if step != "exhaustive_matcher" {
                log_text.push_str(&String::from_utf8_lossy(&output.stdout));
            }
            log::info!("colmap {} finished in {:?}", step, now.elapsed());
        }

        std::fs::write(&self.log_file_path, log_text)?;
        log::info!("colmap output written to {}", self.log_file_path.display());

        Ok(())
    }
}

fn extra_args(args: &BTreeMap<String, String>) -> impl Iterator<Item = OsString> + '_ {
    args.iter()
        .flat_map(|(key, value)| [OsString::from(format!("--{key}")), OsString::from(value)])
}
