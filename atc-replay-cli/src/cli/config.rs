//! Runtime configuration resolved from arguments and the environment.

use std::path::PathBuf;
use std::time::Duration;

use atc_replay_lib::PlaybackSettings;
use clap::ArgMatches;

pub const LOG_DIR_ENV: &str = "ATC_REPLAY_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_dir: PathBuf,
    pub playback: PlaybackSettings,
    pub quiet: bool,
}

impl CliConfig {
    /// Resolve configuration, preferring flags over the environment over
    /// defaults. `.env` files are loaded by `main` beforehand.
    pub fn from_args(args: &ArgMatches) -> Self {
        let log_dir = args
            .get_one::<String>("log-dir")
            .cloned()
            .or_else(|| std::env::var(LOG_DIR_ENV).ok())
            .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());

        let mut playback = PlaybackSettings::default();
        if let Some(speed) = args.get_one::<f64>("speed") {
            playback = playback.with_initial_speed(*speed);
        }
        if let Some(step) = args.get_one::<f64>("seek-step") {
            playback = playback.with_seek_step(*step);
        }
        if let Some(frame_ms) = args.get_one::<u64>("frame-ms") {
            playback = playback.with_frame_interval(Duration::from_millis((*frame_ms).max(1)));
        }

        Self {
            log_dir: PathBuf::from(log_dir),
            playback,
            quiet: args.get_flag("quiet"),
        }
    }
}
