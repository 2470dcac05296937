//! CLI argument definitions for `atc-replay-cli`.

use clap::{value_parser, Arg, ArgAction, Command};

fn input_arg(required: bool) -> Arg {
    Arg::new("INPUT")
        .help("Path to an events_*.jsonl file, or a session id inside the log directory")
        .required(required)
        .index(1)
}

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    // Build the CLI definition in one place to keep main.rs slim.
    Command::new("ATC Replay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Replay recorded AI air-traffic-control sessions")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .short('l')
                .value_name("DIR")
                .global(true)
                .help("Directory holding events_<session>.jsonl files [env: ATC_REPLAY_LOG_DIR]"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .value_name("MULTIPLIER")
                .value_parser(value_parser!(f64))
                .default_value("1.0")
                .global(true)
                .help("Initial playback speed (0.5-10)"),
        )
        .arg(
            Arg::new("seek-step")
                .long("seek-step")
                .value_name("SECONDS")
                .value_parser(value_parser!(f64))
                .default_value("5")
                .global(true)
                .help("Game seconds skipped by the arrow keys"),
        )
        .arg(
            Arg::new("frame-ms")
                .long("frame-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .default_value("16")
                .global(true)
                .help("Delay between playback ticks"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Play to the end without the terminal view"),
        )
        .arg(input_arg(false))
        .subcommand(
            Command::new("play")
                .about("Open the interactive replay view")
                .arg(input_arg(true)),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the interpolated aircraft state at a game time")
                .arg(input_arg(true))
                .arg(
                    Arg::new("at")
                        .long("at")
                        .short('t')
                        .value_name("TIME")
                        .value_parser(value_parser!(f64))
                        .default_value("0")
                        .help("Game time in seconds"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON instead of a table"),
                ),
        )
        .subcommand(
            Command::new("markers")
                .about("Print the session's timeline markers")
                .arg(input_arg(true)),
        )
        .subcommand(
            Command::new("summary")
                .about("Print session metadata and final metrics")
                .arg(input_arg(true))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON instead of text"),
                ),
        )
        .subcommand(
            Command::new("sessions")
                .about("List recorded sessions in the log directory")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON instead of a table"),
                ),
        )
}
