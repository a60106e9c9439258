use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;

use dirmirror::config::{CliOverrides, Config};
use dirmirror::logging::{self, *};
use dirmirror::{Mirror, MirrorError, TracingReporter};

/// No pair could be started
const EXIT_NO_ACTIVE_PAIRS: u8 = 1;
/// Bad arguments or configuration
const EXIT_USAGE: u8 = 2;

fn cli() -> Command {
	Command::new("dirmirror")
		.version(env!("CARGO_PKG_VERSION"))
		.about("One-way live directory mirror")
		.arg(
			Arg::new("pairs")
				.value_name("SOURCE DESTINATION")
				.help("Directories to mirror, given as SOURCE DESTINATION pairs")
				.action(ArgAction::Append)
				.num_args(0..),
		)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.help("Config file (default: ./dirmirror.toml when present)"),
		)
		.arg(
			Arg::new("log-file")
				.long("log-file")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.help("Log file (default: directory_watcher.log)"),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.value_name("LEVEL")
				.help("trace, debug, info, warn or error"),
		)
		.arg(
			Arg::new("poll")
				.long("poll")
				.action(ArgAction::SetTrue)
				.help("Poll the source trees instead of using native notifications"),
		)
		.arg(
			Arg::new("poll-interval")
				.long("poll-interval")
				.value_name("MS")
				.value_parser(value_parser!(u64))
				.help("Polling interval in milliseconds"),
		)
		.arg(
			Arg::new("exclude")
				.long("exclude")
				.value_name("GLOB")
				.action(ArgAction::Append)
				.help("Never mirror entries matching GLOB (repeatable)"),
		)
		.arg(
			Arg::new("no-preserve-times")
				.long("no-preserve-times")
				.action(ArgAction::SetTrue)
				.help("Do not carry modification times over to copies"),
		)
}

fn overrides(matches: &ArgMatches) -> CliOverrides {
	let strings = |id: &str| -> Vec<String> {
		matches.get_many::<String>(id).map(|v| v.cloned().collect()).unwrap_or_default()
	};

	CliOverrides {
		pair_args: strings("pairs"),
		log_file: matches.get_one::<PathBuf>("log-file").cloned(),
		log_level: matches.get_one::<String>("log-level").cloned(),
		poll: matches.get_flag("poll"),
		poll_interval_ms: matches.get_one::<u64>("poll-interval").copied(),
		exclude: strings("exclude"),
		no_preserve_times: matches.get_flag("no-preserve-times"),
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	let matches = cli().get_matches();

	let config_path = matches.get_one::<PathBuf>("config");
	let config = match Config::resolve(config_path.map(|p| p.as_path()), overrides(&matches)) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("dirmirror: {}", e);
			return ExitCode::from(EXIT_USAGE);
		}
	};

	let _log_guard = match logging::init(&config.log_settings()) {
		Ok(guard) => guard,
		Err(e) => {
			eprintln!("dirmirror: {}", e);
			return ExitCode::from(EXIT_USAGE);
		}
	};

	let mirror = match Mirror::new(config, TracingReporter::shared()) {
		Ok(mirror) => mirror,
		Err(e) => {
			error!("{}", e);
			return ExitCode::from(EXIT_USAGE);
		}
	};

	match mirror.run().await {
		Ok(_) => ExitCode::SUCCESS,
		Err(e @ MirrorError::NoActivePairs) => {
			error!("{}, exiting", e);
			ExitCode::from(EXIT_NO_ACTIVE_PAIRS)
		}
		Err(e) => {
			error!("{}", e);
			ExitCode::from(EXIT_NO_ACTIVE_PAIRS)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cli_definition() {
		cli().debug_assert();
	}

	#[test]
	fn test_cli_overrides() {
		let matches = cli().get_matches_from([
			"dirmirror",
			"--poll",
			"--exclude",
			"*.tmp",
			"--exclude",
			"*.swp",
			"./in",
			"./out",
		]);
		let cli = overrides(&matches);
		assert!(cli.poll);
		assert_eq!(cli.pair_args, vec!["./in", "./out"]);
		assert_eq!(cli.exclude.len(), 2);
		assert!(cli.log_file.is_none());
	}
}

// vim: ts=4
