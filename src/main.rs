// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use autoresume::config::{Cli, Command, Configuration};
use autoresume::paths::StateDir;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    let state_dir = match &cli.state_dir {
        Some(dir) => StateDir::at(dir.clone()),
        None => match StateDir::resolve() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("error: {e:#}");
                std::process::exit(1);
            }
        },
    };

    let json = cli.log_format == "json";
    let max_log_size_mb = Configuration::load(&state_dir.config_file())
        .map(|c| c.max_log_size_mb)
        .unwrap_or_default();

    let code = match cli.command {
        Command::Start { http } => {
            let _guard =
                autoresume::logging::init_file_logging(&state_dir, &cli.log_level, json, max_log_size_mb)
                    .unwrap_or_else(|e| {
                        eprintln!("error: failed to initialize logging: {e:#}");
                        std::process::exit(1);
                    });
            autoresume::cmd::start::run(state_dir, http).await
        }
        Command::Monitor { http } => {
            let _guard =
                autoresume::logging::init_file_logging(&state_dir, &cli.log_level, json, max_log_size_mb)
                    .unwrap_or_else(|e| {
                        eprintln!("error: failed to initialize logging: {e:#}");
                        std::process::exit(1);
                    });
            autoresume::cmd::start::run(state_dir, http).await
        }
        Command::Stop => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::stop::run(state_dir).await
        }
        Command::Status => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::status::run(state_dir)
        }
        Command::Restart => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::restart::run(state_dir).await
        }
        Command::Test { seconds } => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::test_cmd::run(state_dir, seconds).await
        }
        Command::Reset => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::reset::run(state_dir)
        }
        Command::Logs { lines } => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::logs::run(state_dir, lines)
        }
        Command::Config(sub) => {
            autoresume::logging::init_stdout_logging(&cli.log_level, json);
            autoresume::cmd::config_cmd::run(state_dir, sub)
        }
        Command::Hook => autoresume::cmd::hook::run(state_dir),
    };

    std::process::exit(code);
}
