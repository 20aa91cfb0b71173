/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use vacuum_planner::{OutputFormat, PlannerConfig, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Shortest plan.
    UniformCost,

    /// First plan found.
    DepthFirst,
}

impl From<Algorithm> for Strategy {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::UniformCost => Strategy::UniformCost,
            Algorithm::DepthFirst => Strategy::DepthFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Plan a vacuum cleaner's route through a grid world until every dirty cell is clean.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search algorithm
    #[arg(value_enum)]
    algorithm: Algorithm,

    /// World file: column count, row count, then rows of `_` `*` `#` `@`
    world_file: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Replay the plan against the world before printing it
    #[arg(long)]
    verify: bool,
}

impl From<Args> for PlannerConfig {
    fn from(args: Args) -> Self {
        let mut config = PlannerConfig::new(args.algorithm.into(), args.world_file);
        config.format = args.format.into();
        config.verify = args.verify;
        config
    }
}

// `RUST_LOG` (or whichever variable `env` names) overrides the default of warnings and errors.
fn logger(env: env_logger::Env) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or("warn"))
}

fn main() -> Result<()> {
    logger(env_logger::Env::default()).init();
    let args = Args::parse();
    log::debug!("{:?}", args);

    let config = PlannerConfig::from(args);
    let report = vacuum_planner::run(&config).with_context(|| {
        format!(
            "{} planning failed for {}",
            config.strategy,
            config.world_file.display()
        )
    })?;
    println!("{}", report);
    Ok(())
}
