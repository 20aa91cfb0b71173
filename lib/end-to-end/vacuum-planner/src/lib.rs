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

use log::{debug, info};
use serde::Serialize;
use uninformed_search::Problem;
use vacuum_world_logic::{ReplayError, State, WorldError};

pub use uninformed_search::Strategy;
pub use vacuum_world_logic::{Action, World};

struct VacuumProblem<'a> {
    world: &'a World,
}

impl Problem for VacuumProblem<'_> {
    type State = State;
    type Action = Action;

    fn initial_state(&self) -> State {
        self.world.initial_state.clone()
    }

    fn successors(&self, state: &State) -> Vec<(Action, State)> {
        self.world.successors(state)
    }

    fn is_goal(&self, state: &State) -> bool {
        state.is_terminal()
    }
}

/// A plan and the search effort it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub strategy: Strategy,
    pub actions: Vec<Action>,
    pub generated: usize,
    pub expanded: usize,
    pub solved: bool,
}

impl Plan {
    /// One action token per line, then the two counters. The counter lines keep two spaces after
    /// the colon, as existing planner output does.
    pub fn to_text(&self) -> String {
        let mut s = String::new();
        for action in &self.actions {
            s.push(action.token());
            s.push('\n');
        }
        s.push_str(&format!("Nodes Generated:  {}\n", self.generated));
        s.push_str(&format!("Nodes Expanded:  {}", self.expanded));
        s
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, PlannerError> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => Ok(self.to_json()?),
        }
    }
}

/// Search a world for a plan that cleans every dirty cell.
///
/// An unreachable dirty cell is not an error: the plan comes back unsolved with no actions.
pub fn plan(world: &World, strategy: Strategy) -> Plan {
    let problem = VacuumProblem { world };
    let outcome = strategy.search(&problem);
    info!(
        "{} search: {} actions, generated={}, expanded={}, solved={}",
        strategy,
        outcome.actions.len(),
        outcome.generated,
        outcome.expanded,
        outcome.solved
    );
    Plan {
        strategy,
        actions: outcome.actions,
        generated: outcome.generated,
        expanded: outcome.expanded,
        solved: outcome.solved,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error("plan failed verification: {0}")]
    Replay(#[from] ReplayError),

    #[error("failed to render plan as JSON: {0}")]
    Render(#[from] serde_json::Error),
}

pub struct PlannerConfig {
    pub strategy: Strategy,
    pub world_file: PathBuf,
    pub format: OutputFormat,

    /// Replay the plan against the world before reporting it.
    pub verify: bool,
}

impl PlannerConfig {
    pub fn new(strategy: Strategy, world_file: impl Into<PathBuf>) -> Self {
        Self {
            strategy,
            world_file: world_file.into(),
            format: OutputFormat::default(),
            verify: false,
        }
    }
}

/// Load the world file, plan, optionally verify, and render the report.
pub fn run(config: &PlannerConfig) -> Result<String, PlannerError> {
    let world = vacuum_world_logic::load_world(&config.world_file)?;
    debug!("world:\n{}", world.grid);

    let plan = plan(&world, config.strategy);

    // an unsolved plan has nothing to replay
    if config.verify && plan.solved {
        vacuum_world_logic::verify_plan(&world, &plan.actions)?;
        debug!("plan verified");
    }

    plan.render(config.format)
}
