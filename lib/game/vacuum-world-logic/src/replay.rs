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

//! Execute a plan against a world, one action at a time, with the same rules successors use.

use crate::{Action, Location, State, World};

/// Plan replay error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// An action moves into a wall or off the grid.
    #[error("step {step}: {action} is illegal from {from}")]
    IllegalMove {
        /// Zero-based index of the action in the plan.
        step: usize,
        /// The action.
        action: Action,
        /// Agent position before the action.
        from: Location,
    },

    /// The plan ends with cells still dirty.
    #[error("plan leaves {remaining} dirty cells")]
    DirtyCellsRemain {
        /// Number of dirty cells left.
        remaining: usize,
    },
}

/// Run the actions from the world's initial state and return the final state.
pub fn replay(world: &World, actions: &[Action]) -> Result<State, ReplayError> {
    let mut state = world.initial_state.clone();
    for (step, &action) in actions.iter().enumerate() {
        state = world
            .apply(&state, action)
            .ok_or(ReplayError::IllegalMove {
                step,
                action,
                from: state.position(),
            })?;
    }
    Ok(state)
}

/// Replay a plan and check that it leaves every cell clean.
pub fn verify_plan(world: &World, actions: &[Action]) -> Result<State, ReplayError> {
    let state = replay(world, actions)?;
    if !state.is_terminal() {
        return Err(ReplayError::DirtyCellsRemain {
            remaining: state.dirty_cells().len(),
        });
    }
    Ok(state)
}
