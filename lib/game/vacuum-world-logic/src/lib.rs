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

#![warn(missing_docs)]

//! Vacuum World logic.
//!
//! A single agent on a rectangular grid of clear, dirty and blocked cells. The agent moves North,
//! South, East or West, or vacuums the cell it stands on. This crate holds the grid, the search
//! state, the successor rule, the world-file loader and plan replay. It knows nothing about how a
//! plan is searched for.

use std::collections::BTreeSet;
use std::path::PathBuf;

pub mod replay;
pub mod world_file;

pub use replay::{replay, verify_plan, ReplayError};
pub use world_file::{decode_world, load_world, parse_world};

/// Cells the agent may never occupy.
pub type BlockedCells = rustc_hash::FxHashSet<Location>;

/// Vacuum World error. Everything that can go wrong building a World.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The world file could not be read.
    #[error("failed to read world file {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The world file is neither UTF-8 nor UTF-16.
    #[error("world file is not valid UTF-8 or UTF-16: {0}")]
    InvalidEncoding(String),

    /// A header line is missing.
    #[error("world file is missing the {0} line")]
    MissingHeader(&'static str),

    /// A header line is not a positive integer.
    #[error("invalid {name}: {value:?}")]
    InvalidDimension {
        /// Which header.
        name: &'static str,
        /// The text found.
        value: String,
    },

    /// Number of grid rows differs from the header.
    #[error("expected {expected} rows, found {actual}")]
    RowCountMismatch {
        /// Rows declared in the header.
        expected: usize,
        /// Rows found.
        actual: usize,
    },

    /// A grid row is the wrong length.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowLengthMismatch {
        /// Row index.
        row: usize,
        /// Columns declared in the header.
        expected: usize,
        /// Cells found.
        actual: usize,
    },

    /// A character that is not one of `_`, `*`, `#`, `@`.
    #[error("unknown cell {found:?} at row {row}, column {col}")]
    UnknownCell {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The character found.
        found: char,
    },

    /// Cell count is not rows * cols, or a dimension does not fit a coordinate.
    #[error("a {rows}x{cols} grid cannot hold {actual} cells")]
    GridSizeMismatch {
        /// Rows.
        rows: usize,
        /// Columns.
        cols: usize,
        /// Cells supplied.
        actual: usize,
    },

    /// No `@` cell.
    #[error("world has no start cell")]
    MissingStart,

    /// More than one `@` cell.
    #[error("world has more than one start cell: {first} and {second}")]
    MultipleStarts {
        /// First start found, in row-major order.
        first: Location,
        /// Second start found.
        second: Location,
    },

    /// The agent's position is outside the grid or on a blocked cell.
    #[error("agent cannot stand at {0}")]
    StartNotPassable(Location),
}

/// A grid coordinate. Signed so that a move off the edge produces a location the bounds check
/// rejects rather than an overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// Row, 0 at the top.
    pub row: i32,

    /// Column, 0 at the left.
    pub col: i32,
}

impl Location {
    /// Create a new location.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The location one step along `(row, col)` offset.
    pub fn offset(self, (d_row, d_col): (i32, i32)) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An agent action. Every action costs 1, including vacuuming a clean cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Move one row up.
    North,

    /// Move one row down.
    South,

    /// Move one column right.
    East,

    /// Move one column left.
    West,

    /// Clean the current cell.
    Vacuum,
}

impl Action {
    /// Successor generation order.
    pub const ALL: [Action; 5] = [
        Action::North,
        Action::South,
        Action::East,
        Action::West,
        Action::Vacuum,
    ];

    /// (row, col) offset of a move. None for Vacuum, which does not move.
    pub const fn offset(self) -> Option<(i32, i32)> {
        match self {
            Action::North => Some((-1, 0)),
            Action::South => Some((1, 0)),
            Action::East => Some((0, 1)),
            Action::West => Some((0, -1)),
            Action::Vacuum => None,
        }
    }

    /// Single character token.
    pub const fn token(self) -> char {
        match self {
            Action::North => 'N',
            Action::South => 'S',
            Action::East => 'E',
            Action::West => 'W',
            Action::Vacuum => 'V',
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A character that is not an action token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown action token: {0:?}")]
pub struct ParseActionError(pub char);

impl TryFrom<char> for Action {
    type Error = ParseActionError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Action::ALL
            .into_iter()
            .find(|action| action.token() == c)
            .ok_or(ParseActionError(c))
    }
}

impl serde::Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_char(self.token())
    }
}

/// What a grid cell holds when the world is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Passable and clean.
    Clear,

    /// Passable and needs vacuuming.
    Dirty,

    /// Never passable.
    Blocked,

    /// Where the agent starts. Passable and clean.
    Start,
}

impl CellKind {
    /// World-file character.
    pub const fn symbol(self) -> char {
        match self {
            CellKind::Clear => '_',
            CellKind::Dirty => '*',
            CellKind::Blocked => '#',
            CellKind::Start => '@',
        }
    }
}

impl TryFrom<char> for CellKind {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '_' => Ok(CellKind::Clear),
            '*' => Ok(CellKind::Dirty),
            '#' => Ok(CellKind::Blocked),
            '@' => Ok(CellKind::Start),
            other => Err(other),
        }
    }
}

/// Immutable rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Create a grid from row-major cells.
    pub fn new(rows: usize, cols: usize, cells: Vec<CellKind>) -> Result<Self, WorldError> {
        let fits_coordinates = i32::try_from(rows).is_ok() && i32::try_from(cols).is_ok();
        if !fits_coordinates || rows.checked_mul(cols) != Some(cells.len()) {
            return Err(WorldError::GridSizeMismatch {
                rows,
                cols,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, location: Location) -> Option<usize> {
        let row = usize::try_from(location.row).ok()?;
        let col = usize::try_from(location.col).ok()?;
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    /// Cell at a location, or None when out of bounds.
    pub fn get(&self, location: Location) -> Option<CellKind> {
        self.index(location).map(|i| self.cells[i])
    }

    /// Whether a location is inside the grid.
    pub fn contains(&self, location: Location) -> bool {
        self.index(location).is_some()
    }

    /// Whether a location holds a blocked cell.
    pub fn is_blocked(&self, location: Location) -> bool {
        self.get(location) == Some(CellKind::Blocked)
    }

    /// Every (location, cell) in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Location, CellKind)> + '_ {
        self.cells.iter().enumerate().map(|(i, cell)| {
            let location = Location::new((i / self.cols) as i32, (i % self.cols) as i32);
            (location, *cell)
        })
    }

    fn locations_of(&self, kind: CellKind) -> impl Iterator<Item = Location> + '_ {
        self.cells()
            .filter(move |(_, cell)| *cell == kind)
            .map(|(location, _)| location)
    }

    /// Cells that start dirty.
    pub fn dirty_cells(&self) -> BTreeSet<Location> {
        self.locations_of(CellKind::Dirty).collect()
    }

    /// Cells the agent may never occupy.
    pub fn blocked_cells(&self) -> BlockedCells {
        self.locations_of(CellKind::Blocked).collect()
    }

    /// The single start cell.
    pub fn start(&self) -> Result<Location, WorldError> {
        let mut starts = self.locations_of(CellKind::Start);
        let first = starts.next().ok_or(WorldError::MissingStart)?;
        match starts.next() {
            Some(second) => Err(WorldError::MultipleStarts { first, second }),
            None => Ok(first),
        }
    }
}

// print the grid with world-file characters, one row per line.
impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.cells.chunks(self.cols.max(1)).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Search state: where the agent is and which cells are still dirty.
///
/// The dirty cells are kept in an ordered set, so equality and hashing depend only on which cells
/// are dirty and never on the order they were added or removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    position: Location,
    dirty_cells: BTreeSet<Location>,
}

impl State {
    /// Create a new state.
    pub fn new(position: Location, dirty_cells: impl IntoIterator<Item = Location>) -> Self {
        Self {
            position,
            dirty_cells: dirty_cells.into_iter().collect(),
        }
    }

    /// The agent's position.
    pub fn position(&self) -> Location {
        self.position
    }

    /// Cells still dirty.
    pub fn dirty_cells(&self) -> &BTreeSet<Location> {
        &self.dirty_cells
    }

    /// Whether every cell is clean.
    pub fn is_terminal(&self) -> bool {
        self.dirty_cells.is_empty()
    }
}

/// The state after taking one action, or None when the action is illegal.
///
/// A move is legal when its target is inside the grid and not blocked. Vacuum is always legal; on a
/// clean cell it returns an identical state.
pub fn apply(state: &State, action: Action, grid: &Grid, blocked: &BlockedCells) -> Option<State> {
    match action.offset() {
        Some(offset) => {
            let target = state.position.offset(offset);
            if !grid.contains(target) || blocked.contains(&target) {
                return None;
            }
            Some(State {
                position: target,
                dirty_cells: state.dirty_cells.clone(),
            })
        }
        None => {
            let mut dirty_cells = state.dirty_cells.clone();
            dirty_cells.remove(&state.position);
            Some(State {
                position: state.position,
                dirty_cells,
            })
        }
    }
}

/// All legal (action, next state) pairs, in [`Action::ALL`] order.
pub fn successors(state: &State, grid: &Grid, blocked: &BlockedCells) -> Vec<(Action, State)> {
    Action::ALL
        .into_iter()
        .filter_map(|action| apply(state, action, grid, blocked).map(|next| (action, next)))
        .collect()
}

/// A loaded world: the grid, where the agent starts, and the cells it can never enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    /// The grid.
    pub grid: Grid,

    /// Agent at the start cell, every dirty cell still dirty.
    pub initial_state: State,

    /// Blocked cells of the grid.
    pub blocked: BlockedCells,
}

impl World {
    /// Build the world described by a grid with exactly one start cell.
    pub fn from_grid(grid: Grid) -> Result<Self, WorldError> {
        let start = grid.start()?;
        let initial_state = State::new(start, grid.dirty_cells());
        Self::with_initial_state(grid, initial_state)
    }

    /// Build a world with an explicit initial state, e.g. an agent that starts on a dirty cell.
    pub fn with_initial_state(grid: Grid, initial_state: State) -> Result<Self, WorldError> {
        let position = initial_state.position();
        if !grid.contains(position) || grid.is_blocked(position) {
            return Err(WorldError::StartNotPassable(position));
        }
        let blocked = grid.blocked_cells();
        Ok(Self {
            grid,
            initial_state,
            blocked,
        })
    }

    /// Legal successors of a state in this world.
    pub fn successors(&self, state: &State) -> Vec<(Action, State)> {
        successors(state, &self.grid, &self.blocked)
    }

    /// The state after one action, or None when it is illegal here.
    pub fn apply(&self, state: &State, action: Action) -> Option<State> {
        apply(state, action, &self.grid, &self.blocked)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use proptest::prelude::*;

    use super::*;

    fn hash_of(state: &State) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    fn world(text: &str) -> World {
        parse_world(text).expect("world should parse")
    }

    #[test]
    fn test_state_equality_ignores_dirty_cell_order() {
        let a = Location::new(0, 2);
        let b = Location::new(1, 0);
        let c = Location::new(3, 3);
        let s1 = State::new(Location::new(0, 0), [a, b, c]);
        let s2 = State::new(Location::new(0, 0), [c, a, b]);
        assert_eq!(s1, s2);
        assert_eq!(hash_of(&s1), hash_of(&s2));
    }

    #[test]
    fn test_states_differ_by_position_or_dirt() {
        let dirt = [Location::new(0, 1)];
        let s1 = State::new(Location::new(0, 0), dirt);
        let s2 = State::new(Location::new(0, 1), dirt);
        let s3 = State::new(Location::new(0, 0), []);
        assert_ne!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn test_successors_in_fixed_order_on_open_grid() {
        let world = world("3\n3\n___\n_@_\n___\n");
        let actions: Vec<Action> = world
            .successors(&world.initial_state)
            .into_iter()
            .map(|(action, _)| action)
            .collect();
        assert_eq!(actions, Action::ALL.to_vec());
    }

    #[test]
    fn test_successors_skip_blocked_and_out_of_bounds() {
        let world = world("2\n2\n@#\n*_\n");
        let successors = world.successors(&world.initial_state);
        let actions: Vec<Action> = successors.iter().map(|(action, _)| *action).collect();
        assert_eq!(actions, vec![Action::South, Action::Vacuum]);
        assert_eq!(successors[0].1.position(), Location::new(1, 0));
    }

    #[test]
    fn test_vacuum_on_dirty_cell_removes_it() {
        let world = world("2\n1\n@*\n");
        let on_dirt = State::new(Location::new(0, 1), [Location::new(0, 1)]);
        let next = world.apply(&on_dirt, Action::Vacuum).expect("vacuum is legal");
        assert_eq!(next.position(), Location::new(0, 1));
        assert!(next.is_terminal());
    }

    #[test]
    fn test_vacuum_on_clean_cell_is_a_legal_noop() {
        let world = world("2\n1\n@*\n");
        let next = world
            .apply(&world.initial_state, Action::Vacuum)
            .expect("vacuum is legal");
        assert_eq!(next, world.initial_state);
        assert_eq!(next.dirty_cells().len(), 1);
    }

    #[test]
    fn test_moves_keep_dirty_cells() {
        let world = world("2\n1\n@*\n");
        let next = world
            .apply(&world.initial_state, Action::East)
            .expect("east is open");
        assert_eq!(next.dirty_cells(), world.initial_state.dirty_cells());
        assert_eq!(world.apply(&world.initial_state, Action::West), None);
    }

    #[test]
    fn test_action_tokens() {
        let tokens: String = Action::ALL.iter().map(|a| a.token()).collect();
        assert_eq!(tokens, "NSEWV");
        for action in Action::ALL {
            assert_eq!(Action::try_from(action.token()), Ok(action));
        }
        assert_eq!(Action::try_from('X'), Err(ParseActionError('X')));
    }

    #[test]
    fn test_grid_display_uses_world_file_symbols() {
        let world = world("3\n2\n@#*\n__*\n");
        assert_eq!(world.grid.to_string(), "@#*\n__*");
    }

    #[test]
    fn test_grid_size_must_match_cells() {
        let result = Grid::new(2, 2, vec![CellKind::Clear; 3]);
        assert!(matches!(
            result,
            Err(WorldError::GridSizeMismatch {
                rows: 2,
                cols: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_grid_dimensions_that_overflow_are_rejected() {
        let result = Grid::new(usize::MAX, 2, vec![CellKind::Start]);
        assert!(matches!(
            result,
            Err(WorldError::GridSizeMismatch {
                rows: usize::MAX,
                cols: 2,
                actual: 1
            })
        ));
        let err = Grid::new(1, usize::MAX, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("cannot hold 0 cells"));
    }

    #[test]
    fn test_agent_cannot_start_on_blocked_cell() {
        let grid = Grid::new(1, 2, vec![CellKind::Start, CellKind::Blocked]).unwrap();
        let result = World::with_initial_state(grid, State::new(Location::new(0, 1), []));
        assert!(matches!(result, Err(WorldError::StartNotPassable(_))));
    }

    fn cell_kind() -> impl Strategy<Value = CellKind> {
        prop_oneof![
            Just(CellKind::Clear),
            Just(CellKind::Dirty),
            Just(CellKind::Blocked),
        ]
    }

    fn small_world() -> impl Strategy<Value = World> {
        (1..4usize, 1..4usize)
            .prop_flat_map(|(rows, cols)| {
                (
                    Just(rows),
                    Just(cols),
                    prop::collection::vec(cell_kind(), rows * cols),
                    0..rows * cols,
                )
            })
            .prop_map(|(rows, cols, mut cells, start)| {
                cells[start] = CellKind::Start;
                World::from_grid(Grid::new(rows, cols, cells).unwrap()).unwrap()
            })
    }

    proptest! {
        #[test]
        fn test_state_hash_is_insertion_order_independent(
            cells in prop::collection::vec((0..6i32, 0..6i32), 0..12),
        ) {
            let forward: Vec<Location> = cells.iter().map(|&(r, c)| Location::new(r, c)).collect();
            let backward: Vec<Location> = forward.iter().rev().copied().collect();
            let s1 = State::new(Location::new(0, 0), forward);
            let s2 = State::new(Location::new(0, 0), backward);
            prop_assert_eq!(&s1, &s2);
            prop_assert_eq!(hash_of(&s1), hash_of(&s2));
        }

        #[test]
        fn test_no_successor_lands_on_blocked_or_outside(world in small_world()) {
            let mut frontier = vec![world.initial_state.clone()];
            let mut seen = std::collections::HashSet::new();
            while let Some(state) = frontier.pop() {
                if !seen.insert(state.clone()) {
                    continue;
                }
                for (_, next) in world.successors(&state) {
                    prop_assert!(world.grid.contains(next.position()));
                    prop_assert!(!world.grid.is_blocked(next.position()));
                    prop_assert!(next.dirty_cells().is_subset(state.dirty_cells()));
                    frontier.push(next);
                }
            }
        }
    }
}
