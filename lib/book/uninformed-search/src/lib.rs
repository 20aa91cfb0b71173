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

//! Uninformed graph search.
//!
//! Depth-first and uniform-cost search over any [`Problem`], with a visited set of already
//! expanded states and the generated/expanded node counts the searches report.
//!
//! See:
//! -  Chapter 3: Solving Problems by Searching, section 3.4 Uninformed Search Strategies.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, trace};
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

/// Set of states already expanded by a search.
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// Search error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The strategy name is not one of `depth-first` or `uniform-cost`.
    #[error("unknown search strategy: {0:?}, expected depth-first or uniform-cost")]
    UnknownStrategy(String),
}

/// A search Problem. Every action costs exactly 1.
///
/// The order of [`Problem::successors`] matters: depth-first search explores siblings in the
/// reverse of this order, and uniform-cost search breaks cost ties in this order. Implementations
/// must return successors in a fixed order for results to be reproducible.
pub trait Problem {
    /// A snapshot of the world. Two states that describe the same situation must compare equal
    /// and hash identically, or the visited set will miss cycles.
    type State: Clone + Eq + Hash + Debug;

    /// An action taking one state to the next.
    type Action: Copy + Eq + Debug;

    /// The state the search starts from.
    fn initial_state(&self) -> Self::State;

    /// All legal (action, next state) pairs from a state.
    fn successors(&self, state: &Self::State) -> Vec<(Self::Action, Self::State)>;

    /// Whether a state satisfies the goal.
    fn is_goal(&self, state: &Self::State) -> bool;
}

/// Result of a search.
///
/// An exhausted search is not an error: `solved` is false and `actions` is empty. A solved search
/// can also have empty `actions` when the initial state already satisfies the goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<A> {
    /// Actions from the initial state to a goal state.
    pub actions: Vec<A>,

    /// Number of states pushed onto the frontier, counting the initial state.
    pub generated: usize,

    /// Number of distinct states popped from the frontier and processed.
    pub expanded: usize,

    /// Whether a goal state was reached.
    pub solved: bool,
}

impl<A> SearchOutcome<A> {
    fn solved(actions: Vec<A>, generated: usize, expanded: usize) -> Self {
        Self {
            actions,
            generated,
            expanded,
            solved: true,
        }
    }

    fn exhausted(generated: usize, expanded: usize) -> Self {
        Self {
            actions: Vec::new(),
            generated,
            expanded,
            solved: false,
        }
    }

    /// Whether a goal state was reached.
    pub fn is_solved(&self) -> bool {
        self.solved
    }
}

new_key_type! { struct SearchNodeKey; }

#[derive(Debug, Clone, Copy)]
struct SearchNode<A> {
    parent: Option<SearchNodeKey>,
    action: Option<A>,
}

/// Parent pointers for every generated node. A frontier entry carries only its node key, and the
/// path is rebuilt once, when a goal is popped.
#[derive(Debug)]
struct SearchTree<A> {
    nodes: SlotMap<SearchNodeKey, SearchNode<A>>,
}

impl<A: Copy> SearchTree<A> {
    fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    fn add_root(&mut self) -> SearchNodeKey {
        self.nodes.insert(SearchNode {
            parent: None,
            action: None,
        })
    }

    fn add_child(&mut self, parent: SearchNodeKey, action: A) -> SearchNodeKey {
        self.nodes.insert(SearchNode {
            parent: Some(parent),
            action: Some(action),
        })
    }

    fn path_to(&self, node: SearchNodeKey) -> Vec<A> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(key) = current {
            let node = &self.nodes[key];
            if let Some(action) = node.action {
                path.push(action);
            }
            current = node.parent;
        }
        path.reverse();
        path
    }
}

/// Depth-first graph search.
///
/// The frontier is a stack, so the last successor generated is the first explored. A state may
/// be pushed several times before it is first popped; later copies are discarded when popped
/// (lazy deletion). Returns the first solution found, which need not be the shortest.
///
/// Memory grows with the number of distinct reachable states, which can be exponential in the
/// size of the problem description.
pub fn depth_first_search<P: Problem>(problem: &P) -> SearchOutcome<P::Action> {
    let mut tree = SearchTree::new();
    let mut visited: HashSet<P::State> = HashSet::default();
    let mut frontier: Vec<(P::State, SearchNodeKey)> =
        vec![(problem.initial_state(), tree.add_root())];
    let mut generated = 1;
    let mut expanded = 0;

    debug!("depth-first search starting");
    while let Some((state, node)) = frontier.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }
        expanded += 1;
        trace!("expanding {:?}", state);

        if problem.is_goal(&state) {
            let actions = tree.path_to(node);
            debug!(
                "depth-first search solved: {} actions, generated={}, expanded={}",
                actions.len(),
                generated,
                expanded
            );
            return SearchOutcome::solved(actions, generated, expanded);
        }

        for (action, next_state) in problem.successors(&state) {
            if visited.contains(&next_state) {
                continue;
            }
            let child = tree.add_child(node, action);
            frontier.push((next_state, child));
            generated += 1;
        }
    }

    debug!(
        "depth-first search exhausted: generated={}, expanded={}",
        generated, expanded
    );
    SearchOutcome::exhausted(generated, expanded)
}

/// Frontier entry for uniform-cost search. Ordered so that `BinaryHeap`, a max-heap, pops the
/// lowest cost first and, among equal costs, the earliest inserted.
#[derive(Debug)]
struct FrontierEntry<S> {
    cost: usize,
    sequence: usize,
    state: S,
    node: SearchNodeKey,
}

impl<S> PartialEq for FrontierEntry<S> {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.sequence == other.sequence
    }
}

impl<S> Eq for FrontierEntry<S> {}

impl<S> Ord for FrontierEntry<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl<S> PartialOrd for FrontierEntry<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Uniform-cost graph search with unit action costs.
///
/// The frontier is a priority queue keyed on (path cost, insertion sequence). Because every
/// action costs 1, the first time a state is popped it was reached by a shortest path, so the
/// first goal popped gives a minimum-length solution and expanded states never need reopening.
///
/// Memory grows with the number of distinct reachable states, which can be exponential in the
/// size of the problem description.
pub fn uniform_cost_search<P: Problem>(problem: &P) -> SearchOutcome<P::Action> {
    let mut tree = SearchTree::new();
    let mut visited: HashSet<P::State> = HashSet::default();
    let mut frontier = BinaryHeap::new();
    let mut sequence = 0;
    frontier.push(FrontierEntry {
        cost: 0,
        sequence,
        state: problem.initial_state(),
        node: tree.add_root(),
    });
    let mut generated = 1;
    let mut expanded = 0;

    debug!("uniform-cost search starting");
    while let Some(FrontierEntry {
        cost, state, node, ..
    }) = frontier.pop()
    {
        if !visited.insert(state.clone()) {
            continue;
        }
        expanded += 1;
        trace!("expanding {:?} at cost {}", state, cost);

        if problem.is_goal(&state) {
            let actions = tree.path_to(node);
            debug!(
                "uniform-cost search solved: {} actions, generated={}, expanded={}",
                actions.len(),
                generated,
                expanded
            );
            return SearchOutcome::solved(actions, generated, expanded);
        }

        for (action, next_state) in problem.successors(&state) {
            if visited.contains(&next_state) {
                continue;
            }
            sequence += 1;
            let child = tree.add_child(node, action);
            frontier.push(FrontierEntry {
                cost: cost + 1,
                sequence,
                state: next_state,
                node: child,
            });
            generated += 1;
        }
    }

    debug!(
        "uniform-cost search exhausted: generated={}, expanded={}",
        generated, expanded
    );
    SearchOutcome::exhausted(generated, expanded)
}

/// Which search to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// [`depth_first_search`].
    DepthFirst,

    /// [`uniform_cost_search`].
    UniformCost,
}

impl Strategy {
    /// Run this strategy on a problem.
    pub fn search<P: Problem>(self, problem: &P) -> SearchOutcome<P::Action> {
        match self {
            Strategy::DepthFirst => depth_first_search(problem),
            Strategy::UniformCost => uniform_cost_search(problem),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DepthFirst => write!(f, "depth-first"),
            Strategy::UniformCost => write!(f, "uniform-cost"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "depth-first" => Ok(Strategy::DepthFirst),
            "uniform-cost" => Ok(Strategy::UniformCost),
            other => Err(SearchError::UnknownStrategy(other.to_string())),
        }
    }
}
