//! Breadth-first state-space search shared by both puzzle cores.
//!
//! Nodes live in a growing arena and point at their parents by index, so the
//! winning trace is reconstructed by walking indices back to the root. The
//! visited set is keyed by each state's canonical byte image: equal bytes,
//! equivalent state.

use std::collections::{HashSet, VecDeque};

use log::trace;

/// What to do with a node popped from the frontier at a given depth.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DepthRule {
    /// Expand normally.
    Expand,
    /// Drop this node but keep searching (Transmission's signal-count bound).
    Prune,
    /// Stop the whole search (Chrooma's hard step limit).
    Abort,
}

/// A puzzle mechanic pluggable into [`breadth_first`].
pub(crate) trait StateSpace {
    type State: Clone;
    type Action: Copy;

    /// Enumerate successor states in a deterministic order. States that can
    /// never lead anywhere may still be returned; they are dropped via
    /// [`is_dead`](Self::is_dead).
    fn successors(&self, state: &Self::State) -> Vec<(Self::Action, Self::State)>;
    /// Goal test. Run on freshly created successors only, never on the root.
    fn is_goal(&self, state: &Self::State) -> bool;
    /// Dead states are discarded without entering the frontier.
    fn is_dead(&self, state: &Self::State) -> bool;
    /// The byte image identifying `state` for deduplication. Must not include
    /// search bookkeeping such as depth or parent links.
    fn canonical(&self, state: &Self::State) -> Vec<u8>;
    fn depth_rule(&self, depth: usize) -> DepthRule;
}

/// How a search ended.
pub(crate) enum Outcome<A, S> {
    /// A goal state was reached; `trace` holds the root-to-goal move sequence
    /// with the state following each move.
    Solved { trace: Vec<(A, S)> },
    /// The reachable state space was exhausted without a goal.
    Exhausted,
    /// A node beyond the hard depth limit reached the head of the queue.
    DepthLimit,
}

struct Node<A, S> {
    state: S,
    parent: Option<usize>,
    action: Option<A>,
    depth: usize,
}

pub(crate) fn breadth_first<P: StateSpace>(
    space: &P,
    root: P::State,
) -> Outcome<P::Action, P::State> {
    let root_key = space.canonical(&root);
    let mut arena = vec![Node {
        state: root,
        parent: None,
        action: None,
        depth: 0,
    }];
    let mut queue = VecDeque::from([0usize]);
    let mut visited: HashSet<Vec<u8>> = HashSet::from([root_key]);

    while let Some(index) = queue.pop_front() {
        let depth = arena[index].depth;
        match space.depth_rule(depth) {
            DepthRule::Expand => {}
            DepthRule::Prune => continue,
            DepthRule::Abort => return Outcome::DepthLimit,
        }
        for (action, state) in space.successors(&arena[index].state) {
            if space.is_goal(&state) {
                let mut trace = vec![(action, state)];
                let mut at = index;
                while let Some(parent) = arena[at].parent {
                    trace.push((arena[at].action.unwrap(), arena[at].state.clone()));
                    at = parent;
                }
                trace.reverse();
                trace!("goal found at depth {} after {} nodes", depth + 1, arena.len());
                return Outcome::Solved { trace };
            }
            if space.is_dead(&state) {
                continue;
            }
            if !visited.insert(space.canonical(&state)) {
                continue;
            }
            arena.push(Node {
                state,
                parent: Some(index),
                action: Some(action),
                depth: depth + 1,
            });
            queue.push_back(arena.len() - 1);
        }
    }
    Outcome::Exhausted
}
