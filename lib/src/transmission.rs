//! Solver for Transmission, a wire-routing puzzle on the plane.
//!
//! Typed elements (transmitters, receivers, boosters, cell relays, color
//! swappers, radial broadcasters) are joined by straight wires; each wire
//! carries whole packets from sender to receiver, and special elements react
//! to arriving packets (see [`ElementKind`]). A level is won when every
//! receiver holds exactly its target. Levels may attach objectives that
//! restrict wiring or strengthen the win condition; [`solve`] attempts each
//! declared objective in turn, or all of them at once.

pub use element::{Element, ElementGroup, ElementId, ElementKind, Objective, Objectives};
pub use level::{Level, ParseLevelError};
pub use state::State;

use log::debug;

use crate::search::{breadth_first, DepthRule, Outcome, StateSpace};

pub(crate) mod element;
pub(crate) mod level;
pub(crate) mod state;

struct Routing<'a> {
    level: &'a Level,
    objectives: Objectives,
}

impl StateSpace for Routing<'_> {
    type State = State;
    type Action = (ElementId, ElementId);

    fn successors(&self, state: &State) -> Vec<((ElementId, ElementId), State)> {
        state
            .available_connections(self.level, &self.objectives)
            .into_iter()
            .map(|(src, dst)| ((src, dst), state.add_connection(self.level, src, dst)))
            .collect()
    }

    fn is_goal(&self, state: &State) -> bool {
        state.is_win(self.level, &self.objectives)
    }

    fn is_dead(&self, _state: &State) -> bool {
        false
    }

    fn canonical(&self, state: &State) -> Vec<u8> {
        state.canonical_bytes()
    }

    fn depth_rule(&self, depth: usize) -> DepthRule {
        match self.objectives.signal_count {
            Some(limit) if depth as i32 >= limit => DepthRule::Prune,
            _ => DepthRule::Expand,
        }
    }
}

/// The printable result of solving one level.
pub struct Report {
    /// Human-readable objective headlines and step traces.
    pub output: String,
    /// How many objective runs found no solution.
    pub unsolved: usize,
}

/// Search one level under one fixed objective set. Returns the trace text on
/// success.
fn run(level: &Level, objectives: Objectives) -> Option<String> {
    debug!("searching with objectives {objectives:?}");
    match breadth_first(&Routing { level, objectives }, State::initial(level)) {
        Outcome::Solved { trace } => {
            let mut out = String::new();
            for (step, ((src, dst), state)) in trace.iter().enumerate().rev() {
                out += &format!("--- Step {}: {src} -> {dst} ---\n", step + 1);
                out += &state.render_wires(level);
            }
            Some(out)
        }
        // the signal-count objective prunes, so the queue always drains
        _ => None,
    }
}

/// Solve a level once per declared objective. With `all_objectives`, or when
/// the level declares none, a single search runs with everything active at
/// once. The returned [`Report`] carries the accumulated output and the
/// number of runs that failed.
pub fn solve(level: &Level, all_objectives: bool) -> Report {
    let mut output = String::new();
    let mut unsolved = 0;
    let mut selected = Objectives::default();
    let mut together = all_objectives;

    let run_into = |selected: &Objectives, output: &mut String| {
        match run(level, *selected) {
            Some(trace) => {
                *output += &trace;
                *output += "SOLVED\n";
                true
            }
            None => {
                *output += "NOT SOLVED :(\n";
                false
            }
        }
    };

    if level.objectives.is_empty() {
        together = true;
    } else {
        for &objective in &level.objectives {
            if !together {
                output += "\n\n";
                selected = Objectives::default();
            }
            output += &format!("{objective}\n");
            selected.activate(objective);
            if !together && !run_into(&selected, &mut output) {
                unsolved += 1;
            }
        }
    }

    if together && !run_into(&selected, &mut output) {
        unsolved += 1;
    }

    Report { output, unsolved }
}
