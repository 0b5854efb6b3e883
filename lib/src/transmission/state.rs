use std::cmp::min;

use itertools::Itertools;
use log::{debug, trace};
use ndarray::Array2;

use crate::geometry::LineSegment;
use crate::transmission::element::{Element, ElementGroup, ElementId, ElementKind, Objectives, UNBOUNDED};
use crate::transmission::level::Level;

/// The mutable flow state of a Transmission level.
///
/// Everything is indexed by dense element id. `connected[[i, j]]` is the
/// number of packets flowing along the directed wire `i -> j` (zero when the
/// wire does not exist); anti-parallel wires never coexist. `swapped[i]` is
/// the swapper latch: `0` unset, `1` emitting the secondary color, `-1`
/// emitting the primary.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) amounts: Vec<i32>,
    pub(crate) left: Vec<i32>,
    pub(crate) connected: Array2<i32>,
    pub(crate) swapped: Vec<i8>,
}

impl State {
    /// The state before any wire is placed: every element holds its initial
    /// amount, all of it available to forward.
    pub fn initial(level: &Level) -> State {
        let n = level.elements.len();
        let mut state = State {
            amounts: vec![0; n],
            left: vec![0; n],
            connected: Array2::zeros((n, n)),
            swapped: vec![0; n],
        };
        for e in &level.elements {
            state.amounts[e.id] = e.amount;
            state.left[e.id] = e.amount;
        }
        state
    }

    /// The state-identifying bytes: `amounts`, `left`, `connected` row-major,
    /// then the swapper latches.
    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 * (self.amounts.len() * 2 + self.connected.len()) + self.swapped.len());
        for v in self
            .amounts
            .iter()
            .chain(self.left.iter())
            .chain(self.connected.iter())
        {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend(self.swapped.iter().map(|&v| v as u8));
        bytes
    }

    /// The color `e` currently emits.
    ///
    /// # Panics
    ///
    /// Panics for a swapper whose latch is unset: by invariant an unlatched
    /// swapper has no wires and is never asked for its color.
    pub(crate) fn emits_now(&self, e: &Element) -> Option<ElementGroup> {
        match e.kind {
            ElementKind::Swapper { swap_color } => match self.swapped[e.id] {
                1 => swap_color,
                -1 => e.color,
                _ => unreachable!("swapper color read before its latch is set"),
            },
            _ => e.color,
        }
    }

    fn can_receive_color_now(&self, e: &Element, color: Option<ElementGroup>) -> bool {
        match e.kind {
            ElementKind::Swapper { swap_color } => match self.swapped[e.id] {
                0 => e.color == color || swap_color == color,
                1 => e.color == color,
                _ => swap_color == color,
            },
            _ => e.color == color,
        }
    }

    /// How many more packets `e` accepts right now.
    fn headroom(&self, e: &Element) -> i32 {
        match e.kind {
            ElementKind::Radial { .. } | ElementKind::Cell => UNBOUNDED,
            // a booster already holding packets is saturated
            ElementKind::Booster => {
                if self.amounts[e.id] > 0 {
                    0
                } else {
                    UNBOUNDED
                }
            }
            _ => e.target - self.amounts[e.id],
        }
    }

    /// Whether `e` has met its demand. Elements without a demand are always
    /// fulfilled.
    pub(crate) fn is_fulfilled(&self, e: &Element) -> bool {
        match e.kind {
            ElementKind::Receiver | ElementKind::Transceiver | ElementKind::Swapper { .. } => {
                self.amounts[e.id] == e.target
            }
            _ => true,
        }
    }

    /// Transfer as many packets as fit from `src` onto the wire `src -> dst`,
    /// then run the destination's on-connect hook. Returns the number of
    /// packets that moved, hooks included.
    pub(crate) fn connect(&mut self, level: &Level, src: ElementId, dst: ElementId) -> i32 {
        let n = min(self.left[src], self.headroom(&level.elements[dst]));
        let mut moved = 0;
        if n > 0 {
            trace!("connect {src} -> {dst} with {n} packets");
            self.connected[[src, dst]] += n;
            self.left[src] -= n;
            self.amounts[dst] += n;
            self.left[dst] += n;
            moved = n + self.on_connected(level, dst, src);
        }
        if level.elements[src].kind == ElementKind::Cell && moved > 0 {
            self.sync_cells(level, src);
        }
        moved
    }

    /// The receiving element's reaction to an incoming transfer. Returns any
    /// packets it moved onward in turn.
    fn on_connected(&mut self, level: &Level, id: ElementId, from: ElementId) -> i32 {
        match level.elements[id].kind {
            ElementKind::Radial { .. } => self.radial_broadcast(level, id),
            ElementKind::Swapper { .. } => {
                if self.swapped[id] == 0 {
                    let incoming = self.emits_now(&level.elements[from]);
                    self.swapped[id] = if incoming == level.elements[id].color { 1 } else { -1 };
                    debug!("swapper {id} latched to {}", self.swapped[id]);
                }
                0
            }
            ElementKind::Cell => {
                self.sync_cells(level, id);
                0
            }
            ElementKind::Booster => {
                // a booster only ever receives while empty, in one transfer
                assert!(self.left[id] > 0 && self.left[id] == self.amounts[id]);
                self.left[id] *= 2;
                self.amounts[id]
            }
            _ => 0,
        }
    }

    /// Push everything a radial transmitter has received out to the receivers
    /// in its precomputed reach, ascending by id, cascading into their hooks.
    fn radial_broadcast(&mut self, level: &Level, id: ElementId) -> i32 {
        let n = level.elements.len();
        let received: i32 = (0..n).map(|i| self.connected[[i, id]]).sum();
        let mut moved = 0;
        for &i in &level.radial_adj[id] {
            let can_receive = self.headroom(&level.elements[i]);
            if can_receive == 0 {
                continue;
            }
            let already = self.connected[[id, i]];
            if already == 0 && self.connected[[i, id]] > 0 {
                // never broadcast back at a current sender
                continue;
            }
            if already == received {
                continue;
            }
            let fresh = min(received - already, can_receive);
            self.connected[[id, i]] += fresh;
            self.left[i] += fresh;
            self.amounts[i] += fresh;
            moved += fresh;
            moved += self.on_connected(level, i, id);
            debug!("radial {id} gives {fresh} new packets to {i}");
        }
        moved
    }

    /// Cell transmitters of one color act as a single pool: replicate this
    /// one's available packets to all its siblings.
    fn sync_cells(&mut self, level: &Level, id: ElementId) {
        let pool = self.left[id];
        let color = level.elements[id].color;
        for e in &level.elements {
            if e.id != id && e.kind == ElementKind::Cell && e.color == color {
                self.amounts[e.id] = pool;
                self.left[e.id] = pool;
            }
        }
    }

    /// Top up every existing wire once, in ascending source order. Returns
    /// the number of packets that moved; callers loop until zero.
    pub(crate) fn flow_once(&mut self, level: &Level) -> i32 {
        let n = level.elements.len();
        let mut moved = 0;
        for i in 0..n {
            if self.left[i] == 0 || !level.elements[i].is_sender() {
                continue;
            }
            for j in 0..n {
                if self.connected[[i, j]] == 0 {
                    continue;
                }
                moved += self.connect(level, i, j);
            }
        }
        trace!("flow_once moved {moved}");
        moved
    }

    /// The per-state legality of choosing the wire `i -> j` next. The
    /// crossed-wires objective is layered on separately in
    /// [`available_connections`](Self::available_connections).
    pub(crate) fn can_connect_now(&self, level: &Level, i: ElementId, j: ElementId) -> bool {
        let src = &level.elements[i];
        let dst = &level.elements[j];
        if !level.connectable.contains_edge(i, j) {
            return false;
        }
        if self.connected[[i, j]] != 0 || self.connected[[j, i]] != 0 {
            return false;
        }
        if self.left[i] <= 0 || self.headroom(dst) <= 0 {
            return false;
        }
        if !self.can_receive_color_now(dst, self.emits_now(src)) {
            return false;
        }
        // fixed-color wires were vetted against blockers at load time
        if !src.color_fixed() {
            let wire = LineSegment::new(src.pos, dst.pos);
            let color = self.emits_now(src);
            if level.blockers.iter().any(|b| b.blocks(color, &wire)) {
                debug!("[{i}, {j}] dynamically blocked");
                return false;
            }
        }
        true
    }

    /// Whether wiring `i -> j` would cross an existing wire. Both the
    /// candidate and every existing wire are shortened by the element radius
    /// so shared endpoints do not register; wireless elements do not
    /// participate at all.
    pub(crate) fn would_cross(&self, level: &Level, i: ElementId, j: ElementId) -> bool {
        let wire = LineSegment::new(level.elements[i].pos, level.elements[j].pos).shorten(1.0);
        let n = level.elements.len();
        for a in 0..n {
            if level.elements[a].is_wireless() {
                continue;
            }
            for b in (a + 1)..n {
                if level.elements[b].is_wireless() {
                    continue;
                }
                if self.connected[[a, b]] + self.connected[[b, a]] == 0 {
                    continue;
                }
                let existing =
                    LineSegment::new(level.elements[a].pos, level.elements[b].pos).shorten(1.0);
                if existing.intersect(&wire) {
                    debug!("{i} - {j} would cross {a} - {b}");
                    return true;
                }
            }
        }
        false
    }

    /// Every wire that may legally be placed next, in ascending `(src, dst)`
    /// order.
    pub(crate) fn available_connections(
        &self,
        level: &Level,
        objectives: &Objectives,
    ) -> Vec<(ElementId, ElementId)> {
        let n = level.elements.len();
        (0..n)
            .cartesian_product(0..n)
            .filter(|&(i, j)| i != j && self.can_connect_now(level, i, j))
            .filter(|&(i, j)| !(objectives.cross_wires && self.would_cross(level, i, j)))
            .collect_vec()
    }

    /// Place the wire `src -> dst` and propagate packet flow to a fixed
    /// point, yielding the successor state.
    pub(crate) fn add_connection(&self, level: &Level, src: ElementId, dst: ElementId) -> State {
        let mut next = self.clone();
        next.connect(level, src, dst);
        while next.flow_once(level) > 0 {}
        next
    }

    /// Whether every receiver has met its demand, plus the target-value
    /// condition when that objective is active.
    pub(crate) fn is_win(&self, level: &Level, objectives: &Objectives) -> bool {
        for e in &level.elements {
            if e.is_receiver() && !self.is_fulfilled(e) {
                return false;
            }
        }
        match objectives.target_value {
            Some(id) => self.left[id] > 0,
            None => true,
        }
    }

    /// Render the wire list: one line per sending element with its outgoing
    /// wires and their packet counts.
    pub(crate) fn render_wires(&self, level: &Level) -> String {
        let n = level.elements.len();
        let mut out = String::new();
        for i in 0..n {
            let mut any = false;
            for j in 0..n {
                if self.connected[[i, j]] == 0 {
                    continue;
                }
                if !any {
                    any = true;
                    out += &format!("{i} -> ");
                }
                out += &format!("{j} ({}); ", self.connected[[i, j]]);
            }
            if any {
                out.push('\n');
            }
        }
        out
    }
}
