use crate::geometry::{LineSegment, Point};

/// Dense element identifier, assigned in level order after renumbering.
pub type ElementId = usize;

/// Headroom sentinel for elements that accept any number of packets.
pub(crate) const UNBOUNDED: i32 = 32767;

/// Signal color. A wire only forms between color-compatible endpoints.
///
/// Elements parsed without a recognizable color carry `None`; two colorless
/// elements still count as compatible, matching the game's loader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)] // the names are the whole story
pub enum ElementGroup {
    Cable,
    Exchange,
    Fibre,
    Wave,
}

impl ElementGroup {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "Cable" => Some(Self::Cable),
            "Exchange" => Some(Self::Exchange),
            "Fibre" => Some(Self::Fibre),
            "Wave" => Some(Self::Wave),
            _ => None,
        }
    }
}

/// The closed set of element behaviors.
///
/// Distinctions that matter to the solver (sender/receiver role, packet
/// headroom, wireless exemption, interposition radius, on-connect hooks) are
/// methods on [`Element`] dispatching over this enum.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Produces packets; never receives.
    Transmitter,
    /// Consumes packets up to its target; never sends.
    Receiver,
    /// Both produces and consumes.
    Transceiver,
    /// Wireless broadcaster: cannot be wired up as a source by hand, but
    /// re-broadcasts everything it receives to all matching receivers within
    /// `radius`.
    Radial {
        /// Broadcast reach, from the `minRadius` attribute.
        radius: f64,
    },
    /// Converts between its primary color and `swap_color`: the first
    /// incoming wire latches which of the two it emits from then on.
    Swapper {
        /// The secondary color.
        swap_color: Option<ElementGroup>,
    },
    /// Cell relay: all cell transmitters of one color share a single packet
    /// pool.
    Cell,
    /// Doubles whatever it is fed, once; a booster holding packets accepts no
    /// more.
    Booster,
}

/// One placed element of a Transmission level.
#[derive(Clone, Debug)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    pub(crate) color: Option<ElementGroup>,
    pub(crate) pos: Point,
    pub(crate) amount: i32,
    pub(crate) target: i32,
}

impl Element {
    pub(crate) fn new(
        id: ElementId,
        kind: ElementKind,
        color: Option<ElementGroup>,
        pos: Point,
        amount: i32,
        target: i32,
    ) -> Self {
        Self {
            id,
            kind,
            color,
            pos,
            amount,
            target,
        }
    }

    /// Whether this element may be chosen as the source of a wire.
    pub(crate) fn is_sender(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Transmitter
                | ElementKind::Transceiver
                | ElementKind::Swapper { .. }
                | ElementKind::Cell
                | ElementKind::Booster
        )
    }

    /// Whether this element may be chosen as the destination of a wire.
    pub(crate) fn is_receiver(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Receiver
                | ElementKind::Transceiver
                | ElementKind::Radial { .. }
                | ElementKind::Swapper { .. }
                | ElementKind::Cell
                | ElementKind::Booster
        )
    }

    /// Wireless elements are ignored by the crossed-wires objective, both as
    /// wire endpoints and as existing wires.
    pub(crate) fn is_wireless(&self) -> bool {
        matches!(self.kind, ElementKind::Radial { .. })
    }

    /// Whether the emitted color is known statically. Only swappers resolve
    /// their color per state.
    pub(crate) fn color_fixed(&self) -> bool {
        !matches!(self.kind, ElementKind::Swapper { .. })
    }

    /// How close a wire may pass before this element counts as in the way.
    pub(crate) fn in_between_radius(&self) -> f64 {
        // cell transmitters are drawn smaller than everything else
        if self.kind == ElementKind::Cell {
            0.5
        } else {
            1.0
        }
    }

    pub(crate) fn is_in_between(&self, wire: &LineSegment) -> bool {
        wire.distance(self.pos) < self.in_between_radius()
    }

    /// Whether this element can consume packets of `color`, ignoring state.
    pub(crate) fn can_receive_color(&self, color: Option<ElementGroup>) -> bool {
        match self.kind {
            ElementKind::Swapper { swap_color } => self.color == color || swap_color == color,
            _ => self.color == color,
        }
    }

    /// Static color compatibility of a wire from `self` to `dst`.
    pub(crate) fn color_match(&self, dst: &Element) -> bool {
        match self.kind {
            ElementKind::Swapper { swap_color } => {
                dst.can_receive_color(self.color) || dst.can_receive_color(swap_color)
            }
            // color aside, cell transmitters never wire to each other
            ElementKind::Cell if dst.kind == ElementKind::Cell => false,
            _ => dst.can_receive_color(self.color),
        }
    }
}

/// A static signal blocker. Blockers are not elements: they have no id, take
/// no packets, and only veto wires of their own color.
#[derive(Clone, Debug)]
pub(crate) enum Blocker {
    Line {
        color: Option<ElementGroup>,
        segment: LineSegment,
    },
    Circle {
        color: Option<ElementGroup>,
        center: Point,
        radius: f64,
    },
    Hexagon {
        color: Option<ElementGroup>,
        points: [Point; 6],
    },
}

impl Blocker {
    /// Whether a wire of `color` along `wire` is vetoed by this blocker.
    pub(crate) fn blocks(&self, color: Option<ElementGroup>, wire: &LineSegment) -> bool {
        match self {
            Blocker::Line {
                color: own,
                segment,
            } => *own == color && segment.intersect(wire),
            Blocker::Circle {
                color: own,
                center,
                radius,
            } => {
                if *own != color {
                    return false;
                }
                let d1 = center.distance(wire.a);
                let d2 = center.distance(wire.b);
                // one endpoint in, one out; or both out and the wire dips in.
                // a wire entirely inside the circle passes.
                (d1 < *radius && d2 > *radius)
                    || (d1 > *radius && d2 < *radius)
                    || (d1 > *radius && d2 > *radius && wire.distance(*center) < *radius)
            }
            Blocker::Hexagon { color: own, points } => {
                *own == color
                    && (0..6).any(|i| {
                        LineSegment::new(points[i], points[(i + 1) % 6]).intersect(wire)
                    })
            }
        }
    }
}

/// An optional extra win condition attached to a level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Objective {
    /// No two active wires may cross.
    CrossedWires,
    /// Use at most this many wires.
    SignalCount(i32),
    /// The given element must keep an unforwarded packet at the win state.
    TargetValue(ElementId),
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::CrossedWires => write!(f, "Objective: Do not cross wires"),
            Objective::SignalCount(n) => {
                write!(f, "Objective: Do not use more than {n} signals")
            }
            Objective::TargetValue(id) => {
                write!(f, "Objective: Leave additional packet on target {id}")
            }
        }
    }
}

/// The set of objectives active for one search run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Objectives {
    pub(crate) cross_wires: bool,
    pub(crate) signal_count: Option<i32>,
    pub(crate) target_value: Option<ElementId>,
}

impl Objectives {
    pub(crate) fn activate(&mut self, objective: Objective) {
        match objective {
            Objective::CrossedWires => self.cross_wires = true,
            Objective::SignalCount(n) => self.signal_count = Some(n),
            Objective::TargetValue(id) => self.target_value = Some(id),
        }
    }
}
