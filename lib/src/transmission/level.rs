use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;
use petgraph::graphmap::DiGraphMap;
use thiserror::Error;

use crate::geometry::{LineSegment, Point};
use crate::transmission::element::{
    Blocker, Element, ElementGroup, ElementId, ElementKind, Objective,
};

/// Elements are renumbered into this many slots at most.
pub(crate) const MAX_ELEMENTS: usize = 21;

/// Why a level failed to load.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseLevelError {
    /// More placeable elements than the solver state can index.
    #[error("too many elements: {0}")]
    TooManyElements(usize),
    /// A target-value objective names an element id absent from the level.
    #[error("objective references unknown element id {0}")]
    UnknownTargetReference(i32),
}

/// A loaded Transmission level: placeable elements with dense ids, static
/// blockers, declared objectives, and the precomputed reachability relation.
#[derive(Debug)]
pub struct Level {
    pub(crate) elements: Vec<Element>,
    pub(crate) blockers: Vec<Blocker>,
    pub(crate) objectives: Vec<Objective>,
    /// `connectable` holds an edge `i -> j` iff a wire from `i` to `j` could
    /// ever be legal, ignoring per-state conditions.
    pub(crate) connectable: DiGraphMap<ElementId, ()>,
    /// Per element, the receivers a radial transmitter reaches, ascending.
    /// Empty for every other kind.
    pub(crate) radial_adj: Vec<Vec<ElementId>>,
}

// naive attribute scanning. level files are machine-written and one element
// per line, so this never sees nested quotes or split tags.
fn attr_str<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let needle = format!(" {field}=\"");
    let start = line.find(&needle)? + needle.len();
    let end = line[start..].find('"')?;
    Some(&line[start..start + end])
}

fn attr_i32(line: &str, field: &str) -> i32 {
    attr_str(line, field)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn attr_f64(line: &str, field: &str) -> f64 {
    attr_str(line, field)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

fn attr_bool(line: &str, field: &str) -> bool {
    matches!(
        attr_str(line, field).and_then(|s| s.chars().next()),
        Some('t' | 'T' | '1' | 'y' | 'Y')
    )
}

fn attr_point(line: &str, field: &str) -> Point {
    attr_str(line, field)
        .and_then(|s| {
            let (x, y) = s.split_once(',')?;
            Some(Point::new(
                x.trim().parse().ok()?,
                y.trim().parse().ok()?,
            ))
        })
        .unwrap_or_default()
}

fn attr_color(line: &str, field: &str) -> Option<ElementGroup> {
    attr_str(line, field).and_then(ElementGroup::parse)
}

/// What one `<element …/>` line contributed.
enum Parsed {
    Element { old_id: i32, element: Element },
    Blocker(Blocker),
    Objective(Objective, i32),
}

fn parse_line(line: &str) -> Option<Parsed> {
    if !line.contains("<element ") {
        return None;
    }
    let old_id = attr_i32(line, "id");
    let pos = attr_point(line, "position");
    if old_id < 0 {
        return None;
    }

    let kind = match attr_str(line, "type")? {
        "Transmitter" => ElementKind::Transmitter,
        "Receiver" => ElementKind::Receiver,
        "Transceiver" => ElementKind::Transceiver,
        "RadialTransmitter" => ElementKind::Radial {
            radius: attr_f64(line, "minRadius"),
        },
        "SwapperTransmitter" => ElementKind::Swapper {
            swap_color: attr_color(line, "swapGroup2"),
        },
        "CellTransmitter" => ElementKind::Cell,
        "SignalBooster" => ElementKind::Booster,
        "SignalBlock" => {
            return Some(Parsed::Blocker(Blocker::Line {
                color: attr_color(line, "blockGroup"),
                segment: LineSegment::new(
                    Point::new(attr_f64(line, "sx"), attr_f64(line, "sy")),
                    Point::new(attr_f64(line, "ex"), attr_f64(line, "ey")),
                ),
            }))
        }
        "SignalBlockCircle" => {
            return Some(Parsed::Blocker(Blocker::Circle {
                color: attr_color(line, "blockGroup"),
                center: pos,
                radius: attr_f64(line, "radius"),
            }))
        }
        "SignalBlockHexagon" => {
            return Some(Parsed::Blocker(hexagon(
                attr_color(line, "blockGroup"),
                pos,
                attr_f64(line, "radius"),
                attr_bool(line, "flip"),
            )))
        }
        "ObjectiveCrossedWires" => return Some(Parsed::Objective(Objective::CrossedWires, 0)),
        "ObjectiveSignalCount" => {
            return Some(Parsed::Objective(
                Objective::SignalCount(attr_i32(line, "signalTarget")),
                0,
            ))
        }
        "ObjectiveTargetValue" => {
            let target = attr_i32(line, "informationTarget");
            return Some(Parsed::Objective(Objective::TargetValue(0), target));
        }
        // PlacedSignal and anything unrecognized
        _ => return None,
    };

    let (color, amount, target) = match kind {
        ElementKind::Transmitter => (attr_color(line, "elementGroup"), attr_i32(line, "amount"), 0),
        ElementKind::Receiver => (attr_color(line, "elementGroup"), 0, attr_i32(line, "target")),
        ElementKind::Transceiver | ElementKind::Swapper { .. } => (
            attr_color(
                line,
                if matches!(kind, ElementKind::Swapper { .. }) {
                    "swapGroup1"
                } else {
                    "elementGroup"
                },
            ),
            attr_i32(line, "amount"),
            attr_i32(line, "target"),
        ),
        // radial, cell and booster neither produce nor demand packets
        _ => (attr_color(line, "elementGroup"), 0, 0),
    };

    Some(Parsed::Element {
        old_id,
        element: Element::new(0, kind, color, pos, amount, target),
    })
}

// unit hexagon vertices, optionally flipped to the pointy-top orientation
fn hexagon(color: Option<ElementGroup>, center: Point, radius: f64, flip: bool) -> Blocker {
    let mut points = [Point::default(); 6];
    for (i, p) in points.iter_mut().enumerate() {
        let k = (i + 1) as f64;
        let sin = (PI * k / 3.0).sin();
        let cos = (PI * k / 3.0).cos();
        let (ax, ay) = if flip { (sin, cos) } else { (cos, sin) };
        *p = Point::new(center.x + radius * ax, center.y + radius * ay);
    }
    Blocker::Hexagon { color, points }
}

impl Level {
    /// Parse a level from its file text. Each line holds at most one
    /// `<element …/>`; unknown element types are ignored. Input ids are
    /// remapped to dense `0..N-1` ids in order of appearance, and objective
    /// references are translated through the same map.
    pub fn parse(text: &str) -> Result<Level, ParseLevelError> {
        let mut elements = Vec::new();
        let mut blockers = Vec::new();
        let mut raw_objectives = Vec::new();
        let mut id_map: HashMap<i32, ElementId> = HashMap::new();

        for line in text.lines() {
            match parse_line(line) {
                Some(Parsed::Element { old_id, mut element }) => {
                    let new_id = elements.len();
                    element.id = new_id;
                    // last declaration of a duplicated id wins the mapping,
                    // but every element stays in the level
                    id_map.insert(old_id, new_id);
                    elements.push(element);
                }
                Some(Parsed::Blocker(blocker)) => blockers.push(blocker),
                Some(Parsed::Objective(objective, raw_target)) => {
                    raw_objectives.push((objective, raw_target))
                }
                None => {}
            }
        }

        let objectives = raw_objectives
            .into_iter()
            .map(|(objective, raw_target)| match objective {
                Objective::TargetValue(_) => id_map
                    .get(&raw_target)
                    .map(|&id| Objective::TargetValue(id))
                    .ok_or(ParseLevelError::UnknownTargetReference(raw_target)),
                other => Ok(other),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Level::assemble(elements, blockers, objectives)
    }

    /// Build a level from already-renumbered parts, computing the radial
    /// adjacency lists and the static reachability relation.
    pub(crate) fn assemble(
        elements: Vec<Element>,
        blockers: Vec<Blocker>,
        objectives: Vec<Objective>,
    ) -> Result<Level, ParseLevelError> {
        if elements.len() > MAX_ELEMENTS {
            return Err(ParseLevelError::TooManyElements(elements.len()));
        }

        let radial_adj = elements
            .iter()
            .map(|e| match e.kind {
                ElementKind::Radial { radius } => elements
                    .iter()
                    .filter(|other| {
                        other.id != e.id
                            && other.is_receiver()
                            && other.pos.distance(e.pos) <= radius
                            && e.color_match(other)
                    })
                    .map(|other| other.id)
                    .collect(),
                _ => Vec::new(),
            })
            .collect();

        let mut level = Level {
            elements,
            blockers,
            objectives,
            connectable: DiGraphMap::new(),
            radial_adj,
        };
        for i in 0..level.elements.len() {
            for j in 0..level.elements.len() {
                if !level.wire_always_blocked(i, j) {
                    level.connectable.add_edge(i, j, ());
                }
            }
        }
        debug!(
            "connectable pairs: {:?}",
            level.connectable.all_edges().map(|(i, j, _)| (i, j)).collect::<Vec<_>>()
        );
        Ok(level)
    }

    /// State-independent veto of a wire `i -> j`: wrong roles, incompatible
    /// colors, another element sitting on the segment, or a static blocker of
    /// a statically-resolvable color crossing it.
    fn wire_always_blocked(&self, i: ElementId, j: ElementId) -> bool {
        let src = &self.elements[i];
        let dst = &self.elements[j];
        if src.id == dst.id || !src.is_sender() || !dst.is_receiver() {
            return true;
        }
        if !src.color_match(dst) {
            return true;
        }

        let wire = LineSegment::new(src.pos, dst.pos);
        for e in &self.elements {
            if e.id != src.id && e.id != dst.id && e.is_in_between(&wire) {
                debug!("[{i}, {j}] blocked by element {}", e.id);
                return true;
            }
        }

        // a swapper source defers the blocker test to connect time unless the
        // destination pins the color down
        let color = if src.color_fixed() {
            Some(src.color)
        } else if dst.color_fixed() {
            Some(dst.color)
        } else {
            None
        };
        if let Some(color) = color {
            for (k, blocker) in self.blockers.iter().enumerate() {
                if blocker.blocks(color, &wire) {
                    debug!("[{i}, {j}] blocked by blocker {k}");
                    return true;
                }
            }
        }
        false
    }
}
