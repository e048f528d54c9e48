// ── Layout calculator ──
//
// Assigns a position to every node. Generic layouts look only at node
// kinds; the zone-centric and bandwidth views bring their own layouts,
// which take precedence over the requested one.

use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::graph::{GraphEdge, GraphNode, NodeKind, Position, incident_bandwidth};
use super::view::ViewType;

pub const MARGIN: f64 = 100.0;
pub const LAYER_HEIGHT: f64 = 200.0;
pub const NODE_SPACING: f64 = 250.0;
pub const GRID_CELL: f64 = 200.0;
/// Canvas center used by ring layouts and for a lone node.
pub const CENTER: Position = Position { x: 600.0, y: 400.0 };

const RING_BASE_RADIUS: f64 = 150.0;
const RING_STEP: f64 = 180.0;
const FORCE_JITTER: f64 = 75.0;
const ZONE_RING_RADIUS: f64 = 300.0;
const ZONE_VNIC_RADIUS: f64 = 120.0;
const OUTER_RING_RADIUS: f64 = 550.0;
const TIER_SIZE: usize = 5;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum LayoutType {
    #[default]
    Hierarchical,
    Force,
    Circular,
    Grid,
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn float(n: usize) -> f64 {
    n as f64
}

/// Node indices grouped by kind, hierarchy order, empty groups skipped.
fn layers(nodes: &[GraphNode]) -> Vec<Vec<usize>> {
    NodeKind::iter()
        .map(|kind| {
            nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.kind == kind)
                .map(|(i, _)| i)
                .collect::<Vec<_>>()
        })
        .filter(|layer| !layer.is_empty())
        .collect()
}

/// Point `index` of `count` evenly spaced on a circle, starting at the top.
fn on_ring(center: Position, radius: f64, index: usize, count: usize) -> Position {
    let step = TAU / float(count.max(1));
    let angle = -FRAC_PI_2 + step * float(index);
    Position::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Position every node in place.
pub fn apply_layout(
    nodes: &mut [GraphNode],
    edges: &[GraphEdge],
    layout: LayoutType,
    view: ViewType,
) {
    if nodes.len() <= 1 {
        if let Some(only) = nodes.first_mut() {
            only.position = CENTER;
        }
        return;
    }

    match (view, layout) {
        (ViewType::ZoneCentric, _) => zone_centric(nodes),
        (ViewType::Bandwidth, _) => bandwidth_tiers(nodes, edges),
        (_, LayoutType::Hierarchical) => hierarchical(nodes),
        (_, LayoutType::Force) => force(nodes),
        (_, LayoutType::Circular) => circular(nodes),
        (_, LayoutType::Grid) => grid(nodes),
    }
}

fn hierarchical(nodes: &mut [GraphNode]) {
    let layers = layers(nodes);
    let widest = layers.iter().map(Vec::len).max().unwrap_or(1);
    let max_width = float(widest.saturating_sub(1)) * NODE_SPACING;
    let master_center = MARGIN + max_width / 2.0;

    for (depth, layer) in layers.iter().enumerate() {
        let y = MARGIN + float(depth) * LAYER_HEIGHT;
        let gaps = layer.len().saturating_sub(1);
        let mut spacing = NODE_SPACING;
        if gaps > 0 && float(gaps) * NODE_SPACING < max_width * 0.5 {
            spacing = (NODE_SPACING * 2.0)
                .min(max_width * 0.7 / float(gaps))
                .max(NODE_SPACING);
        }
        let start = master_center - float(gaps) * spacing / 2.0;
        for (slot, &idx) in layer.iter().enumerate() {
            if let Some(node) = nodes.get_mut(idx) {
                node.position = Position::new(start + float(slot) * spacing, y);
            }
        }
    }
}

fn circular(nodes: &mut [GraphNode]) {
    for (ring, layer) in layers(nodes).iter().enumerate() {
        let radius = RING_BASE_RADIUS + float(ring) * RING_STEP;
        for (slot, &idx) in layer.iter().enumerate() {
            if let Some(node) = nodes.get_mut(idx) {
                node.position = on_ring(CENTER, radius, slot, layer.len());
            }
        }
    }
}

fn grid_position(index: usize, cols: usize) -> Position {
    Position::new(
        MARGIN + float(index % cols) * GRID_CELL,
        MARGIN + float(index / cols) * GRID_CELL,
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn grid_columns(count: usize) -> usize {
    (float(count).sqrt().ceil() as usize).max(1)
}

fn grid(nodes: &mut [GraphNode]) {
    let cols = grid_columns(nodes.len());
    for (i, node) in nodes.iter_mut().enumerate() {
        node.position = grid_position(i, cols);
    }
}

/// FNV-1a, so a node's jitter depends only on its id.
fn fnv1a(id: &str) -> u64 {
    id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn force(nodes: &mut [GraphNode]) {
    let cols = grid_columns(nodes.len());
    for (i, node) in nodes.iter_mut().enumerate() {
        let mut rng = StdRng::seed_from_u64(fnv1a(&node.id));
        let seed = grid_position(i, cols);
        node.position = Position::new(
            seed.x + rng.gen_range(-FORCE_JITTER..=FORCE_JITTER),
            seed.y + rng.gen_range(-FORCE_JITTER..=FORCE_JITTER),
        );
    }
}

fn zone_centric(nodes: &mut [GraphNode]) {
    let zones: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.kind == NodeKind::Zone)
        .map(|(i, _)| i)
        .collect();

    let mut zone_positions: HashMap<String, Position> = HashMap::new();
    for (slot, &idx) in zones.iter().enumerate() {
        let position = if zones.len() == 1 {
            CENTER
        } else {
            on_ring(CENTER, ZONE_RING_RADIUS, slot, zones.len())
        };
        if let Some(node) = nodes.get_mut(idx) {
            node.position = position;
            zone_positions.insert(node.id.clone(), position);
        }
    }

    let mut attached: HashMap<String, Vec<usize>> = HashMap::new();
    let mut placed: HashSet<usize> = zones.iter().copied().collect();
    for (idx, node) in nodes.iter().enumerate() {
        if node.kind != NodeKind::Vnic {
            continue;
        }
        if let Some(zone) = node.data.zone.as_ref().filter(|z| zone_positions.contains_key(*z)) {
            attached.entry(zone.clone()).or_default().push(idx);
            placed.insert(idx);
        }
    }
    for (zone, members) in &attached {
        let Some(&center) = zone_positions.get(zone) else {
            continue;
        };
        for (slot, &idx) in members.iter().enumerate() {
            if let Some(node) = nodes.get_mut(idx) {
                node.position = on_ring(center, ZONE_VNIC_RADIUS, slot, members.len());
            }
        }
    }

    let rest: Vec<usize> = (0..nodes.len()).filter(|i| !placed.contains(i)).collect();
    for (slot, &idx) in rest.iter().enumerate() {
        if let Some(node) = nodes.get_mut(idx) {
            node.position = on_ring(CENTER, OUTER_RING_RADIUS, slot, rest.len());
        }
    }
}

fn bandwidth_tiers(nodes: &mut [GraphNode], edges: &[GraphEdge]) {
    let totals = incident_bandwidth(edges);
    let mut order: Vec<(usize, f64)> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (i, totals.get(n.id.as_str()).copied().unwrap_or_default()))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (rank, (idx, _)) in order.into_iter().enumerate() {
        if let Some(node) = nodes.get_mut(idx) {
            node.position = Position::new(
                MARGIN + float(rank % TIER_SIZE) * NODE_SPACING,
                MARGIN + float(rank / TIER_SIZE) * LAYER_HEIGHT,
            );
        }
    }
}
