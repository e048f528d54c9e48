// ── Colors and rate formatting ──
//
// CSS color strings so any renderer can use them directly.

use super::graph::NodeKind;

/// Utilization gradient: green (hue 120) at idle to red (hue 0) at capacity.
///
/// A non-positive `capacity_mbps` is treated as a 1 Gbps link.
pub fn utilization_color(mbps: f64, capacity_mbps: f64) -> String {
    let capacity = if capacity_mbps > 0.0 {
        capacity_mbps
    } else {
        1000.0
    };
    let ratio = if mbps.is_finite() {
        (mbps / capacity).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let hue = 120.0 * (1.0 - ratio);
    format!("hsl({hue:.0}, 80%, 45%)")
}

/// Golden-angle hue per VLAN so neighbouring ids get distinct colors.
pub fn vlan_color(vid: u16) -> String {
    const GOLDEN_ANGLE: f64 = 137.508;
    let hue = (f64::from(vid) * GOLDEN_ANGLE) % 360.0;
    format!("hsl({hue:.0}, 65%, 55%)")
}

pub fn node_kind_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::PhysicalNic => "#3273dc",
        NodeKind::Aggregate => "#8e44ad",
        NodeKind::Etherstub => "#16a085",
        NodeKind::Vnic => "#f39c12",
        NodeKind::Zone => "#48c774",
    }
}

/// Neutral stroke for idle or de-emphasized elements.
pub const MUTED: &str = "#b5b5b5";
pub const ALERT_CRITICAL: &str = "#f14668";
pub const ALERT_WARNING: &str = "#ffdd57";

/// Log-scaled stroke width in `[1, 8]`.
pub fn edge_stroke_width(mbps: f64) -> f64 {
    if !mbps.is_finite() || mbps <= 0.0 {
        return 1.0;
    }
    (1.0 + mbps.ln_1p() / std::f64::consts::LN_10 * 2.0).clamp(1.0, 8.0)
}

/// Human-readable rate: `850 Kbps`, `12.5 Mbps`, `1.25 Gbps`.
pub fn format_mbps(mbps: f64) -> String {
    if !mbps.is_finite() || mbps <= 0.0 {
        "0 Mbps".into()
    } else if mbps < 1.0 {
        format!("{:.0} Kbps", mbps * 1000.0)
    } else if mbps < 1000.0 {
        format!("{mbps:.1} Mbps")
    } else {
        format!("{:.2} Gbps", mbps / 1000.0)
    }
}
