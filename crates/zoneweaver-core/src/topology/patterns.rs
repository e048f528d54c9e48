// ── Pattern detector ──
//
// Advisory tags describing the overall network design. Pure; not used
// by any later pipeline stage.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::model::{Aggregate, Etherstub, Vnic, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PatternKind {
    HighAvailability,
    VirtualizedSwitching,
    NetworkSegmentation,
    MultiHomedZones,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub description: String,
    pub count: usize,
}

pub fn detect_patterns(
    aggregates: &[Aggregate],
    etherstubs: &[Etherstub],
    vnics: &[Vnic],
    zones: &[Zone],
) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    if !aggregates.is_empty() {
        patterns.push(Pattern {
            kind: PatternKind::HighAvailability,
            description: "Link aggregation provides redundant uplinks".into(),
            count: aggregates.len(),
        });
    }

    if !etherstubs.is_empty() {
        patterns.push(Pattern {
            kind: PatternKind::VirtualizedSwitching,
            description: "Etherstubs provide internal virtual switching".into(),
            count: etherstubs.len(),
        });
    }

    let vlans: BTreeSet<u16> = vnics.iter().filter_map(|v| v.vid).collect();
    if vlans.len() > 1 {
        patterns.push(Pattern {
            kind: PatternKind::NetworkSegmentation,
            description: format!("Traffic segmented across {} VLANs", vlans.len()),
            count: vlans.len(),
        });
    }

    let mut per_zone: HashMap<&str, usize> = HashMap::new();
    for zone in vnics.iter().filter_map(|v| v.zone.as_deref()) {
        *per_zone.entry(zone).or_default() += 1;
    }
    let multi_homed = zones
        .iter()
        .filter(|z| per_zone.get(z.name.as_str()).is_some_and(|n| *n > 1))
        .count();
    if multi_homed > 0 {
        patterns.push(Pattern {
            kind: PatternKind::MultiHomedZones,
            description: "Zones attached to more than one VNIC".into(),
            count: multi_homed,
        });
    }

    patterns
}
