// ── Bandwidth and address lookups ──
//
// Lookup maps keyed by link name, built once per graph computation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{BandwidthSample, IpAssignment};

use super::graph::LinkBandwidth;

pub type BandwidthMap = HashMap<String, LinkBandwidth>;
pub type IpMap = HashMap<String, Vec<IpAssignment>>;

/// Index the latest sample per link.
///
/// Samples without a timestamp lose to any timestamped sample; on equal
/// timestamps the later sample in the input wins.
pub fn bandwidth_map(samples: &[BandwidthSample]) -> BandwidthMap {
    let mut latest: HashMap<&str, (Option<DateTime<Utc>>, &BandwidthSample)> = HashMap::new();
    for sample in samples {
        let replace = latest
            .get(sample.link.as_str())
            .is_none_or(|(ts, _)| sample.scan_timestamp >= *ts);
        if replace {
            latest.insert(sample.link.as_str(), (sample.scan_timestamp, sample));
        }
    }

    latest
        .into_iter()
        .map(|(link, (_, s))| {
            (
                link.to_owned(),
                LinkBandwidth {
                    rx_mbps: s.rx_mbps,
                    tx_mbps: s.tx_mbps,
                    total_mbps: s.rx_mbps + s.tx_mbps,
                    rx_bytes_per_second: s.rx_bps,
                    tx_bytes_per_second: s.tx_bps,
                },
            )
        })
        .collect()
}

/// Group addresses by interface, preserving input order within a link.
pub fn ip_map(addresses: &[IpAssignment]) -> IpMap {
    let mut map: IpMap = HashMap::new();
    for addr in addresses {
        map.entry(addr.interface.clone())
            .or_default()
            .push(addr.clone());
    }
    map
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(link: &str, rx: f64, tx: f64, minute: Option<u32>) -> BandwidthSample {
        BandwidthSample {
            link: link.into(),
            rx_mbps: rx,
            tx_mbps: tx,
            rx_bps: rx * 125_000.0,
            tx_bps: tx * 125_000.0,
            scan_timestamp: minute.map(|m| Utc.with_ymd_and_hms(2024, 5, 1, 10, m, 0).unwrap()),
        }
    }

    #[test]
    fn latest_sample_wins() {
        let map = bandwidth_map(&[
            sample("vnic0", 9.0, 9.0, Some(5)),
            sample("vnic0", 5.0, 2.0, Some(10)),
            sample("vnic0", 1.0, 1.0, Some(1)),
            sample("vnic0", 7.0, 7.0, None),
        ]);
        let bw = map["vnic0"];
        assert!((bw.rx_mbps - 5.0).abs() < f64::EPSILON);
        assert!((bw.total_mbps - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_timestamps_keep_later_sample() {
        let map = bandwidth_map(&[
            sample("e1000g0", 1.0, 0.0, Some(3)),
            sample("e1000g0", 2.0, 0.0, Some(3)),
        ]);
        assert!((map["e1000g0"].rx_mbps - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn untimestamped_sample_used_when_alone() {
        let map = bandwidth_map(&[sample("stub0", 3.0, 4.0, None)]);
        assert!((map["stub0"].total_mbps - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ip_map_groups_by_interface() {
        let a = |iface: &str, addr: &str| IpAssignment {
            interface: iface.into(),
            address: addr.into(),
            prefix_length: None,
            ip_version: None,
            addr_type: None,
            state: None,
        };
        let map = ip_map(&[a("vnic0", "10.0.0.1"), a("vnic1", "10.0.1.1"), a("vnic0", "fe80::1")]);
        assert_eq!(map["vnic0"].len(), 2);
        assert_eq!(map["vnic0"][1].address, "fe80::1");
    }
}
