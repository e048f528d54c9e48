// ── MAC address ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MAC address, normalized to lowercase colon-separated, zero-padded octets.
///
/// illumos `dladm` prints octets without padding (`2:8:20:5a:1:ff`);
/// normalizing makes addresses from different collectors compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon- or dash-separated octets, padded or not.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lower = raw.as_ref().trim().to_lowercase().replace('-', ":");
        let octets: Vec<&str> = lower.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| (1..=2).contains(&o.len()) && o.chars().all(|c| c.is_ascii_hexdigit()));

        if well_formed {
            let padded: Vec<String> = octets.iter().map(|o| format!("{o:0>2}")).collect();
            Self(padded.join(":"))
        } else {
            Self(lower)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for MacAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pads_dladm_octets() {
        let mac = MacAddress::new("2:8:20:5a:1:ff");
        assert_eq!(mac.as_str(), "02:08:20:5a:01:ff");
    }

    #[test]
    fn normalizes_dashes_and_case() {
        let mac = MacAddress::new("AA-BB-CC-DD-EE-FF");
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn leaves_unrecognized_input_lowercased() {
        let mac = MacAddress::new("Random");
        assert_eq!(mac.as_str(), "random");
    }

    #[test]
    fn from_str_round_trips_display() {
        let mac: MacAddress = "0:c:29:ab:cd:ef".parse().unwrap();
        assert_eq!(mac.to_string(), "00:0c:29:ab:cd:ef");
    }
}
