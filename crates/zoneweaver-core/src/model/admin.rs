// ── System administration types ──

use serde::{Deserialize, Serialize};

/// A boot environment (`beadm list`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootEnvironment {
    pub name: String,
    pub active_now: bool,
    pub active_on_reboot: bool,
    pub mountpoint: Option<String>,
    pub space: Option<String>,
    pub policy: Option<String>,
    pub created: Option<String>,
}

/// A pkg(5) publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub origins: Vec<String>,
    pub mirrors: Vec<String>,
    pub enabled: bool,
    pub sticky: bool,
    pub proxy: Option<String>,
    pub status: Option<String>,
}

/// An installed or searchable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub publisher: Option<String>,
    pub version: Option<String>,
    /// pkg flags column (`i--` installed, `-o-` obsolete, `--r` renamed).
    pub flags: Option<String>,
    pub summary: Option<String>,
}

impl Package {
    pub fn is_installed(&self) -> bool {
        self.flags.as_deref().is_some_and(|f| f.starts_with('i'))
    }
}
