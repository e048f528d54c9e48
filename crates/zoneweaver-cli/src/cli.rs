//! Clap derive structures for the `zw` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man pages, so nothing here may depend
//! on the rest of the crate.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zw -- administer Zoneweaver OmniOS hosts and map their networks
#[derive(Debug, Parser)]
#[command(
    name = "zw",
    version,
    about = "Administer OmniOS hosts through the Zoneweaver API",
    long_about = "Inspect and administer OmniOS hosts running the Zoneweaver API.\n\n\
        Builds network topology graphs from datalinks, VNICs and zones, and\n\
        manages packages, boot environments, ZFS ARC and time settings.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Host profile to use
    #[arg(long, short = 'p', env = "ZW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 's', env = "ZW_SERVER", global = true)]
    pub server: Option<String>,

    /// Zoneweaver API key
    #[arg(long, env = "ZW_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZW_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ZW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ZW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the network topology graph
    #[command(alias = "topo", alias = "t")]
    Topology(TopologyArgs),

    /// Manage pkg(5) packages
    #[command(alias = "pkg")]
    Packages(PackagesArgs),

    /// Manage boot environments
    Be(BeArgs),

    /// View and tune the ZFS ARC
    Arc(ArcArgs),

    /// Time synchronization and timezone
    Time(TimeArgs),

    /// Manage package repositories (publishers)
    #[command(alias = "repo")]
    Repos(ReposArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Topology ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct TopologyArgs {
    #[command(subcommand)]
    pub command: Option<TopologyCommand>,

    #[command(flatten)]
    pub show: TopologyShowArgs,
}

#[derive(Debug, Subcommand)]
pub enum TopologyCommand {
    /// Render the graph (default)
    Show(TopologyShowArgs),

    /// List detected network design patterns
    Patterns {
        /// Read a saved inventory instead of querying the host
        #[arg(long, short = 'F')]
        from_file: Option<PathBuf>,
    },

    /// Dump the normalized network inventory (input for --from-file)
    Inventory,
}

#[derive(Debug, Clone, Args)]
pub struct TopologyShowArgs {
    /// Emphasis applied to nodes and edges
    #[arg(long)]
    pub view: Option<TopologyView>,

    /// Node placement algorithm
    #[arg(long)]
    pub layout: Option<TopologyLayout>,

    /// Hide a node kind (repeatable)
    #[arg(long, value_name = "KIND")]
    pub hide: Vec<NodeKindArg>,

    /// Keep only VNICs on these VLANs (repeatable)
    #[arg(long, value_name = "VID", value_parser = clap::value_parser!(u16).range(1..4095))]
    pub vlan: Vec<u16>,

    /// Keep only these zones (repeatable)
    #[arg(long, value_name = "ZONE")]
    pub zone: Vec<String>,

    /// Drop links with no traffic
    #[arg(long)]
    pub hide_idle: bool,

    /// Keep nodes with no remaining edges
    #[arg(long)]
    pub show_unattached: bool,

    /// Read a saved inventory instead of querying the host
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TopologyView {
    Physical,
    Logical,
    ZoneCentric,
    Bandwidth,
    Vlan,
    Troubleshoot,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TopologyLayout {
    Hierarchical,
    Force,
    Circular,
    Grid,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NodeKindArg {
    PhysicalNic,
    Aggregate,
    Etherstub,
    Vnic,
    Zone,
}

// ── Packages ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PackagesArgs {
    #[command(subcommand)]
    pub command: PackagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PackagesCommand {
    /// List installed packages
    #[command(alias = "ls")]
    List {
        /// Only packages whose name matches this pattern
        #[arg(long)]
        filter: Option<String>,
    },

    /// Search the configured repositories
    Search {
        /// Search query
        query: String,
    },

    /// Show package details
    Info {
        /// Package FMRI or name
        package: String,
    },

    /// Install packages
    Install(PackageChangeArgs),

    /// Uninstall packages
    #[command(alias = "rm")]
    Uninstall(PackageChangeArgs),
}

#[derive(Debug, Args)]
pub struct PackageChangeArgs {
    /// Package FMRIs or names
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Show what would change without changing anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Accept package licenses
    #[arg(long)]
    pub accept_licenses: bool,

    /// Name for the boot environment created by the operation
    #[arg(long)]
    pub be_name: Option<String>,
}

// ── Boot environments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BeArgs {
    #[command(subcommand)]
    pub command: BeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BeCommand {
    /// List boot environments
    #[command(alias = "ls")]
    List,

    /// Create a boot environment
    Create {
        /// New boot environment name
        name: String,

        /// Description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Clone from this boot environment
        #[arg(long, conflicts_with = "snapshot")]
        source: Option<String>,

        /// Clone from this snapshot
        #[arg(long)]
        snapshot: Option<String>,

        /// Activate after creation
        #[arg(long)]
        activate: bool,
    },

    /// Delete a boot environment
    #[command(alias = "rm")]
    Delete {
        name: String,

        /// Unmount if mounted
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Activate a boot environment for next boot
    Activate { name: String },

    /// Mount a boot environment
    Mount {
        name: String,

        /// Absolute mount path
        mountpoint: String,

        /// Shared filesystem mode (ro or rw)
        #[arg(long)]
        shared_mode: Option<String>,
    },

    /// Unmount a boot environment
    Unmount {
        name: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

// ── ZFS ARC ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ArcArgs {
    #[command(subcommand)]
    pub command: ArcCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArcCommand {
    /// Show current ARC configuration
    Show,

    /// Apply ARC tunables
    Set(ArcTuningArgs),

    /// Check ARC tunables without applying them
    Validate(ArcTuningArgs),

    /// Restore default ARC tunables
    Reset {
        #[arg(long, default_value = "both")]
        apply_method: ApplyMethodArg,
    },
}

#[derive(Debug, Args)]
pub struct ArcTuningArgs {
    /// Maximum ARC size in GB
    #[arg(long)]
    pub max_gb: Option<f64>,

    /// Minimum ARC size in GB
    #[arg(long)]
    pub min_gb: Option<f64>,

    /// Maximum ARC size as a percent of RAM
    #[arg(long)]
    pub max_percent: Option<f64>,

    /// Memory reserved for user processes, percent
    #[arg(long)]
    pub user_reserve_hint_pct: Option<f64>,

    #[arg(long)]
    pub vdev_max_pending: Option<u32>,

    /// Disable ZFS prefetch
    #[arg(long)]
    pub prefetch_disable: Option<bool>,

    #[arg(long, default_value = "both")]
    pub apply_method: ApplyMethodArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ApplyMethodArg {
    /// Live tunables only
    Runtime,
    /// /etc/system only
    Persistent,
    /// Both
    Both,
}

// ── Time ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TimeArgs {
    #[command(subcommand)]
    pub command: TimeCommand,
}

#[derive(Debug, Subcommand)]
pub enum TimeCommand {
    /// Time synchronization service status
    Status,

    /// Show the time sync configuration
    Config,

    /// Replace the time sync configuration
    SetConfig {
        /// Upstream servers (repeatable)
        #[arg(long = "server", value_name = "HOST", required_unless_present = "file")]
        servers: Vec<String>,

        /// Raw configuration file to upload
        #[arg(long, short = 'F')]
        file: Option<PathBuf>,

        /// Do not keep a backup of the current file
        #[arg(long)]
        no_backup: bool,

        /// Do not restart the service
        #[arg(long)]
        no_restart: bool,
    },

    /// Force an immediate sync
    Sync {
        /// Sync against this server instead of the configured ones
        #[arg(long)]
        server: Option<String>,
    },

    /// Show the system timezone
    Timezone,

    /// Change the system timezone
    SetTimezone { timezone: String },

    /// List known timezones
    Timezones,
}

// ── Repositories ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReposArgs {
    #[command(subcommand)]
    pub command: ReposCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReposCommand {
    /// List configured publishers
    #[command(alias = "ls")]
    List,

    /// Add a publisher
    Add {
        name: String,

        /// Origin URI
        #[arg(long)]
        origin: String,

        #[command(flatten)]
        options: RepoOptions,
    },

    /// Update a publisher
    Update {
        name: String,

        /// Replace the origin URI
        #[arg(long)]
        origin: Option<String>,

        #[command(flatten)]
        options: RepoOptions,
    },

    /// Remove a publisher
    #[command(alias = "rm")]
    Remove { name: String },
}

#[derive(Debug, Args)]
pub struct RepoOptions {
    /// Mirror URIs (repeatable)
    #[arg(long = "mirror", value_name = "URI")]
    pub mirrors: Vec<String>,

    #[arg(long)]
    pub enabled: Option<bool>,

    #[arg(long)]
    pub sticky: Option<bool>,

    /// Search this publisher first
    #[arg(long)]
    pub search_first: bool,

    /// Search before this publisher
    #[arg(long, value_name = "PUBLISHER")]
    pub search_before: Option<String>,

    /// Search after this publisher
    #[arg(long, value_name = "PUBLISHER")]
    pub search_after: Option<String>,

    #[arg(long)]
    pub proxy: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// List profiles
    Profiles,

    /// Set the default profile
    Use { name: String },

    /// Set a profile value
    Set { key: String, value: String },

    /// Store the active profile's API key in the system keyring
    SetKey,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
