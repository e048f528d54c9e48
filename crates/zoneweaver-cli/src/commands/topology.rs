//! Topology command handlers.
//!
//! Works against a live host or, with `--from-file`, against an inventory
//! saved earlier by `zw topology inventory -o json`.

use tabled::Tabled;
use zoneweaver_core::topology::color::format_mbps;
use zoneweaver_core::topology::{GraphEdge, GraphNode, NodeKind, Pattern};
use zoneweaver_core::{
    GraphOptions, Host, Inventory, LayoutType, Topology, TopologyFilters, ViewType, compute_graph,
};

use crate::cli::{
    GlobalOpts, NodeKindArg, OutputFormat, TopologyArgs, TopologyCommand, TopologyLayout,
    TopologyShowArgs, TopologyView,
};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Argument mapping ────────────────────────────────────────────────

fn map_view(view: TopologyView) -> ViewType {
    match view {
        TopologyView::Physical => ViewType::Physical,
        TopologyView::Logical => ViewType::Logical,
        TopologyView::ZoneCentric => ViewType::ZoneCentric,
        TopologyView::Bandwidth => ViewType::Bandwidth,
        TopologyView::Vlan => ViewType::Vlan,
        TopologyView::Troubleshoot => ViewType::Troubleshoot,
    }
}

fn map_layout(layout: TopologyLayout) -> LayoutType {
    match layout {
        TopologyLayout::Hierarchical => LayoutType::Hierarchical,
        TopologyLayout::Force => LayoutType::Force,
        TopologyLayout::Circular => LayoutType::Circular,
        TopologyLayout::Grid => LayoutType::Grid,
    }
}

fn map_kind(kind: NodeKindArg) -> NodeKind {
    match kind {
        NodeKindArg::PhysicalNic => NodeKind::PhysicalNic,
        NodeKindArg::Aggregate => NodeKind::Aggregate,
        NodeKindArg::Etherstub => NodeKind::Etherstub,
        NodeKindArg::Vnic => NodeKind::Vnic,
        NodeKindArg::Zone => NodeKind::Zone,
    }
}

/// Flags win; the profile and `[defaults]` fill in view and layout.
fn graph_options(args: &TopologyShowArgs, defaults: (ViewType, LayoutType)) -> GraphOptions {
    let mut filters = TopologyFilters {
        vlans: args.vlan.clone(),
        zones: args.zone.clone(),
        show_idle_links: !args.hide_idle,
        show_unattached_nodes: args.show_unattached,
        ..TopologyFilters::default()
    };
    for kind in &args.hide {
        filters.node_types.set(map_kind(*kind), false);
    }

    GraphOptions {
        view: args.view.map_or(defaults.0, map_view),
        layout: args.layout.map_or(defaults.1, map_layout),
        filters,
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Over")]
    over: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Traffic")]
    traffic: String,
    #[tabled(rename = "Alert")]
    alert: String,
}

fn node_row(node: &GraphNode, color: bool) -> NodeRow {
    let data = &node.data;
    let state = data
        .link_state
        .map(|s| s.to_string())
        .or_else(|| data.zone_state.map(|s| s.to_string()))
        .unwrap_or_else(|| "-".into());
    NodeRow {
        id: node.id.clone(),
        kind: node.kind.to_string(),
        state: output::paint_state(&state, color),
        over: util::or_dash(data.over.as_deref()),
        zone: util::or_dash(data.zone.as_deref()),
        vlan: data
            .vlan_id
            .map_or_else(|| "-".into(), |v| v.to_string()),
        traffic: if data.bandwidth.total_mbps > 0.0 {
            format_mbps(data.bandwidth.total_mbps)
        } else {
            output::paint_muted("idle", color)
        },
        alert: util::or_dash(data.alert_message.as_deref()),
    }
}

#[derive(Tabled)]
struct EdgeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

impl From<&GraphEdge> for EdgeRow {
    fn from(e: &GraphEdge) -> Self {
        Self {
            id: e.id.clone(),
            kind: e.data.kind.to_string(),
            source: e.source.clone(),
            target: e.target.clone(),
            rate: format_mbps(e.data.bandwidth.total_mbps),
        }
    }
}

#[derive(Tabled)]
struct PatternRow {
    #[tabled(rename = "Pattern")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Pattern> for PatternRow {
    fn from(p: &Pattern) -> Self {
        Self {
            kind: p.kind.to_string(),
            count: p.count,
            description: p.description.clone(),
        }
    }
}

fn topology_table(topo: &Topology, color: bool) -> String {
    let nodes: Vec<NodeRow> = topo.nodes.iter().map(|n| node_row(n, color)).collect();
    let edges: Vec<EdgeRow> = topo.edges.iter().map(EdgeRow::from).collect();

    let mut sections = vec![
        format!("Nodes ({})", topo.nodes.len()),
        output::render_table(&nodes),
        format!("Edges ({})", topo.edges.len()),
        output::render_table(&edges),
    ];
    if !topo.patterns.is_empty() {
        let names: Vec<String> = topo.patterns.iter().map(|p| p.kind.to_string()).collect();
        sections.push(format!("Patterns: {}", names.join(", ")));
    }
    sections.join("\n")
}

fn inventory_detail(inv: &Inventory) -> String {
    [
        format!("Physical NICs: {}", inv.physical_nics.len()),
        format!("Aggregates:    {}", inv.aggregates.len()),
        format!("Etherstubs:    {}", inv.etherstubs.len()),
        format!("VNICs:         {}", inv.vnics.len()),
        format!("Zones:         {}", inv.zones.len()),
        format!("Samples:       {}", inv.bandwidth.len()),
        format!("Addresses:     {}", inv.ip_addresses.len()),
        format!("Routes:        {}", inv.routes.len()),
        format!(
            "Collected:     {}",
            inv.collected_at
                .map_or_else(|| "-".into(), |t| t.to_rfc3339())
        ),
    ]
    .join("\n")
}

// ── Inventory source ────────────────────────────────────────────────

async fn fetch_inventory(global: &GlobalOpts, cfg: &Config) -> Result<Inventory, CliError> {
    let host_config = config::build_host_config(global, cfg)?;
    let host = Host::new(host_config);
    host.connect().await?;

    let bar = util::spinner("Collecting network inventory", global);
    let result = host.refresh_inventory().await;
    bar.finish_and_clear();
    host.disconnect().await;

    Ok(result?.as_ref().clone())
}

async fn load_inventory(
    from_file: Option<&std::path::Path>,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<Inventory, CliError> {
    match from_file {
        Some(path) => util::read_inventory_file(path),
        None => fetch_inventory(global, cfg).await,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: TopologyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let color = output::should_color(global.color);

    match args.command {
        None => show(&args.show, global, &cfg, color).await,
        Some(TopologyCommand::Show(show_args)) => show(&show_args, global, &cfg, color).await,

        Some(TopologyCommand::Patterns { from_file }) => {
            let inventory = load_inventory(from_file.as_deref(), global, &cfg).await?;
            let topo = compute_graph(&inventory, &GraphOptions::default());
            let out = output::render_list(
                global.output,
                &topo.patterns,
                |p| PatternRow::from(p),
                |p| p.kind.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        Some(TopologyCommand::Inventory) => {
            let inventory = fetch_inventory(global, &cfg).await?;
            let out = output::render_single(global.output, &inventory, inventory_detail, |inv| {
                inv.physical_nics
                    .iter()
                    .map(|n| n.link.as_str())
                    .chain(inv.aggregates.iter().map(|a| a.link.as_str()))
                    .chain(inv.etherstubs.iter().map(|e| e.link.as_str()))
                    .chain(inv.vnics.iter().map(|v| v.link.as_str()))
                    .chain(inv.zones.iter().map(|z| z.name.as_str()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn show(
    args: &TopologyShowArgs,
    global: &GlobalOpts,
    cfg: &Config,
    color: bool,
) -> Result<(), CliError> {
    let options = graph_options(args, config::graph_defaults(global, cfg));
    let inventory = load_inventory(args.from_file.as_deref(), global, cfg).await?;

    tracing::debug!(
        view = %options.view,
        layout = %options.layout,
        nodes = inventory.node_count(),
        "computing topology"
    );
    let topo = compute_graph(&inventory, &options);

    let out = match global.output {
        OutputFormat::Table => topology_table(&topo, color),
        OutputFormat::Plain => topo
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_single(format, &topo, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
