use std::io::Write;

use clap::Args;
use costar_core::path::{MAX_NEIGHBOR_DEGREE, MAX_NEIGHBOR_NODES, Neighborhood, NodeType};

use super::{Session, fail};
use crate::output::{CliError, OutputMode, Reply, pretty_kv, pretty_section, render};

#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Person id at the center of the neighborhood.
    pub id: String,

    /// Person hops to expand, clamped to 1..=6 [default: query.neighbor_degree].
    #[arg(long)]
    pub degree: Option<usize>,

    /// Node cap, clamped to 1..=1000 [default: query.max_nodes].
    #[arg(long)]
    pub max_nodes: Option<usize>,
}

pub fn run_neighbors(
    args: &NeighborsArgs,
    output: OutputMode,
    session: &Session,
) -> anyhow::Result<()> {
    session.require_graph(output)?;
    let query = &session.config.query;
    let degree = args
        .degree
        .unwrap_or(query.neighbor_degree)
        .clamp(1, MAX_NEIGHBOR_DEGREE);
    let max_nodes = args
        .max_nodes
        .unwrap_or(query.max_nodes)
        .clamp(1, MAX_NEIGHBOR_NODES);

    let hood = match session.engine().neighbors(&args.id, degree, max_nodes) {
        Ok(hood) => hood,
        Err(e) => return fail(output, CliError::from_code(e.to_string(), e.code())),
    };

    let message = format!(
        "{} nodes and {} edges within {degree} degrees",
        hood.nodes.len(),
        hood.edges.len()
    );
    render(output, &Reply::ok(message, hood), render_human)
}

fn render_human(
    reply: &Reply<Neighborhood>,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let hood = &reply.data;
    if mode == OutputMode::Text {
        for node in &hood.nodes {
            let kind = match node.node_type {
                NodeType::Person => "person",
                NodeType::Media => "media",
            };
            writeln!(w, "{}\t{kind}\t{}\t{}", node.depth, node.id, node.name)?;
        }
        return Ok(());
    }

    pretty_section(w, &format!("Neighborhood: {}", reply.message))?;
    pretty_kv(w, "Truncated", hood.truncated.to_string())?;
    pretty_kv(w, "Visited", hood.nodes_visited.to_string())?;
    writeln!(w)?;
    for node in &hood.nodes {
        let indent = "  ".repeat(node.depth);
        match (node.node_type, node.media_kind) {
            (NodeType::Media, Some(kind)) => {
                writeln!(w, "{indent}{} ({kind})", node.name)?;
            }
            _ => writeln!(w, "{indent}{}", node.name)?,
        }
    }
    Ok(())
}
