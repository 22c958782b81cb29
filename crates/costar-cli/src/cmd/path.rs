use std::io::Write;

use clap::Args;
use costar_core::path::{NodeType, ShortestPath};

use super::{Session, fail};
use crate::output::{CliError, OutputMode, Reply, pretty_section, render};

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Person id to start from.
    pub from: String,

    /// Person id to reach.
    pub to: String,

    /// Maximum person-to-person hops to search [default: query.max_depth].
    #[arg(long)]
    pub max_depth: Option<usize>,
}

pub fn run_path(args: &PathArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    session.require_graph(output)?;
    let max_depth = args.max_depth.unwrap_or(session.config.query.max_depth);

    let found = match session
        .engine()
        .shortest_path(&args.from, &args.to, max_depth)
    {
        Ok(found) => found,
        Err(e) => return fail(output, CliError::from_code(e.to_string(), e.code())),
    };

    let message = format!("found path with {} degrees of separation", found.degrees);
    render(output, &Reply::ok(message, found), render_human)
}

fn render_human(
    reply: &Reply<ShortestPath>,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let found = &reply.data;
    if mode == OutputMode::Text {
        for node in &found.path {
            let kind = match node.node_type {
                NodeType::Person => "person",
                NodeType::Media => "media",
            };
            writeln!(
                w,
                "{kind}\t{}\t{}\t{}",
                node.id,
                node.name,
                node.role.as_deref().unwrap_or("")
            )?;
        }
        return Ok(());
    }

    pretty_section(
        w,
        &format!(
            "{} degrees ({} people visited, {}ms)",
            found.degrees,
            found.nodes_visited,
            found.elapsed.as_millis()
        ),
    )?;
    for node in &found.path {
        match node.node_type {
            NodeType::Person => writeln!(w, "{}", node.name)?,
            NodeType::Media => {
                let year = node.year.map(|y| format!(" ({y})")).unwrap_or_default();
                let role = node
                    .role
                    .as_deref()
                    .map(|r| format!(" [{r}]"))
                    .unwrap_or_default();
                writeln!(w, "  └─ {}{year}{role}", node.name)?;
            }
        }
    }
    Ok(())
}
