use std::io::Write;

use clap::Args;
use costar_core::store::GraphStats;

use super::Session;
use crate::output::{OutputMode, Reply, pretty_kv, pretty_section, render};

#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

pub fn run_stats(_args: &StatsArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    session.require_graph(output)?;
    let stats = session.store.stats();
    render(output, &Reply::ok("graph statistics", stats), render_human)
}

fn render_human(
    reply: &Reply<GraphStats>,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let s = &reply.data;
    if mode == OutputMode::Text {
        return writeln!(
            w,
            "people={} media={} connections={} avg={:.2}",
            s.people_count, s.media_count, s.connection_count, s.average_connections_per_person
        );
    }

    pretty_section(w, "Graph")?;
    pretty_kv(w, "People", s.people_count.to_string())?;
    pretty_kv(w, "Media", s.media_count.to_string())?;
    pretty_kv(w, "Connections", s.connection_count.to_string())?;
    pretty_kv(
        w,
        "Avg credits",
        format!("{:.2}", s.average_connections_per_person),
    )
}
