use std::io::Write;

use clap::Args;
use costar_core::model::PersonSummary;
use serde::Serialize;

use super::Session;
use crate::output::{OutputMode, Reply, pretty_section, render};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Case-insensitive substring of a person's name.
    pub query: String,

    /// Maximum results, clamped to 1..=100.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Results to skip.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

/// A page of people, shared with `costar people`.
#[derive(Debug, Serialize)]
pub struct PeoplePage {
    pub people: Vec<PersonSummary>,
}

pub fn run_search(args: &SearchArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    session.require_graph(output)?;
    let people = session.store.search_people(&args.query, args.limit, args.offset);

    let message = format!("{} people match {:?}", people.len(), args.query.trim());
    render(output, &Reply::ok(message, PeoplePage { people }), render_people)
}

/// Human rendering for a page of people.
pub fn render_people(
    reply: &Reply<PeoplePage>,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let people = &reply.data.people;
    if mode == OutputMode::Text {
        for p in people {
            writeln!(w, "{}\t{}\t{}", p.id, p.name, p.connection_count)?;
        }
        return Ok(());
    }

    pretty_section(w, &reply.message)?;
    for p in people {
        writeln!(w, "{:<32} {:>5} credits  {}", p.name, p.connection_count, p.id)?;
    }
    Ok(())
}
