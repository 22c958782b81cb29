use clap::Args;

use super::Session;
use super::search::{PeoplePage, render_people};
use crate::output::{OutputMode, Reply, render};

#[derive(Args, Debug)]
pub struct PeopleArgs {
    /// Maximum results, clamped to 1..=200.
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Results to skip.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

pub fn run_people(args: &PeopleArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    session.require_graph(output)?;
    let people = session.store.all_people(args.limit, args.offset);

    let message = format!(
        "people {}-{} of {}",
        args.offset.saturating_add(usize::from(!people.is_empty())),
        args.offset.saturating_add(people.len()),
        session.store.people_count()
    );
    render(output, &Reply::ok(message, PeoplePage { people }), render_people)
}
