use std::io::Write;

use clap::Args;
use costar_core::error::ErrorCode;
use costar_core::model::{Media, Person};
use serde::Serialize;

use super::{Session, fail};
use crate::output::{CliError, OutputMode, Reply, pretty_kv, pretty_section, render};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Person id, or media id with `--media`.
    pub id: String,

    /// Look up a media item instead of a person.
    #[arg(long)]
    pub media: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Entity {
    Person(Person),
    Media(Media),
}

pub fn run_show(args: &ShowArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    session.require_graph(output)?;

    let entity = if args.media {
        session
            .store
            .get_media(&args.id)
            .map(|m| Entity::Media(m.as_ref().clone()))
    } else {
        session
            .store
            .get_person(&args.id)
            .map(|p| Entity::Person(p.as_ref().clone()))
    };

    let Some(entity) = entity else {
        let (what, code) = if args.media {
            ("media item", ErrorCode::MediaNotFound)
        } else {
            ("person", ErrorCode::PersonNotFound)
        };
        return fail(
            output,
            CliError::from_code(format!("{what} not found: {}", args.id), code),
        );
    };

    render(output, &Reply::ok("found", entity), render_human)
}

fn render_human(reply: &Reply<Entity>, mode: OutputMode, w: &mut dyn Write) -> std::io::Result<()> {
    match &reply.data {
        Entity::Person(person) => {
            if mode == OutputMode::Text {
                for link in person.media.values() {
                    writeln!(w, "{}\t{}\t{}\t{}", link.media_id, link.kind, link.name, link.role)?;
                }
                return Ok(());
            }
            pretty_section(w, &person.name)?;
            pretty_kv(w, "Id", &person.id)?;
            pretty_kv(w, "Credits", person.link_count().to_string())?;
            writeln!(w)?;
            for link in person.media.values() {
                let year = link.year.map(|y| format!(" ({y})")).unwrap_or_default();
                writeln!(w, "  {}{year}  {} [{}]", link.name, link.kind, link.role)?;
            }
        }
        Entity::Media(media) => {
            if mode == OutputMode::Text {
                for link in media.people.values() {
                    writeln!(w, "{}\t{}\t{}", link.person_id, link.name, link.role)?;
                }
                return Ok(());
            }
            pretty_section(w, &media.name)?;
            pretty_kv(w, "Id", &media.id)?;
            pretty_kv(w, "Kind", media.kind.as_str())?;
            if let Some(year) = media.year {
                pretty_kv(w, "Year", year.to_string())?;
            }
            writeln!(w)?;
            for link in media.people.values() {
                writeln!(w, "  {}  [{}]", link.name, link.role)?;
            }
        }
    }
    Ok(())
}
