use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use costar_core::builder::BuildReport;
use costar_core::catalog::MemoryCatalog;
use costar_core::error::ErrorCode;
use serde::Serialize;

use super::{Session, fail};
use crate::output::{CliError, OutputMode, Reply, pretty_kv, pretty_section, render};

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Catalog export (JSON) to build the graph from.
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Keep a fresh snapshot instead of rebuilding.
    #[arg(long)]
    pub if_stale: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildOutput {
    rebuilt: bool,
    people_count: usize,
    media_count: usize,
    connection_count: usize,
    items_processed: usize,
    items_skipped: usize,
    snapshot_saved: bool,
    snapshot_path: PathBuf,
    elapsed_ms: u64,
}

impl BuildOutput {
    fn from_report(report: &BuildReport, snapshot_path: PathBuf) -> Self {
        Self {
            rebuilt: true,
            people_count: report.people_count,
            media_count: report.media_count,
            connection_count: report.connection_count,
            items_processed: report.items_processed,
            items_skipped: report.items_skipped,
            snapshot_saved: report.snapshot_saved,
            snapshot_path,
            elapsed_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

pub fn run_build(args: &BuildArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let catalog = match MemoryCatalog::from_json_file(&args.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            return fail(
                output,
                CliError::from_code(format!("{e:#}"), ErrorCode::CatalogUnavailable),
            );
        }
    };

    let builder = session.builder(Arc::new(catalog));
    let snapshot_path = builder.snapshot_path().to_path_buf();

    if args.if_stale && builder.load_cache() {
        let stats = session.store.stats();
        let result = BuildOutput {
            rebuilt: false,
            people_count: stats.people_count,
            media_count: stats.media_count,
            connection_count: stats.connection_count,
            items_processed: 0,
            items_skipped: 0,
            snapshot_saved: false,
            snapshot_path,
            elapsed_ms: 0,
        };
        let reply = Reply::ok("snapshot is fresh; build skipped", result);
        return render(output, &reply, render_human);
    }

    let report = match builder.build_graph() {
        Ok(report) => report,
        Err(e) => return fail(output, CliError::from_code(e.to_string(), e.code())),
    };

    let reply = Reply::ok(
        "graph built",
        BuildOutput::from_report(&report, snapshot_path),
    );
    render(output, &reply, render_human)
}

fn render_human(
    reply: &Reply<BuildOutput>,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let r = &reply.data;
    if mode == OutputMode::Text {
        return writeln!(
            w,
            "people={} media={} connections={} skipped={} saved={}",
            r.people_count, r.media_count, r.connection_count, r.items_skipped, r.snapshot_saved
        );
    }

    pretty_section(w, &format!("Build: {}", reply.message))?;
    pretty_kv(w, "People", r.people_count.to_string())?;
    pretty_kv(w, "Media", r.media_count.to_string())?;
    pretty_kv(w, "Connections", r.connection_count.to_string())?;
    if r.rebuilt {
        pretty_kv(w, "Items", r.items_processed.to_string())?;
        pretty_kv(w, "Skipped", r.items_skipped.to_string())?;
        pretty_kv(w, "Elapsed", format!("{}ms", r.elapsed_ms))?;
    }
    pretty_kv(w, "Snapshot", r.snapshot_path.display().to_string())?;
    if r.rebuilt && !r.snapshot_saved {
        writeln!(w, "warning: snapshot was not saved; queries will need a rebuild")?;
    }
    Ok(())
}
