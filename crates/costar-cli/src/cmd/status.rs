use std::io::Write;
use std::sync::Arc;

use clap::Args;
use costar_core::builder::CacheStatus;
use costar_core::cache::CacheError;
use costar_core::catalog::MemoryCatalog;
use serde::Serialize;

use super::Session;
use crate::output::{OutputMode, Reply, pretty_kv, pretty_section, render};

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    #[serde(flatten)]
    cache: CacheStatus,
    /// Why the snapshot could not be used, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem_code: Option<String>,
}

/// Report snapshot freshness. Never fails on a bad snapshot; the problem is
/// part of the report.
pub fn run_status(_args: &StatusArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let builder = session.builder(Arc::new(MemoryCatalog::new()));
    let problem = builder.try_load_cache().err();

    let mut cache = builder.status();
    if let Some(CacheError::Stale { built, .. }) = &problem {
        cache.last_build = Some(*built);
    }

    let result = StatusOutput {
        cache,
        problem_code: problem.as_ref().map(|e| e.code().code().to_string()),
        problem: problem.as_ref().map(ToString::to_string),
    };
    let message = if result.cache.should_rebuild {
        "rebuild required"
    } else {
        "snapshot is fresh"
    };
    render(output, &Reply::ok(message, result), render_human)
}

fn render_human(
    reply: &Reply<StatusOutput>,
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let s = &reply.data;
    let last_build = s
        .cache
        .last_build
        .map_or_else(|| "never".to_string(), |t| t.to_rfc3339());
    if mode == OutputMode::Text {
        return writeln!(
            w,
            "{}\t{last_build}\t{}",
            if s.cache.should_rebuild { "stale" } else { "fresh" },
            s.cache.snapshot_path.display()
        );
    }

    pretty_section(w, &format!("Cache: {}", reply.message))?;
    pretty_kv(w, "Snapshot", s.cache.snapshot_path.display().to_string())?;
    pretty_kv(w, "Last build", last_build)?;
    pretty_kv(w, "Refresh", format!("every {}h", s.cache.refresh_hours))?;
    if let Some(problem) = &s.problem {
        pretty_kv(w, "Problem", problem)?;
    }
    Ok(())
}
