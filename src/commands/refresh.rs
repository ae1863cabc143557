//! refresh - read every tracked resource and fold results into state

use anyhow::{Result, bail};
use cfapi::Session;
use colored::Colorize;
use declarative::{RefreshOptions, RefreshOutcome, RefreshTarget, ResourceRegistry, refresh_all};

use super::Context;
use crate::progress::RefreshBar;
use crate::ui;

pub fn run(
    ctx: &Context,
    session: &Session,
    registry: &ResourceRegistry<Session>,
    jobs: usize,
) -> Result<()> {
    let mut provider_state = ctx.load_state()?;

    let mut targets = Vec::with_capacity(provider_state.resources.len());
    let mut skipped = 0usize;
    for (addr, tracked) in &provider_state.resources {
        match registry.get(&tracked.resource_type) {
            Ok(resource) => targets.push(RefreshTarget {
                address: addr.clone(),
                resource,
                id: tracked.id.clone(),
            }),
            Err(e) => {
                log::warn!("Skipping {addr}: {e}");
                skipped += 1;
            }
        }
    }

    if targets.is_empty() {
        if !ctx.quiet {
            ui::info("Nothing to refresh");
        }
        return Ok(());
    }

    log::info!("Refreshing {} resource(s) with {} job(s)", targets.len(), jobs);
    let mut bar = RefreshBar::new(ctx.quiet);
    let (outcomes, summary) = refresh_all(session, &targets, &RefreshOptions { jobs }, &mut bar)?;

    for (addr, outcome) in outcomes {
        if !ctx.quiet {
            report(&addr, &outcome);
        }
        provider_state.apply_refresh(&addr, outcome);
    }
    ctx.save_state(&mut provider_state)?;

    if !ctx.quiet {
        println!();
        println!(
            "{} present, {} removed, {} failed{}",
            summary.present.to_string().green(),
            summary.absent.to_string().yellow(),
            summary.failed.to_string().red(),
            if skipped > 0 {
                format!(", {skipped} skipped")
            } else {
                String::new()
            }
        );
    }

    if !summary.is_success() {
        bail!("{} resource(s) could not be refreshed", summary.failed);
    }
    Ok(())
}

fn report(addr: &str, outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::Present(_) => ui::success(addr),
        RefreshOutcome::Absent => ui::warn(&format!("{addr} no longer exists; removed from state")),
        RefreshOutcome::Failed { error } => ui::error(&format!("{addr}: {error}")),
    }
}
