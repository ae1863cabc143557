//! verify-destroyed / verify-exists / verify-gone

use anyhow::Result;
use cfapi::Session;
use declarative::ResourceRegistry;

use super::Context;
use crate::ui;
use crate::verify;

pub fn destroyed(ctx: &Context, session: &Session, space: &str, names: &[String]) -> Result<()> {
    verify::check_service_instances_destroyed(session, names, space)?;
    if !ctx.quiet {
        ui::success(&format!(
            "{} service instance(s) gone from space {space}",
            names.len()
        ));
    }
    Ok(())
}

pub fn exists(ctx: &Context, session: &Session, addr: &str) -> Result<()> {
    let provider_state = ctx.load_state()?;
    let instance = verify::check_service_instance_exists(session, &provider_state, addr)?;
    if !ctx.quiet {
        ui::success(&format!("{addr} exists"));
        ui::kv("name", &instance.name);
        ui::kv("space", &instance.space_guid);
        ui::kv("plan", &instance.service_plan_guid);
    }
    Ok(())
}

pub fn gone(
    ctx: &Context,
    session: &Session,
    registry: &ResourceRegistry<Session>,
    resource_type: &str,
    id: &str,
) -> Result<()> {
    let resource = registry.get(resource_type)?;
    verify::check_relationship_destroyed(session, resource, id)?;
    if !ctx.quiet {
        ui::success(&format!("{resource_type} '{id}' is gone"));
    }
    Ok(())
}
