//! create / read / delete / import
//!
//! State changes mirror what an engine does with each result: record on
//! create, refresh or forget on read, forget on delete, record the
//! passthrough id and read it back on import.

use anyhow::{Context as AnyhowContext, Result, bail};
use cfapi::Session;
use declarative::{Attributes, ResourceRegistry};

use super::Context;
use crate::state::{self, ProviderState};
use crate::ui;

pub fn create(
    ctx: &Context,
    session: &Session,
    registry: &ResourceRegistry<Session>,
    resource_type: &str,
    name: &str,
    attrs: Vec<(String, String)>,
) -> Result<()> {
    let resource = registry.get(resource_type)?;
    let addr = state::address(resource_type, name);

    let mut provider_state = ctx.load_state()?;
    if provider_state.get(&addr).is_some() {
        bail!("{addr} is already tracked; delete it first or pick another name");
    }

    let attrs: Attributes = attrs.into_iter().collect();
    let data = resource
        .create(session, &attrs)
        .with_context(|| format!("Failed to create {addr}"))?;

    log::info!("Created {} with id {}", addr, data.id);
    let id = data.id.clone();
    provider_state.track(&addr, resource_type, data);
    ctx.save_state(&mut provider_state)?;

    if !ctx.quiet {
        ui::success(&format!("Created {addr} ({id})"));
    }
    Ok(())
}

pub fn read(
    ctx: &Context,
    session: &Session,
    registry: &ResourceRegistry<Session>,
    addr: &str,
) -> Result<()> {
    state::parse_address(addr)?;
    let mut provider_state = ctx.load_state()?;
    let tracked = provider_state.require(addr)?.clone();
    let resource = registry.get(&tracked.resource_type)?;

    let data = resource
        .read(session, &tracked.id)
        .with_context(|| format!("Failed to read {addr}; state left unchanged"))?;

    let present = provider_state.apply_read(addr, data);
    ctx.save_state(&mut provider_state)?;

    if ctx.quiet {
        return Ok(());
    }
    if present {
        ui::success(&format!("{addr} is present"));
        if let Some(entry) = provider_state.get(addr) {
            print_entry(&entry.id, &entry.attributes);
        }
    } else {
        ui::warn(&format!(
            "{addr} ({}) no longer exists; removed from state",
            tracked.id
        ));
    }
    Ok(())
}

pub fn delete(
    ctx: &Context,
    session: &Session,
    registry: &ResourceRegistry<Session>,
    addr: &str,
    yes: bool,
) -> Result<()> {
    state::parse_address(addr)?;
    let mut provider_state = ctx.load_state()?;
    let tracked = provider_state.require(addr)?.clone();
    let resource = registry.get(&tracked.resource_type)?;

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete {addr} ({})?", tracked.id))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            ui::info("Aborted");
            return Ok(());
        }
    }

    resource
        .delete(session, &tracked.id)
        .with_context(|| format!("Failed to delete {addr}"))?;

    provider_state.forget(addr);
    ctx.save_state(&mut provider_state)?;

    if !ctx.quiet {
        ui::success(&format!("Deleted {addr}"));
    }
    Ok(())
}

pub fn import(
    ctx: &Context,
    session: &Session,
    registry: &ResourceRegistry<Session>,
    resource_type: &str,
    name: &str,
    id: &str,
    verify: bool,
) -> Result<()> {
    let resource = registry.get(resource_type)?;
    let addr = state::address(resource_type, name);

    let mut provider_state = ctx.load_state()?;
    if provider_state.get(&addr).is_some() {
        bail!("{addr} is already tracked");
    }

    let present = if verify {
        // import_verified has already read the link back
        let data = resource.import_verified(session, id)?;
        provider_state.track(&addr, resource_type, data);
        ctx.save_state(&mut provider_state)?;
        true
    } else {
        let data = resource.import(session, id)?;
        provider_state.track(&addr, resource_type, data);
        let refreshed = follow_up_read(session, registry, &mut provider_state, &addr);
        ctx.save_state(&mut provider_state)?;
        refreshed?
    };

    if !ctx.quiet {
        if present {
            ui::success(&format!("Imported {addr} ({id})"));
        } else {
            ui::warn(&format!("{addr} ({id}) does not exist; nothing imported"));
        }
    }
    Ok(())
}

/// Read a freshly imported entry back, exactly as the engine would
fn follow_up_read(
    session: &Session,
    registry: &ResourceRegistry<Session>,
    provider_state: &mut ProviderState,
    addr: &str,
) -> Result<bool> {
    let tracked = provider_state.require(addr)?.clone();
    let resource = registry.get(&tracked.resource_type)?;
    let data = resource
        .read(session, &tracked.id)
        .with_context(|| format!("Imported {addr} but could not read it back"))?;
    Ok(provider_state.apply_read(addr, data))
}

fn print_entry(id: &str, attrs: &Attributes) {
    ui::kv("id", id);
    for (key, value) in attrs {
        ui::kv(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::resources;
    use cfapi::DomainManager;

    const ADDR: &str = "cf_private_domain_access.shared";

    fn pair() -> Vec<(String, String)> {
        vec![
            ("org".to_string(), "org-1".to_string()),
            ("domain".to_string(), "domain-1".to_string()),
        ]
    }

    #[test]
    fn test_create_records_state() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();

        create(&ctx, &session, &registry, "cf_private_domain_access", "shared", pair()).unwrap();

        let state = ctx.load_state().unwrap();
        let entry = state.require(ADDR).unwrap();
        assert_eq!(entry.id, "org-1/domain-1");
        assert_eq!(entry.attributes.get("org").map(String::as_str), Some("org-1"));
        assert!(mock.has_private_domain_access("org-1", "domain-1").unwrap());
    }

    #[test]
    fn test_failed_create_records_nothing() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();
        mock.set_unavailable(true);

        assert!(
            create(&ctx, &session, &registry, "cf_private_domain_access", "shared", pair())
                .is_err()
        );
        assert!(ctx.load_state().unwrap().get(ADDR).is_none());
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let (_dir, ctx) = testing::context();
        let (_mock, session) = testing::session();
        let err = create(&ctx, &session, &resources::registry(), "cf_app", "x", vec![])
            .unwrap_err();
        assert!(err.to_string().contains("cf_app"));
    }

    #[test]
    fn test_read_forgets_vanished_resource() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();
        create(&ctx, &session, &registry, "cf_private_domain_access", "shared", pair()).unwrap();

        mock.delete_private_domain_access("org-1", "domain-1").unwrap();
        read(&ctx, &session, &registry, ADDR).unwrap();
        assert!(ctx.load_state().unwrap().get(ADDR).is_none());
    }

    #[test]
    fn test_read_failure_keeps_state() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();
        create(&ctx, &session, &registry, "cf_private_domain_access", "shared", pair()).unwrap();

        mock.set_unavailable(true);
        assert!(read(&ctx, &session, &registry, ADDR).is_err());
        assert_eq!(
            ctx.load_state().unwrap().require(ADDR).unwrap().id,
            "org-1/domain-1"
        );
    }

    #[test]
    fn test_delete_forgets() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();
        create(&ctx, &session, &registry, "cf_private_domain_access", "shared", pair()).unwrap();

        delete(&ctx, &session, &registry, ADDR, true).unwrap();
        assert!(ctx.load_state().unwrap().get(ADDR).is_none());
        assert!(!mock.has_private_domain_access("org-1", "domain-1").unwrap());
    }

    #[test]
    fn test_import_then_read_fills_attributes() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();
        mock.create_private_domain_access("org-1", "domain-1").unwrap();

        import(
            &ctx,
            &session,
            &registry,
            "cf_private_domain_access",
            "shared",
            "org-1/domain-1",
            false,
        )
        .unwrap();

        let state = ctx.load_state().unwrap();
        let entry = state.require(ADDR).unwrap();
        assert_eq!(entry.attributes.get("domain").map(String::as_str), Some("domain-1"));
    }

    #[test]
    fn test_import_verified_reads_once() {
        let (_dir, ctx) = testing::context();
        let (mock, session) = testing::session();
        let registry = resources::registry();
        mock.create_private_domain_access("org-1", "domain-1").unwrap();
        let before = mock.call_count();

        import(
            &ctx,
            &session,
            &registry,
            "cf_private_domain_access",
            "shared",
            "org-1/domain-1",
            true,
        )
        .unwrap();

        assert_eq!(mock.call_count() - before, 1);
        let state = ctx.load_state().unwrap();
        let entry = state.require(ADDR).unwrap();
        assert_eq!(entry.id, "org-1/domain-1");
        assert_eq!(entry.attributes.get("org").map(String::as_str), Some("org-1"));
        assert_eq!(entry.attributes.get("domain").map(String::as_str), Some("domain-1"));
    }

    #[test]
    fn test_import_of_absent_relationship_is_dropped() {
        let (_dir, ctx) = testing::context();
        let (_mock, session) = testing::session();
        let registry = resources::registry();

        import(
            &ctx,
            &session,
            &registry,
            "cf_private_domain_access",
            "shared",
            "org-1/domain-1",
            false,
        )
        .unwrap();
        assert!(ctx.load_state().unwrap().get(ADDR).is_none());
    }

    #[test]
    fn test_import_verified_rejects_absent() {
        let (_dir, ctx) = testing::context();
        let (_mock, session) = testing::session();
        let err = import(
            &ctx,
            &session,
            &resources::registry(),
            "cf_private_domain_access",
            "shared",
            "org-1/domain-1",
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist remotely"));
    }

    #[test]
    fn test_import_malformed_id() {
        let (_dir, ctx) = testing::context();
        let (_mock, session) = testing::session();
        let err = import(
            &ctx,
            &session,
            &resources::registry(),
            "cf_private_domain_access",
            "shared",
            "not-a-valid-id",
            false,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to parse ID 'not-a-valid-id', expected format is '<org-guid>/<domain-guid>'"
        );
        assert!(ctx.load_state().unwrap().get(ADDR).is_none());
    }
}
