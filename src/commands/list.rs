//! list / types

use anyhow::{Context as AnyhowContext, Result};
use cfapi::Session;
use colored::Colorize;
use declarative::ResourceRegistry;

use super::Context;
use crate::ui;

/// Show tracked resources
pub fn tracked(ctx: &Context, json: bool) -> Result<()> {
    let provider_state = ctx.load_state()?;

    if json {
        let out = serde_json::to_string_pretty(&provider_state.resources)
            .context("Failed to serialize state")?;
        println!("{out}");
        return Ok(());
    }

    if provider_state.resources.is_empty() {
        ui::info("No resources tracked");
        return Ok(());
    }

    ui::header(&format!("Tracked resources ({})", provider_state.resources.len()));
    for (addr, entry) in &provider_state.resources {
        println!(
            "  {:<48} {}",
            addr.bold(),
            ui::truncate(&entry.id, 80).dimmed()
        );
        if ctx.verbose > 0 {
            for (key, value) in &entry.attributes {
                ui::kv(&format!("  {key}"), value);
            }
            ui::kv(
                "  updated",
                &entry.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            );
        }
    }
    Ok(())
}

/// Show registered resource types
pub fn types(registry: &ResourceRegistry<Session>) {
    ui::header("Resource types");
    for resource in registry.iter() {
        println!("  {}", resource.resource_type().bold());
        ui::dim(&resource.description());
        ui::kv("id", &resource.id_format());
        let attrs: Vec<String> = resource
            .schema()
            .iter()
            .map(|attr| {
                let mut flags = Vec::new();
                if attr.required {
                    flags.push("required");
                }
                if attr.force_new {
                    flags.push("forces new");
                }
                format!("{} ({})", attr.name, flags.join(", "))
            })
            .collect();
        ui::kv("attributes", &attrs.join("; "));
    }
}
