//! Show stored state

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{Address, Instance};
use std::collections::BTreeMap;

use crate::Context;
use crate::config::Settings;
use crate::state::ProvisionerState;
use crate::ui;

pub fn run(ctx: &Context, address: Option<&str>, json: bool) -> Result<()> {
    let path = Settings::load()?.state_path(ctx.state.as_deref())?;
    let state = ProvisionerState::load(&path)?;
    let selected = select(&state.resources, address)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    if selected.is_empty() {
        ui::info("No resources in state");
        return Ok(());
    }

    match address {
        Some(_) => {
            for (address, instance) in &selected {
                print_instance(address, instance);
            }
        }
        None => print_table(&selected),
    }

    if ctx.verbose > 0 {
        ui::dim(&format!(
            "State {} (updated {})",
            path.display(),
            state.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    Ok(())
}

fn select<'a>(
    resources: &'a BTreeMap<Address, Instance>,
    address: Option<&str>,
) -> Result<BTreeMap<&'a Address, &'a Instance>> {
    let Some(address) = address else {
        return Ok(resources.iter().collect());
    };

    let address: Address = address.parse()?;
    match resources.get_key_value(&address) {
        Some(entry) => Ok(BTreeMap::from([entry])),
        None => bail!("{address} is not in state"),
    }
}

fn print_table(resources: &BTreeMap<&Address, &Instance>) {
    ui::header("Managed Resources");
    println!(
        "  {:<36} {:<34} {:<10} {}",
        "ADDRESS".dimmed(),
        "ID".dimmed(),
        "STATUS".dimmed(),
        "ISSUER".dimmed()
    );

    for (address, instance) in resources {
        let status = if instance.lifecycle.is_incomplete() {
            instance.lifecycle.to_string().yellow()
        } else {
            instance.lifecycle.to_string().green()
        };
        println!(
            "  {:<36} {:<34} {:<10} {}",
            ui::truncate(&address.to_string(), 36),
            instance.id,
            status,
            instance.str_attr("issuer_url").unwrap_or("-")
        );
    }
}

fn print_instance(address: &Address, instance: &Instance) {
    ui::section(&address.to_string());
    ui::kv("id", &instance.id);
    ui::kv("lifecycle", instance.lifecycle.as_str());
    for (name, value) in &instance.attributes {
        ui::kv(name, &value.to_string());
    }
}
