//! Show effective configuration

use anyhow::Result;

use crate::Context;
use crate::config::{self, Settings};
use crate::ui;

pub fn show(ctx: &Context) -> Result<()> {
    let file = config::config_file()?;
    let settings = Settings::load_from(&file)?;
    let http = settings.http_config(ctx.url.as_deref(), ctx.token.as_deref());

    ui::header("Configuration");
    let file_note = if file.exists() { "" } else { " (not found, using defaults)" };
    ui::kv("Config file", &format!("{}{}", file.display(), file_note));
    ui::kv("API URL", &http.url);
    ui::kv("Token", if http.token.is_some() { "set" } else { "not set" });
    if let Some(timeout) = http.timeout {
        ui::kv("Timeout", &format!("{}s", timeout.as_secs()));
    }
    ui::kv(
        "State file",
        &settings.state_path(ctx.state.as_deref())?.display().to_string(),
    );
    ui::kv("Manifest", &ctx.manifest.display().to_string());

    if http.token.is_none() {
        ui::warn("No token configured; set OCM_TOKEN or api.token in the config file");
    }
    Ok(())
}
