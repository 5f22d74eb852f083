use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use serde::Serialize;
use sopline_core::config::{
    EffectiveConfig, ProjectConfig, UserConfig, project_config_path, resolve_config, user_config_path,
};
use std::io::{self, Write};
use std::path::Path;
use toml::Value;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show the raw project config file only
    #[arg(long, conflicts_with = "user")]
    project: bool,

    /// Show the raw user config file only
    #[arg(long)]
    user: bool,
}

pub fn run_config(args: &ConfigArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    if args.project {
        let value = load_toml_table(&project_config_path(project_root))?;
        return print_toml_or_json(&value, output);
    }

    if args.user {
        let path = user_config_path().ok_or_else(|| anyhow!("Could not determine the user config directory"))?;
        let value = load_toml_table(&path)?;
        return print_toml_or_json(&value, output);
    }

    let effective = resolve_config(project_root)?;
    let mut out = io::stdout().lock();
    write_effective(&mut out, &effective, output)
}

fn load_toml_table(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Table(toml::map::Map::new()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if !value.is_table() {
        bail!("{} must contain a top-level TOML table", path.display());
    }

    Ok(value)
}

fn print_toml_or_json(value: &Value, output: OutputMode) -> Result<()> {
    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputMode::Text | OutputMode::Pretty => print!("{}", toml::to_string_pretty(value)?),
    }
    Ok(())
}

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

/// Effective settings as reported by `sop config`.
#[derive(Serialize)]
struct EffectiveReport<'a> {
    project: &'a ProjectConfig,
    user: &'a UserConfig,
    resolved_output: &'static str,
}

fn write_effective(w: &mut dyn Write, value: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let backend = &value.project.backend;
    let billing = &value.project.billing;
    let resolved = output.as_str();
    match output {
        OutputMode::Json => {
            let report = EffectiveReport {
                project: &value.project,
                user: &value.user,
                resolved_output: resolved,
            };
            writeln!(w, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputMode::Text => {
            writeln!(w, "resolved_output={resolved}")?;
            writeln!(w, "backend.dev_mock={}", backend.dev_mock)?;
            writeln!(w, "backend.url={}", opt(backend.url.as_deref()))?;
            writeln!(w, "billing.starter_price_id={}", opt(billing.starter_price_id.as_deref()))?;
            writeln!(w, "billing.pro_price_id={}", opt(billing.pro_price_id.as_deref()))?;
            if let Some(out) = &value.user.output {
                writeln!(w, "user.output={out}")?;
            }
        }
        OutputMode::Pretty => {
            writeln!(w, "resolved_output = \"{resolved}\"")?;
            writeln!(w)?;
            writeln!(w, "[backend]")?;
            writeln!(w, "dev_mock = {}", backend.dev_mock)?;
            if let Some(url) = &backend.url {
                writeln!(w, "url = \"{url}\"")?;
            }
            writeln!(w)?;
            writeln!(w, "[billing]")?;
            if let Some(id) = &billing.starter_price_id {
                writeln!(w, "starter_price_id = \"{id}\"")?;
            }
            if let Some(id) = &billing.pro_price_id {
                writeln!(w, "pro_price_id = \"{id}\"")?;
            }
            writeln!(w)?;
            writeln!(w, "[user]")?;
            if let Some(out) = &value.user.output {
                writeln!(w, "output = \"{out}\"")?;
            }
        }
    }

    Ok(())
}
