use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::Value;
use sopline_core::query::CountOption;
use sopline_core::{QueryBuilder, QueryResponse};
use tracing::debug;

use super::open_client;
use crate::output::{OutputMode, pretty_rule, render_mode};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Table to query (`sops`, `profiles`, `assignments`, ...).
    pub table: String,

    /// Columns to select (recorded; every column is returned).
    #[arg(long, default_value = "*")]
    pub select: String,

    /// Keep rows where COL equals VAL. Repeatable.
    #[arg(long, value_name = "COL=VAL")]
    pub eq: Vec<String>,

    /// Keep rows where COL does not equal VAL. Repeatable.
    #[arg(long, value_name = "COL=VAL")]
    pub neq: Vec<String>,

    /// Keep rows where COL equals one of the comma-separated values, or one
    /// of the elements of a JSON array (`COL=["a,b","c"]`). Repeatable.
    #[arg(long = "in", value_name = "COL=V1,V2")]
    pub in_list: Vec<String>,

    /// Return at most N rows.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Return the first row instead of a list.
    #[arg(long)]
    pub single: bool,

    /// Request an exact row count.
    #[arg(long)]
    pub count: bool,

    /// Emulate inserting a JSON object or array.
    #[arg(long, value_name = "JSON", conflicts_with_all = ["upsert", "update", "delete"])]
    pub insert: Option<String>,

    /// Emulate upserting a JSON object or array.
    #[arg(long, value_name = "JSON", conflicts_with_all = ["update", "delete"])]
    pub upsert: Option<String>,

    /// Emulate updating matching rows with a JSON object.
    #[arg(long, value_name = "JSON", conflicts_with = "delete")]
    pub update: Option<String>,

    /// Emulate deleting matching rows.
    #[arg(long)]
    pub delete: bool,
}

/// Split `COL=VAL` into a column and a JSON value.
///
/// The value is parsed as JSON when possible (`1`, `false`, `null`,
/// `"quoted"`), otherwise taken as a plain string.
fn parse_pair(raw: &str) -> Result<(&str, Value)> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected COL=VAL, got `{raw}`"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(anyhow!("missing column name in `{raw}`"));
    }
    Ok((column, parse_value(value)))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Values for `--in`: a JSON array is taken element by element, anything
/// else is split on commas.
fn parse_list(raw: &str) -> Vec<Value> {
    if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(raw) {
        return values;
    }
    raw.split(',').filter(|v| !v.is_empty()).map(parse_value).collect()
}

fn parse_payload(flag: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("--{flag} expects JSON"))
}

/// Translate the flags into a builder.
fn build(mut query: QueryBuilder, args: &QueryArgs) -> Result<QueryBuilder> {
    query = if args.count {
        query.select_with_count(&args.select, CountOption::Exact)
    } else {
        query.select(&args.select)
    };

    for raw in &args.eq {
        let (column, value) = parse_pair(raw)?;
        query = query.eq(column, value);
    }
    for raw in &args.neq {
        let (column, value) = parse_pair(raw)?;
        query = query.neq(column, value);
    }
    for raw in &args.in_list {
        let (column, values) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("expected COL=V1,V2, got `{raw}`"))?;
        query = query.in_(column.trim(), parse_list(values));
    }

    if let Some(n) = args.limit {
        query = query.limit(n);
    }
    if args.single {
        query = query.single();
    }

    if let Some(raw) = &args.insert {
        query = query.insert(parse_payload("insert", raw)?);
    } else if let Some(raw) = &args.upsert {
        query = query.upsert(parse_payload("upsert", raw)?);
    } else if let Some(raw) = &args.update {
        query = query.update(parse_payload("update", raw)?);
    } else if args.delete {
        query = query.delete();
    }
    Ok(query)
}

pub async fn run_query(args: &QueryArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let client = open_client(project_root)?;
    let query = build(client.from_name(&args.table)?, args)?;
    debug!(request = %serde_json::to_string(query.request())?, "running query");

    let response = query.await;
    let show_count = args.count;
    render_mode(
        output,
        &response,
        |r, w| write_text(r, show_count, w),
        |r, w| write_pretty(r, show_count, w),
    )
}

fn write_text(response: &QueryResponse, show_count: bool, w: &mut dyn Write) -> std::io::Result<()> {
    if response.data.is_none() {
        writeln!(w, "null")?;
    }
    for row in response.rows() {
        writeln!(w, "{}", Value::Object(row.clone()))?;
    }
    if show_count && let Some(count) = response.count {
        writeln!(w, "count={count}")?;
    }
    Ok(())
}

fn write_pretty(response: &QueryResponse, show_count: bool, w: &mut dyn Write) -> std::io::Result<()> {
    if response.data.is_none() {
        writeln!(w, "(no data)")?;
    }
    for row in response.rows() {
        for (column, value) in row {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            writeln!(w, "{column:<16} {rendered}")?;
        }
        pretty_rule(w)?;
    }
    if show_count && let Some(count) = response.count {
        writeln!(w, "{count} row(s)")?;
    }
    Ok(())
}
