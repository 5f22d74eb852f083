use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use sopline_core::Table;

use super::open_client;
use crate::output::{OutputMode, Renderable, render_list};

/// One store table and how many fixture rows it holds.
#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub table: &'static str,
    pub rows: usize,
}

impl Renderable for TableSummary {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{:<18} {:>4} rows", self.table, self.rows)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  {}", self.table, self.rows)
    }

    fn table_headers() -> &'static [&'static str] {
        &["TABLE", "ROWS"]
    }
}

pub fn run_tables(project_root: &Path, output: OutputMode) -> Result<()> {
    let client = open_client(project_root)?;
    let summaries: Vec<TableSummary> = Table::ALL
        .into_iter()
        .map(|table| TableSummary {
            table: table.as_str(),
            rows: client.store().len(table),
        })
        .collect();
    render_list(&summaries, output)
}
