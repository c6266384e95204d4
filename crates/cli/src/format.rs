//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): aligned table with a row count footer
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): tab-separated values, no header, no footer

use roster_executor::{
    format_timestamp, Error, Output, QueryRows, RefreshSummary, SchemaInfo, StatusInfo, Timestamp,
    Value,
};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Raw => format_raw(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": format!("{}", err)
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => format!("{}", err),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Warning for rows served stale because the refresh they triggered failed.
///
/// JSON output already carries `refresh_error`, so there is nothing extra
/// to print in that mode.
pub fn format_stale_warning(output: &Output, mode: OutputMode) -> Option<String> {
    match (output, mode) {
        (_, OutputMode::Json) => None,
        (Output::Rows(rows), _) => rows.refresh_error.as_ref().map(|reason| {
            format!(
                "(warning) refresh failed, serving data from {}: {}",
                format_micros(rows.refreshed_at),
                reason
            )
        }),
        _ => None,
    }
}

fn format_micros(micros: u64) -> String {
    format_timestamp(Timestamp::from_micros(micros))
}

// =========================================================================
// JSON mode
// =========================================================================

fn format_json(output: &Output) -> String {
    let rendered = match output {
        Output::Rows(rows) => serde_json::to_string_pretty(&serde_json::json!({
            "columns": rows.columns,
            "rows": rows.to_objects(),
            "refreshed_at": format_micros(rows.refreshed_at),
            "refresh_error": rows.refresh_error,
        })),
        Output::Refreshed(summary) => serde_json::to_string_pretty(summary),
        Output::Status(status) => serde_json::to_string_pretty(status),
        Output::Schema(schema) => serde_json::to_string_pretty(schema),
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// =========================================================================
// Raw mode
// =========================================================================

fn format_raw(output: &Output) -> String {
    match output {
        Output::Rows(rows) => rows
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(format_value_raw)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Refreshed(summary) => summary.member_count.to_string(),
        Output::Status(status) => status.phase.to_string(),
        Output::Schema(schema) => schema
            .columns
            .iter()
            .map(|c| format!("{}\t{}", c.name, c.description))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_value_raw(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s
            .replace('\\', "\\\\")
            .replace('\t', "\\t")
            .replace('\n', "\\n"),
        Value::Bytes(b) => hex_encode(b),
    }
}

// =========================================================================
// Human mode
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Rows(rows) => format_table(rows),
        Output::Refreshed(summary) => format_refresh_human(summary),
        Output::Status(status) => format_status_human(status),
        Output::Schema(schema) => format_schema_human(schema),
    }
}

fn format_table(rows: &QueryRows) -> String {
    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(format_value_human).collect())
        .collect();

    let mut widths: Vec<usize> = rows.columns.iter().map(|c| display_width(c)).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(display_width(cell));
            }
        }
    }

    let mut lines = Vec::with_capacity(cells.len() + 3);
    lines.push(format_table_line(&rows.columns, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+"),
    );
    for row in &cells {
        lines.push(format_table_line(row, &widths));
    }
    lines.push(match cells.len() {
        1 => "(1 row)".to_string(),
        n => format!("({} rows)", n),
    });
    lines.join("\n")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(display_width(cell));
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("|")
        .trim_end()
        .to_string()
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn format_value_human(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.replace('\n', " "),
        Value::Bytes(b) => format!("x'{}'", hex_encode(b)),
    }
}

fn format_refresh_human(summary: &RefreshSummary) -> String {
    let mut line = format!(
        "Refreshed {} members at {} (generation {})",
        summary.member_count,
        format_micros(summary.refreshed_at),
        summary.generation
    );
    if !summary.persisted {
        line.push_str("\n(warning) snapshot could not be written to the cache file");
    }
    line
}

fn format_status_human(status: &StatusInfo) -> String {
    fn or_dash<T: ToString>(v: Option<T>) -> String {
        v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }

    let m = &status.metrics;
    [
        format!("phase:              {}", status.phase),
        format!("members:            {}", or_dash(status.member_count)),
        format!("refreshed at:       {}", or_dash(status.refreshed_at_utc.as_ref())),
        format!("age:                {}", or_dash(status.age_secs.map(|s| format!("{}s", s)))),
        format!("ttl:                {}s", status.ttl_secs),
        format!("stale:              {}", status.stale),
        format!("refresh in flight:  {}", status.refresh_in_flight),
        format!("origin:             {}", or_dash(status.origin)),
        format!("source:             {}", status.source),
        format!("cache file:         {}", status.cache_file),
        format!(
            "fetches:            {} ({} ok, {} failed)",
            m.fetches, m.refreshes_succeeded, m.refreshes_failed
        ),
        format!("persist failures:   {}", m.persistence_failures),
        format!(
            "queries:            {} ({} rejected)",
            m.queries, m.rejected_queries
        ),
    ]
    .join("\n")
}

fn format_schema_human(schema: &SchemaInfo) -> String {
    let width = schema
        .columns
        .iter()
        .map(|c| display_width(&c.name))
        .max()
        .unwrap_or(0);
    let mut lines = vec![format!("Table {} (every column is TEXT)", schema.table)];
    for column in &schema.columns {
        let pad = width.saturating_sub(display_width(&column.name));
        lines.push(format!(
            "  {}{}  {}",
            column.name,
            " ".repeat(pad),
            column.description
        ));
    }
    lines.push(String::new());
    lines.push("Examples:".to_string());
    for example in &schema.examples {
        lines.push(format!("  -- {}", example.description));
        lines.push(format!("  {}", example.sql));
    }
    lines.join("\n")
}

fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}
