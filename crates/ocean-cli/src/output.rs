//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use chrono::{DateTime, Utc};
use ocean_actions::Action;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
    header: bool,
}

impl OutputFormat {
    /// Create a new output formatter that prints table headers.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            format,
            header: true,
        }
    }

    /// Toggle the table header row.
    #[must_use]
    pub const fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Write a value in the selected format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                let rows = value.rows();
                let header = self.header.then(T::header);
                write_columns(writer, header.as_deref(), &rows)?;
            }
        }
        Ok(())
    }

    /// Render a value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Types that can be laid out as table rows.
pub trait TableDisplay {
    /// Column titles.
    fn header() -> Vec<&'static str>;

    /// One entry per row, one cell per column.
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Left-aligned columns separated by at least three spaces.
fn write_columns<W: Write>(
    writer: &mut W,
    header: Option<&[&str]>,
    rows: &[Vec<String>],
) -> Result<(), CliError> {
    let header: Option<Vec<String>> =
        header.map(|titles| titles.iter().map(ToString::to_string).collect());
    let lines: Vec<&Vec<String>> = header.iter().chain(rows).collect();

    let columns = lines.iter().map(|cells| cells.len()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            lines
                .iter()
                .filter_map(|cells| cells.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for cells in lines {
        let mut line = String::new();
        for (col, cell) in cells.iter().enumerate() {
            if col + 1 == cells.len() {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{cell:<width$}   ", width = widths[col]));
            }
        }
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Actions for display. JSON output is a plain array.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ActionList {
    /// Actions in display order.
    pub actions: Vec<Action>,
}

impl ActionList {
    /// Wraps a listing.
    #[must_use]
    pub const fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Wraps a single action.
    #[must_use]
    pub fn single(action: Action) -> Self {
        Self::new(vec![action])
    }
}

impl TableDisplay for ActionList {
    fn header() -> Vec<&'static str> {
        vec![
            "ID",
            "Status",
            "Type",
            "Started At",
            "Completed At",
            "Resource ID",
            "Resource Type",
            "Region",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.actions
            .iter()
            .map(|a| {
                vec![
                    a.id.to_string(),
                    a.status.clone(),
                    a.action_type.clone(),
                    timestamp(a.started_at),
                    timestamp(a.completed_at),
                    a.resource_id.map(|id| id.to_string()).unwrap_or_default(),
                    a.resource_type.clone(),
                    a.region_slug.clone(),
                ]
            })
            .collect()
    }
}

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}
