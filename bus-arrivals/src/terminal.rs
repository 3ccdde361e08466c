//! Plain-text rendering of arrival state for terminals.
//!
//! Renders the three consumer states distinctly: no stop selected, a stop
//! that could not be fetched, and a table of arrivals.

use std::io::Write;

use crate::domain::{ARRIVAL_SLOTS, DisplayServiceRow, updated_at_text};
use crate::poller::{BoardUpdate, Failure, ResultSink};

/// Prompt shown while no stop is selected.
pub const EMPTY_PROMPT: &str = "Begin by entering a bus stop ID.";

/// Message shown when a stop could not be fetched.
pub const FAILURE_MESSAGE: &str = "Unable to retrieve bus services for this bus stop ID.";

const HEADERS: [&str; 2 + ARRIVAL_SLOTS] = [
    "Bus Number",
    "Operator",
    "Next Bus #1",
    "Next Bus #2",
    "Next Bus #3",
];

/// Render a successful refresh as a table.
pub fn render_board(update: &BoardUpdate) -> String {
    let cells: Vec<[String; 2 + ARRIVAL_SLOTS]> = update.rows.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Bus Stop [{}]\n", update.stop));
    out.push_str(&format!(
        "Last Updated at: {}\n",
        updated_at_text(&update.updated_at)
    ));
    out.push_str(&render_line(&HEADERS.map(str::to_string), &widths));
    out.push_str(&render_line(&widths.map(|w| "-".repeat(w)), &widths));
    for row in &cells {
        out.push_str(&render_line(row, &widths));
    }
    if !update.malformed.is_empty() {
        out.push_str(&format!(
            "({} service(s) could not be shown)\n",
            update.malformed.len()
        ));
    }
    out
}

/// Render a failed refresh.
pub fn render_failure(failure: &Failure) -> String {
    format!(
        "Bus Stop [{}]\nLast Updated at: {}\n{} ({})\n",
        failure.stop,
        updated_at_text(&failure.updated_at),
        FAILURE_MESSAGE,
        failure.kind
    )
}

fn row_cells(row: &DisplayServiceRow) -> [String; 2 + ARRIVAL_SLOTS] {
    [
        row.line().to_string(),
        row.operator().to_string(),
        row.slot_text(0),
        row.slot_text(1),
        row.slot_text(2),
    ]
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}

/// Sink that prints every publication to a writer.
pub struct TerminalSink<W> {
    out: W,
}

impl TerminalSink<std::io::Stdout> {
    /// Print to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    /// Print to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// The underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write arrivals");
        }
    }
}

impl<W: Write + Send + 'static> ResultSink for TerminalSink<W> {
    fn on_rows(&mut self, update: BoardUpdate) {
        let text = render_board(&update);
        self.print(&text);
    }

    fn on_failure(&mut self, failure: Failure) {
        let text = render_failure(&failure);
        self.print(&text);
    }

    fn on_empty(&mut self) {
        self.print(EMPTY_PROMPT);
    }

    fn on_loading_changed(&mut self, loading: bool) {
        if loading {
            self.print("Loading...");
        }
    }
}
