use super::{PublishSink, Status};
use crate::models::{Series, Table};
use crate::utils::fmt_value;
use std::io::Write;
use std::sync::Mutex;

const BAR_WIDTH: usize = 30;

/// Plain-text renderer. Writes to stdout by default.
pub struct TerminalSink<W: Write + Send = std::io::Stdout> {
    out: Mutex<W>,
}

impl TerminalSink {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(&self, text: &str) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A closed stdout is not worth taking the scheduler down for.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl<W: Write + Send> PublishSink for TerminalSink<W> {
    fn render_table(&self, table: &Table) {
        self.emit(&format_table(table));
    }

    fn render_series(&self, series: &Series) {
        self.emit(&format_series(series));
    }

    fn render_status(&self, status: &Status, last_updated: Option<&str>) {
        let mut line = String::from("──");
        let msg = status.message();
        if !msg.is_empty() {
            line.push(' ');
            line.push_str(msg);
        }
        if let Some(ts) = last_updated {
            line.push_str(&format!(" (last updated {})", ts));
        }
        line.push('\n');
        self.emit(&line);
    }
}

// ── Formatting ────────────────────────────────────────────────────────────────

pub fn format_table(table: &Table) -> String {
    if table.records.is_empty() {
        return "  No data\n".to_string();
    }

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for record in &table.records {
        for (i, h) in table.headers.iter().enumerate() {
            widths[i] = widths[i].max(record.get(h).chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    push_row(&mut out, &header_cells, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    let rule_cells: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_row(&mut out, &rule_cells, &widths);

    for record in &table.records {
        let cells: Vec<&str> = table.headers.iter().map(|h| record.get(h)).collect();
        push_row(&mut out, &cells, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    out.push_str("  ");
    out.push_str(padded.join(" │ ").trim_end());
    out.push('\n');
}

pub fn format_series(series: &Series) -> String {
    let mut out = format!("  {} (total {})\n", series.name, fmt_value(series.total()));
    if series.is_empty() {
        out.push_str("    No data\n");
        return out;
    }

    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = series.values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

    for (label, value) in series.labels.iter().zip(&series.values) {
        let len = if max > 0.0 {
            ((value.abs() / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "    {:<lw$} {:<bw$} {}\n",
            label,
            "█".repeat(len),
            fmt_value(*value),
            lw = label_width,
            bw = BAR_WIDTH,
        ));
    }
    out
}
