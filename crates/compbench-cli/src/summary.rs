//! Console summary of a finished report.

use comfy_table::{Cell, CellAlignment, Table};
use compbench::Report;

/// Per-row overview: insert, mean query time, total savings.
pub fn format_table(report: &Report) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Size",
        "Compression",
        "Insert (ms)",
        "Insert saved %",
        "Insert bytes",
        "Mean query (ms)",
        "Total saved %",
    ]);

    for row in report.rows() {
        let insert = row.insert();
        table.add_row(vec![
            Cell::new(row.size).set_alignment(CellAlignment::Right),
            Cell::new(row.compressor),
            Cell::new(format!("{:.3}", insert.time_secs * 1000.0))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", insert.saved_time_percentage))
                .set_alignment(CellAlignment::Right),
            Cell::new(insert.bytes).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", row.mean_query_secs() * 1000.0))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", row.total_saved_time_percentage))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

/// The whole report as pretty JSON.
pub fn format_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
