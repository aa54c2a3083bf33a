use crate::types::TabularResult;
use comfy_table::{Cell, Table as ComfyTable, presets::UTF8_FULL};

/// Renders rows as a box-drawn table followed by a `(N rows)` line.
///
/// With `numbered`, a leading `#` column shows each row's position, which is
/// what the shell's row editing commands take.
#[must_use]
pub fn format_result(result: &TabularResult, numbered: bool) -> String {
    if result.is_empty() && result.columns.is_empty() {
        return "(0 rows)\n".to_string();
    }

    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);

    let header = numbered.then(|| Cell::new("#")).into_iter();
    table.set_header(header.chain(result.columns.iter().map(Cell::new)));

    for (i, row) in result.rows.iter().enumerate() {
        let position = numbered.then(|| Cell::new(i)).into_iter();
        table.add_row(position.chain(row.iter().map(Cell::new)));
    }

    format!("{table}\n({} rows)\n", result.row_count())
}
