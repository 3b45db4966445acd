use std::fmt::Write;

use crate::models::FruitKind;
use crate::store::ResultStore;

const HEADERS: [&str; 4] = ["Image", "Apples", "Bananas", "Oranges"];

/// Plain-text table of every stored result, in store order
pub fn render_table(store: &ResultStore) -> String {
    let rows: Vec<[String; 4]> = store
        .iter()
        .map(|(id, counts)| {
            let [apple, banana, orange] = FruitKind::ALL.map(|kind| counts.get(kind).to_string());
            [id.to_string(), apple, banana, orange]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    // Image name left-aligned, counts right-aligned
    let _ = write!(out, "{:<width$}", cells[0], width = widths[0]);
    for (cell, width) in cells.iter().zip(widths).skip(1) {
        let _ = write!(out, " | {:>width$}", cell, width = *width);
    }
    out.push('\n');
}
