//! Console rendering for tables and stats.
//!
//! Pure formatting: column widths are computed here, all values arrive
//! pre-stringified from tfproflib.

use console::Style;
use tfproflib::{ProfileTable, Stat};

/// Print a profile table with a styled header and resource column.
pub fn print_table(table: &ProfileTable) {
    let header_style = Style::new().blue().bright().underlined();
    let resource_style = Style::new().blue();

    // Every column is as wide as its widest cell (or header).
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.len()).collect();
    for row in &table.rows {
        widths[0] = widths[0].max(row.resource.len());
        for (width, value) in widths[1..].iter_mut().zip(&row.values) {
            *width = (*width).max(value.len());
        }
    }

    println!(); // Space above the table.

    let header: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect();
    println!("{}", header_style.apply_to(header.join("  ")));

    for row in &table.rows {
        let mut cells =
            vec![format!("{}", resource_style.apply_to(format!("{:<width$}", row.resource, width = widths[0])))];
        for (value, width) in row.values.iter().zip(&widths[1..]) {
            cells.push(format!("{:>width$}", value, width = width));
        }
        println!("{}", cells.join("  "));
    }
}

/// Print stats sections as a key/value table, one blank row between
/// sections.
pub fn print_stats(sections: &[Vec<Stat>]) {
    let header_style = Style::new().blue().bright().underlined();
    let key_style = Style::new().blue();

    let key_width = sections
        .iter()
        .flatten()
        .map(|stat| stat.name.len())
        .max()
        .unwrap_or(0)
        .max("Key".len());

    println!();
    println!(
        "{}",
        header_style.apply_to(format!("{:<width$}  Value", "Key", width = key_width))
    );
    for section in sections {
        for stat in section {
            println!(
                "{}  {}",
                key_style.apply_to(format!("{:<width$}", stat.name, width = key_width)),
                stat.value
            );
        }
        println!();
    }
}
