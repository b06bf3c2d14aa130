use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mfds_core::{GroupSummary, RunSummary};
use mfds_ingest::Registry;
use mfds_model::UnmatchedReason;

pub fn print_run_summary(summary: &RunSummary, registry: &Registry) {
    if let Some(path) = registry.source() {
        eprintln!("Registry: {}", path.display());
    }
    if !registry.fingerprint().is_empty() {
        eprintln!("Registry SHA-256: {}", registry.fingerprint());
    }
    let stats = registry.stats();
    eprintln!(
        "Registry records: {} loaded, {} skipped",
        stats.loaded,
        stats.skipped()
    );

    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Exact match"), count_cell(summary.exact, Color::Green)]);
    table.add_row(vec![Cell::new("Fuzzy match"), count_cell(summary.fuzzy, Color::Yellow)]);
    for reason in UnmatchedReason::ALL {
        table.add_row(vec![
            Cell::new(reason.as_str()),
            count_cell(summary.unmatched_for(reason), Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.rows).add_attribute(Attribute::Bold),
    ]);
    eprintln!("{table}");
    eprintln!(
        "Distinct keys: {} ({} translated), ingredient groups: {}, pool records: {} ({} after dedup)",
        summary.distinct_keys,
        summary.translated_keys,
        summary.groups,
        summary.pool_records,
        summary.deduplicated_records
    );
}

/// One row per ingredient group: key, original, generics, earliest date, names.
pub fn group_table<'a, I>(groups: I) -> Table
where
    I: IntoIterator<Item = &'a GroupSummary>,
{
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Ingredient"),
        header_cell("Original"),
        header_cell("Generics"),
        header_cell("First permit"),
        header_cell("Products"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for group in groups {
        let originals: Vec<&str> = group.original_names.iter().map(String::as_str).collect();
        table.add_row(vec![
            Cell::new(&group.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(originals.join(", ")),
            Cell::new(group.generic_count),
            Cell::new(&group.min_permit_date),
            Cell::new(group.joined_names(", ")),
        ]);
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
