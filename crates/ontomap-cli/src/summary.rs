use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ontomap_map::{Ambiguity, InspectOutcome, SearchHit, StandardizeOutcome};
use ontomap_model::{CurationReport, MatchResult, MatchVia};
use ontomap_sources::{ManifestSource, VerifySummary};

pub fn print_inspect(outcome: &InspectOutcome) {
    println!("{}", inspect_table(&outcome.matches));
    print_report(&outcome.report);
    if outcome.synonym_resolvable > 0 {
        println!(
            "{} unmatched term(s) are known synonyms; run `ontomap standardize` to map them.",
            outcome.synonym_resolvable
        );
    }
}

pub fn print_standardize(outcome: &StandardizeOutcome) {
    println!("{}", standardize_table(&outcome.matches));
    print_report(&outcome.report);
    if !outcome.ambiguities.is_empty() {
        println!();
        println!("Ambiguous synonyms:");
        println!("{}", ambiguity_table(&outcome.ambiguities));
    }
}

pub fn print_search(query: &str, hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No matches for '{query}'.");
        return;
    }
    println!("{}", search_table(hits));
}

pub fn print_sources(summary: &VerifySummary, sources: &[&ManifestSource]) {
    println!("Sources: {}", summary.sources_dir.display());
    println!("{}", sources_table(sources));
    println!(
        "{} source(s) across {} entities",
        summary.source_count,
        summary.entities.len()
    );
}

fn print_report(report: &CurationReport) {
    let line = report.summary();
    if report.is_complete() {
        println!("{line}");
    } else {
        println!("{line}, {} unmapped", report.n_unmapped);
    }
    if report.n_empty_or_duplicate > 0 {
        println!(
            "{} empty or duplicate input(s) skipped",
            report.n_empty_or_duplicate
        );
    }
}

pub fn inspect_table(matches: &[MatchResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Query"),
        header_cell("Valid"),
        header_cell("Value"),
        header_cell("Canonical ID"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for result in matches {
        table.add_row(vec![
            Cell::new(&result.query),
            flag_cell(result.matched),
            optional_cell(result.value.as_deref()),
            optional_cell(result.canonical_id.as_deref()),
        ]);
    }
    table
}

pub fn standardize_table(matches: &[MatchResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Query"),
        header_cell("Via"),
        header_cell("Standardized"),
        header_cell("Canonical ID"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for result in matches {
        table.add_row(vec![
            Cell::new(&result.query),
            via_cell(result.via),
            optional_cell(result.value.as_deref()),
            optional_cell(result.canonical_id.as_deref()),
        ]);
    }
    table
}

pub fn ambiguity_table(ambiguities: &[Ambiguity]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Query"),
        header_cell("Candidates"),
        header_cell("Chosen"),
    ]);
    apply_table_style(&mut table);
    for ambiguity in ambiguities {
        table.add_row(vec![
            Cell::new(&ambiguity.query),
            Cell::new(ambiguity.candidates.join(", ")),
            match &ambiguity.chosen {
                Some(id) => Cell::new(id).fg(Color::Yellow),
                None => Cell::new("unresolved").fg(Color::Red),
            },
        ]);
    }
    table
}

pub fn search_table(hits: &[SearchHit]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Canonical ID"),
        header_cell("Matched"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (rank, hit) in hits.iter().enumerate() {
        let score = Cell::new(format!("{:.1}", hit.score));
        table.add_row(vec![
            dim_cell(rank + 1),
            Cell::new(&hit.canonical_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&hit.matched),
            if hit.score >= 100.0 {
                score.fg(Color::Green)
            } else {
                score
            },
        ]);
    }
    table
}

pub fn sources_table(sources: &[&ManifestSource]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Source"),
        header_cell("Version"),
        header_cell("Default"),
        header_cell("Reference ID"),
        header_cell("Synonyms"),
        header_cell("Path"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Center);
    for source in sources {
        table.add_row(vec![
            Cell::new(&source.entity)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&source.source),
            Cell::new(&source.version),
            if source.default {
                flag_cell(true)
            } else {
                dim_cell("-")
            },
            Cell::new(&source.reference_id),
            optional_cell(source.synonyms_field.as_deref()),
            dim_cell(&source.path),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn flag_cell(ok: bool) -> Cell {
    if ok {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red)
    }
}

fn via_cell(via: MatchVia) -> Cell {
    match via {
        MatchVia::Exact => Cell::new("exact").fg(Color::Green),
        MatchVia::Synonym => Cell::new("synonym").fg(Color::Yellow),
        MatchVia::Unmatched => Cell::new("-").fg(Color::Red),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
