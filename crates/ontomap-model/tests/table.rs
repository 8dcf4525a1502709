use ontomap_model::{CurationReport, MatchResult, ReferenceKey, ReferenceTable, Value};

fn cell_types() -> ReferenceTable {
    ReferenceTable::builder("ontology_id")
        .key(ReferenceKey::new("cell_type", "cl", "2024-08-16"))
        .row([
            ("ontology_id", Value::from("CL:0000084")),
            ("name", Value::from("T cell")),
            ("synonyms", Value::from(vec!["T-cell", "T lymphocyte"])),
        ])
        .row([
            ("ontology_id", Value::from("CL:0000236")),
            ("name", Value::from("B cell")),
        ])
        .build()
        .expect("valid table")
}

#[test]
fn record_view_serializes_tagged_cells() {
    let table = cell_types();
    let row = table.lookup_row("CL:0000236").expect("B cell row");
    insta::assert_json_snapshot!(row.to_record(), @r#"
    {
      "name": {
        "kind": "Text",
        "value": "B cell"
      },
      "ontology_id": {
        "kind": "Text",
        "value": "CL:0000236"
      },
      "synonyms": {
        "kind": "Null"
      }
    }
    "#);
}

#[test]
fn provenance_is_displayed_as_entity_source_version() {
    let table = cell_types();
    let key = table.key().expect("key");
    assert_eq!(key.to_string(), "cell_type/cl@2024-08-16");
}

#[test]
fn synonym_lists_are_items() {
    let table = cell_types();
    let field = table.field("synonyms").expect("synonyms field");
    let items: Vec<&str> = table
        .field_values(field)
        .flat_map(|(_, value)| value.items())
        .map(String::as_str)
        .collect();
    assert_eq!(items, ["T-cell", "T lymphocyte"]);
}

#[test]
fn report_counts_dropped_inputs() {
    let matches = vec![
        MatchResult::exact("T cell", "CL:0000084", Some("T cell".to_string())),
        MatchResult::synonym("B lymphocyte", "CL:0000236", Some("B cell".to_string())),
        MatchResult::unmatched("NK cell"),
        MatchResult::unmatched("monocyte"),
    ];
    let report = CurationReport::from_matches(&matches, 6);
    assert_eq!(report.n_total, 4);
    assert_eq!(report.n_mapped, 2);
    assert_eq!(report.n_unmapped, 2);
    assert_eq!(report.n_empty_or_duplicate, 2);
    insta::assert_snapshot!(report.summary(), @"2 of 4 terms mapped (50.0%)");
}
