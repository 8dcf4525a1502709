use std::fs;
use std::path::PathBuf;

use ontomap_ingest::{
    DuplicatePolicy, IngestError, ReferenceCsvOptions, read_query_column, read_queries,
    read_reference_csv, reference_from_dataframe,
};
use ontomap_model::{FieldName, ModelError, Value};
use polars::df;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("ontomap_ingest_{}_{stamp}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
    if let Some(parent) = path.parent() {
        let _ = fs::remove_dir_all(parent);
    }
}

#[test]
fn reads_reference_with_list_column() {
    let path = temp_file(
        "genes.csv",
        "\u{feff}ensembl_gene_id,symbol,synonyms\n\
         ENSG00000148584,A1CF, ACF|ASP|APOBEC1CF \n\
         ENSG00000121410,A1BG,\n",
    );
    let options = ReferenceCsvOptions::new("ensembl_gene_id").with_list_field("synonyms");
    let table = read_reference_csv(&path, &options).expect("read reference");

    assert_eq!(table.len(), 2);
    let names: Vec<&str> = table.fields().iter().map(FieldName::as_str).collect();
    assert_eq!(names, ["ensembl_gene_id", "symbol", "synonyms"]);

    let a1cf = table.lookup_row("ENSG00000148584").expect("A1CF row");
    assert_eq!(
        a1cf.get_by_name("synonyms"),
        Some(&Value::List(vec![
            "ACF".to_string(),
            "ASP".to_string(),
            "APOBEC1CF".to_string()
        ]))
    );
    let a1bg = table.lookup_row("ENSG00000121410").expect("A1BG row");
    assert_eq!(a1bg.get_by_name("synonyms"), Some(&Value::Null));
    cleanup(&path);
}

#[test]
fn reads_tab_separated_files() {
    let path = temp_file("cells.tsv", "ontology_id\tname\nCL:0000084\tT cell\n");
    let table = read_reference_csv(&path, &ReferenceCsvOptions::new("ontology_id"))
        .expect("read reference");
    let row = table.lookup_row("CL:0000084").expect("row");
    assert_eq!(row.get_by_name("name"), Some(&Value::text("T cell")));
    cleanup(&path);
}

#[test]
fn duplicate_ids_follow_policy() {
    let contents = "id,symbol\n1,A1CF\n2,A1BG\n1,A1CF-AS\n";
    let path = temp_file("dups.csv", contents);

    let err = read_reference_csv(&path, &ReferenceCsvOptions::new("id")).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Reference {
            source: ModelError::DuplicateId { .. },
            ..
        }
    ));

    let options = ReferenceCsvOptions::new("id").with_duplicates(DuplicatePolicy::KeepFirst);
    let table = read_reference_csv(&path, &options).expect("keep first");
    assert_eq!(table.len(), 2);
    let row = table.lookup_row("1").expect("row 1");
    assert_eq!(row.get_by_name("symbol"), Some(&Value::text("A1CF")));
    cleanup(&path);
}

#[test]
fn missing_id_column_names_the_file() {
    let path = temp_file("noid.csv", "symbol\nA1CF\n");
    let err = read_reference_csv(&path, &ReferenceCsvOptions::new("id")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("noid.csv"), "{message}");
    assert!(message.contains("unknown field 'id'"), "{message}");
    cleanup(&path);
}

#[test]
fn missing_file_is_a_csv_error() {
    let path = std::env::temp_dir().join("ontomap_ingest_does_not_exist.csv");
    let err = read_reference_csv(&path, &ReferenceCsvOptions::new("id")).unwrap_err();
    assert!(matches!(err, IngestError::Csv { .. }));
}

#[test]
fn reads_queries_per_line() {
    let path = temp_file("queries.txt", "A1CF\n\nASP\nA1CF\n");
    let queries = read_queries(&path).expect("read queries");
    assert_eq!(queries.len(), 4);
    assert_eq!(queries.unique(), ["A1CF", "ASP"]);
    cleanup(&path);
}

#[test]
fn reads_query_column() {
    let path = temp_file("obs.csv", "cell_id,cell_type\nc1,T cell\nc2,\nc3,B cell\n");
    let queries = read_query_column(&path, "cell_type").expect("read column");
    assert_eq!(queries.len(), 3);
    assert_eq!(queries.unique(), ["T cell", "B cell"]);

    let err = read_query_column(&path, "tissue").unwrap_err();
    insta::assert_snapshot!(
        err.to_string().replace(&path.display().to_string(), "<path>"),
        @"column 'tissue' not found in <path>"
    );
    cleanup(&path);
}

#[test]
fn converts_data_frames() {
    let df = df!(
        "ontology_id" => ["CL:0000084", "CL:0000236"],
        "name" => ["T cell", "B cell"],
        "n_cells" => [120i64, 45],
        "is_leaf" => [true, false],
    )
    .expect("frame");
    let table = reference_from_dataframe(&df, "ontology_id").expect("convert");
    assert_eq!(table.len(), 2);
    let row = table.lookup_row("CL:0000236").expect("row");
    assert_eq!(row.get_by_name("name"), Some(&Value::text("B cell")));
    assert_eq!(row.get_by_name("n_cells"), Some(&Value::text("45")));
    assert_eq!(row.get_by_name("is_leaf"), Some(&Value::text("false")));
}

#[test]
fn data_frame_nulls_and_ids_are_checked() {
    let df = df!(
        "id" => [Some("1"), None],
        "name" => [Some("T cell"), Some("B cell")],
    )
    .expect("frame");
    let err = reference_from_dataframe(&df, "id").unwrap_err();
    assert!(matches!(
        err,
        IngestError::Frame(ModelError::MissingId { row: 1, .. })
    ));
}
