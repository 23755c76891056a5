//! Tests for ImportService (CSV → typed records)

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use vassar::application::services::{as_datasets, ImportService};
use vassar::application::ApplicationError;
use vassar::domain::{CoercionRules, DomainError, Value};
use vassar::infrastructure::csv_reader::CsvTableReader;

/// Helper to create temp csv files for testing
fn create_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write csv file");
    path
}

fn library_rules() -> CoercionRules {
    CoercionRules::new(
        ["publication_year", "book_number"],
        ["contribution_percentage"],
    )
}

fn service() -> ImportService {
    ImportService::new(Arc::new(CsvTableReader), library_rules())
}

#[test]
fn given_books_csv_when_importing_then_fields_are_typed() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_csv(
        &temp,
        "books.csv",
        "title,publication_year,book_number,contribution_percentage\n\
         Emma,1815,,100.0\n\
         The Hobbit, 1937 ,1,\n",
    );

    // Act
    let tables = service().import(&path).unwrap();

    // Assert
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "books");
    let emma = &tables[0].records[0];
    assert_eq!(emma.len(), 4);
    assert_eq!(emma.get("title"), Some(&Value::String("Emma".into())));
    assert_eq!(emma.get("publication_year"), Some(&Value::Int(1815)));
    assert_eq!(emma.get("book_number"), Some(&Value::Null));
    assert_eq!(emma.get("contribution_percentage"), Some(&Value::Float(100.0)));

    let hobbit = &tables[0].records[1];
    assert_eq!(hobbit.get("publication_year"), Some(&Value::Int(1937)));
    assert_eq!(hobbit.get("contribution_percentage"), Some(&Value::Null));
}

#[test]
fn given_unparseable_year_when_importing_then_batch_fails_naming_row_and_field() {
    // Arrange: second data row carries text in an integer field
    let temp = TempDir::new().unwrap();
    let path = create_csv(
        &temp,
        "books.csv",
        "title,publication_year\nEmma,1815\nPersuasion,not-a-year\n",
    );

    let err = service().import(&path).unwrap_err();

    match err {
        ApplicationError::Import { path: p, row, source } => {
            assert_eq!(p, path);
            assert_eq!(row, 2);
            assert_eq!(
                source,
                DomainError::Coercion {
                    field: "publication_year".to_string(),
                    value: "not-a-year".to_string(),
                    target: "integer",
                }
            );
        }
        other => panic!("expected Import error, got {other:?}"),
    }
}

#[test]
fn given_directory_when_importing_then_every_csv_becomes_a_dataset() {
    let temp = TempDir::new().unwrap();
    create_csv(&temp, "people.csv", "person_id,name\n1,Alice\n2,Bob\n");
    create_csv(&temp, "books.csv", "title,publication_year\nEmma,1815\n");
    create_csv(&temp, "README.md", "not a table");

    let tables = service().import(temp.path()).unwrap();
    let datasets = as_datasets(tables);

    let names: Vec<_> = datasets.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["books", "people"]);
    assert_eq!(datasets["people"].len(), 2);
    // person_id is not an integer field here, so it stays text
    assert_eq!(
        datasets["people"][0].get("person_id"),
        Some(&Value::String("1".into()))
    );
}

#[test]
fn given_missing_path_when_importing_then_source_error() {
    let result = service().import(std::path::Path::new("/nonexistent/vassar/import"));

    assert!(matches!(result, Err(ApplicationError::Source(_))));
}
