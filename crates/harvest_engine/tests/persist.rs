use std::fs;

use harvest_core::{BatchAccumulator, Page, Record};
use harvest_engine::{load_batch, AtomicFileWriter, BatchWriter, JsonBatchWriter, PersistError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn batch_of(n: usize) -> harvest_core::Batch {
    let records = (0..n)
        .map(|k| Record {
            id: format!("1705.{k:05}"),
            title: format!("Title {k}"),
            published: "2017-05-01T00:00:00+00:00".to_string(),
            category: "astro-ph.CO".to_string(),
            authors: "A. Author, B. Author".to_string(),
            summary: format!("Summary {k}"),
            comment: String::new(),
        })
        .collect();
    let mut acc = BatchAccumulator::new(n);
    acc.append(Page::new(records, n)).unwrap();
    acc.drain()
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    let writer = AtomicFileWriter::open(&new_dir).unwrap();
    assert!(new_dir.is_dir());
    assert_eq!(writer.dir(), new_dir.as_path());
}

#[test]
fn file_in_place_of_output_dir_is_rejected_up_front() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = JsonBatchWriter::open(file_path, "astroph").unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
}

#[test]
fn writes_do_not_leave_probe_files_behind() {
    let temp = TempDir::new().unwrap();
    let writer = JsonBatchWriter::open(temp.path(), "astroph").unwrap();
    for index in 0..3 {
        writer.write_batch(index, &batch_of(1)).unwrap();
    }

    let mut names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["astroph_batch_0.json", "astroph_batch_1.json", "astroph_batch_2.json"]
    );
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::open(temp.path()).unwrap();

    let first = writer.write("batch_0.json", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "batch_0.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("batch_0.json", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let writer = JsonBatchWriter::open(temp.path(), "astroph").unwrap();
    // A directory squatting on the target name makes the final rename fail.
    fs::create_dir(writer.path_for(0)).unwrap();

    let result = writer.write_batch(0, &batch_of(2));
    assert!(result.is_err());
    assert!(writer.path_for(0).is_dir());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn batch_artifact_is_self_contained() {
    let temp = TempDir::new().unwrap();
    let writer = JsonBatchWriter::open(temp.path().join("batches"), "astroph").unwrap();
    let batch = batch_of(3);

    let path = writer.write_batch(4, &batch).unwrap();
    assert_eq!(path, writer.path_for(4));
    assert_eq!(path.file_name().unwrap(), "astroph_batch_4.json");

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    for column in harvest_core::Column::ALL {
        assert_eq!(json[column.name()].as_array().unwrap().len(), 3);
    }
    assert_eq!(json["batch_index"], 4);

    let (index, loaded) = load_batch(&path).unwrap();
    assert_eq!(index, 4);
    assert_eq!(loaded, batch);
}

#[test]
fn misaligned_artifact_is_rejected_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(
        &path,
        r#"{"batch_index":0,"records":2,"id":["a","b"],"title":["t"],"summary":["s","s"],
            "time":["x","x"],"comment":["",""],"category":["c","c"],"authors":["a","a"]}"#,
    )
    .unwrap();

    assert!(load_batch(&path).is_err());
}
