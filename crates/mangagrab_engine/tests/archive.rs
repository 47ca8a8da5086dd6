use std::fs;
use std::io::Read;
use std::path::Path;

use mangagrab_core::ErrorCategory;
use mangagrab_engine::{
    ensure_output_dir, ArchiveAssembler, AssembleOutcome, AssemblyError, FailureKind, FetchError,
    PageAsset,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use zip::{CompressionMethod, ZipArchive};

fn synthetic_pages(count: usize) -> Vec<PageAsset> {
    (0..count)
        .map(|i| PageAsset {
            entry_name: format!("{:02}.png", i + 1),
            bytes: (0..(64 * (i + 1))).map(|b| (b * 7 + i) as u8).collect(),
        })
        .collect()
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_string(), bytes)
        })
        .collect()
}

#[test]
fn five_pages_round_trip_in_order() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("title_c001.cbz");
    let pages = synthetic_pages(5);

    let outcome = ArchiveAssembler::new()
        .assemble(pages.iter().cloned().map(Ok), &destination)
        .unwrap();
    assert_eq!(
        outcome,
        AssembleOutcome::Published {
            path: destination.clone(),
            entries: 5
        }
    );

    let expected: Vec<(String, Vec<u8>)> = pages
        .into_iter()
        .map(|p| (p.entry_name, p.bytes))
        .collect();
    assert_eq!(read_entries(&destination), expected);
    assert_eq!(dir_entries(temp.path()), vec!["title_c001.cbz".to_string()]);
}

#[test]
fn entries_are_deflated_by_default() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("deflated.cbz");
    ArchiveAssembler::new()
        .assemble(synthetic_pages(2).into_iter().map(Ok), &destination)
        .unwrap();

    let mut archive = ZipArchive::new(fs::File::open(&destination).unwrap()).unwrap();
    assert_eq!(
        archive.by_index(0).unwrap().compression(),
        CompressionMethod::Deflated
    );
}

#[test]
fn stored_compression_can_be_chosen() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("stored.cbz");
    ArchiveAssembler::with_compression(CompressionMethod::Stored)
        .assemble(synthetic_pages(1).into_iter().map(Ok), &destination)
        .unwrap();

    let mut archive = ZipArchive::new(fs::File::open(&destination).unwrap()).unwrap();
    assert_eq!(
        archive.by_index(0).unwrap().compression(),
        CompressionMethod::Stored
    );
}

#[test]
fn failed_page_leaves_no_artifacts() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("broken.cbz");

    let mut results: Vec<Result<PageAsset, FetchError>> =
        synthetic_pages(4).into_iter().map(Ok).collect();
    results[2] = Err(FetchError::new(FailureKind::HttpStatus(500), "server error"));

    let err = ArchiveAssembler::new()
        .assemble(results, &destination)
        .unwrap_err();
    match &err {
        AssemblyError::PageFailed { index, source } => {
            assert_eq!(*index, 2);
            assert_eq!(source.kind, FailureKind::HttpStatus(500));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(!destination.exists());
    assert!(dir_entries(temp.path()).is_empty());
}

#[test]
fn existing_destination_is_skipped_untouched() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("done.cbz");
    fs::write(&destination, b"previous run").unwrap();

    let outcome = ArchiveAssembler::new()
        .assemble(synthetic_pages(3).into_iter().map(Ok), &destination)
        .unwrap();

    assert_eq!(
        outcome,
        AssembleOutcome::Skipped {
            path: destination.clone()
        }
    );
    assert_eq!(fs::read(&destination).unwrap(), b"previous run");
    assert_eq!(dir_entries(temp.path()), vec!["done.cbz".to_string()]);
}

#[test]
fn duplicate_entry_names_abort_assembly() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("dupes.cbz");
    let mut pages = synthetic_pages(3);
    pages[2].entry_name = pages[0].entry_name.clone();

    let err = ArchiveAssembler::new()
        .assemble(pages.into_iter().map(Ok), &destination)
        .unwrap_err();
    assert!(matches!(err, AssemblyError::DuplicateEntry(ref name) if name == "01.png"));
    assert!(dir_entries(temp.path()).is_empty());
}

#[test]
fn missing_output_dir_is_created() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("nested").join("out").join("c.cbz");

    ArchiveAssembler::new()
        .assemble(synthetic_pages(1).into_iter().map(Ok), &destination)
        .unwrap();
    assert!(destination.is_file());
}

#[test]
fn output_dir_that_is_a_file_is_a_filesystem_error() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("not_a_dir");
    fs::write(&not_a_dir, "x").unwrap();

    assert!(ensure_output_dir(&not_a_dir).is_err());

    let err = ArchiveAssembler::new()
        .assemble(synthetic_pages(1).into_iter().map(Ok), &not_a_dir.join("c.cbz"))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Filesystem);
    assert_eq!(dir_entries(temp.path()), vec!["not_a_dir".to_string()]);
}

#[test]
fn failed_assembly_removes_the_directories_it_created() {
    for failing in [0, 2] {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("nested").join("out").join("c.cbz");
        let mut results: Vec<Result<PageAsset, FetchError>> =
            synthetic_pages(3).into_iter().map(Ok).collect();
        results[failing] = Err(FetchError::new(FailureKind::Network, "connection reset"));

        let err = ArchiveAssembler::new()
            .assemble(results, &destination)
            .unwrap_err();
        assert!(
            matches!(err, AssemblyError::PageFailed { index, .. } if index == failing),
            "{err:?}"
        );
        assert!(!temp.path().join("nested").exists());
        assert!(dir_entries(temp.path()).is_empty());
    }
}

#[test]
fn failed_assembly_keeps_directories_that_already_existed() {
    let temp = TempDir::new().unwrap();
    let existing = temp.path().join("library");
    fs::create_dir(&existing).unwrap();
    let destination = existing.join("title").join("c.cbz");
    let mut results: Vec<Result<PageAsset, FetchError>> =
        synthetic_pages(2).into_iter().map(Ok).collect();
    results[1] = Err(FetchError::new(FailureKind::HttpStatus(404), "gone"));

    ArchiveAssembler::new()
        .assemble(results, &destination)
        .unwrap_err();
    assert!(existing.is_dir());
    assert!(dir_entries(&existing).is_empty());
}
