mod common;

use common::{read_tree, write_source, DictionaryFixture};
use dpm_taxgen::diagnostic::{DiagnosticBridge, DiagnosticCollector, Stop};
use dpm_taxgen::mapper::map_dpm_dictionaries;
use dpm_taxgen::pipeline::{capture_sources_to_folder, capture_sources_to_zip};
use dpm_taxgen::source::folder::{FolderDpmSource, ZipDpmSource};
use dpm_taxgen::source::SourceSpec;
use tempfile::tempdir;

fn bridge() -> (DiagnosticBridge, DiagnosticCollector) {
    let collector = DiagnosticCollector::new();
    (DiagnosticBridge::new(Box::new(collector.clone())), collector)
}

#[test]
fn folder_capture_reproduces_source_files() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source");
    write_source(
        &source,
        &[DictionaryFixture::standard("TO"), DictionaryFixture::standard("OT")],
    );
    let output = dir.path().join("captured");

    let (diagnostic, collector) = bridge();
    capture_sources_to_folder(&SourceSpec::Folder(source.clone()), &output, false, &diagnostic)
        .unwrap();

    assert_eq!(read_tree(&output), read_tree(&source));
    let events = collector.events();
    assert_eq!(events[0], "ENTER [CaptureSources] #0 [] []");
    assert!(events.contains(&"ENTER [CodeList] #0 [met] []".to_string()));
    assert!(events.contains(&"ENTER [SubCodeList] #0 [] []".to_string()));
}

#[test]
fn zip_capture_maps_to_the_same_dictionaries() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source");
    write_source(&source, &[DictionaryFixture::standard("TO")]);
    let zip = dir.path().join("captured.zip");

    let (diagnostic, _) = bridge();
    capture_sources_to_zip(&SourceSpec::Folder(source.clone()), &zip, false, &diagnostic).unwrap();

    let (diagnostic, _) = bridge();
    let from_folder =
        map_dpm_dictionaries(&FolderDpmSource::open_folder(&source).unwrap(), &diagnostic).unwrap();
    let (diagnostic, _) = bridge();
    let from_zip = map_dpm_dictionaries(&ZipDpmSource::open_zip(&zip).unwrap(), &diagnostic).unwrap();
    assert_eq!(from_folder, from_zip);

    // Zip back out to a folder: byte-identical to the original source.
    let unzipped = dir.path().join("unzipped");
    let (diagnostic, _) = bridge();
    capture_sources_to_folder(&SourceSpec::Zip(zip), &unzipped, false, &diagnostic).unwrap();
    assert_eq!(read_tree(&unzipped), read_tree(&source));
}

#[test]
fn capture_refuses_existing_target_unless_forced() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source");
    write_source(&source, &[DictionaryFixture::standard("TO")]);
    let zip = dir.path().join("captured.zip");
    std::fs::write(&zip, "occupied").unwrap();

    let (diagnostic, collector) = bridge();
    assert_eq!(
        capture_sources_to_zip(&SourceSpec::Folder(source.clone()), &zip, false, &diagnostic),
        Err(Stop::Halt)
    );
    assert!(collector
        .messages()
        .iter()
        .any(|message| message.starts_with("[FATAL] [Target already exists")));

    let (diagnostic, _) = bridge();
    capture_sources_to_zip(&SourceSpec::Folder(source), &zip, true, &diagnostic).unwrap();
    assert!(ZipDpmSource::open_zip(&zip).is_ok());
}

#[test]
fn missing_source_folder_is_fatal() {
    let dir = tempdir().unwrap();
    let (diagnostic, collector) = bridge();

    let result = capture_sources_to_folder(
        &SourceSpec::Folder(dir.path().join("absent")),
        &dir.path().join("out"),
        false,
        &diagnostic,
    );

    assert_eq!(result, Err(Stop::Halt));
    assert_eq!(
        collector.messages().iter().filter(|m| m.starts_with("[FATAL]")).count(),
        1
    );
    assert!(collector.events_joined().ends_with("EXIT [CaptureSources]"));
}
