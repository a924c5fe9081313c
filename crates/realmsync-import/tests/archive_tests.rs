//! Packaged import sources
//!
//! Tar and gzip-compressed tar archives are expanded in memory and take part
//! in exclusion and ordering like any other file.

mod common;

use anyhow::Result;
use common::{settings, ImportFixture};
use realmsync_import::{ExtractorDispatcher, FileExtractor, ImportError, SourceExtractor};

#[test]
fn test_tar_entries_become_import_units() -> Result<()> {
    let fixture = ImportFixture::new()?;
    let archive = fixture.write_archive(
        "realms.tar",
        &[
            ("b.yaml", "realm: b\n"),
            ("nested/a.json", r#"{"realm": "a"}"#),
            ("nested/", ""),
        ],
    )?;

    let set = fixture.provider(&settings(&["realms.tar"]))?.get()?;
    let paths: Vec<String> = set.paths().map(|p| p.to_string()).collect();
    assert_eq!(
        paths,
        vec![format!("{archive}!/b.yaml"), format!("{archive}!/nested/a.json")]
    );
    Ok(())
}

#[test]
fn test_gzip_archive_with_multi_document_entry() -> Result<()> {
    let fixture = ImportFixture::new()?;
    fixture.write_archive("realms.tgz", &[("all.yaml", "realm: x\n---\nrealm: y\n")])?;

    let set = fixture.provider(&settings(&["realms.tgz"]))?.get()?;
    let realms: Vec<_> = set.documents().map(|d| d.realm.as_str()).collect();
    assert_eq!(realms, vec!["x", "y"]);
    Ok(())
}

#[test]
fn test_archive_entries_honour_exclusions() -> Result<()> {
    let fixture = ImportFixture::new()?;
    fixture.write_archive(
        "realms.tar.gz",
        &[("keep.yaml", "realm: keep\n"), ("drop_test.yaml", "realm: drop\n")],
    )?;

    let mut config = settings(&["realms.tar.gz"]);
    config.exclude = vec!["*_test.*".to_string()];
    let set = fixture.provider(&config)?.get()?;

    let realms: Vec<_> = set.documents().map(|d| d.realm.as_str()).collect();
    assert_eq!(realms, vec!["keep"]);
    Ok(())
}

#[test]
fn test_archives_and_files_sort_together() -> Result<()> {
    let fixture = ImportFixture::new()?;
    fixture.write("a.yaml", "realm: plain\n")?;
    fixture.write_archive("b.tar", &[("z.yaml", "realm: packed\n")])?;

    let set = fixture.provider(&settings(&["b.tar", "a.yaml"]))?.get()?;
    let realms: Vec<_> = set.documents().map(|d| d.realm.as_str()).collect();
    assert_eq!(realms, vec!["plain", "packed"]);
    Ok(())
}

#[test]
fn test_archive_in_directory_is_an_unknown_extension() -> Result<()> {
    let fixture = ImportFixture::new()?;
    fixture.write_archive("realms/bundle.tar", &[("a.yaml", "realm: a\n")])?;

    // Directories list archives as plain files; only top-level resources are unpacked
    let err = fixture.provider(&settings(&["realms"]))?.get().unwrap_err();
    assert!(matches!(err, ImportError::Parse { .. }));
    Ok(())
}

#[test]
fn test_dispatcher_without_archive_support() -> Result<()> {
    let fixture = ImportFixture::new()?;
    fixture.write_archive("realms.tar", &[("a.yaml", "realm: a\n")])?;

    let provider = fixture
        .provider(&settings(&["realms.tar"]))?
        .with_dispatcher(ExtractorDispatcher::new(vec![SourceExtractor::File(
            FileExtractor,
        )]));

    // Treated as a plain file, which has no parser
    let err = provider.get().unwrap_err();
    assert!(matches!(err, ImportError::Parse { .. }));
    Ok(())
}
