//! Staged-file lifecycle: unique naming, extension handling, directory
//! creation, and idempotent cleanup.

mod common;

use std::collections::HashSet;

use common::*;

#[tokio::test]
async fn stage_preserves_original_extension() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = StagingStore::new(dir.path());

    let staged = store.stage(&make_upload(Some("photo.png"), None)).await?;
    let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();

    assert!(name.starts_with("face_detection_"));
    assert!(name.ends_with(".png"));
    assert!(staged.path().exists());

    store.unstage(staged).await;
    Ok(())
}

#[tokio::test]
async fn stage_defaults_to_jpg_when_filename_has_no_extension() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = StagingStore::new(dir.path());

    let staged = store.stage(&make_upload(Some("photo"), None)).await?;
    assert!(staged.path().to_string_lossy().ends_with(".jpg"));

    store.unstage(staged).await;
    Ok(())
}

#[tokio::test]
async fn stage_keeps_extension_case() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = StagingStore::new(dir.path());

    let staged = store.stage(&make_upload(Some("photo.JPG"), None)).await?;
    assert!(staged.path().to_string_lossy().ends_with(".JPG"));

    store.unstage(staged).await;
    Ok(())
}

#[tokio::test]
async fn stage_writes_the_upload_bytes() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = StagingStore::new(dir.path());
    let upload = jpeg_upload();

    let staged = store.stage(&upload).await?;
    let written = tokio::fs::read(staged.path()).await?;
    assert_eq!(written, upload.data);

    store.unstage(staged).await;
    Ok(())
}

#[tokio::test]
async fn staged_names_never_collide() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = StagingStore::new(dir.path());
    let upload = jpeg_upload();

    let mut paths = HashSet::new();
    let mut staged_files = Vec::new();
    for _ in 0..50 {
        let staged = store.stage(&upload).await?;
        paths.insert(staged.path().to_path_buf());
        staged_files.push(staged);
    }
    assert_eq!(paths.len(), 50);

    for staged in staged_files {
        store.unstage(staged).await;
    }
    assert_eq!(count_entries(dir.path()), 0);
    Ok(())
}

#[tokio::test]
async fn stage_creates_missing_temp_directory() -> anyhow::Result<()> {
    let base = tempfile::TempDir::new()?;
    let nested = base.path().join("nested").join("staging");
    let store = StagingStore::new(&nested);

    let staged = store.stage(&jpeg_upload()).await?;
    assert!(nested.is_dir());
    assert!(staged.path().exists());

    store.unstage(staged).await;
    Ok(())
}

#[tokio::test]
async fn unstage_tolerates_already_deleted_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = StagingStore::new(dir.path());

    let staged = store.stage(&jpeg_upload()).await?;
    tokio::fs::remove_file(staged.path()).await?;

    // Must not panic or surface an error.
    store.unstage(staged).await;
    Ok(())
}
