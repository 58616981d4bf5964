//! End-to-end tests for the file-processing state machine.

use announcebulk::{
    BatchBuilder, ErrorKind, KeyPath, ProcessOptions, ProcessState, ProcessingContext, Status,
    StatisticsProgress, Transform, TransformBuilder, presets, run_with_progress,
};

mod common;

use common::{apollo_torrent, orpheus_torrent, read, torrent_bytes, write_files};

// =============================================================================
// Whole Batches
// =============================================================================

#[test]
fn test_orpheus_migration_two_files() {
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[("one.torrent", &apollo), ("two.torrent", &apollo)]);

    let mut ctx = ProcessingContext::new(paths.clone(), presets::orpheus());
    ctx.run().unwrap();

    assert!(ctx.is_done());
    assert_eq!(ctx.files_completed(), 2);
    assert_eq!(ctx.errors_count(), 0);
    assert_eq!(ctx.last_error(), None);
    for path in &paths {
        assert_eq!(read(path), orpheus_torrent());
    }
    // announce once plus one announce-list entry, per file
    assert_eq!(ctx.stats().substituted, 4);
    ctx.close().unwrap();
}

#[test]
fn test_untouched_file_is_byte_identical() {
    let original = torrent_bytes("udp://tracker.example:1337", &["udp://other.example:80"]);
    let (_dir, paths) = write_files(&[("a.torrent", &original)]);

    let mut ctx = ProcessingContext::new(paths.clone(), presets::orpheus());
    ctx.run().unwrap();

    assert_eq!(read(&paths[0]), original);
    assert_eq!(ctx.files_completed(), 1);
    assert!(!ctx.stats().modified());
}

#[test]
fn test_transforms_apply_in_order() {
    let original = apollo_torrent();
    let (_dir, paths) = write_files(&[("a.torrent", &original)]);

    let transforms = TransformBuilder::new()
        .set_string(KeyPath::root(), "comment", "apollo.rip mirror")
        .substitute(KeyPath::new(["comment"]), "apollo.rip", "orpheus.network")
        .delete(KeyPath::new(["info"]), "piece length")
        .build();
    let mut ctx = ProcessingContext::new(paths.clone(), transforms);
    ctx.run().unwrap();

    let value = announcebulk::bencode::decode(&read(&paths[0])).unwrap();
    let root = value.as_dict().unwrap();
    assert_eq!(
        root.get("comment").and_then(|v| v.as_bytes()),
        Some(&b"orpheus.network mirror"[..])
    );
    let info = root.get("info").and_then(|v| v.as_dict()).unwrap();
    assert!(!info.contains_key("piece length"));
    assert!(info.contains_key("pieces"));
    // announce was not touched by these transforms
    assert_eq!(
        root.get("announce").and_then(|v| v.as_str()),
        Some("https://apollo.rip:2095/abcdef/announce")
    );
}

#[test]
fn test_atomic_matches_in_place() {
    let apollo = apollo_torrent();
    let (dir, paths) = write_files(&[("a.torrent", &apollo), ("b.torrent", &apollo)]);

    let mut ctx = BatchBuilder::new()
        .files(paths.clone())
        .transforms(presets::orpheus())
        .options(ProcessOptions::new().atomic())
        .build();
    ctx.run().unwrap();
    ctx.close().unwrap();

    for path in &paths {
        assert_eq!(read(path), orpheus_torrent());
    }
    // no temporary files left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

// =============================================================================
// Driving Modes
// =============================================================================

#[test]
fn test_step_file_count_matches_file_count() {
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[
        ("a.torrent", &apollo),
        ("b.torrent", &apollo),
        ("c.torrent", &apollo),
    ]);

    let mut ctx = ProcessingContext::new(paths, presets::orpheus());
    let mut calls = 0;
    loop {
        calls += 1;
        if ctx.step_file().unwrap() == Status::Finished {
            break;
        }
        assert_eq!(ctx.files_completed(), calls);
    }
    assert_eq!(calls, 3);
    assert_eq!(ctx.files_completed(), 3);
}

#[test]
fn test_step_after_done_is_noop() {
    let (_dir, paths) = write_files(&[("a.torrent", &apollo_torrent())]);
    let mut ctx = ProcessingContext::new(paths, presets::orpheus());
    ctx.run().unwrap();

    let index = ctx.current_index();
    for _ in 0..3 {
        assert_eq!(ctx.step().unwrap(), Status::Finished);
        assert_eq!(ctx.step_file().unwrap(), Status::Finished);
    }
    assert_eq!(ctx.state(), ProcessState::Done);
    assert_eq!(ctx.current_index(), index);
    assert_eq!(ctx.files_completed(), 1);
}

#[test]
fn test_paths_follow_index() {
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[("a.torrent", &apollo), ("b.torrent", &apollo)]);
    let mut ctx = ProcessingContext::new(paths.clone(), presets::orpheus());

    assert_eq!(ctx.files_total(), 2);
    assert_eq!(ctx.current_path(), None);
    assert_eq!(ctx.next_path(), Some(paths[0].as_path()));

    ctx.step().unwrap();
    assert_eq!(ctx.current_index(), Some(0));
    assert_eq!(ctx.current_path(), Some(paths[0].as_path()));
    assert_eq!(ctx.next_path(), Some(paths[1].as_path()));

    ctx.step_file().unwrap();
    assert_eq!(ctx.current_path(), Some(paths[1].as_path()));
    assert_eq!(ctx.next_path(), None);
}

#[test]
fn test_close_mid_file_leaves_original() {
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[("a.torrent", &apollo)]);
    let mut ctx = ProcessingContext::new(paths.clone(), presets::orpheus());

    // open, read, transform: the new content only exists in memory
    for _ in 0..3 {
        ctx.step().unwrap();
    }
    assert_eq!(ctx.state(), ProcessState::Reopen);
    assert!(ctx.buffer_len().is_some());
    ctx.close().unwrap();

    assert_eq!(read(&paths[0]), apollo);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_wrong_type_aborts_batch_by_default() {
    let bad = b"d8:announcei42ee".to_vec();
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[("a.torrent", &bad), ("b.torrent", &apollo)]);

    let mut ctx = ProcessingContext::new(paths.clone(), presets::orpheus());
    let err = ctx.run().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WrongBencodeType);
    assert_eq!(ctx.state(), ProcessState::Transform);
    assert_eq!(ctx.last_error(), Some(ErrorKind::WrongBencodeType));
    assert_eq!(read(&paths[0]), bad);
    assert_eq!(read(&paths[1]), apollo, "second file must not be touched");
}

#[test]
fn test_wrong_type_skips_only_that_file() {
    let bad = b"d8:announcei42ee".to_vec();
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[
        ("a.torrent", &apollo),
        ("b.torrent", &bad),
        ("c.torrent", &apollo),
    ]);

    let mut ctx = BatchBuilder::new()
        .files(paths.clone())
        .transforms(presets::orpheus())
        .options(ProcessOptions::new().keep_going())
        .build();
    ctx.run().unwrap();

    assert_eq!(ctx.files_completed(), 2);
    assert_eq!(ctx.errors_count(), 1);
    assert_eq!(ctx.failures().len(), 1);
    assert_eq!(ctx.failures()[0].path, paths[1]);
    assert_eq!(ctx.failures()[0].kind, ErrorKind::WrongBencodeType);
    assert_eq!(read(&paths[0]), orpheus_torrent());
    assert_eq!(read(&paths[1]), bad);
    assert_eq!(read(&paths[2]), orpheus_torrent());
}

#[test]
fn test_missing_file_skipped() {
    let (dir, mut paths) = write_files(&[("a.torrent", &apollo_torrent())]);
    let missing = dir.path().join("gone.torrent");
    paths.insert(0, missing.clone());

    let mut ctx = BatchBuilder::new()
        .files(paths.clone())
        .transforms(presets::orpheus())
        .options(ProcessOptions::new().keep_going())
        .build();
    ctx.run().unwrap();

    assert_eq!(ctx.failures()[0].path, missing);
    assert_eq!(ctx.failures()[0].kind, ErrorKind::Filesystem);
    assert_eq!(read(&paths[1]), orpheus_torrent());
}

#[test]
fn test_invalid_syntax_rejected() {
    let mut truncated = apollo_torrent();
    truncated.truncate(truncated.len() - 5);
    let (_dir, paths) = write_files(&[("a.torrent", &truncated)]);

    let mut ctx = ProcessingContext::new(paths.clone(), presets::orpheus());
    let err = ctx.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
    assert_eq!(read(&paths[0]), truncated);
}

#[test]
fn test_regex_transform_batch() {
    let (_dir, paths) = write_files(&[("a.torrent", &apollo_torrent())]);
    let transform = Transform::substitute_regex(
        KeyPath::new(["announce"]),
        r"/([0-9a-f]+)/announce$",
        "/XXXX/announce",
    )
    .unwrap();

    let mut ctx = ProcessingContext::new(paths.clone(), vec![transform]);
    ctx.run().unwrap();

    let value = announcebulk::bencode::decode(&read(&paths[0])).unwrap();
    assert_eq!(
        value.as_dict().and_then(|d| d.get("announce")).and_then(|v| v.as_str()),
        Some("https://apollo.rip:2095/XXXX/announce")
    );
}

// =============================================================================
// Progress
// =============================================================================

#[test]
fn test_run_with_progress_reports_every_file() {
    let apollo = apollo_torrent();
    let (_dir, paths) = write_files(&[
        ("a.torrent", &apollo),
        ("b.torrent", b"garbage"),
        ("c.torrent", &apollo),
    ]);

    let mut ctx = BatchBuilder::new()
        .files(paths)
        .transforms(presets::orpheus())
        .options(ProcessOptions::new().keep_going())
        .build();
    let mut progress = StatisticsProgress::new();
    let result = run_with_progress(&mut ctx, &mut progress).unwrap();

    assert_eq!(result.files_total, 3);
    assert_eq!(result.files_completed, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(progress.state().files_total, 3);
    assert_eq!(progress.state().files_processed, 3);
    assert_eq!(progress.state().files_failed, 1);
}
