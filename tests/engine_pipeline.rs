//! End-to-end runs of the engine with an in-process provider and writer.

mod common;

use common::{FailingWriter, FakeProvider, Meta, RecordingWriter, files_under, ts, write_file};
use sortmedia::engine::{
    AlbumSource, CancelToken, Engine, FileState, RunContext, RunOptions, TransferMode,
};
use sortmedia::SortError;
use sortmedia::media::{MediaRecord, MetadataProvider, NoopWriter, TimeAdjustment};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::tempdir;

const DAY: &str = "2024/01/2024-01-15";

fn expected(name: &str) -> PathBuf {
    PathBuf::from(DAY).join(name)
}

#[test]
fn copies_into_dated_tree() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    write_file(&input.join("IMG_0001.JPG"), b"one");

    let opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    let provider = FakeProvider::canon();
    let writer = RecordingWriter::default();
    let ctx = RunContext::new();
    let report = Engine::new(&opts, &provider, &writer).run(&ctx).unwrap();

    assert_eq!(report.stats.processed, 1);
    assert_eq!(report.stats.bytes, 3);
    assert_eq!(report.stats.errors, 0);
    assert_eq!(
        files_under(&archive),
        vec![expected("20240115-123045.123456_Canon-EOS5D.jpg")]
    );
    assert!(input.join("IMG_0001.JPG").exists());
    assert_eq!(writer.count(), 1);
}

#[test]
fn same_content_is_duplicate_and_different_content_gets_suffix() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    write_file(&archive.join(expected("20240115-123045.123456_Canon-EOS5D.jpg")), b"original");
    write_file(&input.join("same.jpg"), b"original");
    write_file(&input.join("other.jpg"), b"different");

    let mut opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    opts.workers = 1;
    let provider = FakeProvider::canon();
    let writer = RecordingWriter::default();
    let ctx = RunContext::new();
    let outcomes = Mutex::new(Vec::new());
    let report = Engine::new(&opts, &provider, &writer)
        .run_with(&ctx, |o| {
            outcomes
                .lock()
                .unwrap()
                .push((o.source.clone(), o.state, o.duplicate));
        })
        .unwrap();

    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.stats.processed, 1);
    assert_eq!(
        files_under(&archive),
        vec![
            expected("20240115-123045.123456_Canon-EOS5D.jpg"),
            expected("20240115-123045.123456_Canon-EOS5D_1.jpg"),
        ]
    );
    assert_eq!(
        fs::read(archive.join(expected("20240115-123045.123456_Canon-EOS5D_1.jpg"))).unwrap(),
        b"different"
    );
    let outcomes = outcomes.into_inner().unwrap();
    let same = outcomes
        .iter()
        .find(|(p, _, _)| p.ends_with("same.jpg"))
        .unwrap();
    assert_eq!((same.1, same.2), (FileState::Skipped, true));
    // Duplicates are never handed to the writer.
    assert_eq!(writer.count(), 1);
}

#[test]
fn second_run_over_same_sources_writes_nothing() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    for i in 0..5u8 {
        write_file(&input.join(format!("img{i}.jpg")), &[i; 32]);
    }
    let provider = FakeProvider::canon();
    let opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);

    let first = Engine::new(&opts, &provider, &NoopWriter)
        .run(&RunContext::new())
        .unwrap();
    assert_eq!(first.stats.processed, 5);
    let after_first = files_under(&archive);
    assert_eq!(after_first.len(), 5);

    let writer = RecordingWriter::default();
    let second = Engine::new(&opts, &provider, &writer)
        .run(&RunContext::new())
        .unwrap();
    assert_eq!(second.stats.processed, 0);
    assert_eq!(second.stats.duplicates, 5);
    assert_eq!(second.stats.bytes, 0);
    assert_eq!(files_under(&archive), after_first);
    assert_eq!(writer.count(), 0);
}

#[test]
fn burst_of_same_timestamp_claims_distinct_slots() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    let n = 40u32;
    for i in 0..n {
        write_file(&input.join(format!("burst{i:02}.jpg")), format!("frame {i}").as_bytes());
    }
    // Two byte-identical extras must collapse onto existing slots.
    write_file(&input.join("copy_a.jpg"), b"frame 3");
    write_file(&input.join("copy_b.jpg"), b"frame 7");

    let mut opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    opts.workers = 8;
    opts.queue_depth = 4;
    let provider = FakeProvider::canon();
    let report = Engine::new(&opts, &provider, &NoopWriter)
        .run(&RunContext::new())
        .unwrap();

    assert_eq!(report.stats.errors, 0);
    assert_eq!(report.stats.processed + report.stats.duplicates, (n + 2) as u64);
    let files = files_under(&archive);
    assert_eq!(files.len() as u64, report.stats.processed);

    // Every archived file holds distinct content.
    let mut contents: Vec<Vec<u8>> = files.iter().map(|f| fs::read(archive.join(f)).unwrap()).collect();
    contents.sort();
    contents.dedup();
    assert_eq!(contents.len(), files.len());
    assert_eq!(files.len() as u32, n);
}

#[test]
fn move_mode_removes_sources() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    write_file(&input.join("a.jpg"), b"a");

    let opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Move);
    let report = Engine::new(&opts, &FakeProvider::canon(), &NoopWriter)
        .run(&RunContext::new())
        .unwrap();
    assert_eq!(report.stats.processed, 1);
    assert!(!input.join("a.jpg").exists());
    assert_eq!(files_under(&archive).len(), 1);
}

#[test]
fn dry_run_reports_without_touching_disk() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    write_file(&input.join("a.jpg"), b"a");

    let mut opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Move);
    opts.dry_run = true;
    let writer = RecordingWriter::default();
    let planned = Mutex::new(Vec::new());
    let report = Engine::new(&opts, &FakeProvider::canon(), &writer)
        .run_with(&RunContext::new(), |o| {
            planned.lock().unwrap().push(o.destination.clone());
        })
        .unwrap();

    assert_eq!(report.stats.processed, 1);
    assert!(input.join("a.jpg").exists());
    assert!(!archive.exists());
    assert_eq!(writer.count(), 0);
    assert_eq!(
        planned.into_inner().unwrap(),
        vec![Some(archive.join(expected("20240115-123045.123456_Canon-EOS5D.jpg")))]
    );
}

/// Hands out a new capture second on every call, like a provider falling back to mtime on
/// freshly written copies. Anything extracted twice lands on a new path.
struct EverNewStamp(AtomicU32);

impl MetadataProvider for EverNewStamp {
    fn extract(&self, path: &Path, _adjust: &TimeAdjustment) -> Result<MediaRecord, SortError> {
        let n = self.0.fetch_add(1, Ordering::SeqCst);
        Ok(MediaRecord::new(
            path,
            Some(ts(2024, 1, 15, 0, n / 60, n % 60, 0)),
            "Canon",
            "EOS 5D",
        ))
    }
}

#[test]
fn archive_nested_in_recursive_source_is_not_reimported() {
    let td = tempdir().unwrap();
    let photos = td.path().join("photos");
    let archive = photos.join("sorted");
    let raw = photos.join("raw");
    let n = 60u32;
    for i in 0..n {
        write_file(&photos.join(format!("trip/img{i:02}.jpg")), format!("shot {i}").as_bytes());
    }
    write_file(&photos.join("trip/img00.nef"), b"raw shot");

    let mut opts = RunOptions::new(vec![photos.clone()], &archive, TransferMode::Copy);
    opts.raw_destination = Some(raw.clone());
    opts.recursive = true;
    opts.workers = 1;
    opts.queue_depth = 1;
    let provider = EverNewStamp(AtomicU32::new(0));
    let report = Engine::new(&opts, &provider, &NoopWriter)
        .run(&RunContext::new())
        .unwrap();

    assert_eq!(report.submitted, (n + 1) as u64);
    assert_eq!(report.stats.processed, (n + 1) as u64);
    assert_eq!(report.stats.duplicates, 0);
    assert_eq!(files_under(&archive).len() as u32, n);
    assert_eq!(files_under(&raw).len(), 1);
    assert_eq!(provider.0.load(Ordering::SeqCst), n + 1);
}

#[test]
fn raw_files_route_to_raw_root() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    let raw = td.path().join("raw");
    write_file(&input.join("a.NEF"), b"raw");
    write_file(&input.join("a.jpg"), b"jpeg");

    let mut opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    opts.raw_destination = Some(raw.clone());
    Engine::new(&opts, &FakeProvider::canon(), &NoopWriter)
        .run(&RunContext::new())
        .unwrap();

    assert_eq!(
        files_under(&raw),
        vec![expected("20240115-123045.123456_Canon-EOS5D.nef")]
    );
    assert_eq!(
        files_under(&archive),
        vec![expected("20240115-123045.123456_Canon-EOS5D.jpg")]
    );
}

#[test]
fn failures_are_isolated_per_file() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    write_file(&input.join("good.jpg"), b"good");
    write_file(&input.join("broken.jpg"), b"bad");
    write_file(&input.join("notes.txt"), b"text");

    let opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    let report = Engine::new(&opts, &FakeProvider::canon(), &NoopWriter)
        .run(&RunContext::new())
        .unwrap();

    assert_eq!(report.stats.processed, 1);
    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.stats.skipped, 1);
    assert!(input.join("broken.jpg").exists());
}

#[test]
fn writer_failure_keeps_the_file() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    write_file(&input.join("a.jpg"), b"a");

    let opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    let write_errors = Mutex::new(0);
    let report = Engine::new(&opts, &FakeProvider::canon(), &FailingWriter)
        .run_with(&RunContext::new(), |o| {
            if o.write_error.is_some() {
                *write_errors.lock().unwrap() += 1;
            }
            assert_eq!(o.state, FileState::Transferred);
        })
        .unwrap();

    assert_eq!(report.stats.processed, 1);
    assert_eq!(report.stats.errors, 0);
    assert_eq!(*write_errors.lock().unwrap(), 1);
    assert_eq!(files_under(&archive).len(), 1);
}

#[test]
fn writer_gets_adjusted_time_album_and_tags() {
    let td = tempdir().unwrap();
    let input = td.path().join("Holiday");
    let archive = td.path().join("archive");
    write_file(&input.join("a.jpg"), b"a");
    write_file(&input.join("undated.jpg"), b"b");

    let provider = FakeProvider::canon().with(
        "undated.jpg",
        Meta {
            captured: None,
            make: "Canon",
            model: "EOS 5D",
        },
    );
    let mut opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    opts.adjust = TimeAdjustment::new(Some("-01:00:00"), Some(1)).unwrap();
    opts.album = AlbumSource::ParentDirectory;
    opts.tags = vec!["family".into(), "beach".into()];
    let writer = RecordingWriter::default();
    Engine::new(&opts, &provider, &writer)
        .run(&RunContext::new())
        .unwrap();

    let calls = writer.calls.lock().unwrap();
    // Undated files are archived but never tagged.
    assert_eq!(calls.len(), 1);
    let (path, captured, album, tags) = &calls[0];
    assert_eq!(*captured, ts(2024, 1, 16, 11, 30, 45, 123_456));
    assert!(path.starts_with(archive.join("2024/01/2024-01-16")));
    assert_eq!(album.as_deref(), Some("Holiday"));
    assert_eq!(tags, &vec!["family".to_string(), "beach".to_string()]);
    assert!(archive.join("unknown/unknown_Canon-EOS5D.jpg").exists());
}

#[test]
fn cancelled_run_starts_no_work() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    let archive = td.path().join("archive");
    for i in 0..10u8 {
        write_file(&input.join(format!("{i}.jpg")), &[i]);
    }

    let token = CancelToken::new();
    token.cancel();
    let ctx = RunContext::with_cancel(token);
    let opts = RunOptions::new(vec![input.clone()], &archive, TransferMode::Copy);
    let report = Engine::new(&opts, &FakeProvider::canon(), &NoopWriter)
        .run(&ctx)
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.submitted, 0);
    assert_eq!(report.stats.processed, 0);
    assert!(files_under(&archive).is_empty());
}

#[test]
fn invalid_options_fail_before_any_work() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    fs::create_dir_all(&input).unwrap();
    let opts = RunOptions::new(vec![input.clone()], &input, TransferMode::Copy);
    assert!(
        Engine::new(&opts, &FakeProvider::canon(), &NoopWriter)
            .run(&RunContext::new())
            .is_err()
    );
}
