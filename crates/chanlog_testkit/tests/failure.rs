//! Storage failures during appends, finalization and rotation.

use chanlog_core::{
    CoreError, LogLine, Marks, Renderer, RotationDecision, SegmentFormat, SegmentState,
    SegmentStore,
};
use chanlog_storage::InMemoryBackend;
use chanlog_testkit::prelude::*;
use chrono::{FixedOffset, NaiveDate};

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn line(text: &str) -> LogLine {
    Renderer::default()
        .render(&message(utc(2024, 3, 1, 10, 0, 0), "alice", text), Marks::none())
        .unwrap()
}

fn failing_store() -> (SegmentStore, InMemoryBackend, std::sync::Arc<FailureSwitch>) {
    let probe = InMemoryBackend::new();
    let (backend, switch) = FailingBackend::wrap(Box::new(probe.clone()));
    let store = SegmentStore::with_backend(
        march(1),
        Box::new(backend),
        FixedOffset::east_opt(0).unwrap(),
        &SegmentFormat::default(),
    )
    .unwrap();
    (store, probe, switch)
}

#[test]
fn failed_append_does_not_block_later_appends() {
    let (mut store, probe, switch) = failing_store();
    store.append(&line("first")).unwrap();

    switch.fail_appends_after(0);
    assert!(matches!(store.append(&line("lost")), Err(CoreError::Storage(_))));

    switch.heal();
    store.append(&line("third")).unwrap();

    let contents = probe.contents();
    assert!(contents.contains("first"));
    assert!(!contents.contains("lost"));
    assert!(contents.contains("third"));
    assert_eq!(store.state(), SegmentState::Fresh);
}

#[test]
fn failed_flush_is_reported() {
    let (mut store, _probe, switch) = failing_store();
    switch.set_fail_on_sync(true);
    assert!(store.append(&line("unflushed")).is_err());
    assert_eq!(switch.failures(), 1);
}

#[test]
fn failed_finalize_leaves_segment_open() {
    let (mut store, probe, switch) = failing_store();
    let format = SegmentFormat::default();

    switch.fail_appends_after(0);
    assert!(store.finalize(&format).is_err());
    assert_eq!(store.state(), SegmentState::Fresh);
    assert!(!chanlog_core::is_finalized(&probe.contents()));

    switch.heal();
    store.append(&line("after the failure")).unwrap();
    store.finalize(&format).unwrap();
    assert_eq!(store.state(), SegmentState::Closed);
    assert_eq!(probe.contents().matches("</html>").count(), 1);
}

#[test]
fn failed_rotation_is_retried_on_later_ticks() {
    let logs = TempLogDir::new();
    let writer = logs.open_writer(utc(2024, 3, 1, 23, 0, 0));

    // a directory where the next segment file should go makes the open fail
    let blocker = logs.segment_path(march(2));
    std::fs::create_dir(&blocker).unwrap();

    assert!(writer.tick(utc(2024, 3, 2, 0, 0, 0)).is_err());
    assert_eq!(writer.active_date(), None);
    assert!(chanlog_core::is_finalized(&logs.read(march(1))));
    assert!(matches!(
        writer.record(&message(utc(2024, 3, 2, 0, 0, 30), "alice", "into the void")),
        Err(CoreError::NoActiveSegment)
    ));

    // still blocked: the retry fails again
    assert!(writer.tick(utc(2024, 3, 2, 0, 1, 0)).is_err());

    std::fs::remove_dir(&blocker).unwrap();
    assert_eq!(
        writer.tick(utc(2024, 3, 2, 0, 2, 0)).unwrap(),
        RotationDecision::Rotate
    );
    assert_eq!(writer.active_date(), Some(march(2)));

    writer.record(&message(utc(2024, 3, 2, 0, 2, 30), "alice", "back")).unwrap();
    let day2 = logs.read(march(2));
    assert!(day2.starts_with("<!DOCTYPE HTML>"));
    assert!(day2.contains("back"));
    assert!(!day2.contains("into the void"));
}
