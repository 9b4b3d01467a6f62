//! Day rotation, driven directly and through the ticker thread.

use chanlog_core::{is_finalized, Clock, RotationDecision, RotationTicker};
use chanlog_testkit::prelude::*;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[test]
fn events_land_in_the_segment_active_when_recorded() {
    let logs = TempLogDir::new();
    let writer = logs.open_writer(utc(2024, 3, 1, 23, 59, 0));

    writer.record(&message(utc(2024, 3, 1, 23, 59, 30), "alice", "before")).unwrap();
    assert_eq!(writer.tick(utc(2024, 3, 2, 0, 0, 5)).unwrap(), RotationDecision::Rotate);
    // a late event still goes to the now-active segment
    writer.record(&message(utc(2024, 3, 1, 23, 59, 59), "alice", "straggler")).unwrap();

    let day1 = logs.read(march(1));
    let day2 = logs.read(march(2));
    assert!(is_finalized(&day1));
    assert!(day1.contains("before"));
    assert!(!day1.contains("straggler"));
    assert!(day2.contains("straggler"));
}

#[test]
fn one_rotation_per_day_boundary() {
    let logs = TempLogDir::new();
    let clock = ManualClock::new(utc(2024, 3, 1, 0, 0, 0));
    let writer = logs.open_writer(clock.now());

    let mut rotations = 0;
    for _ in 0..(3 * 24 * 4) {
        clock.advance(Duration::minutes(15));
        if writer.tick(clock.now()).unwrap() == RotationDecision::Rotate {
            rotations += 1;
        }
    }

    assert_eq!(rotations, 3);
    assert_eq!(writer.active_date(), Some(march(4)));
    for day in 1..=3 {
        let contents = logs.read(march(day));
        assert!(is_finalized(&contents));
        assert_eq!(contents.matches("</html>").count(), 1);
    }
    assert!(!is_finalized(&logs.read(march(4))));
}

#[test]
fn preamble_links_neighbouring_days() {
    let logs = TempLogDir::new();
    let writer = logs.open_writer(utc(2024, 3, 1, 12, 0, 0));
    writer.rotate(utc(2024, 3, 2, 0, 0, 0)).unwrap();

    let day2 = logs.read(march(2));
    assert!(day2.contains("<title>#rust IRC logs, 2024-03-02</title>"));
    assert!(day2.contains("<a href=\"2024-03-01.html\">&lt;==</a>"));
    assert!(day2.contains("<a href=\"2024-03-03.html\">==&gt;</a>"));
    assert!(day2.contains("All times are UTC+00:00."));
}

#[test]
fn ticker_rotates_when_the_clock_crosses_midnight() {
    let logs = TempLogDir::new();
    let clock = Arc::new(ManualClock::new(utc(2024, 3, 1, 23, 59, 59)));
    let writer = Arc::new(logs.open_writer(clock.now()));

    let ticker = RotationTicker::spawn(
        Arc::clone(&writer),
        StdDuration::from_millis(10),
        Arc::clone(&clock) as Arc<dyn Clock>,
    )
    .unwrap();

    clock.set(utc(2024, 3, 2, 0, 0, 1));
    let deadline = Instant::now() + StdDuration::from_secs(5);
    while writer.active_date() != Some(march(2)) && Instant::now() < deadline {
        std::thread::sleep(StdDuration::from_millis(5));
    }
    ticker.stop();

    assert_eq!(writer.active_date(), Some(march(2)));
    assert!(is_finalized(&logs.read(march(1))));
}
