//! Properties of arbitrary event streams.

use chanlog_core::Recorded;
use chanlog_testkit::prelude::*;
use chrono::NaiveDate;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_row_per_logged_event(events in prop::collection::vec(event_strategy(), 0..40)) {
        let logs = TempLogDir::new();
        let writer = logs.open_writer(utc(2024, 3, 1, 0, 0, 0));

        let mut written = 0;
        for event in &events {
            match writer.record(event).unwrap() {
                Recorded::Written { .. } => written += 1,
                Recorded::Suppressed => prop_assert!(event.is_suppressed()),
            }
        }
        writer.shutdown().unwrap();

        let contents = logs.read(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        prop_assert_eq!(contents.matches("<tr id=").count(), written);
        prop_assert_eq!(contents.matches("<!DOCTYPE HTML>").count(), 1);
        prop_assert!(!chanlog_core::is_finalized(&contents));
    }
}

proptest! {
    #[test]
    fn free_text_never_breaks_the_row(text in text_strategy()) {
        let logs = TempLogDir::new();
        let writer = logs.open_writer(utc(2024, 3, 1, 0, 0, 0));
        writer.record(&message(utc(2024, 3, 1, 0, 0, 1), "alice", &text)).unwrap();

        let contents = logs.read(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let row = &contents[contents.find("        <tr id=").unwrap()..];
        // tr, three td and an a, each opened and closed
        prop_assert_eq!(row.matches('<').count(), 10);
        prop_assert_eq!(row.matches('>').count(), 10);
    }
}
