use std::hint::black_box;

use camerge_engine::{merge, Attendee, CalendarSource, EventTime, MergeOptions, RawEvent};
use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{criterion_group, criterion_main, Criterion};

fn source(id: &str, anonymize: bool, count: i64) -> CalendarSource {
    let base = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
    let events = (0..count)
        .map(|i| {
            let start = base + Duration::minutes(i * 45);
            RawEvent {
                uid: Some(format!("{}-{}", id, i)),
                summary: Some(format!("Meeting {}", i % 17)),
                start: Some(EventTime::Utc(start)),
                end: Some(EventTime::Utc(start + Duration::minutes(30 + (i % 4) * 15))),
                attendees: vec![
                    Attendee::new("mailto:me@example.com", None),
                    Attendee::new(format!("mailto:guest{}@example.com", i % 9), None),
                ],
                ..RawEvent::default()
            }
        })
        .collect();
    CalendarSource::new(id, anonymize, events)
}

fn bench_merge(c: &mut Criterion) {
    let options = MergeOptions::new("Bench", "bench.example.com", Tz::Europe__Prague)
        .with_known_emails(["me@example.com"]);
    let sources = vec![
        source("work", true, 2_000),
        source("personal", false, 2_000),
        source("shared", true, 2_000),
    ];

    c.bench_function("merge_three_sources_6000_events", |b| {
        b.iter(|| merge(black_box(&options), black_box(&sources)))
    });
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
