// Traffic merge tests: dedup, fresh-wins, ordering, retention

mod common;

use cfstats::merge::{merge, merge_traffic, retention_cutoff};
use cfstats::models::{Timed, TrafficDimensions, TrafficRecord, TrafficSum};
use chrono::Duration;
use common::{at, invocation, traffic};
use std::collections::HashSet;

#[test]
fn merge_scenario_fresh_overwrites_and_appends() {
    let existing = vec![traffic("2024-01-01T00:00:00Z", 100)];
    let fresh = vec![
        traffic("2024-01-01T00:00:00Z", 150),
        traffic("2024-01-02T00:00:00Z", 200),
    ];
    let out = merge_traffic(&existing, &fresh, at("2024-01-03T00:00:00Z"), 35);
    assert_eq!(
        out,
        vec![
            traffic("2024-01-01T00:00:00Z", 150),
            traffic("2024-01-02T00:00:00Z", 200),
        ]
    );
}

#[test]
fn merge_drops_records_older_than_retention() {
    let now = at("2024-03-01T00:00:00Z");
    let old = (now - Duration::days(40)).to_rfc3339();
    let recent = (now - Duration::days(2)).to_rfc3339();
    let existing = vec![traffic(&old, 1), traffic(&recent, 2)];
    let out = merge_traffic(&existing, &[], now, 35);
    assert_eq!(out, vec![traffic(&recent, 2)]);
}

#[test]
fn merge_keeps_record_exactly_at_cutoff() {
    let now = at("2024-03-01T00:00:00Z");
    let boundary = retention_cutoff(now, 35);
    let just_outside = boundary - Duration::seconds(1);
    let existing = vec![
        traffic(&just_outside.to_rfc3339(), 1),
        traffic(&boundary.to_rfc3339(), 2),
    ];
    let out = merge_traffic(&existing, &[], now, 35);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].sum.edge_response_bytes, 2);
}

#[test]
fn merge_empty_inputs_yield_empty() {
    let out = merge_traffic(&[], &[], at("2024-01-03T00:00:00Z"), 35);
    assert!(out.is_empty());
}

#[test]
fn merge_sorts_ascending_regardless_of_input_order() {
    let fresh = vec![
        traffic("2024-01-02T05:00:00Z", 3),
        traffic("2024-01-02T01:00:00Z", 1),
        traffic("2024-01-02T03:00:00Z", 2),
    ];
    let existing = vec![traffic("2024-01-02T04:00:00Z", 9)];
    let out = merge_traffic(&existing, &fresh, at("2024-01-03T00:00:00Z"), 35);
    let times: Vec<_> = out.iter().filter_map(|r| r.timestamp()).collect();
    assert_eq!(times.len(), 4);
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(out[0].sum.edge_response_bytes, 1);
    assert_eq!(out[3].sum.edge_response_bytes, 3);
}

#[test]
fn merge_treats_equivalent_instants_as_one_key() {
    let existing = vec![traffic("2024-01-02T00:00:00+00:00", 10)];
    let fresh = vec![traffic("2024-01-02T00:00:00Z", 20)];
    let out = merge_traffic(&existing, &fresh, at("2024-01-03T00:00:00Z"), 35);
    assert_eq!(out, vec![traffic("2024-01-02T00:00:00Z", 20)]);
}

#[test]
fn merge_later_duplicate_in_existing_wins() {
    let existing = vec![
        traffic("2024-01-02T00:00:00Z", 10),
        traffic("2024-01-02T00:00:00Z", 11),
    ];
    let out = merge_traffic(&existing, &[], at("2024-01-03T00:00:00Z"), 35);
    assert_eq!(out, vec![traffic("2024-01-02T00:00:00Z", 11)]);
}

#[test]
fn merge_skips_records_without_usable_timestamp() {
    let missing = TrafficRecord {
        sum: TrafficSum {
            edge_response_bytes: 5,
        },
        dimensions: TrafficDimensions { datetime: None },
    };
    let garbage = traffic("yesterday-ish", 6);
    let fresh = vec![missing, garbage, traffic("2024-01-02T00:00:00Z", 7)];
    let out = merge_traffic(&[], &fresh, at("2024-01-03T00:00:00Z"), 35);
    assert_eq!(out, vec![traffic("2024-01-02T00:00:00Z", 7)]);
}

#[test]
fn merge_again_with_empty_fresh_is_stable() {
    let now = at("2024-02-10T12:00:00Z");
    let existing = vec![
        traffic("2024-01-01T00:00:00Z", 1),
        traffic("2024-02-01T00:00:00Z", 2),
        traffic("2024-02-09T00:00:00Z", 3),
    ];
    let fresh = vec![
        traffic("2024-02-09T00:00:00Z", 30),
        traffic("2024-02-10T00:00:00Z", 4),
    ];
    let once = merge_traffic(&existing, &fresh, now, 35);
    let twice = merge_traffic(&once, &[], now, 35);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 3);
}

#[test]
fn merge_is_generic_over_timed_records() {
    let existing = vec![invocation("2024-01-02T00:00:00Z", "api", 1, 0)];
    let fresh = vec![invocation("2024-01-02T00:00:00Z", "api", 5, 1)];
    let out = merge(&existing, &fresh, at("2024-01-03T00:00:00Z"), 35);
    assert_eq!(out, fresh);
}

/// Deterministic sweep over many small inputs checking the merge invariants.
#[test]
fn merge_invariants_hold_across_generated_inputs() {
    let now = at("2024-06-01T00:00:00Z");
    let cutoff = retention_cutoff(now, 35);
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        seed >> 33
    };

    for _ in 0..200 {
        let mut gen_batch = |n: u64| -> Vec<TrafficRecord> {
            (0..n)
                .map(|_| {
                    // Hourly buckets spread over ~50 days before `now`.
                    let hours_back = (next() % (50 * 24)) as i64;
                    let ts = now - Duration::hours(hours_back);
                    traffic(&ts.to_rfc3339(), next() % 10_000)
                })
                .collect()
        };
        let existing = gen_batch(12);
        let fresh = gen_batch(8);
        let out = merge_traffic(&existing, &fresh, now, 35);

        let keys: Vec<_> = out.iter().map(|r| r.timestamp().unwrap()).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len(), "duplicate timestamps");
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "not sorted");
        assert!(keys.iter().all(|k| *k >= cutoff), "retention violated");

        // Fresh precedence: the last fresh row for a key is what survives.
        for f in &fresh {
            let ts = f.timestamp().unwrap();
            if ts < cutoff {
                continue;
            }
            let last_fresh = fresh
                .iter()
                .rev()
                .find(|r| r.timestamp() == Some(ts))
                .unwrap();
            let got = out.iter().find(|r| r.timestamp() == Some(ts)).unwrap();
            assert_eq!(got, last_fresh);
        }

        assert_eq!(merge_traffic(&out, &[], now, 35), out);
    }
}
