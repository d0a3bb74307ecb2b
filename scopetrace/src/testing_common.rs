//! Helpers shared by the integration tests: running a multi-threaded workload
//! against a recorder and reading the produced trace back.

use crate::{Recorder, FOOTER, HEADER};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::thread;

/// One complete event as it appears in a trace document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TraceRecord {
    pub name: String,
    #[serde(rename = "cat")]
    pub category: String,
    #[serde(rename = "ph")]
    pub event_type: String,
    #[serde(rename = "ts")]
    pub timestamp: f64,
    #[serde(rename = "dur")]
    pub duration: f64,
    #[serde(rename = "pid")]
    pub process_id: u32,
    #[serde(rename = "tid")]
    pub thread_id: u64,
}

#[derive(Deserialize)]
struct TraceDocument {
    #[serde(rename = "otherData")]
    _other_data: serde_json::Value,
    #[serde(rename = "traceEvents")]
    trace_events: Vec<serde_json::Value>,
}

/// Parses a complete trace document, checking its framing, and returns the
/// records in file order (the leading placeholder object is not included).
pub fn parse_trace(contents: &str) -> Result<Vec<TraceRecord>, Box<dyn Error + Send + Sync>> {
    if !contents.starts_with(HEADER) {
        return Err("trace does not start with the trace header".into());
    }
    if !contents.ends_with(FOOTER) {
        return Err("trace does not end with the trace footer".into());
    }

    let document: TraceDocument = serde_json::from_str(contents)?;
    let mut events = document.trace_events.into_iter();

    match events.next() {
        Some(serde_json::Value::Object(placeholder)) if placeholder.is_empty() => {}
        other => return Err(format!("expected `{{}}` placeholder, found {:?}", other).into()),
    }

    let mut records = Vec::new();
    for event in events {
        records.push(serde_json::from_value(event)?);
    }

    Ok(records)
}

pub fn read_trace(path: &Path) -> Result<Vec<TraceRecord>, Box<dyn Error + Send + Sync>> {
    parse_trace(&fs::read_to_string(path)?)
}

/// Counts the records in `records` by thread id.
pub fn records_per_thread(records: &[TraceRecord]) -> FxHashMap<u64, usize> {
    let mut counts: FxHashMap<u64, usize> = FxHashMap::default();
    for record in records {
        *counts.entry(record.thread_id).or_default() += 1;
    }
    counts
}

/// Runs `iterations` nested measurements on each of `num_threads` threads and
/// returns how many events every thread submitted, keyed by thread id.
pub fn run_threaded_workload(
    recorder: &Recorder,
    num_threads: usize,
    iterations: usize,
) -> FxHashMap<u64, usize> {
    thread::scope(|s| {
        let workers: Vec<_> = (0..num_threads)
            .map(|t| {
                s.spawn(move || {
                    let mut submitted = 0;
                    for i in 0..iterations {
                        pseudo_invocation(recorder, t + i, 2, &mut submitted);
                    }
                    (thread_id::get() as u64, submitted)
                })
            })
            .collect();

        // Thread ids of threads that did not overlap may be reused.
        let mut submitted: FxHashMap<u64, usize> = FxHashMap::default();
        for worker in workers {
            let (thread_id, count) = worker.join().expect("workload thread panicked");
            *submitted.entry(thread_id).or_default() += count;
        }
        submitted
    })
}

fn pseudo_invocation(recorder: &Recorder, random: usize, depth: usize, submitted: &mut usize) {
    const NAMES: &[&str] = &["parse", "resolve", "emit"];

    let _guard = recorder.scope(NAMES[random % NAMES.len()]);
    *submitted += 1;

    if depth > 1 {
        pseudo_invocation(recorder, random + 1, depth - 1, submitted);
    }
}

/// Begins a session writing to `path`, runs the threaded workload, ends the
/// session and checks that the file holds exactly the submitted records.
pub fn run_end_to_end_trace_test(path: &Path, num_threads: usize, iterations: usize) {
    let recorder = Recorder::new();
    recorder.begin_session("end_to_end", path).unwrap();
    let expected = run_threaded_workload(&recorder, num_threads, iterations);
    recorder.end_session();

    let records = read_trace(path).unwrap();

    let expected_total: usize = expected.values().sum();
    assert_eq!(records.len(), expected_total);
    assert_eq!(records_per_thread(&records), expected);

    for record in &records {
        assert_eq!(record.category, "function");
        assert_eq!(record.event_type, "X");
        assert_eq!(record.process_id, 0);
        assert!(record.duration >= 0.0);
        assert!(record.timestamp >= 0.0);
    }
}
