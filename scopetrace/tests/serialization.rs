use scopetrace::testing_common::{parse_trace, read_trace, run_end_to_end_trace_test};
use scopetrace::{Event, ProfilerError, Recorder, SharedBuffer, FOOTER, HEADER};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn single_region_round_trip() {
    let dir = scratch_dir();
    let path = dir.path().join("out.json");

    let recorder = Recorder::new();
    recorder.begin_session("S", &path).unwrap();
    {
        let _guard = recorder.scope("work");
        thread::sleep(Duration::from_micros(5_000));
    }
    recorder.end_session();

    let records = read_trace(&path).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.name, "work");
    assert_eq!(record.category, "function");
    assert_eq!(record.event_type, "X");
    assert_eq!(record.process_id, 0);
    assert!(record.duration >= 5_000.0, "duration was {}", record.duration);
    // Generous upper bound for a loaded CI machine.
    assert!(record.duration < 5_000_000.0, "duration was {}", record.duration);
}

#[test]
fn dur_and_ts_have_three_decimals() {
    let dir = scratch_dir();
    let path = dir.path().join("decimals.json");

    let recorder = Recorder::new();
    recorder.begin_session("S", &path).unwrap();
    recorder
        .write_profile(&Event::new(
            "fixed",
            Duration::from_nanos(2_500),
            Duration::from_micros(40),
            3,
        ))
        .unwrap();
    recorder.end_session();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        format!(
            "{}{}{}",
            HEADER,
            r#",{"cat":"function","dur":40.000,"name":"fixed","ph":"X","pid":0,"tid":3,"ts":2.500}"#,
            FOOTER
        )
    );
}

#[test]
fn second_begin_is_rejected() {
    let dir = scratch_dir();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let recorder = Recorder::new();
    recorder.begin_session("first", &first).unwrap();

    match recorder.begin_session("second", &second) {
        Err(ProfilerError::SessionAlreadyOpen { name }) => assert_eq!(name, "first"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!second.exists());

    recorder
        .write_profile(&Event::new("after", Duration::ZERO, Duration::ZERO, 1))
        .unwrap();
    recorder.end_session();

    let records = read_trace(&first).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "after");
}

#[test]
fn write_without_session_touches_nothing() {
    let dir = scratch_dir();

    let recorder = Recorder::new();
    let result = recorder.write_profile(&Event::new("orphan", Duration::ZERO, Duration::ZERO, 1));
    assert!(matches!(result, Err(ProfilerError::NoActiveSession)));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unopenable_destination() {
    let dir = scratch_dir();
    let path = dir.path().join("missing").join("out.json");

    let recorder = Recorder::new();
    match recorder.begin_session("S", &path) {
        Err(ProfilerError::SinkOpen { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!recorder.is_session_open());
}

#[test]
fn begin_truncates_previous_trace() {
    let dir = scratch_dir();
    let path = dir.path().join("reused.json");

    let recorder = Recorder::new();
    for round in 0..2 {
        recorder.begin_session("S", &path).unwrap();
        recorder.scope(format!("round-{}", round)).finish().unwrap();
        recorder.end_session();
    }

    let records = read_trace(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "round-1");
}

#[test]
fn partial_trace_is_on_disk_before_end() {
    let dir = scratch_dir();
    let path = dir.path().join("partial.json");

    let recorder = Recorder::new();
    recorder.begin_session("S", &path).unwrap();
    {
        let _guard = recorder.scope("flushed");
    }

    // Everything but the footer is already visible to other readers.
    let partial = std::fs::read_to_string(&path).unwrap();
    assert!(partial.starts_with(HEADER));
    assert!(partial.contains(r#""name":"flushed""#));
    assert!(!partial.ends_with(FOOTER));

    let completed = format!("{}{}", partial, FOOTER);
    assert_eq!(parse_trace(&completed).unwrap().len(), 1);

    recorder.end_session();
}

#[test]
fn two_threads_one_region_each() {
    let recorder = Recorder::new();
    let buffer = SharedBuffer::new();
    recorder.begin_session_with_sink("S", buffer.clone()).unwrap();

    let barrier = Barrier::new(2);
    thread::scope(|s| {
        for name in &["left", "right"] {
            let recorder = &recorder;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                let _guard = recorder.scope(*name);
                thread::sleep(Duration::from_millis(1));
            });
        }
    });
    recorder.end_session();

    let records = parse_trace(&buffer.contents()).unwrap();
    let mut names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["left", "right"]);
}

#[test]
fn many_threads_file_sink() {
    let dir = scratch_dir();
    run_end_to_end_trace_test(&dir.path().join("threads.json"), 8, 250);
}

#[test]
fn single_thread_file_sink() {
    let dir = scratch_dir();
    run_end_to_end_trace_test(&dir.path().join("single.json"), 1, 100);
}

#[test]
fn failing_sink_reports_io() {
    struct FailAfterHeader {
        header_written: bool,
    }

    impl std::io::Write for FailAfterHeader {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.header_written {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "gone"));
            }
            self.header_written = true;
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let recorder = Recorder::new();
    recorder
        .begin_session_with_sink("S", FailAfterHeader { header_written: false })
        .unwrap();

    let event = Event::new("lost", Duration::ZERO, Duration::ZERO, 1);
    assert!(matches!(recorder.write_profile(&event), Err(ProfilerError::Io(_))));
    assert!(matches!(
        recorder.write_profile(&event),
        Err(ProfilerError::NoActiveSession)
    ));
    assert_eq!(recorder.session_name(), None);
}
