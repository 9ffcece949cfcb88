#![expect(missing_docs)]

use std::{
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::unbounded;
use jsonrelay::{
    ErrorKind, Event, Number, Parser, ParserOptions, SinkError, StreamOptions, spawn, spawn_with,
};

mod common;

use common::{Failing, large_array, tracked};

#[test]
fn drained_stream_matches_direct_parse() {
    let input = r#"{"a": [1, 2.5, "x", true, null]} [{}]"#;
    let direct = Parser::new(input.as_bytes()).into_events();

    let streamed: Vec<Event> = spawn(input.as_bytes(), ParserOptions::default())
        .unwrap()
        .collect();
    assert_eq!(streamed, direct);
}

#[test]
fn rendezvous_holds_the_worker_back() {
    let (reader, probe) = tracked(large_array(20_000));
    let mut stream = spawn(reader, ParserOptions::default()).unwrap();

    assert_eq!(stream.next(), Some(Event::ArrayStart));
    thread::sleep(Duration::from_millis(50));
    assert!(stream.receiver().is_empty());
    assert!(
        probe.bytes_read() <= 8 * 1024,
        "worker ran ahead: {} bytes read",
        probe.bytes_read()
    );

    let numbers = stream
        .by_ref()
        .take_while(|event| !event.is_end_of_stream())
        .filter(|event| matches!(event, Event::Number(_)))
        .count();
    assert_eq!(numbers, 20_000);
    assert!(probe.wait_dropped());
}

#[test]
fn cancel_stops_without_end_of_stream() {
    let (reader, probe) = tracked(large_array(20_000));
    let mut stream = spawn(reader, ParserOptions::default()).unwrap();

    assert_eq!(stream.next(), Some(Event::ArrayStart));
    assert_eq!(stream.next(), Some(Event::Number(Number::Integer(0))));
    stream.cancel();

    let rest: Vec<Event> = stream.by_ref().collect();
    assert!(rest.len() <= 1, "{rest:?}");
    assert!(rest.iter().all(|event| !event.is_end_of_stream()));
    assert!(probe.wait_dropped());
    stream.join().unwrap();
}

#[test]
fn canceller_works_from_another_thread() {
    let (reader, probe) = tracked(large_array(100));
    let mut stream = spawn(reader, ParserOptions::default()).unwrap();
    let canceller = stream.canceller();

    thread::spawn(move || canceller.cancel()).join().unwrap();

    assert!(probe.wait_dropped());
    assert_eq!(stream.next(), None);
}

#[test]
fn deadline_aborts_an_abandoned_stream() {
    let (reader, probe) = tracked(large_array(100));
    let mut stream = spawn_with(
        reader,
        ParserOptions::default(),
        StreamOptions {
            deadline: Some(Instant::now() + Duration::from_millis(50)),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(probe.wait_dropped());
    assert_eq!(stream.next(), None);
}

#[test]
fn distant_deadline_does_not_interfere() {
    let stream = spawn_with(
        &b"[1, 2, 3]"[..],
        ParserOptions::default(),
        StreamOptions {
            deadline: Some(Instant::now() + Duration::from_secs(3600)),
            ..Default::default()
        },
    )
    .unwrap();
    let events: Vec<_> = stream.collect();
    assert_eq!(events.len(), 6);
    assert_eq!(events.last(), Some(&Event::EndOfStream(None)));
}

#[test]
fn dropping_the_stream_releases_the_reader() {
    let (reader, probe) = tracked(large_array(20_000));
    let mut stream = spawn(reader, ParserOptions::default()).unwrap();
    assert_eq!(stream.next(), Some(Event::ArrayStart));
    drop(stream);
    assert!(probe.wait_dropped());
}

#[test]
fn buffered_stream_lets_the_worker_finish_first() {
    let (reader, probe) = tracked(r#"{"a": [true, false]}"#);
    let stream = spawn_with(
        reader,
        ParserOptions::default(),
        StreamOptions {
            capacity: 64,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(probe.wait_dropped());
    assert_eq!(stream.receiver().len(), 10);
    assert_eq!(stream.last(), Some(Event::EndOfStream(None)));
}

#[test]
fn io_errors_end_the_stream() {
    let stream = spawn(Failing(b"[1, 2"), ParserOptions::default()).unwrap();
    let events: Vec<_> = stream.collect();
    let Some(Event::EndOfStream(Some(err))) = events.last() else {
        panic!("expected a terminal error, got {events:?}");
    };
    let ErrorKind::Io(source) = err.kind() else {
        panic!("expected an i/o error, got {err}");
    };
    assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
    assert_eq!((err.line(), err.position()), (1, 5));
}

#[test]
fn plain_sender_as_sink() {
    let (mut tx, rx) = unbounded::<Event>();
    let worker = thread::spawn(move || Parser::new(&b"[null]"[..]).parse(&mut tx));
    let events: Vec<Event> = rx.iter().collect();
    assert_eq!(worker.join().unwrap(), Ok(()));
    assert_eq!(
        events,
        [Event::ArrayStart, Event::Null, Event::ArrayEnd, Event::EndOfStream(None)]
    );
}

#[test]
fn plain_sender_reports_a_gone_consumer() {
    let (mut tx, rx) = unbounded::<Event>();
    drop(rx);
    let result = Parser::new(&b"[null]"[..]).parse(&mut tx);
    assert_eq!(result, Err(SinkError::Disconnected));
}
