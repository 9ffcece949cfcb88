#![no_main]
use std::{cell::RefCell, io::Read};

use arbitrary::Arbitrary;
use jsonrelay::{CoordinateMode, Event, Parser, ParserOptions};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag byte + 4-byte read-size seed

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r", b"\r\n", b"\x0B", b"\x0C", b"\x85", b"\xA0"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed % 10 == 0 {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x0F);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size.max(HEADER + 1) && prefix < max_size {
            let limit = max_size - prefix;
            prefix += append_whitespace(&mut data[prefix..], limit);
            let limit = max_size - prefix;
            prefix += append_document(&mut data[prefix..], size, limit);
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends up to eight whitespace runs without exceeding `limit`.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let runs = rng.random_range(1..=limit.min(8));
        let mut written = 0;
        for _ in 0..runs {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_document(data: &mut [u8], size: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..=size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(document) = ArbitraryDocument::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break document;
        }
    };

    let serialized = serde_json::to_vec(&value.0).unwrap_or_default();
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                if u.arbitrary()? {
                    Value::from(u.arbitrary::<i64>()?)
                } else {
                    let n: f64 = u.arbitrary()?;
                    Value::Number(serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?)
                }
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let members: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(members.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

/// An object or array at the root.
#[derive(Debug)]
struct ArbitraryDocument(Value);

impl<'a> Arbitrary<'a> for ArbitraryDocument {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match ArbitraryValue::arbitrary(u)?.0 {
            root @ (Value::Array(_) | Value::Object(_)) => Ok(Self(root)),
            scalar => Ok(Self(Value::Array(vec![scalar]))),
        }
    }
}

/// Serves the input in reads of varying size.
struct Chunked<'a> {
    data: &'a [u8],
    seed: u64,
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.seed = self.seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let want = (self.seed >> 33) as usize % 64 + 1;
        let n = want.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn has_numbers(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Array(items) => items.iter().any(has_numbers),
        Value::Object(map) => map.values().any(has_numbers),
        _ => false,
    }
}

fn check_shape(events: &[Event]) {
    let terminals = events.iter().filter(|e| e.is_end_of_stream()).count();
    assert_eq!(terminals, 1, "exactly one terminal event");
    assert!(events.last().is_some_and(Event::is_end_of_stream));

    let mut depth = 0i64;
    let mut previous: Option<&Event> = None;
    for event in events {
        match event {
            Event::ObjectStart | Event::ArrayStart => depth += 1,
            Event::ObjectEnd | Event::ArrayEnd => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0, "unbalanced containers");
        if matches!(previous, Some(Event::ObjectKey)) {
            assert!(
                matches!(event, Event::String(_) | Event::EndOfStream(Some(_))),
                "key marker must precede a key"
            );
        }
        previous = Some(event);
    }
    if events.last().is_some_and(|e| e.error().is_none()) {
        assert_eq!(depth, 0, "clean end inside a container");
    }
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let seed = u64::from(u32::from_le_bytes([data[1], data[2], data[3], data[4]]));
    let data = &data[HEADER..];

    let options = ParserOptions {
        allow_multiple_documents: flags & 1 == 0,
        allow_extended_whitespace: flags & 2 == 0,
        coordinates: if flags & 4 == 0 {
            CoordinateMode::StreamAbsolute
        } else {
            CoordinateMode::PerDocument
        },
        max_depth: (flags & 8 != 0).then_some(16),
        panic_on_error: false,
    };

    let events = Parser::with_options(Chunked { data, seed }, options).into_events();
    check_shape(&events);

    // Number spelling differs from serde_json at the edges (u64 range), so
    // only number-free documents are compared.
    if options.max_depth.is_none() {
        if let Ok(reference @ (Value::Array(_) | Value::Object(_))) = serde_json::from_slice::<Value>(data) {
            if !has_numbers(&reference) {
                assert!(
                    events.last().is_some_and(|e| e.error().is_none()),
                    "rejected a document serde_json accepts: {:?}",
                    events.last()
                );
            }
        }
    }
}

fuzz_target!(|data: &[u8]| parser(data));
