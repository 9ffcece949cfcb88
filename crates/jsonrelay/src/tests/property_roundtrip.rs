use quickcheck::{QuickCheck, TestResult};
use quickcheck_macros::quickcheck;
use serde_json::Value;

use super::{
    arbitrary::Document,
    utils::{parse, replay},
};

fn tests() -> u64 {
    if is_ci::cached() { 10_000 } else { 1_000 }
}

/// Property: replaying the events of any object or array document rebuilds
/// exactly the tree `serde_json` decodes from the same text, compact or
/// pretty-printed.
#[test]
fn replay_matches_serde_json() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Document, pretty: bool) -> TestResult {
        let text = if pretty {
            serde_json::to_string_pretty(&doc.0)
        } else {
            serde_json::to_string(&doc.0)
        };
        let Ok(text) = text else {
            return TestResult::discard();
        };
        let reference: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => return TestResult::discard(),
        };

        match replay(parse(&text)) {
            Ok(roots) => TestResult::from_bool(roots == [reference]),
            Err(err) => TestResult::error(format!("{err} while parsing {text}")),
        }
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Document, bool) -> TestResult);
}

/// Property: re-serializing the replayed tree and parsing it again yields the
/// same event sequence.
#[test]
fn events_are_idempotent() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Document) -> TestResult {
        let Ok(text) = serde_json::to_string_pretty(&doc.0) else {
            return TestResult::discard();
        };
        let first = parse(&text);
        let Ok(roots) = replay(first.clone()) else {
            return TestResult::failed();
        };
        let Ok(again) = serde_json::to_string(&roots[0]) else {
            return TestResult::failed();
        };
        TestResult::from_bool(parse(&again) == first)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Document) -> TestResult);
}

/// Property: documents joined by arbitrary JSON whitespace come back as
/// separate roots, in order.
#[quickcheck]
fn concatenated_documents_split_back(docs: Vec<Document>, separators: Vec<u8>) -> TestResult {
    if docs.is_empty() {
        return TestResult::discard();
    }
    let whitespace = [" ", "\n", "\t", "\r\n", ""];
    let mut text = String::new();
    for (i, doc) in docs.iter().enumerate() {
        let Ok(encoded) = serde_json::to_string(&doc.0) else {
            return TestResult::discard();
        };
        text.push_str(&encoded);
        let sep = separators.get(i).copied().unwrap_or(0);
        text.push_str(whitespace[usize::from(sep) % whitespace.len()]);
    }

    let expected: Vec<Value> = docs.into_iter().map(|doc| doc.0).collect();
    match replay(parse(&text)) {
        Ok(roots) => TestResult::from_bool(roots == expected),
        Err(err) => TestResult::error(err),
    }
}
