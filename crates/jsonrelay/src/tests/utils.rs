//! Rebuilds `serde_json` trees from event sequences.

use serde_json::{Map, Value};

use crate::{Event, Number, ParseError, Parser, ParserOptions};

enum Frame {
    Array(Vec<Value>),
    Object {
        map: Map<String, Value>,
        key: Option<String>,
        expecting_key: bool,
    },
}

/// Replays events into one tree per top-level document.
pub(crate) fn replay(events: Vec<Event>) -> Result<Vec<Value>, String> {
    let mut roots = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut finish = |stack: &mut Vec<Frame>, value: Value| -> Result<(), String> {
        match stack.last_mut() {
            None => roots.push(value),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { map, key, .. }) => {
                let key = key.take().ok_or_else(|| "value without key".to_string())?;
                map.insert(key, value);
            }
        }
        Ok(())
    };

    for event in events {
        match event {
            Event::ObjectStart => stack.push(Frame::Object {
                map: Map::new(),
                key: None,
                expecting_key: false,
            }),
            Event::ArrayStart => stack.push(Frame::Array(Vec::new())),
            Event::ObjectKey => match stack.last_mut() {
                Some(Frame::Object { expecting_key, .. }) => *expecting_key = true,
                _ => return Err("key outside object".to_string()),
            },
            Event::ObjectValue => match stack.last() {
                Some(Frame::Object { key: Some(_), .. }) => {}
                _ => return Err("value marker without key".to_string()),
            },
            Event::ObjectEnd => match stack.pop() {
                Some(Frame::Object { map, .. }) => finish(&mut stack, Value::Object(map))?,
                _ => return Err("unbalanced object end".to_string()),
            },
            Event::ArrayEnd => match stack.pop() {
                Some(Frame::Array(items)) => finish(&mut stack, Value::Array(items))?,
                _ => return Err("unbalanced array end".to_string()),
            },
            Event::String(s) => match stack.last_mut() {
                Some(Frame::Object {
                    key, expecting_key, ..
                }) if *expecting_key => {
                    *key = Some(s);
                    *expecting_key = false;
                }
                _ => finish(&mut stack, Value::String(s))?,
            },
            Event::Number(Number::Integer(i)) => finish(&mut stack, Value::from(i))?,
            Event::Number(Number::Float(f)) => {
                let number = serde_json::Number::from_f64(f)
                    .ok_or_else(|| "non-finite float".to_string())?;
                finish(&mut stack, Value::Number(number))?;
            }
            Event::Boolean(b) => finish(&mut stack, Value::Bool(b))?,
            Event::Null => finish(&mut stack, Value::Null)?,
            Event::EndOfStream(Some(err)) => return Err(err.to_string()),
            Event::EndOfStream(None) => {
                if !stack.is_empty() {
                    return Err("stream ended inside a container".to_string());
                }
            }
        }
    }

    Ok(roots)
}

pub(crate) fn parse(input: &str) -> Vec<Event> {
    Parser::new(input.as_bytes()).into_events()
}

pub(crate) fn parse_strict(input: &str) -> Vec<Event> {
    Parser::with_options(
        input.as_bytes(),
        ParserOptions {
            panic_on_error: true,
            ..Default::default()
        },
    )
    .into_events()
}

/// The error ending `input`'s parse.
pub(crate) fn parse_error(input: &[u8]) -> ParseError {
    match Parser::new(input).into_events().pop() {
        Some(Event::EndOfStream(Some(err))) => err,
        other => panic!("expected an error for {:?}, got {other:?}", input.escape_ascii().to_string()),
    }
}
