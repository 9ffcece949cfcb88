//! Running a parse on its own thread.
use std::{
    io::{self, Read},
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, bounded};
use tracing::debug;

use crate::{
    event::Event,
    options::{ParserOptions, StreamOptions},
    parser::Parser,
    sink::{Canceller, ChannelSink},
};

/// Parses `reader` on a new worker thread, delivering each event by
/// rendezvous.
///
/// # Errors
///
/// Fails if the operating system refuses to create the thread.
pub fn spawn<R>(reader: R, options: ParserOptions) -> io::Result<EventStream>
where
    R: Read + Send + 'static,
{
    spawn_with(reader, options, StreamOptions::default())
}

/// Like [`spawn`], with control over buffering, deadline and thread name.
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use jsonrelay::{Event, ParserOptions, StreamOptions, spawn_with};
///
/// let stream = spawn_with(
///     &b"[true]"[..],
///     ParserOptions::default(),
///     StreamOptions {
///         capacity: 16,
///         deadline: Some(Instant::now() + Duration::from_secs(60)),
///         ..Default::default()
///     },
/// )
/// .unwrap();
/// let events: Vec<_> = stream.collect();
/// assert_eq!(events.len(), 4);
/// assert_eq!(events[3], Event::EndOfStream(None));
/// ```
///
/// # Errors
///
/// Fails if the operating system refuses to create the thread.
pub fn spawn_with<R>(
    reader: R,
    options: ParserOptions,
    stream: StreamOptions,
) -> io::Result<EventStream>
where
    R: Read + Send + 'static,
{
    let (sender, events) = bounded(stream.capacity);
    let (mut sink, canceller) = ChannelSink::new(sender, stream.deadline);

    debug!(thread = %stream.thread_name, capacity = stream.capacity, "spawning parser worker");
    let handle = thread::Builder::new()
        .name(stream.thread_name)
        .spawn(move || {
            match Parser::with_options(reader, options).parse(&mut sink) {
                Ok(()) => debug!("parser worker finished"),
                Err(err) => debug!(%err, "parser worker stopped early"),
            }
        })?;

    Ok(EventStream {
        events,
        canceller,
        handle: Some(handle),
    })
}

/// The consuming end of a parse running on a worker thread.
///
/// Iterating yields every event in order, ending after
/// [`Event::EndOfStream`]. Dropping the stream early cancels the worker,
/// which then exits and releases its reader.
#[derive(Debug)]
pub struct EventStream {
    events: Receiver<Event>,
    canceller: Canceller,
    handle: Option<JoinHandle<()>>,
}

impl EventStream {
    /// Stops the worker at its next emission. Events already buffered can
    /// still be received.
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// A handle that cancels this stream from elsewhere.
    #[must_use]
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// The underlying channel, for use with `crossbeam_channel::select!`.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Cancels the worker if it is still running and waits for it to exit.
    ///
    /// Events not yet received are discarded.
    ///
    /// # Errors
    ///
    /// Returns the worker's panic payload if it panicked.
    pub fn join(mut self) -> thread::Result<()> {
        self.canceller.cancel();
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Iterator for EventStream {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.events.recv().ok()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.canceller.cancel();
    }
}
