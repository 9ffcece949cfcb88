//! Destinations for parser events.
//!
//! The parser pushes every event into an [`EventSink`]. A sink may refuse an
//! event, which stops the parse immediately and without a terminal
//! [`Event::EndOfStream`]: there is nobody left to tell.
use std::time::Instant;

use crossbeam_channel::{Receiver, Select, Sender, TrySendError, bounded, never};
use thiserror::Error;

use crate::event::Event;

/// Why a sink refused an event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side is gone.
    #[error("event consumer disconnected")]
    Disconnected,
    /// [`Canceller::cancel`] was called.
    #[error("parse cancelled")]
    Cancelled,
    /// The configured deadline passed while the event was undelivered.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Receives the parser's events in order.
pub trait EventSink {
    /// Accepts one event, blocking as long as the sink requires.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] when the event cannot be delivered; the parser
    /// stops without emitting anything further.
    fn emit(&mut self, event: Event) -> Result<(), SinkError>;
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        self.push(event);
        Ok(())
    }
}

impl EventSink for Sender<Event> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        self.send(event).map_err(|_| SinkError::Disconnected)
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

/// A cloneable handle that aborts a parse blocked on a [`ChannelSink`].
///
/// Cancelling is idempotent and never blocks.
#[derive(Debug, Clone)]
pub struct Canceller {
    signal: Sender<()>,
}

impl Canceller {
    /// Asks the parser to stop at its next emission.
    pub fn cancel(&self) {
        // A full channel means a cancel is already pending; a disconnected
        // one means the sink is gone. Both are fine.
        let _ = self.signal.try_send(());
    }
}

/// A channel sender that also observes a cancellation signal and an optional
/// deadline while blocked.
///
/// ```
/// use crossbeam_channel::bounded;
/// use jsonrelay::{ChannelSink, Parser, SinkError};
///
/// let (tx, rx) = bounded(0);
/// let (mut sink, canceller) = ChannelSink::new(tx, None);
/// canceller.cancel();
/// assert_eq!(Parser::new(&b"[1]"[..]).parse(&mut sink), Err(SinkError::Cancelled));
/// assert!(rx.try_recv().is_err());
/// ```
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<Event>,
    cancel: Receiver<()>,
    deadline: Option<Instant>,
    timer: Receiver<Instant>,
}

impl ChannelSink {
    /// Wraps `sender`, returning the sink and the handle that cancels it.
    #[must_use]
    pub fn new(sender: Sender<Event>, deadline: Option<Instant>) -> (Self, Canceller) {
        let (signal, cancel) = bounded(1);
        let timer = deadline.map_or_else(never, crossbeam_channel::at);
        let sink = Self {
            sender,
            cancel,
            deadline,
            timer,
        };
        (sink, Canceller { signal })
    }

    fn check(&self) -> Result<(), SinkError> {
        if self.cancel.try_recv().is_ok() {
            return Err(SinkError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SinkError::DeadlineExceeded);
        }
        Ok(())
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        self.check()?;

        // Fast path for buffered channels with room to spare.
        let event = match self.sender.try_send(event) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Disconnected(_)) => return Err(SinkError::Disconnected),
            Err(TrySendError::Full(event)) => event,
        };

        let mut select = Select::new();
        let send = select.send(&self.sender);
        let mut cancel = Some(select.recv(&self.cancel));
        let timer = select.recv(&self.timer);

        loop {
            let oper = select.select();
            let index = oper.index();
            if index == send {
                return oper
                    .send(&self.sender, event)
                    .map_err(|_| SinkError::Disconnected);
            } else if Some(index) == cancel {
                match oper.recv(&self.cancel) {
                    Ok(()) => return Err(SinkError::Cancelled),
                    // Every canceller was dropped; nobody can cancel any more.
                    Err(_) => {
                        select.remove(index);
                        cancel = None;
                    }
                }
            } else if index == timer {
                let _ = oper.recv(&self.timer);
                return Err(SinkError::DeadlineExceeded);
            }
        }
    }
}
