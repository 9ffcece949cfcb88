#![allow(missing_docs)]

use std::{
    io::{self, Read},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

/// A JSON array of `n` integers, large enough to outrun the read buffer.
pub fn large_array(n: usize) -> String {
    let items: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// A byte source that reports how much was read and when it was dropped.
pub struct Tracked {
    data: Vec<u8>,
    pos: usize,
    read: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

/// Observes a [`Tracked`] reader from the test thread.
#[derive(Clone)]
pub struct Probe {
    read: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

pub fn tracked(data: impl Into<Vec<u8>>) -> (Tracked, Probe) {
    let read = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicBool::new(false));
    let reader = Tracked {
        data: data.into(),
        pos: 0,
        read: Arc::clone(&read),
        dropped: Arc::clone(&dropped),
    };
    (reader, Probe { read, dropped })
}

impl Read for Tracked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        self.read.fetch_add(n, Ordering::SeqCst);
        Ok(n)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl Probe {
    pub fn bytes_read(&self) -> usize {
        self.read.load(Ordering::SeqCst)
    }

    /// Waits up to five seconds for the reader to be released.
    pub fn wait_dropped(&self) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if self.dropped.load(Ordering::SeqCst) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

/// A reader that fails after yielding its data.
pub struct Failing(pub &'static [u8]);

impl Read for Failing {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.0.is_empty() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "source closed"));
        }
        let n = self.0.len().min(buf.len());
        buf[..n].copy_from_slice(&self.0[..n]);
        self.0 = &self.0[n..];
        Ok(n)
    }
}
