//! Read-ahead tree reader
//!
//! A producer thread runs a [`TreeReader`] and sends results over a bounded
//! channel; the consumer receives them with [`ThreadedTreeReader::next_tree`].
//! The producer blocks while the channel is full, the consumer while it is
//! empty and the producer is still running. A second, never-written channel
//! signals close: dropping its sender wakes every `select!` waiting on it.

use crate::error::TreebankError;
use crate::reader::{ReaderConfig, TreeReader};
use crate::tree::Tree;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use std::io::{BufRead, Cursor};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::debug;

type QueueItem = Result<Tree, TreebankError>;

/// Tree reader that parses ahead on a background thread
///
/// Dropping the reader closes it; the producer thread notices at its next
/// send and exits on its own. If the producer panics its sender is dropped
/// and consumers see end of input.
pub struct ThreadedTreeReader {
    items: Receiver<QueueItem>,
    // Taken and dropped by close()
    close_tx: Mutex<Option<Sender<()>>>,
    close_rx: Receiver<()>,
    filename: String,
}

impl ThreadedTreeReader {
    /// Move `reader` onto a producer thread
    pub fn new<R>(reader: TreeReader<R>, capacity: usize) -> Result<Self, TreebankError>
    where
        R: BufRead + Send + 'static,
    {
        let (items_tx, items) = bounded(capacity.max(1));
        let (close_tx, close_rx) = bounded(0);

        let filename = reader.filename().to_string();
        let producer_close = close_rx.clone();
        thread::Builder::new()
            .name(format!("tbtree-reader:{}", filename))
            .spawn(move || produce(reader, items_tx, producer_close))?;

        Ok(Self {
            items,
            close_tx: Mutex::new(Some(close_tx)),
            close_rx,
            filename,
        })
    }

    pub fn from_reader<R>(
        reader: R,
        filename: &str,
        config: &ReaderConfig,
    ) -> Result<Self, TreebankError>
    where
        R: BufRead + Send + 'static,
    {
        Self::new(TreeReader::from_reader(reader, filename, config), config.queue_capacity)
    }

    pub fn from_string(text: &str) -> Result<Self, TreebankError> {
        let config = ReaderConfig::default();
        Self::new(TreeReader::from_string(text), config.queue_capacity)
    }

    pub fn from_file(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Self, TreebankError> {
        let reader = TreeReader::from_file(path, config)?;
        Self::new(reader, config.queue_capacity)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Next tree in input order, `Ok(None)` at end of input or after close
    pub fn next_tree(&self) -> Result<Option<Tree>, TreebankError> {
        if self.is_closed() {
            return Ok(None);
        }
        select! {
            recv(self.items) -> item => match item {
                Ok(item) if !self.is_closed() => item.map(Some),
                // Producer gone, or closed while we were waiting
                _ => Ok(None),
            },
            recv(self.close_rx) -> _ => Ok(None),
        }
    }

    /// Stop reading: buffered trees are dropped and waiters woken
    pub fn close(&self) {
        let sender = self
            .close_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(sender) = sender else {
            return;
        };
        drop(sender);

        let discarded = self.items.try_iter().count();
        debug!(file = %self.filename, discarded, "closing threaded reader");
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.close_rx.try_recv(), Err(TryRecvError::Disconnected))
    }
}

fn produce<R: BufRead>(mut reader: TreeReader<R>, items: Sender<QueueItem>, closed: Receiver<()>) {
    loop {
        let item = match reader.next_tree() {
            Ok(Some(tree)) => Ok(tree),
            Ok(None) => break,
            Err(err) => Err(err),
        };
        let fatal = matches!(&item, Err(err) if !err.is_recoverable());
        let sent = select! {
            send(items, item) -> res => res.is_ok(),
            recv(closed) -> _ => false,
        };
        if !sent || fatal {
            break;
        }
    }
    debug!(file = reader.filename(), groups = reader.groups_read(), "producer finished");
}

impl Drop for ThreadedTreeReader {
    fn drop(&mut self) {
        self.close();
    }
}

impl Iterator for ThreadedTreeReader {
    type Item = QueueItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_tree().transpose()
    }
}

/// Reader over in-memory text on a producer thread
impl TryFrom<String> for ThreadedTreeReader {
    type Error = TreebankError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let config = ReaderConfig::default();
        Self::new(
            TreeReader::from_reader(Cursor::new(text), "<string>", &config),
            config.queue_capacity,
        )
    }
}
