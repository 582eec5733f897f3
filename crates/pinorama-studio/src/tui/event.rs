use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Input the studio reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    /// Bracketed paste, delivered as one block
    Paste(String),
    Resize(u16, u16),
    Error(String),
}

impl Event {
    /// Studio event for a terminal event; key releases and repeats are dropped
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            CrosstermEvent::Paste(text) => Some(Self::Paste(text)),
            CrosstermEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Background reader of terminal input plus a redraw tick
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_input(sender, cancel.clone(), tick_rate));

        Self {
            receiver,
            cancel,
            task,
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Stop reading input and wait for the reader task to end
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Event reader task failed");
        }
    }
}

async fn read_input(
    sender: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
) {
    let mut stream = EventStream::new();
    let mut ticks = tokio::time::interval(tick_rate);

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticks.tick() => Some(Event::Tick),
            input = stream.next().fuse() => match input {
                Some(Ok(input)) => Event::from_terminal(input),
                Some(Err(e)) => Some(Event::Error(e.to_string())),
                None => return,
            },
        };

        if let Some(event) = event {
            if sender.send(event).is_err() {
                return;
            }
        }
    }
}
