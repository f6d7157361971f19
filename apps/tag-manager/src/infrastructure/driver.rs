//! Cycle driver
//!
//! Background task that exclusively owns the [`TagManager`]. Transport
//! handlers talk to it through a bounded inbox and read the field through a
//! `watch` channel carrying the snapshot published after every cycle.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::{
    FieldSnapshot, InboundMessage, MailEnvelope, Post, PublishedPost, TagError, TagManager,
    TagResult,
};

/// Messages buffered between ticks before senders have to wait
pub const INBOX_CAPACITY: usize = 1024;

/// Posts kept for polling clients
pub const POST_LOG_CAPACITY: usize = 256;

/// Anything the transport can hand to the driver
#[derive(Debug, Clone)]
pub enum Inbound {
    Message(InboundMessage),
    Mail(MailEnvelope),
    /// A report the transport could not decode; counted as dropped
    RejectedReport(String),
}

/// Wall-clock anchored game time in seconds
///
/// Anchored to UTC once, then advanced by a monotonic clock so that
/// system clock adjustments cannot move game time backwards.
#[derive(Debug, Clone, Copy)]
pub struct GameClock {
    anchor: f64,
    started: Instant,
}

impl GameClock {
    pub fn start() -> Self {
        Self {
            anchor: Utc::now().timestamp_millis() as f64 / 1000.0,
            started: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.anchor + self.started.elapsed().as_secs_f64()
    }
}

/// Bounded ring of sequenced posts
#[derive(Debug)]
pub struct PostLog {
    capacity: usize,
    last_seq: u64,
    entries: VecDeque<PublishedPost>,
}

impl PostLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            last_seq: 0,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, posts: Vec<Post>, time: f64) {
        for post in posts {
            self.last_seq += 1;
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(PublishedPost {
                seq: self.last_seq,
                time,
                key: post.key,
                value: post.value,
            });
        }
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn entries(&self) -> Vec<PublishedPost> {
        self.entries.iter().cloned().collect()
    }
}

/// Cloneable handle used by the transport
#[derive(Debug, Clone)]
pub struct DriverHandle {
    inbox: mpsc::Sender<Inbound>,
    snapshot: watch::Receiver<Arc<FieldSnapshot>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl DriverHandle {
    /// Queues a message for the next cycle
    pub async fn submit(&self, inbound: Inbound) -> TagResult<()> {
        self.inbox
            .send(inbound)
            .await
            .map_err(|_| TagError::LoopClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<FieldSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<FieldSnapshot>> {
        self.snapshot.clone()
    }

    /// Asks the driver loop to stop after the current cycle
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Owns the game and runs one cycle per tick
pub struct GameDriver {
    manager: TagManager,
    inbox: mpsc::Receiver<Inbound>,
    snapshot: watch::Sender<Arc<FieldSnapshot>>,
    shutdown: watch::Receiver<bool>,
    tick_interval: Duration,
    clock: GameClock,
    log: PostLog,
}

impl GameDriver {
    pub fn new(manager: TagManager, tick_interval: Duration) -> (Self, DriverHandle) {
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(FieldSnapshot::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let driver = Self {
            manager,
            inbox: inbox_rx,
            snapshot: snapshot_tx,
            shutdown: shutdown_rx,
            tick_interval,
            clock: GameClock::start(),
            log: PostLog::new(POST_LOG_CAPACITY),
        };
        let handle = DriverHandle {
            inbox: inbox_tx,
            snapshot: snapshot_rx,
            shutdown: Arc::new(shutdown_tx),
        };
        (driver, handle)
    }

    /// Applies the inbox backlog, runs one cycle at `now` and publishes the
    /// result
    ///
    /// Messages that arrive while the backlog is applied wait for the next
    /// tick. Returns the number of posts the cycle produced.
    pub fn step(&mut self, now: f64) -> usize {
        let backlog = self.inbox.len();
        let drained = self.drain_inbox(backlog, now);

        let posts = self.manager.run_cycle(now);
        let produced = posts.len();
        self.log.record(posts, now);

        let mut snapshot = self.manager.snapshot(now);
        snapshot.recent_posts = self.log.entries();
        self.snapshot.send_replace(Arc::new(snapshot));

        debug!(drained, produced, last_seq = self.log.last_seq(), "Tick complete");
        produced
    }

    /// Applies at most `limit` queued messages; returns how many were applied
    fn drain_inbox(&mut self, limit: usize, now: f64) -> usize {
        let mut drained = 0usize;
        while drained < limit {
            let Ok(inbound) = self.inbox.try_recv() else {
                break;
            };
            drained += 1;
            let result = match inbound {
                Inbound::Message(message) => self.manager.handle_message(message, now),
                Inbound::Mail(mail) => self.manager.handle_mail(&mail, now),
                Inbound::RejectedReport(reason) => Err(self.manager.reject_report(reason)),
            };
            if let Err(e) = result {
                debug!(reason = e.reason(), "Inbound message not applied: {}", e);
            }
        }
        drained
    }

    /// Runs the cycle loop until shutdown is requested
    pub async fn run(mut self) {
        info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "Starting tag manager cycle loop"
        );

        let mut tick = interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let now = self.clock.now();
                    self.step(now);
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Shutdown signal received, stopping cycle loop");
                        break;
                    }
                }
            }
        }

        info!("Tag manager cycle loop stopped");
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
