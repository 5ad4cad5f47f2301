use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info};

use crate::request::{Direction, Request, RequestKind};

/// One floor an elevator has to visit. Ordered by `(floor, origin)` so heaps
/// of stops pop in physical travel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Stop {
    floor: u8,
    origin: u8,
}

/// The two direction-specific stop queues, guarded together by one mutex.
///
/// `up` is a min-heap (via `Reverse`), so the lowest pending floor pops first
/// while travelling up. `down` is a plain max-heap, which is the explicit
/// equivalent of the classic "min-heap over negated floors" trick: the highest
/// pending floor pops first while travelling down.
#[derive(Debug, Default)]
struct StopQueues {
    up: BinaryHeap<Reverse<Stop>>,
    down: BinaryHeap<Stop>,
}

impl StopQueues {
    fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }
}

/// Why a stop was made, for the visit trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    Pickup,
    DropOff,
}

/// Emitted on the visit channel every time an elevator services a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub elevator: usize,
    pub floor: u8,
    pub kind: VisitKind,
}

/// An independent elevator worker.
///
/// The stop queues are shared with submitters under `stops`; `current_floor`
/// and `direction` are published through atomics so the controller can rank
/// elevators without touching the lock. Those reads are advisory signals for
/// assignment, not a consistent snapshot.
#[derive(Debug)]
pub struct Elevator {
    id: usize,
    current_floor: AtomicU8,
    direction: AtomicU8,
    queued: AtomicUsize,
    stops: Mutex<StopQueues>,
    work_available: Notify,
    visit_tx: tokio::sync::mpsc::UnboundedSender<Visit>,
}

impl Elevator {
    pub fn new(
        id: usize,
        initial_floor: u8,
        visit_tx: tokio::sync::mpsc::UnboundedSender<Visit>,
    ) -> Elevator {
        Elevator {
            id,
            current_floor: AtomicU8::new(initial_floor),
            direction: AtomicU8::new(Direction::Idle.bits()),
            queued: AtomicUsize::new(0),
            stops: Mutex::new(StopQueues::default()),
            work_available: Notify::new(),
            visit_tx,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn current_floor(&self) -> u8 {
        self.current_floor.load(Ordering::Relaxed)
    }

    pub fn direction(&self) -> Direction {
        Direction::from_bits(self.direction.load(Ordering::Relaxed))
    }

    /// Combined length of both stop queues.
    pub fn queued_stops(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    fn store_direction(&self, direction: Direction) {
        self.direction.store(direction.bits(), Ordering::Relaxed);
    }

    /// Queue an upward request and wake the worker if it was waiting.
    /// An external call gets a pickup stop at its origin floor so the rider
    /// is collected in proper scan order on the way up.
    pub async fn send_up_request(&self, request: Request) {
        let mut queues = self.stops.lock().await;
        if request.kind == RequestKind::External {
            queues.up.push(Reverse(Stop {
                floor: request.origin,
                origin: request.origin,
            }));
            self.queued.fetch_add(1, Ordering::Relaxed);
        }
        queues.up.push(Reverse(Stop {
            floor: request.target,
            origin: request.origin,
        }));
        self.queued.fetch_add(1, Ordering::Relaxed);
        info!(
            elevator = self.id,
            origin = request.origin,
            target = request.target,
            pending = queues.up.len(),
            "up request queued"
        );
        drop(queues);
        self.work_available.notify_one();
    }

    /// Queue a downward request and wake the worker if it was waiting.
    pub async fn send_down_request(&self, request: Request) {
        let mut queues = self.stops.lock().await;
        if request.kind == RequestKind::External {
            queues.down.push(Stop {
                floor: request.origin,
                origin: request.origin,
            });
            self.queued.fetch_add(1, Ordering::Relaxed);
        }
        queues.down.push(Stop {
            floor: request.target,
            origin: request.origin,
        });
        self.queued.fetch_add(1, Ordering::Relaxed);
        info!(
            elevator = self.id,
            origin = request.origin,
            target = request.target,
            pending = queues.down.len(),
            "down request queued"
        );
        drop(queues);
        self.work_available.notify_one();
    }

    /// Worker loop. Blocks while both queues are empty, then services a batch
    /// of stops in scan order. Runs for the lifetime of the process.
    pub async fn run(self: Arc<Self>) {
        info!(elevator = self.id, floor = self.current_floor(), "worker started");
        loop {
            // Arm the wakeup before checking the queues; Notify's permit
            // keeps a push that lands in between from being lost.
            let notified = self.work_available.notified();
            let has_work = !self.stops.lock().await.is_empty();
            if !has_work {
                debug!(elevator = self.id, "idle, waiting for request");
                notified.await;
                continue;
            }
            info!(
                elevator = self.id,
                pending = self.queued_stops(),
                "servicing stops"
            );
            self.process_requests().await;
        }
    }

    /// One batch: finish the direction already committed to before turning
    /// around, SCAN-style. An idle elevator commits upward first.
    async fn process_requests(&self) {
        match self.direction() {
            Direction::Up | Direction::Idle => {
                self.process_up_requests().await;
                self.process_down_requests().await;
            }
            Direction::Down => {
                self.process_down_requests().await;
                self.process_up_requests().await;
            }
        }
    }

    /// Drain the up queue, visiting floors in ascending order. The lock is
    /// released between pops so requests arriving mid-drain merge into the
    /// same heap and are seen by the very next pop.
    async fn process_up_requests(&self) {
        loop {
            let popped = self.stops.lock().await.up.pop();
            let Some(Reverse(stop)) = popped else { break };
            self.queued.fetch_sub(1, Ordering::Relaxed);
            self.current_floor.store(stop.floor, Ordering::Relaxed);
            self.record_visit(stop);
        }
        let next = if self.stops.lock().await.down.is_empty() {
            Direction::Idle
        } else {
            Direction::Down
        };
        self.store_direction(next);
    }

    /// Drain the down queue, visiting floors in descending order.
    async fn process_down_requests(&self) {
        loop {
            let popped = self.stops.lock().await.down.pop();
            let Some(stop) = popped else { break };
            self.queued.fetch_sub(1, Ordering::Relaxed);
            self.current_floor.store(stop.floor, Ordering::Relaxed);
            self.record_visit(stop);
        }
        let next = if self.stops.lock().await.up.is_empty() {
            Direction::Idle
        } else {
            Direction::Up
        };
        self.store_direction(next);
    }

    fn record_visit(&self, stop: Stop) {
        let kind = if stop.floor == stop.origin {
            info!(elevator = self.id, floor = stop.floor, "pick up");
            VisitKind::Pickup
        } else {
            info!(elevator = self.id, floor = stop.floor, "drop off");
            VisitKind::DropOff
        };
        // Nobody has to listen; the trace is observability only.
        let _ = self.visit_tx.send(Visit {
            elevator: self.id,
            floor: stop.floor,
            kind,
        });
    }

    #[cfg(test)]
    pub(crate) fn set_state(&self, floor: u8, direction: Direction) {
        self.current_floor.store(floor, Ordering::Relaxed);
        self.store_direction(direction);
    }
}
