use anyhow::bail;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::elevator::{Elevator, Visit};
use crate::request::{Direction, Request};

/// Submission seam between driver-side plumbing and the controller.
#[async_trait]
pub trait RequestSink: Send + Sync {
    async fn submit(&self, request: Request) -> anyhow::Result<()>;
}

/// Owns the fleet and routes every incoming request to the elevator judged
/// best for it. Holds no request queue of its own: assignment is immediate,
/// and the chosen elevator absorbs the request into its stop queues.
#[derive(Debug)]
pub struct ElevatorController {
    elevators: Vec<Arc<Elevator>>,
    max_floor: u8,
}

impl ElevatorController {
    /// Build a fixed fleet, all starting idle at the ground floor. The fleet
    /// never grows or shrinks afterwards.
    pub fn new(
        elevator_count: usize,
        max_floor: u8,
        visit_tx: UnboundedSender<Visit>,
    ) -> anyhow::Result<ElevatorController> {
        if elevator_count == 0 {
            bail!("controller needs at least one elevator");
        }
        let elevators = (0..elevator_count)
            .map(|id| Arc::new(Elevator::new(id, 0, visit_tx.clone())))
            .collect();
        info!(elevator_count, max_floor, "controller initialized");
        Ok(ElevatorController {
            elevators,
            max_floor,
        })
    }

    pub fn elevators(&self) -> &[Arc<Elevator>] {
        &self.elevators
    }

    /// Spawn one worker task per elevator and return immediately. Workers are
    /// neither joined nor supervised. Call once.
    pub fn start(&self) {
        info!(count = self.elevators.len(), "starting elevator workers");
        for elevator in &self.elevators {
            tokio::spawn(Arc::clone(elevator).run());
        }
    }

    /// Pick the elevator best placed to serve a call at `floor` heading
    /// `direction`.
    ///
    /// Compatible elevators (same direction, or idle) are ranked by distance,
    /// with ties broken towards the smaller combined queue to spread load.
    /// If every elevator is moving the opposite way, the nearest one takes
    /// the request anyway; it serves it after it naturally reverses.
    ///
    /// Reads elevator state without taking any elevator's lock; the values
    /// are eventually-consistent ranking signals, not a snapshot.
    pub fn select_best_elevator(&self, floor: u8, direction: Direction) -> &Arc<Elevator> {
        let mut best: Option<&Arc<Elevator>> = None;
        let mut best_distance = u8::MAX;
        for elevator in &self.elevators {
            let current = elevator.direction();
            if current != direction && current != Direction::Idle {
                continue;
            }
            let distance = elevator.current_floor().abs_diff(floor);
            let better = match best {
                None => true,
                Some(leader) => {
                    distance < best_distance
                        || (distance == best_distance
                            && elevator.queued_stops() < leader.queued_stops())
                }
            };
            if better {
                best = Some(elevator);
                best_distance = distance;
            }
        }
        if let Some(elevator) = best {
            debug!(floor, %direction, chosen = elevator.id(), "selected compatible elevator");
            return elevator;
        }
        // All moving the opposite way: closest elevator picks it up on reversal.
        let fallback = self
            .elevators
            .iter()
            .min_by_key(|elevator| elevator.current_floor().abs_diff(floor))
            .expect("fleet is never empty");
        debug!(floor, %direction, chosen = fallback.id(), "no compatible elevator, using nearest");
        fallback
    }

    /// Validate and route one request. Acceptance is a commitment: once
    /// enqueued there is no way to withdraw a stop.
    pub async fn add_request(&self, request: Request) -> anyhow::Result<()> {
        if request.direction == Direction::Idle {
            bail!("request direction must be UP or DOWN");
        }
        if request.origin > self.max_floor || request.target > self.max_floor {
            bail!(
                "request floors {}->{} outside valid range 0..={}",
                request.origin,
                request.target,
                self.max_floor
            );
        }
        let best = self.select_best_elevator(request.origin, request.direction);
        info!(
            origin = request.origin,
            target = request.target,
            direction = %request.direction,
            assigned = best.id(),
            "request assigned"
        );
        if request.direction == Direction::Up {
            best.send_up_request(request).await;
        } else {
            best.send_down_request(request).await;
        }
        Ok(())
    }
}

#[async_trait]
impl RequestSink for ElevatorController {
    async fn submit(&self, request: Request) -> anyhow::Result<()> {
        self.add_request(request).await
    }
}
