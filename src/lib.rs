pub mod controller;
pub mod elevator;
pub mod request;
pub mod service;

pub use controller::{ElevatorController, RequestSink};
pub use elevator::{Elevator, Visit, VisitKind};
pub use request::{Direction, Request, RequestKind};
pub use service::DispatchService;
