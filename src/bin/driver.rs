use elevator_dispatch::{
    Direction, DispatchService, ElevatorController, Request, RequestKind, Visit,
};
use std::sync::Arc;
use std::time::Duration;
use tower::filter::Predicate;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

const ELEVATOR_COUNT: usize = 3;
const MAX_FLOOR: u8 = 10;

#[derive(Clone)]
struct Validation;

impl Predicate<Request> for Validation {
    type Request = Request;

    fn check(&mut self, request: Request) -> Result<Self::Request, BoxError> {
        if request.direction == Direction::Idle {
            return Err(BoxError::from("request direction must be UP or DOWN"));
        }
        if request.origin > MAX_FLOOR || request.target > MAX_FLOOR {
            return Err(BoxError::from("request floor out of range"));
        }
        Ok(request)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (visit_tx, mut visit_rx) = tokio::sync::mpsc::unbounded_channel::<Visit>();
    let controller = Arc::new(ElevatorController::new(ELEVATOR_COUNT, MAX_FLOOR, visit_tx)?);
    controller.start();

    let mut svc = ServiceBuilder::new()
        .filter(Validation)
        .service(DispatchService::new(Arc::clone(&controller)));

    let script = [
        Request::new(0, 5, RequestKind::Internal, Direction::Up),
        Request::new(0, 3, RequestKind::Internal, Direction::Up),
        Request::new(0, 1, RequestKind::Internal, Direction::Down),
        Request::new(0, 2, RequestKind::Internal, Direction::Down),
        Request::new(4, 8, RequestKind::External, Direction::Up),
        Request::new(6, 3, RequestKind::External, Direction::Down),
    ];
    for request in script {
        svc.ready().await.map_err(|e| anyhow::anyhow!(e))?;
        if let Err(e) = svc.call(request).await {
            eprintln!("request rejected: {e}");
        }
    }

    // Print the visit trace until the fleet has been quiet for a while.
    while let Ok(Some(visit)) =
        tokio::time::timeout(Duration::from_secs(2), visit_rx.recv()).await
    {
        info!(
            elevator = visit.elevator,
            floor = visit.floor,
            kind = ?visit.kind,
            "visited"
        );
    }
    info!("no more pending stops, shutting down");
    Ok(())
}
