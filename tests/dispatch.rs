use elevator_dispatch::{
    Direction, ElevatorController, Request, RequestKind, Visit, VisitKind,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

async fn collect_visits(rx: &mut UnboundedReceiver<Visit>, n: usize) -> Vec<Visit> {
    let mut visits = Vec::with_capacity(n);
    for _ in 0..n {
        let visit = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a visit")
            .expect("visit channel closed");
        visits.push(visit);
    }
    visits
}

fn fleet(elevator_count: usize) -> (Arc<ElevatorController>, UnboundedReceiver<Visit>) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let controller = ElevatorController::new(elevator_count, 10, tx).unwrap();
    (Arc::new(controller), rx)
}

#[tokio::test]
async fn up_phase_visits_floors_in_ascending_order() {
    let (controller, mut rx) = fleet(1);
    for target in [5, 2, 9, 4] {
        controller
            .add_request(Request::new(0, target, RequestKind::Internal, Direction::Up))
            .await
            .unwrap();
    }
    controller
        .add_request(Request::new(6, 8, RequestKind::External, Direction::Up))
        .await
        .unwrap();
    controller.start();

    let visits = collect_visits(&mut rx, 6).await;
    let floors: Vec<u8> = visits.iter().map(|v| v.floor).collect();
    assert_eq!(floors, vec![2, 4, 5, 6, 8, 9]);
    assert_eq!(visits[3].kind, VisitKind::Pickup);
    assert!(visits.iter().all(|v| v.elevator == 0));
}

#[tokio::test]
async fn down_phase_visits_floors_in_descending_order() {
    let (controller, mut rx) = fleet(1);
    for target in [3, 7, 1] {
        controller
            .add_request(Request::new(10, target, RequestKind::Internal, Direction::Down))
            .await
            .unwrap();
    }
    controller
        .add_request(Request::new(6, 2, RequestKind::External, Direction::Down))
        .await
        .unwrap();
    controller.start();

    let visits = collect_visits(&mut rx, 5).await;
    let floors: Vec<u8> = visits.iter().map(|v| v.floor).collect();
    assert_eq!(floors, vec![7, 6, 3, 2, 1]);
    assert_eq!(visits[1].kind, VisitKind::Pickup);
}

#[tokio::test]
async fn up_batch_is_served_before_direction_flips_down() {
    let (controller, mut rx) = fleet(1);
    controller
        .add_request(Request::new(0, 5, RequestKind::Internal, Direction::Up))
        .await
        .unwrap();
    controller
        .add_request(Request::new(3, 1, RequestKind::Internal, Direction::Down))
        .await
        .unwrap();
    controller.start();

    let visits = collect_visits(&mut rx, 2).await;
    let floors: Vec<u8> = visits.iter().map(|v| v.floor).collect();
    assert_eq!(floors, vec![5, 1]);
    let elevator = &controller.elevators()[0];
    assert_eq!(elevator.current_floor(), 1);
}

#[tokio::test]
async fn requests_submitted_while_running_are_not_lost() {
    let (controller, mut rx) = fleet(1);
    controller.start();

    controller
        .add_request(Request::new(0, 5, RequestKind::Internal, Direction::Up))
        .await
        .unwrap();
    let first = collect_visits(&mut rx, 1).await;
    assert_eq!(first[0].floor, 5);

    controller
        .add_request(Request::new(5, 1, RequestKind::Internal, Direction::Down))
        .await
        .unwrap();
    let second = collect_visits(&mut rx, 1).await;
    assert_eq!(second[0].floor, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_are_all_served_exactly_once() {
    const SUBMITTERS: usize = 8;
    const PER_SUBMITTER: usize = 25;

    let (controller, mut rx) = fleet(3);
    controller.start();

    let mut expected: Vec<u8> = Vec::new();
    for task in 0..SUBMITTERS {
        for i in 0..PER_SUBMITTER {
            let floor = ((task + i) % 10) as u8;
            if i % 2 == 0 {
                expected.push(floor + 1);
            } else {
                expected.push(floor);
            }
        }
    }

    let mut handles = Vec::new();
    for task in 0..SUBMITTERS {
        let controller = Arc::clone(&controller);
        handles.push(tokio::spawn(async move {
            for i in 0..PER_SUBMITTER {
                let floor = ((task + i) % 10) as u8;
                let request = if i % 2 == 0 {
                    Request::new(0, floor + 1, RequestKind::Internal, Direction::Up)
                } else {
                    Request::new(10, floor, RequestKind::Internal, Direction::Down)
                };
                controller.add_request(request).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let visits = collect_visits(&mut rx, SUBMITTERS * PER_SUBMITTER).await;
    let mut observed: Vec<u8> = visits.iter().map(|v| v.floor).collect();
    observed.sort_unstable();
    expected.sort_unstable();
    assert_eq!(observed, expected);

    // Nothing left behind once every request has been served.
    assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
}
