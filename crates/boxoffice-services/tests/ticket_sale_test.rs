//! Integration tests for queue processing
//!
//! Runs the ticket sale service and hold sweeper against the in-memory
//! repositories.

use boxoffice_core::clock::{Clock, ManualClock, SystemClock};
use boxoffice_core::models::{EnqueueReservation, NewSale, ReservationStatus, Sale};
use boxoffice_core::AppError;
use boxoffice_db::{MemoryReservationRepository, MemorySaleRepository};
use boxoffice_services::{HoldSweeper, SaleLocks, TicketSaleService};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

type Service = TicketSaleService<MemorySaleRepository, MemoryReservationRepository>;
type Sweeper = HoldSweeper<MemorySaleRepository, MemoryReservationRepository>;

struct Harness {
    service: Arc<Service>,
    sweeper: Sweeper,
}

fn harness(clock: Arc<dyn Clock>) -> Harness {
    let sales = Arc::new(MemorySaleRepository::new());
    let reservations = Arc::new(MemoryReservationRepository::new());
    let locks = Arc::new(SaleLocks::new());

    Harness {
        service: Arc::new(TicketSaleService::new(
            sales.clone(),
            reservations.clone(),
            clock.clone(),
            locks.clone(),
            Duration::minutes(8),
        )),
        sweeper: HoldSweeper::new(sales, reservations, clock, locks),
    }
}

async fn create_sale(service: &Service, capacity: i32) -> Sale {
    service
        .create_sale(NewSale {
            name: format!("event-{}", Uuid::new_v4()),
            capacity,
        })
        .await
        .unwrap()
}

async fn queue(service: &Service, sale: &Sale, quantity: i32) -> String {
    let number = Uuid::new_v4().to_string();
    service
        .queue_reservation(sale.id, EnqueueReservation::new(quantity, number.clone()))
        .await
        .unwrap();
    number
}

async fn status(service: &Service, number: &str) -> ReservationStatus {
    service.find_reservation(number).await.unwrap().status
}

#[tokio::test]
async fn test_available_tickets_activate_reservation() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 1).await;
    queue(&h.service, &sale, 1).await;

    h.service.process_queue(sale.id).await.unwrap();

    let reservation = h.service.reservations(sale.id, None).await.unwrap().remove(0);
    assert_eq!(reservation.status, ReservationStatus::Active);

    let expected = Utc::now() + Duration::minutes(8);
    let valid_until = reservation.valid_until.unwrap();
    assert!((valid_until - expected).num_seconds().abs() <= 10);
}

#[tokio::test]
async fn test_shortfall_with_tickets_held_skips_rest_of_queue() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 2).await;

    let first = queue(&h.service, &sale, 1).await;
    let reservation_number = queue(&h.service, &sale, 2).await;
    let another_reservation_number = queue(&h.service, &sale, 1).await;

    h.service.process_queue(sale.id).await.unwrap();

    assert_eq!(status(&h.service, &first).await, ReservationStatus::Active);
    assert_eq!(
        status(&h.service, &reservation_number).await,
        ReservationStatus::Enqueued
    );
    assert_eq!(
        status(&h.service, &another_reservation_number).await,
        ReservationStatus::Enqueued
    );
}

#[tokio::test]
async fn test_request_larger_than_sale_is_cancelled_and_next_activated() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 2).await;

    queue(&h.service, &sale, 1).await;
    let reservation_number = queue(&h.service, &sale, 3).await;
    let another_reservation_number = queue(&h.service, &sale, 1).await;

    h.service.process_queue(sale.id).await.unwrap();

    assert_eq!(
        status(&h.service, &reservation_number).await,
        ReservationStatus::NoAvailability
    );
    assert_eq!(
        status(&h.service, &another_reservation_number).await,
        ReservationStatus::Active
    );
}

#[tokio::test]
async fn test_sold_out_rejects_and_continues() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 2).await;

    let first = queue(&h.service, &sale, 2).await;
    let second = queue(&h.service, &sale, 1).await;
    let third = queue(&h.service, &sale, 5).await;

    let summary = h.service.process_queue(sale.id).await.unwrap();

    assert_eq!(status(&h.service, &first).await, ReservationStatus::Active);
    assert_eq!(status(&h.service, &second).await, ReservationStatus::NoAvailability);
    assert_eq!(status(&h.service, &third).await, ReservationStatus::NoAvailability);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.available, 0);
}

#[tokio::test]
async fn test_queue_reservation_adds_enqueued_entry() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 0).await;
    let reservation_number = Uuid::new_v4().to_string();

    h.service
        .queue_reservation(sale.id, EnqueueReservation::new(1, reservation_number.clone()))
        .await
        .unwrap();

    let first = h.service.reservations(sale.id, None).await.unwrap().remove(0);
    assert_eq!(first.quantity, 1);
    assert_eq!(first.reservation_number, reservation_number);
    assert_eq!(first.status, ReservationStatus::Enqueued);
    assert!(first.valid_until.is_none());
}

#[tokio::test]
async fn test_invalid_enqueue_does_not_mutate_queue() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 3).await;
    let number = queue(&h.service, &sale, 1).await;

    let duplicate = h
        .service
        .queue_reservation(sale.id, EnqueueReservation::new(1, number))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AppError::AlreadyExists(_)));

    let zero = h
        .service
        .queue_reservation(sale.id, EnqueueReservation::new(0, "zero"))
        .await
        .unwrap_err();
    assert!(matches!(zero, AppError::Validation(_)));

    assert_eq!(h.service.reservations(sale.id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 2).await;
    for quantity in [1, 2, 1] {
        queue(&h.service, &sale, quantity).await;
    }

    h.service.process_queue(sale.id).await.unwrap();
    let before = h.service.reservations(sale.id, None).await.unwrap();

    let summary = h.service.process_queue(sale.id).await.unwrap();
    let after = h.service.reservations(sale.id, None).await.unwrap();

    assert_eq!(summary.activated, 0);
    assert_eq!(summary.rejected, 0);
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.status, a.status);
        assert_eq!(b.valid_until, a.valid_until);
    }
}

#[tokio::test]
async fn test_skipped_reservation_admitted_after_hold_lapses() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let h = harness(clock.clone());
    let sale = create_sale(&h.service, 2).await;

    let first = queue(&h.service, &sale, 1).await;
    let waiting = queue(&h.service, &sale, 2).await;

    h.service.process_queue(sale.id).await.unwrap();
    assert_eq!(status(&h.service, &waiting).await, ReservationStatus::Enqueued);

    clock.advance(Duration::minutes(9));
    assert_eq!(h.sweeper.sweep_all().await.unwrap(), 1);
    assert_eq!(status(&h.service, &first).await, ReservationStatus::Expired);

    h.service.process_queue(sale.id).await.unwrap();
    let admitted = h.service.find_reservation(&waiting).await.unwrap();
    assert_eq!(admitted.status, ReservationStatus::Active);
    assert_eq!(admitted.valid_until, Some(clock.now() + Duration::minutes(8)));
}

#[tokio::test]
async fn test_lapsed_hold_frees_capacity_before_sweep() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let h = harness(clock.clone());
    let sale = create_sale(&h.service, 1).await;

    queue(&h.service, &sale, 1).await;
    h.service.process_queue(sale.id).await.unwrap();

    clock.advance(Duration::minutes(8));
    let late = queue(&h.service, &sale, 1).await;
    h.service.process_queue(sale.id).await.unwrap();

    assert_eq!(status(&h.service, &late).await, ReservationStatus::Active);
}

#[tokio::test]
async fn test_late_enqueue_waits_for_next_pass() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 5).await;

    queue(&h.service, &sale, 2).await;
    h.service.process_queue(sale.id).await.unwrap();

    let late = queue(&h.service, &sale, 2).await;
    assert_eq!(status(&h.service, &late).await, ReservationStatus::Enqueued);

    h.service.process_queue(sale.id).await.unwrap();
    assert_eq!(status(&h.service, &late).await, ReservationStatus::Active);
    assert_eq!(h.service.available_capacity(sale.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_passes_never_over_admit() {
    let h = harness(Arc::new(SystemClock));
    let sale = create_sale(&h.service, 5).await;
    for _ in 0..20 {
        queue(&h.service, &sale, 1).await;
    }

    let passes: Vec<_> = (0..8)
        .map(|_| {
            let service = h.service.clone();
            let sale_id = sale.id;
            tokio::spawn(async move { service.process_queue(sale_id).await })
        })
        .collect();
    for pass in passes {
        pass.await.unwrap().unwrap();
    }

    let active = h
        .service
        .reservations(sale.id, Some(ReservationStatus::Active))
        .await
        .unwrap();
    let rejected = h
        .service
        .reservations(sale.id, Some(ReservationStatus::NoAvailability))
        .await
        .unwrap();

    assert_eq!(active.iter().map(|r| r.quantity).sum::<i32>(), 5);
    assert_eq!(rejected.len(), 15);

    // admission follows queue order
    let all = h.service.reservations(sale.id, None).await.unwrap();
    assert!(all[..5].iter().all(|r| r.status == ReservationStatus::Active));
}

#[tokio::test]
async fn test_process_all_covers_every_sale() {
    let h = harness(Arc::new(SystemClock));
    let small = create_sale(&h.service, 1).await;
    let large = create_sale(&h.service, 10).await;
    queue(&h.service, &small, 1).await;
    queue(&h.service, &large, 4).await;

    let summaries = h.service.process_all().await.unwrap();

    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.activated == 1));
    assert_eq!(h.service.available_capacity(small.id).await.unwrap(), 0);
    assert_eq!(h.service.available_capacity(large.id).await.unwrap(), 6);
}
