use std::sync::Arc;

use chrono::{Duration, NaiveTime, Utc, Weekday};
use corsa_booking::{BookingService, BookingServiceError, TripDetails};
use corsa_core::{AuthenticatedActor, LogPublisher, MockPaymentAdapter, VehicleClaim, VehicleRepository};
use corsa_domain::{
    ApprovalStatus, BookingStatus, GeoPoint, Schedule, TripPoint, TripType, Vehicle,
    VehicleCategory,
};
use corsa_pricing::{default_rate_card, CancellationPolicy, FareCalculator, FareRules};
use corsa_store::MemoryStore;
use uuid::Uuid;

fn always_open() -> Schedule {
    Schedule {
        working_days: vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
        start: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
    }
}

fn sedan() -> Vehicle {
    let mut vehicle = Vehicle::new(
        Uuid::new_v4(),
        VehicleCategory::Car,
        "sedan".to_string(),
        "Corolla".to_string(),
        "BA 2 KHA 1234".to_string(),
        always_open(),
    );
    vehicle.is_verified = true;
    vehicle.approval_status = ApprovalStatus::Approved;
    let snapshot = default_rate_card()
        .resolve(&vehicle.pricing_reference)
        .expect("sedan is on the default rate card");
    vehicle.refresh_pricing(snapshot);
    vehicle
}

fn point_at(hours_from_now: i64) -> TripPoint {
    let when = Utc::now() + Duration::hours(hours_from_now);
    TripPoint {
        coords: GeoPoint { lat: 27.7, lng: 85.3 },
        address: "Thamel, Kathmandu".to_string(),
        date: when.date_naive(),
        time: when.time(),
    }
}

fn trip(hours_from_now: i64, distance_km: f64) -> TripDetails {
    TripDetails {
        trip_type: TripType::OneWay,
        pickup: point_at(hours_from_now),
        destination: point_at(hours_from_now + 3),
        distance_km,
        passengers: vec![],
        discount: 0,
    }
}

struct Harness {
    service: BookingService,
    store: Arc<MemoryStore>,
    vehicle_id: Uuid,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let vehicle = sedan();
    let vehicle_id = vehicle.id;
    store.seed_vehicle(vehicle).await;

    let service = BookingService::new(
        store.clone(),
        store.clone(),
        Arc::new(MockPaymentAdapter),
        Arc::new(LogPublisher),
        FareCalculator::new(FareRules::default()),
        CancellationPolicy::default(),
    );
    Harness {
        service,
        store,
        vehicle_id,
    }
}

#[tokio::test]
async fn created_booking_reads_back_with_consistent_pricing() {
    let h = harness().await;
    let rider = AuthenticatedActor::rider(Uuid::new_v4());

    let booking = h
        .service
        .create_booking(rider, h.vehicle_id, trip(30, 80.0))
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);

    // CS + 8 digits + 4 uppercase base-36 characters
    let number = &booking.booking_number;
    assert!(number.starts_with("CS"));
    assert_eq!(number.len(), 14);
    assert!(number[2..10].chars().all(|c| c.is_ascii_digit()));
    assert!(number[10..]
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

    let read_back = h.service.get_booking(booking.id).await.unwrap();
    let p = &read_back.pricing;
    assert_eq!(p.total, p.subtotal + p.tax - p.discount);
    // 80 km one-way sedan runs on the 100 km band rate
    assert_eq!(p.base_fare, 2000);
    assert_eq!(p.rate_per_km, Some(25.0));
}

#[tokio::test]
async fn booked_vehicle_rejects_a_second_rider() {
    let h = harness().await;

    h.service
        .create_booking(
            AuthenticatedActor::rider(Uuid::new_v4()),
            h.vehicle_id,
            trip(30, 40.0),
        )
        .await
        .unwrap();

    let err = h
        .service
        .create_booking(
            AuthenticatedActor::rider(Uuid::new_v4()),
            h.vehicle_id,
            trip(31, 40.0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingServiceError::VehicleUnavailable));
}

#[tokio::test]
async fn full_trip_lifecycle_frees_the_vehicle() {
    let h = harness().await;
    let booking = h
        .service
        .create_booking(
            AuthenticatedActor::rider(Uuid::new_v4()),
            h.vehicle_id,
            trip(30, 60.0),
        )
        .await
        .unwrap();

    h.service.confirm_booking(booking.id).await.unwrap();
    h.service.mark_driver_assigned(booking.id).await.unwrap();
    h.service.mark_driver_en_route(booking.id).await.unwrap();
    h.service.mark_driver_arrived(booking.id).await.unwrap();

    let started = h.service.start_trip(booking.id).await.unwrap();
    assert!(started.trip.started_at.is_some());

    let completed = h.service.complete_trip(booking.id).await.unwrap();
    assert_eq!(completed.status, BookingStatus::TripCompleted);
    assert!(completed.trip.ended_at.is_some());

    // vehicle can be claimed again once the trip is over
    let claim = h
        .store
        .try_claim_vehicle(h.vehicle_id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(matches!(claim, VehicleClaim::Claimed(_)));
}

#[tokio::test]
async fn skipping_lifecycle_steps_is_rejected() {
    let h = harness().await;
    let booking = h
        .service
        .create_booking(
            AuthenticatedActor::rider(Uuid::new_v4()),
            h.vehicle_id,
            trip(30, 60.0),
        )
        .await
        .unwrap();

    let err = h.service.start_trip(booking.id).await.unwrap_err();
    assert!(matches!(err, BookingServiceError::Transition(_)));

    let unchanged = h.service.get_booking(booking.id).await.unwrap();
    assert_eq!(unchanged.status, BookingStatus::Pending);
}

#[tokio::test]
async fn early_cancellation_charges_five_percent_and_is_final() {
    let h = harness().await;
    let rider = AuthenticatedActor::rider(Uuid::new_v4());
    let booking = h
        .service
        .create_booking(rider, h.vehicle_id, trip(30, 80.0))
        .await
        .unwrap();
    let total = booking.pricing.total;

    let cancelled = h
        .service
        .cancel_booking(booking.id, rider, Some("change of plans".to_string()))
        .await
        .unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(cancelled.cancellation.is_cancelled);
    let expected_fee = (total as f64 * 0.05).round() as i64;
    assert_eq!(cancelled.cancellation.cancellation_fee, expected_fee);
    assert_eq!(
        cancelled.cancellation.refund_amount,
        total - expected_fee
    );
    assert_eq!(
        cancelled.cancellation.reason.as_deref(),
        Some("change of plans")
    );

    // cancelling again is rejected and the recorded fee is untouched
    let err = h
        .service
        .cancel_booking(booking.id, rider, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingServiceError::Transition(_)));
    let read_back = h.service.get_booking(booking.id).await.unwrap();
    assert_eq!(read_back.cancellation.cancellation_fee, expected_fee);

    // the claim is gone too
    let claim = h
        .store
        .try_claim_vehicle(h.vehicle_id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(matches!(claim, VehicleClaim::Claimed(_)));
}

#[tokio::test]
async fn last_minute_cancellation_charges_a_quarter() {
    let h = harness().await;
    let rider = AuthenticatedActor::rider(Uuid::new_v4());
    let booking = h
        .service
        .create_booking(rider, h.vehicle_id, trip(1, 40.0))
        .await
        .unwrap();
    let total = booking.pricing.total;

    let cancelled = h
        .service
        .cancel_booking(booking.id, rider, None)
        .await
        .unwrap();
    assert_eq!(
        cancelled.cancellation.cancellation_fee,
        (total as f64 * 0.25).round() as i64
    );
}

#[tokio::test]
async fn ratings_flow_into_booking_slots_and_vehicle_aggregate() {
    let h = harness().await;
    let rider = AuthenticatedActor::rider(Uuid::new_v4());
    let booking = h
        .service
        .create_booking(rider, h.vehicle_id, trip(30, 60.0))
        .await
        .unwrap();

    // rating an unfinished trip is rejected
    let err = h
        .service
        .rate_booking(booking.id, rider, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingServiceError::NotRatable(_)));

    h.service.confirm_booking(booking.id).await.unwrap();
    h.service.mark_driver_assigned(booking.id).await.unwrap();
    h.service.mark_driver_en_route(booking.id).await.unwrap();
    h.service.mark_driver_arrived(booking.id).await.unwrap();
    h.service.start_trip(booking.id).await.unwrap();
    h.service.complete_trip(booking.id).await.unwrap();

    let rated = h
        .service
        .rate_booking(booking.id, rider, 4, Some("good ride".to_string()))
        .await
        .unwrap();
    assert_eq!(rated.ratings.by_rider.as_ref().unwrap().rating, 4);

    let driver = AuthenticatedActor::driver(rated.driver_id);
    let rated = h
        .service
        .rate_booking(booking.id, driver, 5, None)
        .await
        .unwrap();
    assert_eq!(rated.ratings.by_driver.as_ref().unwrap().rating, 5);

    // only the rider's star reaches the vehicle aggregate
    let vehicle = h
        .store
        .load_vehicle(h.vehicle_id)
        .await
        .unwrap()
        .unwrap()
        .record;
    assert_eq!(vehicle.ratings.count, 1);
    assert_eq!(vehicle.ratings.breakdown, [0, 0, 0, 1, 0]);
    assert_eq!(vehicle.ratings.average, 4.0);

    // re-rating overwrites instead of double counting
    h.service
        .rate_booking(booking.id, rider, 5, None)
        .await
        .unwrap();
    let vehicle = h
        .store
        .load_vehicle(h.vehicle_id)
        .await
        .unwrap()
        .unwrap()
        .record;
    assert_eq!(vehicle.ratings.count, 1);
    assert_eq!(vehicle.ratings.breakdown, [0, 0, 0, 0, 1]);
    assert_eq!(vehicle.ratings.average, 5.0);
}

#[tokio::test]
async fn messages_append_until_the_booking_closes() {
    let h = harness().await;
    let rider = AuthenticatedActor::rider(Uuid::new_v4());
    let booking = h
        .service
        .create_booking(rider, h.vehicle_id, trip(30, 60.0))
        .await
        .unwrap();

    let updated = h
        .service
        .append_message(booking.id, rider, "I'm by the gate".to_string())
        .await
        .unwrap();
    assert_eq!(updated.messages.len(), 1);
    assert_eq!(updated.messages[0].body, "I'm by the gate");

    h.service
        .cancel_booking(booking.id, rider, None)
        .await
        .unwrap();
    let err = h
        .service
        .append_message(booking.id, rider, "never mind".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingServiceError::BookingInactive(_)));
}

#[tokio::test]
async fn expired_request_frees_the_vehicle() {
    let h = harness().await;
    let booking = h
        .service
        .create_booking(
            AuthenticatedActor::rider(Uuid::new_v4()),
            h.vehicle_id,
            trip(30, 60.0),
        )
        .await
        .unwrap();

    let expired = h.service.expire_booking(booking.id).await.unwrap();
    assert_eq!(expired.status, BookingStatus::Expired);

    let claim = h
        .store
        .try_claim_vehicle(h.vehicle_id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert!(matches!(claim, VehicleClaim::Claimed(_)));
}
