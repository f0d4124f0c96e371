use ride_board::{BoardError, NewBooking, NewRide, RideBoard, RideFilter};

#[test]
fn snapshot_survives_save_and_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("board.json");

    let mut board = RideBoard::new();
    let ride = board
        .create_ride(
            NewRide::new("Ravi", "Hitech City", "Charminar")
                .with_vehicle("Car")
                .with_contact("98480 00000")
                .with_seats(2),
        )
        .expect("ride");
    board
        .create_booking(NewBooking::new(ride.id, "Meena").with_contact("meena@example.com"))
        .expect("booking");
    board.save(&path).expect("save");

    let mut loaded = RideBoard::load(&path).expect("load");
    assert_eq!(loaded, board);
    assert_eq!(loaded.ride(ride.id).map(|r| r.seats_available), Some(1));

    // Ids keep counting from where the saved board stopped.
    let next = loaded
        .create_ride(NewRide::new("Asha", "Kondapur", "Ameerpet"))
        .expect("next");
    assert!(next.id > ride.id);
}

#[test]
fn missing_file_loads_as_empty_board() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.json");

    assert!(matches!(RideBoard::load(&path), Err(BoardError::Io(_))));
    let board = RideBoard::load_or_default(&path).expect("empty");
    assert_eq!(board.rides_len(), 0);
}

#[test]
fn corrupt_file_is_a_json_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("board.json");
    std::fs::write(&path, "{ not json").expect("write");

    assert!(matches!(
        RideBoard::load_or_default(&path),
        Err(BoardError::Json(_))
    ));
}

#[test]
fn bookings_join_their_ride_newest_first() {
    let mut board = RideBoard::new();
    let rides = board.seed_demo().expect("seed");
    let car = &rides[0];
    let bike = &rides[1];

    let first = board
        .create_booking(NewBooking::new(car.id, "Meena"))
        .expect("first");
    let second = board
        .create_booking(NewBooking::new(bike.id, "Kiran"))
        .expect("second");

    let views = board.list_bookings();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].booking.id, second.id);
    assert_eq!(views[1].booking.id, first.id);
    assert_eq!(
        views[0].ride.as_ref().map(|r| r.driver_name.as_str()),
        Some("Asha")
    );
    assert_eq!(views[0].ride.as_ref().map(|r| r.seats_available), Some(0));

    let json = serde_json::to_value(&views[0]).expect("json");
    assert_eq!(json["riderName"], "Kiran");
    assert_eq!(json["ride"]["driverName"], "Asha");
}

#[test]
fn filters_combine_pickup_and_dest() {
    let mut board = RideBoard::new();
    board.seed_demo().expect("seed");
    board
        .create_ride(NewRide::new("Sai", "Hitech City", "Airport"))
        .expect("ride");

    let from_hitech = board.list_rides(&RideFilter::default().pickup("HITECH"));
    assert_eq!(from_hitech.len(), 2);
    assert_eq!(from_hitech[0].driver_name, "Sai");

    let both = board.list_rides(&RideFilter::default().pickup("hitech").dest("char"));
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].driver_name, "Ravi");

    assert!(board
        .list_rides(&RideFilter::default().dest("nowhere"))
        .is_empty());
}

#[test]
fn snapshot_without_counter_keeps_ids_unique() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("board.json");
    std::fs::write(
        &path,
        r#"{
          "rides": [
            {"id": 4, "driverName": "Ravi", "pickup": "Hitech City", "dest": "Charminar",
             "seatsAvailable": 2, "createdAt": "2024-05-01T08:00:00Z"}
          ],
          "bookings": [
            {"id": 7, "rideId": 4, "riderName": "Meena", "createdAt": "2024-05-01T08:05:00Z"}
          ]
        }"#,
    )
    .expect("write");

    let mut board = RideBoard::load(&path).expect("load");
    let ride = board
        .create_ride(NewRide::new("Asha", "Kondapur", "Ameerpet"))
        .expect("ride");
    assert!(ride.id.0 > 7, "reused id {}", ride.id);
    assert_eq!(board.ride(ride.id).map(|r| r.driver_name.as_str()), Some("Asha"));

    let booking = board
        .create_booking(NewBooking::new(ride.id, "Kiran"))
        .expect("booking");
    assert!(booking.id.0 > ride.id.0);
    assert_eq!(board.ride(ride.id).map(|r| r.seats_available), Some(0));
    assert_eq!(
        board.list_rides(&RideFilter::default().pickup("hitech"))[0].seats_available,
        2
    );
}
