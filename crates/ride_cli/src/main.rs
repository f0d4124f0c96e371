//! `ride`: quote and simulate demo rides in the terminal, and keep a small
//! shared-ride board on disk.

mod console;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use ride_board::{BoardError, NewBooking, NewRide, RideBoard, RideFilter, RideId};
use ride_core::error::RideError;
use ride_core::geo::GeoPoint;
use ride_core::scenario::ScenarioParams;
use ride_core::session::RideSession;

use console::ConsoleRenderer;

/// Upper bound on simulated events per run.
const MAX_STEPS: usize = 5_000_000;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Ride(#[from] RideError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Parser)]
#[command(name = "ride", about = "Ride demo: fares, driver simulation and a ride board")]
struct Cli {
    /// Ride board file
    #[arg(long, global = true, env = "RIDE_BOARD_STORE", default_value = "ride_board.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct TripArgs {
    /// Pickup as `lat,lng`
    #[arg(long, value_parser = parse_point, default_value = "17.3850,78.4867")]
    pickup: GeoPoint,
    /// Drop as `lat,lng`
    #[arg(long = "drop", value_parser = parse_point, default_value = "17.4050,78.5000")]
    drop_point: GeoPoint,
    /// Scenario parameters (JSON); missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the driver start point
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance, fare and ETA between two points
    Quote {
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Confirm a ride and simulate the driver until drop-off
    Simulate {
        #[command(flatten)]
        trip: TripArgs,
        /// Vehicle type shown in the confirmation
        #[arg(long, default_value = "bike")]
        vehicle: String,
        /// Pace the simulation to the wall clock
        #[arg(long)]
        realtime: bool,
        /// Print every n-th driver position
        #[arg(long, default_value_t = 60)]
        print_every: u64,
    },
    /// Post or list shared rides
    #[command(subcommand)]
    Rides(RidesCommand),
    /// Book a seat on a ride
    Book {
        ride_id: u64,
        rider_name: String,
        #[arg(long)]
        contact: Option<String>,
    },
    /// List bookings, newest first
    Bookings,
    /// Post a few demo rides
    Seed,
}

#[derive(Subcommand)]
enum RidesCommand {
    /// Post a ride
    Add {
        #[arg(long)]
        driver: String,
        #[arg(long)]
        pickup: String,
        #[arg(long)]
        dest: String,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        seats: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List rides, newest first
    List {
        #[arg(long)]
        pickup: Option<String>,
        #[arg(long)]
        dest: Option<String>,
    },
}

fn parse_point(raw: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lng`, got `{raw}`"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinate out of range: {lat}, {lng}"));
    }
    Ok(GeoPoint::new(lat, lng))
}

fn load_params(trip: &TripArgs) -> Result<ScenarioParams, RideError> {
    let mut params = match &trip.config {
        Some(path) => ScenarioParams::from_json_file(path)?,
        None => ScenarioParams::default(),
    };
    if let Some(seed) = trip.seed {
        params = params.with_seed(seed);
    }
    Ok(params)
}

fn quoted_session(trip: &TripArgs, print_every: u64) -> Result<RideSession, RideError> {
    let params = load_params(trip)?;
    let renderer = ConsoleRenderer::new(io::stdout(), print_every);
    let mut session = RideSession::new(&params, Box::new(renderer))?;
    session.select_point(trip.pickup);
    session.select_point(trip.drop_point);
    session.calculate_route()?;
    Ok(session)
}

fn quote(trip: &TripArgs) -> Result<(), CliError> {
    let session = quoted_session(trip, u64::MAX)?;
    if let Some(quote) = session.quote() {
        println!("Pickup:   {}", trip.pickup);
        println!("Drop:     {}", trip.drop_point);
        println!("Distance: {} km", quote.estimate.km);
        println!("Fare:     {}", quote.estimate.fare);
        println!("ETA:      {} min", quote.eta_minutes);
    }
    Ok(())
}

fn simulate(trip: &TripArgs, vehicle: &str, realtime: bool, print_every: u64) -> Result<(), CliError> {
    let mut session = quoted_session(trip, print_every)?;
    let confirmation = session.confirm_ride(vehicle)?;
    println!("{confirmation}");

    let steps = if realtime {
        session.run_realtime(MAX_STEPS)
    } else {
        session.run_until_idle(MAX_STEPS)
    };
    debug!(steps, "simulation drained");

    println!("Timeline:");
    for record in session
        .telemetry()
        .phases
        .iter()
        .filter(|r| r.entity == confirmation.simulation)
    {
        println!("{:>9} ms  {:?}", record.at_ms, record.phase);
    }
    println!("Frames: {}", session.telemetry().ticks);
    Ok(())
}

fn with_board<T>(store: &Path, f: impl FnOnce(&mut RideBoard) -> Result<T, BoardError>) -> Result<T, BoardError> {
    let mut board = RideBoard::load_or_default(store)?;
    let out = f(&mut board)?;
    board.save(store)?;
    Ok(out)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Quote { trip } => quote(&trip),
        Commands::Simulate {
            trip,
            vehicle,
            realtime,
            print_every,
        } => simulate(&trip, &vehicle, realtime, print_every),
        Commands::Rides(RidesCommand::Add {
            driver,
            pickup,
            dest,
            vehicle,
            contact,
            time,
            seats,
            notes,
        }) => {
            let input = NewRide {
                driver_name: driver,
                vehicle,
                contact,
                pickup,
                dest,
                time,
                seats_available: seats,
                notes,
            };
            let ride = with_board(&cli.store, |board| board.create_ride(input))?;
            println!("Posted ride {}", ride.id);
            Ok(())
        }
        Commands::Rides(RidesCommand::List { pickup, dest }) => {
            let board = RideBoard::load_or_default(&cli.store)?;
            let filter = RideFilter { pickup, dest };
            for ride in board.list_rides(&filter) {
                println!(
                    "#{:<4} {:<12} {} -> {}  seats: {}  {}",
                    ride.id,
                    ride.driver_name,
                    ride.pickup,
                    ride.dest,
                    ride.seats_available,
                    ride.time.as_deref().unwrap_or("-"),
                );
            }
            Ok(())
        }
        Commands::Book {
            ride_id,
            rider_name,
            contact,
        } => {
            let mut input = NewBooking::new(RideId(ride_id), rider_name);
            input.rider_contact = contact;
            let booking = with_board(&cli.store, |board| board.create_booking(input))?;
            println!("Booked seat {} on ride {}", booking.id, booking.ride_id);
            Ok(())
        }
        Commands::Bookings => {
            let board = RideBoard::load_or_default(&cli.store)?;
            for view in board.list_bookings() {
                let ride = view
                    .ride
                    .as_ref()
                    .map(|r| format!("{} -> {} with {}", r.pickup, r.dest, r.driver_name))
                    .unwrap_or_else(|| "ride removed".to_string());
                println!("#{:<4} {:<12} {}", view.booking.id, view.booking.rider_name, ride);
            }
            Ok(())
        }
        Commands::Seed => {
            let rides = with_board(&cli.store, |board| board.seed_demo())?;
            println!("Seeded {} rides into {}", rides.len(), cli.store.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let CliError::Ride(ride) = &err {
                if let Some(detail) = ride.detail() {
                    error!(%detail, "ride request failed");
                }
            }
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
