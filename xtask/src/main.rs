use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ride demo workspace",
    long_about = "A unified CLI for running the ride demo, benchmarks,\n\
                  and CI checks in the ride demo workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote and simulate the default demo ride
    Demo {
        /// Pace the simulation to the wall clock
        #[arg(long)]
        realtime: bool,
    },
    /// Seed the ride board with demo rides
    SeedBoard {
        /// Board file to write
        #[arg(long, default_value = "ride_board.json")]
        store: String,
    },
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, demo, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Run the CLI demo end to end
    Demo,
    /// Run benchmarks
    Bench,
    /// Run check + demo + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn git(args: &[&str]) -> ExitStatus {
    eprintln!("+ git {}", args.join(" "));
    Command::new("git")
        .args(args)
        .status()
        .expect("failed to execute git")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_git(args: &[&str]) {
    let status = git(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_demo(realtime: bool) {
    let mut args = vec!["run", "-p", "ride_cli", "--release", "--", "simulate"];
    if realtime {
        args.push("--realtime");
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test ride_core");
    run_cargo(&["test", "-p", "ride_core"]);

    step("Test ride_board");
    run_cargo(&["test", "-p", "ride_board"]);

    step("Test ride_cli");
    run_cargo(&["test", "-p", "ride_cli"]);
}

fn ci_demo() {
    step("Quote the demo ride");
    run_cargo(&["run", "-p", "ride_cli", "--release", "--", "quote"]);

    step("Simulate the demo ride");
    run_demo(false);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "ride_core", "--bench", "performance"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { realtime } => run_demo(realtime),
        Commands::SeedBoard { store } => {
            run_cargo(&["run", "-p", "ride_cli", "--", "--store", &store, "seed"]);
        }
        Commands::Bench => ci_bench(),
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                std::fs::remove_dir_all(baseline_dir).expect("failed to remove target/criterion");
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&[
                "bench",
                "--package",
                "ride_core",
                "--bench",
                "performance",
                "--",
                "--save-baseline",
                "main",
            ]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&[
                "bench",
                "--package",
                "ride_core",
                "--bench",
                "performance",
                "--",
                "--baseline",
                "main",
            ]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Demo => ci_demo(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_demo();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
