//! fleetwatch-sim - Fleet Telemetry Simulator
//!
//! Usage:
//!   fleetwatch-sim run --ticks 20 --seed 42
//!   fleetwatch-sim run --ticks 30 --format pretty --fault Machine_3@15
//!   fleetwatch-sim layout --extended
//!   fleetwatch-sim report --machine Machine_3 --ticks 25

use clap::{Parser, Subcommand, ValueEnum};
use fleetwatch_core::{EngineConfig, FleetEngine, FleetError, FleetLayout, FleetSnapshot};
use std::collections::HashMap;
use std::process;

#[derive(Parser)]
#[command(name = "fleetwatch-sim")]
#[command(about = "Industrial fleet telemetry simulation with predictive-maintenance analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance the fleet and print every tick
    Run {
        /// Number of ticks
        #[arg(short, long, default_value = "20")]
        ticks: u64,

        /// Seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Use the five-machine layout
        #[arg(long)]
        extended: bool,

        /// Fault injections as MACHINE@TICK (repeatable)
        #[arg(long = "fault")]
        faults: Vec<String>,
    },

    /// List the machine slots of a layout
    Layout {
        #[arg(long)]
        extended: bool,
    },

    /// Print a text report for one machine after a number of ticks
    Report {
        #[arg(short, long, default_value = "Machine_1")]
        machine: String,

        #[arg(short, long, default_value = "20")]
        ticks: u64,

        #[arg(short, long)]
        seed: Option<u64>,

        #[arg(long)]
        extended: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            ticks,
            seed,
            format,
            extended,
            faults,
        } => run_ticks(ticks, seed, format, extended, &faults),
        Commands::Layout { extended } => {
            run_layout(extended);
            Ok(())
        }
        Commands::Report {
            machine,
            ticks,
            seed,
            extended,
        } => run_report(&machine, ticks, seed, extended),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn layout(extended: bool) -> FleetLayout {
    if extended {
        FleetLayout::extended()
    } else {
        FleetLayout::default()
    }
}

fn build_engine(seed: Option<u64>, extended: bool) -> Result<FleetEngine, FleetError> {
    let config = EngineConfig {
        seed,
        layout: layout(extended),
        ..Default::default()
    };
    FleetEngine::new(config)
}

/// Parses `MACHINE@TICK` specs into tick -> machines.
fn parse_faults(specs: &[String]) -> Result<HashMap<u64, Vec<String>>, String> {
    let mut schedule: HashMap<u64, Vec<String>> = HashMap::new();

    for spec in specs {
        let (machine, tick) = spec
            .split_once('@')
            .ok_or_else(|| format!("invalid fault spec '{}', expected MACHINE@TICK", spec))?;
        let tick: u64 = tick
            .trim()
            .parse()
            .map_err(|_| format!("invalid tick in fault spec '{}'", spec))?;
        schedule
            .entry(tick)
            .or_default()
            .push(machine.trim().to_string());
    }

    Ok(schedule)
}

fn run_ticks(
    ticks: u64,
    seed: Option<u64>,
    format: OutputFormat,
    extended: bool,
    faults: &[String],
) -> Result<(), String> {
    let schedule = parse_faults(faults)?;
    let mut engine = build_engine(seed, extended).map_err(|e| e.to_string())?;

    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║           FLEETWATCH Simulation                              ║");
    eprintln!("╠══════════════════════════════════════════════════════════════╣");
    eprintln!("║ Ticks: {:53} ║", ticks);
    eprintln!(
        "║ Seed: {:54} ║",
        seed.map(|s| s.to_string()).unwrap_or_else(|| "random".to_string())
    );
    eprintln!("║ Machines: {:50} ║", engine.machine_ids().len());
    eprintln!("╚══════════════════════════════════════════════════════════════╝");

    for tick in 1..=ticks {
        if let Some(machines) = schedule.get(&tick) {
            for machine in machines {
                engine.inject_fault(machine).map_err(|e| e.to_string())?;
            }
        }

        let snapshot = engine.tick().map_err(|e| e.to_string())?;

        match format {
            OutputFormat::Json => {
                let line = serde_json::json!({ "tick": tick, "machines": snapshot });
                println!("{}", line);
            }
            OutputFormat::Pretty => print_pretty(tick, &snapshot),
        }
    }

    let stats = engine.stats();
    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║                     Simulation Complete                      ║");
    eprintln!("╠══════════════════════════════════════════════════════════════╣");
    eprintln!("║ Ticks: {:53} ║", stats.tick_count);
    eprintln!("║ Anomalies flagged: {:41} ║", stats.anomalies_flagged);
    eprintln!("║ Faults injected: {:43} ║", stats.faults_injected);
    eprintln!("╚══════════════════════════════════════════════════════════════╝");

    Ok(())
}

fn print_pretty(tick: u64, snapshot: &FleetSnapshot) {
    println!("── tick {} ──", tick);
    for (id, record) in snapshot {
        let marker = if record.anomaly { " [ANOMALY]" } else { "" };
        println!(
            "{:10} {:8} {:10} health={:5.1} rul={:7.2} pred={:7.2} temp={:5.1} vib={:4.2}{}",
            id,
            record.status,
            record.mode,
            record.health,
            record.rul,
            record.predicted_rul,
            record.temperature,
            record.vibration,
            marker
        );
    }
}

fn run_layout(extended: bool) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Fleet Layout                            ║");
    println!("╠══════════════════════════════════════════════════════════════╣");

    for slot in &layout(extended).slots {
        let line = format!(
            "{} - {} / {} (health {}, rul {})",
            slot.id,
            slot.status,
            slot.failure_mode,
            slot.status.base_health(),
            slot.status.base_rul()
        );
        println!("║ {:60} ║", line);
    }

    println!("╚══════════════════════════════════════════════════════════════╝");
}

fn run_report(machine: &str, ticks: u64, seed: Option<u64>, extended: bool) -> Result<(), String> {
    let mut engine = build_engine(seed, extended).map_err(|e| e.to_string())?;

    for _ in 0..ticks {
        engine.tick().map_err(|e| e.to_string())?;
    }

    let snapshot = engine.observe().map_err(|e| e.to_string())?;
    let record = snapshot
        .get(machine)
        .ok_or_else(|| FleetError::UnknownMachine(machine.to_string()).to_string())?;

    print!(
        "{}",
        fleetwatch_core::report::render(machine, record, chrono::Utc::now())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_faults() {
        let specs = vec!["Machine_3@15".to_string(), "Machine_1@15".to_string()];
        let schedule = parse_faults(&specs).unwrap();
        assert_eq!(schedule[&15], vec!["Machine_3", "Machine_1"]);
    }

    #[test]
    fn test_parse_faults_rejects_bad_specs() {
        assert!(parse_faults(&["Machine_3".to_string()]).is_err());
        assert!(parse_faults(&["Machine_3@soon".to_string()]).is_err());
    }
}
