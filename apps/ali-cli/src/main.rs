use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use ali_app::{
    AppError, AppResult, Session, format_sim_time, write_history_csv, write_snapshot_json,
};
use ali_core::Real;
use ali_project::{SessionConfig, TimelineAction, TimelineEvent};
use ali_sim::{ChamberConstants, Incident, Scenario, environment};

#[derive(Parser)]
#[command(name = "ali-cli")]
#[command(about = "ALI chamber CLI - closed-loop medium level simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation session
    Run(RunArgs),
    /// Validate a session config file
    Validate {
        /// Path to the session YAML or JSON file
        config_path: PathBuf,
        /// Print the config with defaults filled in
        #[arg(long)]
        print: bool,
    },
    /// List scenarios and incidents
    Scenarios,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Session config (YAML or JSON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Scenario in force from t = 0
    #[arg(long)]
    scenario: Option<String>,
    /// Simulated hours to run
    #[arg(long)]
    hours: Option<Real>,
    /// Simulated hours per step
    #[arg(long)]
    dt: Option<Real>,
    /// Noise seed
    #[arg(long)]
    seed: Option<u64>,
    /// Incident to trigger during the run
    #[arg(long)]
    incident: Option<String>,
    /// Trigger a randomly chosen incident instead of a named one
    #[arg(long, conflicts_with = "incident")]
    random_incident: bool,
    /// Simulated hour at which the incident starts
    #[arg(long, default_value_t = 0.0)]
    incident_at: Real,
    /// Write the history as CSV
    #[arg(long)]
    history_csv: Option<PathBuf>,
    /// Write the final snapshot as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::Validate { config_path, print } => cmd_validate(&config_path, print),
        Commands::Scenarios => cmd_scenarios(),
    }
}

fn build_config(args: &RunArgs) -> AppResult<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => ali_project::load(path)?,
        None => SessionConfig::default(),
    };

    if let Some(name) = &args.scenario {
        config.scenario = name.parse::<Scenario>()?;
    }
    if let Some(hours) = args.hours {
        config.run.duration_hours = hours;
    }
    if let Some(dt) = args.dt {
        config.run.dt_hours = dt;
    }
    if args.seed.is_some() {
        config.run.seed = args.seed;
    }
    if let Some(name) = &args.incident {
        let incident = name.parse::<Incident>()?;
        // Keep the timeline ordered
        let index = config
            .timeline
            .iter()
            .position(|e| e.at_hours > args.incident_at)
            .unwrap_or(config.timeline.len());
        config.timeline.insert(
            index,
            TimelineEvent {
                at_hours: args.incident_at,
                action: TimelineAction::TriggerIncident {
                    incident: Some(incident),
                },
            },
        );
    }

    Ok(config)
}

fn cmd_run(args: &RunArgs) -> AppResult<()> {
    let config = build_config(args)?;
    let mut session = Session::from_config(&config)?;
    let duration = config.run.duration_hours;

    println!(
        "Running {} h of scenario '{}' (dt = {} h)",
        duration, config.scenario, config.run.dt_hours
    );

    tracing::info!(
        name = %session.name(),
        scenario = %config.scenario,
        duration,
        "session started"
    );
    let started = Instant::now();
    if args.random_incident {
        session.run_for(args.incident_at.min(duration));
        let incident = session.trigger_random_incident();
        println!(
            "Random incident '{}' at {}",
            incident,
            format_sim_time(session.time())
        );
        session.run_for(duration - session.time());
    } else {
        session.run_for(duration);
    }
    let elapsed = started.elapsed();
    tracing::info!(
        time = session.time(),
        elapsed_s = elapsed.as_secs_f64(),
        "session finished"
    );

    let state = session.engine().state();
    if state.terminated() {
        println!(
            "Both cultures lost at {}, stopping early",
            format_sim_time(state.time)
        );
    }

    println!();
    println!("Event log:");
    if session.log().is_empty() {
        println!("  (no events)");
    }
    for entry in session.log().iter() {
        println!("  {}", entry);
    }

    println!();
    println!("{}", session.summary());
    println!("Wall time: {:.3} s", elapsed.as_secs_f64());

    if let Some(path) = &args.history_csv {
        write_history_csv(path, session.engine().history())?;
        println!(
            "✓ Exported {} history samples to {}",
            session.engine().history().len(),
            path.display()
        );
    }
    if let Some(path) = &args.json {
        write_snapshot_json(path, session.name(), &session.snapshot())?;
        println!("✓ Exported snapshot to {}", path.display());
    }

    Ok(())
}

fn cmd_validate(config_path: &Path, print: bool) -> AppResult<()> {
    println!("Validating session config: {}", config_path.display());
    let config = ali_project::load(config_path)?;
    println!("✓ Config is valid");
    println!(
        "  {} timeline events, {} h at dt = {} h",
        config.timeline.len(),
        config.run.duration_hours,
        config.run.dt_hours
    );
    if print {
        let yaml =
            serde_yaml::to_string(&config).map_err(|e| AppError::Serialization(e.to_string()))?;
        print!("{}", yaml);
    }
    Ok(())
}

fn cmd_scenarios() -> AppResult<()> {
    let constants = ChamberConstants::default();
    println!("Scenarios:");
    for scenario in Scenario::ALL {
        println!("  {:<14} {}", scenario.name(), scenario_description(scenario, &constants));
    }
    println!("Incidents:");
    for incident in Incident::ALL {
        println!("  {:<18} {}", incident.name(), incident_description(incident));
    }
    Ok(())
}

fn scenario_description(scenario: Scenario, constants: &ChamberConstants) -> String {
    match scenario {
        Scenario::Normal => format!(
            "small fluctuations around {} °C, {} % CO2, {} % RH, pH {}",
            constants.optimal_temperature,
            constants.optimal_co2,
            constants.optimal_humidity,
            constants.optimal_ph
        ),
        Scenario::Evaporation => "humidity oscillates near 70 %, evaporation rises".to_string(),
        Scenario::Temperature => format!(
            "heater fails after {} h, chamber falls to room temperature",
            environment::HEATER_FAILURE_AFTER
        ),
        Scenario::Contamination => format!(
            "medium acidifies at 0.02 pH/h after {} h",
            environment::CONTAMINATION_ONSET
        ),
    }
}

fn incident_description(incident: Incident) -> &'static str {
    match incident {
        Incident::HumidityDrop => "humidity falls 2 % per step, floor 50 %",
        Incident::TemperatureSpike => "temperature rises 0.5 °C per step, cap 42 °C",
        Incident::PhDrop => "pH falls 0.05 per step, floor 6.0",
    }
}
