use clap::{Parser, Subcommand, ValueEnum};
use pe_app::{
    AppError, AppResult, ExitSummary, PerformanceSummary, RunResult, StateSummary, SweepPoint,
    SweepRequest,
};
use pe_performance::{ExitCondition, NozzleConfig, Strategy};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "propeq")]
#[command(about = "Propellant equilibrium and rocket performance calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file and resolve its propellants
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Run a case file
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Write the JSON summary to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List species (or propellants) in the built-in tables
    Species {
        /// Case-insensitive name filter
        #[arg(long)]
        filter: Option<String>,
        /// List propellants instead of product species
        #[arg(long)]
        propellants: bool,
    },
    /// Sweep the O/F ratio for a fuel/oxidizer pair
    Sweep {
        /// Fuel name, as listed by `species --propellants`
        fuel: String,
        /// Oxidizer name
        oxidizer: String,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(long, default_value_t = 0.5)]
        step: f64,
        /// Chamber pressure with unit, e.g. "50 bar"
        #[arg(long)]
        pressure: String,
        /// Exit pressure with unit
        #[arg(long, default_value = "1 atm", conflicts_with = "area_ratio")]
        exit_pressure: String,
        /// Supersonic exit area ratio instead of an exit pressure
        #[arg(long)]
        area_ratio: Option<f64>,
        #[arg(long, value_enum, default_value_t = StrategyArg::Shifting)]
        strategy: StrategyArg,
        /// Print the points as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Frozen,
    Shifting,
    Equilibrium,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Frozen => Strategy::Frozen,
            StrategyArg::Shifting => Strategy::Shifting,
            StrategyArg::Equilibrium => Strategy::Equilibrium(Default::default()),
        }
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run {
            case_path,
            json,
            output,
        } => cmd_run(&case_path, json, output.as_deref()),
        Commands::Species {
            filter,
            propellants,
        } => cmd_species(filter.as_deref(), propellants),
        Commands::Sweep {
            fuel,
            oxidizer,
            from,
            to,
            step,
            pressure,
            exit_pressure,
            area_ratio,
            strategy,
            json,
        } => {
            let exit = match area_ratio {
                Some(ratio) => ExitCondition::SupersonicAreaRatio(ratio),
                None => ExitCondition::Pressure(parse_pressure(&exit_pressure)?),
            };
            let request = SweepRequest {
                fuel,
                oxidizer,
                of_ratios: pe_app::of_range(from, to, step)?,
                chamber_pressure: parse_pressure(&pressure)?,
                strategy: strategy.into(),
                exit,
                solver: Default::default(),
                nozzle: NozzleConfig::default(),
            };
            cmd_sweep(&request, json)
        }
    }
}

fn parse_pressure(text: &str) -> AppResult<pe_core::units::Pressure> {
    pe_case::units::pressure(text).map_err(|e| AppError::InvalidInput(format!("{text}: {e}")))
}

fn cmd_validate(case_path: &Path) -> AppResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = pe_app::load_case(case_path)?;
    let base_dir = case_path.parent().unwrap_or(Path::new("."));
    let tables = pe_app::tables_for(case.tables.as_ref(), base_dir)?;
    pe_app::validate_case(&case, &tables)?;
    println!("✓ Case '{}' is valid", case.name);
    Ok(())
}

fn cmd_run(case_path: &Path, json: bool, output: Option<&Path>) -> AppResult<()> {
    tracing::info!(path = %case_path.display(), "running case");
    let summary = pe_app::run_case_file(case_path)?;
    if let Some(path) = output {
        std::fs::write(path, summary.to_json()?)?;
        println!("✓ Summary written to {}", path.display());
    }
    if json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    println!("Case: {}  ({:.3} s)", summary.case, summary.elapsed_s);
    match &summary.result {
        RunResult::Equilibrium { closure, state } => {
            println!("Equilibrium ({closure})");
            print_state(state);
        }
        RunResult::Performance(perf) => print_performance(perf),
    }
    Ok(())
}

fn print_state(state: &StateSummary) {
    println!("  P        {:>12.4} bar", state.pressure_bar);
    println!("  T        {:>12.2} K", state.temperature_k);
    println!("  H        {:>12.2} kJ/kg", state.enthalpy_j_per_kg / 1000.0);
    println!("  S        {:>12.4} kJ/(kg K)", state.entropy_j_per_kg_k / 1000.0);
    println!("  M        {:>12.4} g/mol", state.molar_mass);
    println!("  Cp       {:>12.4} kJ/(kg K)", state.cp_j_per_kg_k / 1000.0);
    println!("  gamma_s  {:>12.4}", state.isentropic_exponent);
    println!("  a        {:>12.2} m/s", state.sound_speed_mps);
    println!("  rho      {:>12.5} kg/m^3", state.density_kg_per_m3);
    println!("  Species (mole fraction):");
    for s in &state.species {
        let phase = if s.condensed { " (cond)" } else { "" };
        println!("    {:<12}{:>12.5e}{phase}", s.name, s.mole_fraction);
    }
}

fn print_exit(exit: &ExitSummary) {
    println!("Exit: {}", exit.condition);
    print_state(&exit.state);
    println!("  Ae/At    {:>12.4}", exit.area_ratio);
    println!("  Cf       {:>12.4}", exit.cf);
    println!("  Mach     {:>12.4}", exit.mach);
    println!("  Isp      {:>12.2} m/s  {:>8.2} s", exit.isp_mps, exit.isp_s);
    println!("  Ivac     {:>12.2} m/s  {:>8.2} s", exit.ivac_mps, exit.ivac_s);
}

fn print_performance(perf: &PerformanceSummary) {
    println!(
        "Performance ({}), Pc = {:.4} bar, c* = {:.2} m/s",
        perf.strategy, perf.chamber_pressure_bar, perf.cstar_mps
    );
    println!("Chamber");
    print_state(&perf.chamber);
    println!("Throat");
    print_state(&perf.throat);
    for exit in &perf.exits {
        print_exit(exit);
    }
}

fn cmd_species(filter: Option<&str>, propellants: bool) -> AppResult<()> {
    let tables = pe_app::builtin_tables()?;
    if propellants {
        let rows = pe_app::list_propellants(&tables, filter);
        println!("{:<28}{:>12}{:>14}{:>10}", "Name", "M g/mol", "H J/g", "rho");
        for row in rows {
            println!(
                "{:<28}{:>12.4}{:>14.2}{:>10.3}",
                row.name, row.molar_mass, row.enthalpy_per_gram, row.density
            );
        }
    } else {
        let rows = pe_app::list_species(&tables, filter);
        println!("{:<12}{:>6}{:>12}{:>10}{:>10}", "Name", "Phase", "M g/mol", "T low", "T high");
        for row in rows {
            let phase = if row.condensed { "cond" } else { "gas" };
            println!(
                "{:<12}{:>6}{:>12.4}{:>10.1}{:>10.1}",
                row.name,
                phase,
                row.molar_mass,
                row.t_low.unwrap_or(f64::NAN),
                row.t_high.unwrap_or(f64::NAN)
            );
        }
    }
    Ok(())
}

fn cmd_sweep(request: &SweepRequest, json: bool) -> AppResult<()> {
    let tables = pe_app::builtin_tables()?;
    let points = pe_app::sweep_of(&tables, request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }
    println!(
        "{:>8}{:>10}{:>10}{:>10}{:>10}{:>10}",
        "O/F", "Tc K", "M", "c* m/s", "Isp s", "Ivac s"
    );
    for point in &points {
        print_point(point);
    }
    Ok(())
}

fn print_point(point: &SweepPoint) {
    match &point.error {
        Some(err) => println!("{:>8.3}  failed: {err}", point.of_ratio),
        None => println!(
            "{:>8.3}{:>10.1}{:>10.3}{:>10.1}{:>10.2}{:>10.2}",
            point.of_ratio,
            point.chamber_temperature_k.unwrap_or(f64::NAN),
            point.molar_mass.unwrap_or(f64::NAN),
            point.cstar_mps.unwrap_or(f64::NAN),
            point.isp_s.unwrap_or(f64::NAN),
            point.ivac_s.unwrap_or(f64::NAN),
        ),
    }
}
