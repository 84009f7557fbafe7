use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qubitvec::compiler::{self, Program};
use qubitvec::config::{EngineConfig, OptimizeMode};
use qubitvec::core::Simulator;
use qubitvec::runtime::{self, ScheduledProgram};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qubitvec")]
#[command(version)]
#[command(about = "Dense state-vector quantum circuit simulator", long_about = None)]
struct Cli {
    /// Log engine activity (same as RUST_LOG=qubitvec=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run built-in demonstration circuits
    Demo,

    /// Parse, optimize and execute a circuit file
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Register width, overriding QREG and inference
        #[arg(short, long)]
        qubits: Option<usize>,

        /// Measurement seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Worker threads for the parallel gate path
        #[arg(short, long)]
        workers: Option<usize>,

        /// Skip the peephole optimizer
        #[arg(long)]
        no_opt: bool,

        /// Repeat optimizer passes until nothing cancels
        #[arg(long, conflicts_with = "no_opt")]
        fixed_point: bool,
    },

    /// Optimize a circuit file and print the result
    Opt {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Repeat optimizer passes until nothing cancels
        #[arg(long)]
        fixed_point: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    print_banner();

    let outcome = match cli.command {
        None | Some(Commands::Demo) => run_all_demos(),
        Some(Commands::Run { file, config, qubits, seed, workers, no_opt, fixed_point }) => {
            let overrides = Overrides { qubits, seed, workers, no_opt, fixed_point };
            cli_run(&file, config.as_deref(), overrides)
        }
        Some(Commands::Opt { file, fixed_point }) => cli_optimize(&file, fixed_point),
    };

    if let Err(e) = outcome {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "qubitvec=debug" } else { "qubitvec=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn print_banner() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║          qubitvec v{:<26}║", env!("CARGO_PKG_VERSION"));
    println!("║    Dense State-Vector Circuit Simulator      ║");
    println!("╚══════════════════════════════════════════════╝");
    println!();
}

// ── CLI ───────────────────────────────────────────────────────────────────

struct Overrides {
    qubits: Option<usize>,
    seed: Option<u64>,
    workers: Option<usize>,
    no_opt: bool,
    fixed_point: bool,
}

fn read_program(path: &Path) -> Result<Program> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    compiler::parse_source(&source).with_context(|| format!("in '{}'", path.display()))
}

fn cli_run(path: &Path, config_path: Option<&Path>, overrides: Overrides) -> Result<()> {
    let mut config = match config_path {
        Some(p) => EngineConfig::load(p)?,
        None => EngineConfig::default(),
    };
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }
    if let Some(w) = overrides.workers {
        config.parallel.workers = w;
    }
    if overrides.no_opt {
        config.optimizer.enabled = false;
    }
    if overrides.fixed_point {
        config.optimizer.mode = OptimizeMode::FixedPoint;
    }

    println!("━━━ Circuit Runner ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("File: {}\n", path.display());

    let mut program = read_program(path)?;
    if let Some(n) = overrides.qubits {
        program.num_qubits = Some(n);
    }

    let ScheduledProgram { program, metadata } = runtime::schedule_with(&program, &config.optimizer);

    println!("Program IR:");
    print!("{}", indent(&program.to_string()));
    println!();
    println!(
        "Circuit: {} gate(s) | {} measurement(s) | {} qubit(s) | {} gate(s) optimized away\n",
        program.gate_count(),
        program.measure_count(),
        program.register_width(),
        metadata.gates_removed
    );

    let result = runtime::run(&program, config)?;

    let display_probs = result
        .pre_measurement_probs
        .as_deref()
        .unwrap_or(&result.final_probabilities);
    let label = if result.pre_measurement_probs.is_some() {
        "Pre-measurement state"
    } else {
        "Final state (no measurements)"
    };

    println!("{label}:");
    for (lbl, prob) in result.significant_states(display_probs, 1e-6) {
        println!("  |{lbl}⟩  {prob:.6}");
    }
    println!();

    if !result.measurements.is_empty() {
        println!("Measurement results:");
        for m in &result.measurements {
            println!("  q{}  →  {}", m.qubit, m.outcome);
        }
        if let Some(bs) = result.bitstring() {
            println!("  Bitstring (q0…qN): {bs}");
        }
    }
    if result.skipped > 0 {
        println!("\n{} unsupported instruction(s) skipped", result.skipped);
    }
    Ok(())
}

fn cli_optimize(path: &Path, fixed_point: bool) -> Result<()> {
    println!("━━━ Circuit Optimizer ━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("File: {}\n", path.display());

    let program = read_program(path)?;
    let mode = if fixed_point { OptimizeMode::FixedPoint } else { OptimizeMode::SinglePass };
    let scheduled = runtime::schedule(&program, mode);

    println!("Optimized IR:");
    print!("{}", indent(&scheduled.program.to_string()));
    println!();
    print_stats(program.gate_count(), &scheduled);
    Ok(())
}

fn print_stats(before: usize, scheduled: &ScheduledProgram) {
    let m = &scheduled.metadata;
    let pct = if before == 0 { 0.0 } else { m.gates_removed as f64 * 100.0 / before as f64 };
    println!("Gates before : {before}");
    println!("Gates after  : {}  (-{pct:.1}%)", m.gates_remaining);
    println!("Passes       : {}", m.optimizer_passes);
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("  {l}\n")).collect()
}

// ── Demos (Rust API) ──────────────────────────────────────────────────────

fn run_all_demos() -> Result<()> {
    demo_single_qubit()?;
    demo_bell_state()?;
    demo_ghz_state()?;
    demo_teleportation()?;
    demo_deutsch()?;
    demo_pipeline()?;
    demo_optimizer()?;
    demo_parallel()?;
    Ok(())
}

fn demo_single_qubit() -> Result<()> {
    println!("━━━ Demo 1: Single Qubit Basics ━━━━━━━━━━━━━━━━━");
    let mut sim = Simulator::new(1)?;
    println!("Initial |0⟩:");
    print!("{}", sim.state());
    sim.h(0)?;
    println!("After H (superposition):");
    print!("{}", sim.state());
    sim.z(0)?.h(0)?;
    println!("After H·Z·H = X (should be |1⟩):");
    print!("{}", sim.state());
    println!();
    Ok(())
}

fn demo_bell_state() -> Result<()> {
    println!("━━━ Demo 2: Bell State |Φ+⟩ ━━━━━━━━━━━━━━━━━━━━━");
    let mut sim = Simulator::new(2)?;
    sim.h(0)?.cnot(0, 1)?;
    print!("{}", sim.state());

    let mut counts = [0u32; 4];
    for _ in 0..1000 {
        sim.reset();
        sim.h(0)?.cnot(0, 1)?;
        let r = sim.measure_all()?;
        counts[usize::from(r[1]) << 1 | usize::from(r[0])] += 1;
    }
    println!("Sampling 1000 shots:  |00⟩={} |11⟩={}", counts[0], counts[3]);
    println!();
    Ok(())
}

fn demo_ghz_state() -> Result<()> {
    println!("━━━ Demo 3: GHZ State (3 qubits) ━━━━━━━━━━━━━━━━");
    let mut sim = Simulator::new(3)?;
    sim.h(0)?.cnot(0, 1)?.cnot(0, 2)?;
    print!("{}", sim.state());

    let (mut c000, mut c111, mut other) = (0u32, 0u32, 0u32);
    for _ in 0..1000 {
        sim.reset();
        sim.h(0)?.cnot(0, 1)?.cnot(0, 2)?;
        match sim.measure_all_string()?.as_str() {
            "000" => c000 += 1,
            "111" => c111 += 1,
            _ => other += 1,
        }
    }
    println!("Sampling 1000 shots:  |000⟩={c000}  |111⟩={c111}  other={other}");
    println!();
    Ok(())
}

fn demo_teleportation() -> Result<()> {
    println!("━━━ Demo 4: Quantum Teleportation ━━━━━━━━━━━━━━━");
    println!("Teleporting |+⟩ from q0 to q2.  [msg|alice|bob]");
    let mut sim = Simulator::new(3)?;
    sim.h(0)?;
    sim.h(1)?.cnot(1, 2)?;
    sim.cnot(0, 1)?.h(0)?;
    let m0 = sim.measure(0)?;
    let m1 = sim.measure(1)?;
    if m1 == 1 {
        sim.x(2)?;
    }
    if m0 == 1 {
        sim.z(2)?;
    }
    let p1 = sim.qubit_probability_one(2)?;
    let verdict = if (p1 - 0.5).abs() < 0.01 { "SUCCESS" } else { "FAILED" };
    println!("Bob P(|1⟩) = {p1:.4}  →  {verdict}");
    println!();
    Ok(())
}

fn demo_deutsch() -> Result<()> {
    println!("━━━ Demo 5: Deutsch Algorithm ━━━━━━━━━━━━━━━━━━━");
    println!("One oracle query reveals constant vs balanced.\n");

    let run = |balanced: bool| -> Result<u8> {
        let mut sim = Simulator::new(2)?;
        sim.x(1)?.h(0)?.h(1)?;
        if balanced {
            sim.cnot(0, 1)?;
        }
        sim.h(0)?;
        Ok(sim.measure(0)?)
    };
    println!("  f(x)=0 (constant): q0={} (expect 0)", run(false)?);
    println!("  f(x)=x (balanced): q0={} (expect 1)", run(true)?);
    println!();
    Ok(())
}

fn demo_pipeline() -> Result<()> {
    println!("━━━ Demo 6: Source → Optimizer → Executor ━━━━━━━━");
    let source = "\
# Bell pair with a redundant prefix
QREG 2
X 0
X 0
H 0
CNOT 0 1
MEASURE 0
MEASURE 1
";
    let program = compiler::parse_source(source)?;
    let scheduled = runtime::schedule(&program, OptimizeMode::SinglePass);
    let config = EngineConfig { seed: Some(42), ..EngineConfig::default() };
    let result = runtime::run(&scheduled.program, config)?;

    print!("{}", indent(&scheduled.program.to_string()));
    println!(
        "Removed {} gate(s); executed {}; bitstring {}",
        scheduled.metadata.gates_removed,
        result.gate_count,
        result.bitstring().unwrap_or_default()
    );
    println!();
    Ok(())
}

fn demo_optimizer() -> Result<()> {
    println!("━━━ Demo 7: Gate Optimizer ━━━━━━━━━━━━━━━━━━━━━━");

    let redundant = "\
// Intentionally redundant circuit
QREG 3
H 0          // cancels with the H below
Y 2          // nested pair, exposed once the X pair goes
X 2
X 2
Y 2
H 0
CNOT 0 1
S 1          // not self-inverse, kept
S 1
MEASURE 0
";

    println!("Source (redundant):");
    for line in redundant.lines() {
        let t = line.trim();
        if !t.is_empty() && !t.starts_with("//") {
            println!("  {t}");
        }
    }
    println!();

    let program = compiler::parse_source(redundant)?;
    for mode in [OptimizeMode::SinglePass, OptimizeMode::FixedPoint] {
        let scheduled = runtime::schedule(&program, mode);
        println!("After {mode:?}:");
        print!("{}", indent(&scheduled.program.to_string()));
        print_stats(program.gate_count(), &scheduled);
        println!();
    }
    Ok(())
}

fn demo_parallel() -> Result<()> {
    println!("━━━ Demo 8: Parallel Gate Path ━━━━━━━━━━━━━━━━━━");
    let n = 16;
    let mut serial_cfg = EngineConfig::default();
    serial_cfg.parallel.workers = 1;
    let mut parallel_cfg = EngineConfig::default();
    parallel_cfg.parallel.workers = 4;
    parallel_cfg.parallel.min_qubits = 1;

    let mut serial = Simulator::with_config(n, serial_cfg)?;
    let mut parallel = Simulator::with_config(n, parallel_cfg)?;
    for q in 0..n {
        serial.h(q)?;
        parallel.h(q)?;
    }
    serial.cnot(0, n - 1)?;
    parallel.cnot(0, n - 1)?;

    let identical = serial.state().real() == parallel.state().real()
        && serial.state().imag() == parallel.state().imag();
    println!("H on all {n} qubits, serial vs 4 workers:");
    println!("  amplitudes bit-identical: {}", if identical { "✓" } else { "✗" });
    println!("  total probability       : {:.6}", parallel.state().total_probability());
    println!();
    Ok(())
}
