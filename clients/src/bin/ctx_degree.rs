//! `ctx-degree`: Contextuality degree of a configuration of Pauli contexts.
//!
//! Reads one context per line (comma-separated qubit letters), or builds the
//! isotropic lines of N qubits, and reports the minimum number of contexts
//! any classical sign assignment must violate.
//!
//! **Usage:**
//! ```text
//! ctx-degree <contexts.csv> [--solver exact|heuristic|replay] [--config <toml>]
//! ctx-degree --lines 3 --solver heuristic --workers 8 --seed 1
//! ctx-degree <contexts.csv> --solver replay --solution <letters> --report
//! ```
//!
//! Ctrl-C stops the search and prints the best answer found so far.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use contextuality::assignment::{isotropic_lines, read_contexts, ScoreReport};
use contextuality::config::{SatHint, SolverMode};
use contextuality::{
    CancelFlag, Candidate, ContextPool, DegreeConfig, DegreeEngine, DegreeOutcome,
    QuantumAssignment, SolverChoice,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Compute the contextuality degree of a set of Pauli contexts.
#[derive(Parser)]
#[command(
    name = "ctx-degree",
    about = "Compute the contextuality degree of a set of Pauli contexts"
)]
struct Args {
    /// Context file: one context per line, observables separated by commas.
    #[arg(required_unless_present = "lines", conflicts_with = "lines")]
    input: Option<PathBuf>,

    /// Use every isotropic line of N qubits instead of a file.
    #[arg(long, value_name = "N")]
    lines: Option<u32>,

    /// TOML configuration; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Solver answering the query.
    #[arg(long, value_enum)]
    solver: Option<SolverArg>,

    /// Solution letters to score with `--solver replay` or `--check`.
    #[arg(long)]
    solution: Option<String>,

    /// Rounds per heuristic worker.
    #[arg(long)]
    iterations: Option<usize>,

    /// Probability of flipping an eligible observable.
    #[arg(long)]
    flip_probability: Option<f64>,

    /// Fixed flip threshold; auto-tuned when omitted.
    #[arg(long)]
    threshold: Option<f64>,

    /// Heuristic worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Base seed for reproducible heuristic runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Expected answer hint for the CNF solver.
    #[arg(long, value_enum)]
    hint: Option<HintArg>,

    /// Only test whether the configuration is contextual.
    #[arg(long)]
    check: bool,

    /// Print the per-context listing of the solution.
    #[arg(long)]
    report: bool,

    /// Emit the outcome as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SolverArg {
    Exact,
    Heuristic,
    Replay,
}

impl From<SolverArg> for SolverMode {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::Exact => Self::Exact,
            SolverArg::Heuristic => Self::Heuristic,
            SolverArg::Replay => Self::Replay,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum HintArg {
    Sat,
    Unsat,
}

impl From<HintArg> for SatHint {
    fn from(arg: HintArg) -> Self {
        match arg {
            HintArg::Sat => Self::Sat,
            HintArg::Unsat => Self::Unsat,
        }
    }
}

/// JSON shape of a degree run.
#[derive(Serialize)]
struct Summary<'a> {
    contexts: usize,
    negative_contexts: usize,
    max_contexts_per_observable: usize,
    epsilon: f64,
    #[serde(flatten)]
    outcome: &'a DegreeOutcome,
    letters: Option<String>,
    report: Option<ScoreReport>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    if Registry::default().with(filter).with(fmt_layer).try_init().is_err() {
        eprintln!("tracing has already been initialised");
    }
}

fn load_config(args: &Args) -> Result<DegreeConfig> {
    let mut config = match &args.config {
        Some(path) => DegreeConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DegreeConfig::default(),
    };
    if let Some(solver) = args.solver {
        config.solver = solver.into();
    }
    if let Some(hint) = args.hint {
        config.exact.hint = hint.into();
    }
    let h = &mut config.heuristic;
    if let Some(v) = args.iterations {
        h.iterations = v;
    }
    if let Some(v) = args.flip_probability {
        h.flip_probability = v;
    }
    if args.threshold.is_some() {
        h.threshold = args.threshold;
    }
    if let Some(v) = args.workers {
        h.workers = v;
    }
    if args.seed.is_some() {
        h.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_pool(args: &Args) -> Result<(ContextPool, u32)> {
    match (&args.input, args.lines) {
        (_, Some(n)) => {
            let pool = isotropic_lines(n)
                .with_context(|| format!("enumerating lines of {n} qubits"))?;
            Ok((pool, n))
        }
        (Some(path), None) => {
            let (pool, n) =
                read_contexts(path).with_context(|| format!("reading {}", path.display()))?;
            pool.validate(n)
                .with_context(|| format!("checking contexts of {}", path.display()))?;
            Ok((pool, n))
        }
        (None, None) => bail!("either a context file or --lines is required"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = load_config(&args)?;
    let (pool, n) = load_pool(&args)?;
    let qa = QuantumAssignment::new(&pool, n).context("building the quantum assignment")?;
    let negative = qa.negative_count().context("computing context signs")?;
    let max_incidence = qa.max_contexts_per_observable()?;
    info!(
        qubits = n,
        contexts = qa.len(),
        negative,
        max_incidence,
        "configuration loaded"
    );

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || handler_flag.cancel())
        .context("installing the interrupt handler")?;
    let engine = DegreeEngine::new(config)?.with_cancel(cancel);

    if args.check {
        let contextual = engine.is_contextual(&qa)?;
        if args.json {
            println!("{}", serde_json::json!({ "contextual": contextual }));
        } else {
            println!("contextual: {contextual}");
        }
        return Ok(());
    }

    let replay = args
        .solution
        .as_deref()
        .map(|text| Candidate::from_letters(text, n))
        .transpose()
        .context("parsing --solution")?;
    let choice = SolverChoice::from_mode(engine.config().solver, replay)?;
    let outcome = engine.degree(&qa, &choice, true)?;
    if outcome.interrupted {
        warn!("search interrupted; the degree below is an upper bound");
    }

    let report = match (&outcome.solution, args.report) {
        (Some(solution), true) => Some(qa.report(solution)?),
        _ => None,
    };
    let summary = Summary {
        contexts: qa.len(),
        negative_contexts: negative,
        max_contexts_per_observable: max_incidence,
        epsilon: qa.epsilon(outcome.degree),
        outcome: &outcome,
        letters: outcome.solution.as_ref().map(Candidate::to_letters),
        report,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if outcome.interrupted {
        process::exit(130);
    }
    Ok(())
}

fn print_summary(summary: &Summary<'_>) {
    if let Some(report) = &summary.report {
        println!("{report}");
        println!();
    }
    println!("contexts: {}", summary.contexts);
    println!("negative contexts: {}", summary.negative_contexts);
    println!(
        "max contexts per observable: {}",
        summary.max_contexts_per_observable
    );
    let kind = if summary.outcome.exact {
        "degree"
    } else {
        "degree (upper bound)"
    };
    println!("{kind}: {}", summary.outcome.degree);
    println!("epsilon: {:.6}", summary.epsilon);
    if let Some(letters) = &summary.letters {
        println!("solution: {letters}");
    }
}
