mod catalog;
mod reports;
mod simulation;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use gacha_core::{DrawEngine, PityConfig, Rarity};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use catalog::CatalogFile;
use reports::Report;
use simulation::{SimulationPlan, SimulationSummary, Simulator, final_states, rate_deviations};
use util::{resolve_seeds, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored human-readable summary
    Console,
    /// Pretty-printed JSON document
    Json,
    /// Markdown tables
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "gacha-tester", version = "0.1.0")]
#[command(about = "Seeded draw simulator for gacha catalogs with pity guarantees")]
struct Args {
    /// Catalog JSON file (defaults to the bundled demo banner)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Pity config JSON file; missing fields fall back to defaults
    #[arg(long)]
    pity_config: Option<PathBuf>,

    /// Override the number of draws before a guaranteed pull
    #[arg(long)]
    guarantee_limit: Option<i64>,

    /// Override the guaranteed rarity tag
    #[arg(long)]
    rarity: Option<String>,

    /// Run plain weighted draws without the pity guarantee
    #[arg(long)]
    no_pity: bool,

    /// Seeds to run (comma-separated; decimal, 0x-hex or `random`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Independent sessions per seed
    #[arg(long, default_value_t = 100)]
    sessions: usize,

    /// Draws per session
    #[arg(long, default_value_t = 100)]
    pulls: usize,

    /// Draws per batch within a session
    #[arg(long, default_value_t = gacha_core::DEFAULT_DRAW_COUNT)]
    batch: usize,

    /// Pity counter every session starts from
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    start_pity: i64,

    /// Allowed drift in percentage points between observed and expected rarity rates
    #[arg(long, default_value_t = 1.5)]
    tolerance: f64,

    /// Print the catalog's draw probabilities and exit
    #[arg(long)]
    list_probabilities: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output (debug logging unless RUST_LOG says otherwise)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let catalog = load_catalog(&args)?;
    let engine = Arc::new(DrawEngine::new(catalog.cards).context("catalog failed validation")?);

    if maybe_list_probabilities(&args, &engine)? {
        return Ok(());
    }

    if announces(&args) {
        announce_banner();
    }

    let pity_config = resolve_pity_config(&args)?;
    let plan = build_plan(&args, pity_config.as_ref())?;
    let simulator = Simulator::new(engine, pity_config.as_ref())?;
    let seeds = resolve_seeds(&split_csv(&args.seeds))?;

    let start_time = Instant::now();
    let runs = seeds
        .iter()
        .map(|seed| simulator.run(&plan, *seed))
        .collect::<Result<Vec<_>>>()?;

    let failures: Vec<String> = if simulator.pity().is_some() {
        Vec::new()
    } else {
        runs.iter()
            .flat_map(|run| rate_deviations(run, args.tolerance))
            .collect()
    };

    let guarantee_preview = simulator
        .pity()
        .map(|pity| pity.next_guarantee_info(args.start_pity))
        .transpose()?;
    let pity_states = simulator
        .pity()
        .map(|pity| aggregate_states(&runs, |run| final_states(pity, run)));

    let report = Report {
        generated_at: chrono::Utc::now().to_rfc3339(),
        catalog_size: simulator.engine().len(),
        total_weight: simulator.engine().total_weight(),
        probabilities: simulator.engine().probabilities().into_iter().collect(),
        pity: pity_config.as_ref(),
        guarantee_preview,
        final_states: pity_states,
        runs: &runs,
        failures: &failures,
    };
    write_report(&args, &report, start_time)?;

    if !failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn announces(args: &Args) -> bool {
    args.report == ReportFormat::Console || args.output.is_some()
}

fn announce_banner() {
    println!("{}", "🎰 Gacha Draw Simulator".bright_cyan().bold());
    println!("{}", "=======================".cyan());
}

fn load_catalog(args: &Args) -> Result<CatalogFile> {
    match &args.catalog {
        Some(path) => CatalogFile::load(path)
            .with_context(|| format!("loading catalog {}", path.display())),
        None => CatalogFile::demo().context("loading bundled demo catalog"),
    }
}

fn resolve_pity_config(args: &Args) -> Result<Option<PityConfig>> {
    if args.no_pity {
        return Ok(None);
    }
    let mut config = match &args.pity_config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            PityConfig::from_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => PityConfig::default(),
    };
    if let Some(limit) = args.guarantee_limit {
        config.guarantee_limit = limit;
    }
    if let Some(rarity) = &args.rarity {
        config.guaranteed_rarity = Rarity::new(rarity);
    }
    config.validate()?;
    Ok(Some(config))
}

fn build_plan(args: &Args, pity: Option<&PityConfig>) -> Result<SimulationPlan> {
    if args.sessions == 0 || args.pulls == 0 || args.batch == 0 {
        bail!("--sessions, --pulls and --batch must all be positive");
    }
    if args.start_pity < 0 {
        bail!("--start-pity must be non-negative");
    }
    let tracked_rarity = pity
        .map(|config| config.guaranteed_rarity.clone())
        .or_else(|| args.rarity.as_deref().map(Rarity::new))
        .unwrap_or_else(Rarity::ultra_rare);
    Ok(SimulationPlan {
        sessions: args.sessions,
        pulls_per_session: args.pulls,
        batch_size: args.batch,
        start_pity: args.start_pity,
        tracked_rarity,
    })
}

fn aggregate_states<F>(runs: &[SimulationSummary], per_run: F) -> BTreeMap<&'static str, usize>
where
    F: Fn(&SimulationSummary) -> BTreeMap<&'static str, usize>,
{
    let mut totals = BTreeMap::new();
    for run in runs {
        for (state, count) in per_run(run) {
            *totals.entry(state).or_insert(0) += count;
        }
    }
    totals
}

fn maybe_list_probabilities(args: &Args, engine: &DrawEngine<gacha_core::Card>) -> Result<bool> {
    if !args.list_probabilities {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let probabilities = engine.probabilities();
    writeln!(output_target.writer(), "Draw probabilities:")?;
    for card in engine.items() {
        let pct = probabilities.get(&card.id).copied().unwrap_or(0.0);
        writeln!(
            output_target.writer(),
            "  {:10} {:24} {:12} {pct:>6.2}%",
            card.id,
            card.name,
            card.rarity.as_str()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn write_report(args: &Args, report: &Report<'_>, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, report)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut output_target, report)?,
        ReportFormat::Console => {
            reports::generate_console_report(&mut output_target, report, start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
