mod report;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tokenbag_core::{ConfigOverrides, RngState, TokenBag};
use tokenbag_data::load_token_bag;

use stats::{CostStats, OutcomeStats};

#[derive(Debug, Parser)]
#[command(name = "tokenbag", disable_version_flag = true)]
#[command(about = "Draw pulls from a token bag and report outcomes per rank")]
struct Args {
    /// Configuration document
    #[arg(short, long, default_value = "bagpool.conf")]
    config: PathBuf,

    /// Debug logging
    #[arg(short = 'D', long)]
    debug: bool,

    /// Write the log to this file instead of stderr
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Only report this rank
    #[arg(short, long)]
    rank: Option<u32>,

    /// Number of pulls to run
    #[arg(short, long, default_value_t = 10)]
    number_of_draws: usize,

    /// Maximum draws per pull
    #[arg(short = 'd', long, default_value_t = 3)]
    draw_cap: usize,

    /// Bag to draw from, replacing the configured one
    #[arg(short, long)]
    bag: Option<String>,

    /// Evaluate sums instead of hits/misses
    #[arg(short, long)]
    sums: bool,

    /// Label ranks by number instead of name
    #[arg(short = 'P', long)]
    print_rank_numbers: bool,

    /// Skip the configuration's test pulls
    #[arg(short = 'V', long)]
    skip_verify_tests: bool,

    /// Run resistance pulls
    #[arg(short = 'R', long)]
    resistance: bool,

    /// Seed for reproducible pulls
    #[arg(long)]
    seed: Option<u64>,

    /// Print runs and test reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut bag = load_token_bag(&args.config, args.bag.as_deref(), !args.skip_verify_tests)?;
    bag.configure_pull(&ConfigOverrides {
        max_draws: Some(args.draw_cap),
        sums: args.sums.then_some(true),
        ..ConfigOverrides::default()
    });
    let mut rng = args
        .seed
        .map_or_else(RngState::from_entropy, RngState::from_seed);
    log::debug!("pull seed {}", rng.seed());

    if !args.skip_verify_tests && !verify_tests(&args, &bag)? {
        eprintln!("\nERROR: Test Verifications failed. Aborting pulls");
        std::process::exit(1);
    }

    if args.resistance {
        run_resistance_pulls(&args, &bag, &mut rng)
    } else {
        run_standard_pulls(&args, &bag, &mut rng)
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    if args.debug {
        builder.filter_level(LevelFilter::Debug).format(|buf, record| {
            writeln!(
                buf,
                "{}@{} #{}: {}",
                record.module_path().unwrap_or("tokenbag"),
                record.level(),
                record.line().unwrap_or(0),
                record.args()
            )
        });
    } else {
        builder
            .filter_level(LevelFilter::Error)
            .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()));
    }
    builder.parse_default_env();
    if let Some(path) = &args.log {
        let file =
            File::create(path).with_context(|| format!("create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("initialize logging")?;
    Ok(())
}

fn verify_tests(args: &Args, bag: &TokenBag) -> Result<bool> {
    let report = bag.verify_tests();
    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("\nVerifying Tests");
        for result in &report.results {
            println!("{}", report::test_line(result));
        }
        println!(
            "\nTest Results: {} passed, {} failed",
            report.passed_count(),
            report.results.len() - report.passed_count()
        );
    }
    Ok(report.all_passed())
}

fn wanted(args: &Args, rank: u32) -> bool {
    args.rank.map_or(true, |only| only == rank)
}

fn run_standard_pulls(args: &Args, bag: &TokenBag, rng: &mut RngState) -> Result<()> {
    if !args.json {
        println!("\nRunning a pull");
    }
    let label = |rank| report::rank_label(&bag.config, rank, args.print_rank_numbers);
    let mut stats = OutcomeStats::default();
    for _ in 0..args.number_of_draws {
        let run = bag.pull(rng)?;
        if args.json {
            println!("{}", serde_json::to_string(&run)?);
        }
        let Some(last) = run.last() else {
            continue;
        };
        for result in last.ranks.iter().filter(|result| wanted(args, result.rank)) {
            log::debug!("{}", serde_json::to_string(result)?);
            stats.record(result);
            if !args.json {
                println!("{}", report::standard_line(result, &label(result.rank)));
            }
        }
    }
    if args.json {
        return Ok(());
    }

    println!("\nSummary Counts: (from {} pulls)", args.number_of_draws);
    for (rank, counts) in &stats.per_rank {
        println!("{}", report::outcome_summary_line(&label(*rank), counts));
    }
    println!("\n{}", report::outcome_summary_line("Totals", &stats.total));
    Ok(())
}

fn run_resistance_pulls(args: &Args, bag: &TokenBag, rng: &mut RngState) -> Result<()> {
    if !args.json {
        println!("\nRunning a Resistance pull");
    }
    let label = |rank| report::rank_label(&bag.config, rank, args.print_rank_numbers);
    let mut stats = CostStats::default();
    for _ in 0..args.number_of_draws {
        let run = bag.resistance_pull(rng)?;
        if args.json {
            println!("{}", serde_json::to_string(&run)?);
        }
        let Some(last) = run.last() else {
            continue;
        };
        let mut header = false;
        for result in last.ranks.iter().filter(|result| wanted(args, result.rank)) {
            log::debug!("{}", serde_json::to_string(result)?);
            let Some(costs) = result.costs else {
                continue;
            };
            stats.record(result);
            if args.json {
                continue;
            }
            if !header {
                println!("{}", report::pull_header(result));
                header = true;
            }
            println!("{}", report::cost_line(&label(result.rank), &costs));
        }
        if header {
            println!();
        }
    }
    if args.json {
        return Ok(());
    }

    println!("\nSummary Counts: (from {} pulls)", args.number_of_draws);
    for (rank, costs) in &stats.per_rank {
        println!("{}", report::cost_line(&label(*rank), costs));
    }
    println!("\n{}", report::cost_line("Totals", &stats.total));
    Ok(())
}
