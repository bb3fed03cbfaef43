use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use bret_game::{BotCase, BotReport, PayoffMode, TaskConfig, run_bot_session};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// Human-readable colored summary
    Console,
    /// Machine-readable JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "bret-bot", version = "0.1.0")]
#[command(about = "Automated scripted-play QA for the Bomb Risk Elicitation Task")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Bot cases to run (comma-separated: always_bomb,never_bomb)
    #[arg(long, default_value = "always_bomb,never_bomb")]
    cases: String,

    /// Override the number of rounds
    #[arg(long)]
    rounds: Option<u32>,

    /// Override the payoff mode (random_round or sum_all_rounds)
    #[arg(long)]
    payoff_mode: Option<String>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct RunOutcome {
    seed: u64,
    case: BotCase,
    passed: bool,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<BotReport>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = build_config(&args)?;
    let seeds = parse_seeds(&args.seeds)?;
    let cases = parse_cases(&args.cases)?;

    let mut outcomes = Vec::with_capacity(seeds.len() * cases.len());
    for &seed in &seeds {
        for &case in &cases {
            log::info!("running case {case} with seed {seed}");
            let outcome = match run_bot_session(&cfg, seed, case) {
                Ok(report) => RunOutcome {
                    seed,
                    case,
                    passed: true,
                    error: None,
                    report: args.verbose.then_some(report),
                },
                Err(err) => RunOutcome {
                    seed,
                    case,
                    passed: false,
                    error: Some(err.to_string()),
                    report: None,
                },
            };
            outcomes.push(outcome);
        }
    }

    let failures = outcomes.iter().filter(|o| !o.passed).count();
    match args.report {
        ReportFormat::Console => print_console(&outcomes),
        ReportFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(&outcomes).context("serializing report")?;
            println!("{rendered}");
        }
    }

    if failures > 0 {
        bail!("{failures} bot run(s) failed");
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<TaskConfig> {
    let mut cfg = TaskConfig::default();
    if let Some(rounds) = args.rounds {
        cfg.num_rounds = rounds;
    }
    if let Some(mode) = &args.payoff_mode {
        cfg.payoff_mode = mode
            .parse::<PayoffMode>()
            .ok()
            .with_context(|| format!("unknown payoff mode '{mode}'"))?;
    }
    cfg.validate().context("invalid task configuration")?;
    Ok(cfg)
}

fn parse_seeds(csv: &str) -> Result<Vec<u64>> {
    split_csv(csv)
        .iter()
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("invalid seed '{s}'"))
        })
        .collect()
}

fn parse_cases(csv: &str) -> Result<Vec<BotCase>> {
    split_csv(csv)
        .iter()
        .map(|s| {
            s.parse::<BotCase>()
                .ok()
                .with_context(|| format!("unknown bot case '{s}'"))
        })
        .collect()
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn print_console(outcomes: &[RunOutcome]) {
    println!("{}", "BRET bot results".bold());
    for outcome in outcomes {
        let status = if outcome.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        let detail = outcome.error.as_deref().unwrap_or("");
        println!(
            "  [{status}] case={} seed={} {detail}",
            outcome.case, outcome.seed
        );
        if let Some(report) = &outcome.report {
            println!(
                "         rounds={} round_to_pay={:?} total={}",
                report.rounds.len(),
                report.round_to_pay,
                report.total_payoff
            );
        }
    }
    let passed = outcomes.iter().filter(|o| o.passed).count();
    println!("{} {passed}/{} passed", "summary:".bold(), outcomes.len());
}
