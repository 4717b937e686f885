use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::application::{LedgerService, OpOutcome};
use crate::domain::{Account, Action, evaluate, format_cents, parse_cents};
use crate::io::{ScriptReport, parse_script};
use crate::remote::{RandomSource, ThreadRngSource, Throttled};
use crate::util::fs::read_file_if_exists;
use crate::util::timer::run_every;

/// Fiscus - In-Memory Money Ledger
#[derive(Parser)]
#[command(name = "fiscus")]
#[command(about = "An in-memory money ledger with unreliable reconciliation and throttled reads")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a numeric operation
    Calc {
        /// First operand
        a: f64,

        /// Second operand
        b: f64,

        /// Operation: add, subtract, multiply, divide, exponentiate
        action: String,
    },

    /// Execute a ledger operations script against a fresh in-memory ledger
    Run {
        /// Path to the script file (open/deposit/withdraw/transfer/sync, one per line)
        script: String,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Repeatedly reconcile an account against the unreliable remote source
    Sync {
        /// Initial balance (e.g., "100.00" or "100")
        #[arg(long, default_value = "100.00")]
        initial: String,

        /// Number of reconciliation attempts
        #[arg(long, default_value = "5")]
        attempts: usize,

        /// Delay between attempts in milliseconds
        #[arg(long, default_value = "250")]
        period_ms: u64,
    },

    /// Fire a burst of throttled reads against a simulated remote source
    Fetch {
        /// Number of calls to issue
        #[arg(long, default_value = "8")]
        calls: usize,

        /// Interval between calls in milliseconds
        #[arg(long, default_value = "300")]
        period_ms: u64,

        /// Throttle window in milliseconds
        #[arg(long, default_value = "1000")]
        window_ms: u64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Commands::Calc { a, b, action } => {
                let action = Action::from_str(&action).with_context(|| {
                    format!(
                        "Unknown action '{}'. Use add, subtract, multiply, divide or exponentiate",
                        action
                    )
                })?;
                println!("{} {} {} = {}", a, action, b, evaluate(a, b, action));
            }

            Commands::Run {
                script,
                format,
                output,
            } => {
                let contents = read_file_if_exists(&script)
                    .await
                    .with_context(|| format!("Failed to read script '{}'", script))?
                    .with_context(|| format!("Script not found: {}", script))?;
                let lines = parse_script(&contents)?;

                let mut service = LedgerService::new();
                let records = service.run_script(&lines).await;
                let report = ScriptReport::new(records, service.balances());

                render_report(&report, &format, output.as_deref())?;
            }

            Commands::Sync {
                initial,
                attempts,
                period_ms,
            } => {
                let initial = parse_cents(&initial)
                    .context("Invalid amount format. Use '100.00' or '100'")?;
                let account = Account::new(initial);
                println!(
                    "Opened account {} with balance {}",
                    account.id(),
                    format_cents(account.balance())
                );

                for attempt in 1..=attempts {
                    if attempt > 1 {
                        tokio::time::sleep(Duration::from_millis(period_ms)).await;
                    }
                    match account.synchronize_balance().await {
                        Ok(()) => println!(
                            "attempt {}: balance synchronized to {}",
                            attempt,
                            format_cents(account.balance())
                        ),
                        Err(err) => println!("attempt {}: {}", attempt, err),
                    }
                }
            }

            Commands::Fetch {
                calls,
                period_ms,
                window_ms,
            } => {
                let source: Arc<dyn RandomSource> = Arc::new(ThreadRngSource);
                let throttled = Throttled::new(Duration::from_millis(window_ms), move |call: usize| {
                    let source = Arc::clone(&source);
                    async move {
                        // Simulated remote read: a little latency, then a drawn value.
                        tokio::time::sleep(Duration::from_millis(40)).await;
                        let value = source.draw(0, 10_000).await;
                        (call, value)
                    }
                });

                let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
                let ticker = run_every(Duration::from_millis(period_ms), move || {
                    let _ = tick_tx.send(());
                });

                println!("issuing {} calls, one every {}ms, window {}ms", calls, period_ms, window_ms);
                for call in 0..calls {
                    if tick_rx.recv().await.is_none() {
                        break;
                    }
                    let (opened_by, value) = throttled.call(call).await;
                    if opened_by == call {
                        println!("call {:>2}: {} (dispatched)", call, format_cents(value));
                    } else {
                        println!(
                            "call {:>2}: {} (coalesced into call {})",
                            call,
                            format_cents(value),
                            opened_by
                        );
                    }
                }
                ticker.abort();
            }
        }

        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "fiscus=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn render_report(report: &ScriptReport, format: &str, output: Option<&str>) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create '{}'", path))?,
        ),
        None => Box::new(io::stdout()),
    };

    match format {
        "table" => write_table(report, writer),
        "json" => report.write_json(writer),
        "csv" => report.write_csv(writer).map(|_| ()),
        other => bail!("Unknown format '{}'. Use table, json or csv", other),
    }
}

fn write_table<W: Write>(report: &ScriptReport, mut writer: W) -> Result<()> {
    writeln!(writer, "Operations:")?;
    for record in &report.records {
        match &record.outcome {
            OpOutcome::Applied { balance_cents } => writeln!(
                writer,
                "  line {:>3}  {:<36} applied (balance {})",
                record.line,
                record.operation,
                format_cents(*balance_cents)
            )?,
            OpOutcome::Rejected { error } => writeln!(
                writer,
                "  line {:>3}  {:<36} rejected: {}",
                record.line, record.operation, error
            )?,
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Final balances:")?;
    for entry in &report.balances {
        writeln!(
            writer,
            "  {:<20} {:>12}",
            entry.account,
            format_cents(entry.balance_cents)
        )?;
    }
    Ok(())
}
