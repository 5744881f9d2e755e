//! Leveraged position calculator CLI.
//!
//! Computes position size, margin, stops, targets and liquidation price from
//! whatever combination of risk inputs is given.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use levcalc::batch::{load_scenarios, run_batch};
use levcalc::report::{ErrorList, EvaluationTable, FailureReport};
use levcalc::{CalculatorConfig, EvaluationError, InputForm, PositionCalculator};

/// Leveraged position calculator CLI.
#[derive(Parser)]
#[command(name = "levcalc")]
#[command(about = "Size leveraged positions from risk, targets, and account limits", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LEVCALC_LOG")]
    log_level: String,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Raw input fields. Numbers are taken as text so bad values are reported
/// by the validator alongside every other problem.
#[derive(Args, Debug, Clone, Default)]
struct FormArgs {
    /// Account size in USD
    #[arg(short, long)]
    account_size: Option<String>,

    /// Leverage multiplier
    #[arg(short = 'x', long)]
    leverage: Option<String>,

    /// Entry price
    #[arg(short, long)]
    entry_price: Option<String>,

    /// Position type (long or short)
    #[arg(short = 't', long)]
    position_type: Option<String>,

    /// Stop-loss price
    #[arg(long)]
    stop_loss: Option<String>,

    /// Maximum loss in USD
    #[arg(long)]
    risk_usd: Option<String>,

    /// Take-profit price
    #[arg(long)]
    take_profit: Option<String>,

    /// Desired gain in USD
    #[arg(long)]
    target_profit: Option<String>,

    /// Position size (asset quantity); derived when omitted
    #[arg(long)]
    position_size: Option<String>,

    /// Do not fill missing required fields with reset defaults
    #[arg(long)]
    no_defaults: bool,
}

impl FormArgs {
    fn to_form(&self, config: &CalculatorConfig) -> InputForm {
        let form = InputForm {
            account_size: self.account_size.clone(),
            leverage: self.leverage.clone(),
            entry_price: self.entry_price.clone(),
            position_type: self.position_type.clone(),
            stop_loss_price: self.stop_loss.clone(),
            risk_usd: self.risk_usd.clone(),
            take_profit_price: self.take_profit.clone(),
            target_profit_usd: self.target_profit.clone(),
            position_size: self.position_size.clone(),
        };
        if self.no_defaults {
            form
        } else {
            form.with_defaults(&config.defaults)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate position metrics
    Calc(FormArgs),

    /// Check inputs without calculating
    Validate(FormArgs),

    /// Evaluate a JSON array of scenarios
    Batch {
        /// Path to the scenario file
        file: PathBuf,
    },

    /// Show reset defaults and calculator configuration
    Defaults,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = CalculatorConfig::from_env()?;
    debug!(?config, "Loaded configuration");
    let calculator = PositionCalculator::new(config);

    match cli.command {
        Commands::Calc(args) => {
            let form = args.to_form(calculator.config());
            match calculator.evaluate_form(&form) {
                Ok(eval) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&eval)?);
                    } else {
                        print!("{}", EvaluationTable(&eval));
                    }
                }
                Err(e) => return Ok(report_failure(cli.json, &e)),
            }
        }

        Commands::Validate(args) => {
            let parsed = match args.to_form(calculator.config()).parse() {
                Ok(parsed) => parsed,
                Err(errors) => return Ok(report_failure(cli.json, &EvaluationError::Invalid(errors))),
            };

            match calculator.validate(&parsed.inputs) {
                Ok(()) => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "ok": true, "errors": [] }));
                    } else {
                        println!("Inputs are valid.");
                    }
                }
                Err(errors) => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "ok": false, "errors": errors }));
                    } else {
                        print!("{}", ErrorList(&errors));
                    }
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Batch { file } => {
            let scenarios = load_scenarios(&file).await?;
            let outcomes = run_batch(&calculator, scenarios).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                println!("\n{:<6} {:<24} {:<8} {:>14} {:>14} {:>8}", "#", "NAME", "STATUS", "SIZE", "MARGIN", "R:R");
                println!("{}", "-".repeat(80));
                for o in &outcomes {
                    let name = o.name.clone().unwrap_or_else(|| "-".to_string());
                    match &o.metrics {
                        Some(m) => println!(
                            "{:<6} {:<24} {:<8} {:>14.4} {:>14.2} {:>8.2}",
                            o.index,
                            truncate(&name, 24),
                            "ok",
                            m.position_size.round_dp(4),
                            m.required_margin.round_dp(2),
                            m.risk_reward_ratio
                        ),
                        None => println!(
                            "{:<6} {:<24} {:<8} {}",
                            o.index,
                            truncate(&name, 24),
                            format!("{:?}", o.status).to_lowercase(),
                            o.errors.join("; ")
                        ),
                    }
                }
            }

            if outcomes.iter().any(|o| o.metrics.is_none()) {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Defaults => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(calculator.config())?);
            } else {
                let config = calculator.config();
                let d = &config.defaults;
                println!("\n=== Calculator Configuration ===\n");
                println!("Reset Defaults:");
                println!("  Account Size:  ${:.2}", d.account_size);
                println!("  Leverage:      {}x", d.leverage);
                println!("  Entry Price:   ${:.2}", d.entry_price);
                println!("  Position Type: {}", d.position_type);
                println!("\nDerivation:");
                println!("  Default Stop/Target Offset: {}%", (config.default_offset_pct * rust_decimal::Decimal::ONE_HUNDRED).normalize());
                println!("  Ratio Decimal Places:       {}", config.ratio_decimal_places);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_failure(json: bool, err: &EvaluationError) -> ExitCode {
    if json {
        println!("{}", serde_json::json!({ "ok": false, "errors": err.messages() }));
    } else {
        print!("{}", FailureReport(err));
    }
    ExitCode::FAILURE
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
