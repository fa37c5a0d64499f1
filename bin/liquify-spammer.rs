use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use dotenv::dotenv;
use liquify_spammer::{
    setup_logger, AmountMode, BackoffPolicy, CampaignController, CampaignKind, CampaignReport,
    CampaignRequest, CampaignStatus, DiscountMode, HttpGateway, Identity, ParameterPolicy,
    RotationMode, SpammerConfig, TokioSleeper,
};
use liquify_spammer::policy::{DISCOUNT_RANGE, LIQUIDITY_AMOUNT_RANGE, UNSTAKE_AMOUNT_RANGE};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Liquidity receipts refill at this threshold when auto-refill is on.
const REFILL_THRESHOLD: u64 = 10_000;
/// Flat automation fee passed to add_liquidity, whole XRD.
const AUTOMATION_FEE: u64 = 5;
/// Fill iterations processed per unstake call.
const MAX_UNSTAKE_ITERATIONS: u8 = 26;

#[derive(Parser, Debug)]
#[command(author, version, about = "Campaign spammer for the Liquify component")]
struct Args {
    #[arg(short, long, default_value = "config/stokenet.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Repeatedly request funds from the faucet
    Faucet {
        #[arg(long)]
        account: Option<String>,
        #[arg(long, default_value_t = 10_000)]
        iterations: u32,
    },
    /// Run an add-liquidity campaign (interactive)
    Liquidity,
    /// Run an unstake campaign (interactive)
    Unstake,
    /// Collect fills against a held liquidity receipt
    CollectFills {
        #[arg(long, default_value_t = 25)]
        fills: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_logger();

    let args = Args::parse();
    let config = SpammerConfig::from_path(&args.config)?;
    let net = config.network_context();

    let identity = Identity::load_or_create(Path::new(&config.credentials_path), &net)
        .context("Failed to load or create credentials")?;
    println!("Your account is {}", identity.account());

    let controller = CampaignController::new(
        HttpGateway::new(&config.gateway_url),
        identity.clone(),
        net,
        TokioSleeper,
        Duration::from_millis(config.pacing_delay_ms),
        Duration::from_millis(config.poll_delay_ms),
        BackoffPolicy::fixed(config.failure_backoff_ms),
    );

    let command = match args.command {
        Some(command) => command,
        None => prompt_command()?,
    };

    match command {
        Commands::Faucet {
            account,
            iterations,
        } => {
            let recipient = match account {
                Some(account) => account,
                None => Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("Receiving account")
                    .default(identity.account().to_string())
                    .interact_text()?,
            };
            confirm("Start getting funds?")?;
            let report = controller.run_fund_requests(&recipient, iterations).await;
            info!("Submitted {} fund requests", report.state.successes);
        }
        Commands::Liquidity => {
            let report = run_liquidity(&controller, &config).await?;
            finish(report)?;
        }
        Commands::Unstake => {
            let report = run_unstake(&controller, &config).await?;
            finish(report)?;
        }
        Commands::CollectFills { fills } => {
            confirm(&format!("Collect {} fills?", fills))?;
            let intent_hash = controller.collect_fills(fills).await?;
            println!("Fills collected: {}", intent_hash);
        }
    }

    Ok(())
}

fn prompt_command() -> Result<Commands> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose")
        .items(&[
            "Get funds from faucet",
            "Spam liquidity",
            "Spam unstakes",
            "Collect fills",
        ])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => Commands::Faucet {
            account: None,
            iterations: 10_000,
        },
        1 => Commands::Liquidity,
        2 => Commands::Unstake,
        _ => Commands::CollectFills { fills: 25 },
    })
}

async fn run_liquidity(
    controller: &CampaignController<HttpGateway, TokioSleeper>,
    config: &SpammerConfig,
) -> Result<CampaignReport> {
    let theme = ColorfulTheme::default();

    let target: u64 = Input::with_theme(&theme)
        .with_prompt("How much XRD to spam in total?")
        .interact_text()?;

    let amount_choice = Select::with_theme(&theme)
        .with_prompt("Choose amount type")
        .items(&["Random amounts (10k-100k XRD)", "Set amount"])
        .default(0)
        .interact()?;
    let amount_mode = if amount_choice == 1 {
        let fixed: u64 = Input::with_theme(&theme)
            .with_prompt("Set amount for each transaction (XRD)")
            .interact_text()?;
        AmountMode::Fixed(fixed)
    } else {
        AmountMode::BoundedRandom {
            low: LIQUIDITY_AMOUNT_RANGE.0,
            high: LIQUIDITY_AMOUNT_RANGE.1,
        }
    };

    let discount_choice = Select::with_theme(&theme)
        .with_prompt("Choose discount type")
        .items(&["Random discount (0.5-1.5%)", "Set discount"])
        .default(0)
        .interact()?;
    let discount_mode = if discount_choice == 1 {
        let percent: f64 = Input::with_theme(&theme)
            .with_prompt("Discount percentage (e.g. 1.25 for 1.25%)")
            .interact_text()?;
        // The contract takes discounts in 5-decimal fixed point.
        DiscountMode::Fixed((percent * 1000.0).round() as u32)
    } else {
        DiscountMode::SteppedRandom {
            low: DISCOUNT_RANGE.0,
            high: DISCOUNT_RANGE.1,
            step: DISCOUNT_RANGE.2,
        }
    };

    let auto_unstake = Select::with_theme(&theme)
        .with_prompt("Auto unstake setting")
        .items(&[
            "auto_unstake = true (with auto_refill = true)",
            "auto_unstake = false (with auto_refill = false)",
        ])
        .default(0)
        .interact()?
        == 0;

    confirm("Start spamming liquidity?")?;

    let request = CampaignRequest {
        kind: CampaignKind::AddLiquidity {
            auto_unstake,
            auto_refill: auto_unstake,
            refill_threshold: REFILL_THRESHOLD,
            automation_fee: AUTOMATION_FEE,
        },
        target,
        already_done: 0,
        policy: ParameterPolicy::new(amount_mode, discount_mode, RotationMode::RandomPick),
        rotation_pool: config.validator_pairs.clone(),
        message: String::new(),
    };

    Ok(controller.run(request).await)
}

async fn run_unstake(
    controller: &CampaignController<HttpGateway, TokioSleeper>,
    config: &SpammerConfig,
) -> Result<CampaignReport> {
    let theme = ColorfulTheme::default();

    let target: u64 = Input::with_theme(&theme)
        .with_prompt("How much XRD worth of LSUs to unstake in total?")
        .interact_text()?;
    let already_done: u64 = Input::with_theme(&theme)
        .with_prompt("Amount already unstaked (0 if starting fresh)")
        .default(0)
        .interact_text()?;

    let amount_choice = Select::with_theme(&theme)
        .with_prompt("Choose amount type")
        .items(&[
            "Random amounts (default: 100k-500k)",
            "Custom random range",
            "Set amount",
        ])
        .default(0)
        .interact()?;
    let amount_mode = match amount_choice {
        1 => {
            let low: u64 = Input::with_theme(&theme)
                .with_prompt("Minimum amount (XRD)")
                .interact_text()?;
            let high: u64 = Input::with_theme(&theme)
                .with_prompt("Maximum amount (XRD)")
                .interact_text()?;
            if low > high {
                bail!("Invalid range: minimum {} exceeds maximum {}", low, high);
            }
            AmountMode::BoundedRandom { low, high }
        }
        2 => {
            let fixed: u64 = Input::with_theme(&theme)
                .with_prompt("Set amount for each transaction (XRD)")
                .interact_text()?;
            AmountMode::Fixed(fixed)
        }
        _ => AmountMode::BoundedRandom {
            low: UNSTAKE_AMOUNT_RANGE.0,
            high: UNSTAKE_AMOUNT_RANGE.1,
        },
    };

    confirm("Start spamming unstakes?")?;

    let request = CampaignRequest {
        kind: CampaignKind::Unstake {
            max_iterations: MAX_UNSTAKE_ITERATIONS,
        },
        target,
        already_done,
        policy: ParameterPolicy::new(amount_mode, DiscountMode::Fixed(0), RotationMode::RandomPick),
        rotation_pool: config.validator_pairs.clone(),
        message: String::new(),
    };

    Ok(controller.run(request).await)
}

fn confirm(prompt: &str) -> Result<()> {
    let proceed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("!! Double-check your input !! {}", prompt))
        .default(false)
        .interact()?;
    if !proceed {
        bail!("Aborted by user");
    }
    Ok(())
}

fn finish(report: CampaignReport) -> Result<()> {
    println!(
        "Committed {} / {} XRD over {} attempts ({} ok, {} failed)",
        report.state.cumulative,
        report.state.target,
        report.state.attempts,
        report.state.successes,
        report.state.failures
    );
    match report.status {
        CampaignStatus::Completed => Ok(()),
        CampaignStatus::Aborted => match report.error {
            Some(error) => Err(error).context(format!(
                "Campaign aborted; resume with remaining = {}",
                report.state.remaining()
            )),
            None => bail!("Campaign aborted"),
        },
    }
}
