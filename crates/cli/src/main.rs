//! Mintgate CLI - Main entry point

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use mintgate_cli::{commands, AppContext};
use mintgate_core::{Address, Amount};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mintgate")]
#[command(about = "Mintgate - time-locked, multi-approval mint controller", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Evaluate the command at this instant (RFC 3339) instead of now
    #[arg(long, global = true)]
    at: Option<DateTime<Utc>>,

    /// Identity performing the call
    #[arg(long = "as", global = true)]
    caller: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the controller
    Init {
        /// Owner identity
        #[arg(long)]
        owner: String,
        /// Policy file (JSON); defaults to an all-zero policy
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grant a registry attribute (kyc, approver, checker or a raw name)
    Grant {
        who: String,
        attribute: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Remove a registry attribute
    RevokeGrant { who: String, attribute: String },

    /// Request a mint
    Request { recipient: String, amount: Amount },

    /// Approve a pending mint
    Approve { index: usize },

    /// Revoke a pending mint
    Revoke { index: usize },

    /// Finalize a pending mint
    Finalize { index: usize },

    /// Pause a single pending mint
    PauseOp { index: usize },

    /// Unpause a single pending mint
    UnpauseOp { index: usize },

    /// Invalidate every pending mint
    Invalidate,

    /// Pause all new mint requests
    Pause,

    /// Resume mint requests
    Unpause,

    /// Reset the minted-today counter
    ResetQuota,

    /// Set the daily mint limit
    SetLimit { limit: Amount },

    /// Set the small mint threshold
    SetThreshold { threshold: Amount },

    /// Set approvals required for small and large mints
    SetApprovals { small: u8, large: u8 },

    /// Add a daily check time
    AddCheckTime { hour: u32, minute: u32 },

    /// Remove a check time by position
    RemoveCheckTime { index: usize },

    /// Declare a holiday
    AddHoliday { year: i32, month: u32, day: u32 },

    /// Lift a holiday
    RemoveHoliday { year: i32, month: u32, day: u32 },

    /// Rotate the mint key
    TransferMintKey { new_key: String },

    /// Show controller status
    Status,

    /// Verify the event journal hash chain
    Audit,
}

fn caller(cli: &Cli) -> anyhow::Result<Address> {
    match &cli.caller {
        Some(name) => Ok(Address::new(name.as_str())),
        None => anyhow::bail!("This command needs a caller: pass --as <identity>"),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut ctx = AppContext::open(&cli.data, cli.at)?;

    match &cli.command {
        Commands::Init { owner, config } => {
            commands::init(&mut ctx, &Address::new(owner.as_str()), config.as_deref())?;
        }

        Commands::Grant {
            who,
            attribute,
            notes,
        } => {
            commands::grant(&mut ctx, &Address::new(who.as_str()), attribute, notes)?;
        }

        Commands::RevokeGrant { who, attribute } => {
            commands::revoke_grant(&mut ctx, &Address::new(who.as_str()), attribute)?;
        }

        Commands::Request { recipient, amount } => {
            let recipient = Address::new(recipient.as_str());
            commands::request(&mut ctx, &caller(&cli)?, &recipient, *amount)?;
        }

        Commands::Approve { index } => commands::approve(&mut ctx, &caller(&cli)?, *index)?,
        Commands::Revoke { index } => commands::revoke(&mut ctx, &caller(&cli)?, *index)?,
        Commands::Finalize { index } => commands::finalize(&mut ctx, &caller(&cli)?, *index)?,
        Commands::PauseOp { index } => commands::pause_op(&mut ctx, &caller(&cli)?, *index)?,
        Commands::UnpauseOp { index } => commands::unpause_op(&mut ctx, &caller(&cli)?, *index)?,
        Commands::Invalidate => commands::invalidate(&mut ctx, &caller(&cli)?)?,
        Commands::Pause => commands::pause(&mut ctx, &caller(&cli)?)?,
        Commands::Unpause => commands::unpause(&mut ctx, &caller(&cli)?)?,
        Commands::ResetQuota => commands::reset_quota(&mut ctx, &caller(&cli)?)?,
        Commands::SetLimit { limit } => commands::set_limit(&mut ctx, &caller(&cli)?, *limit)?,

        Commands::SetThreshold { threshold } => {
            commands::set_threshold(&mut ctx, &caller(&cli)?, *threshold)?;
        }

        Commands::SetApprovals { small, large } => {
            commands::set_approvals(&mut ctx, &caller(&cli)?, *small, *large)?;
        }

        Commands::AddCheckTime { hour, minute } => {
            commands::add_check_time(&mut ctx, &caller(&cli)?, *hour, *minute)?;
        }

        Commands::RemoveCheckTime { index } => {
            commands::remove_check_time(&mut ctx, &caller(&cli)?, *index)?;
        }

        Commands::AddHoliday { year, month, day } => {
            commands::add_holiday(&mut ctx, &caller(&cli)?, *year, *month, *day)?;
        }

        Commands::RemoveHoliday { year, month, day } => {
            commands::remove_holiday(&mut ctx, &caller(&cli)?, *year, *month, *day)?;
        }

        Commands::TransferMintKey { new_key } => {
            let new_key = Address::new(new_key.as_str());
            commands::transfer_mint_key(&mut ctx, &caller(&cli)?, &new_key)?;
        }

        Commands::Status => commands::status(&ctx)?,

        Commands::Audit => {
            commands::audit(&ctx)?;
        }
    }

    Ok(())
}
