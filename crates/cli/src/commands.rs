//! CLI commands

use mintgate_controller::{verify_chain, ControllerResult, MintController, PolicyConfig};
use mintgate_core::{Address, Amount};
use mintgate_registry::Capability;
use std::path::Path;

use crate::context::AppContext;

/// Run one controller entry point and persist the outcome.
///
/// Nothing is written when the call is rejected.
fn apply<T>(
    ctx: &mut AppContext,
    call: impl FnOnce(&mut MintController) -> ControllerResult<T>,
) -> Result<T, anyhow::Error> {
    let value = call(ctx.controller_mut()?)?;
    ctx.commit()?;
    Ok(value)
}

/// Resolve a capability name or a raw attribute name
fn attribute_name(name: &str) -> String {
    match name {
        "kyc" => Capability::KycPassed.attribute_name().to_string(),
        "approver" => Capability::MintApprover.attribute_name().to_string(),
        "checker" => Capability::MintChecker.attribute_name().to_string(),
        other => other.to_string(),
    }
}

/// Create the controller, optionally from a policy file
pub fn init(ctx: &mut AppContext, owner: &Address, config: Option<&Path>) -> Result<(), anyhow::Error> {
    let policy = match config {
        Some(path) => PolicyConfig::from_file(path)?,
        None => PolicyConfig::default(),
    };
    ctx.initialize(owner.clone(), policy)?;
    ctx.commit()?;

    println!("✅ Controller initialized (owner: {})", owner);
    Ok(())
}

/// Set a registry attribute (`kyc`, `approver`, `checker` or any raw name)
pub fn grant(ctx: &mut AppContext, who: &Address, attribute: &str, notes: &str) -> Result<(), anyhow::Error> {
    let attribute = attribute_name(attribute);
    ctx.registry.set_attribute(who, &attribute, 1, notes)?;
    ctx.commit()?;

    println!("✅ Granted {} to {}", attribute, who);
    Ok(())
}

pub fn revoke_grant(ctx: &mut AppContext, who: &Address, attribute: &str) -> Result<(), anyhow::Error> {
    let attribute = attribute_name(attribute);
    if !ctx.registry.clear_attribute(who, &attribute) {
        anyhow::bail!("{} does not hold {}", who, attribute);
    }
    ctx.commit()?;

    println!("✅ Removed {} from {}", attribute, who);
    Ok(())
}

pub fn request(ctx: &mut AppContext, caller: &Address, recipient: &Address, amount: Amount) -> Result<(), anyhow::Error> {
    let index = apply(ctx, |c| c.request_mint(caller, recipient, amount))?;
    let eligible = ctx.controller()?.eligible_at(index);

    println!("✅ Mint #{} requested: {} to {}", index, amount, recipient);
    match eligible {
        Some(at) => println!("   Finalizable by the mint key from {}", at.to_rfc3339()),
        None => println!("   No check times configured; only the owner can finalize"),
    }
    Ok(())
}

pub fn approve(ctx: &mut AppContext, caller: &Address, index: usize) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.approve_mint(caller, index))?;
    let op = ctx.controller()?.mint_operation(index);
    let approvals = op.map(|op| op.approval_count()).unwrap_or_default();

    println!("✅ Mint #{} approved by {} ({} approvals)", index, caller, approvals);
    Ok(())
}

pub fn revoke(ctx: &mut AppContext, caller: &Address, index: usize) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.revoke_mint(caller, index))?;
    println!("✅ Mint #{} revoked", index);
    Ok(())
}

pub fn finalize(ctx: &mut AppContext, caller: &Address, index: usize) -> Result<(), anyhow::Error> {
    let op = ctx
        .controller()?
        .mint_operation(index)
        .cloned();
    apply(ctx, |c| c.finalize_mint(caller, index))?;

    if let Some(op) = op {
        println!(
            "✅ Mint #{} finalized: {} to {} (balance: {})",
            index,
            op.amount,
            op.recipient,
            ctx.asset.balance_of(&op.recipient)
        );
    }
    Ok(())
}

pub fn pause_op(ctx: &mut AppContext, caller: &Address, index: usize) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.pause_mint(caller, index))?;
    println!("⏸️  Mint #{} paused", index);
    Ok(())
}

pub fn unpause_op(ctx: &mut AppContext, caller: &Address, index: usize) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.unpause_mint(caller, index))?;
    println!("▶️  Mint #{} unpaused", index);
    Ok(())
}

pub fn invalidate(ctx: &mut AppContext, caller: &Address) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.invalidate_all_pending_mints(caller))?;
    println!(
        "✅ All pending mints invalidated (generation {})",
        ctx.controller()?.generation()
    );
    Ok(())
}

pub fn pause(ctx: &mut AppContext, caller: &Address) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.pause_mints(caller))?;
    println!("⏸️  All mints paused");
    Ok(())
}

pub fn unpause(ctx: &mut AppContext, caller: &Address) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.unpause_mints(caller))?;
    println!("▶️  All mints unpaused");
    Ok(())
}

pub fn reset_quota(ctx: &mut AppContext, caller: &Address) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.reset_minted_today(caller))?;
    println!("✅ Minted-today counter reset");
    Ok(())
}

pub fn set_limit(ctx: &mut AppContext, caller: &Address, limit: Amount) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.set_mint_limit(caller, limit))?;
    println!("✅ Daily mint limit set to {}", limit);
    Ok(())
}

pub fn set_threshold(ctx: &mut AppContext, caller: &Address, threshold: Amount) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.set_small_mint_threshold(caller, threshold))?;
    println!("✅ Small mint threshold set to {}", threshold);
    Ok(())
}

pub fn set_approvals(ctx: &mut AppContext, caller: &Address, small: u8, large: u8) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.set_minimal_approvals(caller, small, large))?;
    println!("✅ Approvals required: {} (small), {} (large)", small, large);
    Ok(())
}

pub fn add_check_time(ctx: &mut AppContext, caller: &Address, hour: u32, minute: u32) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.add_mint_check_time(caller, hour, minute))?;
    println!("✅ Check time {:02}:{:02} added", hour, minute);
    Ok(())
}

pub fn remove_check_time(ctx: &mut AppContext, caller: &Address, index: usize) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.remove_mint_check_time(caller, index))?;
    println!("✅ Check time #{} removed", index);
    Ok(())
}

pub fn add_holiday(ctx: &mut AppContext, caller: &Address, year: i32, month: u32, day: u32) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.add_holiday(caller, year, month, day))?;
    println!("✅ Holiday {:04}-{:02}-{:02} declared", year, month, day);
    Ok(())
}

pub fn remove_holiday(ctx: &mut AppContext, caller: &Address, year: i32, month: u32, day: u32) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.remove_holiday(caller, year, month, day))?;
    println!("✅ Holiday {:04}-{:02}-{:02} removed", year, month, day);
    Ok(())
}

pub fn transfer_mint_key(ctx: &mut AppContext, caller: &Address, new_key: &Address) -> Result<(), anyhow::Error> {
    apply(ctx, |c| c.transfer_mint_key(caller, new_key.clone()))?;
    println!("✅ Mint key transferred to {}", new_key);
    Ok(())
}

/// Print roles, policy, quota and pending operations
pub fn status(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let controller = ctx.controller()?;
    let policy = controller.policy();

    println!("📋 Mintgate status at {}", ctx.now().to_rfc3339());
    println!("   Owner:         {}", controller.owner());
    println!("   Mint key:      {}", controller.mint_key());
    println!(
        "   Minting:       {}{}",
        if controller.minting_allowed_today() { "open today" } else { "closed today" },
        if controller.mint_paused() { " (all mints paused)" } else { "" }
    );
    println!(
        "   Quota:         {} / {}",
        controller.minted_today(),
        policy.mint_limit
    );
    println!(
        "   Approvals:     {} up to {}, {} above",
        policy.small_mint_approvals, policy.small_mint_threshold, policy.large_mint_approvals
    );

    let check_times: Vec<String> = policy.check_times.iter().map(|c| c.to_string()).collect();
    println!("   Check times:   [{}]", check_times.join(", "));
    let holidays: Vec<String> = policy.holidays.iter().map(|d| d.to_string()).collect();
    println!("   Holidays:      [{}]", holidays.join(", "));
    println!("   Generation:    {}", controller.generation());

    let pending = controller.pending_mints();
    if pending.is_empty() {
        println!("   No pending mints");
        return Ok(());
    }

    println!("   Pending mints:");
    for (index, op) in pending {
        let ready = op
            .requested_at
            .map(|at| controller.enough_time_passed(at))
            .unwrap_or(false);
        println!(
            "   #{:<4} {:>12} → {:<16} approvals: {} / {}{}{}",
            index,
            op.amount.to_string(),
            op.recipient.to_string(),
            op.approval_count(),
            policy.required_approvals(op.amount),
            if op.paused { "  [paused]" } else { "" },
            if ready { "  [timelock passed]" } else { "" }
        );
    }
    Ok(())
}

/// Verify the journal hash chain
pub fn audit(ctx: &AppContext) -> Result<usize, anyhow::Error> {
    let entries = ctx.journal.read_all()?;
    match verify_chain(&entries) {
        Ok(()) => {
            println!("✅ Hash chain verified ({} entries)", entries.len());
            Ok(entries.len())
        }
        Err(e) => {
            println!("❌ Hash chain broken: {}", e);
            Err(e.into())
        }
    }
}
