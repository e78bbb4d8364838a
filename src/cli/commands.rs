//! CLI commands for the ledger
//!
//! Implements the command handlers behind the binary's subcommands.

use crate::config::LedgerConfig;
use crate::core::{LedgerEngine, MiningReport};
use std::path::PathBuf;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Resolve the effective configuration
///
/// A config file wins over `--sample`; with neither the defaults apply.
pub fn load_config(
    path: Option<&PathBuf>,
    sample: bool,
    seed: Option<u64>,
) -> CliResult<LedgerConfig> {
    let mut config = match path {
        Some(path) => {
            println!("📂 Loading config from {:?}...", path);
            LedgerConfig::from_file(path)?
        }
        None if sample => LedgerConfig::sample(),
        None => LedgerConfig::default(),
    };

    if seed.is_some() {
        config.seed = seed;
    }

    Ok(config)
}

/// Print the effective configuration as JSON
pub fn cmd_config(config: &LedgerConfig) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Display chain info
pub fn cmd_chain_info(ledger: &LedgerEngine) -> CliResult<()> {
    let stats = ledger.stats();

    println!("⛓️  Ledger Info");
    println!("   ├─ Blocks: {}", stats.length);
    println!("   ├─ Committed transfers: {}", stats.committed_transfers);
    println!("   ├─ Pending transfers: {}", stats.pending_transfers);
    println!("   ├─ Participants: {}", stats.participants);
    println!("   ├─ Properties: {}", stats.properties);
    println!("   └─ Latest hash: {}...", &stats.latest_hash[..32]);

    Ok(())
}

/// List every block with its transfers
pub fn cmd_chain_blocks(ledger: &LedgerEngine) -> CliResult<()> {
    let (blocks, length) = ledger.get_chain();

    println!("🧱 Blocks:");
    for block in blocks {
        println!(
            "   #{} | {} | {} | miner {} | {} tx",
            block.index,
            &block.hash()[..16],
            block.timestamp.format("%Y-%m-%d %H:%M:%S"),
            block.miner,
            block.tx_count()
        );
        for tx in block.transfers() {
            println!("      └─ {}", tx);
        }
    }
    println!("   Length of ledger = {}", length);

    Ok(())
}

/// Show the ownership directory
pub fn cmd_directory(ledger: &LedgerEngine) -> CliResult<()> {
    println!("📒 Ownership directory:");
    for (identity, properties) in ledger.directory().iter() {
        println!("   {} → [{}]", identity, properties.join(", "));
    }
    Ok(())
}

/// Show the history of one property
pub fn cmd_history(ledger: &LedgerEngine, property: &str) -> CliResult<()> {
    let history = ledger.transaction_history(property);

    println!("📜 History of {}:", property);
    if history.is_empty() {
        println!("   (no committed transfers)");
    }
    for tx in &history {
        println!("   └─ {}", tx);
    }
    if let Some(owner) = ledger.owner_of(property) {
        println!("   Current owner: {}", owner);
    }

    Ok(())
}

/// Validate the chain
pub fn cmd_validate(ledger: &LedgerEngine) -> CliResult<()> {
    println!("🔍 Validating ledger...");

    match ledger.verify_chain() {
        Ok(()) => {
            println!("✅ Ledger is valid!");
            println!("   {} blocks verified", ledger.block_count());
            Ok(())
        }
        Err(e) => {
            println!("❌ Ledger validation FAILED!");
            println!("   The chain may have been tampered with.");
            Err(e.into())
        }
    }
}

fn print_report(report: &MiningReport) {
    println!("⛏️  Mining cycle complete");
    println!("   ├─ Miner order: {:?}", report.miner_order);
    println!("   ├─ Blocks committed: {:?}", report.committed_blocks);
    println!("   ├─ Accepted transfers: {}", report.accepted);
    println!("   ├─ Rejected transfers: {}", report.rejected.len());
    for rejected in &report.rejected {
        println!("   │  └─ {}: {}", rejected.transaction, rejected.reason);
    }
    println!("   └─ Time: {}ms", report.duration_ms);
}

/// Run a scripted scenario over the sample participants
pub fn cmd_demo(seed: Option<u64>) -> CliResult<()> {
    let config = load_config(None, true, seed)?;
    let mut ledger = LedgerEngine::from_config(&config)?;

    println!("🆕 Ledger created with participants {:?}", ledger.participants());

    ledger.register_participant("mia", vec!["paris".to_string()])?;
    println!("👤 Registered mia with [paris]");

    let transfers = [
        ("zia", "uk", "gia"),
        ("gia", "hyd", "tia"),
        ("tia", "dc", "zia"),
        ("zia", "usa", "mia"),
        ("gia", "uk", "mia"),
        ("mia", "paris", "kia"),
        ("tia", "uk", "zia"),
    ];
    for (seller, property, buyer) in transfers {
        ledger.submit_transaction(seller, property, buyer);
    }
    println!("📤 Submitted {} transfers", ledger.pending_count());

    let report = ledger.mine();
    print_report(&report);

    println!();
    cmd_chain_blocks(&ledger)?;
    println!();
    cmd_directory(&ledger)?;
    println!();
    cmd_history(&ledger, "uk")?;
    println!();
    cmd_chain_info(&ledger)?;
    println!();
    cmd_validate(&ledger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_precedence() {
        let config = load_config(None, false, None).unwrap();
        assert!(config.genesis_directory.is_empty());

        let config = load_config(None, true, Some(5)).unwrap();
        assert_eq!(config.genesis_directory.len(), 3);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_demo_runs() {
        assert!(cmd_demo(Some(3)).is_ok());
    }
}
