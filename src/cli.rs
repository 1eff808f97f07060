//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::csv_history_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_state_adapter::JsonStateAdapter;
use crate::adapters::paper_market::{PaperDecisionMaker, PaperExecutor, PaperScanner};
use crate::adapters::pulse_file_adapter::PulseFileAdapter;
use crate::adapters::system_clock::SystemClock;
use crate::domain::agent::{Agent, Bucket};
use crate::domain::config::{
    AllocationPolicy, BlessingRules, DistributionPolicy, HarvestPolicy, PaperSettings, RiskLimits,
    StatePaths, TreasuryConfig,
};
use crate::domain::config_validation::validate_treasury_config;
use crate::domain::cycle::{AgentOutcome, CycleReport, TradingDesk};
use crate::domain::error::TreasuryError;
use crate::domain::ledger::HistoryEntry;
use crate::domain::treasury::Treasury;
use crate::logging::setup_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::state_port::StatePort;

type FileTreasury = Treasury<JsonStateAdapter, SystemClock>;

#[derive(Parser, Debug)]
#[command(name = "swarmtreasury", about = "Treasury and risk gate for a paper-trading agent swarm")]
pub struct Cli {
    /// INI configuration file; built-in defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Log level or tracing filter directive
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show balances, P&L, risk state and per-agent stats
    Status,
    /// Recompute bucket allocation from total capital and win rates
    Allocate,
    /// Sweep excess treasury reserve into savings
    Harvest,
    /// Show the advisory learnings handed to the swarm
    Learnings,
    /// Run the paper-trading loop until Ctrl-C or --cycles
    Paper {
        #[arg(long)]
        cycles: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Delete persisted treasury and learnings state
    Reset,
    /// Add capital to the treasury
    Deposit { amount: f64 },
    /// Remove capital from the treasury
    Withdraw { amount: f64 },
    /// Show recent history entries
    History {
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only entries for this agent (polymarket, base_meme)
        #[arg(long)]
        agent: Option<String>,
        /// Write the selected entries to a CSV file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    setup_logging(&cli.log_level, cli.json_logs);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let result = match cli.command {
        Command::Status => run_status(config),
        Command::Allocate => run_allocate(config),
        Command::Harvest => run_harvest(config),
        Command::Learnings => run_learnings(config),
        Command::Paper { cycles, seed } => run_paper(config, cycles, seed),
        Command::Reset => run_reset(&config),
        Command::Deposit { amount } => run_deposit(config, amount),
        Command::Withdraw { amount } => run_withdraw(config, amount),
        Command::History { limit, agent, csv } => {
            run_history(config, limit, agent.as_deref(), csv.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(err: &TreasuryError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Read the INI file (or nothing) and assemble a validated configuration.
pub fn load_config(path: Option<&Path>) -> Result<TreasuryConfig, TreasuryError> {
    let adapter = match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p).map_err(|e| TreasuryError::ConfigParse {
                file: p.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };
    let config = build_treasury_config(&adapter)?;
    validate_treasury_config(&config)?;
    Ok(config)
}

fn non_negative_int(adapter: &dyn ConfigPort, section: &str, key: &str, default: u64) -> Result<u64, TreasuryError> {
    let value = adapter.get_int(section, key, default as i64);
    u64::try_from(value).map_err(|_| TreasuryError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{} must be non-negative, got {}", key, value),
    })
}

/// Map INI sections onto [`TreasuryConfig`], falling back to the defaults
/// for every absent key.
pub fn build_treasury_config(adapter: &dyn ConfigPort) -> Result<TreasuryConfig, TreasuryError> {
    let d = TreasuryConfig::default();

    let path = |key: &str, default: &PathBuf| {
        adapter
            .get_string("treasury", key)
            .map(PathBuf::from)
            .unwrap_or_else(|| default.clone())
    };
    let paths = StatePaths {
        treasury_file: path("state_file", &d.paths.treasury_file),
        learnings_file: path("learnings_file", &d.paths.learnings_file),
        pulse_file: path("pulse_file", &d.paths.pulse_file),
    };

    let allocation = AllocationPolicy {
        polymarket_pct: adapter.get_double("allocation", "polymarket_pct", d.allocation.polymarket_pct),
        base_meme_pct: adapter.get_double("allocation", "base_meme_pct", d.allocation.base_meme_pct),
        bluechip_pct: adapter.get_double("allocation", "bluechip_pct", d.allocation.bluechip_pct),
        treasury_reserve_pct: adapter.get_double(
            "allocation",
            "treasury_reserve_pct",
            d.allocation.treasury_reserve_pct,
        ),
        savings_staking_pct: adapter.get_double(
            "allocation",
            "savings_staking_pct",
            d.allocation.savings_staking_pct,
        ),
        emergency_fund_pct: adapter.get_double(
            "allocation",
            "emergency_fund_pct",
            d.allocation.emergency_fund_pct,
        ),
        performance_weight: adapter.get_double(
            "allocation",
            "performance_weight",
            d.allocation.performance_weight,
        ),
    };

    let risk = RiskLimits {
        daily_loss_limit: adapter.get_double("risk", "daily_loss_limit", d.risk.daily_loss_limit),
        drawdown_pause_pct: adapter.get_double("risk", "drawdown_pause_pct", d.risk.drawdown_pause_pct),
        max_trade: adapter.get_double("risk", "max_trade", d.risk.max_trade),
        blessing_max_trade: adapter.get_double("risk", "blessing_max_trade", d.risk.blessing_max_trade),
    };

    let blessing = BlessingRules {
        min_confidence: adapter.get_double("blessing", "min_confidence", d.blessing.min_confidence),
        min_momentum: adapter.get_double("blessing", "min_momentum", d.blessing.min_momentum),
        min_volume_ratio: adapter.get_double("blessing", "min_volume_ratio", d.blessing.min_volume_ratio),
        max_spread: adapter.get_double("blessing", "max_spread", d.blessing.max_spread),
        min_signals: non_negative_int(adapter, "blessing", "min_signals", d.blessing.min_signals as u64)?
            as usize,
    };

    let distribution = DistributionPolicy {
        reinvest_pct: adapter.get_double("distribution", "reinvest_pct", d.distribution.reinvest_pct),
        treasury_pct: adapter.get_double("distribution", "treasury_pct", d.distribution.treasury_pct),
        savings_pct: adapter.get_double("distribution", "savings_pct", d.distribution.savings_pct),
        bluechip_pct: adapter.get_double("distribution", "bluechip_pct", d.distribution.bluechip_pct),
        double_credit: adapter.get_bool("distribution", "double_credit", d.distribution.double_credit),
    };

    let harvest = HarvestPolicy {
        min_reserve_pct: adapter.get_double("harvest", "min_reserve_pct", d.harvest.min_reserve_pct),
        min_harvest: adapter.get_double("harvest", "min_harvest", d.harvest.min_harvest),
    };

    let members = match adapter.get_string("paper", "members") {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => d.paper.members.clone(),
    };
    let seed = match adapter.get_string("paper", "seed") {
        Some(s) => Some(s.trim().parse::<u64>().map_err(|_| TreasuryError::ConfigInvalid {
            section: "paper".into(),
            key: "seed".into(),
            reason: format!("seed must be an unsigned integer, got {:?}", s),
        })?),
        None => None,
    };
    let paper = PaperSettings {
        cycle_interval_secs: non_negative_int(
            adapter,
            "paper",
            "cycle_interval_secs",
            d.paper.cycle_interval_secs,
        )?,
        members,
        seed,
    };

    Ok(TreasuryConfig {
        initial_capital: adapter.get_double("treasury", "initial_capital", d.initial_capital),
        history_limit: non_negative_int(adapter, "treasury", "history_limit", d.history_limit as u64)? as usize,
        paths,
        allocation,
        risk,
        blessing,
        distribution,
        harvest,
        paper,
    })
}

fn open_treasury(config: TreasuryConfig) -> Result<FileTreasury, TreasuryError> {
    let store = JsonStateAdapter::from_paths(&config.paths);
    Treasury::open(config, store, SystemClock)
}

fn pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

fn run_status(config: TreasuryConfig) -> Result<(), TreasuryError> {
    let mut treasury = open_treasury(config)?;
    let risk = treasury.risk_status();
    let state = treasury.state();
    let b = &state.balances;

    println!("Treasury: ${:.2}", b.total);
    for bucket in Bucket::ALLOCATED {
        let value = b.get(bucket);
        let share = if b.total > 0.0 { value / b.total } else { 0.0 };
        println!("  {:<22} ${:>10.2}  {:>6}", bucket.to_string(), value, pct(share));
    }
    if b.drift().abs() > 0.005 {
        println!("  (buckets differ from total by ${:+.2})", b.drift());
    }

    let s = treasury.summary();
    println!();
    println!(
        "P&L: today {:+.2}  week {:+.2}  all-time {:+.2}",
        s.daily_pnl, s.weekly_pnl, s.total_pnl
    );
    println!("Trades: {} (win rate {})", s.trades, pct(s.win_rate));
    if let Some(best) = &state.performance.best_trade {
        println!("Best:  {:+.2} on {}", best.pnl, best.market);
    }
    if let Some(worst) = &state.performance.worst_trade {
        println!("Worst: {:+.2} on {}", worst.pnl, worst.market);
    }
    match risk.reason() {
        Some(reason) => println!("Risk: PAUSED ({})", reason),
        None => println!("Risk: clear"),
    }

    println!();
    println!("Agents:");
    for agent in Agent::ALL {
        let stats = state.agent_stats(agent);
        println!(
            "  {:<12} trades {:>4}  pnl {:>+9.2}  win rate {:>6}",
            agent.to_string(),
            stats.trades,
            stats.pnl,
            pct(stats.win_rate)
        );
    }
    Ok(())
}

fn run_allocate(config: TreasuryConfig) -> Result<(), TreasuryError> {
    let mut treasury = open_treasury(config)?;
    let balances = treasury.allocate()?.clone();
    println!("Allocated ${:.2}:", balances.total);
    for bucket in Bucket::ALLOCATED {
        println!("  {:<22} ${:>10.2}", bucket.to_string(), balances.get(bucket));
    }
    Ok(())
}

fn run_harvest(config: TreasuryConfig) -> Result<(), TreasuryError> {
    let mut treasury = open_treasury(config)?;
    let moved = treasury.harvest()?;
    if moved > 0.0 {
        println!("Harvested ${:.2} from treasury reserve into savings.", moved);
    } else {
        println!("Nothing to harvest.");
    }
    Ok(())
}

fn run_learnings(config: TreasuryConfig) -> Result<(), TreasuryError> {
    let treasury = open_treasury(config)?;
    let view = serde_json::json!({
        "shared": treasury.shared_learnings(),
        "markets": treasury.learnings().markets,
        "totalDecisions": treasury.learnings().collaboration.total_decisions,
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn run_reset(config: &TreasuryConfig) -> Result<(), TreasuryError> {
    let store = JsonStateAdapter::from_paths(&config.paths);
    store.reset()?;
    warn!(
        treasury = %store.treasury_file().display(),
        learnings = %store.learnings_file().display(),
        "state reset"
    );
    println!("Treasury and learnings state removed.");
    Ok(())
}

fn run_deposit(config: TreasuryConfig, amount: f64) -> Result<(), TreasuryError> {
    let mut treasury = open_treasury(config)?;
    let total = treasury.deposit(amount)?;
    println!("Deposited ${:.2}. Total: ${:.2}", amount, total);
    Ok(())
}

fn run_withdraw(config: TreasuryConfig, amount: f64) -> Result<(), TreasuryError> {
    let mut treasury = open_treasury(config)?;
    let total = treasury.withdraw(amount)?;
    println!("Withdrew ${:.2}. Total: ${:.2}", amount, total);
    Ok(())
}

/// Newest-last slice of the history, optionally filtered by agent and
/// truncated to the last `limit` entries.
pub fn select_history(history: &[HistoryEntry], agent: Option<Agent>, limit: Option<usize>) -> Vec<HistoryEntry> {
    let filtered: Vec<&HistoryEntry> = history
        .iter()
        .filter(|e| agent.is_none() || e.agent == agent)
        .collect();
    let skip = limit.map_or(0, |n| filtered.len().saturating_sub(n));
    filtered.into_iter().skip(skip).cloned().collect()
}

fn run_history(
    config: TreasuryConfig,
    limit: Option<usize>,
    agent: Option<&str>,
    csv: Option<&Path>,
) -> Result<(), TreasuryError> {
    let agent = agent.map(str::parse::<Agent>).transpose()?;
    let treasury = open_treasury(config)?;
    let entries = select_history(&treasury.state().history, agent, limit);

    if let Some(path) = csv {
        let rows = csv_history_adapter::export_history(path, &entries)?;
        println!("Wrote {} entries to {}", rows, path.display());
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history.");
    }
    for e in &entries {
        println!(
            "{}  {:<10} {:<12} {:>+10.2}  bal ${:>10.2}  {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.kind.as_str(),
            e.agent.map(|a| a.to_string()).unwrap_or_default(),
            e.amount,
            e.balance,
            e.market.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn print_cycle(report: &CycleReport) {
    for outcome in &report.outcomes {
        match outcome {
            AgentOutcome::NoOpportunity { agent } => {
                println!("[{}] {}: no opportunity", report.cycle, agent)
            }
            AgentOutcome::Held { agent, market } => {
                println!("[{}] {}: HOLD on {}", report.cycle, agent, market)
            }
            AgentOutcome::Blocked { agent, market, reason } => {
                println!("[{}] {}: skipped {} ({})", report.cycle, agent, market, reason)
            }
            AgentOutcome::Traded {
                agent,
                market,
                blessing,
                size,
                settlement,
            } => println!(
                "[{}] {}: {} ${:.2} on {}{} -> {}, total ${:.2}",
                report.cycle,
                agent,
                if settlement.is_win { "WIN" } else { "LOSS" },
                size,
                market,
                if *blessing { " (blessed)" } else { "" },
                settlement
                    .distribution
                    .as_ref()
                    .map_or_else(|| "no distribution".to_string(), |d| format!("distributed ${:.2}", d.total())),
                settlement.new_total
            ),
            AgentOutcome::Failed { agent, error } => {
                println!("[{}] {}: failed ({})", report.cycle, agent, error)
            }
        }
    }
}

fn run_paper(config: TreasuryConfig, cycles: Option<u64>, seed: Option<u64>) -> Result<(), TreasuryError> {
    let seed = seed.or(config.paper.seed);
    let interval = Duration::from_secs(config.paper.cycle_interval_secs);
    let members = config.paper.members.clone();
    let pulse = PulseFileAdapter::new(config.paths.pulse_file.clone());

    let mut treasury = open_treasury(config)?;
    let mut desk = TradingDesk::new(
        Box::new(PaperScanner::new(seed)),
        Box::new(PaperDecisionMaker::new(members, seed.map(|s| s.wrapping_add(1)))),
        Box::new(PaperExecutor::new(seed.map(|s| s.wrapping_add(2)))),
        Box::new(pulse),
    );

    let running = Arc::new(AtomicBool::new(true));
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let flag = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current cycle");
                flag.store(false, Ordering::SeqCst);
            }
        });

        info!(?seed, interval_secs = interval.as_secs(), "paper trading started");
        while running.load(Ordering::SeqCst) {
            let report = desk.run_cycle(&mut treasury)?;
            print_cycle(&report);

            if cycles.is_some_and(|n| desk.cycle() >= n) || !running.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => running.store(false, Ordering::SeqCst),
            }
        }
        Ok::<(), TreasuryError>(())
    })?;

    let s = treasury.summary();
    println!(
        "Stopped after {} cycles. Total ${:.2}, all-time P&L {:+.2}, {} trades, win rate {}",
        desk.cycle(),
        s.total,
        s.total_pnl,
        s.trades,
        pct(s.win_rate)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::HistoryKind;
    use chrono::{TimeZone, Utc};

    fn entry(kind: HistoryKind, agent: Option<Agent>, amount: f64) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap(),
            kind,
            agent,
            market: None,
            amount,
            balance: 300.0,
        }
    }

    fn history() -> Vec<HistoryEntry> {
        vec![
            entry(HistoryKind::Allocation, None, 300.0),
            entry(HistoryKind::Trade, Some(Agent::Polymarket), 1.0),
            entry(HistoryKind::Trade, Some(Agent::BaseMeme), 2.0),
            entry(HistoryKind::Trade, Some(Agent::Polymarket), 3.0),
        ]
    }

    #[test]
    fn select_history_keeps_newest() {
        let picked = select_history(&history(), None, Some(2));
        let amounts: Vec<f64> = picked.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![2.0, 3.0]);
    }

    #[test]
    fn select_history_filters_agent() {
        let picked = select_history(&history(), Some(Agent::Polymarket), None);
        let amounts: Vec<f64> = picked.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![1.0, 3.0]);
    }

    #[test]
    fn select_history_limit_larger_than_history() {
        assert_eq!(select_history(&history(), None, Some(50)).len(), 4);
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "swarmtreasury",
            "paper",
            "--cycles",
            "3",
            "--seed",
            "42",
            "--config",
            "treasury.ini",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("treasury.ini")));
        assert_eq!(cli.log_level, "info");
        assert!(matches!(
            cli.command,
            Command::Paper {
                cycles: Some(3),
                seed: Some(42)
            }
        ));
    }

    #[test]
    fn cli_parses_amounts() {
        let cli = Cli::try_parse_from(["swarmtreasury", "withdraw", "12.5"]).unwrap();
        assert!(matches!(cli.command, Command::Withdraw { amount } if amount == 12.5));
    }
}
