//! hq - Family HQ dashboard.
//!
//! Records chores, pocket money, fines and vault savings for a household
//! and shows whose turn it is this week.

use std::{path::PathBuf, process::ExitCode, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use hq_core::{
    config::HouseholdConfig,
    household::{Action, ActionError, Household, Plan},
    ledger::{Amount, Transaction, TransactionKind, TransactionProcessor},
    store::{CachedStore, WorkbookStore},
    view::{recent_history, vault_lines, Dashboard},
    HqError,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod render;

use render::Session;

/// hq - Family HQ dashboard
#[derive(Parser, Debug)]
#[command(name = "hq")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to household configuration file
    #[arg(short, long, default_value = "hq.toml")]
    config: PathBuf,

    /// Workbook directory (overrides [store].dir)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Active user
    #[arg(long = "as", value_name = "USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the workbook with the configured roster
    Init,

    /// Show the active user's dashboard
    Status,

    /// Run a dashboard action as the active user
    Do {
        /// kitchen, bathroom, pot, bedroom, living-room, pay or fine
        action: String,
    },

    /// Lock cash into the active user's vault
    Deposit { amount: Amount },

    /// Record a raw transaction for any user
    Record {
        user: String,
        action: String,
        #[arg(allow_hyphen_values = true)]
        value: Amount,
        #[arg(long, value_enum, default_value_t = KindArg::Earn)]
        kind: KindArg,
    },

    /// Show vault savings against goals
    Vault,

    /// Show the most recent history records
    History {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Show the duty rotation for a date (default today)
    Week {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Earn,
    Vault,
    Fine,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Earn => TransactionKind::EarnOrSpend,
            KindArg::Vault => TransactionKind::VaultDeposit,
            KindArg::Fine => TransactionKind::Fine,
        }
    }
}

//==================== context ====================//

struct App {
    config: HouseholdConfig,
    household: Household,
    workbook: WorkbookStore,
    processor: TransactionProcessor<CachedStore<WorkbookStore>>,
    session: Session,
    today: NaiveDate,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let config = HouseholdConfig::from_file_or_default(&cli.config)
            .map_err(HqError::from)
            .with_context(|| format!("loading {}", cli.config.display()))?;
        let household = config.to_household();
        let active = cli
            .user
            .clone()
            .unwrap_or_else(|| config.household.default_user.clone());
        if household.role_of(&active).is_none() {
            return Err(HqError::from(ActionError::NotAMember { user: active }).into());
        }
        let dir = cli.store.clone().unwrap_or_else(|| config.store.dir.clone());
        let workbook = WorkbookStore::with_tables(
            dir,
            config.store.balances_table.clone(),
            config.store.history_table.clone(),
        );
        Ok(Self {
            processor: TransactionProcessor::new(CachedStore::new(workbook.clone())),
            workbook,
            household,
            config,
            session: Session::new(active),
            today: Local::now().date_naive(),
        })
    }

    fn pause(&self) {
        let delay = self.config.dashboard.confirm_delay_ms;
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
    }
}

//==================== commands ====================//

fn init_cmd(app: &App) -> Result<()> {
    app.workbook
        .initialise(&app.household.initial_rows())
        .map_err(HqError::from)?;
    println!("Workbook initialised → {}", app.workbook.root().display());
    Ok(())
}

fn status_cmd(app: &mut App) -> Result<()> {
    let ledger = app.processor.load()?;
    let dash = Dashboard::build(&app.household, &ledger, &app.session.active, app.today)?;
    print!("{}", render::dashboard(&dash));
    Ok(())
}

fn run_action(app: &mut App, action: Action) -> Result<()> {
    let ledger = app.processor.load()?;
    let week = app.household.week(app.today);
    let plan = app
        .household
        .plan(&app.session.active, action, &week, &ledger)?;
    match plan {
        Plan::Record(txn) => {
            let receipt = app.processor.process(&txn)?;
            println!("{}", render::acknowledgment(&receipt));
        }
        Plan::SpendPot(amount) => {
            let remaining = app.processor.spend_pot(amount)?;
            println!("🍕 Pot spent £{amount}, £{remaining} left");
        }
    }
    app.pause();
    status_cmd(app)
}

fn do_cmd(app: &mut App, name: &str) -> Result<()> {
    let action: Action = name.parse().map_err(HqError::from)?;
    run_action(app, action)
}

fn record_cmd(app: &mut App, txn: Transaction) -> Result<()> {
    let receipt = app.processor.process(&txn)?;
    info!(user = %txn.user, "recorded from command line");
    println!("{}", render::acknowledgment(&receipt));
    Ok(())
}

fn vault_cmd(app: &mut App) -> Result<()> {
    let ledger = app.processor.load()?;
    let lines = vault_lines(&ledger, &app.household).map_err(HqError::from)?;
    print!(
        "{}",
        render::vault(&lines, &app.session, app.household.deposit_range())
    );
    Ok(())
}

fn history_cmd(app: &mut App, limit: Option<usize>, json: bool) -> Result<()> {
    let ledger = app.processor.load()?;
    let limit = limit.unwrap_or(app.config.dashboard.history_limit);
    let records = recent_history(&ledger, limit);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(records).context("encoding history")?
        );
    } else {
        print!("{}", render::history(records));
    }
    Ok(())
}

fn week_cmd(app: &App, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let info = app.household.week(date.unwrap_or(app.today));
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("encoding week")?
        );
    } else {
        print!("{}", render::week(&info));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut app = App::new(&cli)?;
    match cli.command {
        Commands::Init => init_cmd(&app),
        Commands::Status => status_cmd(&mut app),
        Commands::Do { action } => do_cmd(&mut app, &action),
        Commands::Deposit { amount } => run_action(&mut app, Action::VaultDeposit(amount)),
        Commands::Record {
            user,
            action,
            value,
            kind,
        } => record_cmd(&mut app, Transaction::new(user, action, value, kind.into())),
        Commands::Vault => vault_cmd(&mut app),
        Commands::History { limit, json } => history_cmd(&mut app, limit, json),
        Commands::Week { date, json } => week_cmd(&app, date, json),
    }
}

/// Maps a failed command to its exit status. Rejections that leave the
/// ledger untouched are warnings; an unreachable store blocks.
fn report(err: &anyhow::Error) -> u8 {
    if let Some(hq) = err.downcast_ref::<HqError>() {
        if hq.is_unreachable() {
            eprintln!("⚠️ Database connecting... please retry in 10s.");
            eprintln!("   {err:#}");
            return 2;
        }
        if hq.is_warning() {
            eprintln!("warning: {hq}");
            return 0;
        }
    }
    eprintln!("error: {err:#}");
    2
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(report(&err)),
    }
}

#[cfg(test)]
mod tests {
    use hq_core::ledger::{LedgerError, HOUSE_POT};
    use hq_core::store::{LedgerStore, StoreError};

    use super::*;

    fn app_in(dir: &std::path::Path, user: &str) -> App {
        let cli = Cli::try_parse_from([
            "hq",
            "--config",
            dir.join("hq.toml").to_str().unwrap(),
            "--store",
            dir.join("data").to_str().unwrap(),
            "--as",
            user,
            "status",
        ])
        .unwrap();
        std::fs::write(dir.join("hq.toml"), "[dashboard]\nconfirm_delay_ms = 0\n").unwrap();
        App::new(&cli).unwrap()
    }

    #[test]
    fn parses_negative_record_values() {
        let cli = Cli::try_parse_from(["hq", "record", "Noah", "Paid Cash", "-5"]).unwrap();
        match cli.command {
            Commands::Record {
                user, value, kind, ..
            } => {
                assert_eq!(user, "Noah");
                assert_eq!(value, -5);
                assert_eq!(kind, KindArg::Earn);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_kind_and_date_flags() {
        let cli =
            Cli::try_parse_from(["hq", "--as", "Eva", "record", "Eva", "Vault", "3", "--kind", "vault"])
                .unwrap();
        assert_eq!(cli.user.as_deref(), Some("Eva"));
        assert!(matches!(
            cli.command,
            Commands::Record {
                kind: KindArg::Vault,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["hq", "week", "--date", "2026-02-09"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Week {
                date: Some(d),
                json: false
            } if d == NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
        ));
        assert!(Cli::try_parse_from(["hq", "week", "--date", "next tuesday"]).is_err());
    }

    #[test]
    fn unknown_active_user_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("hq.toml");
        let cli = Cli::try_parse_from([
            "hq",
            "--config",
            config.to_str().unwrap(),
            "--as",
            "Mallory",
            "status",
        ])
        .unwrap();
        let err = App::new(&cli).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<HqError>(),
            Some(HqError::Action(ActionError::NotAMember { .. }))
        ));
    }

    #[test]
    fn uninitialised_store_reports_unreachable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path(), "Rob");
        let err = status_cmd(&mut app).unwrap_err();
        assert!(err.downcast_ref::<HqError>().unwrap().is_unreachable());
        assert_eq!(report(&err), 2);
    }

    #[test]
    fn child_actions_flow_through_to_the_workbook() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path(), "Noah");
        init_cmd(&app).unwrap();

        record_cmd(&mut app, Transaction::earn("Noah", "Birthday", 6)).unwrap();
        do_cmd(&mut app, "fine").unwrap();
        run_action(&mut app, Action::VaultDeposit(3)).unwrap();

        let mut store = app.workbook.clone();
        let rows = store.read_balances().unwrap();
        let noah = rows.iter().find(|r| r.user == "Noah").unwrap();
        let pot = rows.iter().find(|r| r.user == HOUSE_POT).unwrap();
        assert_eq!((noah.balance, noah.vault, noah.xp), (1, 3, 6));
        assert_eq!(pot.balance, 2);

        let history = store.read_history().unwrap().into_records();
        let msgs: Vec<_> = history.iter().map(|r| r.msg.as_str()).collect();
        assert_eq!(
            msgs,
            ["Noah: Saved to Vault", "Noah: Fined £2", "Noah: Birthday"]
        );
    }

    #[test]
    fn rejected_deposit_is_a_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path(), "Eva");
        init_cmd(&app).unwrap();

        let err = run_action(&mut app, Action::VaultDeposit(5)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HqError>(),
            Some(HqError::Ledger(LedgerError::InsufficientFunds { .. }))
        ));
        assert_eq!(report(&err), 0);

        let mut store = app.workbook.clone();
        assert!(store.read_history().unwrap().into_records().is_empty());
    }

    #[test]
    fn locked_and_off_duty_actions_are_warnings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_in(dir.path(), "Noah");
        init_cmd(&app).unwrap();
        // Week 1: Rob on duty, Eva has the living room.
        app.today = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();

        let err = do_cmd(&mut app, "living-room").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HqError>(),
            Some(HqError::Action(ActionError::Locked { .. }))
        ));
        assert_eq!(report(&err), 0);

        app.session = Session::new("Lauren");
        let err = do_cmd(&mut app, "kitchen").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HqError>(),
            Some(HqError::Action(ActionError::NotYourWeek))
        ));
        assert_eq!(report(&err), 0);

        let mut store = app.workbook.clone();
        assert!(store.read_history().unwrap().into_records().is_empty());
        let err = do_cmd(&mut app, "sweep").unwrap_err();
        assert_eq!(report(&err), 2);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = app_in(dir.path(), "Rob");
        init_cmd(&app).unwrap();
        let err = init_cmd(&app).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HqError>(),
            Some(HqError::Store(StoreError::AlreadyExists { .. }))
        ));
    }
}
