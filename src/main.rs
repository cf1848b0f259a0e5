//! transfer_console - line-oriented front end for the transfer controller
//!
//! ```text
//! stdin ──▶ command ──▶ TransferController ──▶ AccountsApi (HTTP | mock)
//!                             │
//!                             └──▶ ConsoleView ──▶ stdout
//! ```
//!
//! Usage: `transfer_console [--env dev] [--mock]`

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use account_transfer::api::{AccountsApi, HttpAccountsApi};
use account_transfer::config::AppConfig;
use account_transfer::presentation::{ControllerEvent, PreviewSide, TransferView};
use account_transfer::transfer::{SubmitOutcome, TransferController};
use account_transfer::{AccountId, TransferMode};

const HELP: &str = "\
Commands:
  accounts              reload and list accounts
  from [id]             select source account (no id clears)
  to [id]               select destination account (no id clears)
  number <n>            destination account number (BY_NUMBER mode)
  amount <x>            amount, e.g. 25.50
  desc <text>           optional description
  mode [list|number]    toggle, or pick BY_ACCOUNT / BY_NUMBER
  submit                send the transfer
  help                  show this text
  quit                  exit";

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn use_mock_api() -> bool {
    std::env::args().any(|a| a == "--mock")
}

/// Renders controller events as plain text on stdout
struct ConsoleView;

impl TransferView for ConsoleView {
    fn notify(&self, event: &ControllerEvent) {
        match event {
            ControllerEvent::AccountsUpdated { options } => {
                println!("Accounts:");
                if options.is_empty() {
                    println!("  (none)");
                }
                for option in options {
                    println!("  [{}] {}", option.account_id, option.label);
                }
            }
            ControllerEvent::FormReset => println!("Form cleared."),
            ControllerEvent::PreviewChanged { side, preview } => {
                let title = match side {
                    PreviewSide::Source => "From",
                    PreviewSide::Destination => "To",
                };
                println!("{}:", title);
                for line in preview.render().lines() {
                    println!("  {}", line);
                }
            }
            ControllerEvent::ModeChanged { mode, gate } => {
                let destination = if gate.destination_number_enabled {
                    "account number (use `number`)"
                } else {
                    "account list (use `to`)"
                };
                println!("Mode: {} - destination from {}", mode, destination);
            }
            ControllerEvent::Submitted { confirmation, .. } => println!("{}", confirmation),
            other => {
                if let Some(message) = other.error_message() {
                    println!("Error: {}", message);
                }
            }
        }
    }
}

fn selection(arg: &str) -> Option<AccountId> {
    if arg.is_empty() {
        None
    } else {
        Some(AccountId::from(arg))
    }
}

#[cfg(feature = "mock-api")]
fn demo_api() -> Option<Arc<dyn AccountsApi>> {
    use account_transfer::Account;
    use account_transfer::api::MockAccountsApi;
    use rust_decimal::Decimal;

    Some(Arc::new(MockAccountsApi::with_accounts(vec![
        Account::new("A", "1001", "checking", Decimal::new(125_050, 2)),
        Account::new("B", "1002", "savings", Decimal::new(500_000, 2)),
        Account::new("C", "1003", "investment", Decimal::new(1_000, 2)),
    ])))
}

#[cfg(not(feature = "mock-api"))]
fn demo_api() -> Option<Arc<dyn AccountsApi>> {
    tracing::warn!("--mock ignored: built without the mock-api feature");
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config =
        AppConfig::load(&env).with_context(|| format!("loading configuration for env '{}'", env))?;
    let _log_guard = account_transfer::logging::init_logging(&app_config);

    let api: Arc<dyn AccountsApi> = match use_mock_api().then(demo_api).flatten() {
        Some(api) => api,
        None => {
            let http = HttpAccountsApi::new(&app_config.api).context("building HTTP client")?;
            tracing::info!(base_url = http.base_url(), "Using accounts service");
            Arc::new(http)
        }
    };

    tracing::info!(
        env = %env,
        api = api.name(),
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        "Starting transfer console"
    );
    println!(
        "=== Account Transfer v{} ({}) [{} api] ===",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        api.name()
    );

    let controller = Arc::new(TransferController::new(
        api,
        Arc::new(ConsoleView),
        app_config.transfer.clone(),
    ));
    // Failure is already on screen; `accounts` retries
    let _ = controller.load_accounts().await;
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "accounts" => {
                let _ = controller.load_accounts().await;
            }
            "from" => controller.select_source(selection(arg)),
            "to" => {
                if controller.mode() == TransferMode::ByNumber {
                    println!("Destination list is disabled in BY_NUMBER mode; use `number`.");
                } else {
                    controller.select_destination(selection(arg));
                }
            }
            "number" => {
                if controller.mode() == TransferMode::ByAccount {
                    println!("Account number entry is disabled in BY_ACCOUNT mode; use `mode`.");
                } else {
                    controller.set_destination_number(arg);
                }
            }
            "amount" => controller.set_amount(arg),
            "desc" => controller.set_description(arg),
            "mode" => match arg {
                "" => {
                    controller.toggle_mode();
                }
                "list" => controller.set_mode(TransferMode::ByAccount),
                "number" => controller.set_mode(TransferMode::ByNumber),
                other => println!("Unknown mode `{}`; use `list` or `number`.", other),
            },
            "submit" => {
                // Runs in the background so the prompt stays live while in flight
                let controller = controller.clone();
                tokio::spawn(async move {
                    if let SubmitOutcome::Busy = controller.submit().await {
                        println!("A transfer is already in progress.");
                    }
                });
                tokio::task::yield_now().await;
            }
            "help" => println!("{}", HELP),
            "quit" | "exit" => break,
            other => println!("Unknown command `{}`. Type `help`.", other),
        }
    }

    tracing::info!("Transfer console exiting");
    Ok(())
}
