//! Interactive accounts explorer.
//!
//! Reads one command per line from stdin and feeds it to an
//! [`AccountsExplorer`]. Text filters are debounced by the explorer itself, so
//! several `search` lines typed in quick succession produce a single request.

use crate::cli::main_types::ExploreArgs;
use insights_core::api::client::InsightsClient;
use insights_core::api::models::AccountsPage;
use insights_core::core::explorer::{AccountsExplorer, ExplorerEvent, ExplorerOptions};
use insights_core::core::query::{PageSize, ResultState, Settlement, SortDirection, StatusFilter};
use insights_core::display::TableDisplay;
use insights_core::error::AppError;
use insights_core::storage::config::Config;
use insights_core::utils::error_helpers::convert_io_to_display_error;
use insights_core::utils::logging::{log_warning, print_verbose};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  search <text>              Free-text search (empty clears)
  account <uuid>             Filter by account identifier
  workflow <title>           Filter by workflow title
  status <active|inactive|all>
  sort <column> [asc|desc|none]
  page <number> [size]       Jump to a page, optionally changing the page size
  clear                      Reset every filter
  reload                     Re-run the current query
  help                       Show this help
  quit                       Leave the explorer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Search(String),
    Account(String),
    Workflow(String),
    Status(StatusFilter),
    /// `direction` is `None` when the sort was switched off
    Sort {
        column: String,
        direction: Option<SortDirection>,
    },
    Page { number: u32, size: Option<u32> },
    Clear,
    Reload,
    Help,
    Quit,
}

/// Parse one console line. Blank lines are rejected with an empty message.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_lowercase().as_str() {
        "" => Err(String::new()),
        "search" | "s" => Ok(ConsoleCommand::Search(rest.to_string())),
        "account" | "a" => Ok(ConsoleCommand::Account(rest.to_string())),
        "workflow" | "w" => Ok(ConsoleCommand::Workflow(rest.to_string())),
        "status" => rest.parse().map(ConsoleCommand::Status),
        "sort" => {
            let mut parts = rest.split_whitespace();
            let column = parts
                .next()
                .ok_or_else(|| "Usage: sort <column> [asc|desc|none]".to_string())?;
            let direction = match parts.next() {
                None => Some(SortDirection::Ascending),
                Some(dir) if dir.eq_ignore_ascii_case("none") => None,
                Some(dir) => Some(
                    SortDirection::parse_gesture(dir)
                        .ok_or_else(|| format!("Unknown sort direction '{}'", dir))?,
                ),
            };
            Ok(ConsoleCommand::Sort {
                column: column.to_string(),
                direction,
            })
        }
        "page" | "p" => {
            let mut parts = rest.split_whitespace();
            let number = parts
                .next()
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n >= 1)
                .ok_or_else(|| "Usage: page <number> [size]".to_string())?;
            let size = match parts.next() {
                Some(size) => Some(
                    size.parse::<u32>()
                        .map_err(|_| format!("Invalid page size '{}'", size))?,
                ),
                None => None,
            };
            Ok(ConsoleCommand::Page { number, size })
        }
        "clear" => Ok(ConsoleCommand::Clear),
        "reload" | "r" => Ok(ConsoleCommand::Reload),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
    }
}

#[derive(Default)]
pub struct ExploreHandler;

impl ExploreHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: ExploreArgs,
        config: &Config,
        client: InsightsClient,
        verbose: bool,
    ) -> Result<(), AppError> {
        let options = ExplorerOptions {
            quiet_period: config.debounce(),
            page_size: args
                .page_size
                .and_then(PageSize::new)
                .unwrap_or(config.page_size),
            deep_link_account: args.account,
        };
        print_verbose(
            verbose,
            &format!(
                "Explorer quiet period {} ms, page size {}",
                options.quiet_period.as_millis(),
                options.page_size
            ),
        );

        let interactive = atty::is(atty::Stream::Stdin);
        let display = TableDisplay::new().with_colors(atty::is(atty::Stream::Stdout));
        let mut explorer = AccountsExplorer::new(Arc::new(client), options);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        if interactive {
            println!("{}\n", HELP);
        }
        explorer.start();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line
                        .map_err(|e| convert_io_to_display_error(e, "Could not read input"))?
                    else {
                        break;
                    };

                    match parse_command(&line) {
                        Ok(ConsoleCommand::Quit) => break,
                        Ok(command) => apply(&mut explorer, command),
                        Err(message) if message.is_empty() => {}
                        Err(message) => log_warning(&message),
                    }
                    if interactive {
                        prompt();
                    }
                }
                event = explorer.next_event() => {
                    match event {
                        ExplorerEvent::Dispatched(id) => log::debug!("Debounced request {}", id),
                        ExplorerEvent::Settled { settlement: Settlement::Applied, .. } => {
                            render(&display, &explorer.state());
                            if interactive {
                                prompt();
                            }
                        }
                        ExplorerEvent::Settled { id, settlement: Settlement::Discarded } => {
                            log::debug!("Dropped stale response {}", id);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn apply(explorer: &mut AccountsExplorer<InsightsClient>, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Search(text) => explorer.set_search(&text),
        ConsoleCommand::Account(uuid) => explorer.set_identifier_filter(&uuid),
        ConsoleCommand::Workflow(title) => explorer.set_workflow_filter(&title),
        ConsoleCommand::Status(status) => {
            if explorer.set_status_filter(status).is_none() {
                println!("Status is already {}", status);
            }
        }
        ConsoleCommand::Sort { column, direction } => {
            if explorer.on_sort(&column, direction).is_none() {
                println!("Sort unchanged");
            }
        }
        ConsoleCommand::Page { number, size } => {
            let size = size.unwrap_or_else(|| explorer.cursor().page_size.get());
            explorer.on_page_change(number - 1, size);
        }
        ConsoleCommand::Clear => {
            explorer.clear_filters();
        }
        ConsoleCommand::Reload => {
            explorer.reload();
        }
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit => {}
    }
}

fn render(display: &TableDisplay, state: &ResultState<AccountsPage>) {
    if let Some(error) = &state.error {
        eprintln!("❌ {}", error);
    }
    if let Some(page) = &state.data {
        println!("{}", display.render_accounts_page(page));
    }
}

fn prompt() {
    print!("explore> ");
    let _ = std::io::stdout().flush();
}
