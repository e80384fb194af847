use crate::cli::main_types::{AccountsArgs, ConfigCommands, IngestCommands, OutputFormat};
use insights_core::api::client::InsightsClient;
use insights_core::api::models::{Audience, ErrorDetails};
use insights_core::core::query::{
    Cursor, FetchFailure, FilterInputs, PageSize, ResultState, SortDirection, SortOutcome, assemble,
};
use insights_core::core::services::config_service::ConfigService;
use insights_core::core::services::ingestion_service::IngestionService;
use insights_core::core::views::{AnalyticsView, DashboardView};
use insights_core::display::TableDisplay;
use insights_core::error::{AppError, CliError};
use insights_core::storage::config::Config;
use insights_core::storage::credentials::get_token;
use insights_core::utils::error_helpers::convert_json_error;
use insights_core::utils::logging::{log_warning, print_verbose};
use insights_core::utils::text::format_number;
use insights_core::utils::validation::{validate_email, validate_top_limit};
use serde::Serialize;
use std::sync::Arc;

fn table_display() -> TableDisplay {
    TableDisplay::new().with_colors(atty::is(atty::Stream::Stdout))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| convert_json_error(e, "stdout"))?;
    println!("{}", json);
    Ok(())
}

/// Turn a failed view load into the CLI's error type
pub fn failure_to_error(failure: FetchFailure) -> AppError {
    if failure.is_session_expired() {
        return CliError::AuthRequired {
            message: failure.message,
            hint: "Run 'insights login --email <email>' and export INSIGHTS_TOKEN".to_string(),
        }
        .into();
    }

    let message = match &failure.details {
        Some(ErrorDetails::CsvHeaders(report)) => format!(
            "{}\n  missing: {}\n  unexpected: {}",
            failure.message,
            report.missing.join(", "),
            report.extra.join(", ")
        ),
        Some(details) => format!("{} ({})", failure.message, details.summary()),
        None => failure.message,
    };
    CliError::RequestFailed { message }.into()
}

fn settled_data<T>(state: ResultState<T>) -> Result<T, AppError> {
    if let Some(failure) = state.failure {
        return Err(failure_to_error(failure));
    }
    state.data.ok_or_else(|| {
        CliError::RequestFailed {
            message: "No data received".to_string(),
        }
        .into()
    })
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        client: Option<InsightsClient>,
        url: Option<String>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                print_verbose(verbose, "Showing configuration");
                let config = config_service.config();

                println!("Current Configuration:");
                println!("=====================");
                match config_service.get_url() {
                    Some(url) => println!("URL: {}", url),
                    None => println!("URL: ❌ Not set"),
                }
                println!("Page size: {}", config.page_size);
                println!("Debounce: {} ms", config.debounce_ms);
                println!("Top workflows: {}", config.top_workflows_limit);
                if get_token().is_some() {
                    println!("Token: ✅ Set (INSIGHTS_TOKEN)");
                } else {
                    println!("Token: ❌ Not set");
                }
                Ok(())
            }
            ConfigCommands::Set {
                page_size,
                debounce_ms,
                top_workflows_limit,
            } => {
                let mut updated_fields = Vec::new();

                if let Some(url) = url {
                    config_service.set_url(url.clone())?;
                    updated_fields.push(format!("URL to: {}", url));
                }
                if let Some(size) = page_size.and_then(PageSize::new) {
                    config_service.config_mut().page_size = size;
                    updated_fields.push(format!("page size to: {}", size));
                }
                if let Some(ms) = debounce_ms {
                    config_service.config_mut().debounce_ms = ms;
                    updated_fields.push(format!("debounce to: {} ms", ms));
                }
                if let Some(limit) = top_workflows_limit {
                    config_service.config_mut().top_workflows_limit = limit;
                    updated_fields.push(format!("top workflows to: {}", limit));
                }

                if updated_fields.is_empty() {
                    return Err(CliError::InvalidArguments(
                        "No configuration values provided. Use --url, --page-size, --debounce-ms or --top-workflows-limit"
                            .to_string(),
                    )
                    .into());
                }

                config_service.config().validate()?;
                println!("✅ Set {}", updated_fields.join(", "));
                config_service.save_config()?;
                println!("Configuration saved successfully.");
                Ok(())
            }
            ConfigCommands::Validate => {
                print_verbose(verbose, "Validating configuration and connection");
                let url = config_service.validate()?;
                println!("✅ Configuration is valid ({})", url);

                let Some(client) = client else {
                    println!("❌ INSIGHTS_TOKEN is not set; skipping connection test.");
                    return Err(CliError::AuthRequired {
                        message: "No access token available".to_string(),
                        hint: "Run 'insights login --email <email>' and export INSIGHTS_TOKEN"
                            .to_string(),
                    }
                    .into());
                };

                let probe = Cursor::with_page_size(PageSize::new(5).unwrap_or_default());
                match client
                    .list_accounts(&assemble(&FilterInputs::default(), &probe))
                    .await
                {
                    Ok(page) => {
                        println!(
                            "✅ Connected: {} accounts available",
                            format_number(page.total_items)
                        );
                        Ok(())
                    }
                    Err(e) => {
                        println!("❌ Connection test failed: {}", e);
                        Err(e.into())
                    }
                }
            }
        }
    }
}

#[derive(Default)]
pub struct LoginHandler;

impl LoginHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        email: &str,
        client: InsightsClient,
        verbose: bool,
    ) -> Result<(), AppError> {
        validate_email(email)?;
        let password = rpassword::prompt_password("Password: ").map_err(|e| {
            CliError::InvalidArguments(format!("Could not read password: {}", e))
        })?;

        print_verbose(verbose, &format!("Requesting token for {}", email));
        let token = client.login(email, &password).await?;
        let expires_at = token.expires_at(chrono::Utc::now());

        println!("✅ Logged in as {}", token.email);
        println!("Token expires at {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
        println!("\nexport INSIGHTS_TOKEN={}", token.access_token);
        Ok(())
    }
}

#[derive(Default)]
pub struct AccountsHandler;

impl AccountsHandler {
    pub fn new() -> Self {
        Self
    }

    /// Same assembly and cursor rules as the explorer, applied once
    pub fn build_query(
        args: &AccountsArgs,
        config: &Config,
    ) -> insights_core::core::query::QueryParams {
        let filters = FilterInputs {
            account_uuid: args.account.clone().unwrap_or_default(),
            search: args.search.clone().unwrap_or_default(),
            workflow_title: args.workflow.clone().unwrap_or_default(),
            status: args.status,
        };

        let page_size = args
            .page_size
            .and_then(PageSize::new)
            .unwrap_or(config.page_size);
        let mut cursor = Cursor::with_page_size(page_size);
        cursor.navigate(args.page.saturating_sub(1), page_size.get());

        let direction = SortDirection::parse_gesture(&args.sort_dir);
        if let SortOutcome::Applied {
            field,
            fell_back: true,
        } = cursor.apply_sort(&args.sort_by, direction)
        {
            log_warning(&format!(
                "Column '{}' is not sortable, sorting by {}",
                args.sort_by, field
            ));
        }

        assemble(&filters, &cursor)
    }

    pub async fn handle(
        &self,
        args: AccountsArgs,
        config: &Config,
        client: InsightsClient,
        verbose: bool,
    ) -> Result<(), AppError> {
        let query = Self::build_query(&args, config);
        print_verbose(verbose, &format!("Query: {:?}", query.to_query_pairs()));

        let page = client.list_accounts(&query).await?;
        match args.format {
            OutputFormat::Json => print_json(&page),
            OutputFormat::Table => {
                println!("{}", table_display().render_accounts_page(&page));
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct SummaryHandler;

impl SummaryHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        audience: Audience,
        format: OutputFormat,
        client: InsightsClient,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(verbose, &format!("Loading {} summary", audience.as_str()));
        let mut view = DashboardView::new(Arc::new(client), audience);
        view.start();
        view.next_settlement().await;

        let summary = settled_data(view.state())?;
        match format {
            OutputFormat::Json => print_json(&summary),
            OutputFormat::Table => {
                println!("{}", table_display().render_summary(&summary));
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct AnalyticsHandler;

impl AnalyticsHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        limit: u32,
        format: OutputFormat,
        client: InsightsClient,
        verbose: bool,
    ) -> Result<(), AppError> {
        validate_top_limit(limit)?;
        print_verbose(verbose, "Loading analytics");
        let mut view = AnalyticsView::new(Arc::new(client), limit);
        view.load();
        view.next_settlement().await;
        let data = settled_data(view.state())?;

        match format {
            OutputFormat::Json => print_json(&data),
            OutputFormat::Table => {
                let display = table_display();
                println!(
                    "Accounts: {} | Messages: {} | Notifications: {} | Records: {}\n",
                    format_number(data.total_accounts()),
                    format_number(data.total_messages()),
                    format_number(data.total_notifications()),
                    format_number(data.total_records())
                );
                println!(
                    "{}\n",
                    display.render_chart("Subscriptions by status", &data.subscriptions_by_status)
                );
                println!(
                    "{}\n",
                    display.render_chart(
                        "Notifications sent vs billed",
                        &data.notifications_sent_vs_billed
                    )
                );
                println!(
                    "{}\n",
                    display.render_chart("Top workflows", &data.top_workflows)
                );
                println!("{}", display.render_usage_by_status(&data.usage_by_status));
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct IngestHandler;

impl IngestHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: IngestCommands,
        client: InsightsClient,
        verbose: bool,
    ) -> Result<(), AppError> {
        let service = IngestionService::new(&client);
        let result = match command {
            IngestCommands::Upload { file } => {
                print_verbose(verbose, &format!("Uploading {}", file.display()));
                service.upload(&file).await
            }
            IngestCommands::Reload => {
                print_verbose(verbose, "Reloading sample data");
                service.reload().await
            }
        };

        match result {
            Ok(result) => {
                println!(
                    "✅ Loaded {} records",
                    format_number(result.records_loaded)
                );
                Ok(())
            }
            Err(AppError::Api(error)) => {
                Err(failure_to_error(FetchFailure::from_api_error(&error, "data")))
            }
            Err(other) => Err(other),
        }
    }
}
