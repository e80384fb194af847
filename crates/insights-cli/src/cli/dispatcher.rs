use crate::cli::command_handlers::{
    AccountsHandler, AnalyticsHandler, ConfigHandler, IngestHandler, LoginHandler, SummaryHandler,
};
use crate::cli::explore::ExploreHandler;
use crate::cli::main_types::Commands;
use insights_core::api::client::InsightsClient;
use insights_core::core::services::config_service::ConfigService;
use insights_core::error::{AppError, CliError, ConfigError};
use insights_core::storage::config::Config;
use insights_core::storage::credentials::resolve_token;
use insights_core::utils::logging::print_verbose;
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    verbose: bool,
    url: Option<String>,
    token: Option<String>,
}

impl Dispatcher {
    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
        url: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            config,
            config_path,
            verbose,
            url,
            token,
        }
    }

    // CLI argument > INSIGHTS_URL > config file
    fn get_url(&self) -> Result<String, AppError> {
        self.url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| self.config.get_url())
            .ok_or_else(|| {
                ConfigError::MissingField {
                    field: "url".to_string(),
                    hint: "Use 'insights config set --url <url>', --url, or set INSIGHTS_URL"
                        .to_string(),
                }
                .into()
            })
    }

    fn create_client(&self) -> Result<InsightsClient, AppError> {
        let url = self.get_url()?;
        self.log_verbose(&format!("Using server {}", url));
        Ok(InsightsClient::new(url)?)
    }

    fn create_authenticated_client(&self) -> Result<InsightsClient, AppError> {
        let url = self.get_url()?;
        let token = resolve_token(self.token.as_deref()).ok_or_else(|| CliError::AuthRequired {
            message: "No access token available".to_string(),
            hint: "Run 'insights login --email <email>' and export INSIGHTS_TOKEN".to_string(),
        })?;
        self.log_verbose(&format!("Using server {} with bearer token", url));
        Ok(InsightsClient::with_token(url, token)?)
    }

    fn create_config_service(&self) -> ConfigService {
        ConfigService::new(self.config.clone(), self.config_path.clone())
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Config { command } => {
                let handler = ConfigHandler::new();
                let mut config_service = self.create_config_service();
                // show and set work without a token
                let client = self.create_authenticated_client().ok();
                handler
                    .handle(
                        command,
                        &mut config_service,
                        client,
                        self.url.clone(),
                        self.verbose,
                    )
                    .await
            }
            Commands::Login { email } => {
                let client = self.create_client()?;
                LoginHandler::new().handle(&email, client, self.verbose).await
            }
            Commands::Accounts(args) => {
                let client = self.create_authenticated_client()?;
                AccountsHandler::new()
                    .handle(args, &self.config, client, self.verbose)
                    .await
            }
            Commands::Explore(args) => {
                let client = self.create_authenticated_client()?;
                ExploreHandler::new()
                    .handle(args, &self.config, client, self.verbose)
                    .await
            }
            Commands::Summary { audience, format } => {
                let client = self.create_authenticated_client()?;
                SummaryHandler::new()
                    .handle(audience, format, client, self.verbose)
                    .await
            }
            Commands::Analytics { limit, format } => {
                let client = self.create_authenticated_client()?;
                let limit = limit.unwrap_or(self.config.top_workflows_limit);
                AnalyticsHandler::new()
                    .handle(limit, format, client, self.verbose)
                    .await
            }
            Commands::Ingest { command } => {
                let client = self.create_authenticated_client()?;
                IngestHandler::new().handle(command, client, self.verbose).await
            }
        }
    }
}
