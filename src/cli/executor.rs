//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateAction, MigrateCommandHandler, ServeCommandHandler, Storage};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Runs the command selected on the command line, defaulting to `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.subcommand() {
        Commands::Serve {
            dry_run, in_memory, ..
        } => {
            ServeCommandHandler::new(settings, Storage::from_flag(in_memory))
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings.database)
                .execute(MigrateAction::from_flags(dry_run, rollback))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run_dispatch() {
        let cli = Cli::try_parse_from(["product-crud-rs", "serve", "--dry-run", "--in-memory"])
            .unwrap();
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/products".to_string();

        assert!(execute_command(&cli, settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_migrate_dispatch_validates_database() {
        let cli = Cli::try_parse_from(["product-crud-rs", "migrate"]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_err());
    }
}
