//! Serve command handler

use crate::config::Settings;
use crate::error::AppResult;
pub use crate::server::Storage;
use crate::server::Server;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    storage: Storage,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, storage: Storage) -> Self {
        Self { config, storage }
    }

    /// Runs the server until shutdown, or only validates when `dry_run`.
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        self.config.validate()?;

        if dry_run {
            self.print_summary();
            return Ok(());
        }

        Server::new(self.config, self.storage).run().await?;
        Ok(())
    }

    fn print_summary(&self) {
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        match self.storage {
            Storage::Postgres => println!(
                "✓ Products stored in PostgreSQL (pool {}..{} connections)",
                self.config.database.min_connections, self.config.database.max_connections
            ),
            Storage::InMemory => println!("✓ Products stored in memory"),
        }
        println!("✓ Log level: {}", self.config.logger.level);
        println!("Dry run completed successfully");
    }
}
