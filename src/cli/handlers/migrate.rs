//! Migrate command handler
//!
//! Diesel's migration harness is synchronous, so every operation opens a
//! dedicated `PgConnection` on a blocking thread.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;

use crate::config::DatabaseConfig;
use crate::db::MIGRATIONS;
use crate::error::{AppError, AppResult};

/// What `migrate` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Apply,
    Pending,
    Rollback(u32),
}

impl MigrateAction {
    pub fn from_flags(dry_run: bool, rollback: Option<u32>) -> Self {
        match (dry_run, rollback) {
            (true, _) => MigrateAction::Pending,
            (false, Some(steps)) => MigrateAction::Rollback(steps),
            (false, None) => MigrateAction::Apply,
        }
    }
}

/// Handler for the migrate command
pub struct MigrateCommandHandler {
    database: DatabaseConfig,
}

impl MigrateCommandHandler {
    pub fn new(database: DatabaseConfig) -> Self {
        Self { database }
    }

    pub async fn execute(&self, action: MigrateAction) -> AppResult<()> {
        self.database.validate()?;

        match action {
            MigrateAction::Pending => {
                let pending: Vec<String> = self
                    .with_connection("list pending migrations", |conn| {
                        conn.pending_migrations(MIGRATIONS)
                            .map(|list| list.iter().map(|m| m.name().to_string()).collect())
                    })
                    .await?;
                report("pending", &pending);
            }
            MigrateAction::Apply => {
                let applied: Vec<String> = self
                    .with_connection("run pending migrations", |conn| {
                        conn.run_pending_migrations(MIGRATIONS)
                            .map(|list| list.iter().map(ToString::to_string).collect())
                    })
                    .await?;
                report("applied", &applied);
            }
            MigrateAction::Rollback(steps) => {
                let reverted = self.rollback(steps).await?;
                report("reverted", &reverted);
            }
        }

        Ok(())
    }

    async fn rollback(&self, steps: u32) -> AppResult<Vec<String>> {
        if steps == 0 {
            return Err(AppError::Validation {
                field: "rollback".to_string(),
                reason: "Number of rollback steps must be greater than 0".to_string(),
            });
        }

        let available = self
            .with_connection("list applied migrations", |conn| {
                conn.applied_migrations().map(|list| list.len())
            })
            .await?;
        if available < steps as usize {
            return Err(AppError::Validation {
                field: "rollback".to_string(),
                reason: format!(
                    "Cannot roll back {} migration(s), only {} applied",
                    steps, available
                ),
            });
        }

        self.with_connection("revert migrations", move |conn| {
            (0..steps)
                .map(|_| conn.revert_last_migration(MIGRATIONS).map(|v| v.to_string()))
                .collect()
        })
        .await
    }

    async fn with_connection<T, F>(&self, operation: &'static str, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(
                &mut PgConnection,
            ) -> Result<T, Box<dyn std::error::Error + Send + Sync + 'static>>
            + Send
            + 'static,
    {
        let url = self.database.url.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = PgConnection::establish(&url).map_err(|e| AppError::Database {
                operation: format!("connect to {}", operation),
                source: anyhow::Error::new(e),
            })?;
            f(&mut conn).map_err(|e| AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!(e),
            })
        })
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::new(e),
        })?
    }
}

fn report(verb: &str, migrations: &[String]) {
    if migrations.is_empty() {
        println!("No migrations {} - database is up to date", verb);
        return;
    }
    println!("{} migration(s) {}:", migrations.len(), verb);
    for name in migrations {
        println!("  - {}", name);
    }
    tracing::info!(count = migrations.len(), action = verb, "Migrations processed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/products".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_action_from_flags() {
        assert_eq!(MigrateAction::from_flags(false, None), MigrateAction::Apply);
        assert_eq!(MigrateAction::from_flags(true, None), MigrateAction::Pending);
        assert_eq!(
            MigrateAction::from_flags(false, Some(2)),
            MigrateAction::Rollback(2)
        );
    }

    #[tokio::test]
    async fn test_zero_rollback_is_rejected_before_connecting() {
        let result = MigrateCommandHandler::new(database())
            .execute(MigrateAction::Rollback(0))
            .await;

        match result {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "rollback");
                assert!(reason.contains("greater than 0"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_database_config_is_rejected() {
        let result = MigrateCommandHandler::new(DatabaseConfig::default())
            .execute(MigrateAction::Apply)
            .await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
