// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;

use crate::error::PermissionsServerError;

/// Create a SqlitePool with WAL mode and common settings.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./tally.db")
///
/// # Errors
/// Returns `PermissionsServerError::Internal` if the URL is invalid, or
/// `Database` if the connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, PermissionsServerError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| PermissionsServerError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_invalid_url_is_internal() {
		let err = create_pool("sqlite::memory:?mode=bogus").await.unwrap_err();
		assert!(matches!(err, PermissionsServerError::Internal(_)));
	}

	#[tokio::test]
	async fn test_file_database_is_created() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("tally.db").display());
		let pool = create_pool(&url).await.unwrap();
		let one: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
		assert_eq!(one.0, 1);
	}
}
