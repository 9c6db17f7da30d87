use anyhow::Result;

use super::schema::Database;
use super::types::Settings;

/// Preference key holding the serialized settings record.
const SETTINGS_KEY: &str = "settings";

impl Database {
    // ========================================================================
    // Settings Operations
    // ========================================================================

    /// Persist the settings record (UPSERT).
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_string(settings)?;
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(SETTINGS_KEY)
        .bind(&value)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Load the settings record, creating and persisting the default when
    /// the record is missing or unreadable.
    pub async fn load_settings(&self) -> Settings {
        let row: Result<Option<(String,)>, sqlx::Error> =
            sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
                .bind(SETTINGS_KEY)
                .fetch_optional(&self.pool)
                .await;

        match row {
            Ok(Some((value,))) => match serde_json::from_str(&value) {
                Ok(settings) => return settings,
                Err(e) => {
                    tracing::warn!(error = %e, "stored settings unreadable, resetting to defaults");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "settings load failed, using defaults");
            }
        }

        let defaults = Settings::default();
        if let Err(e) = self.save_settings(&defaults).await {
            tracing::warn!(error = %e, "could not persist default settings");
        }
        defaults
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, Section, Settings};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn load_settings_creates_default() {
        let db = test_db().await;

        let settings = db.load_settings().await;
        assert_eq!(settings.last_section, Section::Recent);

        // The default is persisted on first load.
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind("settings")
            .fetch_optional(&db.pool)
            .await
            .unwrap();
        assert!(row.is_some());
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let db = test_db().await;

        db.save_settings(&Settings {
            last_section: Section::Top,
        })
        .await
        .unwrap();

        let settings = db.load_settings().await;
        assert_eq!(settings.last_section, Section::Top);
    }

    #[tokio::test]
    async fn corrupt_settings_reset_to_default() {
        let db = test_db().await;
        sqlx::query("INSERT INTO preferences (key, value, updated_at) VALUES ('settings', 'not json', 0)")
            .execute(&db.pool)
            .await
            .unwrap();

        let settings = db.load_settings().await;
        assert_eq!(settings.last_section, Section::Recent);

        // The broken record was replaced with a readable default.
        let settings = db.load_settings().await;
        assert_eq!(settings.last_section, Section::Recent);
    }
}
