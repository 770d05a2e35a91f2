//! UI Preferences Management
//!
//! This module handles saving and loading the layout preferences of the
//! client, namely whether the sidebar is collapsed and whether dark mode is on.
//! The preferences live in a single-row table.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

/// The layout preferences of the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    /// Whether the navigation sidebar is collapsed.
    pub sidebar_collapsed: bool,
    /// Whether the dark colour scheme is used.
    pub dark_mode: bool,
}

/// Create the ui_preferences table in the database.
///
/// The `CHECK` constraint on the primary key keeps the table to a single row.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_preferences_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ui_preferences (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            sidebar_collapsed INTEGER NOT NULL DEFAULT 0,
            dark_mode INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

/// Gets the saved UI preferences, or the defaults if none have been saved.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_preferences(connection: &Connection) -> Result<UiPreferences, Error> {
    let preferences = connection
        .query_row(
            "SELECT sidebar_collapsed, dark_mode FROM ui_preferences WHERE id = 1",
            [],
            |row| {
                Ok(UiPreferences {
                    sidebar_collapsed: row.get(0)?,
                    dark_mode: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(preferences.unwrap_or_default())
}

/// Saves the UI preferences, replacing any previously saved ones.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn save_preferences(preferences: UiPreferences, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO ui_preferences (id, sidebar_collapsed, dark_mode) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET
            sidebar_collapsed = excluded.sidebar_collapsed,
            dark_mode = excluded.dark_mode",
        (preferences.sidebar_collapsed, preferences.dark_mode),
    )?;

    Ok(())
}

/// The state needed for reading and saving the UI preferences.
#[derive(Debug, Clone)]
pub struct PreferencesState {
    /// The database connection for reading and saving preferences.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the saved UI preferences.
pub async fn get_preferences_endpoint(
    State(state): State<PreferencesState>,
) -> Result<Json<UiPreferences>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_preferences(&connection).map(Json)
}

/// Save the UI preferences and echo them back.
pub async fn save_preferences_endpoint(
    State(state): State<PreferencesState>,
    Json(preferences): Json<UiPreferences>,
) -> Result<Json<UiPreferences>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    save_preferences(preferences, &connection)
        .inspect_err(|error| tracing::error!("Failed to save UI preferences: {error}"))?;

    Ok(Json(preferences))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{UiPreferences, create_preferences_table, get_preferences, save_preferences};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_preferences_table(&conn).unwrap();
        conn
    }

    #[test]
    fn defaults_when_nothing_saved() {
        let conn = get_test_connection();

        assert_eq!(get_preferences(&conn).unwrap(), UiPreferences::default());
    }

    #[test]
    fn save_replaces_previous_preferences() {
        let conn = get_test_connection();
        let first = UiPreferences {
            sidebar_collapsed: true,
            dark_mode: false,
        };
        let second = UiPreferences {
            sidebar_collapsed: false,
            dark_mode: true,
        };

        save_preferences(first, &conn).unwrap();
        save_preferences(second, &conn).unwrap();

        assert_eq!(get_preferences(&conn).unwrap(), second);
        let row_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM ui_preferences", [], |row| row.get(0))
            .unwrap();
        assert_eq!(row_count, 1);
    }
}
