//! Preference store
//!
//! One SQLite table mapping the external display's EDID to the layout that
//! was applied the last time that display was seen, plus a schema version
//! marker. The whole session runs inside a single transaction: nothing
//! touches the file until `commit`, and dropping the store without
//! committing rolls everything back.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::constants::store::SCHEMA_VERSION;
use crate::error::SetupError;
use crate::types::{RelativePosition, Resolution, ScreenSetup};

#[derive(Debug)]
pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    /// Opens (creating if necessary) the store and starts the session
    /// transaction. The version marker is checked before anything else is
    /// read or written.
    pub fn open(path: &Path) -> Result<Self, SetupError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let fresh = !path.exists();
        let conn = Connection::open(path)?;
        conn.execute_batch("BEGIN")?;
        let store = Self { conn };
        if fresh {
            debug!(path = %path.display(), "creating preference store");
            store.create_schema()?;
        } else {
            store.check_version()?;
        }
        Ok(store)
    }

    fn create_schema(&self) -> Result<(), SetupError> {
        self.conn.execute_batch(
            "CREATE TABLE meta (key TEXT, value TEXT, PRIMARY KEY (key));
             CREATE TABLE known_configs (
                 edid BLOB,
                 resinternal TEXT,
                 resexternal TEXT,
                 mode TEXT,
                 ext_is_primary INTEGER,
                 PRIMARY KEY (edid)
             );",
        )?;
        self.conn.execute(
            "INSERT INTO meta VALUES ('version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    fn check_version(&self) -> Result<(), SetupError> {
        let version: Option<String> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(version) = version else {
            return Err(SetupError::Configuration(
                "preference store has no version marker".into(),
            ));
        };
        let found: i64 = version.parse().map_err(|_| {
            SetupError::Configuration(format!(
                "preference store version marker is not a number: {version}"
            ))
        })?;
        if found > SCHEMA_VERSION {
            return Err(SetupError::IncompatibleStoreVersion {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Looks up the layout remembered for a display. Absent resolution
    /// fields translate back to "off".
    pub fn get(&self, edid: &[u8]) -> Result<Option<ScreenSetup>, SetupError> {
        let row = self
            .conn
            .query_row(
                "SELECT resinternal, resexternal, mode, ext_is_primary
                 FROM known_configs WHERE edid = ?1",
                params![edid],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((internal, external, mode, ext_is_primary)) = row else {
            return Ok(None);
        };
        let internal = internal.as_deref().map(parse_stored_resolution).transpose()?;
        let external = external.as_deref().map(parse_stored_resolution).transpose()?;
        let position = mode
            .as_deref()
            .map(|tag| {
                RelativePosition::from_tag(tag).ok_or_else(|| {
                    SetupError::Configuration(format!(
                        "preference store contains unknown position tag: {tag}"
                    ))
                })
            })
            .transpose()?;
        Ok(Some(ScreenSetup::new(
            internal,
            external,
            position,
            ext_is_primary != 0,
        )))
    }

    /// Upserts the layout for a display, replacing any previous record.
    pub fn put(&self, edid: &[u8], setup: &ScreenSetup) -> Result<(), SetupError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO known_configs VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                edid,
                setup.internal.map(|r| r.mode_string()),
                setup.external.map(|r| r.mode_string()),
                setup.position.map(|p| p.tag()),
                setup.external_is_primary as i64,
            ],
        )?;
        Ok(())
    }

    /// Ends the session transaction, making all writes visible at once.
    pub fn commit(self) -> Result<(), SetupError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }
}

fn parse_stored_resolution(s: &str) -> Result<Resolution, SetupError> {
    Resolution::from_mode_string(s).ok_or_else(|| {
        SetupError::Configuration(format!(
            "preference store contains a malformed resolution: {s}"
        ))
    })
}
