//! SQLite-backed persistence for [`IconCache`].
//!
//! The sprite pipeline only ever sees the in-memory [`IconCache`]. The
//! command-line front end loads it from here before a scan and stores it
//! back afterwards, which is what makes builds incremental across runs.
//!
//! Every stored cache is tagged with a fingerprint of the scan options.
//! Fragments and identifiers depend on the template and the optimizer
//! settings, so a cache written under different options is discarded on
//! load instead of being reused.
//!
//! Icon paths are stored as raw OS bytes, so paths that are not valid
//! UTF-8 keep distinct keys and still hit the cache after a reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheEntry, IconCache};

/// Errors raised by the cache database.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// SQLite reported an error.
    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for cache database operations.
pub type CacheResult<T> = Result<T, CacheError>;

const SCHEMA_VERSION: i32 = 2;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS icons (
    path          BLOB PRIMARY KEY,
    relative_name TEXT NOT NULL,
    mtime_secs    INTEGER,
    mtime_nanos   INTEGER,
    fragment      TEXT NOT NULL,
    symbol_id     TEXT NOT NULL
);
";

const FINGERPRINT_KEY: &str = "fingerprint";

/// Persistent store for compiled icons.
pub struct CacheDatabase {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for CacheDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheDatabase")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CacheDatabase {
    /// Open or create the cache database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open(path: &Path) -> CacheResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        migrate(&conn)?;
        log::debug!("Opened icon cache database at {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint the stored entries were compiled under, if any.
    pub fn fingerprint(&self) -> CacheResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Load the stored cache.
    ///
    /// Returns an empty cache when the stored fingerprint differs from
    /// `fingerprint`.
    pub fn load(&self, fingerprint: &str) -> CacheResult<IconCache> {
        match self.fingerprint()? {
            Some(stored) if stored == fingerprint => {}
            Some(_) => {
                log::info!("Scan options changed since last build, recompiling all icons");
                return Ok(IconCache::new());
            }
            None => return Ok(IconCache::new()),
        }

        let mut stmt = self.conn.prepare(
            "SELECT path, relative_name, mtime_secs, mtime_nanos, fragment, symbol_id FROM icons",
        )?;
        let rows = stmt.query_map([], |row| {
            let path: Vec<u8> = row.get(0)?;
            let secs: Option<i64> = row.get(2)?;
            let nanos: Option<u32> = row.get(3)?;
            Ok((
                decode_path(path),
                CacheEntry {
                    relative_name: row.get(1)?,
                    modified: decode_mtime(secs, nanos),
                    fragment: row.get(4)?,
                    symbol_id: row.get(5)?,
                },
            ))
        })?;

        let cache = rows.collect::<Result<IconCache, _>>()?;
        log::debug!("Loaded {} cached icon(s)", cache.len());
        Ok(cache)
    }

    /// Replace the stored cache with `cache`, tagged with `fingerprint`.
    pub fn store(&mut self, cache: &IconCache, fingerprint: &str) -> CacheResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM icons", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO icons (path, relative_name, mtime_secs, mtime_nanos, fragment, symbol_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (path, entry) in cache.iter() {
                let (secs, nanos) = encode_mtime(entry.modified);
                insert.execute(params![
                    encode_path(path),
                    entry.relative_name,
                    secs,
                    nanos,
                    entry.fragment,
                    entry.symbol_id,
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![FINGERPRINT_KEY, fingerprint],
        )?;
        tx.commit()?;
        log::debug!("Stored {} cached icon(s)", cache.len());
        Ok(())
    }

    /// Remove every stored entry and the fingerprint.
    pub fn clear(&mut self) -> CacheResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM icons", [])?;
        tx.execute("DELETE FROM meta", [])?;
        tx.commit()?;
        Ok(())
    }
}

/// Create the tables, dropping any written under an older layout.
fn migrate(conn: &Connection) -> CacheResult<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version != SCHEMA_VERSION {
        if version != 0 {
            log::info!("Cache schema v{version} is outdated, discarding stored icons");
        }
        conn.execute_batch("DROP TABLE IF EXISTS icons; DROP TABLE IF EXISTS meta;")?;
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
    }
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(unix)]
fn encode_path(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn decode_path(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes))
}

// UTF-16 code units, little endian.
#[cfg(windows)]
fn encode_path(path: &Path) -> Vec<u8> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str()
        .encode_wide()
        .flat_map(u16::to_le_bytes)
        .collect()
}

#[cfg(windows)]
fn decode_path(bytes: Vec<u8>) -> PathBuf {
    use std::os::windows::ffi::OsStringExt;
    let wide: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    PathBuf::from(OsString::from_wide(&wide))
}

#[cfg(not(any(unix, windows)))]
fn encode_path(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(not(any(unix, windows)))]
fn decode_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(OsString::from(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Split a modification time into epoch seconds and nanoseconds.
///
/// Times before the epoch are stored as NULL and load as "never compiled".
fn encode_mtime(modified: Option<SystemTime>) -> (Option<i64>, Option<u32>) {
    modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_secs()).ok().map(|s| (s, d.subsec_nanos())))
        .map_or((None, None), |(s, n)| (Some(s), Some(n)))
}

fn decode_mtime(secs: Option<i64>, nanos: Option<u32>) -> Option<SystemTime> {
    let secs = u64::try_from(secs?).ok()?;
    UNIX_EPOCH.checked_add(Duration::new(secs, nanos.unwrap_or(0)))
}
