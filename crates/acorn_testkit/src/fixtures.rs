//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases on
//! temporary storage.

use std::path::PathBuf;

use acorn_core::Database;
use tempfile::TempDir;

/// A test database on temporary storage with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The database file path, for reopen scenarios.
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Creates a new test database in a fresh temporary directory.
    pub fn new() -> Self {
        init_tracing();
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("test.db");
        let db = Database::open(&path).expect("failed to open test database");
        Self {
            db,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the database file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Closes and reopens the database on the same file.
    ///
    /// Used for persistence tests: everything committed before the call
    /// must still be visible after it.
    pub fn reopen(self) -> Self {
        let Self { db, path, _temp_dir } = self;
        db.close().expect("failed to close test database");
        let db = Database::open(&path).expect("failed to reopen test database");
        Self {
            db,
            path,
            _temp_dir,
        }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary database.
///
/// # Example
///
/// ```rust,ignore
/// use acorn_testkit::with_temp_db;
///
/// #[test]
/// fn my_test() {
///     with_temp_db(|db| {
///         db.ensure_bucket("test").unwrap();
///     });
/// }
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::new();
    f(&test_db.db)
}

/// Initializes a tracing subscriber for test debugging.
///
/// Respects `RUST_LOG`; safe to call from multiple tests.
/// [`TestDatabase::new`] calls this, so fixture-based tests get it for
/// free.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
