//! Database handle.

use std::marker::PhantomData;
use std::path::Path;

use acorn_codec::{JsonCodec, ValueCodec};
use redb::ReadableTable;

use crate::error::CoreResult;
use crate::tables::{DATA, META, NEXT_BUCKET_ID, SEQUENCES};
use crate::transaction::Tx;

/// The main database handle.
///
/// `Database` owns one open engine connection and is the entry point
/// for all work: transactions are scoped to callbacks passed to
/// [`Database::view`] (read-only) and [`Database::update`]
/// (read-write), which is what keeps bucket and cursor handles from
/// outliving their transaction.
///
/// The handle can be shared across threads by reference; the engine
/// serializes writers and gives every reader a consistent snapshot.
///
/// The codec type parameter selects how values are serialized;
/// [`JsonCodec`] is the default.
///
/// # Example
///
/// ```rust,ignore
/// use acorn_core::Database;
///
/// let db = Database::open("app.db")?;
/// db.ensure_bucket("users")?;
/// db.update(|tx| {
///     let users = tx.bucket("users")?.expect("ensured above");
///     users.put("u1", &serde_json::json!({"name": "Ada"}))
/// })?;
/// db.close()?;
/// ```
pub struct Database<C: ValueCodec = JsonCodec> {
    engine: redb::Database,
    _codec: PhantomData<fn() -> C>,
}

impl<C: ValueCodec> Database<C> {
    /// Opens the database at `path`, creating the file if it does not
    /// exist.
    ///
    /// Fails if the engine cannot create, lock, or read the file. The
    /// facade's tables are created eagerly here so read-only
    /// transactions never observe a half-initialized file.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let engine = redb::Database::create(path)?;

        let wtx = engine.begin_write()?;
        {
            let _ = wtx.open_table(DATA)?;
            let _ = wtx.open_table(SEQUENCES)?;
            let mut meta = wtx.open_table(META)?;
            if meta.get(NEXT_BUCKET_ID)?.is_none() {
                meta.insert(NEXT_BUCKET_ID, 1u64)?;
            }
        }
        wtx.commit()?;

        tracing::debug!(path = %path.display(), "opened database");
        Ok(Self {
            engine,
            _codec: PhantomData,
        })
    }

    /// Closes the database, releasing the engine connection.
    ///
    /// Consumes the handle, so a closed database cannot be used or
    /// closed twice.
    pub fn close(self) -> CoreResult<()> {
        tracing::debug!("closing database");
        drop(self.engine);
        Ok(())
    }

    /// Runs `f` inside a fresh read-only transaction.
    ///
    /// The transaction observes a consistent snapshot unaffected by
    /// concurrently committing writers. An error from `f` is propagated
    /// to the caller; there is nothing to roll back.
    pub fn view<F, R>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&Tx<C>) -> CoreResult<R>,
    {
        let tx = Tx::read(self.engine.begin_read()?);
        f(&tx)
    }

    /// Runs `f` inside a fresh read-write transaction.
    ///
    /// If `f` returns `Ok`, the transaction commits and any commit
    /// failure is returned instead. If `f` returns an error, the
    /// transaction rolls back and that error is returned. Write
    /// transactions are exclusive; `update` blocks while another writer
    /// is active.
    pub fn update<F, R>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&Tx<C>) -> CoreResult<R>,
    {
        let tx = Tx::write(self.engine.begin_write()?);
        match f(&tx) {
            Ok(result) => {
                tx.commit()?;
                Ok(result)
            }
            Err(e) => {
                // The callback's error is the interesting one.
                let _ = tx.abort();
                Err(e)
            }
        }
    }

    /// Ensures a top-level bucket exists, discarding the handle.
    pub fn ensure_bucket(&self, name: &str) -> CoreResult<()> {
        self.update(|tx| tx.create_bucket_if_absent(name).map(|_| ()))
    }
}
