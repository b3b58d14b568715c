//! Explicit transactional scope over one pooled connection.
//!
//! Work is only persisted by [`UnitOfWork::commit`]. Dropping the value on any
//! other path (an early `?`, a panic) rolls the transaction back and returns
//! the connection to the pool.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::debug;

use crate::error::Context;
use crate::{DbError, DbPool};

pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Acquire a connection and open a transaction on it.
    pub async fn begin(pool: &DbPool) -> Result<Self, DbError> {
        let tx = pool.begin().await.during("begin transaction")?;
        debug!("unit of work opened");
        Ok(Self { tx })
    }

    /// The connection every statement of this unit must run on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await.during("commit transaction")?;
        debug!("unit of work committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await.during("rollback transaction")?;
        debug!("unit of work rolled back");
        Ok(())
    }
}
