use std::{future::Future, pin::Pin};

use sea_orm::{DatabaseTransaction, TransactionError, TransactionTrait};

use super::error::RepositoryError;

/// Boxed future returned by a transactional closure.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'c>>;

/// Run `work` inside a transaction.
///
/// Commits when `work` returns `Ok`, rolls back when it returns `Err`. A
/// transaction dropped mid-flight (panic, cancelled request) is rolled back
/// by Sea-ORM. Failures to begin or commit surface as database errors.
///
/// ```rust,ignore
/// let user = in_transaction(&db, move |txn| Box::pin(async move {
///     Ok(active.insert(txn).await?)
/// }))
/// .await?;
/// ```
///
/// # Errors
///
/// Whatever `work` returns, or [`RepositoryError::Database`] for the
/// begin/commit step.
pub async fn in_transaction<C, F, T>(db: &C, work: F) -> Result<T, RepositoryError>
where
    C: TransactionTrait,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    T: Send,
{
    db.transaction::<_, T, RepositoryError>(work)
        .await
        .map_err(|err| match err {
            TransactionError::Connection(db_err) => RepositoryError::from(db_err),
            TransactionError::Transaction(err) => err,
        })
}
