//! Error types of the query layer and the generic repository.
//!
//! These are domain errors: they carry enough structure for the HTTP
//! boundary ([`crate::ApiError`]) to pick a status code, but they never
//! decide how a failure is rendered.

use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// A filter, sort or projection request that cannot be turned into a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid filter field: {0}")]
    InvalidFilterField(String),

    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),

    #[error("Invalid select field: {0}")]
    InvalidSelectField(String),

    #[error("Invalid value for filter '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },
}

impl QueryError {
    pub(crate) fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which storage rule rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

impl ConstraintKind {
    /// Machine-readable key, stable across database backends.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unique => "unique_violation",
            Self::ForeignKey => "foreign_key_violation",
            Self::NotNull => "not_null_violation",
            Self::Check => "check_violation",
        }
    }
}

/// A write rejected by a uniqueness, foreign-key, not-null or check rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    /// Constraint name, when the driver reports one (Postgres does).
    pub constraint: Option<String>,
    /// Offending column, as named in storage.
    pub column: Option<String>,
    /// Offending value, when the driver's detail message exposes it.
    pub value: Option<String>,
}

impl ConstraintViolation {
    #[must_use]
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            constraint: None,
            column: None,
            value: None,
        }
    }

    /// Extract a constraint violation from a Sea-ORM error, if it is one.
    ///
    /// Classification relies on the driver's [`ErrorKind`], so it works the
    /// same for Postgres and SQLite. Column and value are best effort: the
    /// Postgres detail line (`Key (email)=(a@b.c) already exists.`) and the
    /// SQLite message (`UNIQUE constraint failed: users.email`) are parsed.
    #[must_use]
    pub fn from_db_err(err: &DbErr) -> Option<Self> {
        let runtime = match err {
            DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
            _ => return None,
        };
        let RuntimeErr::SqlxError(sqlx_error) = runtime else {
            return None;
        };
        let db_error = sqlx_error.as_database_error()?;

        let kind = match db_error.kind() {
            ErrorKind::UniqueViolation => ConstraintKind::Unique,
            ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
            ErrorKind::NotNullViolation => ConstraintKind::NotNull,
            ErrorKind::CheckViolation => ConstraintKind::Check,
            _ => return None,
        };

        let mut violation = Self::new(kind);
        violation.constraint = db_error.constraint().map(str::to_string);

        #[cfg(feature = "postgresql")]
        if let Some(pg) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
            if let Some((column, value)) = pg.detail().and_then(parse_postgres_detail) {
                violation.column = Some(column);
                violation.value = Some(value);
            } else if let Some(column) = pg.column() {
                violation.column = Some(column.to_string());
            }
            return Some(violation);
        }

        violation.column = parse_failed_column(db_error.message());
        Some(violation)
    }

    /// User-facing description of the violation.
    #[must_use]
    pub fn message(&self) -> String {
        match (self.kind, self.value.as_deref(), self.column.as_deref()) {
            (ConstraintKind::Unique, Some(value), _) => format!("The value {value} already exists"),
            (ConstraintKind::Unique, None, Some(column)) => {
                format!("The value of {column} already exists")
            }
            (ConstraintKind::Unique, None, None) => "The value already exists".to_string(),
            (ConstraintKind::ForeignKey, Some(value), _) => {
                format!("The value {value} does not exist")
            }
            (ConstraintKind::ForeignKey, None, _) => {
                "A referenced record does not exist".to_string()
            }
            (ConstraintKind::NotNull, _, Some(column)) => format!("{column} is required"),
            (ConstraintKind::NotNull, _, None) => "Some fields are missing".to_string(),
            (ConstraintKind::Check, _, Some(column)) => format!("{column} has an invalid value"),
            (ConstraintKind::Check, _, None) => "A value is not allowed".to_string(),
        }
    }
}

/// Parse `Key (column)=(value) ...` from a Postgres error detail.
#[cfg(any(feature = "postgresql", test))]
fn parse_postgres_detail(detail: &str) -> Option<(String, String)> {
    let mut groups = detail.split('(').skip(1).filter_map(|part| part.split(')').next());
    let column = groups.next()?;
    let value = groups.next()?;
    Some((column.to_string(), value.to_string()))
}

/// Parse the column out of SQLite's `... constraint failed: table.column[, ...]`.
fn parse_failed_column(message: &str) -> Option<String> {
    let (_, targets) = message.split_once("constraint failed: ")?;
    let first = targets.split(',').next()?.trim();
    let column = first.rsplit('.').next()?;
    (!column.is_empty()).then(|| column.to_string())
}

/// Failure of a generic repository operation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("{resource} with ID '{id}' not found")]
    NotFound { resource: &'static str, id: i32 },

    #[error("{}", .0.message())]
    Constraint(ConstraintViolation),

    /// A defensive check failed (e.g. an insert returned no row).
    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl RepositoryError {
    #[must_use]
    pub fn not_found(resource: &'static str, id: i32) -> Self {
        Self::NotFound { resource, id }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match ConstraintViolation::from_db_err(&err) {
            Some(violation) => Self::Constraint(violation),
            None => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgres_unique_detail() {
        let parsed = parse_postgres_detail("Key (email)=(ada@example.com) already exists.");
        assert_eq!(
            parsed,
            Some(("email".to_string(), "ada@example.com".to_string()))
        );
    }

    #[test]
    fn test_parse_postgres_foreign_key_detail() {
        let parsed =
            parse_postgres_detail(r#"Key (category_id)=(999) is not present in table "categories"."#);
        assert_eq!(parsed, Some(("category_id".to_string(), "999".to_string())));
    }

    #[test]
    fn test_parse_postgres_detail_without_groups() {
        assert_eq!(parse_postgres_detail("Failing row contains null."), None);
    }

    #[test]
    fn test_parse_sqlite_failed_column() {
        assert_eq!(
            parse_failed_column("NOT NULL constraint failed: users.name"),
            Some("name".to_string())
        );
        assert_eq!(
            parse_failed_column("UNIQUE constraint failed: cart_items.product_id, cart_items.cart_id"),
            Some("product_id".to_string())
        );
        assert_eq!(parse_failed_column("FOREIGN KEY constraint failed"), None);
    }

    #[test]
    fn test_constraint_messages() {
        let mut unique = ConstraintViolation::new(ConstraintKind::Unique);
        unique.value = Some("ada@example.com".to_string());
        assert_eq!(unique.message(), "The value ada@example.com already exists");

        let mut not_null = ConstraintViolation::new(ConstraintKind::NotNull);
        assert_eq!(not_null.message(), "Some fields are missing");
        not_null.column = Some("name".to_string());
        assert_eq!(not_null.message(), "name is required");

        let mut foreign = ConstraintViolation::new(ConstraintKind::ForeignKey);
        foreign.value = Some("42".to_string());
        assert_eq!(foreign.message(), "The value 42 does not exist");
    }

    #[test]
    fn test_non_driver_errors_are_not_constraints() {
        assert!(ConstraintViolation::from_db_err(&DbErr::Custom("boom".into())).is_none());
        let err: RepositoryError = DbErr::RecordNotFound("gone".into()).into();
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[test]
    fn test_not_found_display() {
        let err = RepositoryError::not_found("product", 7);
        assert_eq!(err.to_string(), "product with ID '7' not found");
    }
}
