//! Mapping from database errors onto the core taxonomy.
//!
//! Unique constraints are never pre-checked; when SQLite rejects a write the
//! extended result code decides whether the caller sees a conflict, a
//! restrict failure, or a plain storage fault.

use trellis_core::Error;

// SQLite extended result codes for constraint violations.
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
// An `ON DELETE RESTRICT` violation is reported by SQLite with the
// trigger-constraint extended code rather than the plain foreign-key one.
const SQLITE_CONSTRAINT_TRIGGER: i32 = 1811;

/// Classify a write error. `what` names the resource for
/// [`Error::Restricted`] — a foreign-key failure only reaches this point on
/// a RESTRICT delete, since inserts resolve their references first.
pub(crate) fn db_err(what: &'static str, err: tokio_rusqlite::Error) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg)) =
    &err
    && e.code == rusqlite::ErrorCode::ConstraintViolation
  {
    match e.extended_code {
      SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
        return Error::Conflict(
          msg
            .clone()
            .unwrap_or_else(|| "unique constraint violated".to_owned()),
        );
      }
      SQLITE_CONSTRAINT_FOREIGNKEY | SQLITE_CONSTRAINT_TRIGGER => {
        return Error::Restricted(what);
      }
      _ => {}
    }
  }
  Error::Storage(err.to_string())
}

/// Map a read error. Reads cannot trip constraints.
pub(crate) fn storage(err: tokio_rusqlite::Error) -> Error {
  Error::Storage(err.to_string())
}
