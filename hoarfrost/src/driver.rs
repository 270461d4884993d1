//! Connection backend abstraction

use indexmap::IndexMap;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::escape::Escaper;
use crate::value::Value;

/// One fetched row, field name to value in select order
pub type Row = IndexMap<String, Value>;

/// What a driver hands back for an executed statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Result set of a read statement
    Rows(Vec<Row>),
    /// Row count touched by a write statement
    Affected(u64),
}

impl QueryOutcome {
    /// Number of rows in a result set, 0 for write outcomes
    pub fn num_rows(&self) -> u64 {
        match self {
            QueryOutcome::Rows(rows) => rows.len() as u64,
            QueryOutcome::Affected(_) => 0,
        }
    }
}

/// Connection backend consumed by [`Session`](crate::session::Session).
///
/// Implementations wrap a real client library. The crate itself only ships
/// [`NullDriver`], which keeps sessions usable for offline query
/// construction.
pub trait Driver {
    /// Open the connection described by the config
    fn connect(&mut self, config: &SessionConfig) -> Result<()>;

    /// Select the active database
    fn select_database(&mut self, database: &str) -> Result<()>;

    /// Close the connection if one is open; true when something was closed
    fn disconnect(&mut self) -> bool;

    /// True when the connection is open and responsive
    fn ping(&mut self) -> bool;

    /// Execute a finished SQL string
    fn execute(&mut self, sql: &str) -> Result<QueryOutcome>;

    /// Rows touched by the last write statement
    fn affected_rows(&self) -> u64;

    /// Auto-increment id assigned by the last insert, 0 when none
    fn last_insert_id(&self) -> u64;

    /// Literal renderer matching the server's quoting rules
    fn escaper(&self) -> Escaper {
        Escaper
    }
}

/// Driver that is never connected; every execution fails
#[derive(Debug, Default)]
pub struct NullDriver;

impl Driver for NullDriver {
    fn connect(&mut self, _config: &SessionConfig) -> Result<()> {
        Err(Error::connection("no driver configured"))
    }

    fn select_database(&mut self, database: &str) -> Result<()> {
        Err(Error::database_select(database, "no driver configured"))
    }

    fn disconnect(&mut self) -> bool {
        false
    }

    fn ping(&mut self) -> bool {
        false
    }

    fn execute(&mut self, _sql: &str) -> Result<QueryOutcome> {
        Err(Error::query_execution("no driver configured"))
    }

    fn affected_rows(&self) -> u64 {
        0
    }

    fn last_insert_id(&self) -> u64 {
        0
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory driver recording every executed statement. The log handle
    /// stays readable after the driver moves into a session.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDriver {
        pub connected: bool,
        pub executed: Rc<RefCell<Vec<String>>>,
        pub rows: Vec<Row>,
        pub affected: u64,
        pub last_id: u64,
    }

    impl RecordingDriver {
        pub fn with_rows(rows: Vec<Row>) -> Self {
            RecordingDriver {
                rows,
                ..Default::default()
            }
        }

        pub fn log(&self) -> Rc<RefCell<Vec<String>>> {
            Rc::clone(&self.executed)
        }
    }

    impl Driver for RecordingDriver {
        fn connect(&mut self, _config: &SessionConfig) -> Result<()> {
            self.connected = true;
            Ok(())
        }

        fn select_database(&mut self, _database: &str) -> Result<()> {
            Ok(())
        }

        fn disconnect(&mut self) -> bool {
            let was = self.connected;
            self.connected = false;
            was
        }

        fn ping(&mut self) -> bool {
            self.connected
        }

        fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
            self.executed.borrow_mut().push(sql.to_string());
            if self.rows.is_empty() {
                Ok(QueryOutcome::Affected(self.affected))
            } else {
                Ok(QueryOutcome::Rows(self.rows.clone()))
            }
        }

        fn affected_rows(&self) -> u64 {
            self.affected
        }

        fn last_insert_id(&self) -> u64 {
            self.last_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_driver_rejects_everything() {
        let mut driver = NullDriver;
        assert!(driver.connect(&SessionConfig::default()).is_err());
        assert!(driver.execute("SELECT 1").is_err());
        assert!(!driver.ping());
        assert!(!driver.disconnect());
    }

    #[test]
    fn test_outcome_row_count() {
        let outcome = QueryOutcome::Rows(vec![Row::new(), Row::new()]);
        assert_eq!(outcome.num_rows(), 2);
        assert_eq!(QueryOutcome::Affected(7).num_rows(), 0);
    }
}
