//! Session facade over configuration, connection, queries and results

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::builder::{
    DeleteBuilder, InsertBuilder, IntoTables, QueryContext, ReplaceBuilder, SelectBuilder,
    TruncateBuilder, UpdateBuilder,
};
use crate::collection::Collection;
use crate::config::SessionConfig;
use crate::driver::{Driver, NullDriver, QueryOutcome, Row};
use crate::error::{Error, Result};
use crate::item::CollectionItem;
use crate::value::Value;

static WRITE_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(INSERT|UPDATE|DELETE) (.*)").unwrap());

static SCHEMA_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:CREATE|DROP|ALTER|CACHE) (.*)(?:FUNCTION|TABLE|VIEW|EVENT|TRIGGER|INDEX|SERVER|USER|DATABASE|TABLESPACE|PROCEDURE) ",
    )
    .unwrap()
});

/// Whether a session may issue data- and schema-changing statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    Read,
    #[default]
    Write,
}

impl AccessMode {
    /// The short option value for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::Write => "w",
        }
    }

    /// Accepts the short and the long option spelling.
    fn from_option(value: &str) -> Option<Self> {
        match value {
            "r" | "read" => Some(AccessMode::Read),
            "w" | "write" => Some(AccessMode::Write),
            _ => None,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A database session: holds the configuration, the driver connection,
/// replacement tokens and the result of the last query.
///
/// ```
/// use hoarfrost::{Session, SessionConfig, Statement};
///
/// let mut config = SessionConfig::default();
/// config.prefix = "app_".to_string();
///
/// let session = Session::new(config);
/// let mut select = session.select();
/// select.from("{PRE}users").where_("active = 1");
///
/// assert_eq!(
///     select.get_query(&session),
///     Some("SELECT * FROM app_users WHERE active = 1 ".to_string())
/// );
/// ```
pub struct Session {
    config: SessionConfig,
    access_mode: AccessMode,
    replacements: IndexMap<String, String>,
    driver: Box<dyn Driver>,
    outcome: Option<QueryOutcome>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

impl Session {
    /// Create a session with the given configuration and no driver attached.
    pub fn new(config: SessionConfig) -> Self {
        Session::with_driver(config, Box::new(NullDriver))
    }

    /// Create a session backed by the given driver.
    pub fn with_driver(config: SessionConfig, driver: Box<dyn Driver>) -> Self {
        let mut session = Session {
            config,
            access_mode: AccessMode::default(),
            replacements: IndexMap::new(),
            driver,
            outcome: None,
        };
        session.update_replacement();
        session
    }

    // configuration

    /// A copy of the current configuration.
    pub fn config(&self) -> SessionConfig {
        self.config.clone()
    }

    /// Replace the whole configuration and refresh the built-in
    /// replacement tokens.
    pub fn set_config(&mut self, config: SessionConfig) -> &mut Self {
        self.config = config;
        self.update_replacement();
        self
    }

    /// Close the connection and return to the default configuration.
    pub fn reset_config(&mut self) -> &mut Self {
        self.close();
        self.config = SessionConfig::default();
        self.update_replacement();
        self
    }

    /// The access mode write statements are checked against.
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Switch between read-only and write access.
    pub fn set_access_mode(&mut self, mode: AccessMode) -> &mut Self {
        self.access_mode = mode;
        self
    }

    /// Hostname in the `host:port` form, the port left out when it is
    /// the default one.
    pub fn connection_hostname(&self) -> String {
        self.config.connection_hostname()
    }

    /// Look up a configuration value by option name.
    pub fn option(&self, name: &str) -> Result<Value> {
        match name {
            "hostname" => Ok(Value::from(self.config.hostname.as_str())),
            "port" => Ok(Value::from(i64::from(self.config.port))),
            "username" => Ok(Value::from(self.config.username.as_str())),
            "password" => Ok(Value::from(self.config.password.as_str())),
            "database" => Ok(Value::from(self.config.database.as_str())),
            "prefix" => Ok(Value::from(self.config.prefix.as_str())),
            "type" | "connectiontype" => Ok(Value::from(self.access_mode.as_str())),
            "persistent" => Ok(Value::from(self.config.persistent)),
            "verbose" => Ok(Value::from(self.config.verbose)),
            "format" => Ok(Value::from(self.config.format)),
            _ => {
                self.unknown_option(name)?;
                Ok(Value::Null)
            }
        }
    }

    /// Apply a configuration value by option name. False means the value
    /// had the wrong shape for the option and nothing was changed.
    pub fn set_option(&mut self, name: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();

        let applied = match name {
            "hostname" | "username" | "password" => match value {
                Value::String(text) => {
                    match name {
                        "hostname" => self.config.hostname = text,
                        "username" => self.config.username = text,
                        _ => self.config.password = text,
                    }
                    true
                }
                _ => false,
            },
            "database" | "prefix" => match value {
                Value::String(text) => {
                    if name == "database" {
                        self.config.database = text;
                    } else {
                        self.config.prefix = text;
                    }
                    self.update_replacement();
                    true
                }
                _ => false,
            },
            "port" => {
                let port = match &value {
                    Value::I32(number) => u16::try_from(*number).ok(),
                    Value::I64(number) => u16::try_from(*number).ok(),
                    Value::String(text) => text.parse::<u16>().ok(),
                    _ => None,
                };
                match port {
                    Some(port) => {
                        self.config.port = port;
                        true
                    }
                    None => false,
                }
            }
            "persistent" | "verbose" | "format" => match value {
                Value::Bool(flag) => {
                    match name {
                        "persistent" => self.config.persistent = flag,
                        "verbose" => self.config.verbose = flag,
                        _ => self.config.format = flag,
                    }
                    true
                }
                _ => false,
            },
            "type" | "connectiontype" => match &value {
                Value::String(text) => match AccessMode::from_option(text) {
                    Some(mode) => {
                        self.access_mode = mode;
                        true
                    }
                    None => false,
                },
                _ => false,
            },
            _ => {
                self.unknown_option(name)?;
                false
            }
        };

        Ok(applied)
    }

    fn unknown_option(&self, name: &str) -> Result<()> {
        if self.config.verbose {
            return Err(Error::unknown_option(name));
        }
        tracing::warn!("unknown session option '{}'", name);
        Ok(())
    }

    // replacement tokens

    /// Apply all replacement tokens to a query string, in registration
    /// order.
    pub fn replace_query(&self, query: &str) -> String {
        let mut replaced = query.to_string();
        for (token, value) in &self.replacements {
            replaced = replaced.replace(token.as_str(), value);
        }
        replaced
    }

    /// Register a replacement token. Empty tokens and tokens replacing
    /// themselves are refused.
    pub fn add_replacement(&mut self, token: &str, value: &str) -> bool {
        if !token.is_empty() && token != value {
            self.replacements
                .insert(token.to_string(), value.to_string());
            return true;
        }
        false
    }

    /// Drop a replacement token.
    pub fn remove_replacement(&mut self, token: &str) {
        self.replacements.shift_remove(token);
    }

    /// Refresh the built-in database and prefix tokens, keeping any
    /// custom ones.
    fn update_replacement(&mut self) {
        self.replacements
            .insert("{DB}".to_string(), self.config.database.clone());
        self.replacements
            .insert("{DATABASE}".to_string(), self.config.database.clone());
        self.replacements
            .insert("{PRE}".to_string(), self.config.prefix.clone());
        self.replacements
            .insert("{PREFIX}".to_string(), self.config.prefix.clone());
    }

    // connection

    /// Open the connection, closing any previous one, and select the
    /// configured database.
    pub fn connect(&mut self) -> Result<bool> {
        self.close();

        if let Err(error) = self.driver.connect(&self.config) {
            return self.failure(error);
        }

        if let Err(error) = self.driver.select_database(&self.config.database) {
            return self.failure(error);
        }

        Ok(true)
    }

    /// Alias of [`connect`](Session::connect).
    pub fn reconnect(&mut self) -> Result<bool> {
        self.connect()
    }

    /// Close the connection; true when one was open.
    pub fn close(&mut self) -> bool {
        self.driver.disconnect()
    }

    /// Whether the connection is open and responsive.
    pub fn is_connected(&mut self) -> bool {
        self.driver.ping()
    }

    /// Alias of [`is_connected`](Session::is_connected).
    pub fn ping(&mut self) -> bool {
        self.is_connected()
    }

    // queries

    /// Run a query string against the database. Replacement tokens are
    /// applied first and read-mode sessions refuse write statements.
    /// True means the query ran and its outcome was stored.
    pub fn query(&mut self, query: &str) -> Result<bool> {
        if query.is_empty() {
            return Ok(false);
        }

        let query = self.replace_query(query);

        if !self.has_query_permission(&query) {
            return self.failure(Error::permission_denied(&query));
        }

        tracing::debug!("executing query: {}", query);

        match self.driver.execute(&query) {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                Ok(true)
            }
            Err(error) => self.failure(error),
        }
    }

    /// Alias of [`query`](Session::query).
    pub fn qry(&mut self, query: &str) -> Result<bool> {
        self.query(query)
    }

    fn has_query_permission(&self, query: &str) -> bool {
        if self.access_mode == AccessMode::Write {
            return true;
        }
        !(WRITE_STATEMENT.is_match(query) || SCHEMA_STATEMENT.is_match(query))
    }

    // in verbose mode a failure is a hard error, otherwise it is logged
    // and reported as false
    fn failure(&self, error: Error) -> Result<bool> {
        if self.config.verbose {
            return Err(error);
        }
        tracing::warn!("{}", error);
        Ok(false)
    }

    // results

    /// The stored outcome of the last query.
    pub fn outcome(&self) -> Option<&QueryOutcome> {
        self.outcome.as_ref()
    }

    /// Number of rows in the stored result, 0 when none is held.
    pub fn num_rows(&self) -> u64 {
        self.outcome.as_ref().map_or(0, QueryOutcome::num_rows)
    }

    /// Rows affected by the last write statement.
    pub fn affected_rows(&self) -> u64 {
        self.driver.affected_rows()
    }

    /// Auto-increment id assigned by the last insert.
    pub fn last_id(&self) -> u64 {
        self.driver.last_insert_id()
    }

    /// Alias of [`last_id`](Session::last_id).
    pub fn last_insert_id(&self) -> u64 {
        self.last_id()
    }

    /// Drop the stored result; true when one was held.
    pub fn free_result(&mut self) -> bool {
        self.outcome.take().is_some()
    }

    /// Take the rows of the stored result, freeing it.
    pub fn rows(&mut self) -> Vec<Row> {
        if let Some(QueryOutcome::Rows(rows)) = self.outcome.take() {
            rows
        } else {
            Vec::new()
        }
    }

    /// Take the stored result as a collection of items, keyed by their
    /// `id` column where one is present.
    pub fn collection(&mut self) -> Result<Collection> {
        let mut collection = Collection::new();

        for row in self.rows() {
            collection.add_item(CollectionItem::from_data(row))?;
        }

        Ok(collection)
    }

    // escaping

    /// Escape and quote a value for inclusion in a query.
    pub fn escape(&self, value: &Value) -> String {
        self.driver.escaper().escape(value)
    }

    /// Alias of [`escape`](Session::escape).
    pub fn e(&self, value: &Value) -> String {
        self.escape(value)
    }

    // query builders

    fn context(&self) -> QueryContext {
        QueryContext::new(self.config.format, self.config.verbose)
    }

    /// Start a SELECT query with this session's render settings.
    pub fn select(&self) -> SelectBuilder {
        SelectBuilder::new(self.context())
    }

    /// Start an INSERT query against the given table.
    pub fn insert(&self, table: &str) -> InsertBuilder {
        let mut insert = InsertBuilder::new(self.context());
        insert.table(table);
        insert
    }

    /// Alias of [`insert`](Session::insert).
    pub fn insert_into(&self, table: &str) -> InsertBuilder {
        self.insert(table)
    }

    /// Start a REPLACE query against the given table.
    pub fn replace(&self, table: &str) -> ReplaceBuilder {
        let mut replace = ReplaceBuilder::new(self.context());
        replace.table(table);
        replace
    }

    /// Alias of [`replace`](Session::replace).
    pub fn replace_into(&self, table: &str) -> ReplaceBuilder {
        self.replace(table)
    }

    /// Start an UPDATE query against the given tables.
    pub fn update(&self, tables: impl IntoTables) -> UpdateBuilder {
        let mut update = UpdateBuilder::new(self.context());
        update.table(tables);
        update
    }

    /// Start a DELETE query against the given tables.
    pub fn delete(&self, tables: impl IntoTables) -> DeleteBuilder {
        let mut delete = DeleteBuilder::new(self.context());
        delete.table(tables);
        delete
    }

    /// Alias of [`delete`](Session::delete).
    pub fn delete_from(&self, tables: impl IntoTables) -> DeleteBuilder {
        self.delete(tables)
    }

    /// Start a TRUNCATE query against the given table.
    pub fn truncate(&self, table: &str) -> TruncateBuilder {
        let mut truncate = TruncateBuilder::new(self.context());
        truncate.table(table);
        truncate
    }

    /// Alias of [`truncate`](Session::truncate).
    pub fn truncate_table(&self, table: &str) -> TruncateBuilder {
        self.truncate(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Statement;
    use crate::driver::test_support::RecordingDriver;
    use indexmap::indexmap;

    fn verbose_config() -> SessionConfig {
        SessionConfig {
            verbose: true,
            ..Default::default()
        }
    }

    fn user_row(id: i32, name: &str) -> Row {
        indexmap! {
            "id".to_string() => Value::from(id),
            "name".to_string() => Value::from(name),
        }
    }

    #[test]
    fn test_default_options() {
        let session = Session::default();

        assert_eq!(
            session.option("hostname").unwrap(),
            Value::from("localhost")
        );
        assert_eq!(session.option("port").unwrap(), Value::I64(3306));
        assert_eq!(session.option("username").unwrap(), Value::from("root"));
        assert_eq!(session.option("type").unwrap(), Value::from("w"));
        assert_eq!(session.option("persistent").unwrap(), Value::Bool(true));
        assert_eq!(session.option("verbose").unwrap(), Value::Bool(false));
        assert_eq!(session.connection_hostname(), "localhost");
    }

    #[test]
    fn test_set_option_checks_the_value_shape() {
        let mut session = Session::default();

        assert!(session.set_option("port", 3307).unwrap());
        assert_eq!(session.option("port").unwrap(), Value::I64(3307));
        assert!(!session.set_option("port", "not a number").unwrap());
        assert!(!session.set_option("port", true).unwrap());
        assert!(session.set_option("port", "3308").unwrap());
        assert_eq!(session.option("port").unwrap(), Value::I64(3308));

        assert!(session.set_option("hostname", "db.example.org").unwrap());
        assert_eq!(session.connection_hostname(), "db.example.org:3308");
        assert!(!session.set_option("hostname", 12).unwrap());

        assert!(!session.set_option("verbose", "yes").unwrap());
        assert!(session.set_option("format", true).unwrap());

        assert!(session.set_option("type", "read").unwrap());
        assert_eq!(session.access_mode(), AccessMode::Read);
        assert!(session.set_option("connectiontype", "w").unwrap());
        assert_eq!(session.access_mode(), AccessMode::Write);
        assert!(!session.set_option("type", "admin").unwrap());
    }

    #[test]
    fn test_unknown_option_follows_the_error_policy() {
        let mut session = Session::default();
        assert!(!session.set_option("charset", "utf8").unwrap());
        assert_eq!(session.option("charset").unwrap(), Value::Null);

        session.set_option("verbose", true).unwrap();
        let error = session.set_option("charset", "utf8").unwrap_err();
        assert_eq!(error.to_string(), "unknown session option 'charset'");
        assert!(session.option("charset").is_err());
    }

    #[test]
    fn test_replacement_tokens() {
        let mut session = Session::default();
        session.set_option("database", "shop").unwrap();
        session.set_option("prefix", "app_").unwrap();

        assert_eq!(
            session.replace_query("SELECT * FROM {DB}.{PRE}users"),
            "SELECT * FROM shop.app_users"
        );
        assert_eq!(
            session.replace_query("USE {DATABASE}; -- {PREFIX}"),
            "USE shop; -- app_"
        );

        assert!(session.add_replacement("{NOW}", "NOW()"));
        assert!(!session.add_replacement("", "nothing"));
        assert!(!session.add_replacement("{SAME}", "{SAME}"));
        assert_eq!(session.replace_query("SET ts = {NOW}"), "SET ts = NOW()");

        // built-in tokens survive a reconfiguration, custom ones too
        session.set_option("prefix", "v2_").unwrap();
        assert_eq!(
            session.replace_query("{PRE}log {NOW}"),
            "v2_log NOW()"
        );

        session.remove_replacement("{NOW}");
        assert_eq!(session.replace_query("{NOW}"), "{NOW}");
    }

    #[test]
    fn test_connect_and_close() {
        let mut session =
            Session::with_driver(SessionConfig::default(), Box::new(RecordingDriver::default()));

        assert!(session.connect().unwrap());
        assert!(session.is_connected());
        assert!(session.ping());
        assert!(session.close());
        assert!(!session.is_connected());
        assert!(!session.close());
    }

    #[test]
    fn test_connect_without_a_driver() {
        let mut quiet = Session::default();
        assert!(!quiet.connect().unwrap());

        let mut verbose = Session::new(verbose_config());
        let error = verbose.connect().unwrap_err();
        assert_eq!(
            error.to_string(),
            "connection could not be established, reason: no driver configured"
        );
    }

    #[test]
    fn test_query_stores_the_outcome() {
        let driver = RecordingDriver::with_rows(vec![user_row(1, "ada"), user_row(2, "grace")]);
        let log = driver.log();
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));

        assert!(session.query("SELECT * FROM users ").unwrap());
        assert_eq!(log.borrow().as_slice(), ["SELECT * FROM users "]);
        assert_eq!(session.num_rows(), 2);

        let rows = session.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], Value::from("grace"));

        // fetching frees the stored result
        assert_eq!(session.num_rows(), 0);
        assert!(!session.free_result());
    }

    #[test]
    fn test_query_applies_replacements_first() {
        let driver = RecordingDriver::default();
        let log = driver.log();
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));
        session.set_option("prefix", "app_").unwrap();

        assert!(session.query("SELECT * FROM {PRE}users ").unwrap());
        assert_eq!(log.borrow().as_slice(), ["SELECT * FROM app_users "]);
    }

    #[test]
    fn test_empty_query_is_refused() {
        let mut session = Session::default();
        assert!(!session.query("").unwrap());
        assert_eq!(session.num_rows(), 0);
    }

    #[test]
    fn test_read_mode_refuses_write_statements() {
        let driver = RecordingDriver::default();
        let log = driver.log();
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));
        session.set_access_mode(AccessMode::Read);

        assert!(!session.query("DELETE FROM users WHERE id = 1 ").unwrap());
        assert!(!session.query("UPDATE users SET active = 0 ").unwrap());
        assert!(!session.query("INSERT INTO users (id) VALUES (1) ").unwrap());
        assert!(!session.query("DROP TABLE users ").unwrap());
        assert!(!session.query("CREATE TABLE users (id INT) ").unwrap());
        assert!(log.borrow().is_empty());

        assert!(session.query("SELECT * FROM users ").unwrap());
        assert_eq!(log.borrow().len(), 1);

        session.set_access_mode(AccessMode::Write);
        assert!(session.query("DELETE FROM users WHERE id = 1 ").unwrap());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_read_mode_error_in_verbose_sessions() {
        let mut session =
            Session::with_driver(verbose_config(), Box::new(RecordingDriver::default()));
        session.set_access_mode(AccessMode::Read);

        let error = session.query("DELETE FROM users ").unwrap_err();
        assert_eq!(
            error.to_string(),
            "the session doesn't have the permission for this query, change the access mode to 'write' first"
        );
    }

    #[test]
    fn test_affected_outcome() {
        let driver = RecordingDriver {
            affected: 3,
            last_id: 17,
            ..Default::default()
        };
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));

        assert!(session.query("UPDATE users SET active = 1 ").unwrap());
        assert_eq!(session.outcome(), Some(&QueryOutcome::Affected(3)));
        assert_eq!(session.num_rows(), 0);
        assert_eq!(session.affected_rows(), 3);
        assert_eq!(session.last_id(), 17);
        assert_eq!(session.last_insert_id(), 17);
        assert!(session.rows().is_empty());
    }

    #[test]
    fn test_collection_from_the_stored_result() {
        let driver = RecordingDriver::with_rows(vec![user_row(7, "ada"), user_row(9, "grace")]);
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));

        session.query("SELECT * FROM users ").unwrap();
        let collection = session.collection().unwrap();

        assert_eq!(collection.size(), 2);
        assert_eq!(
            collection.item_by_id("9").unwrap().get_data("name"),
            Value::from("grace")
        );
        assert_eq!(session.num_rows(), 0);
    }

    #[test]
    fn test_collection_with_duplicate_ids() {
        let driver = RecordingDriver::with_rows(vec![user_row(7, "ada"), user_row(7, "twin")]);
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));

        session.query("SELECT * FROM users ").unwrap();
        let error = session.collection().unwrap_err();
        assert_eq!(
            error.to_string(),
            "item with the same id '7' already exists"
        );
    }

    #[test]
    fn test_escape_goes_through_the_driver() {
        let session = Session::default();
        assert_eq!(session.escape(&Value::from("o'brien")), "'o\\'brien'");
        assert_eq!(session.e(&Value::from(5)), "5");
    }

    #[test]
    fn test_builders_inherit_the_render_settings() {
        let mut session = Session::default();

        let mut select = session.select();
        select.from("users");
        assert_eq!(select.build(0), Some("SELECT * FROM users ".to_string()));

        session.set_option("format", true).unwrap();
        let mut select = session.select();
        select.from("users");
        assert_eq!(
            select.build(0),
            Some("SELECT \n    *\nFROM \n    users \n".to_string())
        );
    }

    #[test]
    fn test_builder_factories() {
        let session = Session::default();

        let mut insert = session.insert("users");
        insert
            .columns("name")
            .unwrap()
            .values(vec![Value::from("ada")])
            .unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO users (name) VALUES ('ada') ".to_string())
        );

        let mut replace = session.replace_into("users");
        replace.set("name = 'ada'").unwrap();
        assert_eq!(
            replace.build(0),
            Some("REPLACE INTO users SET name = 'ada' ".to_string())
        );

        let mut update = session.update("users");
        update.set("active = 1").where_("id = 3");
        assert_eq!(
            update.build(0),
            Some("UPDATE users SET active = 1 WHERE id = 3 ".to_string())
        );

        let mut delete = session.delete_from("users");
        delete.where_("id = 3");
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM users WHERE id = 3 ".to_string())
        );

        assert_eq!(
            session.truncate_table("sessions").build(0),
            Some("TRUNCATE TABLE sessions".to_string())
        );
    }

    #[test]
    fn test_statement_run_through_the_session() {
        let driver = RecordingDriver::with_rows(vec![user_row(1, "ada")]);
        let log = driver.log();
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));
        session.set_option("prefix", "app_").unwrap();

        let mut select = session.select();
        select.from("{PRE}users").where_("id = 1");

        assert_eq!(
            select.get_query(&session),
            Some("SELECT * FROM app_users WHERE id = 1 ".to_string())
        );

        select.run(&mut session).unwrap();
        assert_eq!(log.borrow().as_slice(), ["SELECT * FROM app_users WHERE id = 1 "]);
        assert_eq!(session.num_rows(), 1);

        let outcome = select.run_raw(&mut session).unwrap();
        assert_eq!(outcome.num_rows(), 1);
    }

    #[test]
    fn test_reset_config_closes_the_connection() {
        let driver = RecordingDriver::default();
        let mut session = Session::with_driver(SessionConfig::default(), Box::new(driver));

        session.connect().unwrap();
        session.set_option("database", "shop").unwrap();
        session.reset_config();

        assert!(!session.is_connected());
        assert_eq!(session.option("database").unwrap(), Value::from(""));
        assert_eq!(session.replace_query("{DB}"), "");
    }
}
