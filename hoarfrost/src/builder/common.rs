//! Common types and plumbing shared across all query builders

use crate::builder::select::SelectBuilder;
use crate::driver::QueryOutcome;
use crate::error::{Error, Result};
use crate::escape::Escaper;
use crate::session::Session;
use crate::value::Value;

/// Render settings every builder carries, copied from the session at
/// creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryContext {
    /// Render multi-line formatted output instead of the compact single line
    pub format: bool,
    /// Raise hard errors instead of logging and returning sentinels
    pub verbose: bool,
    /// Literal escaper used for bound values
    pub escaper: Escaper,
}

impl QueryContext {
    /// Create a context with the given render and error modes.
    pub fn new(format: bool, verbose: bool) -> Self {
        QueryContext {
            format,
            verbose,
            escaper: Escaper,
        }
    }

    /// Route a construction problem through the error policy: hard error in
    /// verbose mode, logged warning otherwise.
    pub(crate) fn construction_error(&self, message: &str) -> Result<()> {
        if self.verbose {
            return Err(Error::construction(message));
        }

        tracing::warn!("could not create the query, reason: {}", message);
        Ok(())
    }

    /// Substitute a bound value into a condition template. Lists are escaped
    /// per element and joined on the placeholder, scalars replace it directly.
    pub(crate) fn bind_condition(&self, condition: &str, value: Value, keywords: &[&str]) -> String {
        match value {
            Value::Array(values) => {
                substitute_list(condition, &values, self.escaper, self.format, keywords)
            }
            other => condition.replace('?', &self.escaper.escape(&other)),
        }
    }
}

/// How two adjacent conditions are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    And,
    Or,
}

impl Relation {
    /// The SQL keyword for this relation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::And => "AND",
            Relation::Or => "OR",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction for ORDER BY and GROUP BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All join kinds the SELECT builder supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Join,
    StraightJoin,
    Left,
    Right,
    Inner,
    Cross,
    LeftOuter,
    RightOuter,
    Natural,
    NaturalLeft,
    NaturalLeftOuter,
    NaturalRight,
    NaturalRightOuter,
}

impl JoinKind {
    /// The SQL keyword sequence for this join kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Join => "JOIN",
            JoinKind::StraightJoin => "STRAIGHT_JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::Natural => "NATURAL JOIN",
            JoinKind::NaturalLeft => "NATURAL LEFT JOIN",
            JoinKind::NaturalLeftOuter => "NATURAL LEFT OUTER JOIN",
            JoinKind::NaturalRight => "NATURAL RIGHT JOIN",
            JoinKind::NaturalRightOuter => "NATURAL RIGHT OUTER JOIN",
        }
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single condition inside a WHERE or HAVING list
#[derive(Debug, Clone)]
pub enum Fragment {
    /// Raw or already-substituted condition text
    Literal(String),
    /// A condition whose `?` placeholder is filled with a subquery at
    /// render time
    Nested {
        template: String,
        query: Box<SelectBuilder>,
    },
}

/// Ordered conditions with the relation that connects each one to its
/// successor. The relation stored on the final entry is never rendered.
#[derive(Debug, Clone, Default)]
pub struct ConditionList {
    entries: Vec<(Fragment, Relation)>,
}

impl ConditionList {
    /// Whether no condition has been added yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a condition, connected to any successor with AND.
    pub fn push(&mut self, fragment: Fragment) {
        self.entries.push((fragment, Relation::And));
    }

    /// Turn the connection stored on the previous condition into OR.
    pub fn or_last(&mut self) {
        if let Some(entry) = self.entries.last_mut() {
            entry.1 = Relation::Or;
        }
    }

    /// Render all conditions on one line, relations in between.
    pub(crate) fn render_compact(&mut self) -> String {
        let count = self.entries.len();
        let mut parts = Vec::new();

        for (index, (fragment, relation)) in self.entries.iter_mut().enumerate() {
            match fragment {
                Fragment::Literal(condition) => parts.push(condition.clone()),
                Fragment::Nested { template, query } => {
                    let nested = query.build(0).unwrap_or_default();
                    parts.push(template.replace('?', &format!("({})", nested)));
                }
            }

            if index + 1 < count {
                parts.push(relation.as_str().to_string());
            }
        }

        parts.join(" ")
    }

    /// Render all conditions indented below their clause keyword, relations
    /// on their own lines. Subqueries are rebuilt four columns deeper and
    /// trimmed.
    pub(crate) fn render_formatted(&mut self, format_offset: usize) -> String {
        let offset = " ".repeat(format_offset);
        let count = self.entries.len();
        let mut output = String::new();

        for (index, (fragment, relation)) in self.entries.iter_mut().enumerate() {
            match fragment {
                Fragment::Literal(condition) => {
                    output.push_str(&format!("{}    {}", offset, condition));
                }
                Fragment::Nested { template, query } => {
                    let nested = query.build(format_offset + 4).unwrap_or_default();
                    let filler = format!("\n{}    ({})", offset, nested.trim());
                    output.push_str(&format!("{}    {}", offset, template.replace('?', &filler)));
                }
            }

            if index + 1 < count {
                output.push_str(&format!(" \n{}{} ", offset, relation.as_str()));
            }

            output.push_str(" \n");
        }

        output
    }
}

/// Escape a list of bound values and substitute them into the `?`
/// placeholder of a condition template. Formatted mode spreads the listed
/// `KEYWORD(?)` shorthands over multiple lines first.
pub(crate) fn substitute_list(
    template: &str,
    values: &[Value],
    escaper: Escaper,
    format: bool,
    keywords: &[&str],
) -> String {
    let mut condition = template.to_string();

    if format {
        for keyword in keywords {
            let flat = format!("{}(?)", keyword);
            let spread = format!("\n{}\n(\n    ?\n)", keyword);
            condition = condition.replace(&flat, &spread);
        }
    }

    let escaped: Vec<String> = values.iter().map(|value| escaper.escape(value)).collect();
    let glue = if format { ",\n    " } else { "," };

    condition.replace('?', &escaped.join(glue))
}

/// Trait to convert various types into a table name list
pub trait IntoTables {
    fn into_tables(self) -> Vec<String>;
}

impl IntoTables for &str {
    fn into_tables(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoTables for String {
    fn into_tables(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoTables for Vec<String> {
    fn into_tables(self) -> Vec<String> {
        self
    }
}

impl IntoTables for Vec<&str> {
    fn into_tables(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

// For tuples
impl IntoTables for (&str, &str) {
    fn into_tables(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoTables for (&str, &str, &str) {
    fn into_tables(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

impl IntoTables for (&str, &str, &str, &str) {
    fn into_tables(self) -> Vec<String> {
        vec![
            self.0.to_string(),
            self.1.to_string(),
            self.2.to_string(),
            self.3.to_string(),
        ]
    }
}

/// Trait to convert various types into a column name list
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

// For tuples
impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![
            self.0.to_string(),
            self.1.to_string(),
            self.2.to_string(),
            self.3.to_string(),
        ]
    }
}

/// Shared lifecycle of every statement builder
pub trait Statement {
    /// Render the query string, or `None` when no target is set. The given
    /// offset is added onto the instance's indentation accumulator before
    /// rendering.
    fn build(&mut self, format_offset: usize) -> Option<String>;

    /// Clear all collected options and adopt the given render mode.
    fn reset_query(&mut self, format: bool);

    /// Build the query and apply the session's replacement tokens.
    fn get_query(&mut self, session: &Session) -> Option<String> {
        let query = self.build(0)?;
        Some(session.replace_query(&query))
    }

    /// Print the final query to stdout, followed by a blank line.
    fn show_query(&mut self, session: &Session) -> &mut Self
    where
        Self: Sized,
    {
        let query = self.get_query(session).unwrap_or_default();
        println!("{}\n", query);
        self
    }

    /// Build the query and run it against the session, handing the session
    /// back for chained result access.
    fn run<'a>(&mut self, session: &'a mut Session) -> Result<&'a mut Session> {
        let query = self.build(0).unwrap_or_default();
        session.query(&query)?;
        Ok(session)
    }

    /// Alias of `run`.
    fn execute<'a>(&mut self, session: &'a mut Session) -> Result<&'a mut Session> {
        self.run(session)
    }

    /// Run the query and hand back the stored outcome instead of the session.
    fn run_raw(&mut self, session: &mut Session) -> Result<QueryOutcome> {
        self.run(session)?;
        session.outcome().cloned().ok_or(Error::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_keywords() {
        assert_eq!(Relation::And.as_str(), "AND");
        assert_eq!(Relation::Or.to_string(), "OR");
    }

    #[test]
    fn test_join_kind_keywords() {
        assert_eq!(JoinKind::Join.as_str(), "JOIN");
        assert_eq!(JoinKind::StraightJoin.as_str(), "STRAIGHT_JOIN");
        assert_eq!(JoinKind::NaturalLeftOuter.as_str(), "NATURAL LEFT OUTER JOIN");
        assert_eq!(JoinKind::Cross.to_string(), "CROSS JOIN");
    }

    #[test]
    fn test_condition_list_compact() {
        let mut list = ConditionList::default();
        list.push(Fragment::Literal("a = 1".to_string()));
        list.push(Fragment::Literal("b = 2".to_string()));
        assert_eq!(list.render_compact(), "a = 1 AND b = 2");

        list.or_last();
        list.push(Fragment::Literal("c = 3".to_string()));
        assert_eq!(list.render_compact(), "a = 1 AND b = 2 OR c = 3");
    }

    #[test]
    fn test_substitute_list_compact() {
        let values = vec![Value::from(1), Value::from("x")];
        let condition = substitute_list("id IN(?)", &values, Escaper, false, &["IN"]);
        assert_eq!(condition, "id IN(1,'x')");
    }

    #[test]
    fn test_substitute_list_formatted() {
        let values = vec![Value::from(1), Value::from(2)];
        let condition = substitute_list("id IN(?)", &values, Escaper, true, &["IN"]);
        assert_eq!(condition, "id \nIN\n(\n    1,\n    2\n)");
    }

    #[test]
    fn test_into_tables_implementations() {
        assert_eq!("users".into_tables(), vec!["users"]);
        assert_eq!(("users", "posts").into_tables(), vec!["users", "posts"]);
        assert_eq!(vec!["a", "b"].into_tables(), vec!["a", "b"]);
    }
}
