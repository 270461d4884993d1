//! INSERT query builder

use indexmap::IndexMap;

use crate::builder::common::{IntoColumns, QueryContext, Statement};
use crate::builder::select::SelectBuilder;
use crate::error::Result;
use crate::value::Value;

pub(crate) const MESSAGE_AFTER_FIELDS: &str =
    "you cannot add columns after using 'set' or 'select'";
pub(crate) const MESSAGE_AFTER_SET: &str = "you cannot use 'set' after adding columns or a select";
pub(crate) const MESSAGE_AFTER_SELECT: &str =
    "you cannot use 'select' after adding values or 'set'";
pub(crate) const MESSAGE_BEFORE_VALUES: &str =
    "you have to specify a column list before adding values";
pub(crate) const MESSAGE_VALUES_COUNT: &str = "value count doesn't match columns";
pub(crate) const MESSAGE_VALUES_MISSING: &str = "columns not found in values";

/// The sub-source of an INSERT ... SELECT
#[derive(Debug, Clone)]
pub(crate) enum SelectSource {
    Text(String),
    Select(Box<SelectBuilder>),
}

/// Columns plus one of the three mutually exclusive content sources of a
/// row-writing statement: VALUES rows, SET assignments, or a SELECT.
/// Shared between the INSERT and REPLACE builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteBody {
    columns: Vec<String>,
    values: Vec<Vec<String>>,
    set: Vec<String>,
    select: Option<SelectSource>,
}

impl WriteBody {
    /// Add columns, skipping duplicates. Rejected once SET or SELECT is used.
    pub(crate) fn add_columns(
        &mut self,
        context: &QueryContext,
        columns: Vec<String>,
    ) -> Result<()> {
        if !self.set.is_empty() || self.select.is_some() {
            return context.construction_error(MESSAGE_AFTER_FIELDS);
        }

        for column in columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }

        Ok(())
    }

    /// Add one positional VALUES row. The value count has to match the
    /// column count exactly.
    pub(crate) fn add_values(&mut self, context: &QueryContext, values: Vec<Value>) -> Result<()> {
        if self.columns.is_empty() {
            return context.construction_error(MESSAGE_BEFORE_VALUES);
        }
        if !self.set.is_empty() || self.select.is_some() {
            return context.construction_error(MESSAGE_AFTER_FIELDS);
        }

        if values.len() < self.columns.len() {
            return context.construction_error(MESSAGE_VALUES_COUNT);
        }
        if values.len() > self.columns.len() {
            return context.construction_error(MESSAGE_VALUES_MISSING);
        }

        let row = values
            .iter()
            .map(|value| context.escaper.escape(value))
            .collect();
        self.values.push(row);

        Ok(())
    }

    /// Add a named VALUES row, picking the values out in column order.
    /// Surplus entries are ignored, missing columns are an error.
    pub(crate) fn add_values_map(
        &mut self,
        context: &QueryContext,
        values: IndexMap<String, Value>,
    ) -> Result<()> {
        if self.columns.is_empty() {
            return context.construction_error(MESSAGE_BEFORE_VALUES);
        }
        if !self.set.is_empty() || self.select.is_some() {
            return context.construction_error(MESSAGE_AFTER_FIELDS);
        }

        if values.len() < self.columns.len() {
            return context.construction_error(MESSAGE_VALUES_COUNT);
        }

        let mut row = Vec::new();
        for column in &self.columns {
            match values.get(column) {
                Some(value) => row.push(context.escaper.escape(value)),
                None => return context.construction_error(MESSAGE_VALUES_MISSING),
            }
        }

        self.values.push(row);

        Ok(())
    }

    /// Add a raw SET assignment. Rejected once columns or SELECT are used.
    pub(crate) fn add_set(&mut self, context: &QueryContext, assignment: String) -> Result<()> {
        if !self.columns.is_empty() || self.select.is_some() {
            return context.construction_error(MESSAGE_AFTER_SET);
        }

        self.set.push(assignment);

        Ok(())
    }

    /// Add a SET assignment with a bound value. A bare column name becomes
    /// `column = value`, otherwise every placeholder is substituted.
    pub(crate) fn add_set_bind(
        &mut self,
        context: &QueryContext,
        column: &str,
        value: &Value,
    ) -> Result<()> {
        if !self.columns.is_empty() || self.select.is_some() {
            return context.construction_error(MESSAGE_AFTER_SET);
        }

        let escaped = context.escaper.escape(value);
        let assignment = if !column.contains('?') && !column.contains('=') {
            format!("{} = {}", column, escaped)
        } else {
            column.replace('?', &escaped)
        };
        self.set.push(assignment);

        Ok(())
    }

    /// Use raw query text as the row source. Rejected once VALUES or SET
    /// are used.
    pub(crate) fn set_select_text(&mut self, context: &QueryContext, query: String) -> Result<()> {
        if !self.values.is_empty() || !self.set.is_empty() {
            return context.construction_error(MESSAGE_AFTER_SELECT);
        }

        self.select = Some(SelectSource::Text(query));

        Ok(())
    }

    /// Use a SELECT builder as the row source.
    pub(crate) fn set_select_query(
        &mut self,
        context: &QueryContext,
        query: SelectBuilder,
    ) -> Result<()> {
        if !self.values.is_empty() || !self.set.is_empty() {
            return context.construction_error(MESSAGE_AFTER_SELECT);
        }

        self.select = Some(SelectSource::Select(Box::new(query)));

        Ok(())
    }

    pub(crate) fn render_compact(&mut self) -> String {
        let mut query = String::new();

        // columns
        if !self.columns.is_empty() {
            query.push_str(&format!("({}) ", self.columns.join(",")));

            // values
            if !self.values.is_empty() {
                query.push_str("VALUES ");

                let rows: Vec<String> = self
                    .values
                    .iter()
                    .map(|row| format!("({})", row.join(",")))
                    .collect();
                query.push_str(&rows.join(","));
                query.push(' ');
            }
        }
        // set
        else if !self.set.is_empty() {
            query.push_str("SET ");
            query.push_str(&self.set.join(","));
            query.push(' ');
        }

        // select
        if let Some(select) = &mut self.select {
            let text = match select {
                SelectSource::Text(text) => text.clone(),
                SelectSource::Select(select) => select.build(0).unwrap_or_default(),
            };
            query.push_str(&format!("({}) ", text));
        }

        query
    }

    pub(crate) fn render_formatted(&mut self, format_offset: usize) -> String {
        let offset = " ".repeat(format_offset);
        let mut query = String::new();

        // columns
        if !self.columns.is_empty() {
            query.push_str(&format!("{}    (", offset));

            let count = self.columns.len();
            for (index, column) in self.columns.iter().enumerate() {
                query.push_str(&format!(" {}", column));
                if index + 1 < count {
                    query.push(',');
                }
            }

            query.push_str(" ) \n");

            // values
            if !self.values.is_empty() {
                query.push_str("VALUES\n");

                let count = self.values.len();
                for (index, row) in self.values.iter().enumerate() {
                    query.push_str(&format!("{}    ( {} )", offset, row.join(", ")));
                    if index + 1 < count {
                        query.push_str(",\n");
                    }
                }

                query.push('\n');
            }
        }
        // set
        else if !self.set.is_empty() {
            query.push_str("SET\n");

            let count = self.set.len();
            for (index, assignment) in self.set.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, assignment));
                if index + 1 < count {
                    query.push_str(", \n");
                }
            }

            query.push('\n');
        }

        // select
        if let Some(select) = &mut self.select {
            match select {
                SelectSource::Text(text) => {
                    query.push_str(&format!("{}    ( {} ) \n", offset, text));
                }
                SelectSource::Select(builder) => {
                    let built = builder.build(format_offset + 4).unwrap_or_default();
                    query.push_str(&format!("{}    ({}) \n", offset, built.trim()));
                }
            }
        }

        query
    }
}

/// Builder for INSERT statements.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    context: QueryContext,
    format_offset: usize,
    table: Option<String>,
    low_priority: bool,
    delayed: bool,
    high_priority: bool,
    ignore: bool,
    body: WriteBody,
    duplicates: Vec<String>,
}

impl InsertBuilder {
    /// Create an empty INSERT builder with the given context.
    pub fn new(context: QueryContext) -> Self {
        InsertBuilder {
            context,
            format_offset: 0,
            table: None,
            low_priority: false,
            delayed: false,
            high_priority: false,
            ignore: false,
            body: WriteBody::default(),
            duplicates: Vec::new(),
        }
    }

    /// Set the target table.
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    /// Add LOW_PRIORITY to the query, clearing DELAYED and HIGH_PRIORITY.
    pub fn low_priority(&mut self, low_priority: bool) -> &mut Self {
        if low_priority {
            self.delayed = false;
            self.high_priority = false;
        }

        self.low_priority = low_priority;
        self
    }

    /// Add DELAYED to the query, clearing LOW_PRIORITY and HIGH_PRIORITY.
    pub fn delayed(&mut self, delayed: bool) -> &mut Self {
        if delayed {
            self.low_priority = false;
            self.high_priority = false;
        }

        self.delayed = delayed;
        self
    }

    /// Add HIGH_PRIORITY to the query, clearing LOW_PRIORITY and DELAYED.
    pub fn high_priority(&mut self, high_priority: bool) -> &mut Self {
        if high_priority {
            self.low_priority = false;
            self.delayed = false;
        }

        self.high_priority = high_priority;
        self
    }

    /// Add IGNORE to the query.
    pub fn ignore(&mut self, ignore: bool) -> &mut Self {
        self.ignore = ignore;
        self
    }

    /// Add columns to the column list, skipping duplicates.
    pub fn columns(&mut self, columns: impl IntoColumns) -> Result<&mut Self> {
        self.body.add_columns(&self.context, columns.into_columns())?;
        Ok(self)
    }

    /// Alias of `columns`.
    pub fn fields(&mut self, fields: impl IntoColumns) -> Result<&mut Self> {
        self.columns(fields)
    }

    /// Add one positional row of values, escaped and matched against the
    /// column list.
    pub fn values(&mut self, values: Vec<Value>) -> Result<&mut Self> {
        self.body.add_values(&self.context, values)?;
        Ok(self)
    }

    /// Add one named row of values, picked out in column order.
    pub fn values_map(&mut self, values: IndexMap<String, Value>) -> Result<&mut Self> {
        self.body.add_values_map(&self.context, values)?;
        Ok(self)
    }

    /// Add a raw SET assignment.
    pub fn set(&mut self, assignment: &str) -> Result<&mut Self> {
        self.body.add_set(&self.context, assignment.to_string())?;
        Ok(self)
    }

    /// Add a SET assignment with a bound value.
    pub fn set_bind(&mut self, column: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.body.add_set_bind(&self.context, column, &value.into())?;
        Ok(self)
    }

    /// Use a SELECT builder as the row source.
    pub fn select(&mut self, query: SelectBuilder) -> Result<&mut Self> {
        self.body.set_select_query(&self.context, query)?;
        Ok(self)
    }

    /// Use raw query text as the row source.
    pub fn select_text(&mut self, query: &str) -> Result<&mut Self> {
        self.body.set_select_text(&self.context, query.to_string())?;
        Ok(self)
    }

    /// Add a raw ON DUPLICATE KEY UPDATE assignment.
    pub fn on_duplicate(&mut self, assignment: &str) -> &mut Self {
        self.duplicates.push(assignment.to_string());
        self
    }

    /// Add an ON DUPLICATE KEY UPDATE assignment with a bound value.
    pub fn on_duplicate_bind(&mut self, assignment: &str, value: impl Into<Value>) -> &mut Self {
        let escaped = self.context.escaper.escape(&value.into());
        self.duplicates.push(assignment.replace('?', &escaped));
        self
    }

    /// Alias of `on_duplicate`.
    pub fn duplicate(&mut self, assignment: &str) -> &mut Self {
        self.on_duplicate(assignment)
    }
}

impl Statement for InsertBuilder {
    fn build(&mut self, format_offset: usize) -> Option<String> {
        self.format_offset += format_offset;

        let table = self.table.clone()?;

        let query = if self.context.format {
            let offset = " ".repeat(self.format_offset);
            let mut query = format!("{}INSERT ", offset);

            // modifiers
            if self.low_priority {
                query.push_str(&format!("\n{}    LOW_PRIORITY ", offset));
            }
            if self.delayed {
                query.push_str(&format!("\n{}    DELAYED ", offset));
            }
            if self.high_priority {
                query.push_str(&format!("\n{}    HIGH_PRIORITY ", offset));
            }
            if self.ignore {
                query.push_str(&format!("\n{}    IGNORE \n", offset));
            }

            // table
            query.push_str(&format!("{}INTO ", offset));
            query.push_str(&format!("\n{}    {}\n", offset, table));

            query.push_str(&self.body.render_formatted(self.format_offset));

            // on duplicate
            if !self.duplicates.is_empty() {
                query.push_str("ON DUPLICATE KEY UPDATE \n");

                let count = self.duplicates.len();
                for (index, assignment) in self.duplicates.iter().enumerate() {
                    query.push_str(&format!("{}    {}", offset, assignment));
                    if index + 1 < count {
                        query.push(',');
                    }
                    query.push_str(" \n");
                }
            }

            query
        } else {
            let mut query = String::from("INSERT ");

            // modifiers
            if self.low_priority {
                query.push_str("LOW_PRIORITY ");
            }
            if self.delayed {
                query.push_str("DELAYED ");
            }
            if self.high_priority {
                query.push_str("HIGH_PRIORITY ");
            }
            if self.ignore {
                query.push_str("IGNORE ");
            }

            // table
            query.push_str("INTO ");
            query.push_str(&table);
            query.push(' ');

            query.push_str(&self.body.render_compact());

            // on duplicate
            if !self.duplicates.is_empty() {
                query.push_str("ON DUPLICATE KEY UPDATE ");
                query.push_str(&self.duplicates.join(","));
                query.push(' ');
            }

            query
        };

        Some(query)
    }

    fn reset_query(&mut self, format: bool) {
        let mut context = self.context;
        context.format = format;
        *self = InsertBuilder::new(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn compact(table: &str) -> InsertBuilder {
        let mut insert = InsertBuilder::new(QueryContext::new(false, true));
        insert.table(table);
        insert
    }

    #[test]
    fn test_simple_insert() {
        let mut insert = compact("t");
        insert
            .columns(("a", "b"))
            .unwrap()
            .values(vec![Value::from(1), Value::from("x")])
            .unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t (a,b) VALUES (1,'x') ".to_string())
        );
    }

    #[test]
    fn test_insert_without_table() {
        let mut insert = InsertBuilder::new(QueryContext::new(false, true));
        insert.columns("a").unwrap();
        assert_eq!(insert.build(0), None);
    }

    #[test]
    fn test_modifier_exclusion() {
        let mut insert = compact("t");
        insert
            .delayed(true)
            .low_priority(true)
            .ignore(true)
            .columns("a")
            .unwrap()
            .values(vec![Value::from(1)])
            .unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT LOW_PRIORITY IGNORE INTO t (a) VALUES (1) ".to_string())
        );
    }

    #[test]
    fn test_multiple_value_rows() {
        let mut insert = compact("t");
        insert.columns(("a", "b")).unwrap();
        insert.values(vec![Value::from(1), Value::from("x")]).unwrap();
        insert.values(vec![Value::from(2), Value::from("y")]).unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t (a,b) VALUES (1,'x'),(2,'y') ".to_string())
        );
    }

    #[test]
    fn test_duplicate_columns_are_skipped() {
        let mut insert = compact("t");
        insert.columns(("a", "b")).unwrap().columns("a").unwrap();
        insert.values(vec![Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t (a,b) VALUES (1,2) ".to_string())
        );
    }

    #[test]
    fn test_values_map_in_column_order() {
        let mut insert = compact("t");
        insert.columns(("a", "b")).unwrap();

        let mut row = IndexMap::new();
        row.insert("b".to_string(), Value::from("x"));
        row.insert("a".to_string(), Value::from(1));
        row.insert("ignored".to_string(), Value::from(true));
        insert.values_map(row).unwrap();

        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t (a,b) VALUES (1,'x') ".to_string())
        );
    }

    #[test]
    fn test_values_arity_errors() {
        let mut insert = compact("t");
        insert.columns(("a", "b")).unwrap();

        let err = insert.values(vec![Value::from(1)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: value count doesn't match columns"
        );

        let err = insert
            .values(vec![Value::from(1), Value::from(2), Value::from(3)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: columns not found in values"
        );

        let mut row = IndexMap::new();
        row.insert("a".to_string(), Value::from(1));
        row.insert("c".to_string(), Value::from(2));
        let err = insert.values_map(row).unwrap_err();
        assert!(matches!(err, Error::QueryConstruction { .. }));
    }

    #[test]
    fn test_values_before_columns() {
        let mut insert = compact("t");
        let err = insert.values(vec![Value::from(1)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you have to specify a column list before adding values"
        );
    }

    #[test]
    fn test_set_assignments() {
        let mut insert = compact("t");
        insert
            .set_bind("a", 1)
            .unwrap()
            .set_bind("b = ?", 2)
            .unwrap()
            .set("c = c + 1")
            .unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t SET a = 1,b = 2,c = c + 1 ".to_string())
        );
    }

    #[test]
    fn test_content_source_guards() {
        let mut insert = compact("t");
        insert.columns("a").unwrap();
        let err = insert.set("a = 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot use 'set' after adding columns or a select"
        );

        let mut insert = compact("t");
        insert.set("a = 1").unwrap();
        let err = insert.columns("b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot add columns after using 'set' or 'select'"
        );

        let mut insert = compact("t");
        insert.set("a = 1").unwrap();
        let mut source = SelectBuilder::new(QueryContext::new(false, true));
        source.from("src");
        let err = insert.select(source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot use 'select' after adding values or 'set'"
        );
    }

    #[test]
    fn test_insert_select() {
        let mut source = SelectBuilder::new(QueryContext::new(false, true));
        source.columns(("a", "b")).from("src");

        let mut insert = compact("t");
        insert.columns(("a", "b")).unwrap().select(source).unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t (a,b) (SELECT a,b FROM src ) ".to_string())
        );
    }

    #[test]
    fn test_on_duplicate() {
        let mut insert = compact("t");
        insert
            .columns("a")
            .unwrap()
            .values(vec![Value::from(1)])
            .unwrap()
            .on_duplicate_bind("a = ?", 2)
            .on_duplicate("b = b + 1");
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = 2,b = b + 1 ".to_string())
        );
    }

    #[test]
    fn test_non_verbose_errors_are_silent_no_ops() {
        let mut insert = InsertBuilder::new(QueryContext::new(false, false));
        insert.table("t");
        insert.columns(("a", "b")).unwrap();
        insert.values(vec![Value::from(1)]).unwrap();
        assert_eq!(insert.build(0), Some("INSERT INTO t (a,b) ".to_string()));
    }

    #[test]
    fn test_formatted_output() {
        let mut insert = InsertBuilder::new(QueryContext::new(true, true));
        insert.table("t");
        insert
            .columns(("a", "b"))
            .unwrap()
            .values(vec![Value::from(1), Value::from("x")])
            .unwrap();
        assert_eq!(
            insert.build(0),
            Some("INSERT INTO \n    t\n    ( a, b ) \nVALUES\n    ( 1, 'x' )\n".to_string())
        );
    }
}
