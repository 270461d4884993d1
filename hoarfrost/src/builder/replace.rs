//! REPLACE query builder

use indexmap::IndexMap;

use crate::builder::common::{IntoColumns, QueryContext, Statement};
use crate::builder::insert::WriteBody;
use crate::builder::select::SelectBuilder;
use crate::error::Result;
use crate::value::Value;

/// Builder for REPLACE statements. Works like INSERT but without the
/// HIGH_PRIORITY modifier and the ON DUPLICATE KEY UPDATE clause.
#[derive(Debug, Clone)]
pub struct ReplaceBuilder {
    context: QueryContext,
    format_offset: usize,
    table: Option<String>,
    low_priority: bool,
    delayed: bool,
    ignore: bool,
    body: WriteBody,
}

impl ReplaceBuilder {
    /// Create an empty REPLACE builder with the given context.
    pub fn new(context: QueryContext) -> Self {
        ReplaceBuilder {
            context,
            format_offset: 0,
            table: None,
            low_priority: false,
            delayed: false,
            ignore: false,
            body: WriteBody::default(),
        }
    }

    /// Set the target table.
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    /// Add LOW_PRIORITY to the query, clearing DELAYED.
    pub fn low_priority(&mut self, low_priority: bool) -> &mut Self {
        if low_priority {
            self.delayed = false;
        }

        self.low_priority = low_priority;
        self
    }

    /// Add DELAYED to the query, clearing LOW_PRIORITY.
    pub fn delayed(&mut self, delayed: bool) -> &mut Self {
        if delayed {
            self.low_priority = false;
        }

        self.delayed = delayed;
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
}

impl Statement for ReplaceBuilder {
    fn build(&mut self, format_offset: usize) -> Option<String> {
        self.format_offset += format_offset;

        let table = self.table.clone()?;

        let query = if self.context.format {
            let offset = " ".repeat(self.format_offset);
            let mut query = format!("{}REPLACE ", offset);

            // modifiers
            if self.low_priority {
                query.push_str(&format!("\n{}    LOW_PRIORITY ", offset));
            }
            if self.delayed {
                query.push_str(&format!("\n{}    DELAYED ", offset));
            }
            if self.ignore {
                query.push_str(&format!("\n{}    IGNORE \n", offset));
            }

            // table
            query.push_str(&format!("{}INTO ", offset));
            query.push_str(&format!("\n{}    {}\n", offset, table));

            query.push_str(&self.body.render_formatted(self.format_offset));

            query
        } else {
            let mut query = String::from("REPLACE ");

            // modifiers
            if self.low_priority {
                query.push_str("LOW_PRIORITY ");
            }
            if self.delayed {
                query.push_str("DELAYED ");
            }
            if self.ignore {
                query.push_str("IGNORE ");
            }

            // table
            query.push_str("INTO ");
            query.push_str(&table);
            query.push(' ');

            query.push_str(&self.body.render_compact());

            query
        };

        Some(query)
    }

    fn reset_query(&mut self, format: bool) {
        let mut context = self.context;
        context.format = format;
        *self = ReplaceBuilder::new(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replace() {
        let mut replace = ReplaceBuilder::new(QueryContext::new(false, true));
        replace.table("t");
        replace
            .columns(("a", "b"))
            .unwrap()
            .values(vec![Value::from(1), Value::from("x")])
            .unwrap();
        assert_eq!(
            replace.build(0),
            Some("REPLACE INTO t (a,b) VALUES (1,'x') ".to_string())
        );
    }

    #[test]
    fn test_replace_without_table() {
        let mut replace = ReplaceBuilder::new(QueryContext::new(false, true));
        replace.set("a = 1").unwrap();
        assert_eq!(replace.build(0), None);
    }

    #[test]
    fn test_replace_with_set() {
        let mut replace = ReplaceBuilder::new(QueryContext::new(false, true));
        replace.table("t").delayed(true);
        replace.set_bind("a", 1).unwrap().set_bind("b", "x").unwrap();
        assert_eq!(
            replace.build(0),
            Some("REPLACE DELAYED INTO t SET a = 1,b = 'x' ".to_string())
        );
    }

    #[test]
    fn test_replace_select_source() {
        let mut source = SelectBuilder::new(QueryContext::new(false, true));
        source.columns(("a", "b")).from("archive");

        let mut replace = ReplaceBuilder::new(QueryContext::new(false, true));
        replace.table("t").ignore(true);
        replace.columns(("a", "b")).unwrap().select(source).unwrap();
        assert_eq!(
            replace.build(0),
            Some("REPLACE IGNORE INTO t (a,b) (SELECT a,b FROM archive ) ".to_string())
        );
    }

    #[test]
    fn test_replace_content_guard() {
        let mut replace = ReplaceBuilder::new(QueryContext::new(false, true));
        replace.table("t");
        replace.set("a = 1").unwrap();
        let err = replace.columns("b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot add columns after using 'set' or 'select'"
        );
    }

    #[test]
    fn test_formatted_replace() {
        let mut replace = ReplaceBuilder::new(QueryContext::new(true, true));
        replace.table("t");
        replace
            .columns("a")
            .unwrap()
            .values(vec![Value::from(1)])
            .unwrap();
        assert_eq!(
            replace.build(0),
            Some("REPLACE INTO \n    t\n    ( a ) \nVALUES\n    ( 1 )\n".to_string())
        );
    }
}
