//! DELETE query builder

use crate::builder::common::{
    ConditionList, Fragment, IntoTables, QueryContext, SortOrder, Statement,
};
use crate::builder::select::SelectBuilder;
use crate::error::Result;
use crate::value::Value;

const MESSAGE_ORDER: &str = "you cannot use 'order' if you delete from more than one table";
const MESSAGE_LIMIT: &str = "you cannot use 'limit' if you delete from more than one table";

/// Builder for DELETE statements. Deleting from multiple tables renders
/// the table list a second time as the USING clause.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    context: QueryContext,
    format_offset: usize,
    tables: Vec<String>,
    using: Vec<String>,
    low_priority: bool,
    quick: bool,
    ignore: bool,
    where_list: ConditionList,
    order: Vec<String>,
    limit_clause: Option<u64>,
}

impl DeleteBuilder {
    /// Create an empty DELETE builder with the given context.
    pub fn new(context: QueryContext) -> Self {
        DeleteBuilder {
            context,
            format_offset: 0,
            tables: Vec::new(),
            using: Vec::new(),
            low_priority: false,
            quick: false,
            ignore: false,
            where_list: ConditionList::default(),
            order: Vec::new(),
            limit_clause: None,
        }
    }

    /// Add tables to the query, mirrored into the USING list.
    pub fn table(&mut self, tables: impl IntoTables) -> &mut Self {
        let tables = tables.into_tables();
        self.tables.extend(tables.iter().cloned());
        self.using(tables)
    }

    /// Add an aliased table: the bare name joins the table list, the
    /// aliased form the USING list.
    pub fn table_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.tables.push(table.to_string());
        self.using(format!("{} AS {}", table, alias))
    }

    /// Alias of [`table`](DeleteBuilder::table).
    pub fn from(&mut self, tables: impl IntoTables) -> &mut Self {
        self.table(tables)
    }

    /// Alias of [`table_as`](DeleteBuilder::table_as).
    pub fn from_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.table_as(table, alias)
    }

    /// Add tables to the USING list, skipping duplicates.
    pub fn using(&mut self, tables: impl IntoTables) -> &mut Self {
        for table in tables.into_tables() {
            if !self.using.contains(&table) {
                self.using.push(table);
            }
        }

        self
    }

    /// Add LOW_PRIORITY to the query.
    pub fn low_priority(&mut self, low_priority: bool) -> &mut Self {
        self.low_priority = low_priority;
        self
    }

    /// Add QUICK to the query.
    pub fn quick(&mut self, quick: bool) -> &mut Self {
        self.quick = quick;
        self
    }

    /// Add IGNORE to the query.
    pub fn ignore(&mut self, ignore: bool) -> &mut Self {
        self.ignore = ignore;
        self
    }

    // conditions

    /// Add a raw WHERE condition.
    pub fn where_(&mut self, condition: &str) -> &mut Self {
        self.where_list
            .push(Fragment::Literal(condition.to_string()));
        self
    }

    /// Add a WHERE condition with a bound value. A list value is escaped
    /// per element and joined on the placeholder.
    pub fn where_bind(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        let condition = self
            .context
            .bind_condition(condition, value.into(), &["ANY", "IN", "SOME"]);
        self.where_list.push(Fragment::Literal(condition));
        self
    }

    /// Add a WHERE condition whose placeholder is filled with a subquery.
    pub fn where_select(&mut self, condition: &str, query: SelectBuilder) -> &mut Self {
        self.where_list.push(Fragment::Nested {
            template: condition.to_string(),
            query: Box::new(query),
        });
        self
    }

    /// Add an OR related WHERE condition.
    pub fn or_where(&mut self, condition: &str) -> &mut Self {
        self.where_list.or_last();
        self.where_(condition)
    }

    /// Add an OR related WHERE condition with a bound value.
    pub fn or_where_bind(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        self.where_list.or_last();
        self.where_bind(condition, value)
    }

    /// Add an OR related WHERE condition with a subquery.
    pub fn or_where_select(&mut self, condition: &str, query: SelectBuilder) -> &mut Self {
        self.where_list.or_last();
        self.where_select(condition, query)
    }

    // ordering

    /// Add an ORDER BY field. Only allowed while a single table is deleted
    /// from.
    pub fn order_by(&mut self, field: &str, order: SortOrder) -> Result<&mut Self> {
        if self.tables.len() >= 2 {
            self.context.construction_error(MESSAGE_ORDER)?;
            return Ok(self);
        }

        self.order.push(format!("{} {}", field, order.as_str()));
        Ok(self)
    }

    /// Alias of `order_by`.
    pub fn order(&mut self, field: &str, order: SortOrder) -> Result<&mut Self> {
        self.order_by(field, order)
    }

    /// Add a LIMIT to the query. Only allowed while a single table is
    /// deleted from.
    pub fn limit(&mut self, limit: u64) -> Result<&mut Self> {
        if self.tables.len() >= 2 {
            self.context.construction_error(MESSAGE_LIMIT)?;
            return Ok(self);
        }

        self.limit_clause = Some(limit);
        Ok(self)
    }
}

impl Statement for DeleteBuilder {
    fn build(&mut self, format_offset: usize) -> Option<String> {
        self.format_offset += format_offset;
        let offset = " ".repeat(self.format_offset);

        if self.tables.is_empty() {
            return None;
        }

        let mut query = if self.context.format {
            format!("{}DELETE ", offset)
        } else {
            String::from("DELETE ")
        };

        // low priority
        if self.low_priority {
            if self.context.format {
                query.push_str(&format!("\n{}    LOW_PRIORITY ", offset));
            } else {
                query.push_str("LOW_PRIORITY ");
            }
        }

        // quick
        if self.quick {
            if self.context.format {
                query.push_str(&format!("\n{}    QUICK ", offset));
            } else {
                query.push_str("QUICK ");
            }
        }

        // ignore
        if self.ignore {
            if self.context.format {
                query.push_str(&format!("\n{}    IGNORE ", offset));
            } else {
                query.push_str("IGNORE ");
            }
        }

        // format line break
        if self.context.format && (self.low_priority || self.quick || self.ignore) {
            query.push('\n');
        }

        // tables
        if self.tables.len() == 1 {
            if self.context.format {
                query.push_str(&format!("{}FROM\n{}    {}\n", offset, offset, self.tables[0]));
            } else {
                query.push_str(&format!("FROM {} ", self.tables[0]));
            }
        } else if self.context.format {
            query.push_str("FROM\n");

            let count = self.tables.len();
            for (index, table) in self.tables.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, table));
                if index + 1 < count {
                    query.push(',');
                }
                query.push('\n');
            }

            query.push_str(&format!("{}USING\n", offset));

            let count = self.using.len();
            for (index, table) in self.using.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, table));
                if index + 1 < count {
                    query.push(',');
                }
                query.push('\n');
            }
        } else {
            query.push_str(&format!("FROM {} ", self.tables.join(",")));
            query.push_str(&format!("USING {} ", self.using.join(",")));
        }

        // where
        if !self.where_list.is_empty() {
            if self.context.format {
                query.push_str(&format!("{}WHERE \n", offset));
                query.push_str(&self.where_list.render_formatted(self.format_offset));
            } else {
                query.push_str(&format!("WHERE {} ", self.where_list.render_compact()));
            }
        }

        // order
        if !self.order.is_empty() {
            if self.context.format {
                query.push_str(&format!("{}ORDER BY \n", offset));

                let count = self.order.len();
                for (index, field) in self.order.iter().enumerate() {
                    query.push_str(&format!("{}    {}", offset, field));
                    if index + 1 < count {
                        query.push(',');
                    }
                    query.push_str(" \n");
                }
            } else {
                query.push_str(&format!("ORDER BY {} ", self.order.join(",")));
            }
        }

        // limit
        if let Some(limit) = self.limit_clause {
            if limit != 0 {
                if self.context.format {
                    query.push_str(&format!("{}LIMIT \n{}    {}", offset, offset, limit));
                } else {
                    query.push_str(&format!("LIMIT {}", limit));
                }
            }
        }

        Some(query)
    }

    fn reset_query(&mut self, format: bool) {
        let mut context = self.context;
        context.format = format;
        *self = DeleteBuilder::new(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(tables: impl IntoTables) -> DeleteBuilder {
        let mut delete = DeleteBuilder::new(QueryContext::new(false, true));
        delete.table(tables);
        delete
    }

    #[test]
    fn test_simple_delete() {
        let mut delete = compact("t");
        delete.where_bind("id = ?", 2);
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM t WHERE id = 2 ".to_string())
        );
    }

    #[test]
    fn test_delete_without_table() {
        let mut delete = DeleteBuilder::new(QueryContext::new(false, true));
        delete.where_("id = 1");
        assert_eq!(delete.build(0), None);
    }

    #[test]
    fn test_delete_modifiers() {
        let mut delete = compact("t");
        delete.low_priority(true).quick(true).ignore(true);
        assert_eq!(
            delete.build(0),
            Some("DELETE LOW_PRIORITY QUICK IGNORE FROM t ".to_string())
        );
    }

    #[test]
    fn test_multi_table_delete() {
        let mut delete = compact(("t1", "t2"));
        delete.where_("t1.id = t2.id");
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM t1,t2 USING t1,t2 WHERE t1.id = t2.id ".to_string())
        );
    }

    #[test]
    fn test_aliased_table() {
        let mut delete = compact("t1");
        delete.table_as("t2", "other");
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM t1,t2 USING t1,t2 AS other ".to_string())
        );
    }

    #[test]
    fn test_order_and_limit() {
        let mut delete = compact("t");
        delete.where_("state = 'stale'");
        delete.order_by("id", SortOrder::Asc).unwrap();
        delete.limit(10).unwrap();
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM t WHERE state = 'stale' ORDER BY id ASC LIMIT 10".to_string())
        );
    }

    #[test]
    fn test_order_and_limit_guards() {
        let mut delete = compact(("t1", "t2"));

        let err = delete.order_by("id", SortOrder::Asc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot use 'order' if you delete from more than one table"
        );

        let err = delete.limit(10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot use 'limit' if you delete from more than one table"
        );

        // the rejected calls left the options unset
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM t1,t2 USING t1,t2 ".to_string())
        );
    }

    #[test]
    fn test_where_subquery() {
        let mut banned = SelectBuilder::new(QueryContext::new(false, true));
        banned.column("id").from("banned");

        let mut delete = compact("users");
        delete.where_select("id IN (?)", banned);
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM users WHERE id IN ((SELECT id FROM banned )) ".to_string())
        );
    }

    #[test]
    fn test_or_where() {
        let mut delete = compact("t");
        delete.where_("a = 1").or_where_bind("b = ?", 2);
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM t WHERE a = 1 OR b = 2 ".to_string())
        );
    }

    #[test]
    fn test_formatted_delete() {
        let mut delete = DeleteBuilder::new(QueryContext::new(true, true));
        delete.table("t").where_bind("id = ?", 2);
        assert_eq!(
            delete.build(0),
            Some("DELETE FROM\n    t\nWHERE \n    id = 2 \n".to_string())
        );
    }

    #[test]
    fn test_reset_query() {
        let mut delete = compact("t");
        delete.where_("a = 1");
        delete.reset_query(false);
        assert_eq!(delete.build(0), None);
    }
}
