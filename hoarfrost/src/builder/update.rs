//! UPDATE query builder

use crate::builder::common::{
    ConditionList, Fragment, IntoTables, QueryContext, SortOrder, Statement,
};
use crate::builder::select::SelectBuilder;
use crate::error::Result;
use crate::value::Value;

const MESSAGE_ORDER: &str = "you cannot use 'order' if you update more than one table";
const MESSAGE_LIMIT: &str = "you cannot use 'limit' if you update more than one table";

/// Builder for UPDATE statements.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    context: QueryContext,
    format_offset: usize,
    tables: Vec<String>,
    low_priority: bool,
    ignore: bool,
    set: Vec<String>,
    where_list: ConditionList,
    order: Vec<String>,
    limit_clause: Option<u64>,
}

impl UpdateBuilder {
    /// Create an empty UPDATE builder with the given context.
    pub fn new(context: QueryContext) -> Self {
        UpdateBuilder {
            context,
            format_offset: 0,
            tables: Vec::new(),
            low_priority: false,
            ignore: false,
            set: Vec::new(),
            where_list: ConditionList::default(),
            order: Vec::new(),
            limit_clause: None,
        }
    }

    /// Add tables to the query.
    pub fn table(&mut self, tables: impl IntoTables) -> &mut Self {
        self.tables.extend(tables.into_tables());
        self
    }

    /// Add LOW_PRIORITY to the query.
    pub fn low_priority(&mut self, low_priority: bool) -> &mut Self {
        self.low_priority = low_priority;
        self
    }

    /// Add IGNORE to the query.
    pub fn ignore(&mut self, ignore: bool) -> &mut Self {
        self.ignore = ignore;
        self
    }

    /// Add a raw SET assignment.
    pub fn set(&mut self, assignment: &str) -> &mut Self {
        self.set.push(assignment.to_string());
        self
    }

    /// Add a SET assignment with a bound value. A bare column name becomes
    /// `column = value`, otherwise every placeholder is substituted.
    pub fn set_bind(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let escaped = self.context.escaper.escape(&value.into());
        let assignment = if !column.contains('?') && !column.contains('=') {
            format!("{} = {}", column, escaped)
        } else {
            column.replace('?', &escaped)
        };
        self.set.push(assignment);
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

    /// Add an ORDER BY field. Only allowed while a single table is updated.
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

    /// Add a LIMIT to the query. Only allowed while a single table is updated.
    pub fn limit(&mut self, limit: u64) -> Result<&mut Self> {
        if self.tables.len() >= 2 {
            self.context.construction_error(MESSAGE_LIMIT)?;
            return Ok(self);
        }

        self.limit_clause = Some(limit);
        Ok(self)
    }
}

impl Statement for UpdateBuilder {
    fn build(&mut self, format_offset: usize) -> Option<String> {
        self.format_offset += format_offset;
        let offset = " ".repeat(self.format_offset);

        if self.tables.is_empty() {
            return None;
        }

        let mut query = if self.context.format {
            format!("{}UPDATE ", offset)
        } else {
            String::from("UPDATE ")
        };

        // low priority
        if self.low_priority {
            query.push_str("LOW_PRIORITY ");
        }

        // ignore
        if self.ignore {
            query.push_str("IGNORE ");
        }

        if self.context.format {
            query.push_str(&format!("{}\n", offset));
        }

        // tables
        if self.tables.len() == 1 {
            if self.context.format {
                query.push_str(&format!("{}    {}\n", offset, self.tables[0]));
            } else {
                query.push_str(&format!("{} ", self.tables[0]));
            }
        } else if self.context.format {
            let count = self.tables.len();
            for (index, table) in self.tables.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, table));
                if index + 1 < count {
                    query.push(',');
                }
                query.push('\n');
            }
        } else {
            query.push_str(&format!("{} ", self.tables.join(",")));
        }

        // set
        if !self.set.is_empty() {
            if self.context.format {
                query.push_str("SET\n");

                let count = self.set.len();
                for (index, assignment) in self.set.iter().enumerate() {
                    query.push_str(&format!("{}    {}", offset, assignment));
                    if index + 1 < count {
                        query.push_str(", \n");
                    }
                }

                query.push('\n');
            } else {
                query.push_str(&format!("SET {} ", self.set.join(",")));
            }
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

        // add order
        if !self.order.is_empty() && self.tables.len() == 1 {
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

        // add limit
        if let Some(limit) = self.limit_clause {
            if limit != 0 && self.tables.len() == 1 {
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
        *self = UpdateBuilder::new(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(tables: impl IntoTables) -> UpdateBuilder {
        let mut update = UpdateBuilder::new(QueryContext::new(false, true));
        update.table(tables);
        update
    }

    #[test]
    fn test_simple_update() {
        let mut update = compact("t");
        update.set_bind("a", 1).where_bind("id = ?", 2);
        assert_eq!(
            update.build(0),
            Some("UPDATE t SET a = 1 WHERE id = 2 ".to_string())
        );
    }

    #[test]
    fn test_update_without_table() {
        let mut update = UpdateBuilder::new(QueryContext::new(false, true));
        update.set("a = 1");
        assert_eq!(update.build(0), None);
    }

    #[test]
    fn test_update_modifiers() {
        let mut update = compact("t");
        update.low_priority(true).ignore(true).set("a = 1");
        assert_eq!(
            update.build(0),
            Some("UPDATE LOW_PRIORITY IGNORE t SET a = 1 ".to_string())
        );
    }

    #[test]
    fn test_multi_table_update() {
        let mut update = compact(("t1", "t2"));
        update.set("t1.a = t2.b").where_("t1.id = t2.id");
        assert_eq!(
            update.build(0),
            Some("UPDATE t1,t2 SET t1.a = t2.b WHERE t1.id = t2.id ".to_string())
        );
    }

    #[test]
    fn test_set_bind_escapes() {
        let mut update = compact("t");
        update.set_bind("name", "O'Neil").set_bind("b = ?", 2);
        assert_eq!(
            update.build(0),
            Some("UPDATE t SET name = 'O\\'Neil',b = 2 ".to_string())
        );
    }

    #[test]
    fn test_order_and_limit() {
        let mut update = compact("t");
        update.set("a = 1");
        update.order_by("id", SortOrder::Desc).unwrap();
        update.limit(5).unwrap();
        assert_eq!(
            update.build(0),
            Some("UPDATE t SET a = 1 ORDER BY id DESC LIMIT 5".to_string())
        );
    }

    #[test]
    fn test_order_and_limit_guards() {
        let mut update = compact(("t1", "t2"));

        let err = update.order_by("id", SortOrder::Asc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot use 'order' if you update more than one table"
        );

        let err = update.limit(5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not create the query, reason: you cannot use 'limit' if you update more than one table"
        );
    }

    #[test]
    fn test_order_dropped_once_second_table_is_added() {
        let mut update = compact("t1");
        update.set("a = 1");
        update.order_by("id", SortOrder::Asc).unwrap();
        update.limit(5).unwrap();
        update.table("t2");
        assert_eq!(
            update.build(0),
            Some("UPDATE t1,t2 SET a = 1 ".to_string())
        );
    }

    #[test]
    fn test_where_subquery() {
        let mut banned = SelectBuilder::new(QueryContext::new(false, true));
        banned.column("id").from("banned");

        let mut update = compact("users");
        update.set("active = 0").where_select("id IN (?)", banned);
        assert_eq!(
            update.build(0),
            Some("UPDATE users SET active = 0 WHERE id IN ((SELECT id FROM banned )) ".to_string())
        );
    }

    #[test]
    fn test_or_where() {
        let mut update = compact("t");
        update
            .set("a = 1")
            .where_("b = 2")
            .or_where_bind("c = ?", 3);
        assert_eq!(
            update.build(0),
            Some("UPDATE t SET a = 1 WHERE b = 2 OR c = 3 ".to_string())
        );
    }

    #[test]
    fn test_formatted_update() {
        let mut update = UpdateBuilder::new(QueryContext::new(true, true));
        update.table("t").set_bind("a", 1).where_bind("id = ?", 2);
        assert_eq!(
            update.build(0),
            Some("UPDATE \n    t\nSET\n    a = 1\nWHERE \n    id = 2 \n".to_string())
        );
    }

    #[test]
    fn test_reset_query() {
        let mut update = compact("t");
        update.set("a = 1");
        update.reset_query(false);
        assert_eq!(update.build(0), None);
    }
}
