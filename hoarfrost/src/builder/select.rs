//! SELECT query builder

use crate::builder::common::{
    ConditionList, Fragment, IntoColumns, IntoTables, JoinKind, QueryContext, Relation, SortOrder,
    Statement,
};
use crate::value::Value;

/// A single entry of the column list
#[derive(Debug, Clone)]
enum ColumnEntry {
    /// Plain column text, aliases already folded in
    Plain(String),
    /// Subquery column, rendered in parentheses
    Select(Box<SelectBuilder>),
    /// Aliased subquery column, rendered as `(...) AS alias`
    SelectAs(Box<SelectBuilder>, String),
}

/// One join with its tables and conditions
#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    tables: Vec<String>,
    on: Vec<(String, Relation)>,
    using: Vec<String>,
}

/// The other side of a UNION
#[derive(Debug, Clone)]
enum UnionSource {
    Text(String),
    Select(Box<SelectBuilder>),
}

/// Builder for SELECT statements.
///
/// Options accumulate through the fluent setters and `build` renders them
/// in statement order. Without a FROM table nothing is rendered.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    context: QueryContext,
    format_offset: usize,
    all: bool,
    distinct: bool,
    distinct_row: bool,
    high_priority: bool,
    straight: bool,
    columns: Vec<ColumnEntry>,
    from: Vec<String>,
    joins: Vec<Join>,
    where_list: ConditionList,
    group: Vec<String>,
    rollup: bool,
    having_list: ConditionList,
    order: Vec<String>,
    limit_clause: Option<String>,
    procedure_clause: Option<String>,
    for_update: bool,
    lock_share: bool,
    union_clause: Option<UnionSource>,
}

impl SelectBuilder {
    /// Create an empty SELECT builder with the given context.
    pub fn new(context: QueryContext) -> Self {
        SelectBuilder {
            context,
            format_offset: 0,
            all: false,
            distinct: false,
            distinct_row: false,
            high_priority: false,
            straight: false,
            columns: Vec::new(),
            from: Vec::new(),
            joins: Vec::new(),
            where_list: ConditionList::default(),
            group: Vec::new(),
            rollup: false,
            having_list: ConditionList::default(),
            order: Vec::new(),
            limit_clause: None,
            procedure_clause: None,
            for_update: false,
            lock_share: false,
            union_clause: None,
        }
    }

    // modifiers

    /// Add ALL to the query, clearing DISTINCT and DISTINCTROW.
    pub fn all(&mut self, all: bool) -> &mut Self {
        if all {
            self.distinct = false;
            self.distinct_row = false;
        }

        self.all = all;
        self
    }

    /// Add DISTINCT to the query, clearing ALL and DISTINCTROW.
    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        if distinct {
            self.all = false;
            self.distinct_row = false;
        }

        self.distinct = distinct;
        self
    }

    /// Add DISTINCTROW to the query, clearing ALL and DISTINCT.
    pub fn distinct_row(&mut self, distinct_row: bool) -> &mut Self {
        if distinct_row {
            self.all = false;
            self.distinct = false;
        }

        self.distinct_row = distinct_row;
        self
    }

    /// Add HIGH_PRIORITY to the query.
    pub fn high_priority(&mut self, high_priority: bool) -> &mut Self {
        self.high_priority = high_priority;
        self
    }

    /// Add the STRAIGHT_JOIN modifier to the query.
    pub fn straight(&mut self, straight: bool) -> &mut Self {
        self.straight = straight;
        self
    }

    // columns

    /// Add a single column to the selection.
    pub fn column(&mut self, column: &str) -> &mut Self {
        self.columns.push(ColumnEntry::Plain(column.to_string()));
        self
    }

    /// Add multiple columns to the selection.
    pub fn columns(&mut self, columns: impl IntoColumns) -> &mut Self {
        for column in columns.into_columns() {
            self.columns.push(ColumnEntry::Plain(column));
        }

        self
    }

    /// Add an aliased column to the selection.
    pub fn column_as(&mut self, column: &str, alias: &str) -> &mut Self {
        self.columns
            .push(ColumnEntry::Plain(format!("{} AS {}", column, alias)));
        self
    }

    /// Add a subquery column to the selection.
    pub fn column_select(&mut self, query: SelectBuilder) -> &mut Self {
        self.columns.push(ColumnEntry::Select(Box::new(query)));
        self
    }

    /// Add an aliased subquery column to the selection.
    pub fn column_select_as(&mut self, query: SelectBuilder, alias: &str) -> &mut Self {
        self.columns
            .push(ColumnEntry::SelectAs(Box::new(query), alias.to_string()));
        self
    }

    // tables

    /// Add tables to the FROM clause.
    pub fn from(&mut self, tables: impl IntoTables) -> &mut Self {
        self.from.extend(tables.into_tables());
        self
    }

    /// Add an aliased table to the FROM clause.
    pub fn from_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.from.push(format!("{} AS {}", table, alias));
        self
    }

    // joins

    fn add_join(&mut self, kind: JoinKind, tables: Vec<String>) -> &mut Self {
        self.joins.push(Join {
            kind,
            tables,
            on: Vec::new(),
            using: Vec::new(),
        });
        self
    }

    /// Add a JOIN to the query.
    pub fn join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::Join, tables.into_tables())
    }

    /// Add a STRAIGHT_JOIN to the query.
    pub fn straight_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::StraightJoin, tables.into_tables())
    }

    /// Add a LEFT JOIN to the query.
    pub fn left_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::Left, tables.into_tables())
    }

    /// Add a RIGHT JOIN to the query.
    pub fn right_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::Right, tables.into_tables())
    }

    /// Add an INNER JOIN to the query.
    pub fn inner_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::Inner, tables.into_tables())
    }

    /// Add a CROSS JOIN to the query.
    pub fn cross_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::Cross, tables.into_tables())
    }

    /// Add a LEFT OUTER JOIN to the query.
    pub fn left_outer_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::LeftOuter, tables.into_tables())
    }

    /// Add a RIGHT OUTER JOIN to the query.
    pub fn right_outer_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::RightOuter, tables.into_tables())
    }

    /// Add a NATURAL JOIN to the query.
    pub fn natural_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::Natural, tables.into_tables())
    }

    /// Add a NATURAL LEFT JOIN to the query.
    pub fn natural_left_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::NaturalLeft, tables.into_tables())
    }

    /// Add a NATURAL LEFT OUTER JOIN to the query.
    pub fn natural_left_outer_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::NaturalLeftOuter, tables.into_tables())
    }

    /// Add a NATURAL RIGHT JOIN to the query.
    pub fn natural_right_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::NaturalRight, tables.into_tables())
    }

    /// Add a NATURAL RIGHT OUTER JOIN to the query.
    pub fn natural_right_outer_join(&mut self, tables: impl IntoTables) -> &mut Self {
        self.add_join(JoinKind::NaturalRightOuter, tables.into_tables())
    }

    /// Add an ON condition to the last join. Does nothing when no join
    /// exists yet.
    pub fn on(&mut self, condition: &str) -> &mut Self {
        if let Some(join) = self.joins.last_mut() {
            join.on.push((condition.to_string(), Relation::And));
        }

        self
    }

    /// Add an ON condition with a bound value to the last join.
    pub fn on_bind(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        let condition = condition.replace('?', &self.context.escaper.escape(&value.into()));

        if let Some(join) = self.joins.last_mut() {
            join.on.push((condition, Relation::And));
        }

        self
    }

    /// Add an OR related ON condition to the last join.
    pub fn or_on(&mut self, condition: &str) -> &mut Self {
        if let Some(join) = self.joins.last_mut() {
            if let Some(last) = join.on.last_mut() {
                last.1 = Relation::Or;
            }
        }

        self.on(condition)
    }

    /// Add an OR related ON condition with a bound value to the last join.
    pub fn or_on_bind(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        if let Some(join) = self.joins.last_mut() {
            if let Some(last) = join.on.last_mut() {
                last.1 = Relation::Or;
            }
        }

        self.on_bind(condition, value)
    }

    /// Add USING columns to the last join, skipping duplicates.
    pub fn using(&mut self, columns: impl IntoColumns) -> &mut Self {
        if let Some(join) = self.joins.last_mut() {
            for column in columns.into_columns() {
                if !join.using.contains(&column) {
                    join.using.push(column);
                }
            }
        }

        self
    }

    // conditions

    /// Add a WHERE condition.
    pub fn where_(&mut self, condition: &str) -> &mut Self {
        self.where_list.push(Fragment::Literal(condition.to_string()));
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

    // grouping

    /// Add a GROUP BY field with its direction.
    pub fn group_by(&mut self, field: &str, order: SortOrder) -> &mut Self {
        self.group.push(format!("{} {}", field, order.as_str()));
        self
    }

    /// Add WITH ROLLUP to the grouping.
    pub fn with_rollup(&mut self, rollup: bool) -> &mut Self {
        self.rollup = rollup;
        self
    }

    /// Add a HAVING condition. Renders only when GROUP BY is present.
    pub fn having(&mut self, condition: &str) -> &mut Self {
        self.having_list.push(Fragment::Literal(condition.to_string()));
        self
    }

    /// Add a HAVING condition with a bound value.
    pub fn having_bind(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        let condition = self.context.bind_condition(condition, value.into(), &["IN"]);
        self.having_list.push(Fragment::Literal(condition));
        self
    }

    /// Add a HAVING condition whose placeholder is filled with a subquery.
    pub fn having_select(&mut self, condition: &str, query: SelectBuilder) -> &mut Self {
        self.having_list.push(Fragment::Nested {
            template: condition.to_string(),
            query: Box::new(query),
        });
        self
    }

    /// Add an OR related HAVING condition.
    pub fn or_having(&mut self, condition: &str) -> &mut Self {
        self.having_list.or_last();
        self.having(condition)
    }

    /// Add an OR related HAVING condition with a bound value.
    pub fn or_having_bind(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        self.having_list.or_last();
        self.having_bind(condition, value)
    }

    /// Add an OR related HAVING condition with a subquery.
    pub fn or_having_select(&mut self, condition: &str, query: SelectBuilder) -> &mut Self {
        self.having_list.or_last();
        self.having_select(condition, query)
    }

    // ordering and limits

    /// Add an ORDER BY field with its direction.
    pub fn order_by(&mut self, field: &str, order: SortOrder) -> &mut Self {
        self.order.push(format!("{} {}", field, order.as_str()));
        self
    }

    /// Limit the number of result rows. A limit of zero is kept but never
    /// rendered.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit_clause = Some(limit.to_string());
        self
    }

    /// Limit the result rows starting at the given offset.
    pub fn limit_offset(&mut self, offset: u64, limit: u64) -> &mut Self {
        self.limit_clause = Some(format!("{}, {}", offset, limit));
        self
    }

    /// Add a PROCEDURE clause.
    pub fn procedure(&mut self, procedure: &str) -> &mut Self {
        self.procedure_clause = Some(procedure.to_string());
        self
    }

    /// Add a PROCEDURE clause with arguments.
    pub fn procedure_args(&mut self, procedure: &str, arguments: impl IntoColumns) -> &mut Self {
        self.procedure_clause = Some(format!(
            "{}({})",
            procedure,
            arguments.into_columns().join(",")
        ));
        self
    }

    /// Add FOR UPDATE, clearing LOCK IN SHARE MODE.
    pub fn for_update(&mut self, for_update: bool) -> &mut Self {
        if for_update {
            self.lock_share = false;
        }

        self.for_update = for_update;
        self
    }

    /// Add LOCK IN SHARE MODE, clearing FOR UPDATE.
    pub fn lock_in_share_mode(&mut self, lock: bool) -> &mut Self {
        if lock {
            self.for_update = false;
        }

        self.lock_share = lock;
        self
    }

    // union

    /// Union this query with raw query text.
    pub fn union(&mut self, query: &str) -> &mut Self {
        self.union_clause = Some(UnionSource::Text(query.to_string()));
        self
    }

    /// Union this query with another SELECT.
    pub fn union_select(&mut self, query: SelectBuilder) -> &mut Self {
        self.union_clause = Some(UnionSource::Select(Box::new(query)));
        self
    }

    fn build_compact(&mut self) -> String {
        let mut query = String::from("SELECT ");

        // modifiers
        if self.all {
            query.push_str("ALL ");
        }
        if self.distinct {
            query.push_str("DISTINCT ");
        }
        if self.distinct_row {
            query.push_str("DISTINCTROW ");
        }
        if self.high_priority {
            query.push_str("HIGH_PRIORITY ");
        }
        if self.straight {
            query.push_str("STRAIGHT_JOIN ");
        }

        // columns
        if self.columns.is_empty() {
            query.push_str("* ");
        } else {
            let mut rendered = Vec::new();

            for entry in self.columns.iter_mut() {
                rendered.push(match entry {
                    ColumnEntry::Plain(column) => column.clone(),
                    ColumnEntry::Select(select) => {
                        format!("({})", select.build(0).unwrap_or_default())
                    }
                    ColumnEntry::SelectAs(select, alias) => {
                        format!("({}) AS {}", select.build(0).unwrap_or_default(), alias)
                    }
                });
            }

            query.push_str(&rendered.join(","));
            query.push(' ');
        }

        // FROM clause
        query.push_str("FROM ");
        query.push_str(&self.from.join(","));
        query.push(' ');

        // joins
        for join in &mut self.joins {
            query.push_str(join.kind.as_str());
            query.push(' ');
            query.push_str(&join.tables.join(","));
            query.push(' ');

            if !join.on.is_empty() {
                let count = join.on.len();
                let mut parts = Vec::new();

                for (index, (condition, relation)) in join.on.iter().enumerate() {
                    parts.push(condition.clone());
                    if index + 1 < count {
                        parts.push(relation.as_str().to_string());
                    }
                }

                query.push_str("ON ");
                query.push_str(&parts.join(" "));
                query.push(' ');
            } else if !join.using.is_empty() {
                query.push_str("USING (");
                query.push_str(&join.using.join(","));
                query.push_str(") ");
            }
        }

        // WHERE clause
        if !self.where_list.is_empty() {
            query.push_str("WHERE ");
            query.push_str(&self.where_list.render_compact());
            query.push(' ');
        }

        // GROUP BY clause
        if !self.group.is_empty() {
            query.push_str("GROUP BY ");
            query.push_str(&self.group.join(","));
            query.push(' ');

            if self.rollup {
                query.push_str("WITH ROLLUP ");
            }

            // HAVING clause
            if !self.having_list.is_empty() {
                query.push_str("HAVING ");
                query.push_str(&self.having_list.render_compact());
                query.push(' ');
            }
        }

        // ORDER BY clause
        if !self.order.is_empty() {
            query.push_str("ORDER BY ");
            query.push_str(&self.order.join(","));
            query.push(' ');
        }

        // LIMIT clause
        if let Some(limit) = &self.limit_clause {
            if limit != "0" {
                query.push_str("LIMIT ");
                query.push_str(limit);
                query.push(' ');
            }
        }

        // PROCEDURE clause
        if let Some(procedure) = &self.procedure_clause {
            query.push_str("PROCEDURE ");
            query.push_str(procedure);
            query.push(' ');
        }

        if self.for_update {
            query.push_str("FOR UPDATE ");
        }
        if self.lock_share {
            query.push_str("LOCK IN SHARE MODE ");
        }

        // union
        if let Some(union) = &mut self.union_clause {
            let other = match union {
                UnionSource::Text(text) => text.clone(),
                UnionSource::Select(select) => select.build(0).unwrap_or_default(),
            };

            query = format!("({}) UNION ({})", query, other);
        }

        query
    }

    fn build_formatted(&mut self) -> String {
        let base = self.format_offset;
        let offset = " ".repeat(base);
        let mut query = format!("{}SELECT ", offset);

        // modifiers
        if self.all {
            query.push_str(&format!("\n{}    ALL ", offset));
        }
        if self.distinct {
            query.push_str(&format!("\n{}    DISTINCT ", offset));
        }
        if self.distinct_row {
            query.push_str(&format!("\n{}    DISTINCTROW ", offset));
        }
        if self.high_priority {
            query.push_str(&format!("\n{}    HIGH_PRIORITY ", offset));
        }
        if self.straight {
            query.push_str(&format!("\n{}    STRAIGHT_JOIN ", offset));
        }

        query.push_str(&format!("{}\n", offset));

        // columns
        if self.columns.is_empty() {
            query.push_str(&format!("{}    *\n", offset));
        } else {
            let count = self.columns.len();

            for (index, entry) in self.columns.iter_mut().enumerate() {
                let rendered = match entry {
                    ColumnEntry::Plain(column) => column.clone(),
                    ColumnEntry::Select(select) => {
                        format!("({})", select.build(base + 4).unwrap_or_default())
                    }
                    ColumnEntry::SelectAs(select, alias) => {
                        let built = select.build(base + 4).unwrap_or_default();
                        format!("({}) AS {}", built.trim(), alias)
                    }
                };

                query.push_str(&format!("{}    {}", offset, rendered));
                if index + 1 < count {
                    query.push(',');
                }
                query.push_str(" \n");
            }
        }

        // FROM clause
        query.push_str(&format!("{}FROM \n", offset));

        let count = self.from.len();
        for (index, table) in self.from.iter().enumerate() {
            query.push_str(&format!("{}    {}", offset, table));
            if index + 1 < count {
                query.push(',');
            }
            query.push_str(" \n");
        }

        // joins
        for join in &mut self.joins {
            query.push_str(&format!("{}{}\n", offset, join.kind.as_str()));

            let count = join.tables.len();
            for (index, table) in join.tables.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, table));
                if index + 1 < count {
                    query.push(',');
                }
                query.push_str(" \n");
            }

            if !join.on.is_empty() {
                query.push_str(&format!("{}ON\n", offset));

                let count = join.on.len();
                for (index, (condition, relation)) in join.on.iter().enumerate() {
                    query.push_str(&format!("{}    {}", offset, condition));
                    if index + 1 < count {
                        query.push_str(&format!(" \n{}{} ", offset, relation.as_str()));
                    }
                    query.push_str(" \n");
                }
            } else if !join.using.is_empty() {
                query.push_str(&format!("{}USING\n", offset));
                query.push_str(&format!("{}(\n", offset));

                let count = join.using.len();
                for (index, column) in join.using.iter().enumerate() {
                    query.push_str(&format!("{}    {}", offset, column));
                    if index + 1 < count {
                        query.push(',');
                    }
                    query.push_str(" \n");
                }

                query.push_str(&format!("{})\n", offset));
            }
        }

        // WHERE clause
        if !self.where_list.is_empty() {
            query.push_str(&format!("{}WHERE \n", offset));
            query.push_str(&self.where_list.render_formatted(base));
        }

        // GROUP BY clause
        if !self.group.is_empty() {
            query.push_str(&format!("{}GROUP BY \n", offset));

            let count = self.group.len();
            for (index, field) in self.group.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, field));
                if index + 1 < count {
                    query.push(',');
                }
                query.push_str(" \n");
            }

            if self.rollup {
                query.push_str("WITH ROLLUP \n");
            }

            // HAVING clause
            if !self.having_list.is_empty() {
                query.push_str(&format!("{}HAVING \n", offset));
                query.push_str(&self.having_list.render_formatted(base));
            }
        }

        // ORDER BY clause
        if !self.order.is_empty() {
            query.push_str(&format!("{}ORDER BY \n", offset));

            let count = self.order.len();
            for (index, field) in self.order.iter().enumerate() {
                query.push_str(&format!("{}    {}", offset, field));
                if index + 1 < count {
                    query.push(',');
                }
                query.push_str(" \n");
            }
        }

        // LIMIT clause
        if let Some(limit) = &self.limit_clause {
            if limit != "0" {
                query.push_str(&format!("{}LIMIT \n{}    {}\n", offset, offset, limit));
            }
        }

        // PROCEDURE clause
        if let Some(procedure) = &self.procedure_clause {
            query.push_str(&format!("{}PROCEDURE \n{}    {} ", offset, offset, procedure));
        }

        if self.for_update {
            query.push_str(&format!("{}FOR UPDATE \n", offset));
        }
        if self.lock_share {
            query.push_str(&format!("{}LOCK IN SHARE MODE \n", offset));
        }

        // union
        if let Some(union) = &mut self.union_clause {
            let other = match union {
                UnionSource::Text(text) => text.trim().to_string(),
                UnionSource::Select(select) => {
                    select.build(0).unwrap_or_default().trim().to_string()
                }
            };

            query = format!("({}) \nUNION \n(\n{})", query, other);
        }

        query
    }
}

impl Statement for SelectBuilder {
    fn build(&mut self, format_offset: usize) -> Option<String> {
        self.format_offset += format_offset;

        if self.from.is_empty() {
            return None;
        }

        if self.context.format {
            Some(self.build_formatted())
        } else {
            Some(self.build_compact())
        }
    }

    fn reset_query(&mut self, format: bool) {
        let mut context = self.context;
        context.format = format;
        *self = SelectBuilder::new(context);
    }
}
