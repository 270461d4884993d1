//! TRUNCATE query builder

use crate::builder::common::{QueryContext, Statement};

/// Builder for TRUNCATE TABLE statements.
#[derive(Debug, Clone)]
pub struct TruncateBuilder {
    context: QueryContext,
    format_offset: usize,
    table: Option<String>,
}

impl TruncateBuilder {
    /// Create an empty TRUNCATE builder with the given context.
    pub fn new(context: QueryContext) -> Self {
        TruncateBuilder {
            context,
            format_offset: 0,
            table: None,
        }
    }

    /// Set the table to truncate, replacing any earlier choice.
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }
}

impl Statement for TruncateBuilder {
    fn build(&mut self, format_offset: usize) -> Option<String> {
        let table = self.table.clone()?;

        if self.context.format {
            self.format_offset += format_offset;
            let offset = " ".repeat(self.format_offset);

            return Some(format!("TRUNCATE TABLE\n{}    {}", offset, table));
        }

        Some(format!("TRUNCATE TABLE {}", table))
    }

    fn reset_query(&mut self, format: bool) {
        let mut context = self.context;
        context.format = format;
        *self = TruncateBuilder::new(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        let mut truncate = TruncateBuilder::new(QueryContext::new(false, true));
        truncate.table("sessions");
        assert_eq!(
            truncate.build(0),
            Some("TRUNCATE TABLE sessions".to_string())
        );
    }

    #[test]
    fn test_truncate_without_table() {
        let mut truncate = TruncateBuilder::new(QueryContext::new(false, true));
        assert_eq!(truncate.build(0), None);
    }

    #[test]
    fn test_last_table_wins() {
        let mut truncate = TruncateBuilder::new(QueryContext::new(false, true));
        truncate.table("first").table("second");
        assert_eq!(
            truncate.build(0),
            Some("TRUNCATE TABLE second".to_string())
        );
    }

    #[test]
    fn test_formatted_truncate() {
        let mut truncate = TruncateBuilder::new(QueryContext::new(true, true));
        truncate.table("sessions");
        assert_eq!(
            truncate.build(4),
            Some("TRUNCATE TABLE\n        sessions".to_string())
        );
    }
}
