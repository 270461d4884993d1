//! Single data row inside a result collection

use indexmap::IndexMap;

use crate::error::Result;
use crate::value::Value;

/// One row of a collection, with a change flag that tracks whether any
/// field was touched since the last reset.
#[derive(Debug, Clone, Default)]
pub struct CollectionItem {
    data: IndexMap<String, Value>,
    has_changed_data: bool,
}

impl CollectionItem {
    /// Create an empty item.
    pub fn new() -> Self {
        CollectionItem::default()
    }

    /// Create an item from raw row data. Entries with an empty field name
    /// are dropped, the change flag stays clear.
    pub fn from_data(data: IndexMap<String, Value>) -> Self {
        let mut item = CollectionItem::new();

        for (key, value) in data {
            if !key.is_empty() {
                item.data.insert(key, value);
            }
        }

        item
    }

    /// Store a field value and mark the item as changed.
    pub fn set_data(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.to_string(), value.into());
        self.has_changed_data = true;
        self
    }

    /// The value of a field, `Null` when it is absent.
    pub fn get_data(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    /// The value of the `id` column, `Null` when the item has none.
    pub fn id(&self) -> Value {
        self.get_data("id")
    }

    /// All fields in insertion order.
    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    /// Remove a field and mark the item as changed.
    pub fn unset_data(&mut self, key: &str) -> &mut Self {
        self.data.shift_remove(key);
        self.has_changed_data = true;
        self
    }

    /// Remove all fields and mark the item as changed.
    pub fn clear_data(&mut self) -> &mut Self {
        self.data.clear();
        self.has_changed_data = true;
        self
    }

    /// Whether a field is present with a non-null value.
    pub fn has_data(&self, key: &str) -> bool {
        matches!(self.data.get(key), Some(value) if !value.is_null())
    }

    /// Whether the item holds no fields at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether any field was stored, removed or cleared since the last
    /// `clear_data_changed`.
    pub fn has_changed_data(&self) -> bool {
        self.has_changed_data
    }

    /// Reset the change flag.
    pub fn clear_data_changed(&mut self) -> &mut Self {
        self.has_changed_data = false;
        self
    }

    /// Render the item as XML. With `item_only` the surrounding document
    /// declaration and `<data>` wrapper are left out.
    pub fn to_xml(&self, item_only: bool) -> String {
        let mut xml = String::new();

        if !item_only {
            xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
            xml.push_str("<data>\n");
        }

        xml.push_str("    <item>\n");

        for (key, value) in &self.data {
            xml.push_str(&format!("    <{}>{}</{}>\n", key, value, key));
        }

        xml.push_str("    </item>\n");

        if !item_only {
            xml.push_str("</data>\n");
        }

        xml
    }

    /// Render the item as a JSON object. A non-empty field list restricts
    /// the output to those fields, absent ones export as null.
    pub fn to_json(&self, required_fields: &[&str]) -> Result<serde_json::Value> {
        if !required_fields.is_empty() {
            let mut data = serde_json::Map::new();

            for field in required_fields {
                data.insert(field.to_string(), serde_json::to_value(self.get_data(field))?);
            }

            return Ok(serde_json::Value::Object(data));
        }

        Ok(serde_json::to_value(&self.data)?)
    }
}
