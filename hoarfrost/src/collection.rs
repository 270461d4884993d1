//! Keyed result collections with chainable filters

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::item::CollectionItem;
use crate::value::Value;

/// Comparison applied by a collection filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLogic {
    /// Loose equality, numbers and numeric strings compare equal
    Eq,
    /// Strict equality on type and value
    Seq,
    /// Loose inequality
    Neq,
    /// Strict inequality
    Sneq,
    /// Integer less-than
    Lt,
    /// Integer greater-than
    Gt,
    /// Integer less-than-or-equal
    Lte,
    /// Integer greater-than-or-equal
    Gte,
    /// Case-insensitive substring match
    Like,
    /// Loose membership in a list, comma-split when given as text
    In,
}

impl FilterLogic {
    /// The lowercase name of this comparison.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLogic::Eq => "eq",
            FilterLogic::Seq => "seq",
            FilterLogic::Neq => "neq",
            FilterLogic::Sneq => "sneq",
            FilterLogic::Lt => "lt",
            FilterLogic::Gt => "gt",
            FilterLogic::Lte => "lte",
            FilterLogic::Gte => "gte",
            FilterLogic::Like => "like",
            FilterLogic::In => "in",
        }
    }
}

impl std::fmt::Display for FilterLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One applied filter, kept as history on the collection
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub value: Value,
    pub logic: FilterLogic,
}

/// Byte layout of a serialized collection
#[derive(Serialize, Deserialize)]
struct CollectionPayload {
    #[serde(rename = "totalRecords")]
    total_records: usize,
    items: IndexMap<String, IndexMap<String, Value>>,
}

/// An ordered set of items keyed by their id column, or by position for
/// items without one. `total_records` remembers the size of the original
/// result set and is not touched by filtering.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    rows: IndexMap<String, CollectionItem>,
    filters: Vec<Filter>,
    total_records: usize,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Collection::default()
    }

    // item getter

    /// All items in insertion order.
    pub fn items(&self) -> &IndexMap<String, CollectionItem> {
        &self.rows
    }

    /// The size of the original result set.
    pub fn size(&self) -> usize {
        self.total_records
    }

    /// The item at the given position.
    pub fn item(&self, position: usize) -> Option<&CollectionItem> {
        self.rows.get_index(position).map(|(_, item)| item)
    }

    /// The item stored under the given id.
    pub fn item_by_id(&self, id: &str) -> Option<&CollectionItem> {
        self.rows.get(id)
    }

    /// Mutable access to the item stored under the given id.
    pub fn item_by_id_mut(&mut self, id: &str) -> Option<&mut CollectionItem> {
        self.rows.get_mut(id)
    }

    /// The first item of the collection.
    pub fn first_item(&self) -> Option<&CollectionItem> {
        self.rows.first().map(|(_, item)| item)
    }

    /// The last item of the collection.
    pub fn last_item(&self) -> Option<&CollectionItem> {
        self.rows.last().map(|(_, item)| item)
    }

    /// The first item whose column strictly equals the given value.
    pub fn item_by_column_value(&self, column: &str, value: &Value) -> Option<&CollectionItem> {
        self.rows
            .values()
            .find(|item| &item.get_data(column) == value)
    }

    /// All items whose column strictly equals the given value.
    pub fn items_by_column_value(&self, column: &str, value: &Value) -> Vec<&CollectionItem> {
        self.rows
            .values()
            .filter(|item| &item.get_data(column) == value)
            .collect()
    }

    // getter

    /// All item ids in insertion order.
    pub fn all_ids(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }

    /// The values of one column across all items, optionally deduplicated.
    pub fn column_values(&self, column: &str, unique: bool) -> Vec<Value> {
        let mut values = Vec::new();

        for item in self.rows.values() {
            let value = item.get_data(column);

            if unique && values.contains(&value) {
                continue;
            }

            values.push(value);
        }

        values
    }

    /// Iterate over id and item pairs.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, CollectionItem> {
        self.rows.iter()
    }

    /// Iterate over id and item pairs with mutable items.
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, CollectionItem> {
        self.rows.iter_mut()
    }

    // public methods

    /// Add an item, keyed by its id column when present, positionally
    /// otherwise. Adding a second item with the same id is an error.
    pub fn add_item(&mut self, item: CollectionItem) -> Result<&mut Self> {
        let id = item.id();

        if !id.is_null() {
            let key = id.to_plain_string();

            if self.rows.contains_key(&key) {
                return Err(Error::duplicate_item(&key));
            }

            self.rows.insert(key, item);
        } else {
            insert_positional(&mut self.rows, item);
        }

        self.total_records += 1;
        Ok(self)
    }

    /// Store a field value on every item.
    pub fn set_data_to_all(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();

        for item in self.rows.values_mut() {
            item.set_data(key, value.clone());
        }

        self
    }

    /// The position of an item id, counted in insertion order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.rows.get_index_of(id)
    }

    /// Whether an item with the given id exists.
    pub fn exists(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// Whether the original result set was empty.
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    /// Whether the given item is stored here, compared by its id column.
    pub fn contains(&self, item: &CollectionItem) -> bool {
        let id = item.id();

        if id.is_null() {
            return false;
        }

        self.rows.contains_key(&id.to_plain_string())
    }

    /// The number of items currently held, after any filtering.
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Alias of `count`.
    pub fn length(&self) -> usize {
        self.count()
    }

    /// Serialize all items and the original record count.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = CollectionPayload {
            total_records: self.total_records,
            items: self
                .rows
                .iter()
                .map(|(id, item)| (id.clone(), item.data().clone()))
                .collect(),
        };

        Ok(serde_json::to_vec(&payload)?)
    }

    /// Rebuild a collection from its serialized form, record count included.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let payload: CollectionPayload = serde_json::from_slice(data)?;

        let mut collection = Collection::new();
        collection.total_records = payload.total_records;

        for (id, data) in payload.items {
            collection.rows.insert(id, CollectionItem::from_data(data));
        }

        Ok(collection)
    }

    /// Remove the item with the given id, shrinking the record count.
    pub fn remove_item_by_id(&mut self, id: &str) -> &mut Self {
        if self.rows.shift_remove(id).is_some() {
            self.total_records -= 1;
        }

        self
    }

    /// Drop all items and the record count, keeping the filter history.
    pub fn clear(&mut self) -> &mut Self {
        self.rows.clear();
        self.total_records = 0;
        self
    }

    /// Drop all items, the record count and the filter history.
    pub fn reset(&mut self) -> &mut Self {
        self.clear();
        self.filters.clear();
        self
    }

    // filter

    /// Apply a filter and remember it in the history.
    pub fn add_column_to_filter(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        logic: FilterLogic,
    ) -> &mut Self {
        let value = value.into();

        self.filters.push(Filter {
            field: column.to_string(),
            value: value.clone(),
            logic,
        });

        self.filter_collection(column, &value, logic)
    }

    /// Alias of `add_column_to_filter`.
    pub fn add_field_to_filter(
        &mut self,
        field: &str,
        value: impl Into<Value>,
        logic: FilterLogic,
    ) -> &mut Self {
        self.add_column_to_filter(field, value, logic)
    }

    /// All filters applied so far.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Keep only the items matching the comparison. The surviving items are
    /// re-keyed, the record count stays untouched.
    pub fn filter_collection(
        &mut self,
        field: &str,
        value: &Value,
        logic: FilterLogic,
    ) -> &mut Self {
        // membership lists are converted once
        let members = match logic {
            FilterLogic::In => Some(match value.as_array() {
                Some(values) => values.clone(),
                None => value
                    .to_plain_string()
                    .split(',')
                    .map(Value::from)
                    .collect(),
            }),
            _ => None,
        };

        let mut filtered = IndexMap::new();

        for item in self.rows.values() {
            let data = item.get_data(field);

            let keep = match logic {
                FilterLogic::In => members
                    .as_ref()
                    .map(|members| members.iter().any(|member| data.loose_eq(member)))
                    .unwrap_or(false),
                FilterLogic::Like => data
                    .to_plain_string()
                    .to_lowercase()
                    .contains(&value.to_plain_string().to_lowercase()),
                FilterLogic::Gt => data.as_i64() > value.as_i64(),
                FilterLogic::Lt => data.as_i64() < value.as_i64(),
                FilterLogic::Gte => data.as_i64() >= value.as_i64(),
                FilterLogic::Lte => data.as_i64() <= value.as_i64(),
                FilterLogic::Neq => !data.loose_eq(value),
                FilterLogic::Sneq => &data != value,
                FilterLogic::Seq => &data == value,
                FilterLogic::Eq => data.loose_eq(value),
            };

            if keep {
                let item = item.clone();
                let id = item.id();

                if !id.is_null() {
                    filtered.insert(id.to_plain_string(), item);
                } else {
                    insert_positional(&mut filtered, item);
                }
            }
        }

        self.rows = filtered;
        self
    }

    // callbacks

    /// Visit every item and collect the callback results keyed by item id.
    pub fn walk<T>(&self, mut callback: impl FnMut(&CollectionItem) -> T) -> IndexMap<String, T> {
        let mut results = IndexMap::new();

        for (id, item) in &self.rows {
            results.insert(id.clone(), callback(item));
        }

        results
    }

    /// Run the callback on every item in place.
    pub fn each(&mut self, mut callback: impl FnMut(&mut CollectionItem)) -> &mut Self {
        for item in self.rows.values_mut() {
            callback(item);
        }

        self
    }

    // output

    /// Render the collection as an XML document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<collection>\n");
        xml.push_str(&format!(
            "    <totalRecords>{}</totalRecords>\n",
            self.total_records
        ));
        xml.push_str("    <items>\n");

        for item in self.rows.values() {
            xml.push_str(&item.to_xml(true));
        }

        xml.push_str("    </items>\n");
        xml.push_str("</collection>\n");

        xml
    }

    /// Render the collection as a JSON object of record count and items.
    pub fn to_json(&self, required_fields: &[&str]) -> Result<serde_json::Value> {
        let mut items = serde_json::Map::new();

        for (id, item) in &self.rows {
            items.insert(id.clone(), item.to_json(required_fields)?);
        }

        Ok(serde_json::json!({
            "totalRecords": self.total_records,
            "items": items,
        }))
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a String, &'a CollectionItem);
    type IntoIter = indexmap::map::Iter<'a, String, CollectionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Insert an item without an id under the next free numeric key.
fn insert_positional(rows: &mut IndexMap<String, CollectionItem>, item: CollectionItem) {
    let next = rows
        .keys()
        .filter_map(|key| key.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1);

    rows.insert(next.to_string(), item);
}
