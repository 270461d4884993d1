use hoarfrost::{Collection, CollectionItem, FilterLogic, Value};
use indexmap::indexmap;

fn main() {
    // Collections hold items keyed by their id column
    let mut users = Collection::new();

    for (id, name, age) in [(1, "ada", 36), (2, "grace", 45), (3, "edsger", 41)] {
        let row = indexmap! {
            "id".to_string() => Value::from(id),
            "name".to_string() => Value::from(name),
            "age".to_string() => Value::from(age),
        };
        users.add_item(CollectionItem::from_data(row)).unwrap();
    }

    println!("ids: {:?}", users.all_ids());
    println!("names: {:?}", users.column_values("name", false));

    // Filters narrow the rows while size() remembers the original count
    users.add_column_to_filter("age", 40, FilterLogic::Gt);

    println!("over forty: {:?}", users.all_ids());
    println!("kept {} of {}", users.count(), users.size());

    // Items track their own modifications
    if let Some(item) = users.item_by_id_mut("2") {
        item.set_data("age", Value::from(46));
        println!("changed: {}", item.has_changed_data());
    }

    // Export the remaining rows
    println!("{}", users.to_xml());
    println!("{}", users.to_json(&["name", "age"]).unwrap());
}
