use hoarfrost::{Session, SessionConfig, Statement, Value};

fn main() {
    // A session carries the configuration and the replacement tokens
    let mut config = SessionConfig::default();
    config.database = "shop".to_string();
    config.prefix = "app_".to_string();
    let session = Session::new(config);

    // SELECT with bound values
    let mut select = session.select();
    select
        .columns(("id", "name", "email"))
        .from("{PRE}users")
        .where_bind("age > ?", 18)
        .where_bind("city LIKE ?", "%York%")
        .or_where_bind("role IN (?)", vec!["admin", "staff"])
        .order_by("name", hoarfrost::SortOrder::Asc)
        .limit(10);

    println!("SELECT: {}", select.get_query(&session).unwrap());

    // INSERT from a column list and value rows
    let mut insert = session.insert("{PRE}users");
    insert
        .columns(("name", "email", "age"))
        .unwrap()
        .values(vec![
            Value::from("John Doe"),
            Value::from("john@example.com"),
            Value::from(30),
        ])
        .unwrap()
        .on_duplicate("age = VALUES(age)");

    println!("INSERT: {}", insert.get_query(&session).unwrap());

    // UPDATE with bound assignments
    let mut update = session.update("{PRE}users");
    update
        .set_bind("email", "new@example.com")
        .set("last_login = NOW()")
        .where_bind("id = ?", 123);

    println!("UPDATE: {}", update.get_query(&session).unwrap());

    // DELETE with an ordered, limited sweep
    let mut delete = session.delete_from("{PRE}sessions");
    delete
        .where_bind("expires < ?", "2026-01-01 00:00:00")
        .order_by("expires", hoarfrost::SortOrder::Asc)
        .unwrap()
        .limit(100)
        .unwrap();

    println!("DELETE: {}", delete.get_query(&session).unwrap());

    // Builders also work without a session
    let mut detached = hoarfrost::select();
    detached.from("users").where_("active = 1");
    println!("Detached: {}", detached.build(0).unwrap());
}
