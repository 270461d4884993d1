use hoarfrost::{Session, SessionConfig, Statement};

fn main() {
    // Formatted sessions render multi-line SQL for logs and debugging
    let mut config = SessionConfig::default();
    config.format = true;
    let session = Session::new(config);

    let mut report = session.select();
    report
        .columns(("u.id", "u.name"))
        .column_as("COUNT(o.id)", "orders")
        .from_as("users", "u")
        .left_join("orders o")
        .on("u.id = o.user_id")
        .where_bind("u.created > ?", "2026-01-01")
        .where_bind("u.state IN (?)", vec!["active", "trial"])
        .group_by("u.id", hoarfrost::SortOrder::Asc)
        .having_bind("COUNT(o.id) > ?", 3)
        .order_by("orders", hoarfrost::SortOrder::Desc)
        .limit(25);

    println!("{}", report.get_query(&session).unwrap());

    // Subqueries are indented one level deeper than their host
    let mut banned = session.select();
    banned.column("user_id").from("bans").where_("lifted = 0");

    let mut cleanup = session.delete_from("sessions");
    cleanup.where_select("user_id IN (?)", banned);

    println!("{}", cleanup.get_query(&session).unwrap());

    // The same builder renders compact after a reset
    cleanup.reset_query(false);
    cleanup.table("sessions").where_("expires < NOW()");
    println!("{}", cleanup.get_query(&session).unwrap());
}
