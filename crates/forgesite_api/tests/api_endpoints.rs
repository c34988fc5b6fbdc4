use forgesite_api::{
    get_active_units, get_aggregate_summary, get_visit_snapshot, post_increment_visits,
    post_reset_visits, post_toggle,
};
use forgesite_core::db::open_db_in_memory;
use rusqlite::Connection;
use serde_json::Value;

#[test]
fn aggregate_summary_reports_every_kind_and_the_composite_statistic() {
    let conn = open_db_in_memory().unwrap();

    let response = get_aggregate_summary(&conn);
    assert_eq!(response.status, 200);

    let body: Value = serde_json::from_str(&response.body).unwrap();
    let count_by_kind = body["countByKind"].as_object().unwrap();
    assert_eq!(count_by_kind.len(), 21);
    assert_eq!(count_by_kind["process:anodizing"], 1);
    assert_eq!(count_by_kind["popup"], 0);
    assert_eq!(body["activeProcesses"], 12);
}

#[test]
fn active_units_listing_is_ordered_and_shaped_for_the_public_site() {
    let conn = open_db_in_memory().unwrap();
    seed_menu_entry(&conn, "contact", 1);
    seed_menu_entry(&conn, "services", 0);

    let response = get_active_units(&conn, "menu-entry");
    assert_eq!(response.status, 200);

    let body: Value = serde_json::from_str(&response.body).unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["identity"], "services");
    assert_eq!(rows[0]["displayName"], "SERVICES");
    assert_eq!(rows[0]["order"], 0);
    assert_eq!(rows[1]["identity"], "contact");
}

#[test]
fn active_units_rejects_unknown_kind_with_400() {
    let conn = open_db_in_memory().unwrap();

    let response = get_active_units(&conn, "not-a-real-kind");
    assert_eq!(response.status, 400);

    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("not-a-real-kind"));
}

#[test]
fn toggle_returns_the_updated_unit() {
    let conn = open_db_in_memory().unwrap();

    let response = post_toggle(
        &conn,
        r#"{"kind": "base-metal:copper", "identity": "copper", "isActive": false}"#,
    );
    assert_eq!(response.status, 200);

    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["kind"], "base-metal:copper");
    assert_eq!(body["identity"], "copper");
    assert_eq!(body["isActive"], false);
}

#[test]
fn toggle_enforces_popup_exclusivity_through_the_boundary() {
    let conn = open_db_in_memory().unwrap();
    seed_popup(&conn, "spring-sale", true);
    seed_popup(&conn, "winter-sale", false);

    let response = post_toggle(
        &conn,
        r#"{"kind": "popup", "identity": "winter-sale", "isActive": true}"#,
    );
    assert_eq!(response.status, 200);

    let listing = get_active_units(&conn, "popup");
    let body: Value = serde_json::from_str(&listing.body).unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["identity"], "winter-sale");
}

#[test]
fn toggle_maps_client_errors_to_400_and_404() {
    let conn = open_db_in_memory().unwrap();

    let bad_json = post_toggle(&conn, "{not json");
    assert_eq!(bad_json.status, 400);

    let bad_kind = post_toggle(
        &conn,
        r#"{"kind": "gold-plating", "identity": "x", "isActive": true}"#,
    );
    assert_eq!(bad_kind.status, 400);

    let bad_identity = post_toggle(
        &conn,
        r#"{"kind": "popup", "identity": "Not A Slug", "isActive": true}"#,
    );
    assert_eq!(bad_identity.status, 400);

    let missing = post_toggle(
        &conn,
        r#"{"kind": "popup", "identity": "no-such-popup", "isActive": false}"#,
    );
    assert_eq!(missing.status, 404);
}

#[test]
fn visit_counter_endpoints_roundtrip() {
    let conn = open_db_in_memory().unwrap();

    let first = post_increment_visits(&conn);
    assert_eq!(first.status, 200);
    let body: Value = serde_json::from_str(&first.body).unwrap();
    assert_eq!(body["count"], 1);

    post_increment_visits(&conn);
    let snapshot = get_visit_snapshot(&conn);
    assert_eq!(snapshot.status, 200);
    let body: Value = serde_json::from_str(&snapshot.body).unwrap();
    assert_eq!(body["count"], 2);
    assert!(body["lastVisitAt"].as_i64().unwrap() > 0);
    assert_eq!(body["isActive"], true);

    let reset = post_reset_visits(&conn);
    assert_eq!(reset.status, 200);
    let body: Value = serde_json::from_str(&get_visit_snapshot(&conn).body).unwrap();
    assert_eq!(body["count"], 0);
}

#[test]
fn snapshot_before_any_visit_is_inactive() {
    let conn = open_db_in_memory().unwrap();

    let response = get_visit_snapshot(&conn);
    assert_eq!(response.status, 200);

    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["count"], 0);
    assert_eq!(body["lastVisitAt"], 0);
    assert_eq!(body["isActive"], false);
}

fn seed_menu_entry(conn: &Connection, slug: &str, sort_order: i64) {
    conn.execute(
        "INSERT INTO menu_entries (slug, display_name, is_active, sort_order)
         VALUES (?1, ?2, 1, ?3);",
        rusqlite::params![slug, slug.to_uppercase(), sort_order],
    )
    .unwrap();
}

fn seed_popup(conn: &Connection, slug: &str, active: bool) {
    conn.execute(
        "INSERT INTO popups (slug, display_name, is_active, sort_order)
         VALUES (?1, ?2, ?3, 0);",
        rusqlite::params![slug, slug.to_uppercase(), i64::from(active)],
    )
    .unwrap();
}
