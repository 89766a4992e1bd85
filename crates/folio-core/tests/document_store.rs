use std::fs;
use std::thread;

use serde_json::{json, Value};
use tempfile::tempdir;

use folio_core::models::{NewService, Service, ServicePatch};
use folio_core::store::{snapshot, UpdateResult};
use folio_core::{CollectionName, Document, Filter, SortOrder, Store, Update};

fn doc(value: Value) -> Document {
    value
        .as_object()
        .cloned()
        .expect("test records are JSON objects")
}

fn ids(records: &[Document]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record["id"].as_str().expect("id is a string"))
        .collect()
}

#[test]
fn test_active_flag_scenario() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let services = store.get(CollectionName::Services);

    services.insert(doc(json!({"id": "a", "active": true}))).unwrap();
    services.insert(doc(json!({"id": "b", "active": false}))).unwrap();

    let active = services
        .find(Filter::new().eq("active", true))
        .to_list(None)
        .unwrap();
    assert_eq!(active, vec![doc(json!({"id": "a", "active": true}))]);

    assert_eq!(services.count(&Filter::new().eq("active", false)).unwrap(), 1);

    let deleted = services.delete_one(&Filter::by_id("a")).unwrap();
    assert_eq!(deleted.deleted_count, 1);
    assert_eq!(services.find_one(&Filter::by_id("a")).unwrap(), None);
    assert_eq!(services.delete_one(&Filter::by_id("a")).unwrap().deleted_count, 0);
}

#[test]
fn test_insert_then_find_one_round_trip() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let blogs = store.get(CollectionName::Blogs);
    let record = doc(json!({
        "id": "post-1",
        "title": "Launch",
        "tags": ["news", "rust"],
        "meta": {"views": 10, "pinned": null},
        "created_at": "2024-05-01T10:00:00+00:00"
    }));

    blogs.insert(record.clone()).unwrap();

    assert_eq!(blogs.find_one(&Filter::by_id("post-1")).unwrap(), Some(record));
}

#[test]
fn test_filter_keeps_stored_order() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let projects = store.get(CollectionName::Projects);
    for (id, category, featured) in [
        ("p1", "web", true),
        ("p2", "mobile", true),
        ("p3", "web", false),
        ("p4", "web", true),
    ] {
        projects
            .insert(doc(json!({"id": id, "category": category, "featured": featured})))
            .unwrap();
    }
    projects.insert(doc(json!({"id": "p5"}))).unwrap();

    let web = projects
        .find(Filter::new().eq("category", "web"))
        .to_list(None)
        .unwrap();
    assert_eq!(ids(&web), vec!["p1", "p3", "p4"]);

    let featured_web = projects
        .find(Filter::new().eq("category", "web").eq("featured", true))
        .to_list(None)
        .unwrap();
    assert_eq!(ids(&featured_web), vec!["p1", "p4"]);

    assert_eq!(projects.find_all().to_list(None).unwrap().len(), 5);
    assert_eq!(projects.count(&Filter::new()).unwrap(), 5);
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let testimonials = store.get(CollectionName::Testimonials);
    for (id, rating) in [("t1", 4), ("t2", 5), ("t3", 4), ("t4", 3), ("t5", 5)] {
        testimonials
            .insert(doc(json!({"id": id, "rating": rating})))
            .unwrap();
    }

    let ascending = testimonials
        .find_all()
        .sort("rating", SortOrder::Ascending)
        .to_list(None)
        .unwrap();
    assert_eq!(ids(&ascending), vec!["t4", "t1", "t3", "t2", "t5"]);

    let descending = testimonials
        .find_all()
        .sort("rating", SortOrder::try_from(-1).unwrap())
        .to_list(None)
        .unwrap();
    assert_eq!(ids(&descending), vec!["t2", "t5", "t1", "t3", "t4"]);
}

#[test]
fn test_sort_puts_missing_fields_first() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let blogs = store.get(CollectionName::Blogs);
    blogs
        .insert(doc(json!({"id": "b1", "created_at": "2024-03-01T00:00:00Z"})))
        .unwrap();
    blogs.insert(doc(json!({"id": "b2"}))).unwrap();
    blogs
        .insert(doc(json!({"id": "b3", "created_at": "2024-01-01T00:00:00Z"})))
        .unwrap();

    let newest_first = blogs
        .find_all()
        .sort("created_at", SortOrder::Descending)
        .to_list(None)
        .unwrap();
    assert_eq!(ids(&newest_first), vec!["b1", "b3", "b2"]);

    let oldest_first = blogs
        .find_all()
        .sort("created_at", SortOrder::Ascending)
        .to_list(None)
        .unwrap();
    assert_eq!(ids(&oldest_first), vec!["b2", "b3", "b1"]);
}

#[test]
fn test_limits_compose_after_sort() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let offers = store.get(CollectionName::Offers);
    for n in 0..10 {
        offers
            .insert(doc(json!({"id": format!("o{}", n), "rank": 10 - n})))
            .unwrap();
    }

    let cursor = offers.find_all().sort("rank", SortOrder::Ascending);
    assert_eq!(cursor.limit(3).to_list(Some(5)).unwrap().len(), 3);
    assert_eq!(cursor.limit(5).to_list(Some(2)).unwrap().len(), 2);
    assert_eq!(cursor.to_list(Some(4)).unwrap().len(), 4);
    assert_eq!(cursor.limit(0).to_list(None).unwrap().len(), 10);

    let top = cursor.limit(2).to_list(None).unwrap();
    assert_eq!(ids(&top), vec!["o9", "o8"]);
}

#[test]
fn test_cursor_builders_do_not_mutate() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let offers = store.get(CollectionName::Offers);
    for id in ["x", "y", "z"] {
        offers.insert(doc(json!({"id": id}))).unwrap();
    }

    let base = offers.find_all();
    let sorted = base.sort("id", SortOrder::Descending);
    let limited = sorted.limit(1);

    assert_eq!(ids(&base.to_list(None).unwrap()), vec!["x", "y", "z"]);
    assert_eq!(ids(&sorted.to_list(None).unwrap()), vec!["z", "y", "x"]);
    assert_eq!(ids(&limited.to_list(None).unwrap()), vec!["z"]);
}

#[test]
fn test_cursor_reads_latest_snapshot() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let contacts = store.get(CollectionName::Contacts);
    let unread = contacts.find(Filter::new().eq("read", false));

    assert!(unread.to_list(None).unwrap().is_empty());

    contacts.insert(doc(json!({"id": "c1", "read": false}))).unwrap();
    assert_eq!(unread.to_list(None).unwrap().len(), 1);
    assert_eq!(unread.to_list(None).unwrap(), unread.to_list(None).unwrap());
}

#[test]
fn test_update_sets_and_unsets_first_match_only() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let contacts = store.get(CollectionName::Contacts);
    contacts
        .insert(doc(json!({"id": "c1", "email": "same@example.com", "read": false, "note": "x"})))
        .unwrap();
    contacts
        .insert(doc(json!({"id": "c2", "email": "same@example.com", "read": false})))
        .unwrap();

    let result = contacts
        .update_one(
            &Filter::new().eq("email", "same@example.com"),
            &Update::new().set("read", true).unset("note"),
            false,
        )
        .unwrap();

    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);
    assert_eq!(
        contacts.find_one(&Filter::by_id("c1")).unwrap(),
        Some(doc(json!({"id": "c1", "email": "same@example.com", "read": true})))
    );
    assert_eq!(contacts.count(&Filter::new().eq("read", false)).unwrap(), 1);
}

#[test]
fn test_update_without_match_reports_zero() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let services = store.get(CollectionName::Services);
    services.insert(doc(json!({"id": "s1"}))).unwrap();

    let result = services
        .update_one(&Filter::by_id("missing"), &Update::new().set("active", false), false)
        .unwrap();

    assert_eq!(result, UpdateResult::default());
    assert_eq!(services.count(&Filter::new()).unwrap(), 1);
}

#[test]
fn test_upsert_inserts_once_then_converges() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let media = store.get(CollectionName::MediaSettings);
    let update = Update::new().set("logo", "/uploads/logo.png");

    let first = media.update_one(&Filter::by_id("main"), &update, true).unwrap();
    assert_eq!(first.matched_count, 0);
    assert_eq!(first.modified_count, 1);
    let generated = first.upserted_id.expect("upsert reports generated id");

    let stored = media
        .find_one(&Filter::by_id("main"))
        .unwrap()
        .expect("upserted record exists");
    assert_eq!(stored["logo"], json!("/uploads/logo.png"));
    assert_eq!(stored["_id"], json!(generated));

    let second = media
        .update_one(
            &Filter::by_id("main"),
            &Update::new().set("logo", "/uploads/logo-v2.png"),
            true,
        )
        .unwrap();
    assert_eq!(second.matched_count, 1);
    assert_eq!(second.modified_count, 1);
    assert_eq!(second.upserted_id, None);
    assert_eq!(media.count(&Filter::new()).unwrap(), 1);
    assert_eq!(
        media.find_one(&Filter::by_id("main")).unwrap().unwrap()["logo"],
        json!("/uploads/logo-v2.png")
    );
}

#[test]
fn test_corrupt_snapshot_reads_empty_and_is_replaced() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let projects = store.get(CollectionName::Projects);
    fs::write(projects.path(), b"{ definitely not json").unwrap();

    assert!(snapshot::load(projects.path()).unwrap().is_recovered());
    assert_eq!(projects.count(&Filter::new()).unwrap(), 0);
    assert_eq!(projects.find_one(&Filter::by_id("p1")).unwrap(), None);

    projects.insert(doc(json!({"id": "p1"}))).unwrap();

    let raw = fs::read_to_string(projects.path()).unwrap();
    let parsed: Vec<Document> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, vec![doc(json!({"id": "p1"}))]);
}

#[test]
fn test_unreadable_snapshot_is_a_storage_error() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let projects = store.get(CollectionName::Projects);
    // A directory where the snapshot file should be cannot be read as a file.
    fs::create_dir(projects.path()).unwrap();

    let err = projects.count(&Filter::new()).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn test_handles_share_one_snapshot() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");

    store
        .collection("offers")
        .unwrap()
        .insert(doc(json!({"id": "o1"})))
        .unwrap();

    let reopened = Store::open(dir.path()).expect("reopen store");
    assert_eq!(
        reopened.get(CollectionName::Offers).count(&Filter::new()).unwrap(),
        1
    );
}

#[test]
fn test_concurrent_writers_in_one_process_lose_nothing() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let contacts = store.get(CollectionName::Contacts);
            thread::spawn(move || {
                for n in 0..5 {
                    contacts
                        .insert(doc(json!({"id": format!("w{}-{}", worker, n)})))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    assert_eq!(
        store.get(CollectionName::Contacts).count(&Filter::new()).unwrap(),
        40
    );
}

#[test]
fn test_typed_records_round_trip() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open store");
    let services = store.records::<Service>();
    let service = NewService {
        title: "Web Design".to_string(),
        description: "Sites".to_string(),
        price: "$500".to_string(),
        duration: "2 weeks".to_string(),
        features: vec!["Responsive".to_string()],
        icon: "globe".to_string(),
        active: true,
    }
    .into_record();

    services.insert_as(&service).unwrap();
    let patch = ServicePatch {
        price: Some("$650".to_string()),
        ..Default::default()
    };
    services
        .update_one(
            &Filter::by_id(service.id.clone()),
            &Update::new().set_from(&patch).unwrap(),
            false,
        )
        .unwrap();

    let stored: Service = services
        .find_one_as(&Filter::by_id(service.id.clone()))
        .unwrap()
        .expect("service stored");
    assert_eq!(stored.price, "$650");
    assert_eq!(stored.title, service.title);
    assert_eq!(stored.created_at, service.created_at);

    let listed: Vec<Service> = services
        .find(Filter::new().eq("active", true))
        .to_list_as(None)
        .unwrap();
    assert_eq!(listed.len(), 1);
}
