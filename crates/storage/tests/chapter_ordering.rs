#![forbid(unsafe_code)]

use ns_core::ids::{NovelSlug, OwnerId};
use ns_storage::{ChapterImportRequest, NovelCreateRequest, SqliteStore, StoreError};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("ns_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_store(test_name: &str) -> (SqliteStore, OwnerId, NovelSlug) {
    let mut store = SqliteStore::open(temp_dir(test_name)).expect("open store");
    let owner = OwnerId::try_new("reader_01").expect("owner id");
    let slug = NovelSlug::try_new("regressor-tale").expect("novel slug");
    store
        .novel_create(
            &owner,
            NovelCreateRequest {
                slug: slug.as_str().to_string(),
                title: "회귀자의 이야기".to_string(),
                ..Default::default()
            },
        )
        .expect("create novel");
    (store, owner, slug)
}

fn chapter(slug: &str, episode: Option<i64>, number: Option<&str>) -> ChapterImportRequest {
    ChapterImportRequest {
        slug: slug.to_string(),
        title: format!("chapter {slug}"),
        chapter_number: number.map(str::to_string),
        content: "본문".to_string(),
        source_url: episode.map(|id| format!("https://example.com/viewer/{id}")),
        ..Default::default()
    }
}

fn positions(store: &SqliteStore, owner: &OwnerId, slug: &NovelSlug) -> Vec<(String, i64)> {
    store
        .chapter_list(owner, slug)
        .expect("list chapters")
        .into_iter()
        .map(|row| (row.slug, row.position))
        .collect()
}

fn assert_dense(store: &SqliteStore, owner: &OwnerId, slug: &NovelSlug) {
    let rows = positions(store, owner, slug);
    for (index, (_, position)) in rows.iter().enumerate() {
        assert_eq!(
            *position, index as i64,
            "positions must be the dense range 0..N, got {rows:?}"
        );
    }
}

#[test]
fn appends_when_ordering_keys_ascend() {
    let (mut store, owner, slug) = open_store("appends_when_ordering_keys_ascend");

    for (name, episode) in [("ch1", 100), ("ch2", 300), ("ch3", 500)] {
        let outcome = store
            .chapter_import(&owner, &slug, chapter(name, Some(episode), None))
            .expect("import");
        assert!(!outcome.already_exists);
    }

    assert_eq!(
        positions(&store, &owner, &slug),
        vec![
            ("ch1".to_string(), 0),
            ("ch2".to_string(), 1),
            ("ch3".to_string(), 2)
        ]
    );
}

#[test]
fn mid_sequence_insert_shifts_tail() {
    let (mut store, owner, slug) = open_store("mid_sequence_insert_shifts_tail");

    for (name, episode) in [("ch1", 100), ("ch2", 300), ("ch3", 500)] {
        store
            .chapter_import(&owner, &slug, chapter(name, Some(episode), None))
            .expect("import");
    }

    let outcome = store
        .chapter_import(&owner, &slug, chapter("late", Some(400), None))
        .expect("import late scrape");
    assert_eq!(outcome.position, 2);
    assert!(!outcome.already_exists);

    assert_eq!(
        positions(&store, &owner, &slug),
        vec![
            ("ch1".to_string(), 0),
            ("ch2".to_string(), 1),
            ("late".to_string(), 2),
            ("ch3".to_string(), 3)
        ]
    );
}

#[test]
fn insert_at_front_shifts_everything() {
    let (mut store, owner, slug) = open_store("insert_at_front_shifts_everything");

    for (name, episode) in [("ch2", 200), ("ch3", 300)] {
        store
            .chapter_import(&owner, &slug, chapter(name, Some(episode), None))
            .expect("import");
    }

    let outcome = store
        .chapter_import(&owner, &slug, chapter("ch1", Some(100), None))
        .expect("import prologue");
    assert_eq!(outcome.position, 0);
    assert_dense(&store, &owner, &slug);
    assert_eq!(
        positions(&store, &owner, &slug)[0],
        ("ch1".to_string(), 0)
    );
}

#[test]
fn reimport_of_same_source_url_is_a_noop() {
    let (mut store, owner, slug) = open_store("reimport_of_same_source_url_is_a_noop");

    let first = store
        .chapter_import(&owner, &slug, chapter("ch1", Some(100), None))
        .expect("import");
    store
        .chapter_import(&owner, &slug, chapter("ch2", Some(200), None))
        .expect("import");

    let duplicate = store
        .chapter_import(&owner, &slug, chapter("ch1-again", Some(100), None))
        .expect("duplicate import");
    assert!(duplicate.already_exists);
    assert_eq!(duplicate.chapter_id, first.chapter_id);
    assert_eq!(duplicate.position, first.position);

    let rows = positions(&store, &owner, &slug);
    assert_eq!(rows.len(), 2, "duplicate must not add a row: {rows:?}");
    assert_dense(&store, &owner, &slug);
}

#[test]
fn chapter_number_fallback_orders_unkeyed_imports() {
    let (mut store, owner, slug) = open_store("chapter_number_fallback_orders_unkeyed_imports");

    store
        .chapter_import(&owner, &slug, chapter("ch1", None, Some("1")))
        .expect("import");
    store
        .chapter_import(&owner, &slug, chapter("ch3", None, Some("3")))
        .expect("import");
    let outcome = store
        .chapter_import(&owner, &slug, chapter("ch2", None, Some("2")))
        .expect("import");
    assert_eq!(outcome.position, 1);

    assert_eq!(
        positions(&store, &owner, &slug),
        vec![
            ("ch1".to_string(), 0),
            ("ch2".to_string(), 1),
            ("ch3".to_string(), 2)
        ]
    );
}

#[test]
fn bonus_chapter_appends_regardless_of_arrival_order() {
    let (mut store, owner, slug) = open_store("bonus_chapter_appends_regardless_of_arrival_order");

    store
        .chapter_import(&owner, &slug, chapter("bonus", None, Some("BONUS")))
        .expect("import bonus first");
    store
        .chapter_import(&owner, &slug, chapter("ch1", None, Some("1")))
        .expect("import");
    store
        .chapter_import(&owner, &slug, chapter("ch2", None, Some("2")))
        .expect("import");

    assert_eq!(
        positions(&store, &owner, &slug),
        vec![
            ("ch1".to_string(), 0),
            ("ch2".to_string(), 1),
            ("bonus".to_string(), 2)
        ]
    );
}

#[test]
fn explicit_position_inserts_at_requested_slot() {
    let (mut store, owner, slug) = open_store("explicit_position_inserts_at_requested_slot");

    for (name, episode) in [("ch1", 100), ("ch2", 200), ("ch3", 300)] {
        store
            .chapter_import(&owner, &slug, chapter(name, Some(episode), None))
            .expect("import");
    }

    let mut request = chapter("wedge", None, None);
    request.position = Some(1);
    let outcome = store
        .chapter_import(&owner, &slug, request)
        .expect("explicit position import");
    assert_eq!(outcome.position, 1);

    assert_eq!(
        positions(&store, &owner, &slug),
        vec![
            ("ch1".to_string(), 0),
            ("wedge".to_string(), 1),
            ("ch2".to_string(), 2),
            ("ch3".to_string(), 3)
        ]
    );
}

#[test]
fn explicit_position_out_of_range_is_rejected() {
    let (mut store, owner, slug) = open_store("explicit_position_out_of_range_is_rejected");

    store
        .chapter_import(&owner, &slug, chapter("ch1", Some(100), None))
        .expect("import");

    let mut request = chapter("gap", None, None);
    request.position = Some(5);
    let err = store
        .chapter_import(&owner, &slug, request)
        .expect_err("gap position must be rejected");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
    assert_dense(&store, &owner, &slug);
}

#[test]
fn import_into_missing_novel_fails_before_writing() {
    let (mut store, owner, _) = open_store("import_into_missing_novel_fails_before_writing");
    let missing = NovelSlug::try_new("never-created").expect("slug");

    let err = store
        .chapter_import(&owner, &missing, chapter("ch1", Some(100), None))
        .expect_err("missing novel");
    assert!(matches!(err, StoreError::NovelNotFound), "got {err:?}");
}

#[test]
fn delete_renormalizes_remaining_positions() {
    let (mut store, owner, slug) = open_store("delete_renormalizes_remaining_positions");

    for (name, episode) in [("ch1", 100), ("ch2", 200), ("ch3", 300), ("ch4", 400)] {
        store
            .chapter_import(&owner, &slug, chapter(name, Some(episode), None))
            .expect("import");
    }

    let victim = store.chapter_list(&owner, &slug).expect("list")[1].id;
    assert!(
        store
            .chapter_delete(&owner, &slug, victim)
            .expect("delete chapter")
    );

    assert_eq!(
        positions(&store, &owner, &slug),
        vec![
            ("ch1".to_string(), 0),
            ("ch3".to_string(), 1),
            ("ch4".to_string(), 2)
        ]
    );

    assert!(
        !store
            .chapter_delete(&owner, &slug, victim)
            .expect("second delete is a no-op")
    );
}

#[test]
fn interleaved_unkeyed_siblings_are_skipped() {
    let (mut store, owner, slug) = open_store("interleaved_unkeyed_siblings_are_skipped");

    store
        .chapter_import(&owner, &slug, chapter("ch1", Some(100), None))
        .expect("import");
    store
        .chapter_import(&owner, &slug, chapter("extra", None, Some("BONUS")))
        .expect("import unkeyed");
    store
        .chapter_import(&owner, &slug, chapter("ch3", Some(300), None))
        .expect("import");

    // The keyed scan ignores "extra": 200 lands before 300, after the
    // unkeyed sibling that happens to sit between the keyed ones.
    let outcome = store
        .chapter_import(&owner, &slug, chapter("ch2", Some(200), None))
        .expect("import");
    assert_eq!(outcome.position, 2);
    assert_dense(&store, &owner, &slug);
}

#[test]
fn mixed_inserts_and_deletes_keep_the_invariant() {
    let (mut store, owner, slug) = open_store("mixed_inserts_and_deletes_keep_the_invariant");

    for episode in [500, 100, 300, 200, 400] {
        store
            .chapter_import(
                &owner,
                &slug,
                chapter(&format!("ch{episode}"), Some(episode), None),
            )
            .expect("import");
        assert_dense(&store, &owner, &slug);
    }

    assert_eq!(
        positions(&store, &owner, &slug)
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>(),
        vec!["ch100", "ch200", "ch300", "ch400", "ch500"]
    );

    let rows = store.chapter_list(&owner, &slug).expect("list");
    store
        .chapter_delete(&owner, &slug, rows[0].id)
        .expect("delete head");
    assert_dense(&store, &owner, &slug);
    store
        .chapter_delete(&owner, &slug, rows[4].id)
        .expect("delete tail");
    assert_dense(&store, &owner, &slug);

    store
        .chapter_import(&owner, &slug, chapter("ch150", Some(150), None))
        .expect("import");
    assert_dense(&store, &owner, &slug);
    assert_eq!(
        positions(&store, &owner, &slug)
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>(),
        vec!["ch150", "ch200", "ch300", "ch400"]
    );
}
