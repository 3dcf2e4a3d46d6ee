#![forbid(unsafe_code)]

use ns_server::service::ImportService;
use ns_server::{entry, ops};
use ns_storage::SqliteStore;
use serde_json::{Value, json};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("ns_server_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn service(test_name: &str) -> ImportService {
    ImportService::new(SqliteStore::open(temp_dir(test_name)).expect("open store"))
}

fn request(service: &mut ImportService, body: Value) -> Value {
    entry::handle_request(service, body)
}

fn import_request(episode: i64, number: &str) -> Value {
    json!({
        "op": "chapter_import",
        "owner": "reader_01",
        "original_title": "달빛 아래",
        "chapter_title": format!("{number}화"),
        "chapter_number": number,
        "content": "본문",
        "source_url": format!("https://example.com/viewer/{episode}"),
        "novel_source_url": "https://example.com/novel/77",
    })
}

fn error_code(response: &Value) -> Option<&str> {
    response.get("error_code").and_then(Value::as_str)
}

#[test]
fn every_advertised_op_is_dispatched() {
    let mut service = service("every_advertised_op_is_dispatched");
    for op in ops::op_names() {
        let response = ops::dispatch(&mut service, op, json!({}));
        assert_ne!(
            error_code(&response),
            Some("UNKNOWN_OP"),
            "{op} must be routed"
        );
    }
    let response = ops::dispatch(&mut service, "no_such_op", json!({}));
    assert_eq!(error_code(&response), Some("UNKNOWN_OP"));
}

#[test]
fn missing_op_and_parse_failures_are_structured() {
    let mut service = service("missing_op_and_parse_failures_are_structured");
    let response = request(&mut service, json!({ "owner": "reader_01" }));
    assert_eq!(error_code(&response), Some("INVALID_REQUEST"));
    assert_eq!(
        response.get("http_status").and_then(Value::as_u64),
        Some(400)
    );
}

#[test]
fn import_then_read_back_through_ops() {
    let mut service = service("import_then_read_back_through_ops");

    let imported = request(&mut service, import_request(100, "1"));
    assert_eq!(imported["success"], json!(true));
    let novel_id = imported["novel_id"].as_str().expect("novel id").to_string();
    request(&mut service, import_request(200, "2"));

    let fetched = request(
        &mut service,
        json!({
            "op": "novel_get",
            "owner": "reader_01",
            "novel_id": novel_id,
            "include_content": false,
        }),
    );
    assert_eq!(fetched["success"], json!(true));
    assert_eq!(fetched["chapter_count"], json!(2));
    let chapters = fetched["chapters"].as_array().expect("chapters");
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0]["display_index"], json!(0));
    assert_eq!(chapters[0]["chapter_number"], json!("1"));
    assert!(chapters[0].get("content").is_none());
}

#[test]
fn descending_override_flips_index_addressing() {
    let mut service = service("descending_override_flips_index_addressing");

    let imported = request(&mut service, import_request(100, "1"));
    let novel_id = imported["novel_id"].as_str().expect("novel id").to_string();
    request(&mut service, import_request(200, "2"));
    request(&mut service, import_request(300, "3"));

    let set = request(
        &mut service,
        json!({
            "op": "novel_set_sort_order",
            "owner": "reader_01",
            "novel_id": novel_id,
            "sort_order": "desc",
        }),
    );
    assert_eq!(set["success"], json!(true));

    // Display index 0 now shows the newest chapter.
    let chapter = request(
        &mut service,
        json!({
            "op": "chapter_get",
            "owner": "reader_01",
            "novel_id": novel_id,
            "chapter_index": 0,
        }),
    );
    assert_eq!(chapter["chapter"]["chapter_number"], json!("3"));
    assert_eq!(chapter["chapter"]["position"], json!(2));

    // Deleting display index 0 removes that same chapter, and the rest
    // renormalize to a dense range.
    let deleted = request(
        &mut service,
        json!({
            "op": "chapter_delete",
            "owner": "reader_01",
            "novel_id": novel_id,
            "chapter_index": 0,
        }),
    );
    assert_eq!(deleted["success"], json!(true));

    let fetched = request(
        &mut service,
        json!({
            "op": "novel_get",
            "owner": "reader_01",
            "novel_id": novel_id,
        }),
    );
    let chapters = fetched["chapters"].as_array().expect("chapters");
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0]["chapter_number"], json!("2"));
    assert_eq!(chapters[0]["position"], json!(1));
    assert_eq!(chapters[1]["position"], json!(0));

    // Clearing the override restores ascending display.
    request(
        &mut service,
        json!({
            "op": "novel_set_sort_order",
            "owner": "reader_01",
            "novel_id": novel_id,
            "sort_order": "default",
        }),
    );
    let fetched = request(
        &mut service,
        json!({
            "op": "novel_get",
            "owner": "reader_01",
            "novel_id": novel_id,
        }),
    );
    let chapters = fetched["chapters"].as_array().expect("chapters");
    assert_eq!(chapters[0]["chapter_number"], json!("1"));

    let invalid = request(
        &mut service,
        json!({
            "op": "novel_set_sort_order",
            "owner": "reader_01",
            "novel_id": novel_id,
            "sort_order": "sideways",
        }),
    );
    assert_eq!(error_code(&invalid), Some("INVALID_INPUT"));
}

#[test]
fn translation_worker_round_trip_through_ops() {
    let mut service = service("translation_worker_round_trip_through_ops");

    let mut import = import_request(100, "1");
    import["auto_translate"] = json!(true);
    let imported = request(&mut service, import);
    assert_eq!(imported["translation_queued"], json!(true));

    let claimed = request(
        &mut service,
        json!({ "op": "translation_claim", "owner": "reader_01" }),
    );
    let seq = claimed["job"]["seq"].as_i64().expect("job seq");
    assert_eq!(claimed["job"]["status"], json!("in_progress"));

    let completed = request(
        &mut service,
        json!({
            "op": "translation_complete",
            "owner": "reader_01",
            "seq": seq,
            "translated_title": "Chapter 1",
            "translated_content": "translated body",
            "translation_model": "model-x",
        }),
    );
    assert_eq!(completed["job"]["status"], json!("completed"));

    let novel_id = imported["novel_id"].as_str().expect("novel id").to_string();
    let chapter = request(
        &mut service,
        json!({
            "op": "chapter_get",
            "owner": "reader_01",
            "novel_id": novel_id,
            "chapter_index": 0,
        }),
    );
    assert_eq!(chapter["chapter"]["translation_status"], json!("completed"));
    assert_eq!(chapter["chapter"]["translated_title"], json!("Chapter 1"));
    assert_eq!(
        chapter["chapter"]["translated_content"],
        json!("translated body")
    );

    let drained = request(
        &mut service,
        json!({ "op": "translation_claim", "owner": "reader_01" }),
    );
    assert_eq!(drained["job"], Value::Null);
}

#[test]
fn settings_round_trip_through_ops() {
    let mut service = service("settings_round_trip_through_ops");

    let defaults = request(
        &mut service,
        json!({ "op": "settings_get", "owner": "reader_01" }),
    );
    assert_eq!(defaults["settings"]["default_sort_order"], json!("asc"));
    assert_eq!(defaults["settings"]["max_concurrent_imports"], json!(3));

    let updated = request(
        &mut service,
        json!({
            "op": "settings_update",
            "owner": "reader_01",
            "default_sort_order": "desc",
            "max_concurrent_imports": 50,
        }),
    );
    assert_eq!(updated["settings"]["default_sort_order"], json!("desc"));
    assert_eq!(updated["settings"]["max_concurrent_imports"], json!(10));
}

#[test]
fn batch_op_reports_totals() {
    let mut service = service("batch_op_reports_totals");

    let response = request(
        &mut service,
        json!({
            "op": "chapter_import_batch",
            "owner": "reader_01",
            "chapters": [
                {
                    "original_title": "달빛 아래",
                    "chapter_title": "1화",
                    "chapter_number": "1",
                    "content": "본문",
                    "source_url": "https://example.com/viewer/100",
                },
                {
                    "original_title": "달빛 아래",
                    "chapter_number": "2",
                    "source_url": "https://example.com/viewer/200",
                },
            ],
        }),
    );
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["total"], json!(2));
    assert_eq!(response["successful"], json!(1));
    assert_eq!(response["failed"], json!(1));
    let results = response["results"].as_array().expect("results");
    assert_eq!(results[0]["success"], json!(true));
    assert_eq!(results[1]["success"], json!(false));
}
