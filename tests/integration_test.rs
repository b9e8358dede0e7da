/// End-to-end integration tests for the Cursor History Explorer
///
/// These tests verify complete workflows: store → catalog → resolve / search / stats
mod common;

use chrono::{DateTime, Utc};
use cursor_history_explorer::filters::{CatalogFilter, TimeRange, TimeReference, list_filtered};
use cursor_history_explorer::models::{Role, TitleSource};
use cursor_history_explorer::search::{SearchOptions, search};
use cursor_history_explorer::stats::compute_stats;
use cursor_history_explorer::{Resolution, Store, build_catalog, parse_search_query, resolve};
use common::{ConversationBuilder, DAY_MS, MessageBuilder, NOW_MS, StoreBuilder, realistic_store};

fn reference() -> TimeReference {
    TimeReference::utc(DateTime::<Utc>::from_timestamp_millis(NOW_MS).unwrap())
}

#[test]
fn test_e2e_build_catalog_from_store() {
    let built = realistic_store();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();

    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.report.skipped(), 0);

    // Newest first, undated last
    let ids: Vec<&str> = catalog.conversations.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c0a1f9e2-login", "d4b7c3a0-migrate", "e9f0d1c2-old", "f1e2d3c4-undated"]);

    let login = catalog.get("c0a1f9e2-login").unwrap();
    assert_eq!(login.title, "Fix login bug");
    assert_eq!(login.subtitle.as_deref(), Some("auth.rs"));
    assert_eq!(login.message_count, 2);
    assert_eq!(login.total_lines_added, 12);
}

#[test]
fn test_e2e_title_falls_back_to_first_user_message() {
    let built = realistic_store();
    let catalog = build_catalog(&Store::open(built.path()).unwrap()).unwrap();

    let migrate = catalog.get("d4b7c3a0-migrate").unwrap();
    assert_eq!(migrate.title, "Write a database migration for postgres");
    assert_eq!(migrate.title_source, TitleSource::FirstUserMessage);
}

#[test]
fn test_e2e_messages_loaded_lazily_in_order() {
    let built = StoreBuilder::new()
        .with_thread(
            ConversationBuilder::new("c1").name("Ordering"),
            vec![
                MessageBuilder::assistant("b", "second").created_at(2_000),
                MessageBuilder::user("a", "first").created_at_iso("1970-01-01T00:00:01Z"),
                MessageBuilder::user("c", "third").created_at(3_000),
            ],
        )
        .build();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();

    let batch = catalog.get("c1").unwrap().messages(&store).unwrap();
    let texts: Vec<&str> = batch.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(batch.messages[0].role, Role::User);
    assert_eq!(batch.messages[1].role, Role::Assistant);
}

#[test]
fn test_e2e_resolve_by_id_prefix_and_title() {
    let built = realistic_store();
    let catalog = build_catalog(&Store::open(built.path()).unwrap()).unwrap();
    let filter = CatalogFilter::default();

    let by_prefix = resolve(&catalog.conversations, "d4b7", &filter);
    assert!(matches!(by_prefix, Resolution::Found(ref c) if c.id == "d4b7c3a0-migrate"));

    let by_title = resolve(&catalog.conversations, "login", &filter);
    assert!(matches!(by_title, Resolution::Found(ref c) if c.id == "c0a1f9e2-login"));

    // Archived conversations need the override
    assert_eq!(resolve(&catalog.conversations, "Old experiment", &filter), Resolution::NotFound);
    let with_archived = resolve(&catalog.conversations, "Old experiment", &filter.include_archived(true));
    assert!(matches!(with_archived, Resolution::Found(_)));
}

#[test]
fn test_e2e_resolve_duplicate_titles_is_ambiguous() {
    let built = StoreBuilder::new()
        .with_conversation(ConversationBuilder::new("aaa").name("Refactor tests").days_ago(5))
        .with_conversation(ConversationBuilder::new("bbb").name("Refactor tests").days_ago(2))
        .build();
    let catalog = build_catalog(&Store::open(built.path()).unwrap()).unwrap();

    match resolve(&catalog.conversations, "refactor tests", &CatalogFilter::default()) {
        Resolution::Ambiguous(candidates) => {
            let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["bbb", "aaa"]);
        }
        other => panic!("expected ambiguous resolution, got {:?}", other),
    }

    // An exact id still wins
    assert!(matches!(
        resolve(&catalog.conversations, "aaa", &CatalogFilter::default()),
        Resolution::Found(ref c) if c.id == "aaa"
    ));
}

#[test]
fn test_e2e_search_across_messages_and_diffs() {
    let built = realistic_store();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();

    let query = parse_search_query("postgres rollback").unwrap();
    let results = search(&catalog.conversations, &store, &query, &SearchOptions::default()).unwrap();
    let ids: Vec<&str> = results.page.items.iter().map(|h| h.conversation.id.as_str()).collect();
    assert_eq!(ids, vec!["d4b7c3a0-migrate"]);

    let query = parse_search_query("\"cost: 12\"").unwrap();
    let without = search(&catalog.conversations, &store, &query, &SearchOptions::default()).unwrap();
    assert_eq!(without.page.total_count, 0);

    let options = SearchOptions { include_diffs: true, ..SearchOptions::default() };
    let with = search(&catalog.conversations, &store, &query, &options).unwrap();
    assert_eq!(with.page.total_count, 1);
    assert_eq!(with.page.items[0].conversation.id, "c0a1f9e2-login");
}

#[test]
fn test_e2e_search_searches_code_diff_records() {
    let built = StoreBuilder::new()
        .with_conversation(ConversationBuilder::new("c1").name("Edits"))
        .with_code_diff("c1", "d1", serde_json::json!({"newModelDiffWrtV0": [{"modified": ["fn tokenize_input()"]}]}))
        .build();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();
    let query = parse_search_query("tokenize_input").unwrap();

    let options = SearchOptions { include_diffs: true, ..SearchOptions::default() };
    let results = search(&catalog.conversations, &store, &query, &options).unwrap();
    assert_eq!(results.page.total_count, 1);
}

#[test]
fn test_e2e_archived_toggle_affects_list_search_and_stats() {
    let built = realistic_store();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();
    let query = parse_search_query("postgres").unwrap();

    let default = CatalogFilter::default();
    let all = CatalogFilter::default().include_archived(true);

    let (listed, _) = list_filtered(&catalog.conversations, &default, None);
    let (listed_all, _) = list_filtered(&catalog.conversations, &all, None);
    assert_eq!(listed.len() + 1, listed_all.len());

    let found = search(&catalog.conversations, &store, &query, &SearchOptions::default()).unwrap();
    let found_all =
        search(&catalog.conversations, &store, &query, &SearchOptions { filter: all, ..SearchOptions::default() })
            .unwrap();
    assert_eq!(found.page.total_count + 1, found_all.page.total_count);

    let counted = compute_stats(&catalog.conversations, &default).summary.count;
    let counted_all = compute_stats(&catalog.conversations, &all).summary.count;
    assert_eq!(counted + 1, counted_all);
}

#[test]
fn test_e2e_time_filter_excludes_undated_record_only() {
    let built = realistic_store();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();

    let range = TimeRange::parse(Some("1w"), None, &reference()).unwrap();
    let filter = CatalogFilter::with_range(range);
    let (listed, outcome) = list_filtered(&catalog.conversations, &filter, None);

    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c0a1f9e2-login", "d4b7c3a0-migrate"]);
    assert_eq!(outcome.excluded_unknown_time, 1);
    assert_eq!(outcome.excluded_archived, 1);

    // Unbounded listing still includes the undated record
    let (unbounded, _) = list_filtered(&catalog.conversations, &CatalogFilter::default(), None);
    assert!(unbounded.iter().any(|c| c.id == "f1e2d3c4-undated"));
}

#[test]
fn test_e2e_before_bare_date_excludes_whole_day() {
    let built = StoreBuilder::new()
        .with_conversation(ConversationBuilder::new("day-before").name("a").created_at(NOW_MS - 4 * DAY_MS))
        .with_conversation(ConversationBuilder::new("that-day").name("b").created_at(NOW_MS - 3 * DAY_MS))
        .build();
    let catalog = build_catalog(&Store::open(built.path()).unwrap()).unwrap();

    let range = TimeRange::parse(None, Some("2026-03-12"), &reference()).unwrap();
    let (listed, _) = list_filtered(&catalog.conversations, &CatalogFilter::with_range(range), None);
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["day-before"]);
}

#[test]
fn test_e2e_malformed_records_are_skipped_and_counted() {
    let built = StoreBuilder::new()
        .with_conversation(ConversationBuilder::new("good").name("Good").days_ago(1))
        .with_raw("composerData:broken", Some("{\"composerId\": "))
        .with_raw("composerData:null-value", None)
        .with_message("good", MessageBuilder::user("m1", "hello"))
        .with_message("good", MessageBuilder::with_type("m2", 7, "system noise"))
        .build();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.report.conversations_skipped, 1);
    assert_eq!(catalog.report.messages_skipped, 1);

    let batch = catalog.get("good").unwrap().messages(&store).unwrap();
    assert_eq!(batch.messages.len(), 1);
    assert_eq!(batch.skipped, 1);
}

#[test]
fn test_e2e_repeated_queries_are_idempotent() {
    let built = realistic_store();
    let store = Store::open(built.path()).unwrap();
    let query = parse_search_query("postgres").unwrap();

    let first_catalog = build_catalog(&store).unwrap();
    let second_catalog = build_catalog(&store).unwrap();
    assert_eq!(first_catalog.conversations, second_catalog.conversations);

    let filter = CatalogFilter::default();
    assert_eq!(
        resolve(&first_catalog.conversations, "login", &filter),
        resolve(&second_catalog.conversations, "login", &filter)
    );
    assert_eq!(
        search(&first_catalog.conversations, &store, &query, &SearchOptions::default()).unwrap(),
        search(&second_catalog.conversations, &store, &query, &SearchOptions::default()).unwrap()
    );
    assert_eq!(
        compute_stats(&first_catalog.conversations, &filter),
        compute_stats(&second_catalog.conversations, &filter)
    );
}

#[test]
fn test_e2e_record_key_is_canonical_conversation_id() {
    let built = StoreBuilder::new()
        .with_raw("composerData:key-id", Some(r#"{"composerId":"payload-id","name":"Zoo notes"}"#))
        .with_message("key-id", MessageBuilder::user("m1", "zebra question"))
        .with_code_diff("key-id", "d1", serde_json::json!({"modified": "fn stripes()"}))
        .build();
    let store = Store::open(built.path()).unwrap();
    let catalog = build_catalog(&store).unwrap();

    let conversation = catalog.get("key-id").unwrap();
    assert!(catalog.get("payload-id").is_none());
    assert_eq!(conversation.message_count, 1);

    let batch = conversation.messages(&store).unwrap();
    assert_eq!(batch.messages.len(), conversation.message_count);
    assert_eq!(conversation.code_diffs(&store).unwrap().len(), 1);

    let query = parse_search_query("zebra").unwrap();
    let results = search(&catalog.conversations, &store, &query, &SearchOptions::default()).unwrap();
    assert_eq!(results.page.total_count, 1);

    let query = parse_search_query("stripes").unwrap();
    let options = SearchOptions { include_diffs: true, ..SearchOptions::default() };
    assert_eq!(search(&catalog.conversations, &store, &query, &options).unwrap().page.total_count, 1);
}
