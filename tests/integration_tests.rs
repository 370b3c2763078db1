//! Integration tests for instant language switching
//!
//! These tests drive a `LanguageSwitcher` against a mocked translation server
//! and an in-memory page, covering the end-to-end flows: preload, toggle,
//! fallback dictionaries and the detached preference sync.

use std::sync::Arc;
use std::time::Duration;

use instant_language_switch::page::{TOGGLE_CLASS, TOGGLE_LABEL_CLASS, TRANSLATE_ATTR};
use instant_language_switch::{
    Config, DictionaryOrigin, Element, ElementHandle, HttpTranslationSource, Language,
    LanguageChanged, LanguageEvents, LanguageSwitcher, MemoryPage, MemorySessionStore,
    NotificationKind, Page, SessionStore, ToggleOutcome,
};
use parking_lot::Mutex;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ==================== Test Helpers ====================

fn create_test_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.to_string(),
        fetch_attempts: 1,
        fetch_retry_delay: Duration::from_millis(5),
        ..Config::default()
    }
}

struct Fixture {
    switcher: LanguageSwitcher<MemoryPage>,
    store: Arc<MemorySessionStore>,
    greeting: ElementHandle,
    label: ElementHandle,
    seen: Arc<Mutex<Vec<serde_json::Value>>>,
}

fn create_fixture(server: &MockServer) -> Fixture {
    let mut page = MemoryPage::new()
        .with_language("en")
        .with_meta("csrf-token", "csrf-abc");
    let greeting = page.push(
        Element::new("span")
            .with_attr(TRANSLATE_ATTR, "greeting")
            .with_text("Hello"),
    );
    page.push(Element::new("button").with_class(TOGGLE_CLASS));
    let label = page.push(
        Element::new("span")
            .with_class(TOGGLE_LABEL_CLASS)
            .with_text("Change Language"),
    );

    let config = create_test_config(&server.uri());
    let store = Arc::new(MemorySessionStore::new());
    let events = Arc::new(LanguageEvents::new());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    events.subscribe(move |event: &LanguageChanged| {
        sink.lock().push(serde_json::to_value(event).unwrap());
    });

    let switcher = LanguageSwitcher::new(
        config.clone(),
        page,
        Arc::new(HttpTranslationSource::new(&config)),
        store.clone(),
        events,
    );

    Fixture {
        switcher,
        store,
        greeting,
        label,
        seen,
    }
}

async fn mount_dictionary(server: &MockServer, code: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/translations/{}", code)))
        .and(header("X-CSRFToken", "csrf-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_failure(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_preference(server: &MockServer, code: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/set_language/{}", code)))
        .and(header("X-CSRFToken", "csrf-abc"))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

// ==================== Initialization Tests ====================

#[tokio::test]
async fn test_initialize_loads_every_language() {
    let server = MockServer::start().await;
    mount_dictionary(&server, "en", serde_json::json!({"greeting": "Hello"})).await;
    mount_failure(&server, "/api/translations/ha", 500).await;

    let fixture = create_fixture(&server);
    fixture.switcher.initialize().await.expect("Should initialize");

    for language in Language::ALL {
        assert!(fixture.switcher.dictionary_origin(language).is_some());
    }
    assert_eq!(
        fixture.switcher.dictionary_origin(Language::ENGLISH),
        Some(DictionaryOrigin::Fetched)
    );
    assert_eq!(
        fixture.switcher.dictionary_origin(Language::HAUSA),
        Some(DictionaryOrigin::Fallback)
    );
}

// ==================== Toggle Scenarios ====================

#[tokio::test]
async fn test_toggle_to_hausa_rewrites_page() {
    let server = MockServer::start().await;
    mount_dictionary(&server, "en", serde_json::json!({"greeting": "Hello"})).await;
    mount_dictionary(&server, "ha", serde_json::json!({"greeting": "Sannu"})).await;
    mount_preference(&server, "ha", 200).await;

    let fixture = create_fixture(&server);
    fixture.switcher.initialize().await.unwrap();

    let outcome = fixture.switcher.toggle().await;
    fixture.switcher.settle().await;

    assert_eq!(outcome, ToggleOutcome::Switched(Language::HAUSA));
    assert_eq!(fixture.switcher.current_language(), Language::HAUSA);
    assert!(!fixture.switcher.is_switching());
    assert_eq!(fixture.store.get("currentLanguage").as_deref(), Some("ha"));
    assert_eq!(
        *fixture.seen.lock(),
        vec![serde_json::json!({ "language": "ha" })]
    );

    let page = fixture.switcher.page();
    assert_eq!(page.text(fixture.greeting).as_deref(), Some("Sannu"));
    assert_eq!(page.document_language().as_deref(), Some("ha"));
    assert_eq!(page.text(fixture.label).as_deref(), Some("Canja Harshe"));
}

#[tokio::test]
async fn test_toggle_with_failed_hausa_fetch_uses_fallback_strings() {
    let server = MockServer::start().await;
    mount_dictionary(&server, "en", serde_json::json!({"greeting": "Hello"})).await;
    mount_failure(&server, "/api/translations/ha", 503).await;
    mount_preference(&server, "ha", 200).await;

    let fixture = create_fixture(&server);
    fixture.switcher.initialize().await.unwrap();

    let outcome = fixture.switcher.toggle().await;
    fixture.switcher.settle().await;

    assert_eq!(outcome, ToggleOutcome::Switched(Language::HAUSA));
    assert_eq!(fixture.switcher.current_language(), Language::HAUSA);
    assert_eq!(
        fixture.switcher.translate("general_toggle_language", None),
        "Canja Harshe"
    );
    assert_eq!(
        fixture.switcher.translate("general_loading", None),
        "Ana loda..."
    );

    let page = fixture.switcher.page();
    assert_eq!(page.text(fixture.label).as_deref(), Some("Canja Harshe"));
    // No Hausa string for the greeting: the rendered text stays.
    assert_eq!(page.text(fixture.greeting).as_deref(), Some("Hello"));
}

#[tokio::test]
async fn test_preference_sync_failure_does_not_roll_back() {
    let server = MockServer::start().await;
    mount_dictionary(&server, "en", serde_json::json!({"greeting": "Hello"})).await;
    mount_dictionary(&server, "ha", serde_json::json!({"greeting": "Sannu"})).await;
    mount_preference(&server, "ha", 500).await;

    let fixture = create_fixture(&server);
    fixture.switcher.initialize().await.unwrap();

    fixture.switcher.toggle().await;
    fixture.switcher.settle().await;

    assert_eq!(fixture.switcher.current_language(), Language::HAUSA);
    assert_eq!(fixture.store.get("currentLanguage").as_deref(), Some("ha"));
    assert_eq!(fixture.switcher.metrics().sync_failures, 1);
    assert!(fixture
        .switcher
        .page()
        .notifications()
        .iter()
        .all(|n| n.kind != NotificationKind::Error));
}

#[tokio::test]
async fn test_overlapping_toggles_switch_once() {
    let server = MockServer::start().await;
    mount_dictionary(&server, "en", serde_json::json!({"greeting": "Hello"})).await;
    mount_dictionary(&server, "ha", serde_json::json!({"greeting": "Sannu"})).await;
    mount_preference(&server, "ha", 200).await;

    let fixture = create_fixture(&server);
    fixture.switcher.initialize().await.unwrap();

    let (first, second) = tokio::join!(fixture.switcher.toggle(), fixture.switcher.toggle());
    fixture.switcher.settle().await;

    let outcomes = [first, second];
    assert!(outcomes.contains(&ToggleOutcome::Switched(Language::HAUSA)));
    assert!(outcomes.contains(&ToggleOutcome::AlreadySwitching));
    assert_eq!(fixture.switcher.current_language(), Language::HAUSA);
    assert_eq!(fixture.seen.lock().len(), 1);
}

#[tokio::test]
async fn test_unknown_key_translates_to_itself() {
    let server = MockServer::start().await;
    mount_failure(&server, "/api/translations/en", 404).await;
    mount_failure(&server, "/api/translations/ha", 404).await;

    let fixture = create_fixture(&server);
    fixture.switcher.initialize().await.unwrap();

    assert_eq!(
        fixture.switcher.translate("reports_monthly_title", None),
        "reports_monthly_title"
    );
}
