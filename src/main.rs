use anyhow::Result;
use instant_language_switch::page::{
    INDICATOR_ID, TOGGLE_CLASS, TOGGLE_LABEL_CLASS, TRANSLATE_ATTR, TRANSLATE_PLACEHOLDER_ATTR,
};
use instant_language_switch::{
    Config, Element, HttpTranslationSource, LanguageEvents, LanguageSwitcher, MemoryPage,
    MemorySessionStore, Page,
};
use std::sync::Arc;
use tracing::{info, warn};

/// A small page shaped like the application's layout.
fn demo_page() -> MemoryPage {
    let mut page = MemoryPage::new().with_language("en");

    page.push(
        Element::new("button")
            .with_id("language-toggle")
            .with_class(TOGGLE_CLASS),
    );
    page.push(
        Element::new("span")
            .with_class(TOGGLE_LABEL_CLASS)
            .with_text("Change Language"),
    );
    page.push(Element::new("span").with_id(INDICATOR_ID).with_text("English"));
    page.push(
        Element::new("h1")
            .with_attr(TRANSLATE_ATTR, "general_welcome")
            .with_text("Welcome"),
    );
    page.push(
        Element::new("input")
            .with_attr("type", "search")
            .with_attr(TRANSLATE_PLACEHOLDER_ATTR, "general_search")
            .with_attr("placeholder", "Search"),
    );

    page
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("instant_language_switch=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting language switch session against {}", config.base_url);

    let source = Arc::new(HttpTranslationSource::new(&config));
    let events = Arc::new(LanguageEvents::new());
    events.subscribe(|event| info!("Language changed to {}", event.language));

    let switcher = LanguageSwitcher::new(
        config,
        demo_page(),
        source,
        Arc::new(MemorySessionStore::new()),
        events,
    );

    if let Err(e) = switcher.initialize().await {
        warn!("Instant switching unavailable: {}", e);
    }

    let outcome = switcher.toggle().await;
    info!("Toggle outcome: {:?}", outcome);
    switcher.settle().await;

    {
        let page = switcher.page();
        for handle in page.elements_with_attribute(TRANSLATE_ATTR) {
            info!("{:?}: {}", handle, page.text(handle).unwrap_or_default());
        }
        for notification in page.notifications() {
            info!("{:?}: {}", notification.kind, notification.message);
        }
    }

    info!("Metrics: {}", serde_json::to_string(&switcher.metrics())?);
    switcher.dispose();
    Ok(())
}
