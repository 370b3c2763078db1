//! The language switcher: language state, dictionary cache and page updates.
//!
//! Lifecycle is explicit: [`LanguageSwitcher::new`] → [`initialize`] →
//! any number of [`toggle`] calls → [`dispose`].
//!
//! [`initialize`]: LanguageSwitcher::initialize
//! [`toggle`]: LanguageSwitcher::toggle
//! [`dispose`]: LanguageSwitcher::dispose

use crate::client::TranslationSource;
use crate::config::Config;
use crate::error::SwitchError;
use crate::events::{LanguageChanged, LanguageEvents, SubscriptionId};
use crate::i18n::{
    keys, Dictionary, DictionaryValidator, Language, MetricsReport, SwitchMetrics, Translator,
};
use crate::page::{Notification, Page, CSRF_META_NAME};
use crate::refresh::{set_loading, RefreshPlan, RefreshScope};
use crate::storage::SessionStore;
use futures::future::join_all;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Progress of the toggle currently running, `Idle` when none is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPhase {
    Idle,
    Loading,
    Committing,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Constructed, `initialize` not yet run
    Created,
    /// `initialize` is running
    Initializing,
    /// Toggles switch in place
    Instant,
    /// Initialization failed; toggles navigate to the server instead
    ReloadFallback,
    Disposed,
}

/// Where a cached dictionary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryOrigin {
    Fetched,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Switched(Language),
    /// Another toggle was running; this one was dropped
    AlreadySwitching,
    /// Reload fallback: the page is navigating to the server-side switch
    Reloading(Language),
    Failed { target: Language, reason: String },
    /// The switcher was never initialized or has been disposed
    Inactive,
}

#[derive(Debug, Clone)]
struct CachedDictionary {
    dictionary: Arc<Dictionary>,
    origin: DictionaryOrigin,
}

#[derive(Debug)]
struct State {
    current: Language,
    cache: HashMap<Language, CachedDictionary>,
    mode: Mode,
    phase: SwitchPhase,
    csrf_token: Option<String>,
    subscription: Option<SubscriptionId>,
}

struct Inner<P> {
    config: Config,
    source: Arc<dyn TranslationSource>,
    store: Arc<dyn SessionStore>,
    events: Arc<LanguageEvents>,
    metrics: Arc<SwitchMetrics>,
    page: Mutex<P>,
    state: Mutex<State>,
    pending_syncs: Mutex<Vec<JoinHandle<()>>>,
}

/// Switches a page between its two languages without reloading it.
///
/// Cloning is cheap and yields a handle to the same switcher.
pub struct LanguageSwitcher<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for LanguageSwitcher<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Page + 'static> LanguageSwitcher<P> {
    pub fn new(
        config: Config,
        page: P,
        source: Arc<dyn TranslationSource>,
        store: Arc<dyn SessionStore>,
        events: Arc<LanguageEvents>,
    ) -> Self {
        let state = State {
            current: config.default_language,
            cache: HashMap::new(),
            mode: Mode::Created,
            phase: SwitchPhase::Idle,
            csrf_token: None,
            subscription: None,
        };

        Self {
            inner: Arc::new(Inner {
                config,
                source,
                store,
                events,
                metrics: Arc::new(SwitchMetrics::new()),
                page: Mutex::new(page),
                state: Mutex::new(state),
                pending_syncs: Mutex::new(Vec::new()),
            }),
        }
    }

    // ==================== Lifecycle ====================

    /// Load both dictionaries and bring the page in line with the current language.
    ///
    /// Dictionary failures never fail initialization; they leave the built-in
    /// strings in the cache. An `Err` means the page itself could not be
    /// updated: the switcher is then in [`Mode::ReloadFallback`] and toggles
    /// navigate to the server instead of switching in place.
    ///
    /// Only one call does the work. A call made while another is still
    /// running returns [`SwitchError::InitializationInProgress`]; a call made
    /// after a successful one returns the current language.
    pub async fn initialize(&self) -> Result<Language, SwitchError> {
        {
            let mut state = self.inner.state.lock();
            match state.mode {
                Mode::Created => state.mode = Mode::Initializing,
                Mode::Initializing => return Err(SwitchError::InitializationInProgress),
                Mode::Instant => {
                    debug!("Language switcher already initialized");
                    return Ok(state.current);
                }
                Mode::ReloadFallback => return Err(SwitchError::NotInitialized),
                Mode::Disposed => return Err(SwitchError::Disposed),
            }
        }

        let (language, csrf_token, declared) = {
            let page = self.inner.page.lock();
            let declared = page.document_language();
            let language = self.resolve_language(declared.as_deref());
            (language, page.meta_content(CSRF_META_NAME), declared)
        };

        {
            let mut state = self.inner.state.lock();
            state.current = language;
            state.csrf_token = csrf_token;
        }
        info!("Initializing language switcher in {} ({})", language.name(), language.code());

        let loaded = join_all(Language::ALL.map(|language| self.load_dictionary(language))).await;
        {
            let mut state = self.inner.state.lock();
            for (language, cached) in Language::ALL.into_iter().zip(loaded) {
                state.cache.insert(language, cached);
            }
        }
        self.validate_dictionaries();

        self.subscribe_to_changes();

        let declared_matches = declared.as_deref().and_then(Language::from_tag) == Some(language);
        let rendered = self.render_initial(language, declared_matches);

        let mut state = self.inner.state.lock();
        if state.mode == Mode::Disposed {
            // Disposed while loading: drop the subscription taken above.
            let subscription = state.subscription.take();
            drop(state);
            if let Some(id) = subscription {
                self.inner.events.unsubscribe(id);
            }
            return Err(SwitchError::Disposed);
        }

        match rendered {
            Ok(()) => {
                state.mode = Mode::Instant;
                drop(state);
                info!("Language switcher ready");
                Ok(language)
            }
            Err(e) => {
                drop(state);
                error!("Language switcher initialization failed, falling back to page reloads: {}", e);
                self.install_reload_fallback();
                Err(e)
            }
        }
    }

    /// Stop reacting to language events and disable toggling.
    ///
    /// Preference syncs already in flight are left to finish.
    pub fn dispose(&self) {
        let subscription = {
            let mut state = self.inner.state.lock();
            state.mode = Mode::Disposed;
            state.subscription.take()
        };

        if let Some(id) = subscription {
            self.inner.events.unsubscribe(id);
        }
        debug!("Language switcher disposed");
    }

    /// Wait for every detached preference sync started so far.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.inner.pending_syncs.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Preference sync task did not complete: {}", e);
            }
        }
    }

    // ==================== Operations ====================

    /// Switch to the other language.
    ///
    /// Never returns an error: failures are reported to the user through a
    /// page notification and described by the returned outcome. Toggle
    /// controls are always re-enabled before this returns.
    pub async fn toggle(&self) -> ToggleOutcome {
        match self.mode() {
            Mode::Instant => {}
            Mode::ReloadFallback => return self.toggle_by_reload(),
            Mode::Created | Mode::Initializing | Mode::Disposed => {
                warn!("Ignoring language toggle: switcher is not active");
                return ToggleOutcome::Inactive;
            }
        }

        let Some(_guard) = SwitchGuard::acquire(self) else {
            debug!("Language switch already in progress, ignoring toggle");
            self.inner.metrics.record_skipped_toggle();
            return ToggleOutcome::AlreadySwitching;
        };

        // Let the loading state render before any work starts.
        tokio::task::yield_now().await;

        let target = self.current_language().other();
        let dictionary = self.ensure_dictionary(target).await;

        self.set_phase(SwitchPhase::Committing);
        let translator = Translator::new(target, Some(dictionary));

        match self.commit(&translator) {
            Ok(()) => {
                info!("Switched language to {} ({})", target.name(), target.code());
                self.inner.metrics.record_switch();
                self.inner
                    .events
                    .publish(&LanguageChanged { language: target });
                self.inner.page.lock().notify(Notification::success(
                    translator.translate(keys::LANGUAGE_CHANGED, None),
                ));
                self.spawn_preference_sync(target);
                ToggleOutcome::Switched(target)
            }
            Err(e) => {
                self.set_phase(SwitchPhase::Failed);
                error!("Failed to switch language to {}: {}", target.code(), e);
                self.inner.metrics.record_failed_switch();
                let message = self.translate(keys::SWITCH_FAILED, None);
                self.inner.page.lock().notify(Notification::error(message));
                ToggleOutcome::Failed {
                    target,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Look up `key` in the current language.
    ///
    /// Resolution order: the current language's dictionary, its built-in
    /// fallback strings, the supplied `fallback`, then `key` itself. An
    /// unknown key therefore comes back unchanged.
    pub fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        self.translator().translate(key, fallback)
    }

    /// Rewrite every translatable element, toggle affordance and indicator
    /// for the current language. Returns the number of writes made.
    pub fn refresh_all_translatable_elements(&self) -> Result<usize, SwitchError> {
        let translator = self.translator();
        let mut page = self.inner.page.lock();
        let plan = RefreshPlan::build(&*page, &translator, RefreshScope::Full);
        Ok(plan.apply(&mut *page)?)
    }

    /// Drop the cached dictionary of `language`.
    ///
    /// The next switch to it fetches the dictionary again, picking up
    /// translations changed on the server. Until then, `translate` in that
    /// language answers from the built-in strings.
    pub fn forget_dictionary(&self, language: Language) -> bool {
        let forgotten = self.inner.state.lock().cache.remove(&language).is_some();
        if forgotten {
            debug!("Forgot cached {} dictionary", language.code());
        }
        forgotten
    }

    // ==================== Observers ====================

    pub fn current_language(&self) -> Language {
        self.inner.state.lock().current
    }

    pub fn phase(&self) -> SwitchPhase {
        self.inner.state.lock().phase
    }

    pub fn is_switching(&self) -> bool {
        self.phase() != SwitchPhase::Idle
    }

    pub fn mode(&self) -> Mode {
        self.inner.state.lock().mode
    }

    pub fn dictionary_origin(&self, language: Language) -> Option<DictionaryOrigin> {
        self.inner
            .state
            .lock()
            .cache
            .get(&language)
            .map(|cached| cached.origin)
    }

    pub fn metrics(&self) -> MetricsReport {
        self.inner.metrics.report()
    }

    pub fn events(&self) -> &Arc<LanguageEvents> {
        &self.inner.events
    }

    /// Exclusive access to the page. Do not hold across `toggle`.
    pub fn page(&self) -> MutexGuard<'_, P> {
        self.inner.page.lock()
    }

    // ==================== Internals ====================

    /// Session store first, then the declared document language, then the default.
    fn resolve_language(&self, declared: Option<&str>) -> Language {
        if let Some(stored) = self.inner.store.get(&self.inner.config.storage_key) {
            match Language::from_tag(&stored) {
                Some(language) => return language,
                None => warn!("Ignoring unsupported stored language '{}'", stored),
            }
        }

        declared
            .and_then(Language::from_tag)
            .unwrap_or(self.inner.config.default_language)
    }

    fn translator(&self) -> Translator {
        let state = self.inner.state.lock();
        let dictionary = state
            .cache
            .get(&state.current)
            .map(|cached| Arc::clone(&cached.dictionary));
        Translator::new(state.current, dictionary)
    }

    fn set_phase(&self, phase: SwitchPhase) {
        self.inner.state.lock().phase = phase;
    }

    fn csrf_token(&self) -> Option<String> {
        self.inner.state.lock().csrf_token.clone()
    }

    /// Fetch a dictionary, substituting the built-in strings on any failure.
    async fn load_dictionary(&self, language: Language) -> CachedDictionary {
        let csrf_token = self.csrf_token();
        self.inner.metrics.record_fetch();

        match self
            .inner
            .source
            .fetch_dictionary(language, csrf_token.as_deref())
            .await
        {
            Ok(dictionary) => {
                debug!("Loaded {} {} translations", dictionary.len(), language.code());
                CachedDictionary {
                    dictionary: Arc::new(dictionary),
                    origin: DictionaryOrigin::Fetched,
                }
            }
            Err(e) => {
                warn!(
                    "Using built-in {} strings, dictionary fetch failed: {}",
                    language.name(),
                    e
                );
                self.inner.metrics.record_fetch_failure();
                CachedDictionary {
                    dictionary: Arc::new(language.fallback().to_dictionary()),
                    origin: DictionaryOrigin::Fallback,
                }
            }
        }
    }

    async fn ensure_dictionary(&self, language: Language) -> Arc<Dictionary> {
        let cached = self
            .inner
            .state
            .lock()
            .cache
            .get(&language)
            .map(|cached| Arc::clone(&cached.dictionary));

        if let Some(dictionary) = cached {
            self.inner.metrics.record_cache_hit();
            return dictionary;
        }

        self.inner.metrics.record_cache_miss();
        let loaded = self.load_dictionary(language).await;
        let dictionary = Arc::clone(&loaded.dictionary);
        self.inner.state.lock().cache.insert(language, loaded);
        dictionary
    }

    fn validate_dictionaries(&self) {
        let (english, hausa) = {
            let state = self.inner.state.lock();
            match (state.cache.get(&Language::ENGLISH), state.cache.get(&Language::HAUSA)) {
                (Some(english), Some(hausa)) => (english.clone(), hausa.clone()),
                _ => return,
            }
        };
        if english.origin != DictionaryOrigin::Fetched || hausa.origin != DictionaryOrigin::Fetched {
            return;
        }

        let report = DictionaryValidator::validate(
            (Language::ENGLISH, english.dictionary.as_ref()),
            (Language::HAUSA, hausa.dictionary.as_ref()),
        );
        for warning in &report.warnings {
            warn!("Dictionary validation: {}", warning);
        }
        for err in &report.errors {
            error!("Dictionary validation: {}", err);
        }
    }

    fn subscribe_to_changes(&self) {
        let weak: Weak<Inner<P>> = Arc::downgrade(&self.inner);
        let id = self.inner.events.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                LanguageSwitcher { inner }.adopt_external_change(event.language);
            }
        });
        self.inner.state.lock().subscription = Some(id);
    }

    /// Render indicators and toggle affordances; rewrite the whole page when
    /// it was served in a different language than the one resolved.
    fn render_initial(&self, language: Language, declared_matches: bool) -> Result<(), SwitchError> {
        let translator = self.translator();
        let mut page = self.inner.page.lock();

        let scope = if declared_matches {
            RefreshScope::Chrome
        } else {
            RefreshScope::Full
        };
        let plan = RefreshPlan::build(&*page, &translator, scope);
        plan.apply(&mut *page)?;

        if !declared_matches {
            if let Err(e) = page.set_document_language(language.code()) {
                plan.revert(&mut *page);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Apply a fully computed switch to page, storage and state.
    ///
    /// Either everything is applied or the page and storage are left as they
    /// were and the current language is unchanged.
    fn commit(&self, translator: &Translator) -> Result<(), SwitchError> {
        let target = translator.language();
        let mut page = self.inner.page.lock();

        let plan = RefreshPlan::build(&*page, translator, RefreshScope::Full);
        plan.apply(&mut *page)?;

        let previous_declared = page.document_language();
        if let Err(e) = page.set_document_language(target.code()) {
            plan.revert(&mut *page);
            return Err(e.into());
        }

        if let Err(e) = self
            .inner
            .store
            .set(&self.inner.config.storage_key, target.code())
        {
            plan.revert(&mut *page);
            let restored = match previous_declared {
                Some(declared) => page.set_document_language(&declared),
                None => page.clear_document_language(),
            };
            if let Err(restore) = restored {
                warn!("Failed to restore document language: {}", restore);
            }
            return Err(e.into());
        }

        drop(page);
        self.inner.state.lock().current = target;
        Ok(())
    }

    /// Follow a change announced by other code on the page.
    fn adopt_external_change(&self, language: Language) {
        let dictionary = {
            let state = self.inner.state.lock();
            if state.mode != Mode::Instant
                || state.phase != SwitchPhase::Idle
                || state.current == language
            {
                return;
            }
            state
                .cache
                .get(&language)
                .map(|cached| Arc::clone(&cached.dictionary))
        };

        debug!("Adopting language change to {} from another component", language.code());
        if let Err(e) = self.commit(&Translator::new(language, dictionary)) {
            warn!("Failed to follow external language change to {}: {}", language.code(), e);
        }
    }

    fn spawn_preference_sync(&self, language: Language) {
        let source = Arc::clone(&self.inner.source);
        let metrics = Arc::clone(&self.inner.metrics);
        let csrf_token = self.csrf_token();

        let handle = tokio::spawn(async move {
            match source.sync_preference(language, csrf_token.as_deref()).await {
                Ok(()) => debug!("Server language preference updated to {}", language.code()),
                Err(e) => {
                    metrics.record_sync_failure();
                    warn!("Failed to sync language preference to server: {}", e);
                }
            }
        });

        let mut pending = self.inner.pending_syncs.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn install_reload_fallback(&self) {
        let subscription = {
            let mut state = self.inner.state.lock();
            if state.mode != Mode::Disposed {
                state.mode = Mode::ReloadFallback;
            }
            state.subscription.take()
        };
        if let Some(id) = subscription {
            self.inner.events.unsubscribe(id);
        }
    }

    fn toggle_by_reload(&self) -> ToggleOutcome {
        let target = self.current_language().other();

        if let Err(e) = self
            .inner
            .store
            .set(&self.inner.config.storage_key, target.code())
        {
            warn!("Could not persist language before reload: {}", e);
        }

        let url = self.inner.config.preference_url(target);
        info!("Switching language to {} via page reload", target.code());
        self.inner.page.lock().navigate(&url);
        ToggleOutcome::Reloading(target)
    }
}

/// Holds the in-progress flag for one toggle.
///
/// Dropping it returns the switcher to `Idle` and re-enables the toggle
/// controls, on every exit path.
struct SwitchGuard<'a, P: Page + 'static> {
    switcher: &'a LanguageSwitcher<P>,
}

impl<'a, P: Page + 'static> SwitchGuard<'a, P> {
    fn acquire(switcher: &'a LanguageSwitcher<P>) -> Option<Self> {
        {
            let mut state = switcher.inner.state.lock();
            if state.phase != SwitchPhase::Idle {
                return None;
            }
            state.phase = SwitchPhase::Loading;
        }

        let translator = switcher.translator();
        set_loading(&mut *switcher.inner.page.lock(), &translator, true);
        Some(Self { switcher })
    }
}

impl<P: Page + 'static> Drop for SwitchGuard<'_, P> {
    fn drop(&mut self) {
        self.switcher.set_phase(SwitchPhase::Idle);
        let translator = self.switcher.translator();
        set_loading(&mut *self.switcher.inner.page.lock(), &translator, false);
    }
}
