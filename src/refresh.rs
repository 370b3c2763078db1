//! Page rewrite planning.
//!
//! A `RefreshPlan` is computed from the page and a `Translator` without
//! touching the page, then applied in one pass. If any write fails, the writes
//! already made are undone so the page never shows two languages at once.

use crate::error::PageError;
use crate::i18n::{keys, Translator};
use crate::page::{
    ElementHandle, Page, INDICATOR_CLASS, INDICATOR_ID, TOGGLE_CLASS, TOGGLE_ICON_CLASS,
    TOGGLE_LABEL_CLASS, TRANSLATE_ATTR, TRANSLATE_PLACEHOLDER_ATTR,
};
use tracing::warn;

/// `input` types whose visible text is a placeholder.
const TEXT_INPUT_TYPES: [&str; 7] = ["text", "email", "password", "search", "tel", "url", "number"];

/// `input` types whose visible text is their value.
const BUTTON_INPUT_TYPES: [&str; 3] = ["button", "submit", "reset"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Text,
    Attribute(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedWrite {
    element: ElementHandle,
    target: Target,
    value: String,
    previous: Option<String>,
}

/// Which parts of the page a plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Marked elements, toggle affordances and indicators
    Full,
    /// Toggle affordances and indicators only
    Chrome,
}

#[derive(Debug, Default)]
pub struct RefreshPlan {
    writes: Vec<PlannedWrite>,
}

impl RefreshPlan {
    pub fn build<P: Page + ?Sized>(page: &P, translator: &Translator, scope: RefreshScope) -> Self {
        let mut plan = Self::default();

        if scope == RefreshScope::Full {
            plan.plan_marked_elements(page, translator);
        }
        plan.plan_toggle_affordances(page, translator);
        plan.plan_indicators(page, translator);

        plan
    }

    /// Number of writes that would change the page.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply every write in order; on failure undo the ones already made.
    pub fn apply<P: Page + ?Sized>(&self, page: &mut P) -> Result<usize, PageError> {
        for (index, write) in self.writes.iter().enumerate() {
            let result = match &write.target {
                Target::Text => page.set_text(write.element, &write.value),
                Target::Attribute(name) => page.set_attribute(write.element, name, &write.value),
            };

            if let Err(e) = result {
                Self::undo(&self.writes[..index], page);
                return Err(e);
            }
        }

        Ok(self.writes.len())
    }

    /// Restore the values captured when the plan was built.
    pub fn revert<P: Page + ?Sized>(&self, page: &mut P) {
        Self::undo(&self.writes, page);
    }

    fn undo<P: Page + ?Sized>(writes: &[PlannedWrite], page: &mut P) {
        for write in writes.iter().rev() {
            let result = match (&write.target, &write.previous) {
                (Target::Text, previous) => {
                    page.set_text(write.element, previous.as_deref().unwrap_or_default())
                }
                (Target::Attribute(name), Some(previous)) => {
                    page.set_attribute(write.element, name, previous)
                }
                (Target::Attribute(name), None) => page.remove_attribute(write.element, name),
            };

            if let Err(e) = result {
                warn!("Failed to restore element {:?}: {}", write.element, e);
            }
        }
    }

    fn push<P: Page + ?Sized>(&mut self, page: &P, element: ElementHandle, target: Target, value: String) {
        let previous = match &target {
            Target::Text => page.text(element),
            Target::Attribute(name) => page.attribute(element, name),
        };

        if previous.as_deref() == Some(value.as_str()) {
            return;
        }

        // A later write to the same slot supersedes an earlier one.
        if let Some(existing) = self
            .writes
            .iter_mut()
            .find(|w| w.element == element && w.target == target)
        {
            existing.value = value;
            return;
        }

        self.writes.push(PlannedWrite {
            element,
            target,
            value,
            previous,
        });
    }

    fn plan_marked_elements<P: Page + ?Sized>(&mut self, page: &P, translator: &Translator) {
        for element in page.elements_with_attribute(TRANSLATE_ATTR) {
            let Some(key) = page
                .attribute(element, TRANSLATE_ATTR)
                .filter(|key| !key.trim().is_empty())
            else {
                continue;
            };

            let target = text_target(page, element);
            // Unknown keys keep whatever the server rendered.
            let current = match &target {
                Target::Text => page.text(element),
                Target::Attribute(name) => page.attribute(element, name),
            };
            let value = translator.translate(&key, current.as_deref());
            self.push(page, element, target, value);
        }

        for element in page.elements_with_attribute(TRANSLATE_PLACEHOLDER_ATTR) {
            let Some(key) = page
                .attribute(element, TRANSLATE_PLACEHOLDER_ATTR)
                .filter(|key| !key.trim().is_empty())
            else {
                continue;
            };

            let current = page.attribute(element, "placeholder");
            let value = translator.translate(&key, current.as_deref());
            self.push(page, element, Target::Attribute("placeholder"), value);
        }
    }

    fn plan_toggle_affordances<P: Page + ?Sized>(&mut self, page: &P, translator: &Translator) {
        let tooltip = translator.translate(keys::TOGGLE_TOOLTIP, None);
        for toggle in page.elements_with_class(TOGGLE_CLASS) {
            self.push(page, toggle, Target::Attribute("title"), tooltip.clone());
            self.push(page, toggle, Target::Attribute("aria-label"), tooltip.clone());
        }

        let label = translator.translate(keys::TOGGLE_LABEL, None);
        for element in page.elements_with_class(TOGGLE_LABEL_CLASS) {
            self.push(page, element, Target::Text, label.clone());
        }
    }

    fn plan_indicators<P: Page + ?Sized>(&mut self, page: &P, translator: &Translator) {
        let language = translator.language();
        let mut indicators = page.elements_with_class(INDICATOR_CLASS);
        if let Some(element) = page.element_by_id(INDICATOR_ID) {
            if !indicators.contains(&element) {
                indicators.push(element);
            }
        }

        for element in indicators {
            self.push(page, element, Target::Text, language.native_name().to_string());
            self.push(
                page,
                element,
                Target::Attribute("data-language"),
                language.code().to_string(),
            );
        }
    }
}

/// Show or clear the loading state on every toggle control.
///
/// Failures are logged, not returned: the loading state is cosmetic.
pub fn set_loading<P: Page + ?Sized>(page: &mut P, translator: &Translator, loading: bool) {
    let mut failures = Vec::new();

    for toggle in page.elements_with_class(TOGGLE_CLASS) {
        let result = if loading {
            page.set_attribute(toggle, "disabled", "")
                .and_then(|_| page.set_attribute(toggle, "aria-busy", "true"))
        } else {
            page.remove_attribute(toggle, "disabled")
                .and_then(|_| page.remove_attribute(toggle, "aria-busy"))
        };
        failures.extend(result.err());
    }

    let state = if loading { "loading" } else { "idle" };
    for icon in page.elements_with_class(TOGGLE_ICON_CLASS) {
        failures.extend(page.set_attribute(icon, "data-state", state).err());
    }

    let label = if loading {
        translator.translate(keys::LOADING, None)
    } else {
        translator.translate(keys::TOGGLE_LABEL, None)
    };
    for element in page.elements_with_class(TOGGLE_LABEL_CLASS) {
        failures.extend(page.set_text(element, &label).err());
    }

    for e in failures {
        warn!("Failed to update toggle loading state: {}", e);
    }
}

fn text_target<P: Page + ?Sized>(page: &P, element: ElementHandle) -> Target {
    match page.tag_name(element).as_deref() {
        Some("textarea") => Target::Attribute("placeholder"),
        Some("input") => {
            let input_type = page
                .attribute(element, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string());

            if BUTTON_INPUT_TYPES.contains(&input_type.as_str()) {
                Target::Attribute("value")
            } else if TEXT_INPUT_TYPES.contains(&input_type.as_str()) {
                Target::Attribute("placeholder")
            } else {
                Target::Text
            }
        }
        _ => Target::Text,
    }
}
