//! The page the switcher renders into.
//!
//! `Page` is the narrow slice of the document API the switcher needs. A
//! browser host implements it over the real DOM; `MemoryPage` is a
//! self-contained document used by the binary and the tests.

use crate::error::PageError;
use std::collections::{BTreeMap, HashMap};

/// Marker whose value is the dictionary key for an element's text.
pub const TRANSLATE_ATTR: &str = "data-translate";
/// Marker whose value is the dictionary key for an element's placeholder.
pub const TRANSLATE_PLACEHOLDER_ATTR: &str = "data-translate-placeholder";

pub const TOGGLE_CLASS: &str = "language-toggle";
pub const TOGGLE_LABEL_CLASS: &str = "language-toggle-label";
pub const TOGGLE_ICON_CLASS: &str = "language-toggle-icon";
pub const INDICATOR_ID: &str = "current-language";
pub const INDICATOR_CLASS: &str = "current-language-indicator";

/// `<meta name="csrf-token">`
pub const CSRF_META_NAME: &str = "csrf-token";

/// Reference to an element of a `Page`.
///
/// The index is the host's own: `MemoryPage` uses its element position, a
/// browser host its node table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(usize);

impl ElementHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

pub trait Page: Send {
    /// The document's declared language (`<html lang>`).
    fn document_language(&self) -> Option<String>;
    fn set_document_language(&mut self, code: &str) -> Result<(), PageError>;
    /// Remove the declared language altogether.
    fn clear_document_language(&mut self) -> Result<(), PageError>;

    fn meta_content(&self, name: &str) -> Option<String>;

    /// Elements carrying `name`, in document order.
    fn elements_with_attribute(&self, name: &str) -> Vec<ElementHandle>;
    /// Elements whose class list contains `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<ElementHandle>;
    fn element_by_id(&self, id: &str) -> Option<ElementHandle>;

    /// Lowercase tag name.
    fn tag_name(&self, element: ElementHandle) -> Option<String>;
    fn attribute(&self, element: ElementHandle, name: &str) -> Option<String>;
    fn set_attribute(
        &mut self,
        element: ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<(), PageError>;
    fn remove_attribute(&mut self, element: ElementHandle, name: &str) -> Result<(), PageError>;
    fn text(&self, element: ElementHandle) -> Option<String>;
    fn set_text(&mut self, element: ElementHandle, text: &str) -> Result<(), PageError>;

    fn notify(&mut self, notification: Notification);

    /// Full navigation to `url`, replacing the page.
    fn navigate(&mut self, url: &str);
}

/// Element of a `MemoryPage`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_class(mut self, class: &str) -> Self {
        let classes = match self.attributes.get("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attributes.insert("class".to_string(), classes);
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// Flat in-memory document.
#[derive(Debug, Default)]
pub struct MemoryPage {
    language: Option<String>,
    meta: HashMap<String, String>,
    elements: Vec<Element>,
    notifications: Vec<Notification>,
    navigations: Vec<String>,
    rejected_text: Option<String>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, code: &str) -> Self {
        self.language = Some(code.to_string());
        self
    }

    pub fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.insert(name.to_string(), content.to_string());
        self
    }

    pub fn push(&mut self, element: Element) -> ElementHandle {
        self.elements.push(element);
        ElementHandle::new(self.elements.len() - 1)
    }

    pub fn element(&self, handle: ElementHandle) -> Option<&Element> {
        self.elements.get(handle.index())
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Refuse any write whose value contains `needle`.
    ///
    /// Lets tests make a single element fail mid-update.
    pub fn reject_writes_containing(&mut self, needle: Option<&str>) {
        self.rejected_text = needle.map(str::to_string);
    }

    fn check_write(&self, target: &str, value: &str) -> Result<(), PageError> {
        match &self.rejected_text {
            Some(needle) if value.contains(needle.as_str()) => Err(PageError::WriteRejected {
                target: target.to_string(),
                reason: format!("value contains '{}'", needle),
            }),
            _ => Ok(()),
        }
    }

    fn element_mut(&mut self, handle: ElementHandle) -> Result<&mut Element, PageError> {
        self.elements
            .get_mut(handle.index())
            .ok_or(PageError::Detached(handle))
    }

    fn select(&self, predicate: impl Fn(&Element) -> bool) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| predicate(element))
            .map(|(index, _)| ElementHandle::new(index))
            .collect()
    }
}

impl Page for MemoryPage {
    fn document_language(&self) -> Option<String> {
        self.language.clone()
    }

    fn set_document_language(&mut self, code: &str) -> Result<(), PageError> {
        self.check_write("html[lang]", code)?;
        self.language = Some(code.to_string());
        Ok(())
    }

    fn clear_document_language(&mut self) -> Result<(), PageError> {
        self.language = None;
        Ok(())
    }

    fn meta_content(&self, name: &str) -> Option<String> {
        self.meta.get(name).cloned()
    }

    fn elements_with_attribute(&self, name: &str) -> Vec<ElementHandle> {
        self.select(|element| element.attributes.contains_key(name))
    }

    fn elements_with_class(&self, class: &str) -> Vec<ElementHandle> {
        self.select(|element| element.has_class(class))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.select(|element| element.attr("id") == Some(id))
            .into_iter()
            .next()
    }

    fn tag_name(&self, element: ElementHandle) -> Option<String> {
        self.element(element).map(|e| e.tag.clone())
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> Option<String> {
        self.element(element)
            .and_then(|e| e.attr(name))
            .map(str::to_string)
    }

    fn set_attribute(
        &mut self,
        element: ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<(), PageError> {
        self.check_write(name, value)?;
        self.element_mut(element)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, element: ElementHandle, name: &str) -> Result<(), PageError> {
        self.element_mut(element)?.attributes.remove(name);
        Ok(())
    }

    fn text(&self, element: ElementHandle) -> Option<String> {
        self.element(element).map(|e| e.text.clone())
    }

    fn set_text(&mut self, element: ElementHandle, text: &str) -> Result<(), PageError> {
        self.check_write("textContent", text)?;
        self.element_mut(element)?.text = text.to_string();
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> (MemoryPage, ElementHandle, ElementHandle) {
        let mut page = MemoryPage::new()
            .with_language("en")
            .with_meta(CSRF_META_NAME, "token-123");
        let greeting = page.push(
            Element::new("SPAN")
                .with_attr(TRANSLATE_ATTR, "greeting")
                .with_text("Hello"),
        );
        let toggle = page.push(
            Element::new("button")
                .with_id("language-toggle")
                .with_class(TOGGLE_CLASS)
                .with_class("btn"),
        );
        (page, greeting, toggle)
    }

    #[test]
    fn test_queries() {
        let (page, greeting, toggle) = sample_page();

        assert_eq!(page.elements_with_attribute(TRANSLATE_ATTR), vec![greeting]);
        assert_eq!(page.elements_with_class(TOGGLE_CLASS), vec![toggle]);
        assert_eq!(page.elements_with_class("btn"), vec![toggle]);
        assert_eq!(page.element_by_id("language-toggle"), Some(toggle));
        assert_eq!(page.element_by_id("missing"), None);
        assert_eq!(page.tag_name(greeting).as_deref(), Some("span"));
        assert_eq!(page.meta_content(CSRF_META_NAME).as_deref(), Some("token-123"));
    }

    #[test]
    fn test_class_match_is_whole_word() {
        let (page, _, _) = sample_page();
        assert!(page.elements_with_class("language").is_empty());
    }

    #[test]
    fn test_writes() {
        let (mut page, greeting, toggle) = sample_page();

        page.set_text(greeting, "Sannu").unwrap();
        page.set_attribute(toggle, "disabled", "").unwrap();
        assert_eq!(page.text(greeting).as_deref(), Some("Sannu"));
        assert_eq!(page.attribute(toggle, "disabled").as_deref(), Some(""));

        page.remove_attribute(toggle, "disabled").unwrap();
        assert_eq!(page.attribute(toggle, "disabled"), None);
    }

    #[test]
    fn test_document_language() {
        let (mut page, _, _) = sample_page();
        page.set_document_language("ha").unwrap();
        assert_eq!(page.document_language().as_deref(), Some("ha"));

        page.clear_document_language().unwrap();
        assert_eq!(page.document_language(), None);
    }

    #[test]
    fn test_detached_handle() {
        let (mut page, _, _) = sample_page();
        let ghost = ElementHandle::new(42);

        assert_eq!(page.text(ghost), None);
        assert_eq!(page.set_text(ghost, "x"), Err(PageError::Detached(ghost)));
    }

    #[test]
    fn test_rejected_writes() {
        let (mut page, greeting, _) = sample_page();
        page.reject_writes_containing(Some("Sannu"));

        assert!(page.set_text(greeting, "Sannu").is_err());
        assert_eq!(page.text(greeting).as_deref(), Some("Hello"));
        assert!(page.set_text(greeting, "Hi").is_ok());

        page.reject_writes_containing(None);
        assert!(page.set_text(greeting, "Sannu").is_ok());
    }

    #[test]
    fn test_notifications_and_navigation() {
        let (mut page, _, _) = sample_page();
        page.notify(Notification::error("Kuskure"));
        page.navigate("/set_language/ha");

        assert_eq!(page.notifications()[0].kind, NotificationKind::Error);
        assert_eq!(page.navigations(), ["/set_language/ha".to_string()]);
    }
}
