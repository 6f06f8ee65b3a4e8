//! The presentation-tree seam.
//!
//! The fallback state machine never talks to a DOM directly. It tags, hides
//! and decorates elements through [`ElementSurface`], which a browser host
//! implements over real nodes. [`ManagedElement`] is the in-memory
//! implementation: it models the `<img>` plus its nearest structural
//! container (the wrapping `<picture>`), and renders back to HTML.

use maud::{Markup, PreEscaped, html};
use std::collections::{BTreeMap, BTreeSet};

/// Operations the state machine and load path perform on an image element.
pub trait ElementSurface {
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn set_attribute(&mut self, name: &str, value: &str);
    fn set_source(&mut self, source: &str);
    fn set_hidden(&mut self, hidden: bool);
    fn add_container_class(&mut self, class: &str);
    fn remove_container_class(&mut self, class: &str);
    /// Replace whatever was previously synthesized inside the container.
    fn insert_into_container(&mut self, markup: Markup);
    fn clear_container_insert(&mut self);
}

/// In-memory model of a managed `<img>` and its container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedElement {
    pub source: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub hidden: bool,
    pub container_classes: BTreeSet<String>,
    /// Placeholder or error indicator, already rendered.
    pub container_insert: Option<String>,
}

impl ManagedElement {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn has_container_class(&self, class: &str) -> bool {
        self.container_classes.contains(class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn class_list(classes: &BTreeSet<String>) -> Option<String> {
        if classes.is_empty() {
            None
        } else {
            Some(classes.iter().map(String::as_str).collect::<Vec<_>>().join(" "))
        }
    }

    /// Current state of the `<img>` tag.
    pub fn render_img(&self) -> Markup {
        let class = Self::class_list(&self.classes);
        let attrs: String = self
            .attributes
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", k, escape_attr(v)))
            .collect();
        let class_attr = class
            .map(|c| format!(" class=\"{}\"", escape_attr(&c)))
            .unwrap_or_default();
        let hidden = if self.hidden { " hidden" } else { "" };
        PreEscaped(format!(
            "<img src=\"{}\"{}{}{}>",
            escape_attr(&self.source),
            attrs,
            class_attr,
            hidden
        ))
    }

    /// Container with its children: candidate `<source>` tags, the image,
    /// and any synthesized placeholder.
    pub fn render_in_container(&self, sources: Markup) -> Markup {
        let class = Self::class_list(&self.container_classes);
        html! {
            picture class=[class] {
                (sources)
                (self.render_img())
                @if let Some(insert) = &self.container_insert {
                    (PreEscaped(insert))
                }
            }
        }
    }
}

/// Maud escapes `&`, `<`, `>` and `"`, which covers quoted attribute values.
fn escape_attr(value: &str) -> String {
    html! { (value) }.into_string()
}

impl ElementSurface for ManagedElement {
    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn add_container_class(&mut self, class: &str) {
        self.container_classes.insert(class.to_string());
    }

    fn remove_container_class(&mut self, class: &str) {
        self.container_classes.remove(class);
    }

    fn insert_into_container(&mut self, markup: Markup) {
        self.container_insert = Some(markup.into_string());
    }

    fn clear_container_insert(&mut self) {
        self.container_insert = None;
    }
}
