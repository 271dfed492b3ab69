//! Template types for typed variable injection.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::LazyLock;

/// Placeholder syntax: `__NAME__`, `__SITE_TITLE__`.
static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([A-Z]+(?:_[A-Z]+)*)__").unwrap());

/// Replace every known `__KEY__` placeholder in one pass.
///
/// Substituted text is never scanned again, so values may safely contain
/// placeholder-like text. Unknown placeholders are left as-is.
pub fn fill(content: &str, vars: &[(&str, &str)]) -> String {
    RE_PLACEHOLDER
        .replace_all(content, |caps: &Captures<'_>| {
            vars.iter()
                .find(|(key, _)| *key == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
///
/// Content is either a built-in (`&'static str`) or a file loaded from the
/// user's templates directory.
#[derive(Debug, Clone)]
pub struct Template<'t, V> {
    content: Cow<'t, str>,
    _marker: PhantomData<V>,
}

impl<V> Template<'static, V> {
    pub const fn builtin(content: &'static str) -> Self {
        Self {
            content: Cow::Borrowed(content),
            _marker: PhantomData,
        }
    }
}

impl<'t, V> Template<'t, V> {
    pub fn new(content: impl Into<Cow<'t, str>>) -> Self {
        Self {
            content: content.into(),
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<'_, V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(&self.content)
    }
}
