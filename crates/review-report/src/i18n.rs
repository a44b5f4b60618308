//! Translation hook injected by the host application.
//!
//! The engine only ever asks for English source strings; whatever the host
//! returns is rendered verbatim.

use std::collections::HashMap;

pub trait Translate {
    fn translate(&self, text: &str) -> String;
}

/// Returns every source string unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Translate for PassThrough {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Adapts any `Fn(&str) -> String` into a translator.
pub struct FnTranslator<F>(pub F);

impl<F> Translate for FnTranslator<F>
where
    F: Fn(&str) -> String,
{
    fn translate(&self, text: &str) -> String {
        (self.0)(text)
    }
}

/// Lookup table with pass-through fallback for missing keys.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, translated: impl Into<String>) {
        self.entries.insert(source.into(), translated.into());
    }
}

impl FromIterator<(String, String)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Translate for Catalog {
    fn translate(&self, text: &str) -> String {
        self.entries
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_falls_back_to_source_text() {
        let mut catalog = Catalog::new();
        catalog.insert("General", "Allgemein");
        assert_eq!(catalog.translate("General"), "Allgemein");
        assert_eq!(catalog.translate("Responses"), "Responses");
    }

    #[test]
    fn closures_can_translate() {
        let upper = FnTranslator(|text: &str| text.to_uppercase());
        assert_eq!(upper.translate("summary"), "SUMMARY");
    }
}
