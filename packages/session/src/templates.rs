//! Named starter contents for new documents

/// Template used for unknown keys
pub const DEFAULT_TEMPLATE: &str = "blank";

const BLANK: &str = "";

const ARTICLE: &str = "# Title

*Author, date*

## Introduction

Start writing here.
";

const NOTES: &str = "# Notes

-
";

const MATH: &str = "# Derivation

Inline math such as $e^{i\\pi} + 1 = 0$ sits in the text.

$$
\\int_0^1 x^2 \\, dx = \\frac{1}{3}
$$
";

/// Fixed registry of starter contents
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<(&'static str, &'static str)>,
}

impl TemplateRegistry {
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                (DEFAULT_TEMPLATE, BLANK),
                ("article", ARTICLE),
                ("notes", NOTES),
                ("math", MATH),
            ],
        }
    }

    /// Starter content for `key`, or the default template's for unknown keys
    pub fn resolve(&self, key: &str) -> &'static str {
        self.get(key)
            .or_else(|| self.get(DEFAULT_TEMPLATE))
            .unwrap_or(BLANK)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Template keys in presentation order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.iter().map(|(key, _)| *key)
    }

    fn get(&self, key: &str) -> Option<&'static str> {
        self.templates
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, content)| *content)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
