/// Catalog of the Mistral models a request may name.
///
/// Search completions always run on the default flagship model; the catalog
/// exists to validate the optional `model` request parameter and to record
/// which tier the client selected alongside saved results.
use serde::Serialize;

/// Characteristics of one selectable model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub max_tokens: u32,
    pub is_free: bool,
}

pub static CATALOG: [ModelInfo; 4] = [
    ModelInfo {
        name: "mistral-tiny",
        description: "Lightweight model for simple tasks",
        max_tokens: 4096,
        is_free: true,
    },
    ModelInfo {
        name: "mistral-small",
        description: "Balanced model for most tasks",
        max_tokens: 4096,
        is_free: true,
    },
    ModelInfo {
        name: "mistral-medium",
        description: "Capable model for complex tasks",
        max_tokens: 4096,
        is_free: false,
    },
    ModelInfo {
        name: super::MODEL,
        description: "Flagship model used for search completions",
        max_tokens: 4096,
        is_free: false,
    },
];

/// Looks a model up by name. `None` means the name is not selectable.
pub fn lookup(name: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|m| m.name == name)
}

/// The catalog entry requests fall back to when they name no model.
pub fn default_model() -> &'static ModelInfo {
    lookup(super::MODEL).unwrap_or(&CATALOG[0])
}
