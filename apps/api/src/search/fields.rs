use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight fields every search resolves.
///
/// `ALL` fixes the dispatch order shared by every transport; response
/// streams emit fields in exactly this order, and history columns use the
/// same snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Summary,
    HistoricalContext,
    Anecdote,
    Exposition,
    Sources,
    Images,
    Keywords,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Title,
        Field::Summary,
        Field::HistoricalContext,
        Field::Anecdote,
        Field::Exposition,
        Field::Sources,
        Field::Images,
        Field::Keywords,
    ];

    /// Wire and column name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Summary => "summary",
            Field::HistoricalContext => "historical_context",
            Field::Anecdote => "anecdote",
            Field::Exposition => "exposition",
            Field::Sources => "sources",
            Field::Images => "images",
            Field::Keywords => "keywords",
        }
    }

    /// Resolves a wire name back to a field. `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One structured essay: intro, up to three body paragraphs, conclusion.
/// Sections the model omitted stay empty rather than failing the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exposition {
    pub introduction: String,
    pub paragraphs: Vec<String>,
    pub conclusion: String,
}

/// A cited reference: URL plus a short title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
    pub url: String,
    pub title: String,
}

/// An illustration: URL plus a short description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLink {
    pub url: String,
    pub description: String,
}

/// The parsed value of one field. Serializes untagged, so a value lands on
/// the wire as plain text, an object, or an array, never as an enum wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Exposition(Exposition),
    Sources(Vec<SourceLink>),
    Images(Vec<ImageLink>),
    Keywords(Vec<String>),
}
