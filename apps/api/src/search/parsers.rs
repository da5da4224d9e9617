//! Free-text response parsers: turn raw model output into structured values.
//!
//! Every parser here is pure, total and best-effort: malformed input shrinks
//! the output (missing sections, dropped lines), it never produces an error.
//! Parsing is deterministic and idempotent for a given input.

use std::sync::OnceLock;

use regex::Regex;

use super::fields::{Exposition, Field, FieldValue, ImageLink, SourceLink};

/// Substituted when the images field yields no parseable line at all.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://via.placeholder.com/400x300?text=Image+non+disponible";

/// Keywords longer than this are truncated, not dropped.
const MAX_KEYWORD_CHARS: usize = 40;

// ────────────────────────────────────────────────────────────────────────────
// Text cleanup
// ────────────────────────────────────────────────────────────────────────────

/// Strips parenthetical asides, collapses whitespace runs and trims.
/// Applied to every captured value before it leaves this module.
pub fn clean_text(text: &str) -> String {
    static PARENS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let parens = PARENS.get_or_init(|| Regex::new(r"\([^)]*\)").expect("Invalid regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"));

    let without_asides = parens.replace_all(text, "");
    spaces.replace_all(&without_asides, " ").trim().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Exposition: intro / three paragraphs / conclusion
// ────────────────────────────────────────────────────────────────────────────

/// Cleaned text of the first capture group, empty when the pattern misses.
fn capture_section(content: &str, re: &Regex) -> String {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .unwrap_or_default()
}

/// Splits an essay into its sections by heading markers.
///
/// Markers are matched case-insensitively and work for both French and
/// English headings (`paragraphe?` covers both spellings). Each section is
/// the cleaned text between its marker and the next one (or the end), so a
/// heading tail the model appended after the marker stays part of the text.
/// A missing marker yields an empty section; empty paragraphs are dropped.
pub fn parse_exposition(content: &str) -> Exposition {
    static INTRO: OnceLock<Regex> = OnceLock::new();
    static P1: OnceLock<Regex> = OnceLock::new();
    static P2: OnceLock<Regex> = OnceLock::new();
    static P3: OnceLock<Regex> = OnceLock::new();
    static CONCLUSION: OnceLock<Regex> = OnceLock::new();

    let intro = INTRO.get_or_init(|| {
        Regex::new(
            r"(?is)introduction\s*(?:\([^)]*\))?\s*:?\s*(.*?)(?:paragraphe?\s*[1-3]|conclusion|\z)",
        )
        .expect("Invalid regex")
    });
    let p1 = P1.get_or_init(|| {
        Regex::new(r"(?is)paragraphe?\s*1\s*:?\s*(.*?)(?:paragraphe?\s*[23]|conclusion|\z)")
            .expect("Invalid regex")
    });
    let p2 = P2.get_or_init(|| {
        Regex::new(r"(?is)paragraphe?\s*2\s*:?\s*(.*?)(?:paragraphe?\s*3|conclusion|\z)")
            .expect("Invalid regex")
    });
    let p3 = P3.get_or_init(|| {
        Regex::new(r"(?is)paragraphe?\s*3\s*:?\s*(.*?)(?:conclusion|\z)").expect("Invalid regex")
    });
    let conclusion = CONCLUSION.get_or_init(|| {
        Regex::new(r"(?is)conclusion\s*(?:\([^)]*\))?\s*:?\s*(.*)").expect("Invalid regex")
    });

    let paragraphs = [
        capture_section(content, p1),
        capture_section(content, p2),
        capture_section(content, p3),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect();

    Exposition {
        introduction: capture_section(content, intro),
        paragraphs,
        conclusion: capture_section(content, conclusion),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Link lists: sources and images share one line format
// ────────────────────────────────────────────────────────────────────────────

/// Extracts `[ordinal.] <url> - <text>` pairs, one per line.
/// Lines that do not carry a URL-dash-text shape are dropped silently.
fn parse_link_lines(content: &str) -> Vec<(String, String)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:\d+\.\s*)?(https?://\S+)\s*-\s*(.*)$").expect("Invalid regex")
    });

    content
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            let url = caps.get(1)?.as_str().trim().to_string();
            let text = clean_text(caps.get(2)?.as_str());
            Some((url, text))
        })
        .collect()
}

pub fn parse_sources(content: &str) -> Vec<SourceLink> {
    parse_link_lines(content)
        .into_iter()
        .map(|(url, title)| SourceLink { url, title })
        .collect()
}

/// Like `parse_sources`, but a response with no parseable line at all falls
/// back to a single placeholder entry so clients always have something to
/// render.
pub fn parse_images(content: &str) -> Vec<ImageLink> {
    let images: Vec<ImageLink> = parse_link_lines(content)
        .into_iter()
        .map(|(url, description)| ImageLink { url, description })
        .collect();

    if images.is_empty() {
        return vec![ImageLink {
            url: PLACEHOLDER_IMAGE_URL.to_string(),
            description: "Image non disponible".to_string(),
        }];
    }

    images
}

// ────────────────────────────────────────────────────────────────────────────
// Keywords
// ────────────────────────────────────────────────────────────────────────────

/// Comma-separated keywords, cleaned, empties dropped, each capped in length.
pub fn parse_keywords(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(clean_text)
        .filter(|k| !k.is_empty())
        .map(|k| k.chars().take(MAX_KEYWORD_CHARS).collect())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-field dispatch
// ────────────────────────────────────────────────────────────────────────────

/// Parses raw model output into the structured value for one field.
pub fn parse_field(field: Field, raw: &str) -> FieldValue {
    match field {
        Field::Title | Field::Summary | Field::HistoricalContext | Field::Anecdote => {
            FieldValue::Text(clean_text(raw))
        }
        Field::Exposition => FieldValue::Exposition(parse_exposition(raw)),
        Field::Sources => FieldValue::Sources(parse_sources(raw)),
        Field::Images => FieldValue::Images(parse_images(raw)),
        Field::Keywords => FieldValue::Keywords(parse_keywords(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_parentheticals() {
        assert_eq!(clean_text("Rome (la Ville éternelle) chuta"), "Rome chuta");
        assert_eq!(clean_text("(tout entre parenthèses)"), "");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  un\n\n  texte\t aéré  "), "un texte aéré");
    }

    #[test]
    fn test_clean_text_keeps_unclosed_paren() {
        assert_eq!(clean_text("un (aparté jamais fermé"), "un (aparté jamais fermé");
    }

    #[test]
    fn test_clean_text_idempotent() {
        let once = clean_text("a  (b)  c");
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_parse_exposition_full_document() {
        let content = "Introduction: La liberté est un concept central.\n\n\
                       Paragraphe 1: Les stoïciens la pensaient intérieure.\n\n\
                       Paragraphe 2: Kant en fit le socle de la morale.\n\n\
                       Paragraphe 3: Sartre la déclara inéluctable.\n\n\
                       Conclusion: Elle reste à conquérir.";
        let expo = parse_exposition(content);
        assert_eq!(expo.introduction, "La liberté est un concept central.");
        assert_eq!(
            expo.paragraphs,
            vec![
                "Les stoïciens la pensaient intérieure.",
                "Kant en fit le socle de la morale.",
                "Sartre la déclara inéluctable."
            ]
        );
        assert_eq!(expo.conclusion, "Elle reste à conquérir.");
    }

    #[test]
    fn test_parse_exposition_english_markers() {
        let content = "Introduction: Freedom matters.\n\
                       Paragraph 1: First argument.\n\
                       Paragraph 2: Second argument.\n\
                       Paragraph 3: Third argument.\n\
                       Conclusion: It endures.";
        let expo = parse_exposition(content);
        assert_eq!(expo.introduction, "Freedom matters.");
        assert_eq!(
            expo.paragraphs,
            vec!["First argument.", "Second argument.", "Third argument."]
        );
        assert_eq!(expo.conclusion, "It endures.");
    }

    #[test]
    fn test_parse_exposition_strips_heading_parenthetical() {
        let content = "Introduction (3 lignes max) : Un début.\nParagraphe 1: Corps.\nConclusion (3 lignes max) : Une fin.";
        let expo = parse_exposition(content);
        assert_eq!(expo.introduction, "Un début.");
        assert_eq!(expo.conclusion, "Une fin.");
    }

    #[test]
    fn test_parse_exposition_keeps_inline_heading_tail() {
        // A heading tail between the marker and the colon stays in the text.
        let content =
            "Paragraphe 1 - Approche Philosophique :\nLe libre arbitre reste débattu.";
        let expo = parse_exposition(content);
        assert_eq!(
            expo.paragraphs,
            vec!["- Approche Philosophique : Le libre arbitre reste débattu."]
        );
    }

    #[test]
    fn test_parse_exposition_missing_paragraphs_are_dropped() {
        let content = "Introduction: Seulement un début.\nConclusion: Et une fin.";
        let expo = parse_exposition(content);
        assert_eq!(expo.introduction, "Seulement un début.");
        assert!(expo.paragraphs.is_empty());
        assert_eq!(expo.conclusion, "Et une fin.");
    }

    #[test]
    fn test_parse_exposition_skipped_marker_does_not_swallow_later_sections() {
        let content = "Introduction: Début.\n\
                       Paragraphe 1: Premier.\n\
                       Paragraphe 3: Troisième.\n\
                       Conclusion: Fin.";
        let expo = parse_exposition(content);
        assert_eq!(expo.introduction, "Début.");
        assert_eq!(expo.paragraphs, vec!["Premier.", "Troisième."]);
        assert_eq!(expo.conclusion, "Fin.");
    }

    #[test]
    fn test_parse_exposition_unstructured_text() {
        let expo = parse_exposition("Un texte sans aucun marqueur de section.");
        assert_eq!(expo.introduction, "");
        assert!(expo.paragraphs.is_empty());
        assert_eq!(expo.conclusion, "");
    }

    #[test]
    fn test_parse_sources_ordered_lines() {
        let content = "Voici trois sources fiables :\n\
                       1. https://www.britannica.com/place/Rome - Encyclopédie Britannica\n\
                       2. https://gallica.bnf.fr - Gallica (BnF)\n\
                       3. https://www.persee.fr - Persée";
        let sources = parse_sources(content);
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].url, "https://www.britannica.com/place/Rome");
        assert_eq!(sources[0].title, "Encyclopédie Britannica");
        assert_eq!(sources[1].title, "Gallica");
        assert_eq!(sources[2].url, "https://www.persee.fr");
    }

    #[test]
    fn test_parse_sources_drops_malformed_lines() {
        let content =
            "Je recommande :\nwww.schema.manquant.org - un titre\nPas d'URL ici - juste du texte\n";
        assert!(parse_sources(content).is_empty());
    }

    #[test]
    fn test_parse_sources_splits_bare_url_at_hyphen() {
        // Without a spaced separator the greedy URL gives back up to the
        // first hyphen, so the tail ends up as the title.
        let sources = parse_sources("https://example.org/sans-titre");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://example.org/sans");
        assert_eq!(sources[0].title, "titre");
    }

    #[test]
    fn test_parse_sources_url_with_hyphens() {
        let sources = parse_sources("https://fr.wikipedia.org/wiki/Rome-antique - Wikipédia");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://fr.wikipedia.org/wiki/Rome-antique");
        assert_eq!(sources[0].title, "Wikipédia");
    }

    #[test]
    fn test_parse_images_lines() {
        let content = "1. https://images.example.org/forum.jpg - Le Forum romain\n\
                       2. https://images.example.org/colisee.jpg - Le Colisée (vue aérienne)";
        let images = parse_images(content);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].description, "Le Forum romain");
        assert_eq!(images[1].description, "Le Colisée");
    }

    #[test]
    fn test_parse_images_placeholder_when_none_parse() {
        let images = parse_images("Je ne peux pas fournir d'images directement.");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(images[0].description, "Image non disponible");
    }

    #[test]
    fn test_parse_keywords_splits_and_cleans() {
        assert_eq!(
            parse_keywords("philosophie, libre arbitre (concept), déterminisme"),
            vec!["philosophie", "libre arbitre", "déterminisme"]
        );
    }

    #[test]
    fn test_parse_keywords_drops_empty_entries() {
        assert_eq!(parse_keywords("a,, (vide) ,b"), vec!["a", "b"]);
        assert!(parse_keywords("").is_empty());
    }

    #[test]
    fn test_parse_keywords_caps_length() {
        let long = "x".repeat(60);
        let parsed = parse_keywords(&long);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].chars().count(), 40);
    }

    #[test]
    fn test_parse_field_dispatch() {
        assert_eq!(
            parse_field(Field::Title, "Un titre  (accrocheur)"),
            FieldValue::Text("Un titre".to_string())
        );
        match parse_field(Field::Keywords, "a, b") {
            FieldValue::Keywords(k) => assert_eq!(k, vec!["a", "b"]),
            other => panic!("expected keywords, got {other:?}"),
        }
        match parse_field(Field::Exposition, "Introduction: x.") {
            FieldValue::Exposition(e) => assert_eq!(e.introduction, "x."),
            other => panic!("expected exposition, got {other:?}"),
        }
    }
}
