// All prompt constants for the search module, one per field and language.
// Every template takes a single `{query}` placeholder; `build_prompt` is the
// only place that fills it in.
//
// The French texts are the canonical ones; the English set mirrors them
// line for line so the parsers see the same shape either way.

use super::fields::Field;
use super::language::Language;

pub const TITLE_PROMPT_FR: &str = "Donne-moi un titre accrocheur (5-10 mots max) pour : {query}";
pub const TITLE_PROMPT_EN: &str = "Give me a catchy title (5-10 words max) for: {query}";

pub const SUMMARY_PROMPT_FR: &str = "Fais un résumé en 3 lignes pour : {query}";
pub const SUMMARY_PROMPT_EN: &str = "Write a 3-line summary of: {query}";

pub const HISTORICAL_CONTEXT_PROMPT_FR: &str =
    "Donne-moi 3 repères historiques (dates ou périodes clés, 4 lignes max) pour : {query}";
pub const HISTORICAL_CONTEXT_PROMPT_EN: &str =
    "Give me 3 historical milestones (key dates or periods, 4 lines max) for: {query}";

pub const ANECDOTE_PROMPT_FR: &str =
    "Donne-moi une anecdote historique (3 lignes max) sur : {query}";
pub const ANECDOTE_PROMPT_EN: &str =
    "Give me a historical anecdote (3 lines max) about: {query}";

/// The section headings here are load-bearing: the exposition parser keys on
/// `Introduction`, `Paragraphe/Paragraph 1..3` and `Conclusion` markers.
pub const EXPOSITION_PROMPT_FR: &str = r#"Rédige un exposé structuré sur : {query}
Introduction (3 lignes max)
Paragraphe 1 - Approche Philosophique (8-10 lignes)
Paragraphe 2 - Analyse Critique (8-10 lignes)
Paragraphe 3 - Perspective Contemporaine (8-10 lignes)
Conclusion (3 lignes max)"#;
pub const EXPOSITION_PROMPT_EN: &str = r#"Write a structured essay on: {query}
Introduction (3 lines max)
Paragraph 1 - Philosophical Approach (8-10 lines)
Paragraph 2 - Critical Analysis (8-10 lines)
Paragraph 3 - Contemporary Perspective (8-10 lines)
Conclusion (3 lines max)"#;

/// The `url - title` line format here is what the sources parser expects.
pub const SOURCES_PROMPT_FR: &str =
    "Donne-moi 3 sources fiables (format : url - titre court) pour : {query}";
pub const SOURCES_PROMPT_EN: &str =
    "Give me 3 reliable sources (format: url - short title) for: {query}";

pub const IMAGES_PROMPT_FR: &str =
    "Donne-moi 3 images libres de droits (format : url - description courte) pour : {query}";
pub const IMAGES_PROMPT_EN: &str =
    "Give me 3 royalty-free images (format: url - short description) for: {query}";

pub const KEYWORDS_PROMPT_FR: &str =
    "Donne-moi 3 mots-clés pertinents (séparés par des virgules, 15 caractères max chacun) pour : {query}";
pub const KEYWORDS_PROMPT_EN: &str =
    "Give me 3 relevant keywords (comma-separated, 15 characters max each) for: {query}";

/// Builds the instruction sent upstream for one field.
pub fn build_prompt(field: Field, query: &str, language: Language) -> String {
    use Language::{English, French};

    let template = match (field, language) {
        (Field::Title, French) => TITLE_PROMPT_FR,
        (Field::Title, English) => TITLE_PROMPT_EN,
        (Field::Summary, French) => SUMMARY_PROMPT_FR,
        (Field::Summary, English) => SUMMARY_PROMPT_EN,
        (Field::HistoricalContext, French) => HISTORICAL_CONTEXT_PROMPT_FR,
        (Field::HistoricalContext, English) => HISTORICAL_CONTEXT_PROMPT_EN,
        (Field::Anecdote, French) => ANECDOTE_PROMPT_FR,
        (Field::Anecdote, English) => ANECDOTE_PROMPT_EN,
        (Field::Exposition, French) => EXPOSITION_PROMPT_FR,
        (Field::Exposition, English) => EXPOSITION_PROMPT_EN,
        (Field::Sources, French) => SOURCES_PROMPT_FR,
        (Field::Sources, English) => SOURCES_PROMPT_EN,
        (Field::Images, French) => IMAGES_PROMPT_FR,
        (Field::Images, English) => IMAGES_PROMPT_EN,
        (Field::Keywords, French) => KEYWORDS_PROMPT_FR,
        (Field::Keywords, English) => KEYWORDS_PROMPT_EN,
    };

    template.replace("{query}", query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prompt_embeds_the_query() {
        let query = "la chute de l'empire romain d'occident";
        for field in Field::ALL {
            for language in [Language::French, Language::English] {
                let prompt = build_prompt(field, query, language);
                assert!(
                    prompt.contains(query),
                    "prompt for {field} does not embed the query"
                );
                assert!(
                    !prompt.contains("{query}"),
                    "prompt for {field} left the placeholder unfilled"
                );
            }
        }
    }

    #[test]
    fn test_exposition_prompt_names_all_sections() {
        let prompt = build_prompt(Field::Exposition, "q", Language::French);
        assert!(prompt.contains("Introduction"));
        assert!(prompt.contains("Paragraphe 1"));
        assert!(prompt.contains("Paragraphe 2"));
        assert!(prompt.contains("Paragraphe 3"));
        assert!(prompt.contains("Conclusion"));

        let prompt = build_prompt(Field::Exposition, "q", Language::English);
        assert!(prompt.contains("Paragraph 1"));
        assert!(prompt.contains("Conclusion"));
    }

    #[test]
    fn test_link_prompts_state_the_line_format() {
        assert!(build_prompt(Field::Sources, "q", Language::French).contains("url - titre"));
        assert!(build_prompt(Field::Images, "q", Language::English).contains("url - short"));
    }
}
