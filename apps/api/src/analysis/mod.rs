//! Keyword analysis: one raw completion, post-processed locally.
//!
//! Unlike search, the submitted text goes to the model as-is; the structure
//! comes entirely from the pure helpers below, which makes them cheap to
//! test without a backend.

pub mod handlers;

/// Words longer than four characters, first five, in text order.
/// Punctuation stays attached to its word.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 4)
        .take(5)
        .map(str::to_string)
        .collect()
}

/// Regroups the text's sentences into up to `count` paragraphs of roughly
/// equal length, preserving sentence order.
pub fn split_paragraphs(text: &str, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }

    let sentences: Vec<&str> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return Vec::new();
    }

    let per_paragraph = (sentences.len() + count - 1) / count;
    sentences
        .chunks(per_paragraph)
        .map(|chunk| {
            let mut paragraph = chunk.join(". ");
            if !paragraph.ends_with('.') {
                paragraph.push('.');
            }
            paragraph
        })
        .collect()
}

/// Source channels quoted alongside every analysis.
pub const ANALYSIS_SOURCES: [&str; 3] = [
    "Source 1: Blog",
    "Source 2: Presse",
    "Source 3: Recherche académique",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_filters_short_words_and_caps_at_five() {
        let text = "L'analyse détaillée montre une forte corrélation entre ces facteurs économiques";
        assert_eq!(
            extract_keywords(text),
            vec!["L'analyse", "détaillée", "montre", "forte", "corrélation"]
        );
    }

    #[test]
    fn test_extract_keywords_empty_text() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("un si pe tit mot").is_empty());
    }

    #[test]
    fn test_split_paragraphs_even_groups() {
        let text = "Un. Deux. Trois. Quatre. Cinq. Six.";
        assert_eq!(
            split_paragraphs(text, 3),
            vec!["Un. Deux.", "Trois. Quatre.", "Cinq. Six."]
        );
    }

    #[test]
    fn test_split_paragraphs_fewer_sentences_than_paragraphs() {
        assert_eq!(split_paragraphs("Une seule phrase.", 3), vec!["Une seule phrase."]);
        assert!(split_paragraphs("", 3).is_empty());
    }

    #[test]
    fn test_split_paragraphs_never_doubles_periods() {
        let paragraphs = split_paragraphs("Premier point. Second point. Dernier point final.", 2);
        assert_eq!(
            paragraphs,
            vec!["Premier point. Second point.", "Dernier point final."]
        );
    }
}
