/// Per-query language detection.
///
/// Prompts are written in the language the question was asked in. The
/// heuristic is cheap and total: any French diacritic decides immediately,
/// otherwise stopword counts decide, and a tie falls back to French since
/// that is the primary audience.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    French,
    English,
}

const FRENCH_DIACRITICS: &[char] = &[
    'à', 'â', 'ä', 'æ', 'ç', 'é', 'è', 'ê', 'ë', 'î', 'ï', 'ô', 'ö', 'œ', 'ù', 'û', 'ü', 'ÿ',
];

const FRENCH_STOPWORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "est", "que", "qui", "quoi",
    "pourquoi", "comment", "quel", "quelle", "quels", "quelles", "dans", "pour", "sur", "avec",
    "sont", "il", "elle", "nous", "vous", "ils", "elles", "ce", "cette", "ces", "son", "sa",
    "ses", "aux", "par", "pas", "plus", "mais", "ou",
];

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "is", "are", "was", "were", "what", "why", "how", "which",
    "in", "for", "on", "with", "to", "that", "this", "these", "those", "it", "its", "be", "been",
    "do", "does", "did", "about", "who", "when", "where",
];

/// Decides the prompt language for a query.
pub fn detect_language(query: &str) -> Language {
    let lowered = query.to_lowercase();

    if lowered.chars().any(|c| FRENCH_DIACRITICS.contains(&c)) {
        return Language::French;
    }

    let mut french = 0usize;
    let mut english = 0usize;
    for token in lowered.split(|c: char| !c.is_alphabetic()) {
        if token.is_empty() {
            continue;
        }
        if FRENCH_STOPWORDS.contains(&token) {
            french += 1;
        }
        if ENGLISH_STOPWORDS.contains(&token) {
            english += 1;
        }
    }

    if english > french {
        Language::English
    } else {
        Language::French
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diacritic_wins_over_stopwords() {
        // "café" decides even though the function words are English
        assert_eq!(
            detect_language("what is the history of the parisian café"),
            Language::French
        );
    }

    #[test]
    fn test_french_stopwords() {
        assert_eq!(
            detect_language("quelle est la place de la philosophie dans les sciences"),
            Language::French
        );
    }

    #[test]
    fn test_english_stopwords() {
        assert_eq!(
            detect_language("what is the role of philosophy in modern science"),
            Language::English
        );
    }

    #[test]
    fn test_tie_falls_back_to_french() {
        assert_eq!(detect_language("quantum entanglement paradox"), Language::French);
        assert_eq!(detect_language(""), Language::French);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            detect_language("WHAT IS THE MEANING OF THIS ANCIENT RITUAL"),
            Language::English
        );
    }
}
