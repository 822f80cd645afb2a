//! Knowledge-lookup directives inside an agent's private reasoning.
//!
//! Two forms are recognised: `WIKI_LOOKUP: "term"` (double-quoted,
//! single-quoted or bare up to the end of the line) and `[[term]]`.

use regex::Regex;
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"WIKI_LOOKUP:\s*(?:"([^"\n]*)"|'([^'\n]*)'|([^"'\n]+))"#).expect("valid regex")
});

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\]").expect("valid regex"));

/// First lookup term requested in `text`, if any.
///
/// An explicit `WIKI_LOOKUP:` directive wins over `[[term]]` links.
pub fn find_lookup_term(text: &str) -> Option<String> {
    let directive = DIRECTIVE.captures_iter(text).find_map(|caps| {
        (1..=3)
            .filter_map(|i| caps.get(i))
            .map(|m| clean_term(m.as_str()))
            .find(|t| !t.is_empty())
    });
    directive.or_else(|| {
        WIKI_LINK
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| clean_term(m.as_str()))
            .find(|t| !t.is_empty())
    })
}

fn clean_term(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_quoted_directive() {
        let text = "I should check this.\nWIKI_LOOKUP: \"Permaculture\"\nThen answer.";
        assert_eq!(find_lookup_term(text).as_deref(), Some("Permaculture"));
    }

    #[test]
    fn test_single_quoted_and_bare_directive() {
        assert_eq!(
            find_lookup_term("WIKI_LOOKUP: 'Crop rotation'").as_deref(),
            Some("Crop rotation")
        );
        assert_eq!(
            find_lookup_term("WIKI_LOOKUP: Soil pH.\nmore").as_deref(),
            Some("Soil pH")
        );
    }

    #[test]
    fn test_wiki_link_form() {
        assert_eq!(
            find_lookup_term("Maybe [[Hydroponics]] would help").as_deref(),
            Some("Hydroponics")
        );
    }

    #[test]
    fn test_directive_wins_over_link() {
        let text = "[[Compost]] WIKI_LOOKUP: \"Mulch\"";
        assert_eq!(find_lookup_term(text).as_deref(), Some("Mulch"));
    }

    #[test]
    fn test_no_directive() {
        assert_eq!(find_lookup_term("Just thinking aloud."), None);
        assert_eq!(find_lookup_term("WIKI_LOOKUP: \"\""), None);
        assert_eq!(find_lookup_term("[[ ]]"), None);
    }
}
