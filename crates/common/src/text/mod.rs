//! Arabic-aware text normalization
//!
//! Search suggestions must match regardless of diacritics and common
//! orthographic variants: queries like "احمد" should find "أَحْمَد".
//! Normalization is applied to both the stored title/author columns and
//! the incoming query before comparison.

/// Normalize a string for search matching.
///
/// - lowercases ASCII
/// - strips Arabic tashkeel (fathatan..sukun), the superscript alef,
///   and tatweel
/// - unifies alef variants (أ إ آ ٱ) to bare alef
/// - maps hamza carriers (ؤ ئ) to their base letters
/// - maps teh marbuta (ة) to heh and alef maqsura (ى) to yeh
/// - collapses runs of whitespace to a single space
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = true;

    for c in input.trim().chars() {
        let mapped = match c {
            // Tashkeel and tatweel carry no lexical meaning for matching
            '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}' => continue,

            // Alef variants
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',

            // Hamza carriers
            'ؤ' => 'و',
            'ئ' => 'ي',

            // Teh marbuta and alef maqsura
            'ة' => 'ه',
            'ى' => 'ي',

            c if c.is_whitespace() => {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
                continue;
            }

            c => c.to_ascii_lowercase(),
        };

        out.push(mapped);
        last_was_space = false;
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// True when the normalized haystack starts with or contains the
/// normalized needle. Empty needles never match.
pub fn matches_suggestion(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    if needle.is_empty() {
        return false;
    }
    normalize(haystack).contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tashkeel() {
        assert_eq!(normalize("أَحْمَد"), "احمد");
        assert_eq!(normalize("الكِتَاب"), "الكتاب");
    }

    #[test]
    fn test_unifies_alef_and_hamza() {
        assert_eq!(normalize("إبراهيم"), "ابراهيم");
        assert_eq!(normalize("آمال"), "امال");
        assert_eq!(normalize("مسؤول"), "مسوول");
        assert_eq!(normalize("قارئ"), "قاري");
    }

    #[test]
    fn test_teh_marbuta_and_maqsura() {
        assert_eq!(normalize("مكتبة"), "مكتبه");
        assert_eq!(normalize("مصطفى"), "مصطفي");
    }

    #[test]
    fn test_ascii_lowercase_and_whitespace() {
        assert_eq!(normalize("  One  Hundred   Years "), "one hundred years");
    }

    #[test]
    fn test_suggestion_matching() {
        assert!(matches_suggestion("أَحْمَد خالد توفيق", "احمد"));
        assert!(matches_suggestion("The Alchemist", "alchem"));
        assert!(!matches_suggestion("مكتبة", "كتابه"));
        assert!(!matches_suggestion("anything", "   "));
    }
}
