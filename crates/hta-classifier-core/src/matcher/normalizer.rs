//! Text normalization and whole-word helpers.
//!
//! Handles:
//! - Case/whitespace normalization of raw cell values
//! - Latin accent folding (cápsula→capsula, niños→ninos)
//! - Whole-word patterns, bounded by regex `\b` (letters, digits and `_`
//!   are word characters)

use regex::Regex;

/// Normalize a raw text value: missing → `""`, otherwise lower-case and trim.
pub fn normalize_text(text: Option<&str>) -> String {
    match text {
        None => String::new(),
        Some(t) => t.trim().to_lowercase(),
    }
}

/// Fold accented Latin letters to their ASCII base letter.
///
/// Characters without a mapping pass through unchanged.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
            'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
            'ç' | 'ć' | 'č' => 'c',
            'Ç' | 'Ć' | 'Č' => 'C',
            'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
            'È'..='Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => 'E',
            'ì'..='ï' | 'ī' | 'į' | 'ı' => 'i',
            'Ì'..='Ï' | 'Ī' | 'Į' | 'İ' => 'I',
            'ñ' | 'ń' | 'ň' => 'n',
            'Ñ' | 'Ń' | 'Ň' => 'N',
            'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
            'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ő' => 'O',
            'ù'..='ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
            'Ù'..='Ü' | 'Ū' | 'Ů' | 'Ű' | 'Ų' => 'U',
            'ý' | 'ÿ' => 'y',
            'Ý' | 'Ÿ' => 'Y',
            'š' | 'ś' => 's',
            'Š' | 'Ś' => 'S',
            'ž' | 'ź' | 'ż' => 'z',
            'Ž' | 'Ź' | 'Ż' => 'Z',
            c => c,
        })
        .collect()
}

/// Normalize and accent-fold a raw value into the form the matcher works on.
pub fn prepare_text(text: Option<&str>) -> String {
    fold_accents(&normalize_text(text))
}

/// Compile a pattern matching `word` only as a whole word.
pub fn word_pattern(word: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b{}\b", regex::escape(word)))
}
