//! Word-boundary case conversion used for custom-property names and default
//! utility class prefixes.

/// Converts `input` to kebab case.
///
/// Uppercase letters start a new word and are lower-cased. Whitespace, ASCII
/// punctuation and the general/supplemental punctuation blocks separate words;
/// a run of separators collapses into a single `-`. Input that is already
/// hyphenated passes through unchanged.
pub fn kebab_case(input: &str) -> String {
    let mut spaced = String::with_capacity(input.len() + 4);
    for ch in input.chars() {
        if is_capital(ch) {
            spaced.push(' ');
            spaced.extend(ch.to_lowercase());
        } else {
            spaced.push(ch);
        }
    }

    let mut out = String::with_capacity(spaced.len());
    let mut in_separator = false;
    for ch in spaced.trim().chars() {
        if is_word_separator(ch) {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            out.push(ch);
            in_separator = false;
        }
    }
    out
}

fn is_capital(ch: char) -> bool {
    ch.is_ascii_uppercase()
        || ('\u{C0}'..='\u{D6}').contains(&ch)
        || ('\u{D9}'..='\u{DD}').contains(&ch)
}

fn is_word_separator(ch: char) -> bool {
    ch.is_whitespace()
        || ch.is_ascii_punctuation()
        || ('\u{2000}'..='\u{206F}').contains(&ch)
        || ('\u{2E00}'..='\u{2E7F}').contains(&ch)
}
