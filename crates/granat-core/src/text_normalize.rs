//! Text normalization shared by tag matching and chat trigger matching.
//!
//! Chat clients and spreadsheet exports both leak irregular whitespace
//! (non-breaking spaces, narrow no-break spaces, tabs). Everything that compares
//! user text against catalog or menu text goes through [`normalize_text`] first.

/// Trims, case-folds, and collapses every run of whitespace (including
/// non-breaking and other Unicode spaces) into a single ASCII space.
pub fn normalize_text(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if is_irregular_whitespace(ch) {
            pending_space = !normalized.is_empty();
            continue;
        }
        if pending_space {
            normalized.push(' ');
            pending_space = false;
        }
        normalized.extend(ch.to_lowercase());
    }
    normalized
}

/// Splits a delimited list, normalizes every element, and drops empty elements.
pub fn split_normalized_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(normalize_text)
        .filter(|item| !item.is_empty())
        .collect()
}

// `char::is_whitespace` already covers NBSP and friends; the BOM is not whitespace
// but spreadsheet exports prepend it to the first cell.
fn is_irregular_whitespace(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{FEFF}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_normalize_text_trims_and_case_folds() {
        assert_eq!(normalize_text("  Найти Компонент "), "найти компонент");
        assert_eq!(normalize_text("/START"), "/start");
    }

    #[test]
    fn unit_normalize_text_collapses_non_breaking_spaces() {
        assert_eq!(normalize_text("Веб\u{00A0}\u{00A0}компонент"), "веб компонент");
        assert_eq!(normalize_text("icon\t\u{202F}set"), "icon set");
    }

    #[test]
    fn unit_normalize_text_returns_empty_for_blank_input() {
        assert_eq!(normalize_text(" \u{00A0}\t"), "");
    }

    #[test]
    fn functional_split_normalized_list_matches_tag_contract() {
        assert_eq!(
            split_normalized_list("Button, checkbox ,  Icon", ','),
            vec!["button", "checkbox", "icon"]
        );
    }

    #[test]
    fn regression_split_normalized_list_drops_empty_elements() {
        assert_eq!(
            split_normalized_list(",, Tag ,\u{00A0},", ','),
            vec!["tag".to_string()]
        );
    }
}
