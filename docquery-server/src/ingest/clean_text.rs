use regex::Regex;
use std::sync::LazyLock;

static HYPHENATED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-\n(\w)").expect("valid regex"));
static MULTIPLE_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// Text transformation applied to every extracted page
pub type CleaningFunction = fn(&str) -> String;

/// Cleaning functions applied by `ingest`, in order
pub const DEFAULT_CLEANING_FUNCTIONS: [CleaningFunction; 3] = [
    merge_hyphenated_words,
    fix_newlines,
    remove_multiple_newlines,
];

/// Join words that were hyphenated across a line break
pub fn merge_hyphenated_words(text: &str) -> String {
    HYPHENATED_WORD.replace_all(text, "${1}${2}").into_owned()
}

/// Replace a lone line break with a space
///
/// Line breaks that are part of a run of two or more are kept.
pub fn fix_newlines(text: &str) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let lone = *c == '\n'
                && (i == 0 || chars[i - 1] != '\n')
                && chars.get(i + 1).is_none_or(|next| *next != '\n');
            if lone { ' ' } else { *c }
        })
        .collect()
}

/// Collapse runs of line breaks into one
pub fn remove_multiple_newlines(text: &str) -> String {
    MULTIPLE_NEWLINES.replace_all(text, "\n").into_owned()
}

/// Run every cleaning function over every page, keeping the page numbers
pub fn clean_text(
    pages: Vec<(u32, String)>,
    cleaning_functions: &[CleaningFunction],
) -> Vec<(u32, String)> {
    pages
        .into_iter()
        .map(|(page_number, text)| {
            let text = cleaning_functions
                .iter()
                .fold(text, |text, cleaning_function| cleaning_function(&text));
            (page_number, text)
        })
        .collect()
}
