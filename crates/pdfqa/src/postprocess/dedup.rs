//! Removal of repeated text in generated answers

/// Answers shorter than this (in characters) are left alone
pub const MIN_DEDUP_CHARS: usize = 20;

/// Drop duplicated content from an answer
///
/// Models sometimes emit the same answer twice in a row. When one half of
/// the text contains the other, only the first half is kept; otherwise
/// consecutive identical sentences are collapsed.
pub fn remove_duplicated_text(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count < MIN_DEDUP_CHARS {
        return text.to_string();
    }

    let mid = text
        .char_indices()
        .nth(char_count / 2)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let (first_half, second_half) = text.split_at(mid);
    let first_half = first_half.trim();
    let second_half = second_half.trim();

    if !first_half.is_empty()
        && !second_half.is_empty()
        && (second_half.contains(first_half) || first_half.contains(second_half))
    {
        return first_half.to_string();
    }

    let mut kept: Vec<&str> = Vec::new();
    for sentence in text.split(". ") {
        let sentence = sentence.trim();
        if !sentence.is_empty() && kept.last() != Some(&sentence) {
            kept.push(sentence);
        }
    }

    kept.join(". ")
}
