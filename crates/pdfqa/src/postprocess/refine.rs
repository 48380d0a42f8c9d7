//! Answer focusing: fewer lines, no topic drift, bounded length

/// Lines kept from a generated answer
pub const MAX_LINES: usize = 3;

/// Minimum number of characters before a topic-shift marker for a cut
pub const MIN_CUT_OFFSET: usize = 30;

/// Answers longer than this (in characters) are shortened by sentences
pub const MAX_ANSWER_CHARS: usize = 200;

/// Spanish connectives that usually introduce content the question did not ask for
pub const TOPIC_SHIFT_MARKERS: &[&str] = &[
    "también",
    "además",
    "por otro lado",
    "asimismo",
    "igualmente",
    "adicionalmente",
    "incluso",
    "del mismo modo",
    "otra información",
    "otros datos",
];

/// Focus an answer on what was asked
///
/// Keeps the first three lines, cuts before any topic-shift connective that
/// appears after the first 30 characters, and when still longer than 200
/// characters keeps only the leading sentences that fit.
pub fn refine_answer(answer: &str, question: &str) -> String {
    tracing::trace!(question_chars = question.chars().count(), "Refining answer");

    let lines: Vec<&str> = answer.split('\n').collect();
    let mut answer = if lines.len() > MAX_LINES {
        lines[..MAX_LINES].join("\n")
    } else {
        answer.to_string()
    };

    for marker in TOPIC_SHIFT_MARKERS {
        if let Some(idx) = find_case_insensitive(&answer, marker) {
            if answer[..idx].chars().count() > MIN_CUT_OFFSET {
                answer = answer[..idx].trim().to_string();
            }
        }
    }

    if answer.chars().count() > MAX_ANSWER_CHARS {
        answer = shorten_by_sentences(&answer);
    }

    answer.trim().to_string()
}

/// Byte offset of the first case-insensitive occurrence of `needle`
///
/// Offsets always fall on a char boundary of `haystack`.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Some(0);
    }

    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        let mut lowered = haystack[i..].chars().flat_map(char::to_lowercase);
        needle.iter().all(|c| lowered.next() == Some(*c))
    })
}

/// Greedily reassemble '.'-separated sentences while under the length limit
fn shorten_by_sentences(answer: &str) -> String {
    let mut shortened = String::new();
    let mut length = 0;

    for sentence in answer.split('.') {
        let sentence_len = sentence.chars().count();
        if length + sentence_len >= MAX_ANSWER_CHARS {
            break;
        }
        shortened.push_str(sentence);
        shortened.push('.');
        length += sentence_len + 1;
    }

    if shortened.trim_matches(|c: char| c == '.' || c.is_whitespace()).is_empty() {
        // The first sentence alone is over the limit
        return truncate_at_word(answer, MAX_ANSWER_CHARS - 1);
    }

    shortened
}

/// Cut to at most `max_chars` characters, backing off to the last space
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..end];

    match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => head[..space].trim_end().to_string(),
        _ => head.to_string(),
    }
}
