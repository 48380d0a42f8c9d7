//! Terminal punctuation cleanup

/// Normalize the end of an answer to exactly one terminal mark
///
/// Trailing whitespace is dropped, runs of trailing periods and a trailing
/// " ." collapse into a single '.', and a '.' is appended when the text does
/// not already end in '.', '!' or '?'. Applying it twice gives the same
/// result as applying it once.
pub fn fix_ending_punctuation(text: &str) -> String {
    let mut text = text.trim_end().to_string();

    loop {
        if text.ends_with("..") {
            text.pop();
        } else if text.ends_with(" .") {
            text.truncate(text.len() - 2);
            text.push('.');
        } else {
            break;
        }
    }

    if !text.ends_with(|c: char| matches!(c, '.' | '!' | '?')) {
        text.push('.');
    }

    text
}
