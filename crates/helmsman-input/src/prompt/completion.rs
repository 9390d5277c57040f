//! Tab completion as a pure buffer transformation.

/// The outcome of one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The input buffer after completion.
    pub buffer: String,
    /// Candidates to display; empty when the buffer was resolved.
    pub candidates: Vec<String>,
}

/// Complete `input` against `candidates`.
///
/// Only candidates that start with `input` are considered. A single match
/// replaces the buffer. Several matches extend the buffer to their longest
/// common prefix when that is longer than `input`, and are listed for display.
/// Otherwise the buffer is returned unchanged.
///
/// ```
/// use helmsman_input::complete;
///
/// let words = ["hello", "help", "world"].map(String::from);
/// assert_eq!(complete("he", &words).buffer, "hel");
/// assert_eq!(complete("wo", &words).buffer, "world");
/// ```
pub fn complete(input: &str, candidates: &[String]) -> Completion {
    let matches: Vec<&String> = candidates
        .iter()
        .filter(|c| c.starts_with(input))
        .collect();

    match matches.as_slice() {
        [] => Completion {
            buffer: input.to_string(),
            candidates: Vec::new(),
        },
        [only] => Completion {
            buffer: (*only).clone(),
            candidates: Vec::new(),
        },
        many => {
            let prefix = longest_common_prefix(many);
            let buffer = if prefix.len() > input.len() {
                prefix.to_string()
            } else {
                input.to_string()
            };
            Completion {
                buffer,
                candidates: dedup_in_order(many),
            }
        }
    }
}

fn longest_common_prefix<'a>(words: &[&'a String]) -> &'a str {
    let Some((first, rest)) = words.split_first() else {
        return "";
    };
    let mut end = first.len();
    for word in rest {
        end = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, a), _)| i + a.len_utf8())
            .unwrap_or(0)
            .min(end);
    }
    &first[..end]
}

fn dedup_in_order(words: &[&String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        if !out.iter().any(|w| w == *word) {
            out.push((*word).clone());
        }
    }
    out
}
