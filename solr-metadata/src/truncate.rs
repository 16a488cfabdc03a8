//! Applying a [`TruncationPolicy`] to description values.

use crate::types::{TruncationPolicy, TruncationType};

const ELLIPSIS: char = '…';

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || matches!(c, '…' | '–' | '—')
}

impl TruncationPolicy {
    /// Shorten a single string. Lengths are counted in characters.
    pub fn truncate(&self, text: &str) -> String {
        if self.max_length == 0 || text.chars().count() <= self.max_length {
            return text.to_string();
        }

        let budget = if self.ellipsis {
            self.max_length - 1
        } else {
            self.max_length
        };
        if budget == 0 {
            return if self.ellipsis {
                ELLIPSIS.to_string()
            } else {
                String::new()
            };
        }

        let chars: Vec<char> = text.chars().collect();
        let cut = if self.word_safe {
            word_safe_cut(&chars, self.min_wordsafe_length.max(1), budget).unwrap_or(budget)
        } else {
            budget
        };

        let mut out: String = chars[..cut].iter().collect();
        if self.ellipsis {
            let trimmed_len = out.trim_end_matches('.').len();
            out.truncate(trimmed_len);
            out.push(ELLIPSIS);
        }
        out
    }

    /// Shorten the values of a field according to the truncation type.
    ///
    /// `separate_value_option` limits each value; `whole_field_option`
    /// joins the values with `separator` and limits the result.
    pub fn apply(&self, values: &[String], separator: &str) -> Vec<String> {
        match self.truncation_type {
            TruncationType::SeparateValue => values.iter().map(|v| self.truncate(v)).collect(),
            TruncationType::WholeField => {
                if values.is_empty() {
                    return Vec::new();
                }
                vec![self.truncate(&values.join(separator))]
            }
        }
    }
}

/// Longest prefix with at least `min` and at most `max` characters that is
/// followed by a word boundary. Word-safe cutting is off when `max` does
/// not exceed `min`.
fn word_safe_cut(chars: &[char], min: usize, max: usize) -> Option<usize> {
    if min >= max {
        return None;
    }
    (min..=max)
        .rev()
        .find(|&len| chars.get(len).copied().is_some_and(is_word_boundary))
}
