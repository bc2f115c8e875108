/// Counts model tokens in a piece of text
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Byte-length heuristic: about four bytes of code per token.
///
/// Any non-empty text costs at least one token.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCounter;

impl TokenCounter for ApproxTokenCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            0
        } else {
            (text.len() / 4).max(1)
        }
    }
}

/// Drop whole lines from the start of `text` until it fits in `max_tokens`
pub fn prune_lines_from_top(text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> String {
    let mut total = counter.count(text);
    if total <= max_tokens {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut first = 0;
    while total > max_tokens && first < lines.len() {
        total = total.saturating_sub(counter.count(lines[first]));
        first += 1;
    }
    lines[first..].join("\n")
}

/// Drop whole lines from the end of `text` until it fits in `max_tokens`
pub fn prune_lines_from_bottom(
    text: &str,
    max_tokens: usize,
    counter: &dyn TokenCounter,
) -> String {
    let mut total = counter.count(text);
    if total <= max_tokens {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut end = lines.len();
    while total > max_tokens && end > 0 {
        end -= 1;
        total = total.saturating_sub(counter.count(lines[end]));
    }
    lines[..end].join("\n")
}
