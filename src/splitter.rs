//! Response splitting.
//!
//! Reasoning models wrap their chain-of-thought in `<think>...</think>`
//! blocks. This module separates that block from the final content so the
//! dashboard can render them independently.

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Raw model output separated into reasoning and final content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResponse {
    /// Trimmed inner text of the first think block, empty if absent.
    pub thinking: String,
    /// Raw text with the first think block removed, trimmed.
    pub content: String,
}

/// Splits raw model output into thinking and content.
///
/// Only the first well-formed block is honored: a second block, or a
/// dangling open tag, is left in the content untouched. Text without
/// any well-formed block passes through unchanged.
pub fn split(raw: &str) -> SplitResponse {
    if let Some(open) = raw.find(THINK_OPEN) {
        let inner_start = open + THINK_OPEN.len();
        if let Some(close) = raw[inner_start..].find(THINK_CLOSE) {
            let inner = &raw[inner_start..inner_start + close];
            let rest_start = inner_start + close + THINK_CLOSE.len();

            let mut content = String::with_capacity(raw.len() - inner.len());
            content.push_str(&raw[..open]);
            content.push_str(&raw[rest_start..]);

            return SplitResponse {
                thinking: inner.trim().to_string(),
                content: content.trim().to_string(),
            };
        }
    }

    SplitResponse {
        thinking: String::new(),
        content: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_well_formed_block() {
        let out = split("<think>abc</think>rest");
        assert_eq!(out.thinking, "abc");
        assert_eq!(out.content, "rest");
    }

    #[test]
    fn test_split_plain_text_unchanged() {
        let out = split("plain text");
        assert_eq!(out.thinking, "");
        assert_eq!(out.content, "plain text");
    }

    #[test]
    fn test_split_trims_thinking_and_content() {
        let out = split("<think>\n  weighing the levels  \n</think>\n\n**GO — LONG** 80%");
        assert_eq!(out.thinking, "weighing the levels");
        assert_eq!(out.content, "**GO — LONG** 80%");
    }

    #[test]
    fn test_split_block_in_the_middle() {
        let out = split("prefix <think>inner</think> suffix");
        assert_eq!(out.thinking, "inner");
        assert_eq!(out.content, "prefix  suffix");
    }

    #[test]
    fn test_split_only_first_block_honored() {
        let out = split("<think>first</think>body<think>second</think>tail");
        assert_eq!(out.thinking, "first");
        assert_eq!(out.content, "body<think>second</think>tail");
    }

    #[test]
    fn test_split_unclosed_tag_is_not_a_block() {
        let out = split("<think>never closed, still content");
        assert_eq!(out.thinking, "");
        assert_eq!(out.content, "<think>never closed, still content");
    }

    #[test]
    fn test_split_empty_input() {
        let out = split("");
        assert_eq!(out.thinking, "");
        assert_eq!(out.content, "");
    }
}
