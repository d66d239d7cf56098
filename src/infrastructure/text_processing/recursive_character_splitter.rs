use std::collections::VecDeque;

use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits on the coarsest separator present, recursing into pieces that are
/// still too long, then greedily merges neighbours back up to `chunk_size`
/// characters with `chunk_overlap` characters carried between chunks.
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, TextSplitterError> {
        Self::with_separators(chunk_size, chunk_overlap, &DEFAULT_SEPARATORS)
    }

    pub fn with_separators(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &[&str],
    ) -> Result<Self, TextSplitterError> {
        if chunk_size == 0 {
            return Err(TextSplitterError::InvalidConfiguration(
                "chunk_size must be positive".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(TextSplitterError::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for split in splits {
            if char_len(split) < self.chunk_size {
                pending.push(split);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(split.to_string());
            } else {
                chunks.extend(self.split_recursive(split, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    fn merge(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let joint = if current.is_empty() { 0 } else { separator_len };
            if total + len + joint > self.chunk_size && !current.is_empty() {
                push_joined(&mut docs, &current, separator);
                while total > self.chunk_overlap
                    || (total > 0
                        && total + len + if current.is_empty() { 0 } else { separator_len }
                            > self.chunk_size)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if current.is_empty() { 0 } else { separator_len };
                }
            }
            total += len + if current.is_empty() { 0 } else { separator_len };
            current.push_back(split);
        }
        push_joined(&mut docs, &current, separator);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, parts: &VecDeque<&str>, separator: &str) {
    let joined = parts
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[async_trait]
impl TextSplitter for RecursiveCharacterSplitter {
    async fn split(&self, text: &str) -> Result<Vec<String>, TextSplitterError> {
        Ok(self.split_text(text))
    }
}
