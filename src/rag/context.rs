//! Context assembly from retrieved passages

use crate::models::Passage;

/// Joins retrieved passages into the context block of a prompt
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Concatenate passage texts in retrieval order, separated by blank lines.
    ///
    /// Passages that would push the context past the length limit are
    /// dropped; the first passage is always kept.
    #[must_use]
    pub fn assemble(&self, passages: &[Passage]) -> String {
        let mut context = String::new();
        let mut total_length = 0;

        for passage in passages {
            let separator = if context.is_empty() { "" } else { "\n\n" };
            let entry_length = separator.len() + passage.text.len();

            if !context.is_empty() && total_length + entry_length > self.max_context_length {
                break;
            }

            context.push_str(separator);
            context.push_str(&passage.text);
            total_length += entry_length;
        }

        context
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(8000)
    }
}
