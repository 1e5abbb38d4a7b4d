//! Prompt templates for document question answering

use std::collections::HashMap;

use super::ChatMessage;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Standard prompts for answering questions about a document
pub struct RagPrompts;

impl RagPrompts {
    /// System prompt carrying the retrieved passages
    #[must_use]
    pub fn context_system() -> PromptTemplate {
        PromptTemplate::new(
            r"Use the following pieces of context to answer the user's question.
If you don't know the answer, just say that you don't know, don't try to make up an answer.
----------------
{{context}}",
        )
    }

    /// Messages for a context-grounded question
    #[must_use]
    pub fn qa_messages(question: &str, context: &str) -> Vec<ChatMessage> {
        let mut values = HashMap::new();
        values.insert("context".to_string(), context.to_string());

        vec![
            ChatMessage::system(Self::context_system().render(&values)),
            ChatMessage::user(question),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        let template = PromptTemplate::new("Page {{page}} of {{document}}, page {{page}}");
        assert_eq!(template.variables(), &["page", "document"]);
    }

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::new("Hello {{name}}!");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "Alice".to_string());
        assert_eq!(template.render(&values), "Hello Alice!");
    }

    #[test]
    fn test_qa_messages_embed_context_and_question() {
        let messages = RagPrompts::qa_messages(
            "What is the capital of France?",
            "The capital of France is Paris.",
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("The capital of France is Paris."));
        assert!(!messages[0].content.contains("{{context}}"));
        assert_eq!(messages[1], ChatMessage::user("What is the capital of France?"));
    }
}
