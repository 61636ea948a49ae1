//! Prompt templates for the portfolio assistant

use std::collections::HashMap;

/// Sentence the model is told to answer with when the context has no answer
pub const FALLBACK_ANSWER: &str = "I am sorry, I do not know the answer";

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill in the template with variables.
    ///
    /// Substitution is a single left-to-right pass, so `{{...}}` sequences
    /// inside substituted values (retrieved documents, say) are left alone.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let name = &rest[start + 2..start + 2 + len];
            result.push_str(&rest[..start]);
            match values.get(name) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 4 + len]),
            }
            rest = &rest[start + 4 + len..];
        }
        result.push_str(rest);
        result
    }
}

/// Standard prompts of the portfolio assistant
pub struct PortfolioPrompts;

impl PortfolioPrompts {
    /// System turn of a grounded conversation. Variables: `owner`, `context`
    /// (the already delimited context block).
    #[must_use]
    pub fn grounded_system() -> PromptTemplate {
        PromptTemplate::new(format!(
            r#"You are an AI assistant answering questions as {{{{owner}}}} in their Portfolio App.
Format responses using markdown where applicable.
Answer using the information between START CONTEXT and END CONTEXT.
{{{{context}}}}
If the answer is not provided in the context, the AI assistant will say, "{FALLBACK_ANSWER}"."#
        ))
    }
}
