use minijinja::{Environment, context};

use crate::{error::ServerResult, store::document::Document};

/// Prompt that stuffs every retrieved chunk into a single request
pub const STUFF_PROMPT_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{{ context }}

Question: {{ question }}
Helpful Answer:";

/// Render the question answering prompt
///
/// # Arguments
///
/// `documents` - &[Document], retrieved chunks in retrieval order
/// `question` - &str, the user question
pub fn render_stuff_prompt(documents: &[Document], question: &str) -> ServerResult<String> {
    let context = documents
        .iter()
        .map(|document| document.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut env = Environment::new();
    env.add_template("stuff", STUFF_PROMPT_TEMPLATE)?;
    let prompt = env
        .get_template("stuff")?
        .render(context! { context => context, question => question })?;
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::document::DocumentMetadata;

    #[test]
    fn test_render_stuff_prompt() {
        let documents = vec![
            Document::new(
                "Filters are changed monthly.".to_string(),
                DocumentMetadata::new("a.pdf", 1, 0),
            ),
            Document::new(
                "Use <only> genuine filters & seals.".to_string(),
                DocumentMetadata::new("b.pdf", 2, 0),
            ),
        ];
        let prompt = render_stuff_prompt(&documents, "How often are filters changed?").unwrap();
        assert_eq!(
            prompt,
            "Use the following pieces of context to answer the question at the end. \
             If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
             Filters are changed monthly.\n\nUse <only> genuine filters & seals.\n\n\
             Question: How often are filters changed?\nHelpful Answer:"
        );
    }

    #[test]
    fn test_render_stuff_prompt_without_context() {
        let prompt = render_stuff_prompt(&[], "Anything?").unwrap();
        assert!(prompt.contains("answer.\n\n\n\nQuestion: Anything?"));
    }
}
