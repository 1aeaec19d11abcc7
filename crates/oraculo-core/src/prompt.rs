/// Instruction template that grounds the model on retrieved context.
///
/// `{context}` and `{question}` are substituted at render time. The default
/// template instructs the model to answer in Portuguese, to use only the
/// supplied context, and to say it does not know when the context is
/// insufficient.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

const DEFAULT_TEMPLATE: &str = "\
Você é um assistente especializado que responde perguntas baseado no contexto fornecido.

Contexto:
{context}

Pergunta: {question}

Responda de forma clara e detalhada em português, usando apenas as informações do contexto acima.
Se a informação não estiver no contexto, diga que não sabe.

Resposta:";

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_owned(),
        }
    }
}

impl PromptTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Assemble the final instruction text. Chunks are joined with blank
    /// lines, in the order given (retrieval order).
    #[must_use]
    pub fn render(&self, chunks: &[String], question: &str) -> String {
        let context = chunks.join("\n\n");
        self.template
            .replace("{context}", &context)
            .replace("{question}", question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_contains_question_and_chunks() {
        let template = PromptTemplate::default();
        let chunks = vec!["primeiro trecho".to_owned(), "segundo trecho".to_owned()];
        let prompt = template.render(&chunks, "qual é a resposta?");

        assert!(prompt.contains("qual é a resposta?"));
        assert!(prompt.contains("primeiro trecho"));
        assert!(prompt.contains("segundo trecho"));
    }

    #[test]
    fn render_joins_chunks_with_blank_line() {
        let template = PromptTemplate::default();
        let chunks = vec!["a".to_owned(), "b".to_owned()];
        let prompt = template.render(&chunks, "q");
        assert!(prompt.contains("a\n\nb"));
    }

    #[test]
    fn render_preserves_chunk_order() {
        let template = PromptTemplate::default();
        let chunks = vec!["zebra".to_owned(), "abelha".to_owned()];
        let prompt = template.render(&chunks, "q");
        assert!(prompt.find("zebra").unwrap() < prompt.find("abelha").unwrap());
    }

    #[test]
    fn render_zero_chunks_is_well_formed() {
        let template = PromptTemplate::default();
        let prompt = template.render(&[], "pergunta sem contexto");
        assert!(prompt.contains("Contexto:"));
        assert!(prompt.contains("pergunta sem contexto"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn render_default_states_grounding_rules() {
        let prompt = PromptTemplate::default().render(&[], "q");
        assert!(prompt.contains("apenas as informações do contexto"));
        assert!(prompt.contains("diga que não sabe"));
        assert!(prompt.contains("em português"));
    }

    #[test]
    fn custom_template_substitutes_placeholders() {
        let template = PromptTemplate::new("C: {context} | Q: {question}");
        let prompt = template.render(&["ctx".to_owned()], "quest");
        assert_eq!(prompt, "C: ctx | Q: quest");
    }
}
