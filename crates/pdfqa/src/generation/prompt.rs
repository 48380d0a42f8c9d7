//! Prompt templates for Spanish document QA

use crate::retrieval::SearchResult;

/// Exchanges from the conversation memory as (question, answer)
pub type History = [(String, String)];

/// Prompt builder for chat, follow-up condensing and summaries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search results
    pub fn build_context(results: &[SearchResult]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                format!(
                    "[{}] {}\n{}",
                    i + 1,
                    result.chunk.source.format_citation(),
                    result.chunk.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render conversation memory as alternating turns
    pub fn format_history(history: &History) -> String {
        history
            .iter()
            .map(|(question, answer)| format!("Usuario: {}\nAsistente: {}", question, answer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Answering prompt: Spanish only, brief, grounded in the context
    pub fn build_answer_prompt(question: &str, context: &str, history: &History) -> String {
        format!(
            r#"<instrucciones>
Eres un asistente que responde en español preguntas sobre documentos PDF.

Responde solo a la pregunta formulada, sin añadir datos que no se hayan pedido
ni adelantarte a otras preguntas. Una o dos oraciones suelen bastar.

Si el contexto no contiene la información pedida, responde exactamente:
"No encuentro información sobre eso en el documento."

Usa únicamente el contexto y responde siempre en español.
</instrucciones>

<contexto>
{context}
</contexto>

<chat_previo>
{history}
</chat_previo>

<pregunta>
{question}
</pregunta>

<respuesta>
"#,
            context = context,
            history = Self::format_history(history),
            question = question
        )
    }

    /// Rewrite a follow-up into a standalone question
    pub fn build_condense_prompt(question: &str, history: &History) -> String {
        format!(
            r#"Dada la conversación siguiente y una pregunta de seguimiento, reformula la pregunta de seguimiento para que se entienda por sí sola. Conserva su idioma y devuelve solo la pregunta.

Conversación:
{history}

Pregunta de seguimiento: {question}
Pregunta independiente:"#,
            history = Self::format_history(history),
            question = question
        )
    }

    /// Build a summarization prompt
    pub fn build_summary_prompt(filename: &str, text: &str) -> String {
        format!(
            r#"Genera en español un resumen breve (un párrafo) del documento "{filename}" a partir del siguiente texto:

{text}

Resumen:"#,
            filename = filename,
            text = text
        )
    }
}
