use crate::models::RetrievedChunk;

pub const CONTEXT_SEPARATOR: &str = "\n\n";

pub fn grounded_answer_prompt(question: &str, context: &[RetrievedChunk]) -> String {
    let context = context
        .iter()
        .map(|retrieved| retrieved.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    format!(
        "Answer the question based only on the following context. \
         If the context does not contain the answer, say that you don't know.\n\n\
         {context}\n\nQuestion: {question}\nAnswer:"
    )
}

pub fn summary_prompt(text: &str) -> String {
    format!(
        "Please summarize the following text concisely in 3-5 lines.\n\n\
         Text:\n{text}\n\nConcise summary:"
    )
}
