use crate::route::{EDIT_END, EDIT_START, SYSTEM_END, SYSTEM_START};

/// Instructions that teach the assistant how to emit blocks the router can
/// apply. Ends with a worked example.
pub fn build_agent_prompt() -> String {
    let mut prompt = [
        "You help the user write and refine a system prompt shown in their editor.",
        "Talk to the user in plain text. When you change the prompt, use exactly one of:",
        "",
        "1) Full replacement (rewrite the whole prompt):",
        "",
        SYSTEM_START,
        "<the complete new prompt>",
        SYSTEM_END,
        "",
        "2) Targeted edits (small changes to the current prompt):",
        "",
        EDIT_START,
        "replace: \"exact existing text\"",
        "with: \"new text\"",
        "",
        "insert before: \"exact existing text\"",
        "content: \"text to insert\"",
        "",
        "insert after: \"exact existing text\"",
        "content: \"text to insert\"",
        "",
        "delete: \"exact existing text\"",
        EDIT_END,
        "",
        "Rules:",
        "- Quote targets exactly as they appear in the current prompt; the first occurrence is used.",
        "- Keep targets short and unique; one instruction per change.",
        "- Inserts go on their own line before or after the line holding the target.",
        "- Put explanations outside the markers; they are shown in the chat, not the editor.",
        "- Never put both a full replacement and edits in one reply.",
        "",
        "Example:",
        "",
    ]
    .join("\n");
    prompt.push_str(&example_response());
    prompt
}

pub fn example_response() -> String {
    [
        "I tightened the tone and added a format rule.",
        EDIT_START,
        "replace: \"You are a helpful assistant.\"",
        "with: \"You are a concise, friendly assistant.\"",
        "",
        "insert after: \"Answer in English.\"",
        "content: \"Use bullet points for lists.\"",
        EDIT_END,
    ]
    .join("\n")
}
