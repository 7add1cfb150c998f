// Shared prompt constants and prompt-building utilities.
// Each gateway that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System instruction for every schema-constrained call.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only, matching the response schema exactly. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Joins a list for inline use in a prompt (`"Go, Python"`).
/// An empty list renders as `"none specified"` so the prompt never has a dangling label.
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "none specified".to_string();
    }
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Substitutes `{key}` placeholders in a template in a single pass.
///
/// Inserted values are never scanned again, so user text containing braces
/// reaches the prompt verbatim. Unknown placeholders are left as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (close, *value))
        });
        match known {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
