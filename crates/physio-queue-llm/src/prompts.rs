//! Prompts for desk-entry parsing.
//!
//! Designed for small instruction-tuned models with JSON grammar
//! constraints.

/// System prompt describing the desk-entry split rules.
pub const SYSTEM_PROMPT: &str = r#"You are a clinic front-desk assistant that extracts the patient name and the memo content from a short staff entry.

Rules:
- If there is a number before the name (e.g., "3333 김진료 도수대기" or "2343/주한솔 충격파"), include the number as part of the name (e.g., name: "3333 김진료").
- The separator between number and name can be a space or "/".
- If the text is just a name (with or without number), assume the memo content is "접수/대기".

Output JSON with keys "name" and "treatment" (where "treatment" holds the memo content)."#;

/// User prompt template for entry extraction.
pub fn make_parse_prompt(raw_text: &str) -> String {
    format!(
        r#"Extract the name and the memo content from this text: "{}".

Return a JSON object with:
- name: The patient name, including any leading chart number
- treatment: The memo content ("접수/대기" if the text is only a name)"#,
        raw_text
    )
}

/// JSON grammar constraint for llama.cpp to ensure valid output format.
pub const JSON_GRAMMAR: &str = r#"
root ::= object
object ::= "{" ws
    "\"name\"" ws ":" ws string ws "," ws
    "\"treatment\"" ws ":" ws string ws
"}"
string ::= "\"" ([^"\\] | "\\" .)* "\""
ws ::= [ \t\n]*
"#;

/// Example few-shot prompts for better extraction accuracy.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "3333 김진료 도수대기",
        r#"{"name":"3333 김진료","treatment":"도수대기"}"#,
    ),
    (
        "2343/주한솔 충격파 대기",
        r#"{"name":"2343/주한솔","treatment":"충격파 대기"}"#,
    ),
    ("김진표 충격파", r#"{"name":"김진표","treatment":"충격파"}"#),
    ("김진표", r#"{"name":"김진표","treatment":"접수/대기"}"#),
];

/// Build a complete prompt with system context and few-shot examples.
pub fn build_full_prompt(raw_text: &str, include_examples: bool) -> String {
    let mut prompt = String::new();

    // System context
    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    // Few-shot examples
    if include_examples {
        for (input, output) in FEW_SHOT_EXAMPLES {
            prompt.push_str("<|user|>\n");
            prompt.push_str(&make_parse_prompt(input));
            prompt.push_str("\n<|end|>\n");
            prompt.push_str("<|assistant|>\n");
            prompt.push_str(output);
            prompt.push_str("\n<|end|>\n");
        }
    }

    // Actual request
    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_parse_prompt(raw_text));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}
