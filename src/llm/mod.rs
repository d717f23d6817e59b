pub mod gemini;
pub mod provider;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that helps users write code. Focus on providing clean, working solutions.";

/// Appended to every system prompt so replies can be split into files.
pub const FILE_FORMAT_INSTRUCTIONS: &str = r#"When you create or change files, announce each one on its own line as `FILE: <path>` immediately followed by a fenced code block with the complete file content, for example:

FILE: Button.tsx
```tsx
export const Button = () => <button>Click</button>;
```

Put any explanation before the first FILE: line. Never nest triple backticks inside a file body."#;

pub fn system_instruction(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        FILE_FORMAT_INSTRUCTIONS.to_string()
    } else {
        format!("{prompt}\n\n{FILE_FORMAT_INSTRUCTIONS}")
    }
}
