//! Extraction of named files from assistant replies.
//!
//! A reply announces a file with a `FILE: <name>` line followed by a fenced
//! code block. Bodies end at the first closing fence, so a file whose content
//! itself contains three backticks is cut short at that point.

use std::sync::LazyLock;

use regex::Regex;

use crate::workspace::language_for_name;

const FILE_MARKER: &str = "FILE:";

static FILE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)FILE:[^\S\n]*([^\n]*)\s*```[^\S\n]*([\w+#.-]*)[^\S\n]*\n(.*?)```")
        .expect("file block pattern")
});

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[\w+#.-]*[^\S\n]*\n)?(.*?)```").expect("fenced block pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileBlock {
    pub name: String,
    pub language: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReply {
    pub files: Vec<ParsedFileBlock>,
    /// Prose preceding the first `FILE:` marker.
    pub message: String,
}

pub fn extract_files(text: &str) -> ExtractedReply {
    let Some(marker_at) = text.find(FILE_MARKER) else {
        return ExtractedReply {
            files: Vec::new(),
            message: text.trim().to_string(),
        };
    };

    let files = FILE_BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            if name.is_empty() {
                return None;
            }
            let tag = caps.get(2).map_or("", |m| m.as_str());
            let language = if tag.is_empty() {
                language_for_name(name)
            } else {
                tag
            };
            let content = caps.get(3).map_or("", |m| m.as_str()).trim();

            Some(ParsedFileBlock {
                name: name.to_string(),
                language: language.to_string(),
                content: content.to_string(),
            })
        })
        .collect();

    ExtractedReply {
        files,
        message: text[..marker_at].trim().to_string(),
    }
}

/// True when `text` uses the `FILE:` convention at all, whether or not any
/// announcement parsed.
pub fn mentions_file_marker(text: &str) -> bool {
    text.contains(FILE_MARKER)
}

/// Joins the bodies of every fenced block with a blank line. `None` when the
/// text has no fenced block at all.
pub fn extract_plain_code(text: &str) -> Option<String> {
    let bodies = FENCED_BLOCK
        .captures_iter(text)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()).trim().to_string())
        .collect::<Vec<_>>();

    if bodies.is_empty() {
        return None;
    }

    Some(bodies.join("\n\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::{ParsedFileBlock, extract_files, extract_plain_code, mentions_file_marker};

    fn block(name: &str, language: &str, content: &str) -> ParsedFileBlock {
        ParsedFileBlock {
            name: name.to_string(),
            language: language.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn extracts_two_announced_files_in_order() {
        let reply = extract_files(
            "FILE: a.ts\n```ts\nconst x=1;\n```\nFILE: b.css\n```css\nbody{}\n```",
        );

        assert_eq!(
            reply.files,
            vec![block("a.ts", "ts", "const x=1;"), block("b.css", "css", "body{}")]
        );
        assert_eq!(reply.message, "");
    }

    #[test]
    fn message_is_prose_before_first_marker() {
        let reply = extract_files(
            "Here is the button.\n\nFILE: Button.tsx\n```tsx\nexport const Button = () => null;\n```\nEnjoy!",
        );

        assert_eq!(reply.message, "Here is the button.");
        assert_eq!(reply.files.len(), 1);
        assert_eq!(reply.files[0].name, "Button.tsx");
    }

    #[test]
    fn language_falls_back_to_extension_table() {
        let reply = extract_files(
            "FILE: index.js\n```\nrun();\n```\nFILE: README.md\n```\n# Title\n```\nFILE: main.rs\n```\nfn main() {}\n```",
        );

        let languages = reply
            .files
            .iter()
            .map(|file| file.language.as_str())
            .collect::<Vec<_>>();
        assert_eq!(languages, ["javascript", "markdown", ""]);
    }

    #[test]
    fn blank_lines_between_marker_and_fence_are_ignored() {
        let reply = extract_files("FILE:   styles.css  \n\n\n```css\n  a { color: red; }  \n```");

        assert_eq!(reply.files, vec![block("styles.css", "css", "a { color: red; }")]);
    }

    #[test]
    fn windows_line_endings_are_tolerated() {
        let reply = extract_files("FILE: a.json\r\n```json\r\n{\"a\": 1}\r\n```");

        assert_eq!(reply.files, vec![block("a.json", "json", "{\"a\": 1}")]);
    }

    #[test]
    fn no_marker_keeps_whole_reply_as_message() {
        let text = "Here you go:\n\n```js\nconsole.log(1)\n```";
        let reply = extract_files(text);

        assert!(reply.files.is_empty());
        assert_eq!(reply.message, text);
        assert_eq!(extract_plain_code(text).as_deref(), Some("console.log(1)"));
    }

    #[test]
    fn text_without_fences_extracts_nothing() {
        let text = "  Just some advice, no code.  ";
        let reply = extract_files(text);

        assert!(reply.files.is_empty());
        assert_eq!(reply.message, "Just some advice, no code.");
        assert_eq!(extract_plain_code(text), None);
    }

    #[test]
    fn marker_without_fence_yields_no_files() {
        let reply = extract_files("Intro\nFILE: a.ts\nno code here");

        assert!(reply.files.is_empty());
        assert_eq!(reply.message, "Intro");
    }

    #[test]
    fn space_between_fence_and_tag_is_accepted() {
        let reply = extract_files("Styles:\nFILE: b.css\n``` css\nbody{}\n```");

        assert_eq!(reply.files, vec![block("b.css", "css", "body{}")]);
        assert_eq!(reply.message, "Styles:");
    }

    #[test]
    fn unmatched_announcement_next_to_other_fences_yields_no_files() {
        let text = "Here:\nFILE: a.ts\n````ts\nconst a = 1;\n````\n```\nnote\n```";
        let reply = extract_files(text);

        assert!(reply.files.is_empty());
        assert_eq!(reply.message, "Here:");
        assert!(mentions_file_marker(text));
        assert!(extract_plain_code(text).is_some());
    }

    #[test]
    fn unterminated_fence_is_excluded() {
        let reply = extract_files("FILE: a.ts\n```ts\nconst a = 1;\nFILE: b.ts\n```ts\nconst b = 2;\n```");

        // The first fence runs until the first closing delimiter, which belongs
        // to the second announcement.
        assert_eq!(reply.files.len(), 1);
        assert_eq!(reply.files[0].name, "a.ts");
        assert!(reply.files[0].content.starts_with("const a = 1;"));
    }

    #[test]
    fn nested_fence_truncates_file_body() {
        let reply = extract_files(
            "FILE: README.md\n```md\nUsage:\n```sh\nrun\n```\n```",
        );

        assert_eq!(reply.files.len(), 1);
        assert_eq!(reply.files[0].content, "Usage:");
    }

    #[test]
    fn empty_announced_name_is_skipped() {
        let reply = extract_files("FILE:\n```ts\nx\n```\nFILE: ok.ts\n```ts\ny\n```");

        assert_eq!(reply.files, vec![block("ok.ts", "ts", "y")]);
    }

    #[test]
    fn plain_code_joins_all_blocks_with_blank_line() {
        let text = "First:\n```tsx\n<A />\n```\nthen\n```\n<B />\n```\nand ```inline```";

        assert_eq!(
            extract_plain_code(text).as_deref(),
            Some("<A />\n\n<B />\n\ninline")
        );
    }

    #[test]
    fn plain_code_ignores_unterminated_fence() {
        assert_eq!(extract_plain_code("```js\nconsole.log(1)"), None);
    }
}
