use std::str::FromStr;

use crate::extract::{extract_files, extract_plain_code, mentions_file_marker};
use crate::workspace::{FileId, FileStore};

/// Which file is active after a reply stored one or more files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivationPolicy {
    /// The first file of the reply becomes active.
    #[default]
    FirstExtracted,
    /// Keep the active file when the reply rewrote it, otherwise behave like
    /// `FirstExtracted`.
    PreserveActive,
}

impl FromStr for ActivationPolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "first-extracted" => Ok(Self::FirstExtracted),
            "preserve-active" => Ok(Self::PreserveActive),
            _ => Err(format!("unknown activation policy '{value}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Named files were stored.
    Files { message: String, names: Vec<String> },
    /// No named files; anonymous code replaced the active buffer.
    Code { message: String },
    /// Nothing to extract, the workspace is untouched.
    Nothing { message: String },
}

impl ApplyOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Files { message, .. } | Self::Code { message } | Self::Nothing { message } => {
                message
            }
        }
    }
}

pub fn apply_reply(store: &mut FileStore, reply: &str, policy: ActivationPolicy) -> ApplyOutcome {
    let extracted = extract_files(reply);
    let previous_active = store.active_id();

    let mut stored = Vec::with_capacity(extracted.files.len());
    let mut names: Vec<String> = Vec::with_capacity(extracted.files.len());
    for file in &extracted.files {
        let Ok(id) = store.add_or_update_file(&file.name, &file.content, &file.language) else {
            continue;
        };
        stored.push(id);
        if !names.contains(&file.name) {
            names.push(file.name.clone());
        }
    }

    if !stored.is_empty() {
        match policy {
            ActivationPolicy::FirstExtracted => {
                activate_first_extracted_file(store, &stored);
            }
            ActivationPolicy::PreserveActive => {
                let rewrote_active = previous_active.is_some_and(|id| stored.contains(&id));
                if !rewrote_active {
                    activate_first_extracted_file(store, &stored);
                }
            }
        }

        return ApplyOutcome::Files {
            message: extracted.message,
            names,
        };
    }

    // Announced files that failed to parse never fall back to anonymous code.
    if mentions_file_marker(reply) {
        return ApplyOutcome::Nothing {
            message: extracted.message,
        };
    }

    match extract_plain_code(reply) {
        Some(code) => {
            store.set_code(&code);
            ApplyOutcome::Code {
                message: extracted.message,
            }
        }
        None => ApplyOutcome::Nothing {
            message: extracted.message,
        },
    }
}

pub fn activate_first_extracted_file(store: &mut FileStore, extracted: &[FileId]) -> bool {
    extracted
        .first()
        .is_some_and(|first| store.set_active_file(*first))
}

#[cfg(test)]
mod tests {
    use super::{ActivationPolicy, ApplyOutcome, activate_first_extracted_file, apply_reply};
    use crate::workspace::FileStore;
    use std::str::FromStr;

    const TWO_FILES: &str =
        "Done.\nFILE: a.ts\n```ts\nconst x=1;\n```\nFILE: b.css\n```css\nbody{}\n```";

    #[test]
    fn named_files_are_stored_and_first_is_activated() {
        let mut store = FileStore::new();
        store.add_or_update_file("App.tsx", "app", "").expect("seed");

        let outcome = apply_reply(&mut store, TWO_FILES, ActivationPolicy::FirstExtracted);

        assert_eq!(
            outcome,
            ApplyOutcome::Files {
                message: "Done.".to_string(),
                names: vec!["a.ts".to_string(), "b.css".to_string()],
            }
        );
        assert_eq!(store.len(), 3);
        let active = store.active_file().expect("active");
        assert_eq!(active.name, "a.ts");
        assert_eq!(active.language, "ts");
        assert_eq!(store.code(), "const x=1;");
    }

    #[test]
    fn preserve_active_keeps_rewritten_active_file() {
        let mut store = FileStore::new();
        store.add_or_update_file("a.ts", "old a", "").expect("seed a");
        let b = store.add_or_update_file("b.css", "old b", "").expect("seed b");
        assert!(store.set_active_file(b));

        apply_reply(&mut store, TWO_FILES, ActivationPolicy::PreserveActive);

        assert_eq!(store.active_id(), Some(b));
        assert_eq!(store.code(), "body{}");
    }

    #[test]
    fn preserve_active_falls_back_to_first_extracted() {
        let mut store = FileStore::new();
        store.add_or_update_file("main.ts", "main", "").expect("seed");

        apply_reply(&mut store, TWO_FILES, ActivationPolicy::PreserveActive);

        assert_eq!(store.active_file().expect("active").name, "a.ts");
    }

    #[test]
    fn plain_code_replaces_active_file_content() {
        let mut store = FileStore::new();
        let id = store.add_or_update_file("App.tsx", "old", "").expect("seed");
        let reply = "Here you go:\n\n```js\nconsole.log(1)\n```";

        let outcome = apply_reply(&mut store, reply, ActivationPolicy::default());

        assert_eq!(
            outcome,
            ApplyOutcome::Code {
                message: reply.to_string()
            }
        );
        assert_eq!(store.get(id).expect("file").content, "console.log(1)");
        assert_eq!(store.code(), "console.log(1)");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn prose_only_reply_leaves_store_untouched() {
        let mut store = FileStore::new();
        let id = store.add_or_update_file("App.tsx", "keep", "").expect("seed");

        let outcome = apply_reply(&mut store, "No code today.", ActivationPolicy::default());

        assert_eq!(outcome.message(), "No code today.");
        assert!(matches!(outcome, ApplyOutcome::Nothing { .. }));
        assert_eq!(store.get(id).expect("file").content, "keep");
        assert_eq!(store.code(), "keep");
    }

    #[test]
    fn unparsed_announcement_leaves_active_file_alone() {
        let mut store = FileStore::new();
        let id = store.add_or_update_file("App.tsx", "app", "").expect("seed");

        let outcome = apply_reply(
            &mut store,
            "Styles:\nFILE: b.css\n````css\nbody{}\n````",
            ActivationPolicy::default(),
        );

        assert_eq!(
            outcome,
            ApplyOutcome::Nothing {
                message: "Styles:".to_string(),
            }
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).expect("file").content, "app");
        assert_eq!(store.code(), "app");
    }

    #[test]
    fn spaced_fence_tag_still_creates_announced_file() {
        let mut store = FileStore::new();
        store.add_or_update_file("App.tsx", "app", "").expect("seed");

        let outcome = apply_reply(
            &mut store,
            "Styles:\nFILE: b.css\n``` css\nbody{}\n```",
            ActivationPolicy::default(),
        );

        assert!(matches!(outcome, ApplyOutcome::Files { names, .. } if names == ["b.css"]));
        assert_eq!(store.find_by_name("App.tsx").expect("app").content, "app");
        let css = store.find_by_name("b.css").expect("css");
        assert_eq!(css.content, "body{}");
        assert_eq!(css.language, "css");
    }

    #[test]
    fn repeated_name_in_one_reply_keeps_last_content() {
        let mut store = FileStore::new();
        let reply = "FILE: a.ts\n```ts\none\n```\nFILE: a.ts\n```ts\ntwo\n```";

        let outcome = apply_reply(&mut store, reply, ActivationPolicy::default());

        assert_eq!(store.len(), 1);
        assert_eq!(store.code(), "two");
        assert!(matches!(outcome, ApplyOutcome::Files { names, .. } if names == ["a.ts"]));
    }

    #[test]
    fn activate_first_extracted_file_on_empty_list_is_false() {
        let mut store = FileStore::new();
        assert!(!activate_first_extracted_file(&mut store, &[]));
    }

    #[test]
    fn activation_policy_parses_config_names() {
        assert_eq!(
            ActivationPolicy::from_str("first-extracted"),
            Ok(ActivationPolicy::FirstExtracted)
        );
        assert_eq!(
            ActivationPolicy::from_str("preserve-active"),
            Ok(ActivationPolicy::PreserveActive)
        );
        assert_eq!(
            ActivationPolicy::from_str("newest"),
            Err("unknown activation policy 'newest'".to_string())
        );
    }
}
