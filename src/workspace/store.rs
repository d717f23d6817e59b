use std::error::Error;
use std::fmt::{Display, Formatter};

use uuid::Uuid;

use super::language::language_for_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(Uuid);

impl FileId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    pub id: FileId,
    pub name: String,
    pub content: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    EmptyName,
}

impl Display for WorkspaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "file name must not be empty"),
        }
    }
}

impl Error for WorkspaceError {}

/// In-memory set of virtual files with a single active file.
///
/// `code` is the shared buffer read by the editor pane. Whenever a file is
/// active the buffer equals that file's content, and `set_code` writes back
/// into it.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    files: Vec<VirtualFile>,
    active: Option<FileId>,
    code: String,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, or replaces content and language of the file with the
    /// same trimmed name. The id of an existing file is kept.
    ///
    /// An empty `language` is inferred from the file extension.
    pub fn add_or_update_file(
        &mut self,
        name: &str,
        content: &str,
        language: &str,
    ) -> Result<FileId, WorkspaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName);
        }

        let language = if language.trim().is_empty() {
            language_for_name(name).to_string()
        } else {
            language.trim().to_string()
        };

        if let Some(existing) = self.files.iter_mut().find(|file| file.name == name) {
            existing.content = content.to_string();
            existing.language = language;
            let id = existing.id;
            if self.active == Some(id) {
                self.code = content.to_string();
            }
            return Ok(id);
        }

        let was_empty = self.files.is_empty() && self.active.is_none();
        let id = FileId::generate();
        self.files.push(VirtualFile {
            id,
            name: name.to_string(),
            content: content.to_string(),
            language,
        });

        if was_empty {
            self.active = Some(id);
            self.code = content.to_string();
        }

        Ok(id)
    }

    pub fn remove_file(&mut self, id: FileId) -> Option<VirtualFile> {
        let index = self.files.iter().position(|file| file.id == id)?;
        let removed = self.files.remove(index);

        if self.active == Some(id) {
            match self.files.first() {
                Some(next) => {
                    self.active = Some(next.id);
                    self.code = next.content.clone();
                }
                None => {
                    self.active = None;
                    self.code.clear();
                }
            }
        }

        Some(removed)
    }

    /// Returns `false` and leaves the selection untouched when `id` is unknown.
    pub fn set_active_file(&mut self, id: FileId) -> bool {
        let Some(file) = self.files.iter().find(|file| file.id == id) else {
            return false;
        };

        self.active = Some(file.id);
        self.code = file.content.clone();
        true
    }

    pub fn set_code(&mut self, new_content: &str) {
        self.code = new_content.to_string();

        let Some(active) = self.active else {
            return;
        };
        if let Some(file) = self.files.iter_mut().find(|file| file.id == active) {
            file.content = new_content.to_string();
        }
    }

    pub fn list_files(&self) -> Vec<VirtualFile> {
        self.files.clone()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn active_id(&self) -> Option<FileId> {
        self.active
    }

    pub fn active_file(&self) -> Option<&VirtualFile> {
        let active = self.active?;
        self.get(active)
    }

    pub fn get(&self, id: FileId) -> Option<&VirtualFile> {
        self.files.iter().find(|file| file.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&VirtualFile> {
        let name = name.trim();
        self.files.iter().find(|file| file.name == name)
    }

    pub fn position_of(&self, id: FileId) -> Option<usize> {
        self.files.iter().position(|file| file.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<FileId> {
        self.files.get(index).map(|file| file.id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
