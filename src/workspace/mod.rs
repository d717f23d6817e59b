mod language;
mod store;

pub use language::language_for_name;
pub use store::{FileId, FileStore, VirtualFile, WorkspaceError};

pub const STARTER_FILE_NAME: &str = "App.tsx";

pub const STARTER_COMPONENT: &str = r#"import React from 'react';

const MyComponent = () => {
  return (
    <div className="p-6 max-w-md mx-auto bg-gray-900 text-white rounded-xl shadow-md">
      <div className="text-xl font-medium">Create UI with Code</div>
      <p className="text-gray-400">Write code and ask the assistant for changes</p>
      <button className="mt-3 px-4 py-1 text-sm rounded-full border border-white">
        Learn more
      </button>
    </div>
  );
};

export default MyComponent;
"#;

/// Builds the workspace shown on startup: the starter component, or nothing.
pub fn starter_workspace(empty: bool) -> Result<FileStore, WorkspaceError> {
    let mut store = FileStore::new();
    if !empty {
        store.add_or_update_file(STARTER_FILE_NAME, STARTER_COMPONENT, "")?;
    }
    Ok(store)
}
