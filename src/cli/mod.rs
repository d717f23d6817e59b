mod app;
mod args;
mod commands;
mod editor;
mod repl;
pub(crate) mod theme;
mod timeline;
mod view;

pub use app::AppState;
pub use args::CliArgs;
pub use repl::run_repl;
