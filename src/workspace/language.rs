/// Maps a file name to the display language tag used by the editor and the
/// file list. Unknown or missing extensions map to the empty string.
pub fn language_for_name(name: &str) -> &'static str {
    let Some((_, extension)) = name.trim().rsplit_once('.') else {
        return "";
    };

    match extension.to_ascii_lowercase().as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "jsx" | "tsx" => "tsx",
        "css" => "css",
        "html" => "html",
        "json" => "json",
        "md" => "markdown",
        _ => "",
    }
}
