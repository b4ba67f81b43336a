//! services/chat_ui/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the page and fragment routes. The output
//! goes to `openapi.json` unless a path is given as the first argument.

use chat_ui_lib::error::UiError;
use chat_ui_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), UiError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let api = ApiDoc::openapi();
    let document = api
        .to_pretty_json()
        .map_err(|e| UiError::Internal(format!("Failed to serialize the API document: {}", e)))?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, document)?;
    println!(
        "✅ Wrote {} route(s) to {}",
        api.paths.paths.len(),
        path.display()
    );
    Ok(())
}
