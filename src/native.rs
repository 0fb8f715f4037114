use napi_derive::napi;

use crate::compiler::Compiler;
use crate::config::CompilerConfig;

/// Compile one page source and return `{ page, model, errors }` as JSON
#[napi]
pub fn compile_page_native(
    source: String,
    file_path: String,
    config_json: Option<String>,
) -> napi::Result<serde_json::Value> {
    let config = match config_json {
        Some(json) => CompilerConfig::from_json(&json)
            .map_err(|e| napi::Error::from_reason(format!("Config error: {}", e)))?,
        None => CompilerConfig::default(),
    };

    let output = Compiler::new(config).compile_source(&file_path, &source);
    serde_json::to_value(&output)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

/// Page files under `dir`, sorted
#[napi]
pub fn discover_pages_native(dir: String) -> Vec<String> {
    crate::batch::discover_pages(std::path::Path::new(&dir), &CompilerConfig::default())
        .into_iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect()
}
