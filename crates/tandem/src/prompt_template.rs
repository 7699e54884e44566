use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Error as TeraError, Tera};

/// Where the bundled prompt templates live
fn prompts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/prompts")
}

/// Render a template string against any serializable context.
///
/// Rendering fails if the template references a variable the context
/// does not provide.
pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let context = Context::from_serialize(context_data)?;
    Tera::one_off(template, &context, false)
}

pub fn load_prompt_file<T: Serialize>(
    template_file: impl Into<PathBuf>,
    context_data: &T,
) -> Result<String, TeraError> {
    // Bare names resolve against the bundled prompts directory
    let mut path = template_file.into();
    if !path.exists() {
        path = prompts_dir().join(path);
    }

    let template = fs::read_to_string(&path)
        .map_err(|e| TeraError::chain("Could not read template file", e))?;
    load_prompt(&template, context_data)
}
