use crate::config::BuildOptions;
use crate::dataset::FullDataset;
use crate::error::RateCardError;
use crate::error::ResultMessage;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Marker in the page template replaced by the dataset JSON.
pub const PLACEHOLDER: &str = "__BUILD_DATA__";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template '{0}' has no __BUILD_DATA__ placeholder")]
    MissingPlaceholder(String),
}

/// Compact JSON of the dataset. Non-ASCII text is written as is.
pub fn to_json(dataset: &FullDataset) -> Result<String, RateCardError> {
    Ok(serde_json::to_string(dataset)?)
}

/// Replaces every placeholder in `template` with `json`.
pub fn inject(template: &str, template_name: &str, json: &str) -> Result<String, RateCardError> {
    if !template.contains(PLACEHOLDER) {
        Err(RenderError::MissingPlaceholder(template_name.to_owned()))?
    }
    Ok(template.replace(PLACEHOLDER, json))
}

/// Writes the page, or the bare dataset in JSON-only mode, and returns its path.
pub fn write_output(dataset: &FullDataset, options: &BuildOptions) -> Result<PathBuf, RateCardError> {
    let json = to_json(dataset)?;
    let content = if options.json_only {
        json
    } else {
        let template_name = options.template.display().to_string();
        let template = fs::read_to_string(&options.template)
            .map_err(RateCardError::from)
            .with_prefix(&template_name)?;
        inject(&template, &template_name, &json)?
    };

    fs::create_dir_all(&options.output_dir)
        .map_err(RateCardError::from)
        .with_prefix(&options.output_dir.display().to_string())?;
    let path = options.output_file();
    fs::write(&path, content.as_bytes())
        .map_err(RateCardError::from)
        .with_prefix(&path.display().to_string())?;
    info!(path = %path.display(), bytes = content.len(), "output written");
    Ok(path)
}
