use std::path::PathBuf;

/// Name of the page written into the output directory.
pub const PAGE_FILE: &str = "index.html";
/// Name of the raw dataset written instead of the page in JSON-only mode.
pub const DATA_FILE: &str = "data.json";

/// Inputs, outputs and switches of one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Directory holding `T0.xlsx` … `T3.xlsx`
    pub data_dir: PathBuf,
    /// Page template carrying the data placeholder
    pub template: PathBuf,
    pub output_dir: PathBuf,
    /// Extract tiers on separate threads
    pub parallel: bool,
    /// Write the bare dataset instead of the rendered page
    pub json_only: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            data_dir: PathBuf::from("data"),
            template: PathBuf::from("template.html"),
            output_dir: PathBuf::from("public"),
            parallel: true,
            json_only: false,
        }
    }
}

impl BuildOptions {
    /// File the build writes: the page, or the dataset in JSON-only mode.
    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(if self.json_only { DATA_FILE } else { PAGE_FILE })
    }
}
