use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use eyre::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::table::PaginationMode;

pub static PROJECT_DIR: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("org", "gridview", "gridview"));
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

/// Options of one grid widget.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GridConfig {
    pub show_filter: bool,
    pub show_row_filters: bool,
    pub show_download: bool,
    pub hide_result_count: bool,
    pub page_size: usize,
    /// Query state key of the global filter text. The row filter is stored
    /// under the same key with a `_row` suffix.
    pub filter_param: String,
    pub pagination: PaginationMode,
    /// Total number of records the host can deliver, if known.
    #[serde(default)]
    pub expected_total: Option<usize>,
    /// Language tag of the string table. `None` uses the system locale.
    #[serde(default)]
    pub lang: Option<String>,
    pub default_column_width: f32,
    pub row_height: f32,
    pub expansion_height: f32,
    pub dense_rows: bool,
}

impl GridConfig {
    /// Loads the configuration from the embedded defaults, the user's
    /// `config.toml` and `GRIDVIEW_*` environment variables, in that order.
    pub fn new(force_default_config: bool) -> Result<Self> {
        let mut config =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if !force_default_config {
            if let Some(proj_dirs) = &*PROJECT_DIR {
                let config_file = proj_dirs.config_dir().join(CONFIG_FILE);
                config = config.add_source(File::from(config_file).required(false));
            }
            config = config.add_source(Environment::with_prefix("gridview").try_parsing(true));
        }

        config
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to parse config {e}"))
    }

    pub fn new_from_toml(config: &str) -> Result<Self> {
        Ok(toml::from_str(config)?)
    }

    /// Key the row filter is persisted under.
    #[must_use]
    pub fn row_filter_param(&self) -> String {
        format!("{}_row", self.filter_param)
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationMode) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new_from_toml(DEFAULT_CONFIG).expect("Failed to load default config")
    }
}
