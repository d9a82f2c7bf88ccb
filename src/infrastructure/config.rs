use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ClonerConfig {
    pub superset: SupersetSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub clone: CloneSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SupersetSettings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl SupersetSettings {
    /// REST root, always ending in a slash
    pub fn api_root(&self) -> String {
        format!("{}/api/v1/", self.endpoint.trim().trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloneSettings {
    #[serde(default = "default_dataset_page_size")]
    pub dataset_page_size: u32,
    #[serde(default = "default_dashboard_page_size")]
    pub dashboard_page_size: u32,
    #[serde(default = "default_title_suffix_len")]
    pub title_suffix_len: usize,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            dataset_page_size: default_dataset_page_size(),
            dashboard_page_size: default_dashboard_page_size(),
            title_suffix_len: default_title_suffix_len(),
        }
    }
}

fn default_provider() -> String {
    "db".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_dataset_page_size() -> u32 {
    1000
}

fn default_dashboard_page_size() -> u32 {
    100
}

fn default_title_suffix_len() -> usize {
    5
}

/// `config/cloner.*` if present, overridden by `CLONER_*` variables
/// (`CLONER_SUPERSET__ENDPOINT`, `CLONER_CLONE__DATASET_PAGE_SIZE`, ...)
pub fn load_cloner_config() -> anyhow::Result<ClonerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/cloner").required(false))
        .add_source(
            config::Environment::with_prefix("CLONER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
