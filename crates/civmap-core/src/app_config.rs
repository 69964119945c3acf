use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub facilities_path: PathBuf,
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub http_timeout_secs: u64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub marker_min_zoom: u8,
    pub label_min_zoom: u8,
    pub initial_zoom: u8,
    pub focus_zoom: u8,
    pub search_debounce_ms: u64,
    pub viewport_height: f32,
    pub sheet_min_height: f32,
    pub sheet_max_fraction: f32,
    pub sheet_animation_ms: u64,
    pub drag_dead_zone_px: f32,
    pub drag_commit_px: f32,
}

impl AppConfig {
    /// Expanded panel height in pixels.
    #[must_use]
    pub fn sheet_max_height(&self) -> f32 {
        self.viewport_height * self.sheet_max_fraction
    }

    /// A bearer token means the user signed in; write actions are gated on it.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api_token.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("facilities_path", &self.facilities_path)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("marker_min_zoom", &self.marker_min_zoom)
            .field("label_min_zoom", &self.label_min_zoom)
            .field("initial_zoom", &self.initial_zoom)
            .field("focus_zoom", &self.focus_zoom)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("viewport_height", &self.viewport_height)
            .field("sheet_min_height", &self.sheet_min_height)
            .field("sheet_max_fraction", &self.sheet_max_fraction)
            .field("sheet_animation_ms", &self.sheet_animation_ms)
            .field("drag_dead_zone_px", &self.drag_dead_zone_px)
            .field("drag_commit_px", &self.drag_commit_px)
            .finish()
    }
}
