use serde::{Deserialize, Serialize};

/// Default accent color applied on first run.
const DEFAULT_ACCENT: &str = "#3B82F6";

/// Singleton business profile and display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, alias = "bizName")]
    pub business_name: String,
    #[serde(default, alias = "owner")]
    pub owner_name: String,
    #[serde(default, alias = "ownerPhone")]
    pub owner_phone: String,
    /// Accent color as a hex string.
    #[serde(default = "default_accent")]
    pub accent: String,
    /// Theme mode, "dark" or "light".
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Logo image as a data URL.
    #[serde(default, alias = "logoData")]
    pub logo_data: Option<String>,
}

fn default_accent() -> String {
    DEFAULT_ACCENT.to_string()
}

fn default_mode() -> String {
    "dark".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            business_name: "My Estate Desk".to_string(),
            owner_name: String::new(),
            owner_phone: String::new(),
            accent: default_accent(),
            mode: default_mode(),
            logo_data: None,
        }
    }
}

/// Partial profile used for merge-on-save and backup import; unsupplied
/// fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, alias = "bizName")]
    pub business_name: Option<String>,
    #[serde(default, alias = "owner")]
    pub owner_name: Option<String>,
    #[serde(default, alias = "ownerPhone")]
    pub owner_phone: Option<String>,
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, alias = "logoData")]
    pub logo_data: Option<String>,
}

impl Profile {
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(v) = patch.business_name {
            self.business_name = v;
        }
        if let Some(v) = patch.owner_name {
            self.owner_name = v;
        }
        if let Some(v) = patch.owner_phone {
            self.owner_phone = v;
        }
        if let Some(v) = patch.accent {
            self.accent = v;
        }
        if let Some(v) = patch.mode {
            self.mode = v;
        }
        if let Some(v) = patch.logo_data {
            self.logo_data = Some(v);
        }
    }
}
