use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use inquire::Text;
use serde::{Deserialize, Serialize};

use crate::model::BusinessInfo;

const DEFAULT_BUSINESS_TEMPLATE: &str = include_str!("../business.toml");

#[derive(Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub data_root: String,
}

/// Transactional email service identifiers (EmailJS-style API).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EmailConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub api_url: String,
}

/// Issuing business identity and service identifiers. Injected everywhere
/// the documents or emails need them, so the render core carries no
/// hardcoded account details.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BusinessConfig {
    pub business_name: String,
    pub photographer: String,
    pub website: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub default_shoot_location: String,
    pub email_service: EmailConfig,
}

impl BusinessConfig {
    pub fn business_info(&self) -> BusinessInfo {
        BusinessInfo {
            business_name: self.business_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_BUSINESS_TEMPLATE).expect("Failed to parse default business.toml")
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("io", "thesora", "sora-invoice") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings() -> Option<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

pub fn load_business_config(root: &Path) -> BusinessConfig {
    let path = root.join("business.toml");
    if path.exists() {
        let content = fs::read_to_string(&path).expect("Failed to read business.toml");
        toml::from_str(&content).expect("Failed to parse business.toml")
    } else {
        println!("✨ Initializing default business configuration...");
        fs::write(&path, DEFAULT_BUSINESS_TEMPLATE).expect("Failed to write business.toml");
        BusinessConfig::default()
    }
}

pub fn setup_config_wizard() -> AppSettings {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = load_settings();
    let default_val = current
        .map(|s| s.data_root)
        .unwrap_or_else(|| "~/Documents/TheSora".to_string());

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Root Data Directory")
        .pick_folder();

    let new_root = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Enter Root Data Directory:")
            .with_default(&default_val)
            .prompt()
            .unwrap()
    };

    let settings = AppSettings { data_root: new_root };

    let path = get_config_path();
    let toml_str = toml::to_string_pretty(&settings).unwrap();
    fs::write(&path, toml_str).expect("Failed to save settings");
    println!("✅ Settings saved.");
    settings
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with("~") {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen("~", &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_business_config_parses() {
        let config = BusinessConfig::default();
        assert_eq!(config.business_name, "The SORA.IO Photography");
        assert_eq!(config.photographer, "Udaya Vijay Anand");
        assert_eq!(config.default_shoot_location, "Hovde Hall");
        assert!(config.email_service.api_url.starts_with("https://"));
    }

    #[test]
    fn business_info_mirrors_config_identity() {
        let config = BusinessConfig::default();
        let info = config.business_info();
        assert_eq!(info.business_name, config.business_name);
        assert_eq!(info.email, config.email);
    }
}
