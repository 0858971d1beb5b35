use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;
use crate::domain::validation::SignupRules;

/// Configuration for the chat module, read from `modules.chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_max_username_length")]
    pub max_username_length: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            max_username_length: default_max_username_length(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl From<&ChatConfig> for ServiceConfig {
    fn from(cfg: &ChatConfig) -> Self {
        let max_page_size = cfg.max_page_size.max(1);
        Self {
            signup: SignupRules {
                min_password_length: cfg.min_password_length,
                max_username_length: cfg.max_username_length,
                ..SignupRules::default()
            },
            default_page_size: cfg.default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }
}

fn default_min_password_length() -> usize {
    8
}

fn default_max_username_length() -> usize {
    150
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    1000
}
