//! # Banner Config Files
//!
//! Banners are defined in external TOML files loaded once at startup.
//! One file defines any number of banners as an array of tables:
//!
//! ```toml
//! [[banner]]
//! id = "launch"
//! pull_cost = 1000
//! refund_bp = 5000
//! draw_mode = "legacy"        # optional, defaults to "legacy"
//! funds_policy = "allow_debt" # optional, defaults to "allow_debt"
//!
//! [banner.weights]
//! common = 10
//! rare = 5
//!
//! [[banner.pool]]
//! id = "plain_cap"
//! rarity = "common"
//!
//! [[banner.pool]]
//! id = "fox_mask"
//! rarity = "rare"
//! ```
//!
//! Parsing stops at shape errors; semantic validation (positive cost,
//! weighted tiers, unique pool ids) happens in [`Banner::from_config`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::banner::{Banner, BannerConfig};
use crate::error::{GachaError, GachaResult};

/// Top-level shape of a banner config file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BannerFile {
    /// The banners defined in this file.
    #[serde(default)]
    banner: Vec<BannerConfig>,
}

/// Parses banner config records from TOML text.
///
/// # Errors
///
/// Returns `GachaError::InvalidConfig` if the text is not valid TOML or
/// does not match the expected shape.
pub fn parse_banner_configs(text: &str) -> GachaResult<Vec<BannerConfig>> {
    let file: BannerFile = toml::from_str(text)
        .map_err(|e| GachaError::InvalidConfig(format!("banner config parse failed: {e}")))?;
    Ok(file.banner)
}

/// Renders banner config records as TOML text.
///
/// # Errors
///
/// Returns `GachaError::InvalidConfig` if serialization fails.
pub fn render_banner_configs(configs: &[BannerConfig]) -> GachaResult<String> {
    let file = BannerFile {
        banner: configs.to_vec(),
    };
    toml::to_string_pretty(&file)
        .map_err(|e| GachaError::InvalidConfig(format!("banner config render failed: {e}")))
}

/// Loads banner config records from a TOML file.
///
/// # Errors
///
/// Returns `GachaError::InvalidConfig` naming the path if the file cannot
/// be read, plus everything [`parse_banner_configs`] can return.
pub fn load_banner_configs(path: impl AsRef<Path>) -> GachaResult<Vec<BannerConfig>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        GachaError::InvalidConfig(format!("cannot read banner config {}: {e}", path.display()))
    })?;
    parse_banner_configs(&text)
}

/// Builds validated banners from every record in a TOML file.
///
/// # Errors
///
/// Returns the first load, parse or validation error.
pub fn load_banners(path: impl AsRef<Path>) -> GachaResult<Vec<Banner>> {
    load_banner_configs(path)?
        .iter()
        .map(Banner::from_config)
        .collect()
}
