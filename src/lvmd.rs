//! lvmd configuration for the TopoLVM plugin.
//!
//! The override file lives next to the global system config so operators
//! only have one directory to manage. When it is absent the documented
//! defaults apply; when it is present it must parse.
use crate::error::{InstallError, InstallResult};
use crate::render::plain_scalar_problem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the lvmd override, relative to the global config directory.
pub const LVMD_CONFIG_FILE_NAME: &str = "lvmd.yaml";

pub const DEFAULT_SOCKET_NAME: &str = "/run/lvmd/lvmd.socket";
pub const DEFAULT_DEVICE_CLASS_NAME: &str = "default";
pub const DEFAULT_VOLUME_GROUP: &str = "rhel";
pub const DEFAULT_SPARE_GB: u64 = 10;

/// Effective lvmd settings rendered into the `lvmd` config map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LvmdConfig {
    pub socket_name: String,
    pub device_classes: Vec<DeviceClass>,
}

/// One lvmd device class, mapping a storage class parameter to a volume group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeviceClass {
    pub name: String,
    pub volume_group: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spare_gb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_size: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lvcreate_options: Vec<String>,
}

impl Default for LvmdConfig {
    fn default() -> Self {
        Self {
            socket_name: DEFAULT_SOCKET_NAME.to_string(),
            device_classes: vec![DeviceClass {
                name: DEFAULT_DEVICE_CLASS_NAME.to_string(),
                volume_group: DEFAULT_VOLUME_GROUP.to_string(),
                default: true,
                spare_gb: Some(DEFAULT_SPARE_GB),
                stripe: None,
                stripe_size: None,
                lvcreate_options: Vec::new(),
            }],
        }
    }
}

impl LvmdConfig {
    /// Parse lvmd YAML. Fields missing from the document keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// The device class flagged `default: true`, if exactly one is.
    pub fn default_device_class(&self) -> Option<&DeviceClass> {
        let mut defaults = self.device_classes.iter().filter(|class| class.default);
        match (defaults.next(), defaults.next()) {
            (Some(class), None) => Some(class),
            _ => None,
        }
    }

    /// Check the invariants lvmd itself enforces at startup.
    pub fn validate(&self) -> InstallResult<()> {
        if self.socket_name.trim().is_empty() {
            return Err(InstallError::render(
                LVMD_CONFIG_FILE_NAME,
                "socket-name must be non-empty",
            ));
        }
        // The socket also lands on the node plugin's command line.
        if let Some(problem) = plain_scalar_problem(&self.socket_name) {
            return Err(InstallError::render(
                LVMD_CONFIG_FILE_NAME,
                format!("socket-name {problem}: {:?}", self.socket_name),
            ));
        }
        if self.device_classes.is_empty() {
            return Err(InstallError::render(
                LVMD_CONFIG_FILE_NAME,
                "at least one device class is required",
            ));
        }
        let mut names = BTreeSet::new();
        for class in &self.device_classes {
            if class.name.trim().is_empty() {
                return Err(InstallError::render(
                    LVMD_CONFIG_FILE_NAME,
                    "device class name must be non-empty",
                ));
            }
            if class.volume_group.trim().is_empty() {
                return Err(InstallError::render(
                    LVMD_CONFIG_FILE_NAME,
                    format!("device class {:?} has no volume-group", class.name),
                ));
            }
            if !names.insert(class.name.as_str()) {
                return Err(InstallError::render(
                    LVMD_CONFIG_FILE_NAME,
                    format!("duplicate device class {:?}", class.name),
                ));
            }
        }
        let defaults = self
            .device_classes
            .iter()
            .filter(|class| class.default)
            .count();
        if defaults != 1 {
            return Err(InstallError::render(
                LVMD_CONFIG_FILE_NAME,
                format!("exactly one default device class is required (found {defaults})"),
            ));
        }
        Ok(())
    }
}

/// Which branch produced the effective lvmd config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LvmdResolution {
    FromFile { path: PathBuf, config: LvmdConfig },
    Default { config: LvmdConfig },
}

impl LvmdResolution {
    pub fn config(&self) -> &LvmdConfig {
        match self {
            LvmdResolution::FromFile { config, .. } | LvmdResolution::Default { config } => config,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, LvmdResolution::Default { .. })
    }

    /// Short label for logs and CLI output.
    pub fn source_label(&self) -> String {
        match self {
            LvmdResolution::FromFile { path, .. } => path.display().to_string(),
            LvmdResolution::Default { .. } => "defaults".to_string(),
        }
    }
}

/// Return the lvmd override path for a given global config file.
pub fn lvmd_config_path(global_config_file: &Path) -> PathBuf {
    global_config_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(LVMD_CONFIG_FILE_NAME)
}

/// Resolve the effective lvmd config from `config_dir`.
///
/// Only a "not found" lookup selects the defaults; parse failures and other
/// IO errors are returned as-is.
pub fn resolve_lvmd_config(config_dir: &Path) -> InstallResult<LvmdResolution> {
    let path = config_dir.join(LVMD_CONFIG_FILE_NAME);
    match fs::metadata(&path) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "lvmd override absent, using defaults");
            return Ok(LvmdResolution::Default {
                config: LvmdConfig::default(),
            });
        }
        Err(source) => return Err(InstallError::ConfigIo { path, source }),
    }

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(source) => return Err(InstallError::ConfigIo { path, source }),
    };
    let config = match LvmdConfig::from_yaml(&text) {
        Ok(config) => config,
        Err(source) => return Err(InstallError::ConfigParse { path, source }),
    };
    tracing::debug!(path = %path.display(), "loaded lvmd override");
    Ok(LvmdResolution::FromFile { path, config })
}

#[cfg(test)]
#[path = "lvmd_tests.rs"]
mod tests;
