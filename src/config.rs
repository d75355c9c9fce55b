//! Global system configuration.
//!
//! Only the handful of cluster-wide settings the storage manifests consume
//! are modelled here. A missing `config.yaml` is not an error: the node runs
//! with built-in defaults, and the lvmd override is looked up in the same
//! directory either way.
use crate::error::{InstallError, InstallResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Default location of the global system config.
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = "/etc/microshift/config.yaml";

pub const DEFAULT_CLUSTER_CIDR: &str = "10.42.0.0/16";
pub const DEFAULT_SERVICE_CIDR: &str = "10.43.0.0/16";
pub const DEFAULT_BASE_DOMAIN: &str = "example.com";
pub const DEFAULT_NODE_IP: &str = "127.0.0.1";

const RELEASE_IMAGES: &[(&str, &str)] = &[
    ("topolvm_csi", "quay.io/topolvm/topolvm:0.21.0"),
    (
        "topolvm_csi_provisioner",
        "registry.k8s.io/sig-storage/csi-provisioner:v3.6.0",
    ),
    (
        "topolvm_csi_resizer",
        "registry.k8s.io/sig-storage/csi-resizer:v1.9.0",
    ),
    (
        "topolvm_csi_registrar",
        "registry.k8s.io/sig-storage/csi-node-driver-registrar:v2.9.0",
    ),
    (
        "topolvm_csi_livenessprobe",
        "registry.k8s.io/sig-storage/livenessprobe:v2.11.0",
    ),
];

/// Cluster-wide settings shared by every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SystemConfig {
    pub node_name: String,
    pub node_ip: String,
    pub cluster_cidr: String,
    pub service_cidr: String,
    pub base_domain: String,
    /// Image references keyed by component image name. Entries in the file
    /// are merged over the built-in table.
    pub release_images: BTreeMap<String, String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            node_ip: DEFAULT_NODE_IP.to_string(),
            cluster_cidr: DEFAULT_CLUSTER_CIDR.to_string(),
            service_cidr: DEFAULT_SERVICE_CIDR.to_string(),
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            release_images: default_release_images(),
        }
    }
}

fn default_node_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Built-in image table for the storage plugin.
pub fn default_release_images() -> BTreeMap<String, String> {
    RELEASE_IMAGES
        .iter()
        .map(|(name, image)| (name.to_string(), image.to_string()))
        .collect()
}

impl SystemConfig {
    /// Load `config.yaml`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> InstallResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "system config absent, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(InstallError::SystemConfig {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })
            }
        };
        Self::from_yaml(&text).map_err(|err| InstallError::SystemConfig {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Parse a config document, keeping defaults for missing fields.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: SystemConfig = serde_yaml::from_str(text)?;
        let mut images = default_release_images();
        images.append(&mut config.release_images);
        config.release_images = images;
        Ok(config)
    }
}
