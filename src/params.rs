//! Template parameters derived from configuration.
//!
//! Both builders are pure: the same inputs always produce the same map, and
//! the map is ordered so rendered output is byte-stable.
use crate::config::SystemConfig;
use crate::error::{InstallError, InstallResult};
use crate::lvmd::{LvmdConfig, LVMD_CONFIG_FILE_NAME};
use std::collections::BTreeMap;

/// Flat template variable name to value mapping.
pub type RenderParams = BTreeMap<String, String>;

/// Prefix for per-image keys, so templates can say `{{ .ReleaseImage.name }}`.
pub const RELEASE_IMAGE_PREFIX: &str = "ReleaseImage.";

/// Build the lvmd parameters used by the config map and node daemon set.
pub fn build_lvmd_params(config: &LvmdConfig) -> InstallResult<RenderParams> {
    config.validate()?;
    let lvmd = serde_yaml::to_string(config)
        .map_err(|err| InstallError::render(LVMD_CONFIG_FILE_NAME, err.to_string()))?;

    let mut params = RenderParams::new();
    params.insert("lvmd".to_string(), lvmd.trim_end().to_string());
    params.insert("SocketName".to_string(), config.socket_name.clone());
    Ok(params)
}

/// Combine cluster-wide settings with optional component parameters.
///
/// Component keys win when both define the same name.
pub fn params_from_config(system: &SystemConfig, extra: Option<&RenderParams>) -> RenderParams {
    let mut params = RenderParams::new();
    params.insert("NodeName".to_string(), system.node_name.clone());
    params.insert("NodeIP".to_string(), system.node_ip.clone());
    params.insert("ClusterCIDR".to_string(), system.cluster_cidr.clone());
    params.insert("ServiceCIDR".to_string(), system.service_cidr.clone());
    params.insert("BaseDomain".to_string(), system.base_domain.clone());
    for (name, image) in &system.release_images {
        params.insert(format!("{RELEASE_IMAGE_PREFIX}{name}"), image.clone());
    }
    if let Some(extra) = extra {
        for (key, value) in extra {
            params.insert(key.clone(), value.clone());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lvmd::DEFAULT_SOCKET_NAME;

    #[test]
    fn lvmd_params_are_deterministic() {
        let config = LvmdConfig::default();
        let first = build_lvmd_params(&config).expect("build params");
        let second = build_lvmd_params(&config).expect("build params");
        assert_eq!(first, second);
        assert_eq!(first["SocketName"], DEFAULT_SOCKET_NAME);
        assert!(first["lvmd"].contains("volume-group: rhel"));
        assert!(first["lvmd"].starts_with("socket-name:"));
    }

    #[test]
    fn lvmd_params_round_trip_through_yaml() {
        let config = LvmdConfig::default();
        let params = build_lvmd_params(&config).expect("build params");
        let parsed = LvmdConfig::from_yaml(&params["lvmd"]).expect("parse rendered lvmd");
        assert_eq!(parsed, config);
    }

    #[test]
    fn inconsistent_lvmd_config_is_a_render_error() {
        let mut config = LvmdConfig::default();
        config.socket_name = "  ".to_string();
        let err = build_lvmd_params(&config).expect_err("empty socket");
        assert!(matches!(err, InstallError::Render { .. }));
    }

    #[test]
    fn system_params_include_images_and_accept_missing_component_set() {
        let system = SystemConfig::default();
        let params = params_from_config(&system, None);
        assert_eq!(params["ClusterCIDR"], system.cluster_cidr);
        assert_eq!(
            params["ReleaseImage.topolvm_csi"],
            system.release_images["topolvm_csi"]
        );
        assert!(!params.contains_key("SocketName"));
        assert_eq!(params, params_from_config(&system, None));
    }

    #[test]
    fn component_params_override_system_params() {
        let system = SystemConfig::default();
        let mut extra = RenderParams::new();
        extra.insert("NodeName".to_string(), "override".to_string());
        extra.insert("SocketName".to_string(), "/run/x.sock".to_string());
        let params = params_from_config(&system, Some(&extra));
        assert_eq!(params["NodeName"], "override");
        assert_eq!(params["SocketName"], "/run/x.sock");
        assert_eq!(params["BaseDomain"], system.base_domain);
    }
}
