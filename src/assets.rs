//! Manifest bodies embedded at compile time.
//!
//! Identifiers are paths relative to `assets/`, which keeps them stable in
//! logs and error messages regardless of where the binary runs.
use crate::error::{InstallError, InstallResult};

macro_rules! manifest {
    ($id:literal) => {
        (
            $id,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $id)),
        )
    };
}

const MANIFESTS: &[(&str, &str)] = &[
    manifest!("components/lvms/topolvm-openshift-storage_namespace.yaml"),
    manifest!("components/lvms/topolvm-node_v1_serviceaccount.yaml"),
    manifest!("components/lvms/topolvm-controller_v1_serviceaccount.yaml"),
    manifest!("components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_role.yaml"),
    manifest!("components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_role.yaml"),
    manifest!("components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_role.yaml"),
    manifest!("components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_rolebinding.yaml"),
    manifest!(
        "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_rolebinding.yaml"
    ),
    manifest!("components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_rolebinding.yaml"),
    manifest!(
        "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_clusterrole.yaml"
    ),
    manifest!("components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_clusterrole.yaml"),
    manifest!("components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_clusterrole.yaml"),
    manifest!("components/lvms/topolvm-node-scc_rbac.authorization.k8s.io_v1_clusterrole.yaml"),
    manifest!("components/lvms/topolvm-node_rbac.authorization.k8s.io_v1_clusterrole.yaml"),
    manifest!(
        "components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml"
    ),
    manifest!(
        "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml"
    ),
    manifest!(
        "components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml"
    ),
    manifest!(
        "components/lvms/topolvm-node-scc_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml"
    ),
    manifest!("components/lvms/topolvm-node_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml"),
    manifest!("components/lvms/csi-driver.yaml"),
    manifest!("components/lvms/topolvm_default-storage-class.yaml"),
    manifest!("components/lvms/topolvm-lvmd-config_configmap_v1.yaml"),
    manifest!("components/lvms/topolvm-controller_deployment.yaml"),
    manifest!("components/lvms/topolvm-node_daemonset.yaml"),
    manifest!("components/lvms/topolvm-node-securitycontextconstraint.yaml"),
];

/// Look up the raw body of an embedded manifest.
pub fn manifest_body(id: &str) -> InstallResult<&'static str> {
    MANIFESTS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, body)| *body)
        .ok_or_else(|| InstallError::UnknownManifest { id: id.to_string() })
}

/// Every embedded manifest identifier, in table order.
#[cfg(test)]
pub fn manifest_ids() -> impl Iterator<Item = &'static str> {
    MANIFESTS.iter().map(|(id, _)| *id)
}
