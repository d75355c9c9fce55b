//! The fixed, ordered stage table for the TopoLVM plugin.
//!
//! Order matters: objects that others reference come first (namespace,
//! service accounts, RBAC), config data precedes the workloads that mount it,
//! and workloads go last.
use serde::Serialize;
use std::fmt;

/// Resource kind a stage applies; selects the apply operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Namespace,
    ServiceAccount,
    Role,
    RoleBinding,
    ClusterRole,
    ClusterRoleBinding,
    CsiDriver,
    StorageClass,
    ConfigMap,
    Deployment,
    DaemonSet,
    SecurityContextConstraints,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespace",
            ResourceKind::ServiceAccount => "service-account",
            ResourceKind::Role => "role",
            ResourceKind::RoleBinding => "role-binding",
            ResourceKind::ClusterRole => "cluster-role",
            ResourceKind::ClusterRoleBinding => "cluster-role-binding",
            ResourceKind::CsiDriver => "csi-driver",
            ResourceKind::StorageClass => "storage-class",
            ResourceKind::ConfigMap => "config-map",
            ResourceKind::Deployment => "deployment",
            ResourceKind::DaemonSet => "daemon-set",
            ResourceKind::SecurityContextConstraints => "security-context-constraints",
        }
    }

    /// Whether objects of this kind live inside a namespace.
    pub fn is_namespaced(self) -> bool {
        matches!(
            self,
            ResourceKind::ServiceAccount
                | ResourceKind::Role
                | ResourceKind::RoleBinding
                | ResourceKind::ConfigMap
                | ResourceKind::Deployment
                | ResourceKind::DaemonSet
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which parameter set, if any, a stage is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderInputs {
    /// Applied verbatim.
    None,
    /// lvmd parameters only.
    Component,
    /// Cluster-wide parameters only.
    System,
    /// Cluster-wide parameters overlaid with lvmd parameters.
    SystemWithComponent,
}

/// A named group of manifests of one kind, applied with one call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ManifestStage {
    pub name: &'static str,
    pub kind: ResourceKind,
    pub manifests: &'static [&'static str],
    pub render: RenderInputs,
}

pub const LVMS_STAGES: &[ManifestStage] = &[
    ManifestStage {
        name: "namespace",
        kind: ResourceKind::Namespace,
        manifests: &["components/lvms/topolvm-openshift-storage_namespace.yaml"],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "service-accounts",
        kind: ResourceKind::ServiceAccount,
        manifests: &[
            "components/lvms/topolvm-node_v1_serviceaccount.yaml",
            "components/lvms/topolvm-controller_v1_serviceaccount.yaml",
        ],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "roles",
        kind: ResourceKind::Role,
        manifests: &[
            "components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_role.yaml",
            "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_role.yaml",
            "components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_role.yaml",
        ],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "role-bindings",
        kind: ResourceKind::RoleBinding,
        manifests: &[
            "components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_rolebinding.yaml",
            "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_rolebinding.yaml",
            "components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_rolebinding.yaml",
        ],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "cluster-roles",
        kind: ResourceKind::ClusterRole,
        manifests: &[
            "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_clusterrole.yaml",
            "components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_clusterrole.yaml",
            "components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_clusterrole.yaml",
            "components/lvms/topolvm-node-scc_rbac.authorization.k8s.io_v1_clusterrole.yaml",
            "components/lvms/topolvm-node_rbac.authorization.k8s.io_v1_clusterrole.yaml",
        ],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "cluster-role-bindings",
        kind: ResourceKind::ClusterRoleBinding,
        manifests: &[
            "components/lvms/topolvm-controller_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml",
            "components/lvms/topolvm-csi-provisioner_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml",
            "components/lvms/topolvm-csi-resizer_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml",
            "components/lvms/topolvm-node-scc_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml",
            "components/lvms/topolvm-node_rbac.authorization.k8s.io_v1_clusterrolebinding.yaml",
        ],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "csi-driver",
        kind: ResourceKind::CsiDriver,
        manifests: &["components/lvms/csi-driver.yaml"],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "storage-class",
        kind: ResourceKind::StorageClass,
        manifests: &["components/lvms/topolvm_default-storage-class.yaml"],
        render: RenderInputs::None,
    },
    ManifestStage {
        name: "config-maps",
        kind: ResourceKind::ConfigMap,
        manifests: &["components/lvms/topolvm-lvmd-config_configmap_v1.yaml"],
        render: RenderInputs::Component,
    },
    ManifestStage {
        name: "deployments",
        kind: ResourceKind::Deployment,
        manifests: &["components/lvms/topolvm-controller_deployment.yaml"],
        render: RenderInputs::System,
    },
    ManifestStage {
        name: "daemon-sets",
        kind: ResourceKind::DaemonSet,
        manifests: &["components/lvms/topolvm-node_daemonset.yaml"],
        render: RenderInputs::SystemWithComponent,
    },
    ManifestStage {
        name: "security-context-constraints",
        kind: ResourceKind::SecurityContextConstraints,
        manifests: &["components/lvms/topolvm-node-securitycontextconstraint.yaml"],
        render: RenderInputs::None,
    },
];
