//! Install runs against a scripted stand-in for kubectl.
#![cfg(unix)]

mod common;

use common::{stderr, TestFixture};

const RECORDING_KUBECTL: &str = r#"input=$(cat)
printf '%s\n' "$input" >> "$LVMS_TEST_LOG"
"#;

const RBAC_DENYING_KUBECTL: &str = r#"input=$(cat)
case "$input" in
  *"kind: RoleBinding"*) echo "rolebindings.rbac.authorization.k8s.io is forbidden" >&2; exit 1 ;;
esac
printf '%s\n' "$input" >> "$LVMS_TEST_LOG"
"#;

fn run_install(fixture: &TestFixture, script: &str) -> std::process::Output {
    let script_path = fixture.write_file("kubectl.sh", script);
    let kubectl = format!("/bin/sh {}", script_path.display());
    let config = fixture.config_path();
    let kubeconfig = fixture.write_file("kubeconfig", "apiVersion: v1\nkind: Config\n");
    let log = fixture.root().join("applied.log");

    std::process::Command::new(env!("CARGO_BIN_EXE_lvms-install"))
        .args(["install", "--config"])
        .arg(&config)
        .arg("--kubeconfig")
        .arg(&kubeconfig)
        .arg("--kubectl")
        .arg(&kubectl)
        .env("LVMS_TEST_LOG", &log)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run lvms-install")
}

#[test]
fn install_pipes_every_stage_to_kubectl() {
    let fixture = TestFixture::new();

    let output = run_install(&fixture, RECORDING_KUBECTL);

    assert!(output.status.success(), "{}", stderr(&output));
    let log = std::fs::read_to_string(fixture.root().join("applied.log")).expect("read log");
    let namespace = log.find("kind: Namespace").expect("namespace applied");
    let daemon_set = log.find("kind: DaemonSet").expect("daemon set applied");
    let scc = log
        .find("kind: SecurityContextConstraints")
        .expect("scc applied");
    assert!(namespace < daemon_set && daemon_set < scc);
    assert!(log.contains("# Source: components/lvms/csi-driver.yaml"));
}

#[test]
fn install_stops_at_failing_role_bindings() {
    let fixture = TestFixture::new();

    let output = run_install(&fixture, RBAC_DENYING_KUBECTL);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("role-bindings"), "{err}");
    assert!(err.contains("_rolebinding.yaml"), "{err}");
    assert!(err.contains("forbidden"), "{err}");

    let log = std::fs::read_to_string(fixture.root().join("applied.log")).expect("read log");
    assert!(log.contains("kind: Role\n"));
    assert!(!log.contains("kind: ClusterRole"));
    assert!(!log.contains("kind: DaemonSet"));
}
