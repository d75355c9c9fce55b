use super::*;

fn write_override(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join(LVMD_CONFIG_FILE_NAME);
    fs::write(&path, contents.as_bytes()).expect("write lvmd override");
    path
}

#[test]
fn absent_override_resolves_to_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let resolution = resolve_lvmd_config(dir.path()).expect("resolve defaults");

    assert!(resolution.is_default());
    assert_eq!(resolution.config(), &LvmdConfig::default());
    let class = resolution
        .config()
        .default_device_class()
        .expect("default device class");
    assert_eq!(class.volume_group, DEFAULT_VOLUME_GROUP);
}

#[test]
fn override_volume_group_is_used() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_override(
        dir.path(),
        "device-classes:\n  - name: default\n    volume-group: vg-fast\n    default: true\n",
    );

    let resolution = resolve_lvmd_config(dir.path()).expect("resolve override");

    match &resolution {
        LvmdResolution::FromFile { path: found, .. } => assert_eq!(found, &path),
        other => panic!("expected FromFile, got {other:?}"),
    }
    let class = resolution
        .config()
        .default_device_class()
        .expect("default device class");
    assert_eq!(class.volume_group, "vg-fast");
    assert_eq!(resolution.config().socket_name, DEFAULT_SOCKET_NAME);
}

#[test]
fn partial_override_keeps_default_device_classes() {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_override(dir.path(), "socket-name: /run/custom/lvmd.sock\n");

    let resolution = resolve_lvmd_config(dir.path()).expect("resolve override");

    assert!(!resolution.is_default());
    assert_eq!(resolution.config().socket_name, "/run/custom/lvmd.sock");
    assert_eq!(
        resolution.config().device_classes,
        LvmdConfig::default().device_classes
    );
}

#[test]
fn empty_override_is_a_file_with_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_override(dir.path(), "\n");

    let resolution = resolve_lvmd_config(dir.path()).expect("resolve empty override");

    assert!(!resolution.is_default());
    assert_eq!(resolution.config(), &LvmdConfig::default());
}

#[test]
fn malformed_override_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    for contents in [
        "device-classes: [\n",
        "device-classes: not-a-list\n",
        "volumeGroup: vg-fast\n",
    ] {
        write_override(dir.path(), contents);
        let err = resolve_lvmd_config(dir.path()).expect_err("malformed override");
        assert!(
            matches!(err, InstallError::ConfigParse { .. }),
            "expected ConfigParse for {contents:?}, got {err:?}"
        );
    }
}

#[test]
fn metadata_failure_other_than_not_found_is_an_io_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let not_a_dir = dir.path().join("config.yaml");
    fs::write(&not_a_dir, b"node-name: a\n").expect("write file");

    let err = resolve_lvmd_config(&not_a_dir).expect_err("stat through a file");

    assert!(
        matches!(err, InstallError::ConfigIo { .. }),
        "expected ConfigIo, got {err:?}"
    );
}

#[test]
fn unreadable_override_is_an_io_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::create_dir(dir.path().join(LVMD_CONFIG_FILE_NAME)).expect("create dir in place of file");

    let err = resolve_lvmd_config(dir.path()).expect_err("read a directory");

    assert!(matches!(err, InstallError::ConfigIo { .. }));
}

#[test]
fn lvmd_path_sits_next_to_global_config() {
    let path = lvmd_config_path(Path::new("/etc/microshift/config.yaml"));
    assert_eq!(path, PathBuf::from("/etc/microshift/lvmd.yaml"));
}

#[test]
fn validate_rejects_inconsistent_device_classes() {
    let mut no_default = LvmdConfig::default();
    no_default.device_classes[0].default = false;
    assert!(no_default.validate().is_err());
    assert!(no_default.default_device_class().is_none());

    let mut duplicate = LvmdConfig::default();
    let mut second = duplicate.device_classes[0].clone();
    second.default = false;
    duplicate.device_classes.push(second);
    assert!(duplicate.validate().is_err());

    let mut missing_vg = LvmdConfig::default();
    missing_vg.device_classes[0].volume_group.clear();
    assert!(missing_vg.validate().is_err());

    let empty = LvmdConfig {
        socket_name: DEFAULT_SOCKET_NAME.to_string(),
        device_classes: Vec::new(),
    };
    let err = empty.validate().expect_err("no device classes");
    assert!(matches!(err, InstallError::Render { .. }));

    LvmdConfig::default().validate().expect("defaults are valid");
}

#[test]
fn validate_rejects_socket_names_that_break_the_node_arguments() {
    for socket in ["/run/lvmd #1/lvmd.socket", "/run/a: b", "/run/lvmd.socket\n"] {
        let config = LvmdConfig {
            socket_name: socket.to_string(),
            ..LvmdConfig::default()
        };
        let err = config.validate().expect_err(socket);
        match err {
            InstallError::Render { reason, .. } => assert!(reason.contains("socket-name")),
            other => panic!("expected Render, got {other:?}"),
        }
    }

    let unusual = LvmdConfig {
        socket_name: "/run/lvmd-1/lvmd.socket".to_string(),
        ..LvmdConfig::default()
    };
    unusual.validate().expect("plain path is valid");
}
