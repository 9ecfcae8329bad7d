//! Configuration file loading and precedence.

use std::io::Write;

use vboxautoss::cli::Args;
use vboxautoss::config::Config;

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(yaml.as_bytes()).expect("write config");
    file
}

#[test]
fn test_config_yaml_parsing() {
    let file = write_config(
        r#"
hypervisor:
  vboxmanage_path: /usr/lib/virtualbox/VBoxManage

snapshots:
  take: true
  keep: 14

email:
  smtp_server: smtp.example.com
  smtp_server_port: 587
  smtp_user: backup
  smtp_passwd: secret
  recipient: ops@example.com
  smtp_secure: true
"#,
    );

    let config = Config::load(file.path()).expect("Failed to load config");

    assert_eq!(config.hypervisor.vboxmanage_path, "/usr/lib/virtualbox/VBoxManage");
    assert!(config.snapshots.take);
    assert_eq!(config.snapshots.keep, 14);

    let mail = config.mail_config().expect("mail configured");
    assert_eq!(mail.server, "smtp.example.com");
    assert_eq!(mail.port, 587);
    assert_eq!(mail.user.as_deref(), Some("backup"));
    assert_eq!(mail.password.as_deref(), Some("secret"));
    assert_eq!(mail.recipient.as_deref(), Some("ops@example.com"));
    assert!(mail.secure);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let file = write_config("snapshots:\n  keep: 2\n");

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.hypervisor.vboxmanage_path, "vboxmanage");
    assert!(!config.snapshots.take);
    assert_eq!(config.snapshots.keep, 2);
    assert_eq!(config.email.smtp_server_port, 465);
    assert!(config.mail_config().is_none());
}

#[test]
fn test_cli_overrides_file() {
    let file = write_config("snapshots:\n  keep: 10\nemail:\n  smtp_server: file.example.com\n");
    let args = Args {
        prune_snapshots: Some(0),
        smtp_server: Some("cli.example.com".to_string()),
        smtp_server_port: Some(2525),
        ..Args::default()
    };

    let config = Config::load(file.path()).unwrap().with_cli_overrides(&args);

    assert_eq!(config.plan().prune_keep, 0);
    let mail = config.mail_config().unwrap();
    assert_eq!(mail.server, "cli.example.com");
    assert_eq!(mail.port, 2525);
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(dir.path().join("absent.yaml")).is_err());
}

#[test]
fn test_malformed_yaml_is_error() {
    let file = write_config("snapshots: [not, a, map\n");
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_absent_default_file_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let args = Args {
        prune_snapshots: Some(4),
        ..Args::default()
    };

    let config = Config::load_or_default(dir.path().join("vboxautoss.yaml"), &args).unwrap();

    assert_eq!(config.hypervisor.vboxmanage_path, "vboxmanage");
    assert_eq!(config.plan().prune_keep, 4);
}

#[test]
fn test_malformed_default_file_is_error() {
    let file = write_config("snapshots:\n  keep: [3\n");
    let args = Args {
        snapshot_vms: true,
        ..Args::default()
    };

    assert!(Config::load_or_default(file.path(), &args).is_err());
}

#[test]
fn test_existing_default_file_is_used() {
    let file = write_config("snapshots:\n  keep: 9\n");

    let config = Config::load_or_default(file.path(), &Args::default()).unwrap();

    assert_eq!(config.plan().prune_keep, 9);
}

/// Boolean flags switch a setting on; absent flags leave the file's value.
#[test]
fn test_bool_flags_only_enable() {
    let file = write_config("snapshots:\n  take: true\nemail:\n  smtp_server: smtp.example.com\n  smtp_secure: true\n");

    let config = Config::load(file.path()).unwrap().with_cli_overrides(&Args::default());

    assert!(config.plan().snapshot_vms);
    assert!(config.mail_config().unwrap().secure);
}
