use solax_rs485::prelude::*;

use std::io::Write;
use std::time::Duration;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn path(file: &tempfile::NamedTempFile) -> String {
    file.path().to_str().unwrap().to_string()
}

#[test]
fn empty_config_uses_defaults() {
    let file = write_config("{}\n");
    let config = Config::new(path(&file)).unwrap();

    assert_eq!(config.device, None);
    assert_eq!(config.baud_rate, 9600);
    assert_eq!(config.dwell, Duration::from_millis(250));
    assert_eq!(config.read_timeout, Duration::from_millis(500));
    assert_eq!(config.loglevel, "info");
    assert!(config.inverters.is_empty());
}

#[test]
fn reads_full_config() {
    let file = write_config(
        r#"
device: /dev/ttyUSB0
baud_rate: 19200
dwell_ms: 400
read_timeout_ms: 800
loglevel: debug
inverters:
  - serial: 584D3241303132333435363738
    address: 1
  - serial: "584D324130313233343536373839"
    address: 2
    enabled: false
"#,
    );
    let config = ConfigWrapper::new(path(&file)).unwrap();

    assert_eq!(config.device().as_deref(), Some("/dev/ttyUSB0"));
    assert_eq!(config.baud_rate(), 19200);
    assert_eq!(config.dwell(), Duration::from_millis(400));
    assert_eq!(config.read_timeout(), Duration::from_millis(800));
    assert_eq!(config.loglevel(), "debug");
    assert_eq!(config.inverters().len(), 2);
    assert_eq!(config.enabled_inverters().len(), 1);

    let second = config.inverter_with_address(2).unwrap();
    assert!(!second.enabled());
    assert_eq!(second.serial().map(|s| s.len()), Some(14));

    let first = config.inverter_with_address(1).unwrap();
    assert_eq!(first.serial(), Serial::from_str("584D3241303132333435363738").ok().as_ref());
    assert!(config.inverter_with_address(3).is_none());
}

#[test]
fn wrapper_overrides_are_shared() {
    let config = ConfigWrapper::from_config(Config::default());
    let other = config.clone();

    other.set_device("/dev/ttyS1".to_string());
    other.set_loglevel("trace");

    assert_eq!(config.device().as_deref(), Some("/dev/ttyS1"));
    assert_eq!(config.loglevel(), "trace");
}

#[test]
fn rejects_address_zero() {
    let file = write_config("inverters:\n  - address: 0\n");

    let err = Config::new(path(&file)).unwrap_err();
    assert!(err.to_string().contains("address must be between 1 and 255"));
}

#[test]
fn rejects_duplicate_addresses() {
    let file = write_config("inverters:\n  - address: 4\n  - address: 4\n");

    assert!(Config::new(path(&file)).is_err());
}

#[test]
fn rejects_bad_serial() {
    let file = write_config("inverters:\n  - serial: XYZ1\n    address: 1\n");

    assert!(Config::new(path(&file)).is_err());
}

#[test]
fn rejects_zero_read_timeout() {
    let file = write_config("read_timeout_ms: 0\n");

    assert!(Config::new(path(&file)).is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("config.yaml");

    let config = Config::load_or_default(missing.to_str().unwrap()).unwrap();
    assert_eq!(config.baud_rate, 9600);

    assert!(Config::new(missing.to_str().unwrap().to_string()).is_err());
}
