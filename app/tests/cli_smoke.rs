use assert_cmd::Command;

fn bin() -> Command {
    Command::cargo_bin("xray-runner").unwrap()
}

#[test]
fn generate_uuid_prints_one_uuid() {
    let out = bin().args(["generate", "uuid"]).assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let id = stdout.trim();
    assert_eq!(id.len(), 36, "{stdout:?}");
    assert_eq!(id.matches('-').count(), 4);
}

#[test]
fn generate_short_id_prints_hex() {
    let out = bin().args(["generate", "short-id"]).assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let sid = stdout.trim();
    assert_eq!(sid.len(), 16);
    assert!(sid.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
}

#[test]
fn version_names_engine() {
    let out = bin().arg("version").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("xray-runner"));
    assert!(stdout.contains("1.8.24"));
}

#[test]
fn link_reads_results_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("link.txt"), "vless://abc@1.2.3.4:443#VLESS-Reality").unwrap();
    bin()
        .args(["link", "--workdir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout("vless://abc@1.2.3.4:443#VLESS-Reality\n");
}

#[test]
fn link_without_results_file_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = bin()
        .args(["link", "--workdir"])
        .arg(dir.path())
        .assert()
        .code(1);
    let stderr = String::from_utf8(out.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("link.txt"), "{stderr}");
}

#[test]
fn invalid_port_is_fatal_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let out = bin()
        .args(["run", "--workdir"])
        .arg(dir.path())
        .env("PORT", "not-a-port")
        .assert()
        .code(1);
    let stderr = String::from_utf8(out.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("invalid PORT"), "{stderr}");
    assert!(!dir.path().join("c.json").exists());
}

#[test]
fn unknown_protocol_is_a_usage_error() {
    bin().args(["--protocol", "trojan"]).assert().failure();
}
