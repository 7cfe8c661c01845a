use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn bin(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keyward"));
    cmd.current_dir(dir)
        .env_remove("KEYWARD_SECRET")
        .env_remove("KEYWARD_ITERATIONS")
        .env("KEYWARD_KEY_DIR", dir.join("keys"));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

fn keygen(dir: &Path) {
    bin(dir)
        .args(["keygen", "--bits", "2048"])
        .assert()
        .success()
        .stdout(predicate::str::contains("key pair written"));
}

#[test]
fn salt_has_algorithm_length() {
    let dir = tempdir().unwrap();

    let pbkdf2 = stdout_of(bin(dir.path()).arg("salt"));
    assert_eq!(pbkdf2.trim().len(), 48);

    let argon = stdout_of(bin(dir.path()).args(["salt", "--algorithm", "argon2id"]));
    assert_eq!(argon.trim().len(), 32);
}

#[test]
fn hash_and_verify_roundtrip() {
    let dir = tempdir().unwrap();
    let record = dir.path().join("record.json");

    let json = stdout_of(
        bin(dir.path())
            .env("KEYWARD_SECRET", "hunter2")
            .args(["hash", "--iterations", "1000"]),
    );
    assert!(json.contains("\"algorithm\": \"pbkdf2-sha512\""));
    assert!(json.contains("\"iterations\": 1000"));
    std::fs::write(&record, &json).unwrap();

    bin(dir.path())
        .env("KEYWARD_SECRET", "hunter2")
        .arg("verify")
        .arg("--record")
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains("match"));

    bin(dir.path())
        .env("KEYWARD_SECRET", "hunter3")
        .arg("verify")
        .arg("--record")
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatch"));
}

#[test]
fn secret_can_be_piped() {
    let dir = tempdir().unwrap();
    let salt = "00".repeat(24);

    let piped = stdout_of(
        bin(dir.path())
            .args(["hash", "--iterations", "10", "--salt", &salt])
            .write_stdin("pw\n"),
    );
    let from_env = stdout_of(
        bin(dir.path())
            .env("KEYWARD_SECRET", "pw")
            .args(["hash", "--iterations", "10", "--salt", &salt]),
    );

    assert_eq!(piped, from_env);
}

#[test]
fn hash_with_wrong_salt_length_fails() {
    let dir = tempdir().unwrap();

    bin(dir.path())
        .env("KEYWARD_SECRET", "pw")
        .args(["hash", "--iterations", "10", "--salt", "abcd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("salt must be 24 bytes long, got 2"));
}

#[test]
fn zero_iterations_keeps_secret_and_warns() {
    let dir = tempdir().unwrap();

    bin(dir.path())
        .env("KEYWARD_SECRET", "pw")
        .env("KEYWARD_ITERATIONS", "0")
        .arg("hash")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\"hash\": \"{}\"", hex::encode("pw"))))
        .stderr(predicate::str::contains("unhashed"));
}

#[test]
fn argon2_hash_and_verify() {
    let dir = tempdir().unwrap();
    let record = dir.path().join("record.json");

    let json = stdout_of(bin(dir.path()).env("KEYWARD_SECRET", "pw").args([
        "hash",
        "--algorithm",
        "argon2id",
        "--argon-mem",
        "64",
        "--iterations",
        "1",
    ]));
    assert!(json.contains("argon2id"));
    std::fs::write(&record, &json).unwrap();

    bin(dir.path())
        .env("KEYWARD_SECRET", "pw")
        .args(["verify", "--record"])
        .arg(&record)
        .assert()
        .success()
        .stdout("match\n");

    bin(dir.path())
        .env("KEYWARD_SECRET", "other")
        .args(["verify", "--record"])
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatch"));
}

#[test]
fn verify_takes_algorithm_from_record() {
    let dir = tempdir().unwrap();
    let record = dir.path().join("record.json");

    let json = stdout_of(
        bin(dir.path())
            .env("KEYWARD_SECRET", "pw")
            .args(["hash", "--iterations", "1"]),
    );
    std::fs::write(&record, &json).unwrap();

    bin(dir.path())
        .env("KEYWARD_SECRET", "pw")
        .args(["verify", "--algorithm", "argon2id", "--record"])
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--algorithm"));
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let dir = tempdir().unwrap();
    keygen(dir.path());

    let ciphertext = stdout_of(bin(dir.path()).arg("encrypt").write_stdin("attack at dawn"));
    assert_eq!(ciphertext.trim().len(), 2 * 256);

    bin(dir.path())
        .arg("decrypt")
        .write_stdin(ciphertext)
        .assert()
        .success()
        .stdout("attack at dawn");
}

#[test]
fn keygen_refuses_to_overwrite() {
    let dir = tempdir().unwrap();
    keygen(dir.path());

    bin(dir.path())
        .args(["keygen", "--bits", "2048"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn keygen_rejects_weak_keys() {
    let dir = tempdir().unwrap();

    bin(dir.path())
        .args(["keygen", "--bits", "1024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported key length"));
}

#[test]
fn oversized_payload_is_rejected() {
    let dir = tempdir().unwrap();
    keygen(dir.path());

    bin(dir.path())
        .arg("encrypt")
        .write_stdin(vec![b'x'; 191])
        .assert()
        .failure()
        .stderr(predicate::str::contains("payload too large"));
}

#[test]
fn decrypt_with_other_key_fails() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    keygen(dir.path());
    keygen(other.path());

    let ciphertext = stdout_of(bin(dir.path()).arg("encrypt").write_stdin("for dir only"));

    bin(dir.path())
        .arg("decrypt")
        .arg("--private-key")
        .arg(other.path().join("keys").join("private.der"))
        .write_stdin(ciphertext)
        .assert()
        .failure()
        .stderr(predicate::str::contains("decryption failed"));
}
