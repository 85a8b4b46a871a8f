use std::fs;

use file_encrypter::{EncrypterError, KEY_LEN, Key, load_key, load_or_create_key, save_key};
use tempfile::tempdir;

#[test]
fn fresh_key_is_generated_and_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.drm");

    let key = load_or_create_key(&path).unwrap();
    assert_eq!(key.len(), KEY_LEN);
    assert_eq!(fs::read(&path).unwrap(), key.as_bytes());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[test]
fn existing_key_is_reused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.drm");

    let first = load_or_create_key(&path).unwrap();
    let second = load_or_create_key(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn text_key_file_is_trimmed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.drm");
    fs::write(&path, "0123456789abcdef0123456789abcdef\n").unwrap();

    let key = load_or_create_key(&path).unwrap();
    assert_eq!(key.as_bytes(), b"0123456789abcdef0123456789abcdef");
}

#[test]
fn wrong_length_key_loads_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.drm");
    fs::write(&path, "short").unwrap();

    let key = load_or_create_key(&path).unwrap();
    assert_eq!(key.len(), 5);
    assert_eq!(fs::read(&path).unwrap(), b"short");
}

#[test]
fn unreadable_key_path_is_an_error_not_a_new_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.drm");
    fs::create_dir(&path).unwrap();

    assert!(matches!(
        load_or_create_key(&path),
        Err(EncrypterError::Io(_))
    ));
    assert!(path.is_dir());
}

#[test]
fn save_key_never_clobbers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("key.drm");
    let a = Key::from_bytes(vec![1; KEY_LEN]);
    let b = Key::from_bytes(vec![2; KEY_LEN]);

    save_key(&path, &a).unwrap();
    assert!(save_key(&path, &b).is_err());
    assert_eq!(load_key(&path).unwrap(), a);
}

#[test]
fn key_in_missing_directory_is_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("key.drm");
    let key = load_or_create_key(&path).unwrap();
    assert_eq!(load_key(&path).unwrap(), key);
}
