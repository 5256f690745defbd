//! End-to-end scans over real directory trees.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use dupehunt::scanner::{DirectoryScanner, DuplicateFilesScanner, UniqueFilesScanner};
use tempfile::tempdir;

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

fn set_names(scanner: &DuplicateFilesScanner) -> Vec<Vec<String>> {
    scanner
        .iter()
        .map(|(_, set)| {
            set.iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        })
        .collect()
}

#[test]
fn test_two_identical_texts_one_set() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"hi");
    let b = write_file(dir.path(), "b.txt", b"hi");
    write_file(dir.path(), "c.txt", b"bye");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    assert_eq!(scanner.file_count(), 2);
    assert_eq!(scanner.space_occupied(), 2);

    let (key, set) = scanner.iter().next().unwrap();
    assert_eq!(key.size, 2);
    assert!(set.contains(&canonical(&a)));
    assert!(set.contains(&canonical(&b)));
}

#[test]
fn test_megabyte_binaries_group_by_content() {
    let dir = tempdir().unwrap();
    let payload: Vec<u8> = (0..1_048_576u32).map(|i| (i % 241) as u8).collect();
    let mut other = payload.clone();
    other[524_288] ^= 0xFF;

    write_file(dir.path(), "x.bin", &payload);
    write_file(dir.path(), "y.bin", &payload);
    write_file(dir.path(), "z.bin", &other);

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    assert_eq!(set_names(&scanner), vec![vec!["x.bin", "y.bin"]]);
}

#[test]
fn test_jpg_filter_admits_jpeg_synonym() {
    let dir = tempdir().unwrap();
    let d1 = dir.path().join("dir1");
    let d2 = dir.path().join("dir2");
    fs::create_dir(&d1).unwrap();
    fs::create_dir(&d2).unwrap();
    write_file(&d1, "1.jpg", b"identical image bytes");
    write_file(&d2, "1.jpeg", b"identical image bytes");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.add_filter("jpg");
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    let (_, set) = scanner.iter().next().unwrap();
    let names: Vec<_> = set
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"1.jpg".to_string()));
    assert!(names.contains(&"1.jpeg".to_string()));
}

#[test]
fn test_empty_files_form_a_set() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.set_min_size(0);
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    let (key, set) = scanner.iter().next().unwrap();
    assert_eq!(key.size, 0);
    // The short-file branch renders zero bytes as all padding.
    assert_eq!(key.hex, "0".repeat(128));
    assert_eq!(set.len(), 2);
}

#[test]
#[cfg(unix)]
fn test_symlink_not_admitted_as_duplicate() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.txt", b"hi");
    write_file(dir.path(), "b.txt", b"hi");
    symlink(&a, dir.path().join("link")).unwrap();

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    let (_, set) = scanner.iter().next().unwrap();
    assert_eq!(set.len(), 2);
    assert!(!set.iter().any(|p| p.file_name().unwrap() == "link"));
}

#[test]
fn test_streaming_duplicates_beyond_one_buffer() {
    // Large enough that the digester loops over its read buffer.
    let dir = tempdir().unwrap();
    let payload = vec![b'A'; 3 * 1_048_576];
    write_file(dir.path(), "big1", &payload);
    write_file(dir.path(), "big2", &payload);

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.set_min_size(1);
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    assert_eq!(scanner.space_occupied(), 3 * 1_048_576);
}

#[test]
fn test_mixed_tree_statistics() {
    let dir = tempdir().unwrap();
    // Three copies of one content, two of another, one singleton.
    write_file(dir.path(), "t1.txt", b"triple");
    write_file(dir.path(), "t2.txt", b"triple");
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write_file(&sub, "t3.txt", b"triple");
    write_file(&sub, "p1.txt", b"pair");
    write_file(dir.path(), "p2.txt", b"pair");
    write_file(dir.path(), "lonely.txt", b"just me here");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert_eq!(scanner.files_examined(), 6);
    assert_eq!(scanner.set_count(), 2);
    assert_eq!(scanner.file_count(), 5);
    // pair wastes 4 bytes, triple wastes 2 x 6 bytes.
    assert_eq!(scanner.space_occupied(), 4 + 12);
}

#[test]
fn test_no_duplicates_empty_result() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"one");
    write_file(dir.path(), "b.txt", b"two and some");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert!(scanner.is_empty());
    assert_eq!(scanner.file_count(), 0);
    assert_eq!(scanner.space_occupied(), 0);
    assert_eq!(scanner.files_examined(), 2);
}

#[test]
fn test_repeat_scan_is_deterministic() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write_file(dir.path(), &format!("copy{i}.dat"), b"deterministic payload");
    }
    write_file(dir.path(), "other1.dat", b"different");
    write_file(dir.path(), "other2.dat", b"different");

    let run = || {
        let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
        scanner.scan(true).unwrap();
        let keys: Vec<_> = scanner.iter().map(|(k, _)| k.clone()).collect();
        (keys, set_names(&scanner))
    };

    assert_eq!(run(), run());
}

#[test]
fn test_same_filename_in_sibling_dirs_both_kept() {
    let dir = tempdir().unwrap();
    let d1 = dir.path().join("one");
    let d2 = dir.path().join("two");
    fs::create_dir(&d1).unwrap();
    fs::create_dir(&d2).unwrap();
    write_file(&d1, "copy.txt", b"same bytes");
    write_file(&d2, "copy.txt", b"same bytes");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 1);
    let (_, set) = scanner.iter().next().unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_short_files_differing_within_digest_width() {
    // Both fit the short-file branch; their raw bytes must keep them apart.
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"abc");
    write_file(dir.path(), "b", b"abd");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.set_keep_singletons(true);
    scanner.scan(true).unwrap();

    assert_eq!(scanner.set_count(), 2);
}

#[test]
fn test_unique_projection_counts() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"alpha");
    write_file(dir.path(), "a_dup.txt", b"alpha");
    write_file(dir.path(), "b.txt", b"bravo");
    let sub = dir.path().join("deep");
    fs::create_dir(&sub).unwrap();
    write_file(&sub, "b_dup.txt", b"bravo");
    write_file(&sub, "c.txt", b"charlie");

    let mut scanner = UniqueFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();

    assert_eq!(scanner.len(), 3);
    assert_eq!(scanner.files_examined(), 5);
}

#[test]
fn test_unique_projection_sorted_output() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "zeta.txt", b"z content");
    write_file(dir.path(), "alpha.txt", b"a content");
    write_file(dir.path(), "copy_(3).txt", b"numbered content");

    let mut scanner = UniqueFilesScanner::new(dir.path()).unwrap();
    scanner.scan(true).unwrap();
    scanner.sort();

    let names: Vec<_> = scanner
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["alpha.txt", "zeta.txt", "copy_(3).txt"]);
}

#[test]
fn test_hidden_subtree_skipped_entirely() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "seen.txt", b"payload");
    let hidden = dir.path().join(".git");
    fs::create_dir(&hidden).unwrap();
    write_file(&hidden, "object", b"payload");
    let nested = hidden.join("refs");
    fs::create_dir(&nested).unwrap();
    write_file(&nested, "head", b"payload");

    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    scanner.set_skip_hidden(true);
    scanner.scan(true).unwrap();

    assert_eq!(scanner.files_examined(), 1);
    assert_eq!(scanner.set_count(), 0);
}

#[test]
#[cfg(unix)]
fn test_unreadable_directory_reported_and_skipped() {
    use std::os::unix::fs::PermissionsExt;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // Permission bits don't bind the superuser; nothing to observe then.
    if unsafe { libc::geteuid() } == 0 {
        return;
    }

    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"hi");
    write_file(dir.path(), "b.txt", b"hi");
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write_file(&locked, "secret.txt", b"hi");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let errors = Arc::new(AtomicU64::new(0));
    let mut scanner = DuplicateFilesScanner::new(dir.path()).unwrap();
    {
        let errors = Arc::clone(&errors);
        scanner.set_error_callback(Box::new(move |_, _, _| {
            errors.fetch_add(1, Ordering::SeqCst);
        }));
    }
    scanner.scan(true).unwrap();

    // Restore so the tempdir can clean up.
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(errors.load(Ordering::SeqCst) >= 1);
    // The accessible pair still groups.
    assert_eq!(scanner.set_count(), 1);
    assert_eq!(scanner.file_count(), 2);
}

#[test]
#[cfg(unix)]
fn test_follow_symlinked_directory() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    write_file(&real, "inner.txt", b"linked content");
    write_file(dir.path(), "outer.txt", b"linked content");

    let outside = tempdir().unwrap();
    let link = outside.path().join("doorway");
    symlink(&real, &link).unwrap();

    // Without following, the symlinked dir is invisible.
    let mut scanner = DuplicateFilesScanner::new(outside.path()).unwrap();
    scanner.scan(true).unwrap();
    assert_eq!(scanner.files_examined(), 0);

    // Following descends through it.
    let mut scanner = DuplicateFilesScanner::new(outside.path()).unwrap();
    scanner.set_follow_symlinks(true);
    scanner.set_keep_singletons(true);
    scanner.scan(true).unwrap();
    assert_eq!(scanner.files_examined(), 1);
}
