use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::tempdir;
use tpt_exec::execution::{ArtifactCopyBack, LocalCopyBack, SkipCopyBack};
use tpt_exec::fs::mock::MockFileSystem;
use tpt_exec::fs::{FileSystem, RealFileSystem};

#[test]
fn mock_fs_tracks_files_and_dirs() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/out/data/a.csv", b"1,2".to_vec());

    assert!(fs.is_file(Path::new("/work/out/data/a.csv")));
    assert!(fs.is_dir(Path::new("/work/out/data")));
    assert!(fs.is_dir(Path::new("/work")));
    assert_eq!(
        fs.read_to_string(Path::new("/work/out/data/a.csv")).unwrap(),
        "1,2"
    );
    assert_eq!(
        fs.read_dir(Path::new("/work/out")).unwrap(),
        vec![PathBuf::from("/work/out/data")]
    );
}

#[test]
fn mock_clear_dir_keeps_the_dir_and_siblings() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/out/data/a.csv", b"a".to_vec());
    fs.add_file("/work/out/data/sub/b.csv", b"b".to_vec());
    fs.add_file("/work/out/database.txt", b"c".to_vec());

    fs.clear_dir(Path::new("/work/out/data")).unwrap();

    assert!(fs.is_dir(Path::new("/work/out/data")));
    assert!(fs.read_dir(Path::new("/work/out/data")).unwrap().is_empty());
    assert_eq!(fs.file_paths(), vec![PathBuf::from("/work/out/database.txt")]);
}

#[test]
fn mock_injected_failures_hit_mutations_only() {
    let fs = MockFileSystem::new();
    fs.add_dir("/work/out");
    fs.fail_on("/work/out");

    assert!(fs.create_dir_all(Path::new("/work/out")).is_err());
    assert!(fs.clear_dir(Path::new("/work/out")).is_err());
    assert!(fs.is_dir(Path::new("/work/out")));
}

#[test]
fn real_clear_dir_empties_a_directory() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("report");
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("index.html"), "x").unwrap();
    fs::write(dir.join("nested/img.png"), "y").unwrap();

    let real = RealFileSystem;
    real.clear_dir(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn local_copy_back_mirrors_each_dir_under_its_name() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    let report = tmp.path().join("report");
    let artifacts = tmp.path().join("artifacts");
    fs::create_dir_all(data.join("TC_Braking_3")).unwrap();
    fs::create_dir_all(&report).unwrap();
    fs::write(data.join("TC_Braking_3/signals.csv"), "t,v").unwrap();
    fs::write(report.join("report.html"), "<html/>").unwrap();

    let copy_back = LocalCopyBack::new(Arc::new(RealFileSystem), &artifacts);
    copy_back.copy_back(&[data.clone(), report.clone()]).unwrap();

    assert_eq!(
        fs::read_to_string(artifacts.join("data/TC_Braking_3/signals.csv")).unwrap(),
        "t,v"
    );
    assert_eq!(
        fs::read_to_string(artifacts.join("report/report.html")).unwrap(),
        "<html/>"
    );
    // Sources are left in place.
    assert!(data.join("TC_Braking_3/signals.csv").is_file());
}

#[test]
fn local_copy_back_skips_missing_dirs() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/out/report/r.html", b"r".to_vec());

    let copy_back = LocalCopyBack::new(Arc::new(fs.clone()), "/artifacts");
    copy_back
        .copy_back(&[PathBuf::from("/work/out/data"), PathBuf::from("/work/out/report")])
        .unwrap();

    assert_eq!(
        fs.file_paths(),
        vec![
            PathBuf::from("/artifacts/report/r.html"),
            PathBuf::from("/work/out/report/r.html"),
        ]
    );
}

#[test]
fn local_copy_back_refuses_clashing_dir_names() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/a/out/signals.csv", b"a".to_vec());
    fs.add_file("/work/b/out/report.html", b"b".to_vec());

    let copy_back = LocalCopyBack::new(Arc::new(fs.clone()), "/artifacts");
    let err = copy_back
        .copy_back(&[PathBuf::from("/work/a/out"), PathBuf::from("/work/b/out")])
        .unwrap_err();

    assert!(err.to_string().contains("also named"), "unexpected error: {err}");
    assert!(!fs.exists(Path::new("/artifacts")));
}

#[test]
fn local_copy_back_refuses_unnamed_dirs() {
    let fs = MockFileSystem::new();
    fs.add_file("/r.html", b"r".to_vec());

    let copy_back = LocalCopyBack::new(Arc::new(fs.clone()), "/artifacts");
    assert!(copy_back.copy_back(&[PathBuf::from("/")]).is_err());
    assert_eq!(fs.file_paths(), vec![PathBuf::from("/r.html")]);
}

#[test]
fn skip_copy_back_does_nothing() {
    let fs = MockFileSystem::new();
    fs.add_file("/work/out/report/r.html", b"r".to_vec());

    SkipCopyBack
        .copy_back(&[PathBuf::from("/work/out/report")])
        .unwrap();

    assert_eq!(fs.file_paths(), vec![PathBuf::from("/work/out/report/r.html")]);
}
