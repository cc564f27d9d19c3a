use std::path::{Path, PathBuf};

use tpt_exec::errors::TptError;
use tpt_exec::fs::mock::MockFileSystem;
use tpt_exec::launch::{select_executable, LaunchCommand, Platform};

#[test]
fn linux_command_runs_headless_api_server() {
    let cmd = LaunchCommand::new(
        Path::new("/opt/tpt/tpt"),
        1099,
        "TptApi",
        &["--verbose".to_string()],
        Platform::Linux,
    );

    assert_eq!(cmd.program, PathBuf::from("/opt/tpt/tpt"));
    assert_eq!(
        cmd.args,
        vec![
            "--apiPort",
            "1099",
            "--apiBindingName",
            "TptApi",
            "--run",
            "apiserver",
            "--headless",
            "--verbose"
        ]
    );
}

#[test]
fn other_platforms_start_the_gui() {
    let cmd = LaunchCommand::new(
        Path::new("C:/TPT/tpt.exe"),
        2000,
        "Jenkins",
        &[],
        Platform::Other,
    );

    assert_eq!(
        cmd.args,
        vec!["--apiPort", "2000", "--apiBindingName", "Jenkins"]
    );
}

#[test]
fn display_quotes_arguments_with_spaces() {
    let cmd = LaunchCommand::new(
        Path::new("C:/Program Files/TPT/tpt.exe"),
        1099,
        "Tpt Api",
        &[],
        Platform::Other,
    );

    assert_eq!(
        cmd.to_string(),
        "C:/Program Files/TPT/tpt.exe --apiPort 1099 --apiBindingName \"Tpt Api\""
    );
}

#[test]
fn first_existing_candidate_is_selected() {
    let fs = MockFileSystem::new();
    fs.add_file("/b/tpt", b"bin".to_vec());
    fs.add_file("/c/tpt", b"bin".to_vec());
    fs.add_dir("/a/tpt");

    let candidates = vec![
        PathBuf::from("/a/tpt"),
        PathBuf::from("/b/tpt"),
        PathBuf::from("/c/tpt"),
    ];

    let chosen = select_executable(&fs, &candidates).unwrap();
    assert_eq!(chosen, PathBuf::from("/b/tpt"));
}

#[test]
fn no_candidate_lists_everything_tried() {
    let fs = MockFileSystem::new();
    let candidates = vec![PathBuf::from("/a/tpt"), PathBuf::from("/b/tpt")];

    match select_executable(&fs, &candidates) {
        Err(TptError::ExecutableNotFound(tried)) => assert_eq!(tried, candidates),
        other => panic!("Expected ExecutableNotFound, got: {:?}", other),
    }
}

#[test]
fn empty_candidate_list_is_not_found() {
    let fs = MockFileSystem::new();

    let err = select_executable(&fs, &[]).unwrap_err();
    assert!(err.to_string().contains("<none configured>"));
}
