// tests/project_lookup.rs

use std::path::{Path, PathBuf};

use tpt_exec::api::{Identifiable, Named, Project, ScenarioOrGroup};
use tpt_exec::errors::TptError;
use tpt_exec::execution::{
    close_project, execution_config_by_name, find_test_case, open_project, unique_test_set_name,
};
use tpt_exec_test_utils::fake_api::FakeToolApi;
use tpt_exec_test_utils::fake_project::{group, scenario, BrakeProject, FakeGroup, FakeProject};

#[test]
fn nested_test_case_is_found() {
    let brake = BrakeProject::new();
    let roots = brake.project.top_level_scenarios().unwrap();

    let found = find_test_case(&roots, "TC_Braking_3").unwrap().unwrap();
    assert_eq!(found.name().unwrap(), "TC_Braking_3");
    assert_eq!(found.id().unwrap(), "103");
}

#[test]
fn missing_test_case_is_none() {
    let brake = BrakeProject::new();
    let roots = brake.project.top_level_scenarios().unwrap();

    assert!(find_test_case(&roots, "TC_Unknown").unwrap().is_none());
    // Groups are not test cases.
    assert!(find_test_case(&roots, "Emergency").unwrap().is_none());
}

#[test]
fn duplicate_names_resolve_to_first_in_depth_first_order() {
    let roots = vec![
        group("A", vec![group("A1", vec![scenario("TC", "1")])]),
        scenario("TC", "2"),
        group("B", vec![scenario("TC", "3")]),
    ];

    let found = find_test_case(&roots, "TC").unwrap().unwrap();
    assert_eq!(found.id().unwrap(), "1");
}

#[test]
fn remote_fault_during_search_is_reported() {
    let broken = FakeGroup::new("Broken", vec![scenario("TC", "1")]);
    broken.items_fault.always();
    let roots = vec![ScenarioOrGroup::Group(broken)];

    assert!(find_test_case(&roots, "TC").is_err());
}

#[test]
fn unique_name_prefers_base_then_smallest_free_suffix() {
    let free = BrakeProject::new();
    assert_eq!(
        unique_test_set_name(free.project.as_ref(), "JENKINS Exec").unwrap(),
        "JENKINS Exec"
    );

    let gap = BrakeProject::with_test_sets(&["JENKINS Exec", "JENKINS Exec 3"]);
    assert_eq!(
        unique_test_set_name(gap.project.as_ref(), "JENKINS Exec").unwrap(),
        "JENKINS Exec 2"
    );
}

#[test]
fn execution_config_is_looked_up_by_exact_name() {
    let brake = BrakeProject::new();

    let ec2 = execution_config_by_name(brake.project.as_ref(), "EC2")
        .unwrap()
        .unwrap();
    assert_eq!(ec2.name().unwrap(), "EC2");
    assert!(execution_config_by_name(brake.project.as_ref(), "ec2")
        .unwrap()
        .is_none());
}

#[test]
fn project_is_opened_by_path() {
    let api = FakeToolApi::new();
    let brake = BrakeProject::new();
    api.add_project(BrakeProject::FILE, brake.project.clone());

    let project = open_project(api.as_ref(), Path::new(BrakeProject::FILE)).unwrap();
    assert_eq!(
        project.file().unwrap(),
        Some(PathBuf::from(BrakeProject::FILE))
    );
}

#[test]
fn unopenable_project_carries_tool_messages() {
    let api = FakeToolApi::new();
    api.set_open_logs(&["file not found", "check the path"]);

    match open_project(api.as_ref(), Path::new("/work/missing.tpt")) {
        Err(TptError::ProjectOpenFailed { path, logs }) => {
            assert_eq!(path, PathBuf::from("/work/missing.tpt"));
            assert_eq!(logs, vec!["file not found", "check the path"]);
        }
        Err(e) => panic!("Expected ProjectOpenFailed, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn close_project_closes_only_the_matching_project() {
    let api = FakeToolApi::new();
    let brake = BrakeProject::new();
    let other = FakeProject::new(Some(PathBuf::from("/work/other.tpt")), vec![], vec![], vec![]);
    api.add_project(BrakeProject::FILE, brake.project.clone());
    api.add_project("/work/other.tpt", other.clone());
    open_project(api.as_ref(), Path::new("/work/other.tpt")).unwrap();
    open_project(api.as_ref(), Path::new(BrakeProject::FILE)).unwrap();

    close_project(api.as_ref(), Path::new(BrakeProject::FILE)).unwrap();
    assert!(brake.project.is_closed());
    assert!(!other.is_closed());
}

#[test]
fn closing_a_project_that_is_not_open_succeeds() {
    let api = FakeToolApi::new();
    let brake = BrakeProject::new();
    api.add_project(BrakeProject::FILE, brake.project.clone());

    assert!(close_project(api.as_ref(), Path::new(BrakeProject::FILE)).is_ok());
    assert!(!brake.project.is_closed());
}
