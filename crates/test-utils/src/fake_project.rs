//! In-memory TPT project model with failure injection.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tpt_exec::api::{
    ExecutionConfiguration, ExecutionConfigurationItem, Identifiable, Named,
    OrderedCollectionOwner, Project, RemoteError, RemoteResult, Scenario, ScenarioGroup,
    ScenarioOrGroup, TestSet,
};

/// Makes a remote call fail once its budget of successful calls is used up.
#[derive(Debug)]
pub struct Fault {
    remaining_ok: AtomicU32,
}

impl Fault {
    pub fn never() -> Self {
        Self {
            remaining_ok: AtomicU32::new(u32::MAX),
        }
    }

    /// Fail every call from now on.
    pub fn always(&self) {
        self.remaining_ok.store(0, Ordering::SeqCst);
    }

    /// Let `n` calls succeed, then fail every call.
    pub fn after(&self, n: u32) {
        self.remaining_ok.store(n, Ordering::SeqCst);
    }

    pub fn check(&self, what: &str) -> RemoteResult<()> {
        let remaining = self.remaining_ok.load(Ordering::SeqCst);
        if remaining == u32::MAX {
            return Ok(());
        }
        if remaining == 0 {
            return Err(RemoteError::Api(format!("injected failure: {what}")));
        }
        self.remaining_ok.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for Fault {
    fn default() -> Self {
        Self::never()
    }
}

#[derive(Debug)]
pub struct FakeScenario {
    name: String,
    id: String,
}

impl FakeScenario {
    pub fn new(name: &str, id: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            id: id.to_string(),
        })
    }
}

impl Named for FakeScenario {
    fn name(&self) -> RemoteResult<String> {
        Ok(self.name.clone())
    }
}

impl Identifiable for FakeScenario {
    fn id(&self) -> RemoteResult<String> {
        Ok(self.id.clone())
    }
}

impl Scenario for FakeScenario {}

pub struct FakeGroup {
    name: String,
    children: Vec<ScenarioOrGroup>,
    pub items_fault: Fault,
}

impl FakeGroup {
    pub fn new(name: &str, children: Vec<ScenarioOrGroup>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            children,
            items_fault: Fault::never(),
        })
    }
}

impl Named for FakeGroup {
    fn name(&self) -> RemoteResult<String> {
        Ok(self.name.clone())
    }
}

impl OrderedCollectionOwner for FakeGroup {
    type Item = ScenarioOrGroup;

    fn items(&self) -> RemoteResult<Vec<ScenarioOrGroup>> {
        self.items_fault.check("group items")?;
        Ok(self.children.clone())
    }
}

impl ScenarioGroup for FakeGroup {}

pub fn scenario(name: &str, id: &str) -> ScenarioOrGroup {
    ScenarioOrGroup::Scenario(FakeScenario::new(name, id))
}

pub fn group(name: &str, children: Vec<ScenarioOrGroup>) -> ScenarioOrGroup {
    ScenarioOrGroup::Group(FakeGroup::new(name, children))
}

#[derive(Debug)]
pub struct FakeTestSet {
    name: String,
    // (name, id) of every added test case.
    cases: Mutex<Vec<(String, String)>>,
    pub add_fault: Fault,
}

impl FakeTestSet {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            cases: Mutex::new(Vec::new()),
            add_fault: Fault::never(),
        })
    }

    pub fn case_names(&self) -> Vec<String> {
        self.cases
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Named for FakeTestSet {
    fn name(&self) -> RemoteResult<String> {
        Ok(self.name.clone())
    }
}

impl TestSet for FakeTestSet {
    fn add_test_case(&self, case: &dyn Scenario) -> RemoteResult<()> {
        self.add_fault.check("add test case")?;
        self.cases.lock().unwrap().push((case.name()?, case.id()?));
        Ok(())
    }

    fn test_cases(&self) -> RemoteResult<Vec<Arc<dyn Scenario>>> {
        Ok(self
            .cases
            .lock()
            .unwrap()
            .iter()
            .map(|(name, id)| FakeScenario::new(name, id) as Arc<dyn Scenario>)
            .collect())
    }
}

pub struct FakeItem {
    test_set: Mutex<Option<Arc<dyn TestSet>>>,
    set_calls: AtomicU32,
    pub set_fault: Fault,
}

impl FakeItem {
    pub fn new(test_set: Option<Arc<dyn TestSet>>) -> Arc<Self> {
        Arc::new(Self {
            test_set: Mutex::new(test_set),
            set_calls: AtomicU32::new(0),
            set_fault: Fault::never(),
        })
    }

    /// Name of the currently assigned test set.
    pub fn test_set_name(&self) -> Option<String> {
        self.test_set
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.name().unwrap())
    }

    pub fn set_calls(&self) -> u32 {
        self.set_calls.load(Ordering::SeqCst)
    }
}

impl ExecutionConfigurationItem for FakeItem {
    fn test_set(&self) -> RemoteResult<Option<Arc<dyn TestSet>>> {
        Ok(self.test_set.lock().unwrap().clone())
    }

    fn set_test_set(&self, test_set: Option<Arc<dyn TestSet>>) -> RemoteResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.set_fault.check("set test set")?;
        *self.test_set.lock().unwrap() = test_set;
        Ok(())
    }
}

pub struct FakeExecConfig {
    name: String,
    data_dir: Mutex<String>,
    report_dir: Mutex<String>,
    items: Vec<Arc<FakeItem>>,
    pub data_dir_fault: Fault,
    pub report_dir_fault: Fault,
    pub items_fault: Fault,
}

impl FakeExecConfig {
    pub fn new(name: &str, data_dir: &str, report_dir: &str, items: Vec<Arc<FakeItem>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            data_dir: Mutex::new(data_dir.to_string()),
            report_dir: Mutex::new(report_dir.to_string()),
            items,
            data_dir_fault: Fault::never(),
            report_dir_fault: Fault::never(),
            items_fault: Fault::never(),
        })
    }

    pub fn current_data_dir(&self) -> String {
        self.data_dir.lock().unwrap().clone()
    }

    pub fn current_report_dir(&self) -> String {
        self.report_dir.lock().unwrap().clone()
    }

    pub fn fake_items(&self) -> &[Arc<FakeItem>] {
        &self.items
    }

    /// Test-set name of every item, in order.
    pub fn test_set_names(&self) -> Vec<Option<String>> {
        self.items.iter().map(|i| i.test_set_name()).collect()
    }
}

impl Named for FakeExecConfig {
    fn name(&self) -> RemoteResult<String> {
        Ok(self.name.clone())
    }
}

impl OrderedCollectionOwner for FakeExecConfig {
    type Item = Arc<dyn ExecutionConfigurationItem>;

    fn items(&self) -> RemoteResult<Vec<Self::Item>> {
        self.items_fault.check("configuration items")?;
        Ok(self
            .items
            .iter()
            .map(|i| Arc::clone(i) as Arc<dyn ExecutionConfigurationItem>)
            .collect())
    }
}

impl ExecutionConfiguration for FakeExecConfig {
    fn data_dir(&self) -> RemoteResult<String> {
        Ok(self.current_data_dir())
    }

    fn set_data_dir(&self, path: &str) -> RemoteResult<()> {
        self.data_dir_fault.check("set data dir")?;
        *self.data_dir.lock().unwrap() = path.to_string();
        Ok(())
    }

    fn report_dir(&self) -> RemoteResult<String> {
        Ok(self.current_report_dir())
    }

    fn set_report_dir(&self, path: &str) -> RemoteResult<()> {
        self.report_dir_fault.check("set report dir")?;
        *self.report_dir.lock().unwrap() = path.to_string();
        Ok(())
    }
}

pub struct FakeProject {
    file: Option<PathBuf>,
    configs: Vec<Arc<FakeExecConfig>>,
    roots: Vec<ScenarioOrGroup>,
    test_sets: Mutex<Vec<Arc<FakeTestSet>>>,
    created: Mutex<Vec<Arc<FakeTestSet>>>,
    deleted: Mutex<Vec<String>>,
    closed: AtomicBool,
    pub create_fault: Fault,
    pub delete_fault: Fault,
    pub roots_fault: Fault,
}

impl FakeProject {
    pub fn new(
        file: Option<PathBuf>,
        configs: Vec<Arc<FakeExecConfig>>,
        roots: Vec<ScenarioOrGroup>,
        test_sets: Vec<Arc<FakeTestSet>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            file,
            configs,
            roots,
            test_sets: Mutex::new(test_sets),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            create_fault: Fault::never(),
            delete_fault: Fault::never(),
            roots_fault: Fault::never(),
        })
    }

    pub fn test_set_names(&self) -> Vec<String> {
        self.test_sets
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.name().unwrap())
            .collect()
    }

    /// Every test set created through the API, deleted or not.
    pub fn created_test_sets(&self) -> Vec<Arc<FakeTestSet>> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted_test_sets(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Project for FakeProject {
    fn file(&self) -> RemoteResult<Option<PathBuf>> {
        Ok(self.file.clone())
    }

    fn execution_configurations(&self) -> RemoteResult<Vec<Arc<dyn ExecutionConfiguration>>> {
        Ok(self
            .configs
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn ExecutionConfiguration>)
            .collect())
    }

    fn top_level_scenarios(&self) -> RemoteResult<Vec<ScenarioOrGroup>> {
        self.roots_fault.check("top level scenarios")?;
        Ok(self.roots.clone())
    }

    fn test_sets(&self) -> RemoteResult<Vec<Arc<dyn TestSet>>> {
        Ok(self
            .test_sets
            .lock()
            .unwrap()
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn TestSet>)
            .collect())
    }

    fn create_test_set(&self, name: &str) -> RemoteResult<Arc<dyn TestSet>> {
        self.create_fault.check("create test set")?;
        let set = FakeTestSet::new(name);
        self.test_sets.lock().unwrap().push(Arc::clone(&set));
        self.created.lock().unwrap().push(Arc::clone(&set));
        Ok(set)
    }

    fn delete_test_set(&self, test_set: &dyn TestSet) -> RemoteResult<()> {
        self.delete_fault.check("delete test set")?;
        let name = test_set.name()?;
        self.test_sets
            .lock()
            .unwrap()
            .retain(|s| s.name().map(|n| n != name).unwrap_or(true));
        self.deleted.lock().unwrap().push(name);
        Ok(())
    }

    fn close(&self) -> RemoteResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// The brake project used across the execution tests.
///
/// - `EC1` with data dir `/orig/data`, report dir `/orig/report` and two
///   items, both assigned to test set `Regression`.
/// - `EC2` with one item and no test set.
/// - Test cases `TC_Braking_1` to `TC_Braking_3` inside group `Braking`,
///   `TC_Braking_3` nested one level deeper in `Braking/Emergency`.
pub struct BrakeProject {
    pub project: Arc<FakeProject>,
    pub ec1: Arc<FakeExecConfig>,
    pub ec2: Arc<FakeExecConfig>,
    pub regression: Arc<FakeTestSet>,
}

impl BrakeProject {
    pub const FILE: &'static str = "/work/brake.tpt";

    pub fn new() -> Self {
        Self::with_test_sets(&[])
    }

    /// Same project with additional, empty test sets.
    pub fn with_test_sets(extra: &[&str]) -> Self {
        let regression = FakeTestSet::new("Regression");
        let ec1 = FakeExecConfig::new(
            "EC1",
            "/orig/data",
            "/orig/report",
            vec![
                FakeItem::new(Some(Arc::clone(&regression) as Arc<dyn TestSet>)),
                FakeItem::new(Some(Arc::clone(&regression) as Arc<dyn TestSet>)),
            ],
        );
        let ec2 = FakeExecConfig::new("EC2", "/orig/data2", "/orig/report2", vec![FakeItem::new(None)]);

        let roots = vec![
            group(
                "Braking",
                vec![
                    scenario("TC_Braking_1", "101"),
                    scenario("TC_Braking_2", "102"),
                    group("Emergency", vec![scenario("TC_Braking_3", "103")]),
                ],
            ),
            scenario("TC_Steering_1", "201"),
        ];

        let mut sets = vec![Arc::clone(&regression)];
        sets.extend(extra.iter().map(|name| FakeTestSet::new(name)));

        let project = FakeProject::new(
            Some(PathBuf::from(Self::FILE)),
            vec![Arc::clone(&ec1), Arc::clone(&ec2)],
            roots,
            sets,
        );

        Self {
            project,
            ec1,
            ec2,
            regression,
        }
    }
}

impl Default for BrakeProject {
    fn default() -> Self {
        Self::new()
    }
}
