// src/execution/search.rs

use std::collections::HashSet;
use std::sync::Arc;

use crate::api::{
    Named, OrderedCollectionOwner, Project, RemoteResult, Scenario, ScenarioOrGroup,
};

/// Depth-first search of the test-case tree for a test case named `name`.
///
/// Groups are descended in the order TPT reports them. If several test
/// cases share the name, the first one in traversal order is returned and
/// the others are not reported.
pub fn find_test_case(
    nodes: &[ScenarioOrGroup],
    name: &str,
) -> RemoteResult<Option<Arc<dyn Scenario>>> {
    for node in nodes {
        match node {
            ScenarioOrGroup::Scenario(scenario) => {
                if scenario.name()? == name {
                    return Ok(Some(Arc::clone(scenario)));
                }
            }
            ScenarioOrGroup::Group(group) => {
                if let Some(found) = find_test_case(&group.items()?, name)? {
                    return Ok(Some(found));
                }
            }
        }
    }
    Ok(None)
}

/// Name for the temporary test set: `base`, or `base N` with the smallest
/// `N >= 2` not yet used in the project.
pub fn unique_test_set_name(project: &dyn Project, base: &str) -> RemoteResult<String> {
    let taken = project
        .test_sets()?
        .iter()
        .map(|t| t.name())
        .collect::<RemoteResult<HashSet<String>>>()?;

    if !taken.contains(base) {
        return Ok(base.to_string());
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{base} {n}");
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        n += 1;
    }
}
