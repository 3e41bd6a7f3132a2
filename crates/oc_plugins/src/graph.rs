//! Dependency graph between plugins.
//!
//! An edge `A -> B` means "A depends on B". The graph is built once per run
//! from the validated descriptors and never changes afterwards. Building it
//! rejects duplicate names and references to undeclared plugins;
//! [`DependencyGraph::find_cycle`] reports the first cycle a depth-first
//! traversal runs into.

use hashbrown::HashMap;

use crate::error::InitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Immutable dependency graph over a set of uniquely named plugins.
///
/// Nodes keep the order they were supplied in; all traversals follow that
/// order, and dependencies are visited in declaration order.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    names: Vec<String>,
    dependencies: Vec<Vec<String>>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Builds the graph from `(name, dependencies)` pairs.
    ///
    /// # Errors
    ///
    /// - [`InitError::DuplicateName`] if a name appears twice
    /// - [`InitError::UnknownDependency`] for the first dependency, in input
    ///   then declaration order, that names no node
    pub fn new<I>(nodes: I) -> Result<Self, InitError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let (names, dependencies): (Vec<String>, Vec<Vec<String>>) = nodes.into_iter().unzip();

        let edges = {
            let mut index: HashMap<&str, usize> = HashMap::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                if index.insert(name.as_str(), i).is_some() {
                    return Err(InitError::DuplicateName(name.clone()));
                }
            }

            let mut edges = Vec::with_capacity(names.len());
            for deps in &dependencies {
                let mut resolved = Vec::with_capacity(deps.len());
                for dep in deps {
                    let Some(&target) = index.get(dep.as_str()) else {
                        return Err(InitError::UnknownDependency(dep.clone()));
                    };
                    resolved.push(target);
                }
                edges.push(resolved);
            }
            edges
        };

        Ok(Self {
            names,
            dependencies,
            edges,
        })
    }

    /// Number of plugins in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the graph has no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the plugin at `index`.
    #[must_use]
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Declared dependency names of the plugin at `index`.
    #[must_use]
    pub fn dependency_names(&self, index: usize) -> &[String] {
        &self.dependencies[index]
    }

    /// Indices of the plugins the plugin at `index` depends on.
    #[must_use]
    pub fn dependencies_of(&self, index: usize) -> &[usize] {
        &self.edges[index]
    }

    /// Searches the graph for a dependency cycle.
    ///
    /// Runs a depth-first traversal from every unvisited plugin in input
    /// order. On the first back-edge, returns the path from the revisited
    /// plugin along the traversal stack, closed by that plugin again
    /// (`["a", "b", "a"]`). A self-dependency yields `["a", "a"]`.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.names.len()];

        for root in 0..self.names.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            // (node, index of the next dependency to visit)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::OnStack;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let Some(&dep) = self.edges[node].get(frame.1) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::OnStack;
                        stack.push((dep, 0));
                    }
                    Mark::OnStack => {
                        let start = stack
                            .iter()
                            .position(|&(n, _)| n == dep)
                            .unwrap_or_default();
                        let mut path: Vec<String> = stack[start..]
                            .iter()
                            .map(|&(n, _)| self.names[n].clone())
                            .collect();
                        path.push(self.names[dep].clone());
                        return Some(path);
                    }
                    Mark::Done => {}
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, deps: &[&str]) -> (String, Vec<String>) {
        (
            name.to_owned(),
            deps.iter().map(|d| (*d).to_owned()).collect(),
        )
    }

    #[test]
    fn empty_graph() {
        let graph = DependencyGraph::new(Vec::new()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn resolves_edges_regardless_of_order() {
        let graph = DependencyGraph::new(vec![
            node("doSomething", &["getValue"]),
            node("getValue", &["isFlagged"]),
            node("isFlagged", &[]),
        ])
        .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.dependencies_of(0), &[1]);
        assert_eq!(graph.dependencies_of(1), &[2]);
        assert!(graph.dependencies_of(2).is_empty());
        assert_eq!(graph.dependency_names(0), &["getValue".to_owned()]);
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = DependencyGraph::new(vec![node("a", &[]), node("a", &[])]).unwrap_err();
        assert!(matches!(err, InitError::DuplicateName(ref name) if name == "a"));
    }

    #[test]
    fn rejects_unknown_dependency() {
        let err = DependencyGraph::new(vec![node("getValue", &["isFlagged"])]).unwrap_err();
        assert_eq!(err.to_string(), "unknown plugin dependency: isFlagged");
    }

    #[test]
    fn unknown_dependency_deep_in_chain() {
        let err = DependencyGraph::new(vec![
            node("a", &["b"]),
            node("b", &["c"]),
            node("c", &["d"]),
            node("d", &["missing"]),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "unknown plugin dependency: missing");
    }

    #[test]
    fn names_are_case_sensitive() {
        let err = DependencyGraph::new(vec![node("getValue", &[]), node("a", &["getvalue"])])
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown plugin dependency: getvalue");
    }

    #[test]
    fn two_node_cycle_in_discovery_order() {
        let graph = DependencyGraph::new(vec![
            node("getValue", &["isFlagged"]),
            node("isFlagged", &["getValue"]),
        ])
        .unwrap();

        assert_eq!(
            graph.find_cycle().unwrap(),
            vec!["getValue", "isFlagged", "getValue"]
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = DependencyGraph::new(vec![node("a", &["a"])]).unwrap();
        assert_eq!(graph.find_cycle().unwrap(), vec!["a", "a"]);
    }

    #[test]
    fn cycle_path_excludes_entry_prefix() {
        // root -> a -> b -> c -> a
        let graph = DependencyGraph::new(vec![
            node("root", &["a"]),
            node("a", &["b"]),
            node("b", &["c"]),
            node("c", &["a"]),
        ])
        .unwrap();

        assert_eq!(graph.find_cycle().unwrap(), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let graph = DependencyGraph::new(vec![
            node("top", &["left", "right"]),
            node("left", &["bottom"]),
            node("right", &["bottom"]),
            node("bottom", &[]),
        ])
        .unwrap();

        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn cycle_reached_after_finished_subtree() {
        let graph = DependencyGraph::new(vec![
            node("a", &["shared"]),
            node("shared", &[]),
            node("x", &["shared", "y"]),
            node("y", &["x"]),
        ])
        .unwrap();

        assert_eq!(graph.find_cycle().unwrap(), vec!["x", "y", "x"]);
    }
}
