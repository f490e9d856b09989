use std::collections::HashMap;

use thiserror::Error;

/// Error that can occur when ordering dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// A node declares a dependency that is not part of the graph
    #[error("Plugin '{plugin_name}' depends on '{dependency_name}', which is not registered")]
    MissingDependency {
        plugin_name: String,
        dependency_name: String,
    },

    /// Dependency cycle detected; the path starts and ends on the same node
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
}

impl DependencyError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DependencyError::MissingDependency { .. } => "MISSING_DEPENDENCY",
            DependencyError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
        }
    }
}

/// Traversal state of a node during the depth-first sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Dependency graph keyed by node name.
///
/// Nodes keep their insertion order, and each node's dependencies keep their
/// declared order. Both orders drive the traversal, so the sort output is
/// deterministic for a given sequence of `add_node` calls.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Node names in insertion order
    order: Vec<String>,
    /// Edges in the graph (node -> dependencies)
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create a new, empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing the dependencies of an existing node with the
    /// same name. A replaced node keeps its original position.
    pub fn add_node<S: AsRef<str>>(&mut self, name: &str, dependencies: &[S]) {
        let deps = dependencies.iter().map(|d| d.as_ref().to_string()).collect();
        if self.edges.insert(name.to_string(), deps).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Check if the graph contains a node
    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Get the declared dependencies of a node
    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    /// Node names in insertion order
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get a topologically sorted list of nodes: every dependency precedes
    /// its dependents.
    pub fn topological_sort(&self) -> Result<Vec<String>, DependencyError> {
        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(self.order.len());
        let mut path: Vec<&str> = Vec::new();
        let mut sorted = Vec::with_capacity(self.order.len());

        for name in &self.order {
            if !marks.contains_key(name.as_str()) {
                self.visit(name, &mut marks, &mut path, &mut sorted)?;
            }
        }

        Ok(sorted)
    }

    /// Topological order reversed: dependents come before their dependencies.
    pub fn reverse_topological_sort(&self) -> Result<Vec<String>, DependencyError> {
        let mut sorted = self.topological_sort()?;
        sorted.reverse();
        Ok(sorted)
    }

    /// DFS for topological sort with cycle detection
    fn visit<'g>(
        &'g self,
        name: &'g str,
        marks: &mut HashMap<&'g str, Mark>,
        path: &mut Vec<&'g str>,
        sorted: &mut Vec<String>,
    ) -> Result<(), DependencyError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                // `name` is an ancestor on the current path
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(DependencyError::CircularDependency { cycle });
            }
            None => {}
        }

        marks.insert(name, Mark::InProgress);
        path.push(name);

        if let Some(deps) = self.edges.get(name) {
            for dep in deps {
                if !self.edges.contains_key(dep) {
                    return Err(DependencyError::MissingDependency {
                        plugin_name: name.to_string(),
                        dependency_name: dep.clone(),
                    });
                }
                self.visit(dep, marks, path, sorted)?;
            }
        }

        path.pop();
        marks.insert(name, Mark::Done);
        sorted.push(name.to_string());
        Ok(())
    }
}
