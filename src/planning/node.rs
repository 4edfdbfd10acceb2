//! Search tree node
//!
//! A node is the full trajectory from the initial state to the search
//! frontier, stored as the ordered list of applied motion primitives.
//! Paths are immutable once appended, so children share them with their
//! parent instead of copying.

use std::rc::Rc;

use crate::common::{Path, SearchError, SearchResult, State};

#[derive(Debug, Clone)]
pub struct Node {
    list_paths: Vec<Rc<Path>>,
}

impl Node {
    /// Root node: a single one-state path at the initial state
    pub fn root(initial: State) -> Self {
        Self {
            list_paths: vec![Rc::new(Path::from_state(initial))],
        }
    }

    pub fn from_paths(paths: Vec<Path>) -> SearchResult<Self> {
        if paths.is_empty() {
            return Err(SearchError::InvalidParameter(
                "node must contain at least one path".to_string(),
            ));
        }
        Ok(Self {
            list_paths: paths.into_iter().map(Rc::new).collect(),
        })
    }

    /// New node extending this one by `path`
    pub fn child(&self, path: Path) -> Node {
        let mut list_paths = Vec::with_capacity(self.list_paths.len() + 1);
        list_paths.extend(self.list_paths.iter().cloned());
        list_paths.push(Rc::new(path));
        Node { list_paths }
    }

    pub fn list_paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.list_paths.iter().map(|p| p.as_ref())
    }

    pub fn num_paths(&self) -> usize {
        self.list_paths.len()
    }

    /// Number of primitives applied since the root
    pub fn depth(&self) -> usize {
        self.list_paths.len() - 1
    }

    pub fn terminal_path(&self) -> &Path {
        &self.list_paths[self.list_paths.len() - 1]
    }

    pub fn terminal_state(&self) -> &State {
        self.terminal_path().last()
    }

    /// Accumulated time cost of every applied primitive
    pub fn path_cost(&self) -> f64 {
        self.list_paths().map(Path::time_cost).sum()
    }

    /// Owned copy of the path sequence
    pub fn to_paths(&self) -> Vec<Path> {
        self.list_paths().cloned().collect()
    }

    /// Flattened state sequence. Each primitive starts at the previous
    /// primitive's final state, so that shared boundary state is kept once.
    pub fn trajectory(&self) -> Vec<State> {
        let mut states: Vec<State> = Vec::new();
        for path in self.list_paths() {
            let skip = match states.last() {
                Some(prev) if prev.time_step == path.first().time_step => 1,
                _ => 0,
            };
            states.extend(path.states().iter().skip(skip).copied());
        }
        states
    }
}
