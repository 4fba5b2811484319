use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use sqlcraft_ast::Query;

use crate::error::GraphError;
use crate::refs;

/// Sentinel node standing in for the query's own outer body.
pub const MAIN_QUERY: &str = "MAIN_QUERY";

/// The dependency graph among a query's CTEs plus its main body, built once
/// from the `WITH` clause attached directly to the query.
pub struct CteGraph {
    /// Declaration order, lowercase key -> original-case name.
    names: IndexMap<String, SmolStr>,
    /// node key -> keys of the nodes it directly depends on.
    edges: IndexMap<String, IndexSet<String>>,
    /// node key -> keys of the nodes that directly depend on it.
    reverse: IndexMap<String, IndexSet<String>>,
    /// A CTE referencing itself outside a `WITH RECURSIVE` clause is a cycle
    /// by construction; such self-loops are excluded from `edges`/`reverse`
    /// (a topological sort has no use for them) and tracked separately here.
    self_loop: bool,
}

impl CteGraph {
    pub fn build(query: &Query) -> Result<CteGraph, GraphError> {
        let with = query.with_clause().filter(|w| !w.ctes.is_empty()).ok_or(GraphError::NoCtes)?;

        let mut names = IndexMap::new();
        for cte in &with.ctes {
            names.insert(cte.name.to_ascii_lowercase(), cte.name.clone());
        }

        let mut edges: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut reverse: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for key in names.keys() {
            edges.insert(key.clone(), IndexSet::new());
            reverse.insert(key.clone(), IndexSet::new());
        }
        edges.insert(MAIN_QUERY.to_string(), IndexSet::new());
        reverse.insert(MAIN_QUERY.to_string(), IndexSet::new());

        let mut self_loop = false;
        for cte in &with.ctes {
            let key = cte.name.to_ascii_lowercase();
            let mut mentioned = Vec::new();
            refs::collect(&cte.query, true, &mut mentioned);
            for m in mentioned {
                let mk = m.to_ascii_lowercase();
                if !names.contains_key(&mk) {
                    continue;
                }
                if mk == key {
                    if !with.recursive {
                        self_loop = true;
                    }
                    continue;
                }
                edges.get_mut(&key).unwrap().insert(mk.clone());
                reverse.get_mut(&mk).unwrap().insert(key.clone());
            }
        }

        let mut main_refs = Vec::new();
        refs::collect(query, false, &mut main_refs);
        for m in main_refs {
            let mk = m.to_ascii_lowercase();
            if names.contains_key(&mk) {
                edges.get_mut(MAIN_QUERY).unwrap().insert(mk.clone());
                reverse.get_mut(&mk).unwrap().insert(MAIN_QUERY.to_string());
            }
        }

        Ok(CteGraph { names, edges, reverse, self_loop })
    }

    pub fn cte_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.names.values()
    }

    /// Direct dependencies only, in no particular order.
    pub fn dependencies(&self, name: &str) -> Option<Vec<SmolStr>> {
        let key = name.to_ascii_lowercase();
        self.edges.get(&key).map(|deps| deps.iter().map(|k| self.display_name(k)).collect())
    }

    /// Direct dependents only, in no particular order.
    pub fn dependents(&self, name: &str) -> Option<Vec<SmolStr>> {
        let key = name.to_ascii_lowercase();
        self.reverse.get(&key).map(|deps| deps.iter().map(|k| self.display_name(k)).collect())
    }

    pub fn has_cycle(&self) -> bool {
        self.self_loop || tarjan_sccs(&self.edges).into_iter().any(|scc| scc.len() > 1)
    }

    /// Every CTE ordered before each of its dependents, ties broken by
    /// declaration order, `MAIN_QUERY` last.
    pub fn execution_order(&self) -> Result<Vec<SmolStr>, GraphError> {
        if self.has_cycle() {
            return Err(GraphError::Cycle);
        }
        let keys: Vec<String> = self.names.keys().cloned().collect();
        let mut remaining: IndexMap<String, usize> = IndexMap::new();
        for key in &keys {
            let count = self.edges[key].iter().filter(|d| self.names.contains_key(*d)).count();
            remaining.insert(key.clone(), count);
        }

        let mut done: IndexSet<String> = IndexSet::new();
        let mut order = Vec::new();
        while done.len() < keys.len() {
            let next = keys.iter().find(|k| !done.contains(k.as_str()) && remaining[*k] == 0).cloned();
            let Some(key) = next else { return Err(GraphError::Cycle) };
            done.insert(key.clone());
            order.push(self.names[&key].clone());
            for dependent in &self.reverse[&key] {
                if self.names.contains_key(dependent) {
                    if let Some(c) = remaining.get_mut(dependent) {
                        *c = c.saturating_sub(1);
                    }
                }
            }
        }
        order.push(SmolStr::from(MAIN_QUERY));
        Ok(order)
    }

    fn display_name(&self, key: &str) -> SmolStr {
        if key == MAIN_QUERY {
            SmolStr::from(MAIN_QUERY)
        } else {
            self.names.get(key).cloned().unwrap_or_else(|| SmolStr::from(key))
        }
    }
}

/// Tarjan's strongly-connected-components algorithm over an adjacency map
/// keyed by node. Recursive; fine for the CTE counts real queries have.
fn tarjan_sccs(edges: &IndexMap<String, IndexSet<String>>) -> Vec<Vec<String>> {
    struct State<'a> {
        edges: &'a IndexMap<String, IndexSet<String>>,
        counter: usize,
        index: IndexMap<String, usize>,
        lowlink: IndexMap<String, usize>,
        on_stack: IndexSet<String>,
        stack: Vec<String>,
        sccs: Vec<Vec<String>>,
    }

    fn strongconnect(v: &str, state: &mut State) {
        state.index.insert(v.to_string(), state.counter);
        state.lowlink.insert(v.to_string(), state.counter);
        state.counter += 1;
        state.stack.push(v.to_string());
        state.on_stack.insert(v.to_string());

        if let Some(deps) = state.edges.get(v) {
            for w in deps.clone() {
                if !state.index.contains_key(&w) {
                    strongconnect(&w, state);
                    let wl = state.lowlink[&w];
                    let vl = state.lowlink[v];
                    state.lowlink.insert(v.to_string(), vl.min(wl));
                } else if state.on_stack.contains(&w) {
                    let wi = state.index[&w];
                    let vl = state.lowlink[v];
                    state.lowlink.insert(v.to_string(), vl.min(wi));
                }
            }
        }

        if state.lowlink[v] == state.index[v] {
            let mut scc = Vec::new();
            loop {
                let w = state.stack.pop().expect("node pushed before strongconnect returns");
                state.on_stack.shift_remove(&w);
                let done = w == v;
                scc.push(w);
                if done {
                    break;
                }
            }
            state.sccs.push(scc);
        }
    }

    let mut state = State {
        edges,
        counter: 0,
        index: IndexMap::new(),
        lowlink: IndexMap::new(),
        on_stack: IndexSet::new(),
        stack: Vec::new(),
        sccs: Vec::new(),
    };
    let keys: Vec<String> = edges.keys().cloned().collect();
    for key in keys {
        if !state.index.contains_key(&key) {
            strongconnect(&key, &mut state);
        }
    }
    state.sccs
}
