//! Dependency stratification and SCC partitioning (spec.md §4.1.4).
//!
//! Within one `DefMap`, every definition's reference set induces a
//! graph. A Bellman-Ford longest-path pass assigns each definition a
//! level; edges into a lambda carry weight 0 (recursion through a
//! lambda is always legal — it's only realized when called), edges
//! into a non-lambda carry weight 1. A definition whose level would
//! have to exceed the definition count sits on an illegal value-
//! recursion cycle: the cycle is traced via predecessor pointers,
//! reported, its members erased, and the pass retried. Definitions
//! surviving at the same level are then partitioned into strongly
//! connected components via Tarjan's algorithm restricted to lambdas —
//! value definitions are singleton components by construction, since
//! a real cycle among them would already have been erased above.

use loom_base::Symbol;

/// A directed reference edge: `from` mentions `to` in its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

/// One illegal value-recursion cycle found during stratification,
/// named by the definitions on it (in cycle order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalCycle {
    pub members: Vec<usize>,
}

/// Runs the longest-path relaxation to convergence or until a cycle
/// through at least one non-lambda edge is detected.
///
/// Returns the stable level of each definition on success, or the
/// members of one illegal cycle (the caller is expected to erase them
/// and retry with the remaining definitions; see [`stratify_levels`]).
fn bellman_ford_levels(n: usize, is_lambda: &[bool], edges: &[Edge]) -> Result<Vec<usize>, IllegalCycle> {
    let mut dist = vec![0usize; n];
    let mut pred: Vec<Option<usize>> = vec![None; n];

    for _ in 0..=n {
        let mut changed = false;
        for edge in edges {
            let weight = if is_lambda[edge.to] { 0 } else { 1 };
            let candidate = dist[edge.from] + weight;
            if candidate > dist[edge.to] {
                dist[edge.to] = candidate;
                pred[edge.to] = Some(edge.from);
                changed = true;
            }
        }
        if !changed {
            return Ok(dist);
        }
    }

    // Still relaxing after n+1 rounds: a positive-weight cycle exists.
    // Walk predecessors from any node still being relaxed; n steps is
    // enough to guarantee landing inside the cycle.
    let start = edges
        .iter()
        .map(|e| e.to)
        .find(|&v| {
            let weight_in = edges.iter().find(|e| e.to == v).map(|e| if is_lambda[v] { 0 } else { 1 }).unwrap_or(0);
            dist[v] + weight_in > n
        })
        .unwrap_or(0);

    let mut cursor = start;
    for _ in 0..n {
        cursor = pred[cursor].unwrap_or(cursor);
    }
    let cycle_start = cursor;
    let mut members = vec![cycle_start];
    let mut walker = pred[cycle_start].unwrap_or(cycle_start);
    while walker != cycle_start {
        members.push(walker);
        walker = pred[walker].unwrap_or(cycle_start);
    }
    members.reverse();
    Err(IllegalCycle { members })
}

/// Repeatedly runs [`bellman_ford_levels`], erasing each illegal cycle
/// found and retrying, until the remaining definitions stratify
/// cleanly. Returns the final per-definition level (for erased
/// definitions, `None`) plus every cycle reported along the way.
pub fn stratify_levels(n: usize, is_lambda: &[bool], edges: &[Edge]) -> (Vec<Option<usize>>, Vec<IllegalCycle>) {
    let mut alive = vec![true; n];
    let mut cycles = Vec::new();

    loop {
        let live_edges: Vec<Edge> = edges
            .iter()
            .copied()
            .filter(|e| alive[e.from] && alive[e.to])
            .collect();
        match bellman_ford_levels(n, is_lambda, &live_edges) {
            Ok(dist) => {
                let levels = (0..n).map(|i| if alive[i] { Some(dist[i]) } else { None }).collect();
                return (levels, cycles);
            }
            Err(cycle) => {
                for &member in &cycle.members {
                    alive[member] = false;
                }
                cycles.push(cycle);
            }
        }
    }
}

/// Tarjan's strongly connected components, restricted by the caller to
/// a single level's lambda subgraph (value definitions are passed in
/// as singleton nodes with no outgoing edges, so each trivially forms
/// its own component).
pub fn tarjan_scc(n: usize, adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct State {
        index: Vec<Option<usize>>,
        low_link: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        counter: usize,
        components: Vec<Vec<usize>>,
    }

    fn strong_connect(v: usize, adj: &[Vec<usize>], st: &mut State) {
        st.index[v] = Some(st.counter);
        st.low_link[v] = st.counter;
        st.counter += 1;
        st.stack.push(v);
        st.on_stack[v] = true;

        for &w in &adj[v] {
            if st.index[w].is_none() {
                strong_connect(w, adj, st);
                st.low_link[v] = st.low_link[v].min(st.low_link[w]);
            } else if st.on_stack[w] {
                st.low_link[v] = st.low_link[v].min(st.index[w].unwrap());
            }
        }

        if st.low_link[v] == st.index[v].unwrap() {
            let mut component = Vec::new();
            loop {
                let w = st.stack.pop().unwrap();
                st.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            st.components.push(component);
        }
    }

    let mut state = State {
        index: vec![None; n],
        low_link: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        counter: 0,
        components: Vec::new(),
    };

    for v in 0..n {
        if state.index[v].is_none() {
            strong_connect(v, adj, &mut state);
        }
    }

    state.components
}

/// Names (for diagnostics) of the definitions on an illegal cycle.
pub fn cycle_names(cycle: &IllegalCycle, names: &[Symbol]) -> Vec<Symbol> {
    cycle.members.iter().map(|&i| names[i]).collect()
}
