//! Call Graph Analysis
//!
//! Reachability, scoping, and dependency ordering over a [`CallGraph`].
//! All traversals are iterative with explicit stacks so that deep call
//! chains in large binaries cannot exhaust the native stack.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use super::CallGraph;
use crate::types::{FuncsumError, Result};

/// All names reachable from `root` by following callee edges
///
/// `root` itself is only included when it is reachable from itself.
pub fn transitive_dependencies(root: &str, graph: &CallGraph) -> BTreeSet<String> {
    let mut deps = BTreeSet::new();
    let mut stack: Vec<&str> = vec![root];

    while let Some(func) = stack.pop() {
        for callee in graph.callees(func) {
            if deps.insert(callee.clone()) {
                stack.push(callee);
            }
        }
    }

    deps
}

/// Restrict `graph` to `root` and its transitive dependencies
///
/// Leaves reached from `root` become keys with no callees, so the result is
/// self-contained.
pub fn subgraph(graph: &CallGraph, root: &str) -> CallGraph {
    let mut sub = CallGraph::new();
    sub.insert(root, graph.callees(root).iter().cloned());

    for func in transitive_dependencies(root, graph) {
        let callees = graph.callees(&func).to_vec();
        sub.insert(func, callees);
    }

    sub
}

/// Order every name so that callees come strictly before their callers
///
/// Kahn's algorithm with lexicographic tie-breaking, so the same graph always
/// yields the same order. Fails with [`FuncsumError::CallGraphCycle`] when the
/// graph is not acyclic; self-recursive functions count as cycles.
pub fn topological_order(graph: &CallGraph) -> Result<Vec<String>> {
    let names = graph.all_names();

    let mut pending: HashMap<&str, usize> = names
        .iter()
        .map(|name| (*name, graph.callees(name).len()))
        .collect();

    let mut callers: HashMap<&str, Vec<&str>> = HashMap::new();
    for (caller, callees) in graph.iter() {
        for callee in callees {
            callers.entry(callee.as_str()).or_default().push(caller);
        }
    }

    let mut ready: BTreeSet<&str> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut order = Vec::with_capacity(names.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());

        for dependent in callers.get(name).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() < names.len() {
        let blocked: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, _)| *name)
            .collect();
        return Err(FuncsumError::CallGraphCycle {
            cycle: find_cycle(graph, &blocked),
        });
    }

    Ok(order)
}

/// Walk callee edges inside `blocked` until a name repeats
///
/// Every blocked name has at least one blocked callee, so the walk always
/// closes a cycle.
fn find_cycle(graph: &CallGraph, blocked: &BTreeSet<&str>) -> Vec<String> {
    let Some(&start) = blocked.iter().next() else {
        return Vec::new();
    };

    let mut path: Vec<&str> = vec![start];
    let mut position: HashMap<&str, usize> = HashMap::from([(start, 0)]);
    let mut current = start;

    while let Some(next) = graph
        .callees(current)
        .iter()
        .map(String::as_str)
        .find(|callee| blocked.contains(callee))
    {
        if let Some(&idx) = position.get(next) {
            let mut cycle: Vec<String> = path[idx..].iter().map(|s| s.to_string()).collect();
            cycle.push(next.to_string());
            return cycle;
        }
        position.insert(next, path.len());
        path.push(next);
        current = next;
    }

    path.into_iter().map(String::from).collect()
}

enum TreeFrame<'a> {
    Enter(&'a str, usize),
    Exit,
}

/// Indented call tree rooted at `root`, two spaces per level
///
/// A name already on the current path is printed with a `(recursive)` marker
/// and not expanded again.
pub fn render_call_tree(graph: &CallGraph, root: &str) -> String {
    let mut out = String::new();
    let mut path: Vec<&str> = Vec::new();
    let mut stack = vec![TreeFrame::Enter(root, 0)];

    while let Some(frame) = stack.pop() {
        match frame {
            TreeFrame::Enter(name, depth) => {
                let indent = "  ".repeat(depth);
                if path.contains(&name) {
                    let _ = writeln!(out, "{}{} (recursive)", indent, name);
                    continue;
                }
                let _ = writeln!(out, "{}{}", indent, name);

                path.push(name);
                stack.push(TreeFrame::Exit);
                for callee in graph.callees(name).iter().rev() {
                    stack.push(TreeFrame::Enter(callee, depth + 1));
                }
            }
            TreeFrame::Exit => {
                path.pop();
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::Index;

    fn position(order: &[String], name: &str) -> usize {
        order
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("{} missing from order", name))
    }

    #[test]
    fn test_transitive_dependencies() {
        let graph = CallGraph::from_edges([
            ("main", vec!["parse", "run"]),
            ("run", vec!["step", "log"]),
            ("step", vec!["log"]),
            ("unrelated", vec!["log"]),
        ]);

        let deps = transitive_dependencies("main", &graph);
        let expected: BTreeSet<String> = ["parse", "run", "step", "log"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(deps, expected);
        assert!(transitive_dependencies("log", &graph).is_empty());
    }

    #[test]
    fn test_transitive_dependencies_terminates_on_cycle() {
        let graph = CallGraph::from_edges([("x", vec!["y"]), ("y", vec!["x"])]);
        let deps = transitive_dependencies("x", &graph);
        assert_eq!(deps.len(), 2);
        assert!(deps.contains("x"));
    }

    #[test]
    fn test_subgraph_scopes_to_root() {
        let graph = CallGraph::from_edges([
            ("main", vec!["run"]),
            ("run", vec!["leaf"]),
            ("other", vec!["run"]),
        ]);

        let sub = subgraph(&graph, "run");
        let names: Vec<&str> = sub.names().collect();
        assert_eq!(names, vec!["leaf", "run"]);
        assert_eq!(sub.callees("run"), ["leaf"]);
        assert!(sub.callees("leaf").is_empty());
    }

    #[test]
    fn test_subgraph_of_unknown_root() {
        let graph = CallGraph::from_edges([("a", vec!["b"])]);
        let sub = subgraph(&graph, "orphan");
        assert_eq!(sub.len(), 1);
        assert!(sub.contains("orphan"));
    }

    #[test]
    fn test_topological_order_simple() {
        let graph = CallGraph::from_edges([("a", vec!["b"]), ("b", vec![])]);
        assert_eq!(topological_order(&graph).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_topological_order_includes_pure_leaves() {
        let graph = CallGraph::from_edges([("main", vec!["memcpy", "helper"]), ("helper", vec![])]);
        let order = topological_order(&graph).unwrap();
        assert_eq!(order.len(), 3);
        assert!(position(&order, "memcpy") < position(&order, "main"));
        assert!(position(&order, "helper") < position(&order, "main"));
    }

    #[test]
    fn test_topological_order_is_deterministic() {
        let graph = CallGraph::from_edges([("z", Vec::<&str>::new()), ("m", vec![]), ("a", vec![])]);
        assert_eq!(topological_order(&graph).unwrap(), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_direct_cycle_fails() {
        let graph = CallGraph::from_edges([("x", vec!["y"]), ("y", vec!["x"])]);
        match topological_order(&graph) {
            Err(FuncsumError::CallGraphCycle { cycle }) => {
                assert_eq!(cycle, vec!["x", "y", "x"]);
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_recursion_fails() {
        let graph = CallGraph::from_edges([("main", vec!["fact"]), ("fact", vec!["fact"])]);
        match topological_order(&graph) {
            Err(FuncsumError::CallGraphCycle { cycle }) => {
                assert_eq!(cycle, vec!["fact", "fact"]);
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_reported_behind_entry_chain() {
        let graph = CallGraph::from_edges([
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec!["d"]),
            ("d", vec!["c"]),
        ]);
        match topological_order(&graph) {
            Err(FuncsumError::CallGraphCycle { cycle }) => {
                assert_eq!(cycle, vec!["c", "d", "c"]);
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_render_call_tree() {
        let graph = CallGraph::from_edges([
            ("main", vec!["init", "loop"]),
            ("loop", vec!["step"]),
            ("step", vec!["loop"]),
        ]);

        let tree = render_call_tree(&graph, "main");
        assert_eq!(
            tree,
            "main\n  init\n  loop\n    step\n      loop (recursive)\n"
        );
    }

    /// Random DAG: node `i` may only call lower-numbered nodes or its own
    /// external leaf, which keeps every generated graph acyclic.
    fn dag_strategy() -> impl Strategy<Value = CallGraph> {
        prop::collection::vec(prop::collection::vec(any::<Index>(), 0..4), 1..24).prop_map(
            |nodes| {
                let edges = nodes.iter().enumerate().map(|(i, picks)| {
                    let callees: Vec<String> = picks
                        .iter()
                        .map(|pick| {
                            let j = pick.index(i + 1);
                            if j < i {
                                format!("f{}", j)
                            } else {
                                format!("ext{}", i)
                            }
                        })
                        .collect();
                    (format!("f{}", i), callees)
                });
                CallGraph::from_edges(edges)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_topological_order_is_valid(graph in dag_strategy()) {
            let order = topological_order(&graph).unwrap();

            let unique: BTreeSet<&String> = order.iter().collect();
            prop_assert_eq!(unique.len(), order.len());
            prop_assert_eq!(order.len(), graph.all_names().len());

            for (caller, callees) in graph.iter() {
                let caller_pos = position(&order, caller);
                for callee in callees {
                    prop_assert!(position(&order, callee) < caller_pos);
                }
            }
        }

        #[test]
        fn prop_subgraph_is_closed(graph in dag_strategy(), pick in any::<Index>()) {
            let keys: Vec<&str> = graph.names().collect();
            let root = keys[pick.index(keys.len())];

            let sub = subgraph(&graph, root);
            let mut expected = transitive_dependencies(root, &graph);
            expected.insert(root.to_string());

            let actual: BTreeSet<String> = sub.names().map(String::from).collect();
            prop_assert_eq!(&actual, &expected);

            for (caller, callees) in sub.iter() {
                prop_assert!(expected.contains(caller));
                for callee in callees {
                    prop_assert!(expected.contains(callee));
                }
            }
        }
    }
}
