//! Orders a chip's parts so that, within one `evaluate()` pass, every part
//! is stepped after the parts whose outputs it reads (§4.7 point 5).
//!
//! A sequential part's output is already fixed for the duration of a pass —
//! its `evaluate()` is a no-op, per [`n2t_hdl_gates::GateInstance`]'s default
//! — so edges into or out of a sequential part impose no ordering
//! requirement at all. Dropping them both breaks cycles that loop back
//! through a register (the legal case) and gives every remaining edge set a
//! well-defined topological order when none does.

use std::collections::BTreeMap;

use crate::blueprint::{PartPlan, Signal};

/// Computes an evaluation order for `parts`, or the net names forming a
/// purely combinational cycle if one exists.
pub fn topo_sort(parts: &[PartPlan]) -> Result<Vec<usize>, Vec<String>> {
    let n = parts.len();
    let is_sequential: Vec<bool> = parts.iter().map(|p| p.class.instantiate().is_sequential()).collect();

    let mut writers: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut readers: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, part) in parts.iter().enumerate() {
        for binding in &part.bindings {
            if let Signal::Internal { name, .. } = &binding.signal {
                if binding.is_part_input {
                    readers.entry(name.as_str()).or_default().push(idx);
                } else {
                    writers.entry(name.as_str()).or_default().push(idx);
                }
            }
        }
    }

    // edge (writer -> reader) means "writer must run first"
    let mut edges: Vec<(usize, usize, &str)> = Vec::new();
    for (&net, ws) in &writers {
        if let Some(rs) = readers.get(net) {
            for &w in ws {
                for &r in rs {
                    if w != r {
                        edges.push((w, r, net));
                    }
                }
            }
        }
    }

    let reduced: Vec<(usize, usize, &str)> =
        edges.iter().copied().filter(|&(w, r, _)| !is_sequential[w] && !is_sequential[r]).collect();

    if let Some(nets) = find_cycle(n, &reduced) {
        return Err(nets);
    }

    Ok(kahn_order(n, &reduced))
}

fn find_cycle(n: usize, edges: &[(usize, usize, &str)]) -> Option<Vec<String>> {
    let mut adj: Vec<Vec<(usize, &str)>> = vec![Vec::new(); n];
    for &(w, r, net) in edges {
        adj[w].push((r, net));
    }

    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        OnStack,
        Done,
    }
    let mut state = vec![State::Unvisited; n];
    let mut path_nets: Vec<&str> = Vec::new();
    let mut stack_pos: Vec<usize> = Vec::new();

    fn visit<'a>(
        node: usize,
        adj: &[Vec<(usize, &'a str)>],
        state: &mut [State],
        stack_pos: &mut Vec<usize>,
        path_nets: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        state[node] = State::OnStack;
        stack_pos.push(node);
        for &(next, net) in &adj[node] {
            match state[next] {
                State::Unvisited => {
                    path_nets.push(net);
                    if let Some(found) = visit(next, adj, state, stack_pos, path_nets) {
                        return Some(found);
                    }
                    path_nets.pop();
                },
                State::OnStack => {
                    let start = stack_pos.iter().position(|&n| n == next).unwrap();
                    let mut nets: Vec<String> =
                        path_nets[start..].iter().map(|s| s.to_string()).collect();
                    nets.push(net.to_string());
                    nets.dedup();
                    return Some(nets);
                },
                State::Done => {},
            }
        }
        state[node] = State::Done;
        stack_pos.pop();
        None
    }

    for start in 0..n {
        if state[start] == State::Unvisited {
            if let Some(nets) = visit(start, &adj, &mut state, &mut stack_pos, &mut path_nets) {
                return Some(nets);
            }
        }
    }
    None
}

fn kahn_order(n: usize, edges: &[(usize, usize, &str)]) -> Vec<usize> {
    let mut in_degree = vec![0usize; n];
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(w, r, _) in edges {
        adj[w].push(r);
        in_degree[r] += 1;
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    let mut cursor = 0;
    while cursor < ready.len() {
        let node = ready[cursor];
        cursor += 1;
        order.push(node);
        for &next in &adj[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(next);
            }
        }
    }
    debug_assert_eq!(order.len(), n, "reduced graph must be acyclic by construction");
    order
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use n2t_hdl_core::PinSpec;
    use n2t_hdl_gates::Registry;

    use super::*;
    use crate::blueprint::ArgBinding;

    fn part(gate: &str, registry: &Registry, bindings: Vec<ArgBinding>) -> PartPlan {
        PartPlan { gate_name: gate.into(), class: registry.get(gate).unwrap(), bindings }
    }

    fn internal(name: &str, size: u32, is_part_input: bool, part_pin: &str) -> ArgBinding {
        ArgBinding {
            part_pin: part_pin.into(),
            part_pin_width: size,
            is_part_input,
            signal: Signal::Internal { name: name.into(), from: 0, to: size - 1 },
        }
    }

    #[test]
    fn a_chain_orders_writer_before_reader() {
        let registry = Registry::with_builtins();
        // Not(a) -> n ; Not(n) -> out : out part must come after n part.
        let first = part(
            "Not",
            &registry,
            vec![
                internal("a", 1, true, "in"),
                internal("n", 1, false, "out"),
            ],
        );
        let second = part(
            "Not",
            &registry,
            vec![
                internal("n", 1, true, "in"),
                internal("out", 1, false, "out"),
            ],
        );
        let parts = vec![second, first];
        let order = topo_sort(&parts).expect("acyclic");
        let pos_of = |idx: usize| order.iter().position(|&i| i == idx).unwrap();
        assert!(pos_of(1) < pos_of(0), "the writer of 'n' must precede its reader");
    }

    #[test]
    fn a_purely_combinational_cycle_is_rejected() {
        let registry = Registry::with_builtins();
        let a = part(
            "Not",
            &registry,
            vec![internal("y", 1, true, "in"), internal("x", 1, false, "out")],
        );
        let b = part(
            "Not",
            &registry,
            vec![internal("x", 1, true, "in"), internal("y", 1, false, "out")],
        );
        let parts = vec![a, b];
        assert!(topo_sort(&parts).is_err());
    }

    #[test]
    fn a_cycle_through_a_register_is_permitted() {
        let registry = Registry::with_builtins();
        let register = part(
            "Register",
            &registry,
            vec![
                internal("sum", 16, true, "in"),
                internal("one", 1, true, "load"),
                internal("held", 16, false, "out"),
            ],
        );
        let adder = part(
            "Add16",
            &registry,
            vec![
                internal("held", 16, true, "a"),
                internal("held", 16, true, "b"),
                internal("sum", 16, false, "out"),
            ],
        );
        let parts = vec![register, adder];
        assert!(topo_sort(&parts).is_ok());
    }
}
