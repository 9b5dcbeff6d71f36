//! Dead-store elimination and peephole idealization, alternated to a
//! fixpoint (`spec.md` §4.7). Both are driven by a sparse-set worklist:
//! a dense `packed` array of pending node ids plus an id-indexed `sparse`
//! array giving each one's position in `packed` (or none), for O(1)
//! membership test, insert, and remove-by-id.

use crate::graph::{NodeFlags, NodeId, NodeKind, SbFunc};

struct Worklist {
    packed: Vec<NodeId>,
    sparse: Vec<Option<usize>>,
}

impl Worklist {
    fn new() -> Worklist {
        Worklist { packed: Vec::new(), sparse: Vec::new() }
    }

    fn ensure_capacity(&mut self, id: NodeId) {
        while id.index() >= self.sparse.len() {
            self.sparse.push(None);
        }
    }

    fn add(&mut self, id: NodeId) {
        self.ensure_capacity(id);
        if self.sparse[id.index()].is_none() {
            self.sparse[id.index()] = Some(self.packed.len());
            self.packed.push(id);
        }
    }

    fn remove(&mut self, id: NodeId) {
        if id.index() >= self.sparse.len() {
            return;
        }
        let Some(index) = self.sparse[id.index()] else { return };

        let last = self.packed.pop().expect("sparse entry implies a non-empty packed array");
        self.sparse[id.index()] = None;

        if index < self.packed.len() {
            self.packed[index] = last;
            self.sparse[last.index()] = Some(index);
        } else {
            // `last` *was* the removed entry; nothing left to relocate.
        }
    }

    fn pop(&mut self) -> Option<NodeId> {
        let id = self.packed.pop()?;
        self.sparse[id.index()] = None;
        Some(id)
    }

    fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }
}

fn remove_use(sb: &mut SbFunc, node: NodeId, user: NodeId, index: usize) {
    let node_ref = sb.node_mut(node);
    let pos = node_ref
        .uses
        .iter()
        .position(|u| u.user == user && u.index as usize == index)
        .expect("use must exist on the input it was installed from");
    node_ref.uses.remove(pos);
}

/// Transitively deletes `first` and any input left with no remaining uses,
/// removing every deleted id from the worklist as it goes. This is the only
/// reclamation path: nodes aren't freed, just orphaned from every live edge.
fn remove_node(sb: &mut SbFunc, wl: &mut Worklist, first: NodeId) {
    let mut stack = vec![first];

    while let Some(node) = stack.pop() {
        assert!(sb.node(node).uses.is_empty());
        wl.remove(node);

        let num_ins = sb.node(node).ins.len();
        for i in 0..num_ins {
            let Some(input) = sb.node(node).ins[i] else { continue };
            remove_use(sb, input, node, i);
            if sb.node(input).uses.is_empty() {
                stack.push(input);
            }
        }
    }
}

fn push_uses(wl: &mut Worklist, sb: &SbFunc, node: NodeId) {
    for use_ in &sb.node(node).uses {
        wl.add(use_.user);
    }
}

/// Moves every use of `target` onto `source`, then deletes `target`.
fn replace_node(sb: &mut SbFunc, wl: &mut Worklist, target: NodeId, source: NodeId) {
    assert_ne!(target, source);

    push_uses(wl, sb, target);

    let target_uses = std::mem::take(&mut sb.node_mut(target).uses);
    for use_ in &target_uses {
        assert_eq!(sb.node(use_.user).ins[use_.index as usize], Some(target));
        sb.node_mut(use_.user).ins[use_.index as usize] = Some(source);
    }
    sb.node_mut(source).uses.extend(target_uses);

    remove_node(sb, wl, target);
}

fn idealize_phi(wl: &mut Worklist, sb: &SbFunc, node: NodeId) -> NodeId {
    let ins = &sb.node(node).ins;
    let mut same = None;

    for input in ins.iter().skip(1).flatten() {
        match same {
            None => same = Some(*input),
            Some(s) if s != *input => return node,
            _ => {}
        }
    }

    match same {
        Some(s) => {
            if let Some(region) = ins[0] {
                wl.add(region);
            }
            s
        }
        None => node,
    }
}

fn idealize_region(sb: &SbFunc, node: NodeId) -> NodeId {
    let has_phi_user = sb.node(node).uses.iter().any(|u| sb.node(u.user).kind == NodeKind::Phi);
    if has_phi_user {
        return node;
    }

    let mut same = None;
    for input in sb.node(node).ins.iter().flatten() {
        match same {
            None => same = Some(*input),
            Some(s) if s != *input => return node,
            _ => {}
        }
    }

    same.expect("a region always has at least one input")
}

fn idealize_load(sb: &SbFunc, node: NodeId) -> NodeId {
    let mem = sb.node(node).ins[1].expect("LOAD always has a memory input");
    let mem_node = sb.node(mem);

    if mem_node.kind == NodeKind::Store && mem_node.ins[2] == sb.node(node).ins[2] {
        return mem_node.ins[3].expect("STORE always has a value input");
    }

    node
}

fn idealize(wl: &mut Worklist, sb: &SbFunc, node: NodeId) -> NodeId {
    match sb.node(node).kind {
        NodeKind::Phi => idealize_phi(wl, sb, node),
        NodeKind::Region => idealize_region(sb, node),
        NodeKind::Load => idealize_load(sb, node),
        _ => node,
    }
}

fn peeps(sb: &mut SbFunc, wl: &mut Worklist) {
    while let Some(node) = wl.pop() {
        let ideal = idealize(wl, sb, node);
        if ideal != node {
            replace_node(sb, wl, node, ideal);
        }
    }
}

/// Backward memory-edge propagation of "reads" from every `READS_MEM` node;
/// any STORE never marked is dead and is spliced out of the memory chain.
fn dead_store_elim(sb: &mut SbFunc, wl: &mut Worklist) {
    let order = sb.post_order_walk_ins();

    let mut reads = vec![false; sb.len()];
    let mut stack = Vec::new();
    let mut stores = Vec::new();

    for &id in &order {
        let node = sb.node(id);
        if node.flags.contains(NodeFlags::READS_MEM) {
            assert!(node.flags.contains(NodeFlags::HAS_MEM_DEP));
            stack.push(id);
        }
        if node.kind == NodeKind::Store {
            stores.push(id);
        }
    }

    while let Some(id) = stack.pop() {
        if reads[id.index()] {
            continue;
        }
        reads[id.index()] = true;

        let node = sb.node(id);
        if node.kind == NodeKind::Phi {
            for input in node.ins.iter().skip(1).flatten() {
                stack.push(*input);
            }
        } else if node.flags.contains(NodeFlags::HAS_MEM_DEP) {
            if let Some(mem) = node.ins[1] {
                stack.push(mem);
            }
        }
    }

    for store in stores {
        if reads[store.index()] {
            continue;
        }
        let mem_input = sb.node(store).ins[1].expect("STORE always has a memory input");
        replace_node(sb, wl, store, mem_input);
    }
}

/// Alternates dead-store elimination and peephole idealization until the
/// worklist empties with nothing left for DSE to find.
pub fn sb_opt(sb: &mut SbFunc) {
    let mut wl = Worklist::new();

    for id in sb.post_order_walk_ins() {
        wl.add(id);
    }

    loop {
        dead_store_elim(sb, &mut wl);

        if wl.is_empty() {
            break;
        }
        peeps(sb, &mut wl);
    }
}
