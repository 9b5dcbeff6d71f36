//! The Spindle graph: a typed, arena-owned node set with singly-linked-list
//! use-chains (`spec.md` §4.5). Node identity is an arena index rather than
//! a pointer; edges are `Option<NodeId>` so REGION/PHI can be allocated
//! empty and wired up once their predecessors are known (`spec.md` §9,
//! "cyclic graphs with two-phase construction").

/// An index into [`SbFunc::nodes`]. Doubles as the original's monotonic,
/// arena-assigned node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    StartCtrl,
    StartMem,
    End,
    Null,
    Region,
    Phi,
    Branch,
    BranchTrue,
    BranchFalse,
    Store,
    Load,
    MemEscape,
    Alloca,
    Constant,
    Add,
    Sub,
    Mul,
    Sdiv,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Start => "START",
            NodeKind::StartCtrl => "START_CTRL",
            NodeKind::StartMem => "START_MEM",
            NodeKind::End => "END",
            NodeKind::Null => "NULL",
            NodeKind::Region => "REGION",
            NodeKind::Phi => "PHI",
            NodeKind::Branch => "BRANCH",
            NodeKind::BranchTrue => "BRANCH_TRUE",
            NodeKind::BranchFalse => "BRANCH_FALSE",
            NodeKind::Store => "STORE",
            NodeKind::Load => "LOAD",
            NodeKind::MemEscape => "MEM_ESCAPE",
            NodeKind::Alloca => "ALLOCA",
            NodeKind::Constant => "CONSTANT",
            NodeKind::Add => "ADD",
            NodeKind::Sub => "SUB",
            NodeKind::Mul => "MUL",
            NodeKind::Sdiv => "SDIV",
        }
    }
}

/// Bitset of `{IS_PROJ, IS_CFG, READS_MEM, HAS_MEM_DEP}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const NONE: NodeFlags = NodeFlags(0);
    pub const IS_PROJ: NodeFlags = NodeFlags(1 << 0);
    pub const IS_CFG: NodeFlags = NodeFlags(1 << 1);
    pub const READS_MEM: NodeFlags = NodeFlags(1 << 2);
    pub const HAS_MEM_DEP: NodeFlags = NodeFlags(1 << 3);

    pub fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for NodeFlags {
    type Output = NodeFlags;
    fn bitor(self, rhs: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for NodeFlags {
    fn bitor_assign(&mut self, rhs: NodeFlags) {
        self.0 |= rhs.0;
    }
}

/// One entry of a node's use-chain: `node.ins[index] == user` in some node
/// whose id is `user`.
#[derive(Debug, Clone, Copy)]
pub struct Use {
    pub user: NodeId,
    pub index: u32,
}

/// The op-specific payload the original keeps behind `DATA(node, ty)`.
#[derive(Debug, Clone, Copy)]
pub enum NodeData {
    None,
    Constant(u64),
}

#[derive(Debug, Clone)]
pub struct SbNode {
    pub id: NodeId,
    pub flags: NodeFlags,
    pub kind: NodeKind,
    pub ins: Vec<Option<NodeId>>,
    pub uses: Vec<Use>,
    pub data: NodeData,
}

/// One function's Spindle graph. Node storage doubles as the original's
/// context-owned arena; there is exactly one `SB_Func` per translation
/// unit, so a separate context type buys nothing here.
#[derive(Debug, Default)]
pub struct SbFunc {
    nodes: Vec<SbNode>,
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

impl SbFunc {
    pub fn new() -> SbFunc {
        SbFunc::default()
    }

    pub fn node(&self, id: NodeId) -> &SbNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SbNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    fn new_node_with_data(&mut self, kind: NodeKind, num_ins: usize, data: NodeData) -> NodeId {
        assert!(
            matches!(kind, NodeKind::Start | NodeKind::Phi | NodeKind::Region) || num_ins != 0,
            "{kind:?} must have at least one input"
        );

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SbNode {
            id,
            flags: NodeFlags::NONE,
            kind,
            ins: vec![None; num_ins],
            uses: Vec::new(),
            data,
        });
        id
    }

    fn new_node(&mut self, kind: NodeKind, num_ins: usize) -> NodeId {
        self.new_node_with_data(kind, num_ins, NodeData::None)
    }

    /// Installs `input` as `node.ins[index]`, pushing a matching [`Use`] onto
    /// `input`'s use-chain. Panics if the slot is already filled or doesn't
    /// exist (an internal invariant violation, not a user-reportable error).
    fn set_input(&mut self, node: NodeId, index: usize, input: NodeId) {
        assert!(index < self.nodes[node.index()].ins.len());
        assert!(self.nodes[node.index()].ins[index].is_none());

        self.nodes[node.index()].ins[index] = Some(input);
        self.nodes[input.index()].uses.insert(0, Use { user: node, index: index as u32 });
    }

    /// A node with a single input anchored to `func.start`, so it stays
    /// reachable even with no other users (e.g. ALLOCA, NULL).
    fn new_leaf(&mut self, kind: NodeKind, data: NodeData) -> NodeId {
        let start = self.start.expect("new_leaf requires sb_node_start to have run");
        let node = self.new_node_with_data(kind, 1, data);
        self.set_input(node, 0, start);
        node
    }

    fn new_proj(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let node = self.new_node(kind, 1);
        self.nodes[node.index()].flags |= NodeFlags::IS_PROJ;
        self.set_input(node, 0, parent);
        node
    }

    pub fn node_start(&mut self) -> NodeId {
        assert!(self.start.is_none());
        let id = self.new_node(NodeKind::Start, 0);
        self.nodes[id.index()].flags |= NodeFlags::IS_CFG;
        self.start = Some(id);
        id
    }

    pub fn node_start_ctrl(&mut self, start: NodeId) -> NodeId {
        assert_eq!(self.node(start).kind, NodeKind::Start);
        let id = self.new_proj(NodeKind::StartCtrl, start);
        self.nodes[id.index()].flags |= NodeFlags::IS_CFG;
        id
    }

    pub fn node_start_mem(&mut self, start: NodeId) -> NodeId {
        assert_eq!(self.node(start).kind, NodeKind::Start);
        self.new_proj(NodeKind::StartMem, start)
    }

    pub fn node_end(&mut self, ctrl: NodeId, mem: NodeId, return_value: NodeId) -> NodeId {
        assert!(self.end.is_none());
        let id = self.new_node(NodeKind::End, 3);
        self.set_input(id, 0, ctrl);
        self.set_input(id, 1, mem);
        self.set_input(id, 2, return_value);
        self.nodes[id.index()].flags |= NodeFlags::IS_CFG;
        self.end = Some(id);
        id
    }

    pub fn node_null(&mut self) -> NodeId {
        self.new_leaf(NodeKind::Null, NodeData::None)
    }

    pub fn node_region(&mut self) -> NodeId {
        let id = self.new_node(NodeKind::Region, 0);
        self.nodes[id.index()].flags |= NodeFlags::IS_CFG;
        id
    }

    /// Installs `region`'s control predecessors. Two-phase: `node_region`
    /// allocates the node empty so loop headers can reference it before its
    /// own predecessors (the back edge) exist.
    pub fn set_region_ins(&mut self, region: NodeId, ins: &[NodeId]) {
        assert!(!ins.is_empty());
        assert_eq!(self.node(region).kind, NodeKind::Region);
        assert!(self.node(region).ins.is_empty(), "region ins already installed");

        self.nodes[region.index()].ins = vec![None; ins.len()];
        for (i, input) in ins.iter().enumerate() {
            self.set_input(region, i, *input);
        }
    }

    pub fn node_phi(&mut self) -> NodeId {
        self.new_node(NodeKind::Phi, 0)
    }

    /// Installs `phi.ins[0] = region` and `phi.ins[i+1] = ins[i]`. A PHI
    /// does not record its region until this call installs it (`spec.md`
    /// §9): validators must not assume `ins[0]` is populated before this
    /// runs. The region-kind assertion checks `region.kind == Region`, not
    /// `Phi` (`spec.md` §9).
    pub fn set_phi_ins(&mut self, phi: NodeId, region: NodeId, ins: &[NodeId]) {
        assert_eq!(self.node(phi).kind, NodeKind::Phi);
        assert_eq!(self.node(region).kind, NodeKind::Region);
        assert_eq!(ins.len(), self.node(region).ins.len());
        assert!(self.node(phi).ins.is_empty(), "phi ins already installed");

        self.nodes[phi.index()].ins = vec![None; ins.len() + 1];
        self.set_input(phi, 0, region);
        for (i, input) in ins.iter().enumerate() {
            self.set_input(phi, i + 1, *input);
        }
    }

    pub fn node_branch(&mut self, ctrl: NodeId, predicate: NodeId) -> NodeId {
        let id = self.new_node(NodeKind::Branch, 2);
        self.set_input(id, 0, ctrl);
        self.set_input(id, 1, predicate);
        self.nodes[id.index()].flags = NodeFlags::IS_CFG;
        id
    }

    pub fn node_branch_true(&mut self, branch: NodeId) -> NodeId {
        assert_eq!(self.node(branch).kind, NodeKind::Branch);
        let id = self.new_proj(NodeKind::BranchTrue, branch);
        self.nodes[id.index()].flags |= NodeFlags::IS_CFG;
        id
    }

    pub fn node_branch_false(&mut self, branch: NodeId) -> NodeId {
        assert_eq!(self.node(branch).kind, NodeKind::Branch);
        let id = self.new_proj(NodeKind::BranchFalse, branch);
        self.nodes[id.index()].flags |= NodeFlags::IS_CFG;
        id
    }

    pub fn node_store(&mut self, ctrl: NodeId, mem: NodeId, address: NodeId, value: NodeId) -> NodeId {
        let id = self.new_node(NodeKind::Store, 4);
        self.set_input(id, 0, ctrl);
        self.set_input(id, 1, mem);
        self.set_input(id, 2, address);
        self.set_input(id, 3, value);
        self.nodes[id.index()].flags |= NodeFlags::HAS_MEM_DEP;
        id
    }

    pub fn node_load(&mut self, ctrl: NodeId, mem: NodeId, address: NodeId) -> NodeId {
        let id = self.new_node(NodeKind::Load, 3);
        self.set_input(id, 0, ctrl);
        self.set_input(id, 1, mem);
        self.set_input(id, 2, address);
        self.nodes[id.index()].flags |= NodeFlags::READS_MEM | NodeFlags::HAS_MEM_DEP;
        id
    }

    /// `ins[0]` is intentionally left unset; only the memory input is wired
    /// (`spec.md` §9). Downstream walks must tolerate the null `ins` entry.
    pub fn node_mem_escape(&mut self, mem: NodeId) -> NodeId {
        let id = self.new_node(NodeKind::MemEscape, 2);
        self.set_input(id, 1, mem);
        self.nodes[id.index()].flags |= NodeFlags::READS_MEM | NodeFlags::HAS_MEM_DEP;
        id
    }

    pub fn node_alloca(&mut self) -> NodeId {
        self.new_leaf(NodeKind::Alloca, NodeData::None)
    }

    pub fn node_constant(&mut self, value: u64) -> NodeId {
        self.new_leaf(NodeKind::Constant, NodeData::Constant(value))
    }

    pub fn node_add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.binary(NodeKind::Add, lhs, rhs)
    }

    pub fn node_sub(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.binary(NodeKind::Sub, lhs, rhs)
    }

    pub fn node_mul(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.binary(NodeKind::Mul, lhs, rhs)
    }

    pub fn node_sdiv(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.binary(NodeKind::Sdiv, lhs, rhs)
    }

    fn binary(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.new_node(kind, 2);
        self.set_input(id, 0, lhs);
        self.set_input(id, 1, rhs);
        id
    }

    /// Explicit-stack post-order walk over `ins`, starting from `end`. The
    /// visited set this produces *is* "reachable from END" (`spec.md` §4.5).
    pub fn post_order_walk_ins(&self) -> Vec<NodeId> {
        let end = self.end.expect("post_order_walk_ins requires an end node");

        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(false, end)];

        while let Some((children_processed, node)) = stack.pop() {
            if !children_processed {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                stack.push((true, node));

                for input in &self.nodes[node.index()].ins {
                    if let Some(input) = input {
                        stack.push((false, *input));
                    }
                }
            } else {
                order.push(node);
            }
        }

        order
    }

    /// Asserts START is reachable from END ("function never terminates"
    /// otherwise) and prunes every use-record whose user fell out of the
    /// reachable set (`spec.md` §4.5).
    pub fn finish_func(&mut self) {
        assert!(self.start.is_some());
        assert!(self.end.is_some());

        let order = self.post_order_walk_ins();
        let mut reachable = vec![false; self.nodes.len()];
        for id in &order {
            reachable[id.index()] = true;
        }

        assert!(
            reachable[self.start.unwrap().index()],
            "function never terminates"
        );

        for id in &order {
            self.nodes[id.index()].uses.retain(|u| reachable[u.user.index()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trivial_func() -> SbFunc {
        let mut f = SbFunc::new();
        let start = f.node_start();
        let ctrl = f.node_start_ctrl(start);
        let mem = f.node_start_mem(start);
        let val = f.node_null();
        let escape = f.node_mem_escape(mem);
        f.node_end(ctrl, escape, val);
        f
    }

    #[test]
    fn start_and_end_are_wired_and_reachable() {
        let f = trivial_func();
        let order = f.post_order_walk_ins();
        assert!(order.contains(&f.start.unwrap()));
        assert!(order.contains(&f.end.unwrap()));
    }

    #[test]
    fn mem_escape_leaves_ins0_unset() {
        let mut f = SbFunc::new();
        let start = f.node_start();
        let mem = f.node_start_mem(start);
        let escape = f.node_mem_escape(mem);
        assert!(f.node(escape).ins[0].is_none());
        assert_eq!(f.node(escape).ins[1], Some(mem));
    }

    #[test]
    fn phi_has_no_ins_until_set_phi_ins_runs() {
        let mut f = SbFunc::new();
        let phi = f.node_phi();
        assert!(f.node(phi).ins.is_empty());

        let region = f.node_region();
        let start = f.node_start();
        f.set_region_ins(region, &[start]);
        f.set_phi_ins(phi, region, &[start]);
        assert_eq!(f.node(phi).ins.len(), 2);
        assert_eq!(f.node(phi).ins[0], Some(region));
    }

    #[test]
    #[should_panic]
    fn set_phi_ins_rejects_a_non_region_controller() {
        let mut f = SbFunc::new();
        let start = f.node_start();
        let phi = f.node_phi();
        let not_a_region = f.node_phi();
        f.set_phi_ins(phi, not_a_region, &[start]);
    }

    #[test]
    fn finish_func_prunes_uses_of_unreachable_users() {
        let mut f = SbFunc::new();
        let start = f.node_start();
        let ctrl = f.node_start_ctrl(start);
        let mem = f.node_start_mem(start);

        // An orphan node with a use on `mem` that never becomes reachable
        // from `end`.
        let orphan_addr = f.node_alloca();
        let _orphan_load = f.node_load(ctrl, mem, orphan_addr);

        let val = f.node_null();
        let escape = f.node_mem_escape(mem);
        f.node_end(ctrl, escape, val);

        f.finish_func();

        // `mem`'s use-chain should only retain the use from the reachable
        // `mem_escape`, not the orphaned load.
        assert_eq!(f.node(mem).uses.len(), 1);
    }

    #[test]
    #[should_panic]
    fn finish_func_asserts_start_is_reachable() {
        // `node_start` is called (so `func.start` is set), but `end`'s
        // transitive `ins` never touch it: two regions feeding each other
        // and nothing else, no leaf (which would anchor back to start).
        let mut f = SbFunc::new();
        let _start = f.node_start();

        let region_a = f.node_region();
        let region_b = f.node_region();
        f.set_region_ins(region_a, &[region_b]);
        f.set_region_ins(region_b, &[region_a]);

        f.node_end(region_a, region_b, region_a);
        f.finish_func();
    }
}
