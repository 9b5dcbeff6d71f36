//! The Sem IR: a per-function CFG of three-address instructions over
//! `Place` ids (`spec.md` §3 "SemBlock"/"SemInst").

use lousyc_syntax::Token;

/// An SSA-ish value slot. Unlike the original's `SEM_NULL_PLACE` sentinel,
/// "no write" is represented with `Option<Place>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Place(pub u32);

/// Index into [`SemFunc::blocks`]. Blocks are only ever appended, in
/// creation order, so the index doubles as the original's emission-order
/// block id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemOp {
    IntegerConst,
    Add,
    Sub,
    Mul,
    Div,
    Copy,
    Goto,
    Branch,
    Return,
}

impl SemOp {
    pub fn label(self) -> &'static str {
        match self {
            SemOp::IntegerConst => "INTEGER_CONST",
            SemOp::Add => "ADD",
            SemOp::Sub => "SUB",
            SemOp::Mul => "MUL",
            SemOp::Div => "DIV",
            SemOp::Copy => "COPY",
            SemOp::Goto => "GOTO",
            SemOp::Branch => "BRANCH",
            SemOp::Return => "RETURN",
        }
    }
}

/// The op-specific payload the original keeps behind an opaque `void*`.
#[derive(Debug, Clone, Copy)]
pub enum InstData {
    None,
    Integer(u64),
    Goto(BlockId),
    Branch(BlockId, BlockId),
}

#[derive(Debug, Clone)]
pub struct SemInst {
    pub op: SemOp,
    pub token: Token,
    pub reads: Vec<Place>,
    pub write: Option<Place>,
    pub data: InstData,
}

impl SemInst {
    pub fn is_terminator(&self) -> bool {
        matches!(self.op, SemOp::Goto | SemOp::Branch)
    }
}

/// Placeholder for future per-place type information. The original's
/// `SemPlaceData` is likewise an empty struct today (`front.h`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceData;

#[derive(Debug, Clone, Default)]
pub struct SemBlock {
    pub id: BlockId,
    pub code: Vec<SemInst>,
    /// Set once a real (non-synthesized) statement emits into this block.
    /// Blocks minted purely for control-flow joins start `false`
    /// (`spec.md` §4.4).
    pub contains_usercode: bool,
}

impl SemBlock {
    pub fn terminator(&self) -> Option<&SemInst> {
        self.code.last().filter(|inst| inst.is_terminator())
    }

    /// Successor blocks derived from this block's terminator, if any
    /// (`spec.md` §4.4).
    pub fn successors(&self) -> Vec<BlockId> {
        match self.terminator().map(|inst| &inst.data) {
            Some(InstData::Goto(target)) => vec![*target],
            Some(InstData::Branch(then_b, else_b)) => vec![*then_b, *else_b],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SemFunc {
    pub blocks: Vec<SemBlock>,
    pub place_data: Vec<PlaceData>,
}

impl SemFunc {
    pub fn block(&self, id: BlockId) -> &SemBlock {
        &self.blocks[id.index()]
    }
}
