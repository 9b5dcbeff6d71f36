//! `lower_sem_func`: SemFunc → Spindle (`spec.md` §4.6).
//!
//! Each SemBlock gets one REGION (its control-in join) and one PHI over
//! memory (its memory-in join), built two-phase: the region/phi nodes are
//! allocated empty up front so GOTO/BRANCH lowering can reference a
//! not-yet-fully-wired join (this is what makes loop back-edges possible),
//! and `set_region_ins`/`set_phi_ins` install the real predecessor lists
//! only after every block has been walked.

use lousyc_sem::{BlockId, InstData, Place, SemFunc, SemInst, SemOp};

use crate::graph::{NodeId, SbFunc};

struct BlockJoin {
    region: NodeId,
    mem_phi: NodeId,
    ctrl_preds: Vec<NodeId>,
    mem_preds: Vec<NodeId>,
}

/// Lower a checked, reachability-pruned [`SemFunc`] to a Spindle graph.
pub fn lower_sem_func(func: &SemFunc) -> SbFunc {
    let mut sb = SbFunc::new();

    let start = sb.node_start();
    let start_ctrl = sb.node_start_ctrl(start);
    let start_mem = sb.node_start_mem(start);

    let places: Vec<NodeId> = func.place_data.iter().map(|_| sb.node_alloca()).collect();

    let mut joins: Vec<BlockJoin> = func
        .blocks
        .iter()
        .map(|_| BlockJoin {
            region: sb.node_region(),
            mem_phi: sb.node_phi(),
            ctrl_preds: Vec::new(),
            mem_preds: Vec::new(),
        })
        .collect();

    // The entry block's sole predecessor is the function's own start.
    joins[0].ctrl_preds.push(start_ctrl);
    joins[0].mem_preds.push(start_mem);

    let mut exit_ctrls = Vec::new();
    let mut exit_mems = Vec::new();
    let mut exit_vals = Vec::new();

    for block in &func.blocks {
        let id = block.id;
        let ctrl = joins[id.index()].region;
        let mut mem = joins[id.index()].mem_phi;

        for inst in &block.code {
            lower_inst(&mut sb, &places, &mut joins, &mut exit_ctrls, &mut exit_mems, &mut exit_vals, ctrl, &mut mem, inst);
        }

        let already_exits = block
            .code
            .last()
            .is_some_and(|inst| matches!(inst.op, SemOp::Goto | SemOp::Branch | SemOp::Return));

        if !already_exits {
            // Falls off the end of the function without a RETURN.
            let null = sb.node_null();
            exit_ctrls.push(ctrl);
            exit_mems.push(mem);
            exit_vals.push(null);
        }
    }

    for join in &joins {
        sb.set_region_ins(join.region, &join.ctrl_preds);
        sb.set_phi_ins(join.mem_phi, join.region, &join.mem_preds);
    }

    let end_region = sb.node_region();
    sb.set_region_ins(end_region, &exit_ctrls);

    let end_mem = sb.node_phi();
    sb.set_phi_ins(end_mem, end_region, &exit_mems);

    let end_val = sb.node_phi();
    sb.set_phi_ins(end_val, end_region, &exit_vals);

    let escape = sb.node_mem_escape(end_mem);
    sb.node_end(end_region, escape, end_val);

    sb.finish_func();
    sb
}

#[allow(clippy::too_many_arguments)]
fn lower_inst(
    sb: &mut SbFunc,
    places: &[NodeId],
    joins: &mut [BlockJoin],
    exit_ctrls: &mut Vec<NodeId>,
    exit_mems: &mut Vec<NodeId>,
    exit_vals: &mut Vec<NodeId>,
    ctrl: NodeId,
    mem: &mut NodeId,
    inst: &SemInst,
) {
    let read_value = |sb: &mut SbFunc, mem: NodeId, place: Place| sb.node_load(ctrl, mem, places[place_index(place)]);

    let value = match inst.op {
        SemOp::IntegerConst => {
            let InstData::Integer(v) = inst.data else {
                unreachable!("INTEGER_CONST always carries its literal in `data`")
            };
            Some(sb.node_constant(v))
        }
        SemOp::Add | SemOp::Sub | SemOp::Mul | SemOp::Div => {
            let lhs = read_value(sb, *mem, inst.reads[0]);
            let rhs = read_value(sb, *mem, inst.reads[1]);
            Some(match inst.op {
                SemOp::Add => sb.node_add(lhs, rhs),
                SemOp::Sub => sb.node_sub(lhs, rhs),
                SemOp::Mul => sb.node_mul(lhs, rhs),
                SemOp::Div => sb.node_sdiv(lhs, rhs),
                _ => unreachable!(),
            })
        }
        SemOp::Copy => Some(read_value(sb, *mem, inst.reads[0])),
        SemOp::Goto => {
            let InstData::Goto(target) = inst.data else {
                unreachable!("GOTO always carries its target in `data`")
            };
            joins[target.index()].ctrl_preds.push(ctrl);
            joins[target.index()].mem_preds.push(*mem);
            None
        }
        SemOp::Branch => {
            let InstData::Branch(then_b, else_b) = inst.data else {
                unreachable!("BRANCH always carries its targets in `data`")
            };
            let predicate = read_value(sb, *mem, inst.reads[0]);
            let branch = sb.node_branch(ctrl, predicate);
            let on_true = sb.node_branch_true(branch);
            let on_false = sb.node_branch_false(branch);
            push_pred(joins, then_b, on_true, *mem);
            push_pred(joins, else_b, on_false, *mem);
            None
        }
        SemOp::Return => {
            let value = match inst.reads.first() {
                Some(&read) => read_value(sb, *mem, read),
                None => sb.node_null(),
            };
            exit_ctrls.push(ctrl);
            exit_mems.push(*mem);
            exit_vals.push(value);
            None
        }
    };

    if let (Some(write), Some(value)) = (inst.write, value) {
        let store = sb.node_store(ctrl, *mem, places[place_index(write)], value);
        *mem = store;
    }
}

fn push_pred(joins: &mut [BlockJoin], target: BlockId, ctrl: NodeId, mem: NodeId) {
    joins[target.index()].ctrl_preds.push(ctrl);
    joins[target.index()].mem_preds.push(mem);
}

fn place_index(place: Place) -> usize {
    place.0 as usize
}
