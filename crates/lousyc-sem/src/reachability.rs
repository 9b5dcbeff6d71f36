//! Dead-block elimination: walk the CFG from the entry block, splice out
//! everything unreached, and fail if any pruned block held real statements
//! (`spec.md` §4.4).

use crate::error::ReachabilityError;
use crate::ir::{BlockId, InstData, SemFunc};

/// Prune unreachable blocks from `func`, renumbering the survivors in
/// depth-first visit order. Fails if a pruned block's `contains_usercode`
/// flag is set.
pub fn check_reachability(func: SemFunc) -> Result<SemFunc, ReachabilityError> {
    let n = func.blocks.len();
    let mut visited = vec![false; n];
    let mut order = Vec::new();
    let mut stack = vec![BlockId(0)];
    visited[0] = true;

    while let Some(id) = stack.pop() {
        order.push(id);
        for succ in func.block(id).successors().into_iter().rev() {
            if !visited[succ.index()] {
                visited[succ.index()] = true;
                stack.push(succ);
            }
        }
    }

    for (i, block) in func.blocks.iter().enumerate() {
        if !visited[i] && block.contains_usercode {
            let token = block
                .code
                .first()
                .expect("contains_usercode implies non-empty code")
                .token;
            return Err(ReachabilityError { token });
        }
    }

    let mut remap = vec![None; n];
    for (new_id, old_id) in order.iter().enumerate() {
        remap[old_id.index()] = Some(BlockId(new_id as u32));
    }

    let mut new_blocks = Vec::with_capacity(order.len());
    for old_id in order {
        let mut block = func.blocks[old_id.index()].clone();
        block.id = remap[old_id.index()].unwrap();

        for inst in &mut block.code {
            match &mut inst.data {
                InstData::Goto(target) => {
                    *target = remap[target.index()].expect("goto targets a reachable block");
                }
                InstData::Branch(then_b, else_b) => {
                    *then_b = remap[then_b.index()].expect("branch then-target is reachable");
                    *else_b = remap[else_b.index()].expect("branch else-target is reachable");
                }
                InstData::None | InstData::Integer(_) => {}
            }
        }

        new_blocks.push(block);
    }

    Ok(SemFunc {
        blocks: new_blocks,
        place_data: func.place_data,
    })
}
