//! Textual Sem IR dump: `bb_<id>:` blocks of `_<write> = <OP> <reads...>`
//! lines, matching `print_sem_func`'s layout.

use std::fmt::Write as _;

use crate::ir::{InstData, SemFunc, SemInst};

fn write_inst(out: &mut String, inst: &SemInst) {
    out.push_str("  ");

    if let Some(write) = inst.write {
        let _ = write!(out, "_{:<3} = ", write.0);
    } else {
        let _ = write!(out, "{:7}", "");
    }

    let _ = write!(out, "{} ", inst.op.label());

    for (i, read) in inst.reads.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "_{}", read.0);
    }

    match inst.data {
        InstData::Integer(v) => {
            let _ = write!(out, "{v}");
        }
        InstData::Goto(target) => {
            let _ = write!(out, "bb_{}", target.0);
        }
        InstData::Branch(then_b, else_b) => {
            let _ = write!(out, " [bb_{}, bb_{}]", then_b.0, else_b.0);
        }
        InstData::None => {}
    }

    out.push('\n');
}

/// Render `func` as `bb_<id>:` blocks of `_<write> = <OP> <reads...>` lines.
pub fn print_sem_func(func: &SemFunc) -> String {
    let mut out = String::new();

    for block in &func.blocks {
        let _ = writeln!(out, "bb_{}:", block.id.0);
        for inst in &block.code {
            write_inst(&mut out, inst);
        }
    }

    out
}
