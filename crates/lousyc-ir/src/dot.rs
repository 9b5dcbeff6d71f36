//! GraphViz DOT emission for a [`SbFunc`] (`spec.md` §4.5, §6). Projections
//! are inlined as sub-cells of their parent's HTML-table label rather than
//! drawn as their own nodes; CFG nodes are filled yellow; edges carry a
//! `taillabel` equal to their input index; `START`'s non-projection edges
//! are suppressed to keep the anchor clutter out of the picture.

use std::fmt::Write as _;

use crate::graph::{NodeData, NodeFlags, NodeKind, SbFunc, SbNode};

fn gv_label(node: &SbNode) -> String {
    match node.data {
        NodeData::Constant(value) => value.to_string(),
        NodeData::None => node.kind.label().to_string(),
    }
}

/// Render `func` as a single `digraph G { rankdir=BT; subgraph cluster {...} }`.
pub fn write_graphviz(func: &SbFunc) -> String {
    let mut out = String::new();
    let order = func.post_order_walk_ins();

    out.push_str("digraph G {\n");
    out.push_str("  rankdir=BT;\n");
    out.push_str("  subgraph cluster {\n");

    for id in order {
        let node = func.node(id);

        if node.flags.contains(NodeFlags::IS_PROJ) {
            continue;
        }

        let has_proj = node
            .uses
            .iter()
            .any(|u| func.node(u.user).flags.contains(NodeFlags::IS_PROJ));

        let _ = write!(out, "    n{} [", id.raw());

        let label = gv_label(node);

        if !has_proj {
            if node.flags.contains(NodeFlags::IS_CFG) {
                out.push_str("style=filled,fillcolor=yellow,");
            }
            let _ = write!(out, "label=\"{label}\"");
        } else {
            out.push_str(
                "shape=plaintext, label=<<table border=\"0\" cellborder=\"1\" cellspacing=\"0\" cellpadding=\"4\">",
            );

            let _ = write!(
                out,
                "<tr><td{}>",
                if node.flags.contains(NodeFlags::IS_CFG) { " bgcolor=\"yellow\"" } else { "" }
            );
            let _ = write!(out, "{label}</td></tr>");

            out.push_str("<tr><td>");
            out.push_str("<table border=\"0\" cellborder=\"1\" cellspacing=\"0\" cellpadding=\"4\">");
            out.push_str("<tr>");

            for use_ in &node.uses {
                let user = func.node(use_.user);
                if !user.flags.contains(NodeFlags::IS_PROJ) {
                    continue;
                }

                let _ = write!(
                    out,
                    "<td{}",
                    if user.flags.contains(NodeFlags::IS_CFG) { " bgcolor=\"yellow\"" } else { "" }
                );
                let _ = write!(out, " port=\"p{0}\">{0}</td>", user.kind.label());
            }

            out.push_str("</tr>");
            out.push_str("</table>");
            out.push_str("</td></tr>");
            out.push_str("</table>>");
        }

        out.push_str("];\n");

        for (j, input) in node.ins.iter().enumerate() {
            let Some(input) = input else { continue };
            let input_node = func.node(*input);

            if input_node.kind == NodeKind::Start && !node.flags.contains(NodeFlags::IS_PROJ) {
                continue;
            }

            let _ = write!(out, "    n{} -> ", id.raw());

            if input_node.flags.contains(NodeFlags::IS_PROJ) {
                let parent = input_node.ins[0].expect("a projection always has a parent input");
                let _ = write!(out, "n{}:p{}", parent.raw(), input_node.kind.label());
            } else {
                let _ = write!(out, "n{}", input.raw());
            }

            let _ = writeln!(out, "[taillabel=\"{j}\"];");
        }
    }

    out.push_str("  }\n");
    out.push_str("}\n");
    out
}
