//! Doxygen rendering of an annotated declaration tree.
//!
//! Every file becomes one `/** ... */` block holding a page with a section
//! per top-level declaration. Messages and enums are HTML tables whose
//! caption id is the fully-qualified name, which is what `@ref` targets.

use dox_tree::{FieldNode, FieldType, FileUnit, Node, NodeId, NodeKind};

use crate::Options;

pub fn render_file(unit: &FileUnit, options: &Options) -> String {
    let mut doc = String::new();
    doc.push_str("/**\n");
    doc.push_str(&command("file", &unit.name));
    doc.push_str(&command("page", &unit.name));
    doc.push_str(&command("tableofcontents", ""));
    doc.push_str(&command(
        "section",
        &format!("{} {}", file_label(&unit.name), base_name(&unit.name)),
    ));

    let renderer = Renderer { unit, options };
    for &id in &unit.enums {
        renderer.render_enum(&mut doc, id, 0);
    }
    for &id in &unit.messages {
        renderer.render_message(&mut doc, id, 0);
    }

    doc.push_str(" */\n");
    doc
}

struct Renderer<'a> {
    unit: &'a FileUnit,
    options: &'a Options,
}

impl Renderer<'_> {
    fn render_message(&self, doc: &mut String, id: NodeId, depth: usize) {
        let node = self.unit.node(id);
        let NodeKind::Message(message) = &node.kind else {
            return;
        };

        self.section_header(doc, node, depth);
        doc.push_str(&header_row(&["Name", "Label", "Id", "Type", "Description"]));

        let mut current_oneof: Option<usize> = None;
        for &field_id in &message.fields {
            let field_node = self.unit.node(field_id);
            let NodeKind::Field(field) = &field_node.kind else {
                continue;
            };

            match field.oneof.filter(|&idx| !self.is_synthetic(&message.oneofs, idx)) {
                Some(idx) => {
                    if current_oneof != Some(idx) {
                        current_oneof = Some(idx);
                        if let Some(&oneof_id) = message.oneofs.get(idx) {
                            doc.push_str(&self.oneof_row(self.unit.node(oneof_id)));
                        }
                    }
                    doc.push_str(&self.field_row(field_node, field, true));
                }
                None => {
                    current_oneof = None;
                    doc.push_str(&self.field_row(field_node, field, false));
                }
            }
        }
        doc.push_str("</table>\n");

        for &nested in &message.enums {
            self.render_enum(doc, nested, depth + 1);
        }
        for &nested in &message.messages {
            self.render_message(doc, nested, depth + 1);
        }
    }

    fn render_enum(&self, doc: &mut String, id: NodeId, depth: usize) {
        let node = self.unit.node(id);
        let NodeKind::Enum(en) = &node.kind else {
            return;
        };

        self.section_header(doc, node, depth);
        doc.push_str(&header_row(&["Name", "Value", "Description"]));
        for &value_id in &en.values {
            let value = self.unit.node(value_id);
            if let NodeKind::EnumValue(v) = &value.kind {
                let cells = [
                    cell(&value.name, None),
                    cell(&v.number.to_string(), None),
                    cell(&self.comment(value), None),
                ];
                doc.push_str(&row(&cells));
            }
        }
        doc.push_str("</table>\n");
    }

    fn section_header(&self, doc: &mut String, node: &Node, depth: usize) {
        let cmd = match depth {
            0 => "subsection",
            1 => "subsubsection",
            _ => "paragraph",
        };
        doc.push_str(&command(
            cmd,
            &format!("{} {}", label(&node.full_name), node.name),
        ));
        doc.push_str(&self.comment(node));
        doc.push('\n');
        doc.push_str("<table>\n");
        doc.push_str(&format!(
            "<caption id=\"{0}\">{0}</caption>\n",
            node.full_name
        ));
    }

    fn field_row(&self, node: &Node, field: &FieldNode, in_oneof: bool) -> String {
        let mut cells = Vec::with_capacity(5);
        if in_oneof {
            cells.push(cell(&format!("<i>{}</i>", node.name), Some("right")));
            cells.push(cell("-", Some("center")));
        } else {
            cells.push(cell(&node.name, None));
            cells.push(cell(field.label.as_str(), None));
        }
        cells.push(cell(&field.number.to_string(), None));
        cells.push(cell(&type_description(&field.ty), None));
        cells.push(cell(&self.comment(node), None));
        row(&cells)
    }

    fn oneof_row(&self, node: &Node) -> String {
        row(&[
            cell(&format!("<b>{}</b>", node.name), None),
            cell("<b>oneof</b>", None),
            cell("<b>-</b>", Some("center")),
            cell("<b>-</b>", Some("center")),
            cell(&self.comment(node), None),
        ])
    }

    fn is_synthetic(&self, oneofs: &[NodeId], idx: usize) -> bool {
        oneofs
            .get(idx)
            .is_some_and(|&id| matches!(&self.unit.node(id).kind, NodeKind::OneOf(o) if o.synthetic))
    }

    fn comment(&self, node: &Node) -> String {
        match &node.comment {
            Some(text) => sanitize_comment(text),
            None => self.options.placeholder.clone(),
        }
    }
}

/// Text shown in the type column; references become Doxygen links.
pub fn type_description(ty: &FieldType) -> String {
    match ty {
        FieldType::Scalar(s) => s.keyword().to_string(),
        FieldType::Reference(name) => format!("@ref {}", name),
        FieldType::Undescribed => String::new(),
    }
}

fn command(cmd: &str, arg: &str) -> String {
    format!("@{}\t{}\n", cmd, arg)
}

// Doxygen labels are identifiers. `_` escapes everything else and is
// always followed by `_`, `8` (.), `2` (/) or `x` plus six hex digits,
// so distinct names never share a label.
fn label(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => out.push(c),
            '_' => out.push_str("__"),
            '.' => out.push_str("_8"),
            '/' => out.push_str("_2"),
            other => out.push_str(&format!("_x{:06x}", other as u32)),
        }
    }
    out
}

// `_0` never occurs in a declaration label.
fn file_label(file_name: &str) -> String {
    format!("{}_0", label(file_name))
}

fn base_name(file_name: &str) -> &str {
    let last = file_name.rsplit('/').next().unwrap_or(file_name);
    last.split('.').next().unwrap_or(last)
}

// Comments sit inside a C-style block, which `*/` would terminate early.
fn sanitize_comment(text: &str) -> String {
    text.trim().replace("*/", "*&#47;")
}

fn cell(text: &str, align: Option<&str>) -> String {
    match align {
        Some(a) => format!("<td align=\"{}\">{}</td>", a, text),
        None => format!("<td>{}</td>", text),
    }
}

fn row(cells: &[String]) -> String {
    format!("<tr>{}</tr>\n", cells.concat())
}

fn header_row(titles: &[&str]) -> String {
    let cells: String = titles.iter().map(|t| format!("<th>{}</th>", t)).collect();
    format!("<tr>{}</tr>\n", cells)
}
