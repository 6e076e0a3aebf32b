//! Correlation of `SourceCodeInfo` location records with declaration nodes.
//!
//! A location path is read as `(kind_tag, index)` pairs, one pair per tree
//! level. The tags are the field numbers of the descriptor messages that own
//! the child lists, so the same number means different lists at different
//! levels (4 is the message list at file level and the enum list inside a
//! message).

use prost_types::source_code_info::Location;

use crate::{CommentSlot, FileUnit, NodeId, NodeKind, TreeError};

/// `FileDescriptorProto.message_type`
pub const FILE_MESSAGE_TAG: i32 = 4;
/// `FileDescriptorProto.enum_type`
pub const FILE_ENUM_TAG: i32 = 5;
/// `DescriptorProto.field`
pub const MESSAGE_FIELD_TAG: i32 = 2;
/// `DescriptorProto.nested_type`
pub const MESSAGE_NESTED_TAG: i32 = 3;
/// `DescriptorProto.enum_type`
pub const MESSAGE_ENUM_TAG: i32 = 4;
/// `DescriptorProto.oneof_decl`
pub const MESSAGE_ONEOF_TAG: i32 = 8;
/// `EnumDescriptorProto.value`
pub const ENUM_VALUE_TAG: i32 = 2;

impl FileUnit {
    /// Walks `path` down the tree.
    ///
    /// Returns `Ok(None)` for paths that do not address a documented
    /// declaration (odd or short paths, options, services, anything below a
    /// field), and an error when an index falls outside its child list.
    pub fn resolve_path(&self, path: &[i32]) -> Result<Option<NodeId>, TreeError> {
        if path.len() < 2 || path.len() % 2 == 1 {
            return Ok(None);
        }

        let mut steps = path.chunks_exact(2);
        let mut current: Option<NodeId> = None;

        while let Some(&[tag, index]) = steps.next() {
            let (list, list_name) = match current {
                None => match tag {
                    FILE_MESSAGE_TAG => (&self.messages, "message"),
                    FILE_ENUM_TAG => (&self.enums, "enum"),
                    _ => return Ok(None),
                },
                Some(id) => match (&self.node(id).kind, tag) {
                    (NodeKind::Message(m), MESSAGE_FIELD_TAG) => (&m.fields, "field"),
                    (NodeKind::Message(m), MESSAGE_NESTED_TAG) => (&m.messages, "nested message"),
                    (NodeKind::Message(m), MESSAGE_ENUM_TAG) => (&m.enums, "nested enum"),
                    (NodeKind::Message(m), MESSAGE_ONEOF_TAG) => (&m.oneofs, "oneof"),
                    (NodeKind::Enum(e), ENUM_VALUE_TAG) => (&e.values, "enum value"),
                    _ => return Ok(None),
                },
            };

            let child = usize::try_from(index)
                .ok()
                .and_then(|i| list.get(i))
                .ok_or_else(|| TreeError::IndexOutOfRange {
                    path: path.to_vec(),
                    list: list_name,
                    index,
                    len: list.len(),
                })?;
            current = Some(*child);
        }

        Ok(current)
    }

    /// Attaches the comments of `locations` to the nodes they address.
    ///
    /// Records are applied in order, so the last non-empty comment for a
    /// node wins. The first malformed path aborts the pass.
    pub fn apply_locations<'a, I>(&mut self, locations: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let mut attached = 0usize;
        for location in locations {
            let Some(id) = self.resolve_path(&location.path)? else {
                tracing::trace!(path = ?location.path, "location does not address a declaration");
                continue;
            };

            let node = self.tree.get_mut(id);
            let text = match node.kind.decl_kind().attachment() {
                CommentSlot::Leading => location.leading_comments(),
                CommentSlot::Trailing => location.trailing_comments(),
            };
            if node.set_comment(text) {
                tracing::trace!(
                    kind = node.kind.decl_kind().as_str(),
                    name = %node.full_name,
                    "attached comment"
                );
                attached += 1;
            }
        }

        tracing::debug!(file = %self.name, attached, "applied source locations");
        Ok(())
    }
}
