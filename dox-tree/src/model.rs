// Declaration tree for one .proto file.
// - Nodes live in a per-file arena and refer to children by NodeId.
// - Child lists keep descriptor order: the ordinal of a child is its index
//   in the list, which is what location paths address.
// - A field points at its one-of by ordinal, not by NodeId.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocTree {
    nodes: Vec<Node>,
}

impl DocTree {
    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One schema file: its arena plus the ordered top-level declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileUnit {
    pub name: String,
    pub package: String,
    pub tree: DocTree,
    pub messages: Vec<NodeId>,
    pub enums: Vec<NodeId>,
}

impl FileUnit {
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            ..Self::default()
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.get(id)
    }
}

// ---------------- Nodes ----------------

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Declared identifier.
    pub name: String,
    /// Package- and parent-qualified name; equal to `name` for fields,
    /// one-ofs and enum values.
    pub full_name: String,
    /// `None` until a location record documents the node.
    pub comment: Option<String>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: &str, full_name: String, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            full_name,
            comment: None,
            kind,
        }
    }

    /// Empty or blank text never replaces an earlier comment.
    pub fn set_comment(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.comment = Some(text.to_string());
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Message(MessageNode),
    Enum(EnumNode),
    Field(FieldNode),
    OneOf(OneOfNode),
    EnumValue(EnumValueNode),
}

impl NodeKind {
    pub fn decl_kind(&self) -> DeclKind {
        match self {
            NodeKind::Message(_) => DeclKind::Message,
            NodeKind::Enum(_) => DeclKind::Enum,
            NodeKind::Field(_) => DeclKind::Field,
            NodeKind::OneOf(_) => DeclKind::OneOf,
            NodeKind::EnumValue(_) => DeclKind::EnumValue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Message,
    Enum,
    Field,
    OneOf,
    EnumValue,
}

/// Which comment of a location record documents a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSlot {
    Leading,
    Trailing,
}

impl DeclKind {
    pub fn attachment(self) -> CommentSlot {
        match self {
            DeclKind::Message | DeclKind::Enum | DeclKind::OneOf => CommentSlot::Leading,
            DeclKind::Field | DeclKind::EnumValue => CommentSlot::Trailing,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Message => "message",
            DeclKind::Enum => "enum",
            DeclKind::Field => "field",
            DeclKind::OneOf => "oneof",
            DeclKind::EnumValue => "enum value",
        }
    }
}

// ---------------- Message & Fields ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageNode {
    pub fields: Vec<NodeId>,
    pub oneofs: Vec<NodeId>,
    pub messages: Vec<NodeId>,
    pub enums: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub number: i32,
    pub label: FieldLabel,
    pub ty: FieldType,
    /// Ordinal of the owning one-of within the message.
    pub oneof: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OneOfNode {
    /// Generated by protoc for a proto3 `optional` field.
    pub synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Required,
    Optional,
    Repeated,
    Unknown,
}

impl FieldLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldLabel::Required => "required",
            FieldLabel::Optional => "optional",
            FieldLabel::Repeated => "repeated",
            FieldLabel::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    /// Fully-qualified message or enum name, without the leading '.'.
    Reference(String),
    /// Groups and unrecognized type codes.
    Undescribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "signed int32",
            ScalarType::Sint64 => "signed int64",
            ScalarType::Fixed32 => "fixed point 32",
            ScalarType::Fixed64 => "fixed point 64",
            ScalarType::Sfixed32 => "signed fixed point 32",
            ScalarType::Sfixed64 => "signed fixed point 64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes array",
        }
    }
}

// ---------------- Enum ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumNode {
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueNode {
    pub number: i32,
}
