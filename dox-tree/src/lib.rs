mod error;
mod locate;
mod model;

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
};

pub use error::TreeError;
pub use locate::*;
pub use model::*;

// Public API: build the declaration tree of one file descriptor.
// Children are added in descriptor order, nothing is filtered or reordered.
pub fn build_file_unit(file: &FileDescriptorProto) -> Result<FileUnit, TreeError> {
    let mut unit = FileUnit::new(file.name(), file.package());
    let package = unit.package.clone();
    let scope = (!package.is_empty()).then_some(package.as_str());

    for en in &file.enum_type {
        let id = build_enum(&mut unit.tree, en, scope);
        unit.enums.push(id);
    }
    for msg in &file.message_type {
        let id = build_message(&mut unit.tree, msg, scope)?;
        unit.messages.push(id);
    }

    tracing::debug!(
        file = %unit.name,
        messages = unit.messages.len(),
        enums = unit.enums.len(),
        nodes = unit.tree.len(),
        "built declaration tree"
    );
    Ok(unit)
}

fn qualify(parent: Option<&str>, name: &str) -> String {
    if let Some(p) = parent {
        format!("{}.{name}", p)
    } else {
        name.to_string()
    }
}

fn build_message(
    tree: &mut DocTree,
    msg: &DescriptorProto,
    parent: Option<&str>,
) -> Result<NodeId, TreeError> {
    let full_name = qualify(parent, msg.name());
    let mut message = MessageNode::default();

    // A oneof is synthetic when protoc generated it for a proto3 `optional` field.
    for (idx, oneof) in msg.oneof_decl.iter().enumerate() {
        let synthetic = msg.field.iter().any(|f| {
            f.proto3_optional() && f.oneof_index.is_some_and(|i| i as usize == idx)
        });
        let kind = NodeKind::OneOf(OneOfNode { synthetic });
        message
            .oneofs
            .push(tree.push(Node::new(oneof.name(), oneof.name().to_string(), kind)));
    }

    for en in &msg.enum_type {
        message.enums.push(build_enum(tree, en, Some(&full_name)));
    }

    for nested in &msg.nested_type {
        message
            .messages
            .push(build_message(tree, nested, Some(&full_name))?);
    }

    for field in &msg.field {
        let oneof = match field.oneof_index {
            Some(idx) if idx >= 0 && (idx as usize) < message.oneofs.len() => Some(idx as usize),
            Some(idx) => {
                return Err(TreeError::DanglingOneOf {
                    message: full_name,
                    field: field.name().to_string(),
                    index: idx,
                    len: message.oneofs.len(),
                });
            }
            None => None,
        };
        let kind = NodeKind::Field(FieldNode {
            number: field.number(),
            label: field_label(field),
            ty: field_type(field),
            oneof,
        });
        message
            .fields
            .push(tree.push(Node::new(field.name(), field.name().to_string(), kind)));
    }

    Ok(tree.push(Node::new(
        msg.name(),
        full_name,
        NodeKind::Message(message),
    )))
}

fn build_enum(tree: &mut DocTree, en: &EnumDescriptorProto, parent: Option<&str>) -> NodeId {
    let full_name = qualify(parent, en.name());
    let values = en
        .value
        .iter()
        .map(|v| {
            let kind = NodeKind::EnumValue(EnumValueNode { number: v.number() });
            tree.push(Node::new(v.name(), v.name().to_string(), kind))
        })
        .collect();

    tree.push(Node::new(
        en.name(),
        full_name,
        NodeKind::Enum(EnumNode { values }),
    ))
}

fn field_label(field: &FieldDescriptorProto) -> FieldLabel {
    match field.label.and_then(|raw| Label::try_from(raw).ok()) {
        Some(Label::Required) => FieldLabel::Required,
        Some(Label::Optional) => FieldLabel::Optional,
        Some(Label::Repeated) => FieldLabel::Repeated,
        None => FieldLabel::Unknown,
    }
}

fn field_type(field: &FieldDescriptorProto) -> FieldType {
    let Some(ty) = field.r#type.and_then(|raw| Type::try_from(raw).ok()) else {
        return FieldType::Undescribed;
    };
    let scalar = match ty {
        Type::Message | Type::Enum => {
            let name = field.type_name();
            return FieldType::Reference(name.strip_prefix('.').unwrap_or(name).to_string());
        }
        Type::Group => return FieldType::Undescribed,
        Type::Double => ScalarType::Double,
        Type::Float => ScalarType::Float,
        Type::Int32 => ScalarType::Int32,
        Type::Int64 => ScalarType::Int64,
        Type::Uint32 => ScalarType::Uint32,
        Type::Uint64 => ScalarType::Uint64,
        Type::Sint32 => ScalarType::Sint32,
        Type::Sint64 => ScalarType::Sint64,
        Type::Fixed32 => ScalarType::Fixed32,
        Type::Fixed64 => ScalarType::Fixed64,
        Type::Sfixed32 => ScalarType::Sfixed32,
        Type::Sfixed64 => ScalarType::Sfixed64,
        Type::Bool => ScalarType::Bool,
        Type::String => ScalarType::String,
        Type::Bytes => ScalarType::Bytes,
    };
    FieldType::Scalar(scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prost_types::{EnumValueDescriptorProto, OneofDescriptorProto};

    fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        }
    }

    fn reference(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            type_name: Some(type_name.to_string()),
            ..field(name, number, ty)
        }
    }

    fn message(name: &str) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
        EnumDescriptorProto {
            name: Some(name.to_string()),
            value: values
                .iter()
                .map(|(n, v)| EnumValueDescriptorProto {
                    name: Some(n.to_string()),
                    number: Some(*v),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn order_file() -> FileDescriptorProto {
        let mut address = message("Address");
        address.field.push(field("street", 1, Type::String));

        let mut order = message("Order");
        order.field.push(field("id", 1, Type::Int32));
        order.field.push(reference(
            "shipping_address",
            2,
            Type::Message,
            ".shop.Order.Address",
        ));
        order
            .field
            .push(reference("status", 3, Type::Enum, ".shop.Order.Status"));
        order.nested_type.push(address);
        order
            .enum_type
            .push(enumeration("Status", &[("NEW", 0), ("PAID", 1)]));

        FileDescriptorProto {
            name: Some("shop/order.proto".to_string()),
            package: Some("shop".to_string()),
            message_type: vec![order, message("Empty")],
            enum_type: vec![enumeration("Kind", &[("REGULAR", 0)])],
            ..Default::default()
        }
    }

    fn message_node<'a>(unit: &'a FileUnit, id: NodeId) -> &'a MessageNode {
        match &unit.node(id).kind {
            NodeKind::Message(m) => m,
            other => panic!("expected message, got {other:?}"),
        }
    }

    fn field_node<'a>(unit: &'a FileUnit, id: NodeId) -> &'a FieldNode {
        match &unit.node(id).kind {
            NodeKind::Field(f) => f,
            other => panic!("expected field, got {other:?}"),
        }
    }

    #[test]
    fn builds_tree_in_declaration_order() {
        let unit = build_file_unit(&order_file()).expect("build failed");
        assert_eq!(unit.name, "shop/order.proto");
        assert_eq!(unit.package, "shop");
        assert!(!unit.tree.is_empty());

        let names: Vec<&str> = unit
            .messages
            .iter()
            .map(|&id| unit.node(id).full_name.as_str())
            .collect();
        assert_eq!(names, vec!["shop.Order", "shop.Empty"]);
        assert_eq!(unit.node(unit.enums[0]).full_name, "shop.Kind");

        let order = message_node(&unit, unit.messages[0]);
        let fields: Vec<&str> = order
            .fields
            .iter()
            .map(|&id| unit.node(id).name.as_str())
            .collect();
        assert_eq!(fields, vec!["id", "shipping_address", "status"]);
        assert_eq!(unit.node(order.messages[0]).full_name, "shop.Order.Address");
        assert_eq!(unit.node(order.enums[0]).full_name, "shop.Order.Status");
        assert!(unit.tree.get(order.fields[0]).comment.is_none());
    }

    #[test]
    fn strips_leading_scope_from_references() {
        let unit = build_file_unit(&order_file()).expect("build failed");
        let order = message_node(&unit, unit.messages[0]);
        assert_eq!(
            field_node(&unit, order.fields[1]).ty,
            FieldType::Reference("shop.Order.Address".to_string())
        );
        assert_eq!(
            field_node(&unit, order.fields[2]).ty,
            FieldType::Reference("shop.Order.Status".to_string())
        );
        assert_eq!(
            field_node(&unit, order.fields[0]).ty,
            FieldType::Scalar(ScalarType::Int32)
        );
    }

    #[test]
    fn file_without_package_keeps_plain_names() {
        let mut file = order_file();
        file.package = None;
        let unit = build_file_unit(&file).expect("build failed");
        assert_eq!(unit.node(unit.messages[0]).full_name, "Order");
        let order = message_node(&unit, unit.messages[0]);
        assert_eq!(unit.node(order.messages[0]).full_name, "Order.Address");
    }

    #[test]
    fn maps_scalar_types_to_keywords() {
        let cases = [
            (Type::Bool, "bool"),
            (Type::Bytes, "bytes array"),
            (Type::Double, "double"),
            (Type::Float, "float"),
            (Type::Int32, "int32"),
            (Type::Int64, "int64"),
            (Type::Uint32, "uint32"),
            (Type::Uint64, "uint64"),
            (Type::Sint32, "signed int32"),
            (Type::Sint64, "signed int64"),
            (Type::Fixed32, "fixed point 32"),
            (Type::Fixed64, "fixed point 64"),
            (Type::Sfixed32, "signed fixed point 32"),
            (Type::Sfixed64, "signed fixed point 64"),
            (Type::String, "string"),
        ];
        for (ty, keyword) in cases {
            match field_type(&field("f", 1, ty)) {
                FieldType::Scalar(s) => assert_eq!(s.keyword(), keyword),
                other => panic!("{ty:?} mapped to {other:?}"),
            }
        }
    }

    #[test]
    fn groups_and_unknown_type_codes_are_undescribed() {
        assert_eq!(
            field_type(&field("g", 1, Type::Group)),
            FieldType::Undescribed
        );
        let unknown = FieldDescriptorProto {
            r#type: Some(99),
            ..field("u", 2, Type::Int32)
        };
        assert_eq!(field_type(&unknown), FieldType::Undescribed);
    }

    #[test]
    fn maps_labels_and_unknown_label() {
        let mut f = field("f", 1, Type::Int32);
        f.label = Some(Label::Required as i32);
        assert_eq!(field_label(&f), FieldLabel::Required);
        f.label = Some(Label::Repeated as i32);
        assert_eq!(field_label(&f), FieldLabel::Repeated);
        f.label = Some(7);
        assert_eq!(field_label(&f).as_str(), "unknown");
        f.label = None;
        assert_eq!(field_label(&f), FieldLabel::Unknown);
    }

    #[test]
    fn fields_keep_oneof_ordinal_and_synthetic_flag() {
        let mut msg = message("Choice");
        msg.oneof_decl.push(OneofDescriptorProto {
            name: Some("pick".to_string()),
            ..Default::default()
        });
        msg.oneof_decl.push(OneofDescriptorProto {
            name: Some("_maybe".to_string()),
            ..Default::default()
        });
        msg.field.push(FieldDescriptorProto {
            oneof_index: Some(0),
            ..field("a", 1, Type::String)
        });
        msg.field.push(FieldDescriptorProto {
            oneof_index: Some(1),
            proto3_optional: Some(true),
            ..field("maybe", 2, Type::Int32)
        });
        let file = FileDescriptorProto {
            name: Some("c.proto".to_string()),
            message_type: vec![msg],
            ..Default::default()
        };

        let unit = build_file_unit(&file).expect("build failed");
        let choice = message_node(&unit, unit.messages[0]);
        assert_eq!(field_node(&unit, choice.fields[0]).oneof, Some(0));
        assert_eq!(field_node(&unit, choice.fields[1]).oneof, Some(1));
        let synthetic: Vec<bool> = choice
            .oneofs
            .iter()
            .map(|&id| match &unit.node(id).kind {
                NodeKind::OneOf(o) => o.synthetic,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(synthetic, vec![false, true]);
    }

    #[test]
    fn dangling_oneof_index_is_malformed() {
        let mut msg = message("Broken");
        msg.field.push(FieldDescriptorProto {
            oneof_index: Some(2),
            ..field("a", 1, Type::String)
        });
        let file = FileDescriptorProto {
            name: Some("b.proto".to_string()),
            message_type: vec![msg],
            ..Default::default()
        };
        let err = build_file_unit(&file).unwrap_err();
        assert!(matches!(err, TreeError::DanglingOneOf { index: 2, len: 0, .. }));
    }
}
