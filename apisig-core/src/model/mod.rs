//! In-memory API model.
//!
//! A [`Codebase`] owns packages and classes; classes own their members;
//! methods own their parameters. Back references (containing class and
//! package) are ids into the codebase rather than pointers.
//!
//! # Example
//!
//! ```
//! use apisig_core::model::{ClassItem, ClassKind, CodebaseBuilder, ItemState, ModifierList, SourcePosition};
//!
//! let public = || ItemState::new(
//!     ModifierList::new().with_flags(ModifierList::PUBLIC),
//!     "",
//!     SourcePosition::default(),
//! );
//! let mut builder = CodebaseBuilder::new("example");
//! let pkg = builder.package("test.pkg", public());
//! builder.add_class(pkg, None, ClassItem::new("Foo", ClassKind::Class, public())).unwrap();
//! let codebase = builder.build();
//! assert!(codebase.find_class("test.pkg.Foo").is_some());
//! ```

pub mod codebase;
pub mod items;
pub mod modifiers;
pub mod types;

pub use codebase::{ClassId, Codebase, CodebaseBuilder, PackageId, TypeVariableMap};
pub use items::{
    ClassItem, ClassKind, ConstantValue, FieldItem, Item, ItemState, MethodItem, PackageItem,
    ParameterItem, PropertyItem, SourcePosition,
};
pub use modifiers::{AnnotationItem, ModifierList, Nullness, Visibility};
pub use types::{TypeItem, TypeParameter, TypeParameterList};

/// A borrowed item of any kind.
#[derive(Clone, Copy, Debug)]
pub enum ItemRef<'a> {
    Package(&'a PackageItem),
    Class(&'a ClassItem),
    Constructor(&'a MethodItem),
    Method(&'a MethodItem),
    Field(&'a FieldItem),
    Property(&'a PropertyItem),
    /// A parameter together with the method that owns it.
    Parameter(&'a ParameterItem, &'a MethodItem),
}

impl<'a> ItemRef<'a> {
    /// Wrap a method or constructor in the matching variant.
    pub fn callable(method: &'a MethodItem) -> Self {
        if method.is_constructor() {
            ItemRef::Constructor(method)
        } else {
            ItemRef::Method(method)
        }
    }

    pub fn item(&self) -> &'a dyn Item {
        match *self {
            ItemRef::Package(p) => p,
            ItemRef::Class(c) => c,
            ItemRef::Constructor(m) | ItemRef::Method(m) => m,
            ItemRef::Field(f) => f,
            ItemRef::Property(p) => p,
            ItemRef::Parameter(p, _) => p,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ItemRef::Package(_) => "package",
            ItemRef::Class(_) => "class",
            ItemRef::Constructor(_) => "constructor",
            ItemRef::Method(_) => "method",
            ItemRef::Field(_) => "field",
            ItemRef::Property(_) => "property",
            ItemRef::Parameter(..) => "parameter",
        }
    }

    /// Class that declares this item, or the class itself.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            ItemRef::Package(_) => None,
            ItemRef::Class(c) => Some(c.id()),
            ItemRef::Constructor(m) | ItemRef::Method(m) | ItemRef::Parameter(_, m) => Some(m.class_id()),
            ItemRef::Field(f) => Some(f.class_id()),
            ItemRef::Property(p) => Some(p.class_id()),
        }
    }

    /// Qualified name, e.g. `test.pkg.Foo.bar` for a member.
    pub fn qualified_name(&self) -> String {
        match self {
            ItemRef::Package(p) => p.qualified_name().to_string(),
            ItemRef::Class(c) => c.qualified_name().to_string(),
            ItemRef::Constructor(m) | ItemRef::Method(m) => {
                format!("{}.{}", m.containing_class(), m.name())
            }
            ItemRef::Field(f) => format!("{}.{}", f.containing_class(), f.name()),
            ItemRef::Property(p) => format!("{}.{}", p.containing_class(), p.name()),
            ItemRef::Parameter(p, m) => format!("{}.{}.{}", m.containing_class(), m.name(), p.name()),
        }
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ItemRef::Parameter(p, m) => format!(
                "parameter {} in {}.{}",
                p.name(),
                m.containing_class(),
                m.name()
            ),
            _ => format!("{} {}", self.kind_name(), self.qualified_name()),
        }
    }

    /// Location for diagnostics. Parameters report their method's position.
    pub fn position(&self) -> &'a SourcePosition {
        match *self {
            ItemRef::Parameter(_, m) => m.position(),
            other => other.item().position(),
        }
    }
}
