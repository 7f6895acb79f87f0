//! The codebase: one API snapshot, plus the builder frontends use to create it.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::items::{
    ClassItem, FieldItem, Item, ItemState, MethodItem, PackageItem, PropertyItem,
};
use super::types::{strip_java_lang_prefix, TypeItem};
use crate::error::{Result, SignatureError};
use crate::format::FileFormat;

/// Index of a class within its codebase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub(crate) usize);

/// Index of a package within its codebase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(pub(crate) usize);

/// Type-variable bindings from an ancestor's parameters to the descendant's types.
pub type TypeVariableMap = HashMap<String, TypeItem>;

/// A fully built, read-only API snapshot.
#[derive(Clone, Debug, Default)]
pub struct Codebase {
    description: String,
    format: Option<FileFormat>,
    packages: Vec<PackageItem>,
    classes: Vec<ClassItem>,
    package_index: HashMap<String, PackageId>,
    class_index: HashMap<String, ClassId>,
}

impl Codebase {
    /// Human-readable origin, e.g. the signature file path.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Format of the signature file this codebase was read from, if any.
    pub fn format(&self) -> Option<FileFormat> {
        self.format
    }

    /// Packages in declaration order.
    pub fn packages(&self) -> &[PackageItem] {
        &self.packages
    }

    pub fn package(&self, id: PackageId) -> &PackageItem {
        &self.packages[id.0]
    }

    pub fn find_package(&self, name: &str) -> Option<&PackageItem> {
        self.package_index.get(name).map(|id| self.package(*id))
    }

    /// All classes, inner classes included.
    pub fn classes(&self) -> &[ClassItem] {
        &self.classes
    }

    pub fn class(&self, id: ClassId) -> &ClassItem {
        &self.classes[id.0]
    }

    /// Look up a class by qualified name. Bare names also try `java.lang.`.
    pub fn find_class(&self, qualified_name: &str) -> Option<&ClassItem> {
        if let Some(id) = self.class_index.get(qualified_name) {
            return Some(self.class(*id));
        }
        if !qualified_name.contains('.') {
            let expanded = format!("java.lang.{}", qualified_name);
            return self.class_index.get(&expanded).map(|id| self.class(*id));
        }
        None
    }

    /// Resolve the class a type refers to.
    pub fn resolve(&self, ty: &TypeItem) -> Option<&ClassItem> {
        self.find_class(&ty.class_name())
    }

    pub fn top_level_classes<'a>(&'a self, package: &'a PackageItem) -> impl Iterator<Item = &'a ClassItem> + 'a {
        package.classes.iter().map(move |id| self.class(*id))
    }

    pub fn inner_classes<'a>(&'a self, class: &'a ClassItem) -> impl Iterator<Item = &'a ClassItem> + 'a {
        class.inner_classes.iter().map(move |id| self.class(*id))
    }

    pub fn containing_class(&self, class: &ClassItem) -> Option<&ClassItem> {
        class.containing_class.map(|id| self.class(id))
    }

    pub fn containing_package(&self, class: &ClassItem) -> &PackageItem {
        self.package(class.package)
    }

    /// The superclass, when it is part of this codebase.
    pub fn super_class(&self, class: &ClassItem) -> Option<&ClassItem> {
        class.super_class_type.as_ref().and_then(|t| self.resolve(t))
    }

    /// Implemented interfaces that are part of this codebase.
    pub fn interfaces<'a>(&'a self, class: &'a ClassItem) -> impl Iterator<Item = &'a ClassItem> + 'a {
        class.interface_types.iter().filter_map(move |t| self.resolve(t))
    }

    /// Erased names of the superclass chain, nearest first. Stops at the
    /// first superclass outside the codebase, which is still included.
    pub fn super_class_chain(&self, class: &ClassItem) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = class;
        while let Some(super_type) = current.super_class_type() {
            let name = super_type.class_name();
            if !seen.insert(name.clone()) {
                break;
            }
            chain.push(strip_java_lang_prefix(&name).to_string());
            match self.resolve(super_type) {
                Some(next) => current = next,
                None => break,
            }
        }
        chain
    }

    /// Ancestors of `class` found in this codebase, breadth first, each with
    /// the bindings of its type variables in terms of `class`'s types.
    pub fn ancestors<'a>(&'a self, class: &ClassItem) -> Vec<(&'a ClassItem, TypeVariableMap)> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(class.qualified_name());

        let mut queue: VecDeque<(Vec<TypeItem>, TypeVariableMap)> = VecDeque::new();
        queue.push_back((direct_super_types(class), TypeVariableMap::new()));

        while let Some((super_types, bindings)) = queue.pop_front() {
            for super_type in super_types {
                let converted = super_type.convert_type(&bindings);
                let Some(ancestor) = self.resolve(&converted) else {
                    continue;
                };
                if !visited.insert(ancestor.qualified_name()) {
                    continue;
                }
                let names = ancestor.type_parameters().names();
                let arguments = converted.type_arguments();
                let map: TypeVariableMap = if names.len() == arguments.len() {
                    names.into_iter().zip(arguments).collect()
                } else {
                    TypeVariableMap::new()
                };
                queue.push_back((direct_super_types(ancestor), map.clone()));
                result.push((ancestor, map));
            }
        }
        result
    }

    /// Bindings of `ancestor`'s type variables in terms of `class`'s types.
    pub fn map_type_variables(&self, class: &ClassItem, ancestor: &ClassItem) -> Option<TypeVariableMap> {
        self.ancestors(class)
            .into_iter()
            .find(|(candidate, _)| candidate.qualified_name() == ancestor.qualified_name())
            .map(|(_, map)| map)
    }

    /// Methods in ancestors of `class` that `name(parameter_keys)` overrides.
    pub fn find_inherited_methods<'a>(
        &'a self,
        class: &ClassItem,
        name: &str,
        parameter_keys: &[String],
    ) -> Vec<&'a MethodItem> {
        let mut found = Vec::new();
        for (ancestor, bindings) in self.ancestors(class) {
            for candidate in &ancestor.methods {
                if candidate.name == name && overrides(candidate, parameter_keys, &bindings) {
                    found.push(candidate);
                }
            }
        }
        found
    }

    /// Methods `method` overrides, nearest ancestors first.
    pub fn super_methods(&self, method: &MethodItem) -> Vec<&MethodItem> {
        if method.is_constructor() {
            return Vec::new();
        }
        match self.classes.get(method.class_id.0) {
            Some(class) if class.qualified_name() == method.containing_class() => {
                self.find_inherited_methods(class, &method.name, &method.parameter_keys())
            }
            _ => Vec::new(),
        }
    }

    /// First overridden method accepted by `predicate`.
    pub fn find_predicate_super_method<'a>(
        &'a self,
        method: &MethodItem,
        mut predicate: impl FnMut(&'a MethodItem) -> bool,
    ) -> Option<&'a MethodItem> {
        self.super_methods(method).into_iter().find(|m| predicate(*m))
    }
}

fn direct_super_types(class: &ClassItem) -> Vec<TypeItem> {
    class
        .super_class_type
        .iter()
        .chain(class.interface_types.iter())
        .cloned()
        .collect()
}

fn overrides(candidate: &MethodItem, parameter_keys: &[String], bindings: &TypeVariableMap) -> bool {
    candidate.parameters.len() == parameter_keys.len()
        && candidate
            .parameters
            .iter()
            .zip(parameter_keys)
            .all(|(p, key)| p.ty.convert_type(bindings).signature_key() == *key)
}

/// Construction-only mutators for a [`Codebase`]. Consumed by [`build`](Self::build),
/// so nothing can change a codebase once it is handed out.
#[derive(Debug, Default)]
pub struct CodebaseBuilder {
    codebase: Codebase,
}

impl CodebaseBuilder {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            codebase: Codebase {
                description: description.into(),
                ..Codebase::default()
            },
        }
    }

    pub fn set_format(&mut self, format: FileFormat) {
        self.codebase.format = Some(format);
    }

    /// Get or create a package. A repeated package merges into the first.
    pub fn package(&mut self, name: &str, state: ItemState) -> PackageId {
        if let Some(id) = self.codebase.package_index.get(name) {
            return *id;
        }
        let id = PackageId(self.codebase.packages.len());
        self.codebase.packages.push(PackageItem {
            state,
            name: name.to_string(),
            id,
            classes: Vec::new(),
        });
        self.codebase.package_index.insert(name.to_string(), id);
        id
    }

    pub fn find_class(&self, qualified_name: &str) -> Option<ClassId> {
        self.codebase.class_index.get(qualified_name).copied()
    }

    pub fn codebase(&self) -> &Codebase {
        &self.codebase
    }

    /// Add a class to a package, or as an inner class of `containing`.
    pub fn add_class(
        &mut self,
        package: PackageId,
        containing: Option<ClassId>,
        mut class: ClassItem,
    ) -> Result<ClassId> {
        let package_name = &self.codebase.packages[package.0].name;
        class.qualified_name = if package_name.is_empty() {
            class.full_name.clone()
        } else {
            format!("{}.{}", package_name, class.full_name)
        };
        if self.codebase.class_index.contains_key(&class.qualified_name) {
            return Err(SignatureError::DuplicateClass {
                qualified_name: class.qualified_name,
            });
        }

        let id = ClassId(self.codebase.classes.len());
        class.id = id;
        class.package = package;
        class.containing_class = containing;
        let from_class_path = class.is_from_class_path();
        for method in class.constructors.iter_mut().chain(class.methods.iter_mut()) {
            method.containing_class = class.qualified_name.clone();
            method.class_id = id;
            method.state.set_from_class_path(from_class_path);
        }

        match containing {
            Some(outer) => self.codebase.classes[outer.0].inner_classes.push(id),
            None => self.codebase.packages[package.0].classes.push(id),
        }
        self.codebase
            .class_index
            .insert(class.qualified_name.clone(), id);
        self.codebase.classes.push(class);
        Ok(id)
    }

    pub fn set_super_class(&mut self, class: ClassId, super_class_type: Option<TypeItem>) {
        self.codebase.classes[class.0].super_class_type = super_class_type;
    }

    pub fn add_interface(&mut self, class: ClassId, interface_type: TypeItem) {
        self.codebase.classes[class.0].interface_types.push(interface_type);
    }

    pub fn add_constructor(&mut self, class: ClassId, mut constructor: MethodItem) -> Result<()> {
        self.check_method_key(class, &constructor)?;
        self.adopt_method(class, &mut constructor);
        self.codebase.classes[class.0].constructors.push(constructor);
        Ok(())
    }

    pub fn add_method(&mut self, class: ClassId, mut method: MethodItem) -> Result<()> {
        self.check_method_key(class, &method)?;
        self.adopt_method(class, &mut method);
        self.codebase.classes[class.0].methods.push(method);
        Ok(())
    }

    pub fn add_field(&mut self, class: ClassId, mut field: FieldItem) -> Result<()> {
        let owner = &self.codebase.classes[class.0];
        if owner.fields.iter().any(|f| f.name == field.name) {
            return Err(SignatureError::DuplicateMember {
                class: owner.qualified_name.clone(),
                key: field.name,
            });
        }
        field.containing_class = owner.qualified_name.clone();
        field.class_id = class;
        if owner.is_from_class_path() {
            field.state.set_from_class_path(true);
        }
        self.codebase.classes[class.0].fields.push(field);
        Ok(())
    }

    pub fn add_property(&mut self, class: ClassId, mut property: PropertyItem) -> Result<()> {
        let owner = &self.codebase.classes[class.0];
        if owner.properties.iter().any(|p| p.name == property.name) {
            return Err(SignatureError::DuplicateMember {
                class: owner.qualified_name.clone(),
                key: property.name,
            });
        }
        property.containing_class = owner.qualified_name.clone();
        property.class_id = class;
        if owner.is_from_class_path() {
            property.state.set_from_class_path(true);
        }
        self.codebase.classes[class.0].properties.push(property);
        Ok(())
    }

    /// Copy a method declared in an ancestor (typically a hidden one) into
    /// `class`, rewriting the ancestor's type variables into `class`'s terms.
    pub fn inherit_method(&mut self, class: ClassId, from: &str, signature_key: &str) -> Result<()> {
        let codebase = &self.codebase;
        let target = &codebase.classes[class.0];
        let ancestor = codebase.find_class(from).ok_or_else(|| SignatureError::UnknownClass {
            name: from.to_string(),
        })?;
        let source = ancestor
            .find_method(signature_key)
            .ok_or_else(|| SignatureError::UnknownMember {
                class: from.to_string(),
                key: signature_key.to_string(),
            })?;
        let bindings = codebase
            .map_type_variables(target, ancestor)
            .unwrap_or_default();

        let mut copy = source.clone();
        copy.return_type = copy.return_type.map(|t| t.convert_type(&bindings));
        for parameter in &mut copy.parameters {
            parameter.ty = parameter.ty.convert_type(&bindings);
        }
        copy.throws = copy.throws.iter().map(|t| t.convert_type(&bindings)).collect();
        copy.cloned_from = Some(ancestor.qualified_name().to_string());
        self.add_method(class, copy)
    }

    fn check_method_key(&self, class: ClassId, method: &MethodItem) -> Result<()> {
        let owner = &self.codebase.classes[class.0];
        let key = method.signature_key();
        let existing = if method.is_constructor() {
            &owner.constructors
        } else {
            &owner.methods
        };
        if existing.iter().any(|m| m.signature_key() == key) {
            return Err(SignatureError::DuplicateMember {
                class: owner.qualified_name.clone(),
                key,
            });
        }
        Ok(())
    }

    fn adopt_method(&self, class: ClassId, method: &mut MethodItem) {
        let owner = &self.codebase.classes[class.0];
        method.containing_class = owner.qualified_name.clone();
        method.class_id = class;
        if owner.is_from_class_path() {
            method.state.set_from_class_path(true);
        }
    }

    /// Freeze the codebase.
    pub fn build(self) -> Codebase {
        tracing::debug!(
            "Built codebase {} ({} packages, {} classes)",
            self.codebase.description,
            self.codebase.packages.len(),
            self.codebase.classes.len()
        );
        self.codebase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::items::{ClassKind, ParameterItem, SourcePosition};
    use crate::model::modifiers::ModifierList;
    use crate::model::types::TypeParameterList;

    fn public() -> ItemState {
        ItemState::new(
            ModifierList::new().with_flags(ModifierList::PUBLIC),
            "",
            SourcePosition::default(),
        )
    }

    fn ty(text: &str) -> TypeItem {
        TypeItem::parse(text).unwrap()
    }

    fn method(name: &str, params: &[&str]) -> MethodItem {
        let params = params
            .iter()
            .map(|p| ParameterItem::new(None, ty(p), ModifierList::new(), None))
            .collect();
        MethodItem::method(name, ty("void"), params, public())
    }

    fn generic_hierarchy() -> (CodebaseBuilder, ClassId) {
        let mut builder = CodebaseBuilder::new("test");
        let pkg = builder.package("test.pkg", public());
        let base = ClassItem::new("Base", ClassKind::Class, public())
            .with_type_parameters(TypeParameterList::parse("<X>").unwrap());
        let base = builder.add_class(pkg, None, base).unwrap();
        builder.add_method(base, method("put", &["X"])).unwrap();

        let child = ClassItem::new("Child", ClassKind::Class, public())
            .with_type_parameters(TypeParameterList::parse("<T>").unwrap())
            .with_super_class_type(Some(ty("test.pkg.Base<T>")));
        let child = builder.add_class(pkg, None, child).unwrap();
        (builder, child)
    }

    #[test]
    fn test_add_and_find_classes() {
        let mut builder = CodebaseBuilder::new("test");
        let pkg = builder.package("test.pkg", public());
        let outer = builder
            .add_class(pkg, None, ClassItem::new("Outer", ClassKind::Class, public()))
            .unwrap();
        builder
            .add_class(pkg, Some(outer), ClassItem::new("Outer.Inner", ClassKind::Interface, public()))
            .unwrap();
        let codebase = builder.build();

        let inner = codebase.find_class("test.pkg.Outer.Inner").unwrap();
        assert_eq!(inner.simple_name(), "Inner");
        assert!(inner.is_interface());
        assert_eq!(
            codebase.containing_class(inner).map(|c| c.qualified_name()),
            Some("test.pkg.Outer")
        );
        let package = codebase.find_package("test.pkg").unwrap();
        assert_eq!(codebase.top_level_classes(package).count(), 1);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut builder = CodebaseBuilder::new("test");
        let pkg = builder.package("test.pkg", public());
        let class = builder
            .add_class(pkg, None, ClassItem::new("Foo", ClassKind::Class, public()))
            .unwrap();
        assert!(builder
            .add_class(pkg, None, ClassItem::new("Foo", ClassKind::Class, public()))
            .is_err());

        builder.add_method(class, method("run", &["java.util.List<String>"])).unwrap();
        let err = builder
            .add_method(class, method("run", &["java.util.List<Integer>"]))
            .unwrap_err();
        assert!(matches!(err, SignatureError::DuplicateMember { .. }));
    }

    #[test]
    fn test_repeated_package_merges() {
        let mut builder = CodebaseBuilder::new("test");
        let first = builder.package("test.pkg", public());
        let second = builder.package("test.pkg", public());
        assert_eq!(first, second);
        assert_eq!(builder.build().packages().len(), 1);
    }

    #[test]
    fn test_super_methods_map_type_variables() {
        let (mut builder, child) = generic_hierarchy();
        builder.add_method(child, method("put", &["T"])).unwrap();
        let codebase = builder.build();

        let child = codebase.find_class("test.pkg.Child").unwrap();
        let put = &child.methods()[0];
        let supers = codebase.super_methods(put);
        assert_eq!(supers.len(), 1);
        assert_eq!(supers[0].containing_class(), "test.pkg.Base");

        let base = codebase.find_class("test.pkg.Base").unwrap();
        let map = codebase.map_type_variables(child, base).unwrap();
        assert_eq!(map.get("X").map(|t| t.canonical()), Some("T"));
    }

    #[test]
    fn test_inherit_method_converts_types() {
        let (mut builder, child) = generic_hierarchy();
        builder.inherit_method(child, "test.pkg.Base", "put(X)").unwrap();
        let codebase = builder.build();

        let child = codebase.find_class("test.pkg.Child").unwrap();
        let copy = &child.methods()[0];
        assert_eq!(copy.signature_key(), "put(T)");
        assert!(copy.is_cloned());
        assert_eq!(copy.cloned_from(), Some("test.pkg.Base"));
    }

    #[test]
    fn test_class_path_flag_propagates() {
        let mut builder = CodebaseBuilder::new("test");
        let pkg = builder.package("java.lang", public());
        let object = ClassItem::new("Object", ClassKind::Class, public().from_class_path());
        let object = builder.add_class(pkg, None, object).unwrap();
        builder.add_method(object, method("toString", &[])).unwrap();
        let codebase = builder.build();

        let object = codebase.find_class("Object").unwrap();
        assert!(object.methods()[0].is_from_class_path());
    }

    #[test]
    fn test_super_class_chain() {
        let (builder, _) = generic_hierarchy();
        let codebase = builder.build();
        let child = codebase.find_class("test.pkg.Child").unwrap();
        assert_eq!(codebase.super_class_chain(child), vec!["test.pkg.Base".to_string()]);
    }
}
