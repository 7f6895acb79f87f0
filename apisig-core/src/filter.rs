//! Predicates deciding which items make up an API view.
//!
//! Every view has two filters. The emit filter decides whether a declaration
//! is part of the view; the reference filter decides whether a type
//! reference (a super type, a thrown type) to an item is still meaningful in
//! that view. The reference filter ignores show-annotation gating, so a
//! reference to a base class that is public but not shown is kept.

use std::fmt;

use crate::model::{Codebase, Item, ItemRef};

/// A yes/no test over items of a codebase.
pub trait ItemPredicate: Send + Sync {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool;
}

/// Boxed predicate, as produced by [`ApiView`].
pub type BoxedPredicate = Box<dyn ItemPredicate>;

impl ItemPredicate for BoxedPredicate {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool {
        self.as_ref().test(codebase, item)
    }
}

/// Accepts every item.
pub struct AllItems;

impl ItemPredicate for AllItems {
    fn test(&self, _codebase: &Codebase, _item: ItemRef<'_>) -> bool {
        true
    }
}

/// Rejects copies of inherited methods.
pub struct NotCloned;

impl ItemPredicate for NotCloned {
    fn test(&self, _codebase: &Codebase, item: ItemRef<'_>) -> bool {
        !item.item().is_cloned()
    }
}

/// Both predicates must accept.
pub struct And<A, B>(pub A, pub B);

impl<A: ItemPredicate, B: ItemPredicate> ItemPredicate for And<A, B> {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool {
        self.0.test(codebase, item) && self.1.test(codebase, item)
    }
}

/// Inverts a predicate.
pub struct Not<P>(pub P);

impl<P: ItemPredicate> ItemPredicate for Not<P> {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool {
        !self.0.test(codebase, item)
    }
}

/// Membership in the API: visible, not hidden, and removed exactly when
/// `match_removed` asks for removed items.
#[derive(Clone, Debug)]
pub struct ApiPredicate {
    /// Treat every item as carrying a show annotation.
    pub ignore_shown: bool,
    /// Accept removed items instead of rejecting them.
    pub match_removed: bool,
    /// Treat removed items as not removed.
    pub ignore_removed: bool,
    pub include_doc_only: bool,
    pub allow_classes_from_classpath: bool,
    /// Annotations that mark an item as shown.
    pub show_annotations: Vec<String>,
}

impl Default for ApiPredicate {
    fn default() -> Self {
        Self {
            ignore_shown: true,
            match_removed: false,
            ignore_removed: false,
            include_doc_only: false,
            allow_classes_from_classpath: false,
            show_annotations: Vec::new(),
        }
    }
}

impl ApiPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching_removed(mut self) -> Self {
        self.match_removed = true;
        self
    }

    pub fn ignoring_removed(mut self) -> Self {
        self.ignore_removed = true;
        self
    }

    pub fn with_show_annotations(mut self, names: Vec<String>) -> Self {
        self.ignore_shown = names.is_empty();
        self.show_annotations = names;
        self
    }

    fn has_show_annotation(&self, item: &dyn Item) -> bool {
        !self.show_annotations.is_empty() && item.modifiers().has_any_annotation(&self.show_annotations)
    }
}

impl ItemPredicate for ApiPredicate {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool {
        // Parameters belong to the API exactly when their method does.
        if let ItemRef::Parameter(_, method) = item {
            return self.test(codebase, ItemRef::callable(method));
        }

        let target = item.item();
        if !self.allow_classes_from_classpath && target.is_from_class_path() {
            return false;
        }
        let shown = self.has_show_annotation(target);
        if target.hidden() && !shown {
            return false;
        }

        // Packages are part of the API only through their classes.
        if let ItemRef::Package(_) = item {
            return false;
        }
        let mut visible = target.modifiers().is_public() || target.modifiers().is_protected();
        if !visible {
            return false;
        }

        let mut has_show = self.ignore_shown || shown;
        let mut doc_only = target.doc_only();
        let mut removed = target.removed();

        let mut class = item.class_id().map(|id| codebase.class(id));
        // A class starts the walk at its container, members at their class.
        if let ItemRef::Class(c) = item {
            class = codebase.containing_class(c);
            let package = codebase.containing_package(c);
            if package.hidden() {
                return false;
            }
            removed |= package.removed();
            doc_only |= package.doc_only();
        } else if let Some(owner) = class {
            let package = codebase.containing_package(owner);
            if package.hidden() {
                return false;
            }
        }

        while let Some(current) = class {
            visible = visible && (current.modifiers().is_public() || current.modifiers().is_protected());
            if current.hidden() && !self.has_show_annotation(current) {
                return false;
            }
            has_show = has_show || (self.match_removed && self.has_show_annotation(current));
            doc_only = doc_only || current.doc_only();
            removed = removed || current.removed();
            if current.containing_class_id().is_none() {
                let package = codebase.containing_package(current);
                removed |= package.removed();
                doc_only |= package.doc_only();
            }
            class = codebase.containing_class(current);
        }

        if self.ignore_removed {
            removed = false;
        }
        if self.include_doc_only {
            doc_only = false;
        }
        visible && has_show && !doc_only && removed == self.match_removed
    }
}

/// Accepts an item if the wrapped predicate does, and accepts a package
/// that contains at least one accepted class.
pub struct FilterPredicate<P>(pub P);

impl<P: ItemPredicate> ItemPredicate for FilterPredicate<P> {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool {
        if self.0.test(codebase, item) {
            return true;
        }
        match item {
            ItemRef::Package(package) => package
                .class_ids()
                .iter()
                .any(|id| self.contains_accepted_class(codebase, *id)),
            _ => false,
        }
    }
}

impl<P: ItemPredicate> FilterPredicate<P> {
    fn contains_accepted_class(&self, codebase: &Codebase, id: crate::model::ClassId) -> bool {
        let class = codebase.class(id);
        self.0.test(codebase, ItemRef::Class(class))
            || class
                .inner_class_ids()
                .iter()
                .any(|inner| self.contains_accepted_class(codebase, *inner))
    }
}

/// Rejects methods that merely repeat an overridden method already in the
/// API: same signature, same deprecation status.
pub struct ElidingPredicate<P>(pub P);

impl<P: ItemPredicate> ItemPredicate for ElidingPredicate<P> {
    fn test(&self, codebase: &Codebase, item: ItemRef<'_>) -> bool {
        let ItemRef::Method(method) = item else {
            return true;
        };
        let repeated = codebase.find_predicate_super_method(method, |candidate| {
            candidate.same_signature(method)
                && candidate.deprecated() == method.deprecated()
                && candidate.modifiers().is_abstract() == method.modifiers().is_abstract()
                && self.0.test(codebase, ItemRef::Method(candidate))
        });
        if let Some(super_method) = repeated {
            tracing::trace!(
                "Eliding {} (repeats {})",
                item.describe(),
                super_method.containing_class()
            );
        }
        repeated.is_none()
    }
}

/// The API views a signature file can describe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiView {
    #[default]
    Public,
    Removed,
    Private,
}

impl ApiView {
    /// Name used on the command line and in file names.
    pub fn display_name(&self) -> &'static str {
        match self {
            ApiView::Public => "api",
            ApiView::Removed => "removed",
            ApiView::Private => "private",
        }
    }

    /// Whether a declaration belongs to this view.
    pub fn emit_filter(&self) -> BoxedPredicate {
        match self {
            ApiView::Public => Box::new(And(
                FilterPredicate(ApiPredicate::new()),
                ElidingPredicate(ApiPredicate::new()),
            )),
            ApiView::Removed => Box::new(And(
                FilterPredicate(ApiPredicate::new().matching_removed()),
                ElidingPredicate(ApiPredicate::new().ignoring_removed()),
            )),
            ApiView::Private => Box::new(And(NotCloned, Not(FilterPredicate(ApiPredicate::new())))),
        }
    }

    /// Whether a type reference to an item is kept in this view.
    pub fn reference_filter(&self) -> BoxedPredicate {
        match self {
            ApiView::Public => Box::new(ApiPredicate::new()),
            ApiView::Removed => Box::new(ApiPredicate::new().ignoring_removed()),
            ApiView::Private => Box::new(AllItems),
        }
    }
}

impl fmt::Display for ApiView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApiView::Public => "public",
            ApiView::Removed => "removed",
            ApiView::Private => "private",
        })
    }
}

impl std::str::FromStr for ApiView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" | "api" => Ok(ApiView::Public),
            "removed" => Ok(ApiView::Removed),
            "private" => Ok(ApiView::Private),
            _ => Err(format!("Unknown API view: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ClassItem, ClassKind, CodebaseBuilder, ItemState, MethodItem, ModifierList, SourcePosition,
        TypeItem,
    };

    fn state(flags: u32, docs: &str) -> ItemState {
        ItemState::new(ModifierList::new().with_flags(flags), docs, SourcePosition::default())
    }

    fn void_method(name: &str, flags: u32, docs: &str) -> MethodItem {
        MethodItem::method(name, TypeItem::parse("void").unwrap(), Vec::new(), state(flags, docs))
    }

    fn sample() -> Codebase {
        let public = ModifierList::PUBLIC;
        let mut builder = CodebaseBuilder::new("test");
        let pkg = builder.package("test.pkg", state(public, ""));

        let base = builder
            .add_class(pkg, None, ClassItem::new("Base", ClassKind::Class, state(public, "")))
            .unwrap();
        builder.add_method(base, void_method("run", public, "")).unwrap();

        let child = ClassItem::new("Child", ClassKind::Class, state(public, ""))
            .with_super_class_type(Some(TypeItem::parse("test.pkg.Base").unwrap()));
        let child = builder.add_class(pkg, None, child).unwrap();
        builder.add_method(child, void_method("run", public, "")).unwrap();
        builder.add_method(child, void_method("gone", public, "/** @removed */")).unwrap();
        builder.add_method(child, void_method("secret", public, "/** @hide */")).unwrap();
        builder.add_method(child, void_method("local", 0, "")).unwrap();

        let hidden = builder
            .add_class(pkg, None, ClassItem::new("Hidden", ClassKind::Class, state(public, "/** @hide */")))
            .unwrap();
        builder.add_method(hidden, void_method("inner", public, "")).unwrap();

        let other = builder.package("test.internal", state(public, ""));
        builder
            .add_class(other, None, ClassItem::new("Impl", ClassKind::Class, state(0, "")))
            .unwrap();
        builder.build()
    }

    fn method<'a>(codebase: &'a Codebase, class: &str, name: &str) -> ItemRef<'a> {
        let class = codebase.find_class(class).unwrap();
        ItemRef::Method(class.methods().iter().find(|m| m.name() == name).unwrap())
    }

    #[test]
    fn test_api_predicate() {
        let codebase = sample();
        let api = ApiPredicate::new();
        assert!(api.test(&codebase, method(&codebase, "test.pkg.Base", "run")));
        assert!(!api.test(&codebase, method(&codebase, "test.pkg.Child", "gone")));
        assert!(!api.test(&codebase, method(&codebase, "test.pkg.Child", "secret")));
        assert!(!api.test(&codebase, method(&codebase, "test.pkg.Child", "local")));
        assert!(!api.test(&codebase, method(&codebase, "test.pkg.Hidden", "inner")));

        let removed = ApiPredicate::new().matching_removed();
        assert!(removed.test(&codebase, method(&codebase, "test.pkg.Child", "gone")));
        assert!(!removed.test(&codebase, method(&codebase, "test.pkg.Base", "run")));
    }

    #[test]
    fn test_public_view_elides_repeated_overrides() {
        let codebase = sample();
        let emit = ApiView::Public.emit_filter();
        assert!(emit.test(&codebase, method(&codebase, "test.pkg.Base", "run")));
        assert!(!emit.test(&codebase, method(&codebase, "test.pkg.Child", "run")));
    }

    #[test]
    fn test_package_filter() {
        let codebase = sample();
        let emit = ApiView::Public.emit_filter();
        let pkg = codebase.find_package("test.pkg").unwrap();
        let internal = codebase.find_package("test.internal").unwrap();
        assert!(emit.test(&codebase, ItemRef::Package(pkg)));
        assert!(!ApiPredicate::new().test(&codebase, ItemRef::Package(pkg)));
        assert!(!FilterPredicate(ApiPredicate::new()).test(&codebase, ItemRef::Package(internal)));
        assert!(!FilterPredicate(ApiPredicate::new())
            .test(&codebase, ItemRef::Class(codebase.find_class("test.internal.Impl").unwrap())));
    }

    #[test]
    fn test_private_view_is_complement() {
        let codebase = sample();
        let emit = ApiView::Private.emit_filter();
        assert!(emit.test(&codebase, method(&codebase, "test.pkg.Child", "local")));
        assert!(emit.test(&codebase, method(&codebase, "test.pkg.Hidden", "inner")));
        assert!(!emit.test(&codebase, method(&codebase, "test.pkg.Base", "run")));
        assert!(ApiView::Private
            .reference_filter()
            .test(&codebase, method(&codebase, "test.pkg.Base", "run")));
    }

    #[test]
    fn test_view_names() {
        assert_eq!("removed".parse::<ApiView>().unwrap(), ApiView::Removed);
        assert_eq!(ApiView::Public.display_name(), "api");
        assert!("bogus".parse::<ApiView>().is_err());
    }
}
