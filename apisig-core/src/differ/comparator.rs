//! Lockstep walk over two codebases.
//!
//! Items are paired by identity: packages and classes by qualified name,
//! methods and constructors by name plus erased parameter types, fields and
//! properties by name, parameters by position. Only items accepted by the
//! filter take part; an item rejected on one side counts as absent there.

use std::collections::BTreeMap;

use tracing::debug;

use crate::filter::ItemPredicate;
use crate::model::{ClassItem, Codebase, Item, ItemRef, MethodItem, PackageItem};

/// The two codebases being compared.
#[derive(Clone, Copy, Debug)]
pub struct Comparison<'a> {
    pub old: &'a Codebase,
    pub new: &'a Codebase,
}

/// Callbacks invoked by [`compare_codebases`].
///
/// `compare` always receives two items of the same variant. Added and
/// removed items are reported once; their children are not visited.
pub trait ComparisonVisitor<'a> {
    fn compare(&mut self, cx: Comparison<'a>, old: ItemRef<'a>, new: ItemRef<'a>) {
        let _ = (cx, old, new);
    }

    fn added(&mut self, cx: Comparison<'a>, new: ItemRef<'a>) {
        let _ = (cx, new);
    }

    fn removed(&mut self, cx: Comparison<'a>, old: ItemRef<'a>) {
        let _ = (cx, old);
    }
}

/// Counts from one walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub compared: usize,
    pub added: usize,
    pub removed: usize,
}

/// Walk `old` and `new` together, in qualified-name order.
pub fn compare_codebases<'a, V>(
    old: &'a Codebase,
    new: &'a Codebase,
    filter: &dyn ItemPredicate,
    visitor: &mut V,
) -> WalkStats
where
    V: ComparisonVisitor<'a> + ?Sized,
{
    let mut walker = Walker {
        cx: Comparison { old, new },
        filter,
        visitor,
        stats: WalkStats::default(),
    };
    walker.packages();
    debug!(
        compared = walker.stats.compared,
        added = walker.stats.added,
        removed = walker.stats.removed,
        "compared {} with {}",
        old.description(),
        new.description()
    );
    walker.stats
}

struct Walker<'a, 'f, V: ?Sized> {
    cx: Comparison<'a>,
    filter: &'f dyn ItemPredicate,
    visitor: &'f mut V,
    stats: WalkStats,
}

/// Pair two keyed lists. The map keeps keys sorted.
fn pair_up<T>(
    old: impl IntoIterator<Item = (String, T)>,
    new: impl IntoIterator<Item = (String, T)>,
) -> BTreeMap<String, (Option<T>, Option<T>)> {
    let mut pairs: BTreeMap<String, (Option<T>, Option<T>)> = BTreeMap::new();
    for (key, item) in old {
        pairs.entry(key).or_insert((None, None)).0 = Some(item);
    }
    for (key, item) in new {
        pairs.entry(key).or_insert((None, None)).1 = Some(item);
    }
    pairs
}

impl<'a, 'f, V> Walker<'a, 'f, V>
where
    V: ComparisonVisitor<'a> + ?Sized,
{
    fn visit(&mut self, old: Option<ItemRef<'a>>, new: Option<ItemRef<'a>>) -> bool {
        match (old, new) {
            (Some(old), Some(new)) => {
                self.stats.compared += 1;
                self.visitor.compare(self.cx, old, new);
                true
            }
            (Some(old), None) => {
                self.stats.removed += 1;
                self.visitor.removed(self.cx, old);
                false
            }
            (None, Some(new)) => {
                self.stats.added += 1;
                self.visitor.added(self.cx, new);
                false
            }
            (None, None) => false,
        }
    }

    fn packages(&mut self) {
        let cx = self.cx;
        let filter = self.filter;
        let accepted = |codebase: &'a Codebase| {
            codebase
                .packages()
                .iter()
                .filter(move |p| filter.test(codebase, ItemRef::Package(*p)))
                .map(|p| (p.qualified_name().to_string(), p))
                .collect::<Vec<_>>()
        };
        let pairs = pair_up(accepted(cx.old), accepted(cx.new));

        for (_, (old, new)) in pairs {
            if self.visit(old.map(ItemRef::Package), new.map(ItemRef::Package)) {
                if let (Some(old), Some(new)) = (old, new) {
                    self.package_classes(old, new);
                }
            }
        }
    }

    fn accepted_classes(
        &self,
        codebase: &'a Codebase,
        classes: impl Iterator<Item = &'a ClassItem>,
    ) -> Vec<(String, &'a ClassItem)> {
        classes
            .filter(|c| self.filter.test(codebase, ItemRef::Class(*c)))
            .map(|c| (c.qualified_name().to_string(), c))
            .collect()
    }

    fn package_classes(&mut self, old: &'a PackageItem, new: &'a PackageItem) {
        let cx = self.cx;
        let pairs = pair_up(
            self.accepted_classes(cx.old, cx.old.top_level_classes(old)),
            self.accepted_classes(cx.new, cx.new.top_level_classes(new)),
        );
        self.classes(pairs);
    }

    fn classes(&mut self, pairs: BTreeMap<String, (Option<&'a ClassItem>, Option<&'a ClassItem>)>) {
        for (_, (old, new)) in pairs {
            if self.visit(old.map(ItemRef::Class), new.map(ItemRef::Class)) {
                if let (Some(old), Some(new)) = (old, new) {
                    self.class_members(old, new);
                }
            }
        }
    }

    fn class_members(&mut self, old: &'a ClassItem, new: &'a ClassItem) {
        let cx = self.cx;
        let filter = self.filter;

        let callables = |codebase: &'a Codebase, methods: &'a [MethodItem]| {
            methods
                .iter()
                .filter(move |m| filter.test(codebase, ItemRef::callable(*m)))
                .map(|m| (m.signature_key(), m))
                .collect::<Vec<_>>()
        };
        let constructors = pair_up(
            callables(cx.old, old.constructors()),
            callables(cx.new, new.constructors()),
        );
        let methods = pair_up(callables(cx.old, old.methods()), callables(cx.new, new.methods()));
        for (_, (old, new)) in constructors.into_iter().chain(methods) {
            if self.visit(old.map(ItemRef::callable), new.map(ItemRef::callable)) {
                if let (Some(old), Some(new)) = (old, new) {
                    self.parameters(old, new);
                }
            }
        }

        let fields = |codebase: &'a Codebase, class: &'a ClassItem| {
            class
                .fields()
                .iter()
                .filter(move |f| filter.test(codebase, ItemRef::Field(*f)))
                .map(|f| (f.name().to_string(), f))
                .collect::<Vec<_>>()
        };
        for (_, (old, new)) in pair_up(fields(cx.old, old), fields(cx.new, new)) {
            self.visit(old.map(ItemRef::Field), new.map(ItemRef::Field));
        }

        let properties = |codebase: &'a Codebase, class: &'a ClassItem| {
            class
                .properties()
                .iter()
                .filter(move |p| filter.test(codebase, ItemRef::Property(*p)))
                .map(|p| (p.name().to_string(), p))
                .collect::<Vec<_>>()
        };
        for (_, (old, new)) in pair_up(properties(cx.old, old), properties(cx.new, new)) {
            self.visit(old.map(ItemRef::Property), new.map(ItemRef::Property));
        }

        let inner = pair_up(
            self.accepted_classes(cx.old, cx.old.inner_classes(old)),
            self.accepted_classes(cx.new, cx.new.inner_classes(new)),
        );
        self.classes(inner);
    }

    // Matching signature keys imply equal parameter counts.
    fn parameters(&mut self, old: &'a MethodItem, new: &'a MethodItem) {
        for (old_param, new_param) in old.parameters().iter().zip(new.parameters()) {
            self.stats.compared += 1;
            self.visitor.compare(
                self.cx,
                ItemRef::Parameter(old_param, old),
                ItemRef::Parameter(new_param, new),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AllItems, ApiPredicate, FilterPredicate};
    use crate::signature::parse_signature;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl<'a> ComparisonVisitor<'a> for Recorder {
        fn compare(&mut self, _cx: Comparison<'a>, old: ItemRef<'a>, new: ItemRef<'a>) {
            assert_eq!(old.kind_name(), new.kind_name());
            self.events.push(format!("= {}", new.describe()));
        }

        fn added(&mut self, _cx: Comparison<'a>, new: ItemRef<'a>) {
            self.events.push(format!("+ {}", new.describe()));
        }

        fn removed(&mut self, _cx: Comparison<'a>, old: ItemRef<'a>) {
            self.events.push(format!("- {}", old.describe()));
        }
    }

    const OLD: &str = "// Signature format: 2.0\n\
package b.pkg {\n\
  public class Gone {\n\
    ctor public Gone();\n\
  }\n\
}\n\
package a.pkg {\n\
  public class Foo {\n\
    ctor public Foo();\n\
    method public void bar(int);\n\
    method public void baz(String);\n\
    field public int count;\n\
  }\n\
  public static class Foo.Inner {\n\
    method public void run();\n\
  }\n\
}\n";

    const NEW: &str = "// Signature format: 2.0\n\
package a.pkg {\n\
  public class Foo {\n\
    ctor public Foo();\n\
    method public void bar(int);\n\
    method public void baz(CharSequence);\n\
    field public int count;\n\
    field public int size;\n\
  }\n\
  public static class Foo.Inner {\n\
    method public void run();\n\
  }\n\
  public class Added {\n\
    method public void ignored();\n\
  }\n\
}\n";

    #[test]
    fn test_walk_order_and_pairing() {
        let old = parse_signature("old", OLD).unwrap();
        let new = parse_signature("new", NEW).unwrap();
        let mut recorder = Recorder::default();
        let stats = compare_codebases(&old, &new, &AllItems, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "= package a.pkg",
                "+ class a.pkg.Added",
                "= class a.pkg.Foo",
                "= constructor a.pkg.Foo.Foo",
                "= method a.pkg.Foo.bar",
                "= parameter arg1 in a.pkg.Foo.bar",
                "+ method a.pkg.Foo.baz",
                "- method a.pkg.Foo.baz",
                "= field a.pkg.Foo.count",
                "+ field a.pkg.Foo.size",
                "= class a.pkg.Foo.Inner",
                "= method a.pkg.Foo.Inner.run",
                "- package b.pkg",
            ]
        );
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.added, 3);
    }

    #[test]
    fn test_filtered_items_count_as_absent() {
        let old = parse_signature(
            "old",
            "// Signature format: 2.0\npackage p {\n  public class A {\n    method public void m();\n  }\n}\n",
        )
        .unwrap();
        let new = parse_signature(
            "new",
            "// Signature format: 2.0\npackage p {\n  public class A {\n    method protected void m();\n    method void hidden();\n  }\n}\n",
        )
        .unwrap();
        let mut recorder = Recorder::default();
        compare_codebases(&old, &new, &FilterPredicate(ApiPredicate::new()), &mut recorder);
        assert_eq!(
            recorder.events,
            vec!["= package p", "= class p.A", "= method p.A.m"]
        );
    }
}
