//! Change summary: what was added, removed or modified between two codebases.
//!
//! Unlike the compatibility check this does not consult severities; it
//! records every difference, flagging the ones that break existing callers.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::comparator::{compare_codebases, Comparison, ComparisonVisitor};
use crate::filter::{ApiPredicate, FilterPredicate};
use crate::model::{ClassItem, Codebase, FieldItem, Item, ItemRef, MethodItem, ModifierList, ParameterItem};

/// Type of change detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
        }
    }
}

/// Kind of item that changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Package,
    Class,
    Constructor,
    Method,
    Field,
    Property,
    Parameter,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Package => "package",
            ItemKind::Class => "class",
            ItemKind::Constructor => "constructor",
            ItemKind::Method => "method",
            ItemKind::Field => "field",
            ItemKind::Property => "property",
            ItemKind::Parameter => "parameter",
        }
    }

    fn of(item: ItemRef<'_>) -> Self {
        match item {
            ItemRef::Package(_) => ItemKind::Package,
            ItemRef::Class(_) => ItemKind::Class,
            ItemRef::Constructor(_) => ItemKind::Constructor,
            ItemRef::Method(_) => ItemKind::Method,
            ItemRef::Field(_) => ItemKind::Field,
            ItemRef::Property(_) => ItemKind::Property,
            ItemRef::Parameter(..) => ItemKind::Parameter,
        }
    }
}

/// A single change to an API item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiChange {
    pub change_type: ChangeType,

    pub item_kind: ItemKind,

    /// Qualified name of the item
    pub name: String,

    /// What changed, for modifications
    pub details: Option<String>,

    /// Whether existing callers or implementors can break
    pub is_breaking: bool,
}

impl ApiChange {
    /// Removals are breaking; additions are not.
    pub fn create(change_type: ChangeType, item: ItemRef<'_>) -> Self {
        Self {
            change_type,
            item_kind: ItemKind::of(item),
            name: item.qualified_name(),
            details: None,
            is_breaking: change_type == ChangeType::Removed,
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    pub fn mark_breaking(mut self) -> Self {
        self.is_breaking = true;
        self
    }
}

/// Per-kind counters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    pub packages_added: u32,
    pub packages_removed: u32,

    pub classes_added: u32,
    pub classes_removed: u32,
    pub classes_modified: u32,

    pub methods_added: u32,
    pub methods_removed: u32,
    pub methods_modified: u32,

    pub fields_added: u32,
    pub fields_removed: u32,
    pub fields_modified: u32,

    pub parameters_modified: u32,

    pub breaking_changes: u32,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for a change. Constructors count as methods,
    /// properties as fields.
    pub fn record(&mut self, kind: ItemKind, change_type: ChangeType, is_breaking: bool) {
        use ChangeType::*;
        match (kind, change_type) {
            (ItemKind::Package, Added) => self.packages_added += 1,
            (ItemKind::Package, Removed) => self.packages_removed += 1,
            (ItemKind::Class, Added) => self.classes_added += 1,
            (ItemKind::Class, Removed) => self.classes_removed += 1,
            (ItemKind::Class, Modified) => self.classes_modified += 1,
            (ItemKind::Constructor | ItemKind::Method, Added) => self.methods_added += 1,
            (ItemKind::Constructor | ItemKind::Method, Removed) => self.methods_removed += 1,
            (ItemKind::Constructor | ItemKind::Method, Modified) => self.methods_modified += 1,
            (ItemKind::Field | ItemKind::Property, Added) => self.fields_added += 1,
            (ItemKind::Field | ItemKind::Property, Removed) => self.fields_removed += 1,
            (ItemKind::Field | ItemKind::Property, Modified) => self.fields_modified += 1,
            (ItemKind::Parameter, Modified) => self.parameters_modified += 1,
            _ => {}
        }

        if is_breaking {
            self.breaking_changes += 1;
        }
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let groups = [
            ("packages", self.packages_added, self.packages_removed, 0),
            ("classes", self.classes_added, self.classes_removed, self.classes_modified),
            ("methods", self.methods_added, self.methods_removed, self.methods_modified),
            ("fields", self.fields_added, self.fields_removed, self.fields_modified),
            ("parameters", 0, 0, self.parameters_modified),
        ];

        let mut parts = Vec::new();
        for (label, added, removed, modified) in groups {
            let mut counts = Vec::new();
            if added > 0 {
                counts.push(format!("{} added", added));
            }
            if removed > 0 {
                counts.push(format!("{} removed", removed));
            }
            if modified > 0 {
                counts.push(format!("{} modified", modified));
            }
            if !counts.is_empty() {
                parts.push(format!("{}: {}", label, counts.join(", ")));
            }
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else if self.breaking_changes > 0 {
            format!("{} ({} breaking)", parts.join("; "), self.breaking_changes)
        } else {
            parts.join("; ")
        }
    }
}

/// Complete result of a change summary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// All changes, in walk order
    pub changes: Vec<ApiChange>,

    pub summary: DiffSummary,

    pub summary_text: String,

    pub duration_ms: f64,
}

impl ChangeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change and update summary.
    pub fn add_change(&mut self, change: ApiChange) {
        self.summary
            .record(change.item_kind, change.change_type, change.is_breaking);
        self.changes.push(change);
    }

    /// Finalize the result with timing and summary text.
    pub fn finalize(&mut self, duration_ms: f64) {
        self.duration_ms = duration_ms;
        self.summary_text = self.summary.text();
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn breaking_changes(&self) -> impl Iterator<Item = &ApiChange> {
        self.changes.iter().filter(|c| c.is_breaking)
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.breaking_changes().next().is_some()
    }
}

/// Differences found on one matched pair.
#[derive(Default)]
struct Differences {
    details: Vec<String>,
    breaking: bool,
}

impl Differences {
    fn check(&mut self, label: &str, old: String, new: String, breaking: bool) {
        if old != new {
            self.details.push(format!("{}: {} -> {}", label, or_none(&old), or_none(&new)));
            self.breaking |= breaking;
        }
    }

    fn modifiers(&mut self, old: &ModifierList, new: &ModifierList) {
        let narrowed = new.visibility() < old.visibility();
        let gained = |flag: u32| !old.has(flag) && new.has(flag);
        let breaking = narrowed
            || old.is_static() != new.is_static()
            || gained(ModifierList::FINAL)
            || gained(ModifierList::ABSTRACT)
            || gained(ModifierList::SEALED)
            || (old.is_vararg() && !new.is_vararg());
        self.check("modifiers", keywords(old), keywords(new), breaking);
    }
}

fn or_none(text: &str) -> &str {
    if text.is_empty() {
        "none"
    } else {
        text
    }
}

fn keywords(modifiers: &ModifierList) -> String {
    modifiers.keywords().collect::<Vec<_>>().join(" ")
}

fn nullness(item: &dyn Item) -> String {
    item.modifiers()
        .find_nullness_annotation()
        .map(|a| format!("@{}", a.simple_name()))
        .unwrap_or_default()
}

fn class_differences(old: &ClassItem, new: &ClassItem, found: &mut Differences) {
    found.check("kind", old.kind().keyword().into(), new.kind().keyword().into(), true);
    found.check(
        "type parameters",
        old.type_parameters().to_signature_string(true),
        new.type_parameters().to_signature_string(true),
        true,
    );
    let super_class = |c: &ClassItem| c.super_class_type().map(|t| t.signature_key()).unwrap_or_default();
    found.check("superclass", super_class(old), super_class(new), true);
    let interfaces = |c: &ClassItem| {
        let mut names: Vec<String> = c.interface_types().iter().map(|t| t.signature_key()).collect();
        names.sort();
        names.join(", ")
    };
    found.check("interfaces", interfaces(old), interfaces(new), false);
}

fn method_differences(old: &MethodItem, new: &MethodItem, found: &mut Differences) {
    let return_type = |m: &MethodItem| m.return_type().map(|t| t.canonical().to_string()).unwrap_or_default();
    found.check("return", return_type(old), return_type(new), true);
    found.check("nullness", nullness(old), nullness(new), false);
    let throws = |m: &MethodItem| {
        m.throws()
            .iter()
            .map(|t| t.signature_key())
            .collect::<Vec<_>>()
            .join(", ")
    };
    found.check("throws", throws(old), throws(new), false);
}

fn field_differences(old: &FieldItem, new: &FieldItem, found: &mut Differences) {
    found.check("type", old.ty().canonical().into(), new.ty().canonical().into(), true);
    found.check("nullness", nullness(old), nullness(new), false);
    found.check(
        "value",
        old.initial_value().unwrap_or_default().into(),
        new.initial_value().unwrap_or_default().into(),
        old.initial_value().is_some(),
    );
}

fn parameter_differences(old: &ParameterItem, new: &ParameterItem, found: &mut Differences) {
    found.check(
        "name",
        old.public_name().unwrap_or_default().into(),
        new.public_name().unwrap_or_default().into(),
        old.public_name().is_some(),
    );
    found.check("nullness", nullness(old), nullness(new), false);
    let default = |p: &ParameterItem| if p.has_default_value() { "default" } else { "" }.to_string();
    found.check("default", default(old), default(new), old.has_default_value());
}

impl<'a> ComparisonVisitor<'a> for ChangeSummary {
    fn compare(&mut self, _cx: Comparison<'a>, old: ItemRef<'a>, new: ItemRef<'a>) {
        let mut found = Differences::default();
        if !matches!(new, ItemRef::Package(_)) {
            found.modifiers(old.item().modifiers(), new.item().modifiers());
        }
        match (old, new) {
            (ItemRef::Class(o), ItemRef::Class(n)) => class_differences(o, n, &mut found),
            (ItemRef::Constructor(o), ItemRef::Constructor(n)) | (ItemRef::Method(o), ItemRef::Method(n)) => {
                method_differences(o, n, &mut found)
            }
            (ItemRef::Field(o), ItemRef::Field(n)) => field_differences(o, n, &mut found),
            (ItemRef::Property(o), ItemRef::Property(n)) => {
                found.check("type", o.ty().canonical().into(), n.ty().canonical().into(), true)
            }
            (ItemRef::Parameter(o, _), ItemRef::Parameter(n, _)) => parameter_differences(o, n, &mut found),
            _ => {}
        }
        if found.details.is_empty() {
            return;
        }
        let mut change = ApiChange::create(ChangeType::Modified, new).with_details(found.details.join(", "));
        if found.breaking {
            change = change.mark_breaking();
        }
        self.add_change(change);
    }

    fn added(&mut self, _cx: Comparison<'a>, new: ItemRef<'a>) {
        self.add_change(ApiChange::create(ChangeType::Added, new));
    }

    fn removed(&mut self, _cx: Comparison<'a>, old: ItemRef<'a>) {
        self.add_change(ApiChange::create(ChangeType::Removed, old));
    }
}

/// Summarize the public API changes from `old` to `new`.
pub fn summarize_changes(old: &Codebase, new: &Codebase) -> ChangeSummary {
    let start = Instant::now();
    let mut summary = ChangeSummary::new();
    compare_codebases(old, new, &FilterPredicate(ApiPredicate::new()), &mut summary);
    summary.finalize(start.elapsed().as_secs_f64() * 1000.0);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::parse_signature;

    #[test]
    fn test_change_type_as_str() {
        assert_eq!(ChangeType::Added.as_str(), "added");
        assert_eq!(ChangeType::Removed.as_str(), "removed");
        assert_eq!(ChangeType::Modified.as_str(), "modified");
        assert_eq!(ItemKind::Constructor.as_str(), "constructor");
    }

    #[test]
    fn test_diff_summary_record() {
        let mut summary = DiffSummary::default();

        summary.record(ItemKind::Method, ChangeType::Added, false);
        summary.record(ItemKind::Constructor, ChangeType::Added, false);
        assert_eq!(summary.methods_added, 2);

        summary.record(ItemKind::Class, ChangeType::Removed, true);
        assert_eq!(summary.classes_removed, 1);
        assert_eq!(summary.breaking_changes, 1);
    }

    #[test]
    fn test_diff_summary_text() {
        let summary = DiffSummary {
            methods_added: 2,
            classes_modified: 1,
            ..Default::default()
        };

        let text = summary.text();
        assert!(text.contains("methods: 2 added"));
        assert!(text.contains("classes: 1 modified"));
        assert!(!text.contains("breaking"));
    }

    #[test]
    fn test_diff_summary_text_no_changes() {
        assert_eq!(DiffSummary::default().text(), "No changes");
    }

    #[test]
    fn test_summarize_changes() {
        let old = parse_signature(
            "old",
            "// Signature format: 2.0\n\
package p {\n\
  public class A {\n\
    method public void gone();\n\
    method public int size(String key);\n\
    field public static final int F = 1;\n\
  }\n\
}\n",
        )
        .unwrap();
        let new = parse_signature(
            "new",
            "// Signature format: 2.0\n\
package p {\n\
  public class A {\n\
    method public void fresh();\n\
    method public long size(String name);\n\
    field public static final int F = 1;\n\
  }\n\
}\n",
        )
        .unwrap();

        let result = summarize_changes(&old, &new);
        let described: Vec<String> = result
            .changes
            .iter()
            .map(|c| format!("{} {} {}", c.change_type.as_str(), c.item_kind.as_str(), c.name))
            .collect();
        assert_eq!(
            described,
            vec![
                "added method p.A.fresh",
                "removed method p.A.gone",
                "modified method p.A.size",
                "modified parameter p.A.size.name",
            ]
        );
        assert_eq!(result.changes[2].details.as_deref(), Some("return: int -> long"));
        assert!(result.changes[2].is_breaking);
        assert_eq!(result.summary.breaking_changes, 3);
        assert_eq!(
            result.summary_text,
            "methods: 1 added, 1 removed, 1 modified; parameters: 1 modified (3 breaking)"
        );
    }
}
