//! Compatibility rules applied to paired items.
//!
//! Every rule is independent: a matched pair is run through all of them and
//! more than one may fire. The run is incompatible when at least one
//! error-severity diagnostic was reported.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, trace};

use super::comparator::{compare_codebases, Comparison, ComparisonVisitor};
use crate::error::{Result, SignatureError};
use crate::filter::{ApiPredicate, FilterPredicate};
use crate::model::{
    ClassItem, Codebase, ConstantValue, FieldItem, Item, ItemRef, MethodItem, ModifierList, Nullness,
    ParameterItem,
};
use crate::report::issues::{self, Issue};
use crate::report::{Diagnostic, DiagnosticSink, ErrorConfiguration, Reporter, VecSink};

/// Checks a new codebase against the previous one.
pub struct CompatibilityCheck<'r, 'c, S: DiagnosticSink> {
    reporter: &'r mut Reporter<'c, S>,
}

impl<'r, 'c, S: DiagnosticSink> CompatibilityCheck<'r, 'c, S> {
    pub fn new(reporter: &'r mut Reporter<'c, S>) -> Self {
        Self { reporter }
    }

    /// Run the check. Returns true when any error was reported.
    pub fn run(old: &Codebase, new: &Codebase, reporter: &'r mut Reporter<'c, S>) -> bool {
        let errors_before = reporter.error_count();
        let mut check = CompatibilityCheck::new(reporter);
        let filter = FilterPredicate(ApiPredicate::new());
        let stats = compare_codebases(old, new, &filter, &mut check);
        let errors = check.reporter.error_count() - errors_before;
        debug!(
            compared = stats.compared,
            reported = check.reporter.reported_count(),
            errors,
            "compatibility check finished"
        );
        errors > 0
    }

    fn report(&mut self, issue: &'static Issue, codebase: &Codebase, item: ItemRef<'_>, message: String) {
        trace!(issue = issue.name, item = %item.describe(), "rule fired");
        self.reporter.report(issue, codebase, item, &message);
    }

    // Rules shared by every item kind.
    fn compare_common<'a>(&mut self, cx: Comparison<'a>, old: ItemRef<'a>, new: ItemRef<'a>) {
        let old_modifiers = old.item().modifiers();
        let new_modifiers = new.item().modifiers();

        if let Some(old_annotation) = old_modifiers.find_nullness_annotation() {
            match (old_modifiers.nullness(), new_modifiers.nullness()) {
                (_, None) => self.report(
                    &issues::INVALID_NULL_CONVERSION,
                    cx.new,
                    new,
                    format!(
                        "Attempted to remove @{} annotation from {}",
                        old_annotation.simple_name(),
                        new.describe()
                    ),
                ),
                (Some(Nullness::Nullable), Some(Nullness::NonNull))
                    if matches!(old, ItemRef::Parameter(..)) =>
                {
                    self.report(
                        &issues::INVALID_NULL_CONVERSION,
                        cx.new,
                        new,
                        format!(
                            "Attempted to change parameter from @Nullable to @NonNull: incompatible change for {}",
                            new.describe()
                        ),
                    )
                }
                (Some(Nullness::NonNull), Some(Nullness::Nullable))
                    if matches!(old, ItemRef::Method(_)) =>
                {
                    self.report(
                        &issues::INVALID_NULL_CONVERSION,
                        cx.new,
                        new,
                        format!(
                            "Attempted to change method return from @NonNull to @Nullable: incompatible change for {}",
                            new.describe()
                        ),
                    )
                }
                _ => {}
            }
        }

        if old_modifiers.is_operator() && !new_modifiers.is_operator() {
            self.report(
                &issues::OPERATOR_REMOVAL,
                cx.new,
                new,
                format!("Cannot remove `operator` modifier from {}: Incompatible change", new.describe()),
            );
        }

        if old_modifiers.is_infix() && !new_modifiers.is_infix() {
            self.report(
                &issues::INFIX_REMOVAL,
                cx.new,
                new,
                format!("Cannot remove `infix` modifier from {}: Incompatible change", new.describe()),
            );
        }

        if old_modifiers.is_vararg() && !new_modifiers.is_vararg() {
            self.report(
                &issues::VARARG_REMOVAL,
                cx.new,
                new,
                format!("Changing from varargs to array is an incompatible change: {}", new.describe()),
            );
        }

        if !old_modifiers.is_sealed() && new_modifiers.is_sealed() {
            self.report(
                &issues::ADD_SEALED,
                cx.new,
                new,
                format!("Cannot add `sealed` modifier to {}: Incompatible change", new.describe()),
            );
        }

        let newly_final = match new {
            ItemRef::Class(_) => true,
            ItemRef::Method(method) => !cx.new.class(method.class_id()).modifiers().is_final(),
            _ => false,
        };
        if newly_final && !old_modifiers.is_final() && new_modifiers.is_final() {
            self.report(
                &issues::NEWLY_FINAL,
                cx.new,
                new,
                format!(
                    "Making a class or method final is an incompatible change: {}",
                    new.describe()
                ),
            );
        }

        if !matches!(new, ItemRef::Parameter(..) | ItemRef::Property(_)) {
            self.compare_flags(cx, old, new);
        }
    }

    // Static, scope and deprecation for classes and members.
    fn compare_flags<'a>(&mut self, cx: Comparison<'a>, old: ItemRef<'a>, new: ItemRef<'a>) {
        let old_modifiers = old.item().modifiers();
        let new_modifiers = new.item().modifiers();
        let subject = capitalize(&new.describe());

        if old_modifiers.is_static() != new_modifiers.is_static() {
            self.report(
                &issues::CHANGED_STATIC,
                cx.new,
                new,
                format!("{} has changed 'static' qualifier", subject),
            );
        }

        let (old_visibility, new_visibility) = (old_modifiers.visibility(), new_modifiers.visibility());
        if new_visibility < old_visibility {
            self.report(
                &issues::CHANGED_SCOPE,
                cx.new,
                new,
                format!(
                    "{} changed visibility from {} to {}",
                    subject,
                    old_visibility.as_str(),
                    new_visibility.as_str()
                ),
            );
        }

        if old.item().deprecated() != new.item().deprecated() {
            self.report(
                &issues::CHANGED_DEPRECATED,
                cx.new,
                new,
                format!(
                    "{} has changed deprecation state {} --> {}",
                    subject,
                    old.item().deprecated(),
                    new.item().deprecated()
                ),
            );
        }
    }

    fn compare_classes(&mut self, cx: Comparison<'_>, old: &ClassItem, new: &ClassItem) {
        let item = ItemRef::Class(new);

        if old.is_interface() != new.is_interface() {
            self.report(
                &issues::CHANGED_CLASS,
                cx.new,
                item,
                format!("Class {} changed class/interface declaration", new.qualified_name()),
            );
        }

        if !new.is_interface() && !old.modifiers().is_abstract() && new.modifiers().is_abstract() {
            self.report(
                &issues::CHANGED_ABSTRACT,
                cx.new,
                item,
                format!("Class {} changed 'abstract' qualifier", new.qualified_name()),
            );
        }

        if let Some(old_super) = old.super_class_type() {
            let old_name = old_super.signature_key();
            if old_name != "Object" && !cx.new.super_class_chain(new).contains(&old_name) {
                let new_name = new
                    .super_class_type()
                    .map(|t| t.signature_key())
                    .unwrap_or_else(|| "Object".to_string());
                self.report(
                    &issues::CHANGED_SUPERCLASS,
                    cx.new,
                    item,
                    format!(
                        "Class {} superclass changed from {} to {}",
                        new.qualified_name(),
                        old_name,
                        new_name
                    ),
                );
            }
        }
    }

    fn compare_methods(&mut self, cx: Comparison<'_>, old: &MethodItem, new: &MethodItem) {
        let item = ItemRef::callable(new);
        let subject = capitalize(&item.describe());

        if let (Some(old_type), Some(new_type)) = (old.return_type(), new.return_type()) {
            if old_type != new_type {
                self.report(
                    &issues::CHANGED_TYPE,
                    cx.new,
                    item,
                    format!(
                        "{} has changed return type from {} to {}",
                        subject,
                        old_type.canonical(),
                        new_type.canonical()
                    ),
                );
            }
        }

        if !old.modifiers().is_abstract() && new.modifiers().is_abstract() {
            self.report(
                &issues::CHANGED_ABSTRACT,
                cx.new,
                item,
                format!("{} has changed 'abstract' qualifier", subject),
            );
        }

        let old_throws: BTreeSet<String> = old.throws().iter().map(|t| t.signature_key()).collect();
        let new_throws: BTreeSet<String> = new.throws().iter().map(|t| t.signature_key()).collect();
        for removed in old_throws.difference(&new_throws) {
            self.report(
                &issues::CHANGED_THROWS,
                cx.new,
                item,
                format!("{} no longer throws exception {}", subject, removed),
            );
        }
        for added in new_throws.difference(&old_throws) {
            self.report(
                &issues::CHANGED_THROWS,
                cx.new,
                item,
                format!("{} added thrown exception {}", subject, added),
            );
        }
    }

    fn compare_fields(&mut self, cx: Comparison<'_>, old: &FieldItem, new: &FieldItem) {
        let item = ItemRef::Field(new);
        let subject = capitalize(&item.describe());

        if old.ty() != new.ty() {
            self.report(
                &issues::CHANGED_TYPE,
                cx.new,
                item,
                format!(
                    "{} has changed type from {} to {}",
                    subject,
                    old.ty().canonical(),
                    new.ty().canonical()
                ),
            );
        }

        match (old.constant_value(), new.constant_value()) {
            (Ok(old_value), Ok(new_value)) => {
                let changed = match (&old_value, &new_value) {
                    (Some(a), Some(b)) => !same_constant(a, b),
                    (None, None) => false,
                    _ => true,
                };
                if changed {
                    self.report(
                        &issues::CHANGED_VALUE,
                        cx.new,
                        item,
                        format!(
                            "{} has changed value from {} to {}",
                            subject,
                            old.initial_value().unwrap_or("nothing"),
                            new.initial_value().unwrap_or("nothing")
                        ),
                    );
                }
            }
            (Err(text), _) | (_, Err(text)) => self.report(
                &issues::INTERNAL_ERROR,
                cx.new,
                item,
                format!("Unexpected constant value `{}` for {}", text, item.describe()),
            ),
        }

        let (old_modifiers, new_modifiers) = (old.modifiers(), new.modifiers());
        if old_modifiers.has(ModifierList::TRANSIENT)
            != new_modifiers.has(ModifierList::TRANSIENT)
        {
            self.report(
                &issues::CHANGED_TRANSIENT,
                cx.new,
                item,
                format!("{} has changed 'transient' qualifier", subject),
            );
        }
        if old_modifiers.has(ModifierList::VOLATILE)
            != new_modifiers.has(ModifierList::VOLATILE)
        {
            self.report(
                &issues::CHANGED_VOLATILE,
                cx.new,
                item,
                format!("{} has changed 'volatile' qualifier", subject),
            );
        }
    }

    fn compare_parameters<'a>(
        &mut self,
        cx: Comparison<'a>,
        old: &'a ParameterItem,
        new: &'a ParameterItem,
        new_method: &'a MethodItem,
    ) {
        let item = ItemRef::Parameter(new, new_method);
        let method = ItemRef::callable(new_method).describe();

        if let Some(previous) = old.public_name() {
            match new.public_name() {
                None => self.report(
                    &issues::PARAMETER_NAME_CHANGE,
                    cx.new,
                    item,
                    format!("Attempted to remove parameter name from {} in {}", item.describe(), method),
                ),
                Some(name) if name != previous => self.report(
                    &issues::PARAMETER_NAME_CHANGE,
                    cx.new,
                    item,
                    format!(
                        "Attempted to change parameter name from {} to {} in {}",
                        previous, name, method
                    ),
                ),
                Some(_) => {}
            }
        }

        if old.has_default_value() && !new.has_default_value() {
            self.report(
                &issues::DEFAULT_VALUE_CHANGE,
                cx.new,
                item,
                format!("Attempted to remove default value from {} in {}", item.describe(), method),
            );
        }
    }

    fn handle_added(&mut self, issue: &'static Issue, cx: Comparison<'_>, item: ItemRef<'_>) {
        if let ItemRef::Method(method) = item {
            // Overriding methods of classes outside the tracked API is fine,
            // e.g. toString() from java.lang.Object.
            if cx
                .new
                .super_methods(method)
                .iter()
                .any(|m| m.is_from_class_path())
            {
                trace!(method = %item.qualified_name(), "overrides a classpath method");
                return;
            }
        }
        self.report(issue, cx.new, item, format!("Added {}", item.describe()));
    }

    fn handle_removed(&mut self, issue: &'static Issue, cx: Comparison<'_>, item: ItemRef<'_>) {
        let deprecated = if item.item().deprecated() { "deprecated " } else { "" };
        self.report(issue, cx.old, item, format!("Removed {}{}", deprecated, item.describe()));
    }

    /// Whether the new version of the class still inherits the member.
    fn still_inherited(&self, cx: Comparison<'_>, old: ItemRef<'_>) -> bool {
        let Some(class_id) = old.class_id() else {
            return false;
        };
        let old_class = cx.old.class(class_id);
        let Some(new_class) = cx.new.find_class(old_class.qualified_name()) else {
            return false;
        };
        match old {
            ItemRef::Method(method) => !cx
                .new
                .find_inherited_methods(new_class, method.name(), &method.parameter_keys())
                .is_empty(),
            ItemRef::Field(field) => cx
                .new
                .ancestors(new_class)
                .iter()
                .any(|(ancestor, _)| ancestor.find_field(field.name()).is_some()),
            _ => false,
        }
    }
}

impl<'a, 'r, 'c, S: DiagnosticSink> ComparisonVisitor<'a> for CompatibilityCheck<'r, 'c, S> {
    fn compare(&mut self, cx: Comparison<'a>, old: ItemRef<'a>, new: ItemRef<'a>) {
        self.compare_common(cx, old, new);
        match (old, new) {
            (ItemRef::Class(o), ItemRef::Class(n)) => self.compare_classes(cx, o, n),
            (ItemRef::Constructor(o), ItemRef::Constructor(n))
            | (ItemRef::Method(o), ItemRef::Method(n)) => self.compare_methods(cx, o, n),
            (ItemRef::Field(o), ItemRef::Field(n)) => self.compare_fields(cx, o, n),
            (ItemRef::Parameter(o, _), ItemRef::Parameter(n, m)) => self.compare_parameters(cx, o, n, m),
            _ => {}
        }
    }

    fn added(&mut self, cx: Comparison<'a>, new: ItemRef<'a>) {
        let issue = match new {
            ItemRef::Package(_) => &issues::ADDED_PACKAGE,
            ItemRef::Class(class) if class.is_interface() => &issues::ADDED_INTERFACE,
            ItemRef::Class(_) => &issues::ADDED_CLASS,
            ItemRef::Method(method) if method.modifiers().is_abstract() => &issues::ADDED_ABSTRACT_METHOD,
            ItemRef::Constructor(_) | ItemRef::Method(_) => &issues::ADDED_METHOD,
            ItemRef::Field(_) => &issues::ADDED_FIELD,
            ItemRef::Property(_) | ItemRef::Parameter(..) => return,
        };
        self.handle_added(issue, cx, new);
    }

    fn removed(&mut self, cx: Comparison<'a>, old: ItemRef<'a>) {
        let deprecated = old.item().deprecated();
        let issue = match old {
            ItemRef::Package(_) => &issues::REMOVED_PACKAGE,
            ItemRef::Class(class) if class.is_interface() => &issues::REMOVED_INTERFACE,
            ItemRef::Class(_) if deprecated => &issues::REMOVED_DEPRECATED_CLASS,
            ItemRef::Class(_) => &issues::REMOVED_CLASS,
            ItemRef::Constructor(_) | ItemRef::Method(_) if deprecated => &issues::REMOVED_DEPRECATED_METHOD,
            ItemRef::Constructor(_) | ItemRef::Method(_) => &issues::REMOVED_METHOD,
            ItemRef::Field(_) if deprecated => &issues::REMOVED_DEPRECATED_FIELD,
            ItemRef::Field(_) => &issues::REMOVED_FIELD,
            ItemRef::Property(_) | ItemRef::Parameter(..) => return,
        };
        if self.still_inherited(cx, old) {
            trace!(item = %old.describe(), "removed member is still inherited");
            return;
        }
        self.handle_removed(issue, cx, old);
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn same_constant(a: &ConstantValue, b: &ConstantValue) -> bool {
    match (a, b) {
        (ConstantValue::Null, ConstantValue::Null) => true,
        (ConstantValue::Bool(a), ConstantValue::Bool(b)) => a == b,
        (ConstantValue::Char(a), ConstantValue::Char(b)) => a == b,
        (ConstantValue::Str(a), ConstantValue::Str(b)) => a == b,
        (ConstantValue::Integer(a), ConstantValue::Integer(b)) => a == b,
        (ConstantValue::Float(a), ConstantValue::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        _ => false,
    }
}

/// Result of [`check_compatibility`].
#[derive(Debug, Serialize)]
pub struct CheckOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub found_problems: bool,
    pub error_count: usize,
    /// Diagnostics suppressed by the baseline.
    pub baseline_matches: usize,
}

impl CheckOutcome {
    /// Collect the outcome from a reporter that has finished a run.
    pub fn from_reporter(reporter: Reporter<'_, VecSink>) -> Self {
        let error_count = reporter.error_count();
        let baseline_matches = reporter.baseline().map_or(0, |b| b.matched_count());
        Self {
            diagnostics: reporter.into_sink().diagnostics,
            found_problems: error_count > 0,
            error_count,
            baseline_matches,
        }
    }

    /// Turn "problems found" into an error.
    pub fn into_result(self) -> Result<Self> {
        if self.found_problems {
            Err(SignatureError::CompatibilityProblems {
                count: self.error_count,
            })
        } else {
            Ok(self)
        }
    }
}

/// Compare `new` against `old` under `config` and collect the diagnostics.
pub fn check_compatibility(old: &Codebase, new: &Codebase, config: &ErrorConfiguration) -> CheckOutcome {
    let mut reporter = Reporter::new(config, VecSink::new());
    CompatibilityCheck::run(old, new, &mut reporter);
    CheckOutcome::from_reporter(reporter)
}
