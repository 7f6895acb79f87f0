//! Signature writer - renders a [`Codebase`] view as signature text.
//!
//! # Output
//!
//! Packages are sorted by name, classes by name within their package (an
//! inner class follows its outer class), and members by kind then key, so
//! the output is a normal form: two codebases with the same API write the
//! same text.

use crate::filter::{ApiView, BoxedPredicate, ItemPredicate};
use crate::format::{FileFormat, SignatureOptions};
use crate::model::modifiers::Nullness;
use crate::model::{
    ClassItem, ClassKind, Codebase, FieldItem, Item, ItemRef, MethodItem, ModifierList, ParameterItem,
    PropertyItem, TypeItem,
};

const INDENT: &str = "  ";
const MEMBER_INDENT: &str = "    ";

/// Writes one [`ApiView`] of a codebase.
pub struct SignatureWriter<'a> {
    codebase: &'a Codebase,
    options: SignatureOptions,
    emit: BoxedPredicate,
    reference: BoxedPredicate,
    out: String,
}

impl<'a> SignatureWriter<'a> {
    pub fn new(codebase: &'a Codebase, view: ApiView, options: SignatureOptions) -> Self {
        Self {
            codebase,
            options,
            emit: view.emit_filter(),
            reference: view.reference_filter(),
            out: String::new(),
        }
    }

    /// Render the whole codebase.
    pub fn write(mut self) -> String {
        if self.options.include_header {
            if let Some(header) = self.options.format.header() {
                self.out.push_str(&header);
                self.out.push('\n');
            }
        }

        let mut packages: Vec<_> = self.codebase.packages().iter().collect();
        packages.sort_by(|a, b| a.qualified_name().cmp(b.qualified_name()));
        for package in packages {
            let mut classes = Vec::new();
            for class in self.codebase.top_level_classes(package) {
                self.collect_classes(class, &mut classes);
            }
            if classes.is_empty() {
                continue;
            }
            classes.sort_by(|a, b| a.full_name().cmp(b.full_name()));

            self.out.push_str(&format!("package {} {{\n\n", package.qualified_name()));
            for class in classes {
                self.write_class(class);
            }
            self.out.push_str("}\n\n");
        }
        self.out
    }

    fn collect_classes(&self, class: &'a ClassItem, into: &mut Vec<&'a ClassItem>) {
        if self.emit.test(self.codebase, ItemRef::Class(class)) {
            into.push(class);
        }
        for inner in self.codebase.inner_classes(class) {
            self.collect_classes(inner, into);
        }
    }

    fn write_class(&mut self, class: &ClassItem) {
        let mut modifiers = class.modifiers().clone();
        if self.options.compat_output && class.is_interface() {
            modifiers.set(ModifierList::ABSTRACT, true);
        }
        let mut line = String::from(INDENT);
        line.push_str(&self.modifier_string(&modifiers, false));
        line.push_str(class.kind().keyword());
        line.push(' ');
        line.push_str(class.full_name());
        line.push_str(&class.type_parameters().to_signature_string(self.options.omit_common_packages));

        let (super_class, interfaces) = self.visible_super_types(class);
        let mut extends = Vec::new();
        if class.kind() == ClassKind::Interface || class.kind() == ClassKind::AnnotationType {
            extends.extend(interfaces.iter().map(|t| self.type_string(t)));
            if !extends.is_empty() {
                line.push_str(&format!(" extends {}", extends.join(" ")));
            }
        } else {
            if let Some(super_class) = super_class.filter(|t| t.canonical() != "Object") {
                line.push_str(&format!(" extends {}", self.type_string(&super_class)));
            }
            if !interfaces.is_empty() {
                let names: Vec<_> = interfaces.iter().map(|t| self.type_string(t)).collect();
                line.push_str(&format!(" implements {}", names.join(" ")));
            }
        }
        line.push_str(" {\n");
        self.out.push_str(&line);

        let mut constructors: Vec<_> = self.emitted_methods(class.constructors(), true);
        constructors.sort_by_key(|m| m.signature_key());
        for constructor in constructors {
            self.write_method(class, constructor);
        }

        let mut methods: Vec<_> = self.emitted_methods(class.methods(), false);
        methods.sort_by_key(|m| m.signature_key());
        for method in methods {
            self.write_method(class, method);
        }

        let mut properties: Vec<_> = class
            .properties()
            .iter()
            .filter(|p| self.emit.test(self.codebase, ItemRef::Property(*p)))
            .collect();
        properties.sort_by(|a, b| a.name().cmp(b.name()));
        for property in properties {
            self.write_property(property);
        }

        let (constants, mut fields): (Vec<&FieldItem>, Vec<&FieldItem>) = class
            .fields()
            .iter()
            .filter(|f| self.emit.test(self.codebase, ItemRef::Field(*f)))
            .partition(|f| f.is_enum_constant());
        fields.sort_by(|a, b| a.name().cmp(b.name()));
        for field in constants.into_iter().chain(fields) {
            self.write_field(field);
        }

        self.out.push_str(INDENT);
        self.out.push_str("}\n\n");
    }

    fn emitted_methods<'m>(&self, methods: &'m [MethodItem], constructors: bool) -> Vec<&'m MethodItem> {
        methods
            .iter()
            .filter(|m| {
                let item = if constructors {
                    ItemRef::Constructor(*m)
                } else {
                    ItemRef::Method(*m)
                };
                self.emit.test(self.codebase, item)
            })
            .collect()
    }

    /// Super types with references the view cannot see removed: a hidden
    /// superclass is replaced by its nearest visible ancestor, hidden
    /// interfaces are dropped.
    fn visible_super_types(&self, class: &ClassItem) -> (Option<TypeItem>, Vec<TypeItem>) {
        let mut super_class = class.super_class_type().cloned();
        let mut current = self.codebase.super_class(class);
        let mut steps = 0;
        while let Some(resolved) = current {
            if self.reference.test(self.codebase, ItemRef::Class(resolved)) || steps > 64 {
                break;
            }
            super_class = resolved.super_class_type().cloned();
            current = self.codebase.super_class(resolved);
            steps += 1;
        }

        let interfaces = class
            .interface_types()
            .iter()
            .filter(|t| match self.codebase.resolve(t) {
                Some(resolved) => self.reference.test(self.codebase, ItemRef::Class(resolved)),
                None => true,
            })
            .cloned()
            .collect();
        (super_class, interfaces)
    }

    fn write_method(&mut self, class: &ClassItem, method: &MethodItem) {
        let mut line = String::from(MEMBER_INDENT);
        if method.is_constructor() {
            line.push_str("ctor ");
            line.push_str(&self.modifier_string(method.modifiers(), true));
            line.push_str(&self.type_parameters(method));
            line.push_str(class.full_name());
        } else {
            line.push_str("method ");
            line.push_str(&self.modifier_string(method.modifiers(), true));
            line.push_str(&self.type_parameters(method));
            if let Some(return_type) = method.return_type() {
                line.push_str(&self.typed(return_type, method.modifiers().nullness()));
                line.push(' ');
            }
            line.push_str(method.name());
        }

        let parameters: Vec<String> = method.parameters().iter().map(|p| self.parameter(p)).collect();
        line.push('(');
        line.push_str(&parameters.join(", "));
        line.push(')');

        if !method.throws().is_empty() {
            let throws: Vec<_> = method.throws().iter().map(|t| self.type_string(t)).collect();
            line.push_str(" throws ");
            line.push_str(&throws.join(", "));
        }
        if let Some(default_value) = method.default_value() {
            line.push_str(" default ");
            line.push_str(default_value);
        }
        line.push_str(";\n");
        self.out.push_str(&line);
    }

    fn type_parameters(&self, method: &MethodItem) -> String {
        if method.type_parameters().is_empty() {
            String::new()
        } else {
            format!(
                "{} ",
                method.type_parameters().to_signature_string(self.options.omit_common_packages)
            )
        }
    }

    fn parameter(&self, parameter: &ParameterItem) -> String {
        let mut text = self.modifier_string(parameter.modifiers(), true);
        text.push_str(&self.typed(parameter.ty(), parameter.modifiers().nullness()));
        if !self.options.compat_output {
            if let Some(name) = parameter.public_name() {
                text.push(' ');
                text.push_str(name);
            }
        }
        if self.options.default_values {
            if let Some(default_value) = parameter.default_value() {
                text.push_str(" = ");
                text.push_str(default_value);
            }
        }
        text
    }

    fn write_field(&mut self, field: &FieldItem) {
        let keyword = if field.is_enum_constant() { "enum_constant" } else { "field" };
        let mut line = format!(
            "{}{} {}{} {}",
            MEMBER_INDENT,
            keyword,
            self.modifier_string(field.modifiers(), true),
            self.typed(field.ty(), field.modifiers().nullness()),
            field.name()
        );
        if let Some(value) = field.initial_value() {
            line.push_str(" = ");
            line.push_str(value);
        }
        line.push_str(";\n");
        self.out.push_str(&line);
    }

    fn write_property(&mut self, property: &PropertyItem) {
        let line = format!(
            "{}property {}{} {};\n",
            MEMBER_INDENT,
            self.modifier_string(property.modifiers(), true),
            self.typed(property.ty(), property.modifiers().nullness()),
            property.name()
        );
        self.out.push_str(&line);
    }

    fn type_string(&self, ty: &TypeItem) -> String {
        ty.to_signature_string(self.options.omit_common_packages)
    }

    /// A member's type, with a nullness sigil when the format uses them.
    ///
    /// Varargs read as non-null without a sigil, so only a nullable vararg
    /// gets one, written before the `...`.
    fn typed(&self, ty: &TypeItem, nullness: Option<Nullness>) -> String {
        let text = self.type_string(ty);
        if !self.options.kotlin_style_nulls || ty.nullness_sigil().is_some() || ty.is_primitive() {
            return text;
        }
        if ty.is_varargs() {
            return match (nullness, text.strip_suffix("...")) {
                (Some(Nullness::Nullable), Some(element)) => format!("{}?...", element),
                _ => text,
            };
        }
        match nullness {
            Some(Nullness::Nullable) => format!("{}?", text),
            Some(Nullness::NonNull) => text,
            None => format!("{}!", text),
        }
    }

    /// Annotations then keywords, each followed by a space.
    fn modifier_string(&self, modifiers: &ModifierList, member: bool) -> String {
        let mut parts: Vec<String> = Vec::new();
        // The legacy format carries no annotations.
        let legacy = self.options.format <= FileFormat::V1;
        if modifiers.is_deprecated() && !legacy {
            parts.push("@Deprecated".to_string());
        }
        for annotation in modifiers.annotations().iter().filter(|_| !legacy) {
            if annotation.nullness().is_some() && self.options.kotlin_style_nulls && member {
                continue;
            }
            parts.push(annotation.to_source(self.options.omit_common_packages));
        }
        for keyword in modifiers.keywords() {
            if keyword == "deprecated" && !legacy {
                continue;
            }
            parts.push(keyword.to_string());
        }
        let mut text = parts.join(" ");
        if !text.is_empty() {
            text.push(' ');
        }
        text
    }
}

/// Write `codebase` as seen through `view`, in the format `options` select.
pub fn write_codebase(codebase: &Codebase, view: ApiView, options: &SignatureOptions) -> String {
    SignatureWriter::new(codebase, view, options.clone()).write()
}

/// Write the public view in `format`.
pub fn write_format(codebase: &Codebase, format: FileFormat) -> String {
    write_codebase(codebase, ApiView::Public, &SignatureOptions::new(format))
}
