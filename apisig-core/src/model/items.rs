//! Item kinds of the API model: packages, classes, members and parameters.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::codebase::{ClassId, PackageId};
use super::modifiers::ModifierList;
use super::types::{TypeItem, TypeParameterList};

static HIDE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(hide|pending|suppress)\b").unwrap());
static REMOVED_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@removed\b").unwrap());
static DOC_ONLY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@doconly\b").unwrap());
static DEPRECATED_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@deprecated\b").unwrap());

/// Where an item was declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourcePosition {
    pub file: Option<Arc<str>>,
    /// 1-based line, 0 when unknown.
    pub line: u32,
}

impl SourcePosition {
    pub fn new(file: Option<Arc<str>>, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), 0) => write!(f, "{}", file),
            (Some(file), line) => write!(f, "{}:{}", file, line),
            (None, 0) => Ok(()),
            (None, line) => write!(f, "line {}", line),
        }
    }
}

/// State shared by every item kind. Visibility-state flags are derived once,
/// at construction, from the documentation and annotations.
#[derive(Clone, Debug, Default)]
pub struct ItemState {
    modifiers: ModifierList,
    documentation: String,
    position: SourcePosition,
    hidden: bool,
    removed: bool,
    doc_only: bool,
    deprecated: bool,
    from_class_path: bool,
}

impl ItemState {
    pub fn new(modifiers: ModifierList, documentation: impl Into<String>, position: SourcePosition) -> Self {
        let documentation = documentation.into();
        let hidden = HIDE_TAG.is_match(&documentation) || modifiers.has_hide_annotation();
        let removed = REMOVED_TAG.is_match(&documentation);
        let doc_only = DOC_ONLY_TAG.is_match(&documentation);
        let deprecated = modifiers.is_deprecated() || DEPRECATED_TAG.is_match(&documentation);
        Self {
            modifiers,
            documentation,
            position,
            hidden,
            removed,
            doc_only,
            deprecated,
            from_class_path: false,
        }
    }

    /// Mark the item as coming from outside the tracked API.
    pub fn from_class_path(mut self) -> Self {
        self.from_class_path = true;
        self
    }

    pub(crate) fn set_from_class_path(&mut self, value: bool) {
        self.from_class_path = value;
    }
}

/// Accessors common to every item kind.
pub trait Item {
    fn state(&self) -> &ItemState;

    fn name(&self) -> &str;

    fn modifiers(&self) -> &ModifierList {
        &self.state().modifiers
    }

    fn documentation(&self) -> &str {
        &self.state().documentation
    }

    fn position(&self) -> &SourcePosition {
        &self.state().position
    }

    fn deprecated(&self) -> bool {
        self.state().deprecated
    }

    fn hidden(&self) -> bool {
        self.state().hidden
    }

    fn removed(&self) -> bool {
        self.state().removed
    }

    fn doc_only(&self) -> bool {
        self.state().doc_only
    }

    fn is_from_class_path(&self) -> bool {
        self.state().from_class_path
    }

    /// Whether the item is a copy made for inheritance, not a declaration.
    fn is_cloned(&self) -> bool {
        false
    }
}

// Packages

#[derive(Clone, Debug)]
pub struct PackageItem {
    pub(crate) state: ItemState,
    pub(crate) name: String,
    pub(crate) id: PackageId,
    pub(crate) classes: Vec<ClassId>,
}

impl PackageItem {
    pub fn qualified_name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    /// Top-level classes in declaration order.
    pub fn class_ids(&self) -> &[ClassId] {
        &self.classes
    }
}

impl Item for PackageItem {
    fn state(&self) -> &ItemState {
        &self.state
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// Classes

/// Declaration kind of a class. Exactly one per class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    AnnotationType,
}

impl ClassKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::AnnotationType => "@interface",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<ClassKind> {
        match keyword {
            "class" => Some(ClassKind::Class),
            "interface" => Some(ClassKind::Interface),
            "enum" => Some(ClassKind::Enum),
            "@interface" => Some(ClassKind::AnnotationType),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClassItem {
    pub(crate) state: ItemState,
    pub(crate) full_name: String,
    pub(crate) qualified_name: String,
    pub(crate) kind: ClassKind,
    pub(crate) type_parameters: TypeParameterList,
    pub(crate) super_class_type: Option<TypeItem>,
    pub(crate) interface_types: Vec<TypeItem>,
    pub(crate) id: ClassId,
    pub(crate) package: PackageId,
    pub(crate) containing_class: Option<ClassId>,
    pub(crate) inner_classes: Vec<ClassId>,
    pub(crate) constructors: Vec<MethodItem>,
    pub(crate) methods: Vec<MethodItem>,
    pub(crate) fields: Vec<FieldItem>,
    pub(crate) properties: Vec<PropertyItem>,
}

impl ClassItem {
    /// New class declaration. `full_name` is the name within the package,
    /// e.g. `Outer.Inner`. The builder assigns ids and the qualified name.
    pub fn new(full_name: impl Into<String>, kind: ClassKind, state: ItemState) -> Self {
        Self {
            state,
            full_name: full_name.into(),
            qualified_name: String::new(),
            kind,
            type_parameters: TypeParameterList::default(),
            super_class_type: None,
            interface_types: Vec::new(),
            id: ClassId::default(),
            package: PackageId::default(),
            containing_class: None,
            inner_classes: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_type_parameters(mut self, type_parameters: TypeParameterList) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn with_super_class_type(mut self, super_class_type: Option<TypeItem>) -> Self {
        self.super_class_type = super_class_type;
        self
    }

    pub fn with_interface_types(mut self, interface_types: Vec<TypeItem>) -> Self {
        self.interface_types = interface_types;
        self
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Name within the package, e.g. `Outer.Inner`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn simple_name(&self) -> &str {
        self.full_name.rsplit('.').next().unwrap_or(&self.full_name)
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::AnnotationType)
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    pub fn is_annotation_type(&self) -> bool {
        self.kind == ClassKind::AnnotationType
    }

    pub fn type_parameters(&self) -> &TypeParameterList {
        &self.type_parameters
    }

    pub fn super_class_type(&self) -> Option<&TypeItem> {
        self.super_class_type.as_ref()
    }

    pub fn interface_types(&self) -> &[TypeItem] {
        &self.interface_types
    }

    pub fn package_id(&self) -> PackageId {
        self.package
    }

    pub fn containing_class_id(&self) -> Option<ClassId> {
        self.containing_class
    }

    pub fn inner_class_ids(&self) -> &[ClassId] {
        &self.inner_classes
    }

    pub fn constructors(&self) -> &[MethodItem] {
        &self.constructors
    }

    pub fn methods(&self) -> &[MethodItem] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldItem] {
        &self.fields
    }

    pub fn properties(&self) -> &[PropertyItem] {
        &self.properties
    }

    pub fn find_method(&self, signature_key: &str) -> Option<&MethodItem> {
        self.methods.iter().find(|m| m.signature_key() == signature_key)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldItem> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Item for ClassItem {
    fn state(&self) -> &ItemState {
        &self.state
    }

    fn name(&self) -> &str {
        self.simple_name()
    }
}

// Methods and constructors

#[derive(Clone, Debug)]
pub struct MethodItem {
    pub(crate) state: ItemState,
    pub(crate) name: String,
    pub(crate) constructor: bool,
    pub(crate) type_parameters: TypeParameterList,
    pub(crate) return_type: Option<TypeItem>,
    pub(crate) parameters: Vec<ParameterItem>,
    pub(crate) throws: Vec<TypeItem>,
    pub(crate) default_value: Option<String>,
    pub(crate) containing_class: String,
    pub(crate) class_id: ClassId,
    pub(crate) cloned_from: Option<String>,
}

impl MethodItem {
    pub fn method(
        name: impl Into<String>,
        return_type: TypeItem,
        parameters: Vec<ParameterItem>,
        state: ItemState,
    ) -> Self {
        Self::create(name.into(), false, Some(return_type), parameters, state)
    }

    pub fn constructor(name: impl Into<String>, parameters: Vec<ParameterItem>, state: ItemState) -> Self {
        Self::create(name.into(), true, None, parameters, state)
    }

    fn create(
        name: String,
        constructor: bool,
        return_type: Option<TypeItem>,
        mut parameters: Vec<ParameterItem>,
        state: ItemState,
    ) -> Self {
        for (index, parameter) in parameters.iter_mut().enumerate() {
            parameter.index = index;
            if parameter.public_name.is_none() {
                parameter.display_name = format!("arg{}", index + 1);
            }
            // Parameters are located at their method's declaration.
            if parameter.state.position == SourcePosition::default() {
                parameter.state.position = state.position.clone();
            }
        }
        Self {
            state,
            name,
            constructor,
            type_parameters: TypeParameterList::default(),
            return_type,
            parameters,
            throws: Vec::new(),
            default_value: None,
            containing_class: String::new(),
            class_id: ClassId::default(),
            cloned_from: None,
        }
    }

    pub fn with_type_parameters(mut self, type_parameters: TypeParameterList) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    /// Thrown types are kept sorted; their order carries no meaning.
    pub fn with_throws(mut self, mut throws: Vec<TypeItem>) -> Self {
        throws.sort_by(|a, b| a.canonical().cmp(b.canonical()));
        throws.dedup();
        self.throws = throws;
        self
    }

    /// Default value of an annotation type element.
    pub fn with_default_value(mut self, value: Option<String>) -> Self {
        self.default_value = value;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.constructor
    }

    pub fn type_parameters(&self) -> &TypeParameterList {
        &self.type_parameters
    }

    pub fn return_type(&self) -> Option<&TypeItem> {
        self.return_type.as_ref()
    }

    pub fn parameters(&self) -> &[ParameterItem] {
        &self.parameters
    }

    pub fn throws(&self) -> &[TypeItem] {
        &self.throws
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Qualified name of the declaring class.
    pub fn containing_class(&self) -> &str {
        &self.containing_class
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Qualified name of the class this copy was inherited from.
    pub fn cloned_from(&self) -> Option<&str> {
        self.cloned_from.as_deref()
    }

    /// Erased parameter keys, in order.
    pub fn parameter_keys(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.ty.signature_key()).collect()
    }

    /// `name(erased,parameter,types)`; unique within a class.
    pub fn signature_key(&self) -> String {
        format!("{}({})", self.name, self.parameter_keys().join(","))
    }

    /// Whether the two methods have the same name, parameter types and return type.
    pub fn same_signature(&self, other: &MethodItem) -> bool {
        self.name == other.name
            && self.return_type == other.return_type
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty == b.ty)
    }
}

impl Item for MethodItem {
    fn state(&self) -> &ItemState {
        &self.state
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_cloned(&self) -> bool {
        self.cloned_from.is_some()
    }
}

// Parameters

#[derive(Clone, Debug)]
pub struct ParameterItem {
    pub(crate) state: ItemState,
    pub(crate) public_name: Option<String>,
    pub(crate) display_name: String,
    pub(crate) ty: TypeItem,
    pub(crate) default_value: Option<String>,
    pub(crate) index: usize,
}

impl ParameterItem {
    /// A varargs type sets the `VARARG` modifier.
    pub fn new(
        public_name: Option<String>,
        ty: TypeItem,
        mut modifiers: ModifierList,
        default_value: Option<String>,
    ) -> Self {
        if ty.is_varargs() {
            modifiers.set(ModifierList::VARARG, true);
        }
        let display_name = public_name.clone().unwrap_or_default();
        Self {
            state: ItemState::new(modifiers, "", SourcePosition::default()),
            public_name,
            display_name,
            ty,
            default_value,
            index: 0,
        }
    }

    pub fn public_name(&self) -> Option<&str> {
        self.public_name.as_deref()
    }

    pub fn ty(&self) -> &TypeItem {
        &self.ty
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Item for ParameterItem {
    fn state(&self) -> &ItemState {
        &self.state
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}

// Fields

#[derive(Clone, Debug)]
pub struct FieldItem {
    pub(crate) state: ItemState,
    pub(crate) name: String,
    pub(crate) ty: TypeItem,
    pub(crate) value: Option<String>,
    pub(crate) enum_constant: bool,
    pub(crate) containing_class: String,
    pub(crate) class_id: ClassId,
}

impl FieldItem {
    pub fn new(name: impl Into<String>, ty: TypeItem, value: Option<String>, state: ItemState) -> Self {
        Self {
            state,
            name: name.into(),
            ty,
            value,
            enum_constant: false,
            containing_class: String::new(),
            class_id: ClassId::default(),
        }
    }

    pub fn enum_constant(name: impl Into<String>, ty: TypeItem, state: ItemState) -> Self {
        let mut field = Self::new(name, ty, None, state);
        field.enum_constant = true;
        field
    }

    pub fn ty(&self) -> &TypeItem {
        &self.ty
    }

    /// Initial value as written.
    pub fn initial_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_enum_constant(&self) -> bool {
        self.enum_constant
    }

    pub fn containing_class(&self) -> &str {
        &self.containing_class
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Parsed initial value. `Err` carries the unrecognized literal.
    pub fn constant_value(&self) -> Result<Option<ConstantValue>, String> {
        match &self.value {
            None => Ok(None),
            Some(text) => ConstantValue::parse(text).map(Some).ok_or_else(|| text.clone()),
        }
    }
}

impl Item for FieldItem {
    fn state(&self) -> &ItemState {
        &self.state
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// Properties

#[derive(Clone, Debug)]
pub struct PropertyItem {
    pub(crate) state: ItemState,
    pub(crate) name: String,
    pub(crate) ty: TypeItem,
    pub(crate) containing_class: String,
    pub(crate) class_id: ClassId,
}

impl PropertyItem {
    pub fn new(name: impl Into<String>, ty: TypeItem, state: ItemState) -> Self {
        Self {
            state,
            name: name.into(),
            ty,
            containing_class: String::new(),
            class_id: ClassId::default(),
        }
    }

    pub fn ty(&self) -> &TypeItem {
        &self.ty
    }

    pub fn containing_class(&self) -> &str {
        &self.containing_class
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }
}

impl Item for PropertyItem {
    fn state(&self) -> &ItemState {
        &self.state
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// Constant values

/// A field's initial value, parsed from its literal.
#[derive(Clone, Debug)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Char(char),
    Str(String),
    Integer(i128),
    Float(f64),
}

impl ConstantValue {
    /// Parse a Java-style literal. `None` for forms that are not literals.
    pub fn parse(text: &str) -> Option<ConstantValue> {
        let text = text.trim();
        match text {
            "null" => return Some(ConstantValue::Null),
            "true" => return Some(ConstantValue::Bool(true)),
            "false" => return Some(ConstantValue::Bool(false)),
            "NaN" | "(0.0/0.0)" | "(0.0f/0.0f)" => return Some(ConstantValue::Float(f64::NAN)),
            "Infinity" | "(1.0/0.0)" | "(1.0f/0.0f)" => return Some(ConstantValue::Float(f64::INFINITY)),
            "-Infinity" | "(-1.0/0.0)" | "(-1.0f/0.0f)" => {
                return Some(ConstantValue::Float(f64::NEG_INFINITY))
            }
            _ => {}
        }
        if let Some(body) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            return unescape(body).map(ConstantValue::Str);
        }
        if let Some(body) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            let value = unescape(body)?;
            let mut chars = value.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Some(ConstantValue::Char(c)),
                _ => None,
            };
        }
        parse_number(text)
    }
}

impl PartialEq for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstantValue::Null, ConstantValue::Null) => true,
            (ConstantValue::Bool(a), ConstantValue::Bool(b)) => a == b,
            (ConstantValue::Char(a), ConstantValue::Char(b)) => a == b,
            (ConstantValue::Str(a), ConstantValue::Str(b)) => a == b,
            (ConstantValue::Integer(a), ConstantValue::Integer(b)) => a == b,
            (ConstantValue::Float(a), ConstantValue::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

fn parse_number(text: &str) -> Option<ConstantValue> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let integral = digits.trim_end_matches(['L', 'l']);
    let parsed = if let Some(hex) = integral.strip_prefix("0x").or_else(|| integral.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()
    } else if !integral.is_empty() && integral.bytes().all(|b| b.is_ascii_digit()) {
        integral.parse::<i128>().ok()
    } else {
        None
    };
    if let Some(value) = parsed {
        return Some(ConstantValue::Integer(if negative { -value } else { value }));
    }
    let floating = digits.trim_end_matches(['f', 'F', 'd', 'D']);
    let looks_numeric = floating.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if looks_numeric {
        if let Ok(value) = floating.parse::<f64>() {
            return Some(ConstantValue::Float(if negative { -value } else { value }));
        }
    }
    None
}

fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '0' => out.push('\0'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}
