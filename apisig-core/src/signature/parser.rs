//! Signature file parser - builds a [`Codebase`] from signature text.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use rayon::prelude::*;
use regex::Regex;

use crate::error::{Result, SignatureError};
use crate::format::FileFormat;
use crate::model::modifiers::{NON_NULL, NULLABLE};
use crate::model::{
    AnnotationItem, ClassId, ClassItem, ClassKind, Codebase, CodebaseBuilder, FieldItem, ItemState,
    MethodItem, ModifierList, PackageId, ParameterItem, PropertyItem, SourcePosition,
    TypeItem, TypeParameterList,
};

#[derive(Parser)]
#[grammar = "signature/grammar.pest"]
struct SignatureGrammar;

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^// Signature format: (\S+)").unwrap());

/// Annotation packages elided by formats that omit common packages.
const COMMON_ANNOTATION_PACKAGE: &str = "androidx.annotation.";

/// Read the format declared by the header line. No header means the legacy format.
pub fn detect_format(text: &str, file: Option<&str>) -> Result<FileFormat> {
    let first = text.lines().next().unwrap_or_default();
    let Some(captures) = HEADER.captures(first) else {
        return Ok(FileFormat::V1);
    };
    let tag = &captures[1];
    match FileFormat::parse(tag) {
        FileFormat::Unknown => Err(SignatureError::parse(
            file,
            1,
            SignatureError::UnsupportedFormat { tag: tag.to_string() }.to_string(),
        )),
        format => Ok(format),
    }
}

/// Parse one signature text into `builder`. Returns the format it declared.
///
/// Items read with `classpath` set are marked as coming from outside the
/// tracked API.
pub fn read_signature(
    builder: &mut CodebaseBuilder,
    text: &str,
    file: Option<&str>,
    classpath: bool,
) -> Result<FileFormat> {
    let format = detect_format(text, file)?;
    let mut pairs = SignatureGrammar::parse(Rule::file, text).map_err(|e| syntax_error(file, e))?;
    let root = pairs
        .next()
        .ok_or_else(|| SignatureError::parse(file, 1, "Empty signature file"))?;

    let mut reader = FileReader {
        builder,
        file: file.map(Arc::from),
        format,
        classpath,
    };
    for pair in root.into_inner() {
        if pair.as_rule() == Rule::package {
            reader.package(pair)?;
        }
    }
    if !classpath && reader.builder.codebase().format().is_none() {
        reader.builder.set_format(format);
    }
    tracing::debug!(
        "Parsed {} (format {})",
        file.unwrap_or("<text>"),
        format
    );
    Ok(format)
}

/// Parse a single signature text into a new codebase.
pub fn parse_signature(description: &str, text: &str) -> Result<Codebase> {
    let mut builder = CodebaseBuilder::new(description);
    read_signature(&mut builder, text, None, false)?;
    Ok(builder.build())
}

/// Signature files making up one API snapshot.
#[derive(Clone, Debug, Default)]
pub struct ApiSources {
    /// Name of the snapshot, used in logs.
    pub description: String,
    pub files: Vec<PathBuf>,
    /// Files describing classes outside the tracked API.
    pub classpath: Vec<PathBuf>,
}

impl ApiSources {
    pub fn new(description: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            description: description.into(),
            files,
            classpath: Vec::new(),
        }
    }

    pub fn with_classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Read and merge every file into one codebase.
    pub fn load(&self) -> Result<Codebase> {
        let mut builder = CodebaseBuilder::new(self.description.clone());
        for path in &self.files {
            read_file(&mut builder, path, false)?;
        }
        for path in &self.classpath {
            read_file(&mut builder, path, true)?;
        }
        Ok(builder.build())
    }
}

fn read_file(builder: &mut CodebaseBuilder, path: &Path, classpath: bool) -> Result<FileFormat> {
    let text = std::fs::read_to_string(path)?;
    let name = path.display().to_string();
    read_signature(builder, &text, Some(&name), classpath)
}

/// Parse the given signature files into one codebase.
pub fn parse_files(description: &str, files: &[PathBuf]) -> Result<Codebase> {
    ApiSources::new(description, files.to_vec()).load()
}

/// Load several snapshots concurrently. Results keep the input order.
pub fn load_codebases_parallel(sources: &[ApiSources]) -> Vec<Result<Codebase>> {
    sources.par_iter().map(ApiSources::load).collect()
}

fn syntax_error(file: Option<&str>, error: pest::error::Error<Rule>) -> SignatureError {
    let line = match error.line_col {
        LineColLocation::Pos((line, _)) => line,
        LineColLocation::Span((line, _), _) => line,
    };
    let error = error.renamed_rules(|rule| {
        match rule {
            Rule::type_ref | Rule::super_type => "type",
            Rule::ident => "name",
            Rule::class_name => "class name",
            Rule::qualified_name => "qualified name",
            Rule::class_kind => "class, interface, enum or @interface",
            Rule::modifier_list | Rule::modifier => "modifier",
            Rule::annotation => "annotation",
            Rule::constructor | Rule::method | Rule::field | Rule::enum_constant | Rule::property => "member",
            Rule::class_decl => "class declaration",
            Rule::package => "package",
            Rule::parameter => "parameter",
            _ => "token",
        }
        .to_string()
    });
    SignatureError::parse(file, line as u32, error.variant.message().to_string())
}

struct FileReader<'b> {
    builder: &'b mut CodebaseBuilder,
    file: Option<Arc<str>>,
    format: FileFormat,
    classpath: bool,
}

impl FileReader<'_> {
    fn position(&self, pair: &Pair<Rule>) -> SourcePosition {
        SourcePosition::new(self.file.clone(), pair.as_span().start_pos().line_col().0 as u32)
    }

    fn error(&self, pair: &Pair<Rule>, message: impl Into<String>) -> SignatureError {
        SignatureError::Parse {
            file: self.file.as_deref().map(str::to_string),
            line: self.position(pair).line,
            message: message.into(),
        }
    }

    /// Attach a location to a model error raised while handling `pair`.
    fn located(&self, pair: &Pair<Rule>, error: SignatureError) -> SignatureError {
        match error {
            SignatureError::Parse { .. } => error,
            other => self.error(pair, other.to_string()),
        }
    }

    fn state(&self, modifiers: ModifierList, position: SourcePosition) -> ItemState {
        let state = ItemState::new(modifiers, "", position);
        if self.classpath {
            state.from_class_path()
        } else {
            state
        }
    }

    fn type_item(&self, pair: &Pair<Rule>) -> Result<TypeItem> {
        TypeItem::parse(pair.as_str()).map_err(|e| self.located(pair, e))
    }

    fn package(&mut self, pair: Pair<Rule>) -> Result<()> {
        let position = self.position(&pair);
        let mut inner = pair.into_inner();
        let name = inner
            .find(|p| p.as_rule() == Rule::qualified_name)
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        let state = self.state(ModifierList::new().with_flags(ModifierList::PUBLIC), position);
        let package = self.builder.package(&name, state);
        for class in inner.filter(|p| p.as_rule() == Rule::class_decl) {
            self.class(class, package, &name)?;
        }
        Ok(())
    }

    fn class(&mut self, pair: Pair<Rule>, package: PackageId, package_name: &str) -> Result<()> {
        let position = self.position(&pair);
        let decl = pair.clone();
        let mut modifiers = ModifierList::new();
        let mut kind = ClassKind::Class;
        let mut name = String::new();
        let mut type_parameters = TypeParameterList::default();
        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut members = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier_list => modifiers = self.modifiers(inner)?,
                Rule::class_kind => {
                    kind = ClassKind::from_keyword(inner.as_str())
                        .ok_or_else(|| self.error(&inner, format!("Unknown class kind {}", inner.as_str())))?;
                }
                Rule::class_name => name = inner.as_str().to_string(),
                Rule::type_params => {
                    type_parameters = TypeParameterList::parse(inner.as_str()).map_err(|e| self.located(&inner, e))?;
                }
                Rule::extends_clause => {
                    for super_type in inner.into_inner().filter(|p| p.as_rule() == Rule::super_type) {
                        if let Some(ty) = super_type.into_inner().next() {
                            extends.push(self.type_item(&ty)?);
                        }
                    }
                }
                Rule::implements_clause => {
                    for ty in inner.into_inner().filter(|p| p.as_rule() == Rule::type_ref) {
                        implements.push(self.type_item(&ty)?);
                    }
                }
                _ => members.push(inner),
            }
        }

        let (super_class, mut interfaces) = match kind {
            ClassKind::Interface | ClassKind::AnnotationType => (None, extends),
            _ => {
                if extends.len() > 1 {
                    return Err(self.error(&decl, format!("Class {} extends more than one type", name)));
                }
                (extends.pop(), Vec::new())
            }
        };
        interfaces.extend(implements);

        let containing = self.containing_class(&name, package_name);
        let class = ClassItem::new(name, kind, self.state(modifiers, position))
            .with_type_parameters(type_parameters)
            .with_super_class_type(super_class)
            .with_interface_types(interfaces);
        let class = self
            .builder
            .add_class(package, containing, class)
            .map_err(|e| self.located(&decl, e))?;

        for member in members {
            self.member(member, class)?;
        }
        Ok(())
    }

    /// Outer class of an inner class named `Outer.Inner`, if already declared.
    fn containing_class(&self, name: &str, package_name: &str) -> Option<ClassId> {
        let (outer, _) = name.rsplit_once('.')?;
        let qualified = if package_name.is_empty() {
            outer.to_string()
        } else {
            format!("{}.{}", package_name, outer)
        };
        let found = self.builder.find_class(&qualified);
        if found.is_none() {
            tracing::warn!(
                "Outer class {} of {} not found; treating it as top level",
                qualified,
                name
            );
        }
        found
    }

    fn member(&mut self, pair: Pair<Rule>, class: ClassId) -> Result<()> {
        let rule = pair.as_rule();
        let member = pair.clone();
        let result = match rule {
            Rule::constructor => {
                let constructor = self.constructor(pair)?;
                self.builder.add_constructor(class, constructor)
            }
            Rule::method => {
                let method = self.method(pair)?;
                self.builder.add_method(class, method)
            }
            Rule::field | Rule::enum_constant => {
                let field = self.field(pair, rule == Rule::enum_constant)?;
                self.builder.add_field(class, field)
            }
            Rule::property => {
                let property = self.property(pair)?;
                self.builder.add_property(class, property)
            }
            _ => Ok(()),
        };
        result.map_err(|e| self.located(&member, e))
    }

    fn constructor(&self, pair: Pair<Rule>) -> Result<MethodItem> {
        let position = self.position(&pair);
        let mut modifiers = ModifierList::new();
        let mut type_parameters = TypeParameterList::default();
        let mut name = String::new();
        let mut parameters = Vec::new();
        let mut throws = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier_list => modifiers = self.modifiers(inner)?,
                Rule::type_params => {
                    type_parameters = TypeParameterList::parse(inner.as_str()).map_err(|e| self.located(&inner, e))?;
                }
                Rule::class_name => {
                    let full = inner.as_str();
                    name = full.rsplit('.').next().unwrap_or(full).to_string();
                }
                Rule::parameters => parameters = self.parameters(inner)?,
                Rule::throws_clause => throws = self.type_list(inner)?,
                _ => {}
            }
        }
        Ok(MethodItem::constructor(name, parameters, self.state(modifiers, position))
            .with_type_parameters(type_parameters)
            .with_throws(throws))
    }

    fn method(&self, pair: Pair<Rule>) -> Result<MethodItem> {
        let position = self.position(&pair);
        let mut modifiers = ModifierList::new();
        let mut type_parameters = TypeParameterList::default();
        let mut return_type = None;
        let mut name = String::new();
        let mut parameters = Vec::new();
        let mut throws = Vec::new();
        let mut default_value = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier_list => modifiers = self.modifiers(inner)?,
                Rule::type_params => {
                    type_parameters = TypeParameterList::parse(inner.as_str()).map_err(|e| self.located(&inner, e))?;
                }
                Rule::type_ref => return_type = Some(self.type_item(&inner)?),
                Rule::ident => name = inner.as_str().to_string(),
                Rule::parameters => parameters = self.parameters(inner)?,
                Rule::throws_clause => throws = self.type_list(inner)?,
                Rule::annotation_default => {
                    default_value = inner
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::constant)
                        .map(|p| p.as_str().trim().to_string());
                }
                _ => {}
            }
        }
        let return_type = return_type.ok_or_else(|| SignatureError::parse(self.file.as_deref(), position.line, "Method without a return type"))?;
        let return_type = self.kotlin_nullness(return_type, &mut modifiers);
        Ok(MethodItem::method(name, return_type, parameters, self.state(modifiers, position))
            .with_type_parameters(type_parameters)
            .with_throws(throws)
            .with_default_value(default_value))
    }

    fn field(&self, pair: Pair<Rule>, enum_constant: bool) -> Result<FieldItem> {
        let position = self.position(&pair);
        let (mut modifiers, ty, name, value) = self.typed_member(pair)?;
        let ty = self.kotlin_nullness(ty, &mut modifiers);
        let state = self.state(modifiers, position);
        Ok(if enum_constant {
            FieldItem::enum_constant(name, ty, state)
        } else {
            FieldItem::new(name, ty, value, state)
        })
    }

    fn property(&self, pair: Pair<Rule>) -> Result<PropertyItem> {
        let position = self.position(&pair);
        let (mut modifiers, ty, name, _) = self.typed_member(pair)?;
        let ty = self.kotlin_nullness(ty, &mut modifiers);
        Ok(PropertyItem::new(name, ty, self.state(modifiers, position)))
    }

    /// Modifiers, type, name and optional value shared by fields and properties.
    fn typed_member(&self, pair: Pair<Rule>) -> Result<(ModifierList, TypeItem, String, Option<String>)> {
        let line = self.position(&pair).line;
        let mut modifiers = ModifierList::new();
        let mut ty = None;
        let mut name = String::new();
        let mut value = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier_list => modifiers = self.modifiers(inner)?,
                Rule::type_ref => ty = Some(self.type_item(&inner)?),
                Rule::ident => name = inner.as_str().to_string(),
                Rule::field_value => {
                    value = inner
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::constant)
                        .map(|p| p.as_str().trim().to_string());
                }
                _ => {}
            }
        }
        let ty = ty.ok_or_else(|| SignatureError::parse(self.file.as_deref(), line, "Member without a type"))?;
        Ok((modifiers, ty, name, value))
    }

    fn parameters(&self, pair: Pair<Rule>) -> Result<Vec<ParameterItem>> {
        let mut parameters = Vec::new();
        for parameter in pair.into_inner().filter(|p| p.as_rule() == Rule::parameter) {
            let mut modifiers = ModifierList::new();
            let mut ty = None;
            let mut name = None;
            let mut default_value = None;
            let line = self.position(&parameter).line;
            for inner in parameter.into_inner() {
                match inner.as_rule() {
                    Rule::modifier_list => modifiers = self.modifiers(inner)?,
                    Rule::type_ref => ty = Some(self.type_item(&inner)?),
                    Rule::ident => name = Some(inner.as_str().to_string()),
                    Rule::param_default => default_value = Some(inner.as_str().trim().to_string()),
                    _ => {}
                }
            }
            let ty = ty.ok_or_else(|| SignatureError::parse(self.file.as_deref(), line, "Parameter without a type"))?;
            let ty = self.kotlin_nullness(ty, &mut modifiers);
            parameters.push(ParameterItem::new(name, ty, modifiers, default_value));
        }
        Ok(parameters)
    }

    fn type_list(&self, pair: Pair<Rule>) -> Result<Vec<TypeItem>> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::type_ref)
            .map(|p| self.type_item(&p))
            .collect()
    }

    fn modifiers(&self, pair: Pair<Rule>) -> Result<ModifierList> {
        let mut modifiers = ModifierList::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier => {
                    if let Some(flag) = ModifierList::flag_for_keyword(inner.as_str()) {
                        modifiers.set(flag, true);
                    }
                }
                Rule::annotation => {
                    let annotation = AnnotationItem::parse(inner.as_str()).map_err(|e| self.located(&inner, e))?;
                    if annotation.matches("Deprecated") || annotation.matches("java.lang.Deprecated") {
                        modifiers.set(ModifierList::DEPRECATED, true);
                    } else {
                        modifiers.add_annotation(self.expand_common_package(annotation));
                    }
                }
                _ => {}
            }
        }
        Ok(modifiers)
    }

    /// Restore the package of a nullness annotation written in short form.
    fn expand_common_package(&self, annotation: AnnotationItem) -> AnnotationItem {
        let short = !annotation.qualified_name().contains('.');
        if self.format.omit_common_packages() && short && annotation.nullness().is_some() {
            let name = format!("{}{}", COMMON_ANNOTATION_PACKAGE, annotation.qualified_name());
            return annotation.with_name(name);
        }
        annotation
    }

    /// Turn a Kotlin nullness sigil into a nullness annotation on the owning item.
    fn kotlin_nullness(&self, ty: TypeItem, modifiers: &mut ModifierList) -> TypeItem {
        if !self.format.kotlin_style_nulls() {
            return ty;
        }
        if modifiers.nullness().is_none() {
            match ty.nullness_sigil() {
                Some('?') => modifiers.add_annotation(AnnotationItem::new(NULLABLE)),
                Some(_) => {}
                None if !ty.is_primitive() => modifiers.add_annotation(AnnotationItem::new(NON_NULL)),
                None => {}
            }
        }
        ty.without_nullness_sigil()
    }
}
