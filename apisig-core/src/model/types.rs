//! Type references as they appear in signature files.
//!
//! A [`TypeItem`] keeps a tokenized view of its text (names, annotations and
//! punctuation) so that rendering, erasure and type-variable substitution all
//! operate on whole tokens rather than on substrings.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, SignatureError};

/// Primitive type names, plus `void` and the `null` literal type.
pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void", "null",
];

const JAVA_LANG_PREFIX: &str = "java.lang.";

/// `java.lang` classes that short-form files refer to by simple name.
const JAVA_LANG_CLASSES: &[&str] = &[
    "Boolean", "Byte", "CharSequence", "Character", "Class", "Cloneable", "Comparable", "Deprecated",
    "Double", "Enum", "Error", "Exception", "Float", "Integer", "Iterable", "Long", "Number", "Object",
    "Override", "Runnable", "RuntimeException", "Short", "String", "StringBuilder", "Throwable", "Void",
];

#[derive(Clone, Debug, PartialEq, Eq)]
enum TypeToken {
    /// Identifier or dotted name. Also carries `extends` / `super` in bounds.
    Name(String),
    /// Full annotation text, e.g. `@Nullable` or `@IntRange(from = 0)`.
    Annotation(String),
    Open,
    Close,
    Comma,
    /// `.` joining `Outer<T>.Inner`.
    Dot,
    Array,
    Varargs,
    Wildcard,
    Nullable,
    Platform,
    Ampersand,
}

impl TypeToken {
    fn is_sigil(&self) -> bool {
        matches!(self, TypeToken::Nullable | TypeToken::Platform)
    }
}

#[derive(Clone, Copy, Default)]
struct Render {
    outer_annotations: bool,
    inner_annotations: bool,
    erased: bool,
    shorten: bool,
    qualify: bool,
    strip_sigils: bool,
}

/// A type reference: return type, field type, parameter type, super type or bound.
///
/// Equality and hashing use the canonical form: no annotations, no nullness
/// sigils and `java.lang.` elided.
#[derive(Clone, Debug)]
pub struct TypeItem {
    tokens: Vec<TypeToken>,
    canonical: String,
}

impl TypeItem {
    /// Tokenize and validate `text`. Malformed text is rejected here, never later.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        validate(text, &tokens)?;
        Ok(Self::from_tokens(tokens))
    }

    fn from_tokens(tokens: Vec<TypeToken>) -> Self {
        let canonical = render(
            &tokens,
            Render {
                shorten: true,
                strip_sigils: true,
                ..Render::default()
            },
        );
        Self { tokens, canonical }
    }

    /// Render the type.
    ///
    /// Outer annotations are those written before the top-level type name;
    /// every other annotation is inner. `erased` drops generic arguments,
    /// nullness sigils, and turns varargs into an array.
    pub fn to_type_string(&self, outer_annotations: bool, inner_annotations: bool, erased: bool) -> String {
        render(
            &self.tokens,
            Render {
                outer_annotations,
                inner_annotations,
                erased,
                ..Render::default()
            },
        )
    }

    /// Annotation-free erased form.
    pub fn to_erased_type_string(&self) -> String {
        self.to_type_string(false, false, true)
    }

    /// Key used for overload matching: erased, with `java.lang.` elided.
    pub fn signature_key(&self) -> String {
        render(
            &self.tokens,
            Render {
                erased: true,
                shorten: true,
                strip_sigils: true,
                ..Render::default()
            },
        )
    }

    /// Canonical non-annotated form used for equality.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Rendering used by the signature writer. Without `omit_common_packages`,
    /// well-known `java.lang` classes written by simple name are qualified.
    pub fn to_signature_string(&self, omit_common_packages: bool) -> String {
        render(
            &self.tokens,
            Render {
                outer_annotations: true,
                inner_annotations: true,
                shorten: omit_common_packages,
                qualify: !omit_common_packages,
                ..Render::default()
            },
        )
    }

    /// Substitute whole name tokens. All replacements apply simultaneously,
    /// so `{A -> B, B -> C}` maps `A` to `B`, never to `C`.
    pub fn convert_type(&self, replacements: &HashMap<String, TypeItem>) -> TypeItem {
        if replacements.is_empty() {
            return self.clone();
        }
        let mut tokens = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match token {
                TypeToken::Name(name) => match replacements.get(name) {
                    Some(replacement) => tokens.extend(replacement.tokens.iter().cloned()),
                    None => tokens.push(token.clone()),
                },
                _ => tokens.push(token.clone()),
            }
        }
        Self::from_tokens(tokens)
    }

    /// Top-level type arguments, e.g. `[K, V]` for `java.util.Map<K,V>`.
    pub fn type_arguments(&self) -> Vec<TypeItem> {
        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut current = Vec::new();
        for token in &self.tokens {
            match token {
                TypeToken::Open => {
                    depth += 1;
                    if depth == 1 {
                        continue;
                    }
                }
                TypeToken::Close => {
                    depth -= 1;
                    if depth == 0 {
                        if !current.is_empty() {
                            args.push(Self::from_tokens(std::mem::take(&mut current)));
                        }
                        // Only the first argument list belongs to the outermost type.
                        break;
                    }
                }
                TypeToken::Comma if depth == 1 => {
                    args.push(Self::from_tokens(std::mem::take(&mut current)));
                    continue;
                }
                _ => {}
            }
            if depth >= 1 {
                current.push(token.clone());
            }
        }
        args
    }

    /// Qualified name of the referenced class, without arguments, arrays or sigils.
    pub fn class_name(&self) -> String {
        let mut name = String::new();
        let mut depth = 0usize;
        for token in &self.tokens {
            match token {
                TypeToken::Open => depth += 1,
                TypeToken::Close => depth -= 1,
                TypeToken::Name(text) if depth == 0 => name.push_str(text),
                TypeToken::Dot if depth == 0 => name.push('.'),
                TypeToken::Array | TypeToken::Varargs if depth == 0 => break,
                _ => {}
            }
        }
        name
    }

    /// Whether this is a primitive (or `void`) type.
    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&self.signature_key().as_str())
    }

    pub fn is_varargs(&self) -> bool {
        self.top_level().any(|t| *t == TypeToken::Varargs)
    }

    pub fn is_array(&self) -> bool {
        self.array_dimensions() > 0
    }

    /// Number of top-level `[]` / `...` suffixes.
    pub fn array_dimensions(&self) -> usize {
        self.top_level()
            .filter(|t| matches!(t, TypeToken::Array | TypeToken::Varargs))
            .count()
    }

    /// Whether this type is a bare type variable from `names`.
    pub fn is_type_variable_of(&self, names: &[String]) -> bool {
        names.iter().any(|n| *n == self.canonical)
    }

    /// Kotlin nullness sigil on the outermost type, if any.
    ///
    /// A vararg carries its sigil before the `...`, as in `String?...`.
    pub fn nullness_sigil(&self) -> Option<char> {
        match self.sigil_index().map(|index| &self.tokens[index]) {
            Some(TypeToken::Nullable) => Some('?'),
            Some(TypeToken::Platform) => Some('!'),
            _ => None,
        }
    }

    /// Copy without the outermost nullness sigil.
    pub fn without_nullness_sigil(&self) -> TypeItem {
        let mut tokens = self.tokens.clone();
        if let Some(index) = self.sigil_index() {
            tokens.remove(index);
        }
        Self::from_tokens(tokens)
    }

    fn sigil_index(&self) -> Option<usize> {
        let last = self.tokens.len().checked_sub(1)?;
        let index = match self.tokens[last] {
            TypeToken::Varargs => last.checked_sub(1)?,
            _ => last,
        };
        self.tokens[index].is_sigil().then_some(index)
    }

    /// JVM internal name of the erased type, e.g. `java/util/Map$Entry[]`.
    pub fn to_internal_name(&self) -> String {
        let erased = self.to_erased_type_string();
        let (base, suffix) = match erased.find('[') {
            Some(index) => erased.split_at(index),
            None => (erased.as_str(), ""),
        };
        let mut out = String::new();
        let mut in_class = false;
        for (index, segment) in base.split('.').enumerate() {
            if index > 0 {
                out.push(if in_class { '$' } else { '/' });
            }
            out.push_str(segment);
            if segment.starts_with(|c: char| c.is_ascii_uppercase()) {
                in_class = true;
            }
        }
        out.push_str(suffix);
        out
    }

    fn top_level(&self) -> impl Iterator<Item = &TypeToken> {
        let mut depth = 0usize;
        self.tokens.iter().filter(move |token| {
            match token {
                TypeToken::Open => {
                    depth += 1;
                    return false;
                }
                TypeToken::Close => {
                    depth -= 1;
                    return false;
                }
                _ => {}
            }
            depth == 0
        })
    }
}

impl PartialEq for TypeItem {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for TypeItem {}

impl Hash for TypeItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for TypeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_type_string(true, true, false))
    }
}

/// Drop `java.lang.` from a name when the remainder is a top-level class.
pub fn strip_java_lang_prefix(name: &str) -> &str {
    match name.strip_prefix(JAVA_LANG_PREFIX) {
        Some(rest) if !rest.contains('.') && rest.starts_with(|c: char| c.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

/// One declared type parameter, e.g. `T extends java.lang.Comparable<T>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<TypeItem>,
}

/// Declared type parameters of a class or method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeParameterList {
    params: Vec<TypeParameter>,
}

impl TypeParameterList {
    /// Parse `<T, U extends A & B<U>>`.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        if tokens.first() != Some(&TypeToken::Open) || tokens.last() != Some(&TypeToken::Close) {
            return Err(SignatureError::invalid_type(text, "type parameters must be enclosed in `<>`"));
        }
        let inner = &tokens[1..tokens.len() - 1];
        let mut params = Vec::new();
        for segment in split_top_level(inner, &TypeToken::Comma) {
            let (name, rest) = match segment.split_first() {
                Some((TypeToken::Name(name), rest)) => (name.clone(), rest),
                _ => return Err(SignatureError::invalid_type(text, "expected a type parameter name")),
            };
            let mut bounds = Vec::new();
            match rest.split_first() {
                None => {}
                Some((TypeToken::Name(keyword), bound_tokens)) if keyword == "extends" => {
                    for bound in split_top_level(bound_tokens, &TypeToken::Ampersand) {
                        validate(text, bound)?;
                        bounds.push(TypeItem::from_tokens(bound.to_vec()));
                    }
                }
                Some(_) => return Err(SignatureError::invalid_type(text, "expected `extends` after type parameter")),
            }
            params.push(TypeParameter { name, bounds });
        }
        if params.is_empty() {
            return Err(SignatureError::invalid_type(text, "empty type parameter list"));
        }
        Ok(Self { params })
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params(&self) -> &[TypeParameter] {
        &self.params
    }

    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// Render as written in signature files.
    pub fn to_signature_string(&self, omit_common_packages: bool) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.bounds.is_empty() {
                    p.name.clone()
                } else {
                    let bounds: Vec<String> = p
                        .bounds
                        .iter()
                        .map(|b| b.to_signature_string(omit_common_packages))
                        .collect();
                    format!("{} extends {}", p.name, bounds.join(" & "))
                }
            })
            .collect();
        format!("<{}>", rendered.join(", "))
    }
}

fn split_top_level<'a>(tokens: &'a [TypeToken], separator: &TypeToken) -> Vec<&'a [TypeToken]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            TypeToken::Open => depth += 1,
            TypeToken::Close => depth = depth.saturating_sub(1),
            t if depth == 0 && t == separator => {
                parts.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        parts.push(&tokens[start..]);
    }
    parts
}

fn render(tokens: &[TypeToken], options: Render) -> String {
    let mut out = String::new();
    let mut previous: Option<&TypeToken> = None;
    let mut depth = 0usize;
    let mut leading = true;

    for token in tokens {
        let emit = match token {
            TypeToken::Annotation(_) => {
                let keep = if leading && depth == 0 {
                    options.outer_annotations
                } else {
                    options.inner_annotations
                };
                keep && !(options.erased && depth > 0)
            }
            TypeToken::Open => {
                leading = false;
                depth += 1;
                !options.erased
            }
            TypeToken::Close => {
                depth = depth.saturating_sub(1);
                !options.erased
            }
            TypeToken::Nullable | TypeToken::Platform => !(options.erased || options.strip_sigils),
            _ => {
                leading = false;
                !(options.erased && depth > 0)
            }
        };
        if !emit {
            continue;
        }

        match previous {
            Some(TypeToken::Annotation(_)) => out.push(' '),
            Some(TypeToken::Name(_)) | Some(TypeToken::Wildcard)
                if matches!(token, TypeToken::Name(_) | TypeToken::Annotation(_)) =>
            {
                out.push(' ')
            }
            _ => {}
        }

        match token {
            TypeToken::Name(name) => {
                if options.shorten {
                    out.push_str(strip_java_lang_prefix(name));
                } else if options.qualify && JAVA_LANG_CLASSES.contains(&name.as_str()) {
                    out.push_str(JAVA_LANG_PREFIX);
                    out.push_str(name);
                } else {
                    out.push_str(name);
                }
            }
            TypeToken::Annotation(text) => out.push_str(text),
            TypeToken::Open => out.push('<'),
            TypeToken::Close => out.push('>'),
            TypeToken::Comma => out.push(','),
            TypeToken::Dot => out.push('.'),
            TypeToken::Array => out.push_str("[]"),
            TypeToken::Varargs => out.push_str(if options.erased { "[]" } else { "..." }),
            TypeToken::Wildcard => out.push('?'),
            TypeToken::Nullable => out.push('?'),
            TypeToken::Platform => out.push('!'),
            TypeToken::Ampersand => out.push_str(" & "),
        }
        previous = Some(token);
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// End index of a dotted name starting at `start`; `start` if there is none.
fn scan_name(chars: &[char], start: usize) -> usize {
    if start >= chars.len() || !is_ident_start(chars[start]) {
        return start;
    }
    let mut i = start + 1;
    loop {
        if i < chars.len() && is_ident_part(chars[i]) {
            i += 1;
        } else if i + 1 < chars.len() && chars[i] == '.' && is_ident_start(chars[i + 1]) {
            i += 2;
        } else {
            return i;
        }
    }
}

/// Index just past the `)` matching the `(` at `open`, skipping quoted literals.
fn scan_balanced(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            quote @ ('"' | '\'') => {
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn tokenize(text: &str) -> Result<Vec<TypeToken>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<TypeToken> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '@' => {
                let start = i;
                let end = scan_name(&chars, i + 1);
                if end == i + 1 {
                    return Err(SignatureError::invalid_type(text, "annotation without a name"));
                }
                i = end;
                if i < chars.len() && chars[i] == '(' {
                    i = scan_balanced(&chars, i).ok_or_else(|| {
                        SignatureError::invalid_type(text, "unbalanced `(` in annotation")
                    })?;
                }
                tokens.push(TypeToken::Annotation(chars[start..i].iter().collect()));
            }
            c if is_ident_start(c) => {
                let end = scan_name(&chars, i);
                tokens.push(TypeToken::Name(chars[i..end].iter().collect()));
                i = end;
            }
            '<' => {
                tokens.push(TypeToken::Open);
                i += 1;
            }
            '>' => {
                tokens.push(TypeToken::Close);
                i += 1;
            }
            ',' => {
                tokens.push(TypeToken::Comma);
                i += 1;
            }
            '&' => {
                tokens.push(TypeToken::Ampersand);
                i += 1;
            }
            '!' => {
                tokens.push(TypeToken::Platform);
                i += 1;
            }
            '?' => {
                let wildcard = matches!(
                    tokens.last(),
                    None | Some(TypeToken::Open) | Some(TypeToken::Comma)
                );
                tokens.push(if wildcard {
                    TypeToken::Wildcard
                } else {
                    TypeToken::Nullable
                });
                i += 1;
            }
            '[' if chars.get(i + 1) == Some(&']') => {
                tokens.push(TypeToken::Array);
                i += 2;
            }
            '.' if chars[i..].starts_with(&['.', '.', '.']) => {
                tokens.push(TypeToken::Varargs);
                i += 3;
            }
            '.' if tokens.last() == Some(&TypeToken::Close)
                && chars.get(i + 1).is_some_and(|c| is_ident_start(*c)) =>
            {
                tokens.push(TypeToken::Dot);
                i += 1;
            }
            other => {
                return Err(SignatureError::invalid_type(
                    text,
                    format!("unexpected character `{}`", other),
                ))
            }
        }
    }
    Ok(tokens)
}

fn validate(text: &str, tokens: &[TypeToken]) -> Result<()> {
    let first = tokens
        .iter()
        .find(|t| !matches!(t, TypeToken::Annotation(_)));
    match first {
        Some(TypeToken::Name(_)) | Some(TypeToken::Wildcard) => {}
        Some(_) => return Err(SignatureError::invalid_type(text, "expected a type name")),
        None => return Err(SignatureError::invalid_type(text, "empty type")),
    }

    let mut depth = 0usize;
    let mut previous: Option<&TypeToken> = None;
    for token in tokens {
        match token {
            TypeToken::Open => {
                if !matches!(previous, Some(TypeToken::Name(_))) {
                    return Err(SignatureError::invalid_type(text, "`<` must follow a type name"));
                }
                depth += 1;
            }
            TypeToken::Close => {
                if matches!(previous, Some(TypeToken::Open) | Some(TypeToken::Comma)) {
                    return Err(SignatureError::invalid_type(text, "empty type argument"));
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SignatureError::invalid_type(text, "unbalanced `>`"))?;
            }
            TypeToken::Comma if depth == 0 => {
                return Err(SignatureError::invalid_type(text, "`,` outside type arguments"));
            }
            _ => {}
        }
        previous = Some(token);
    }
    if depth != 0 {
        return Err(SignatureError::invalid_type(text, "unbalanced `<`"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(text: &str) -> TypeItem {
        TypeItem::parse(text).unwrap()
    }

    #[test]
    fn test_render_and_erase() {
        let t = ty("java.util.Map<java.lang.String, java.util.List<T>>");
        assert_eq!(
            t.to_type_string(false, false, false),
            "java.util.Map<java.lang.String,java.util.List<T>>"
        );
        assert_eq!(t.to_erased_type_string(), "java.util.Map");
        assert_eq!(t.canonical(), "java.util.Map<String,java.util.List<T>>");
    }

    #[test]
    fn test_annotation_rendering() {
        let t = ty("@Nullable java.util.List<@NonNull java.lang.String>");
        assert_eq!(
            t.to_type_string(true, true, false),
            "@Nullable java.util.List<@NonNull java.lang.String>"
        );
        assert_eq!(
            t.to_type_string(false, true, false),
            "java.util.List<@NonNull java.lang.String>"
        );
        assert_eq!(
            t.to_type_string(true, false, false),
            "@Nullable java.util.List<java.lang.String>"
        );
        assert_eq!(t.to_type_string(true, true, true), "@Nullable java.util.List");
        assert_eq!(t, ty("java.util.List<String>"));
    }

    #[test]
    fn test_annotation_with_arguments() {
        let t = ty("@IntRange(from = 0, to = \")\") int");
        assert_eq!(t.to_erased_type_string(), "int");
        assert!(t.is_primitive());
    }

    #[test]
    fn test_signature_string_qualifies_java_lang() {
        let t = ty("java.util.Map<String,java.lang.Integer>");
        assert_eq!(t.to_signature_string(true), "java.util.Map<String,Integer>");
        assert_eq!(
            t.to_signature_string(false),
            "java.util.Map<java.lang.String,java.lang.Integer>"
        );
        assert_eq!(ty("T").to_signature_string(false), "T");
    }

    #[test]
    fn test_varargs_erase_to_array() {
        let varargs = ty("int...");
        let array = ty("int[]");
        assert!(varargs.is_varargs());
        assert!(!array.is_varargs());
        assert_eq!(varargs.signature_key(), array.signature_key());
        assert_ne!(varargs, array);
    }

    #[test]
    fn test_wildcards_and_bounds() {
        let t = ty("java.util.List<? extends java.lang.Number>");
        assert_eq!(t.canonical(), "java.util.List<? extends Number>");
        let args = t.type_arguments();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].canonical(), "? extends Number");
    }

    #[test]
    fn test_kotlin_sigils() {
        let t = ty("java.util.List<String?>?");
        assert_eq!(t.nullness_sigil(), Some('?'));
        let stripped = t.without_nullness_sigil();
        assert_eq!(stripped.to_type_string(false, false, false), "java.util.List<String?>");
        assert_eq!(t, stripped);
        assert_eq!(ty("String!").nullness_sigil(), Some('!'));
        assert_eq!(ty("String").nullness_sigil(), None);
    }

    #[test]
    fn test_vararg_sigil_sits_before_ellipsis() {
        let t = ty("String?...");
        assert_eq!(t.nullness_sigil(), Some('?'));
        let stripped = t.without_nullness_sigil();
        assert_eq!(stripped.to_type_string(false, false, false), "String...");
        assert!(stripped.is_varargs());
        assert_eq!(ty("String...").nullness_sigil(), None);
        assert_eq!(ty("String[]?").nullness_sigil(), Some('?'));
    }

    #[test]
    fn test_convert_type_is_simultaneous() {
        let t = ty("java.util.Map<A,B>");
        let mut map = HashMap::new();
        map.insert("A".to_string(), ty("B"));
        map.insert("B".to_string(), ty("C"));
        assert_eq!(t.convert_type(&map).canonical(), "java.util.Map<B,C>");
    }

    #[test]
    fn test_convert_type_matches_whole_tokens() {
        let t = ty("test.pkg.T<T,Tx,T$1>");
        let mut map = HashMap::new();
        map.insert("T".to_string(), ty("java.util.List<X>"));
        assert_eq!(
            t.convert_type(&map).canonical(),
            "test.pkg.T<java.util.List<X>,Tx,T$1>"
        );
    }

    #[test]
    fn test_malformed_types_fail() {
        assert!(TypeItem::parse("").is_err());
        assert!(TypeItem::parse("List<String").is_err());
        assert!(TypeItem::parse("List<>").is_err());
        assert!(TypeItem::parse("List>").is_err());
        assert!(TypeItem::parse("int[").is_err());
        assert!(TypeItem::parse("a;b").is_err());
        assert!(TypeItem::parse("@ int").is_err());
    }

    #[test]
    fn test_inner_class_of_generic() {
        let t = ty("test.pkg.Outer<T>.Inner<U>");
        assert_eq!(t.to_erased_type_string(), "test.pkg.Outer.Inner");
        assert_eq!(t.class_name(), "test.pkg.Outer.Inner");
    }

    #[test]
    fn test_strip_java_lang_prefix() {
        assert_eq!(strip_java_lang_prefix("java.lang.String"), "String");
        assert_eq!(
            strip_java_lang_prefix("java.lang.annotation.Retention"),
            "java.lang.annotation.Retention"
        );
        assert_eq!(strip_java_lang_prefix("java.util.List"), "java.util.List");
    }

    #[test]
    fn test_internal_name() {
        assert_eq!(ty("java.util.Map.Entry<K,V>").to_internal_name(), "java/util/Map$Entry");
        assert_eq!(ty("java.lang.String[]").to_internal_name(), "java/lang/String[]");
    }

    #[test]
    fn test_type_parameter_list() {
        let list = TypeParameterList::parse("<T extends java.lang.Number & java.lang.Comparable<T>, U>").unwrap();
        assert_eq!(list.names(), vec!["T".to_string(), "U".to_string()]);
        assert_eq!(list.params()[0].bounds.len(), 2);
        assert_eq!(
            list.to_signature_string(true),
            "<T extends Number & Comparable<T>, U>"
        );
        assert!(TypeParameterList::parse("T").is_err());
        assert!(TypeParameterList::parse("<>").is_err());
    }
}
