//! Modifier flags and annotations attached to API items.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignatureError};

/// Qualified name used for synthetic nullable annotations.
pub const NULLABLE: &str = "androidx.annotation.Nullable";
/// Qualified name used for synthetic non-null annotations.
pub const NON_NULL: &str = "androidx.annotation.NonNull";

const NULLABLE_NAMES: &[&str] = &["Nullable", "RecentlyNullable", "NullableDecl", "CheckForNull"];
const NON_NULL_NAMES: &[&str] = &["NonNull", "NotNull", "Nonnull", "RecentlyNonNull", "NonNullDecl"];
const SUPPRESS_NAMES: &[&str] = &["SuppressLint", "Suppress"];
const HIDE_NAMES: &[&str] = &["Hide"];

/// Declared visibility, ordered from narrowest to widest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Private,
    PackagePrivate,
    Internal,
    Protected,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PackagePrivate => "package private",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

/// Nullness declared through an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nullness {
    Nullable,
    NonNull,
}

/// An annotation as written, e.g. `@SuppressLint("RemovedMethod")`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationItem {
    qualified_name: String,
    arguments: Option<String>,
}

impl AnnotationItem {
    /// Annotation without arguments.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            arguments: None,
        }
    }

    /// Parse annotation source text starting with `@`.
    pub fn parse(source: &str) -> Result<Self> {
        let body = source
            .trim()
            .strip_prefix('@')
            .ok_or_else(|| SignatureError::invalid_type(source, "annotation must start with `@`"))?;
        let (name, arguments) = match body.find('(') {
            Some(open) => {
                let args = body[open..]
                    .strip_prefix('(')
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| SignatureError::invalid_type(source, "unbalanced annotation arguments"))?;
                (&body[..open], Some(args.to_string()))
            }
            None => (body, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(SignatureError::invalid_type(source, "annotation without a name"));
        }
        Ok(Self {
            qualified_name: name.to_string(),
            arguments,
        })
    }

    /// Same annotation under another name.
    pub fn with_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = qualified_name.into();
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn arguments(&self) -> Option<&str> {
        self.arguments.as_deref()
    }

    pub fn nullness(&self) -> Option<Nullness> {
        let simple = self.simple_name();
        if NULLABLE_NAMES.contains(&simple) {
            Some(Nullness::Nullable)
        } else if NON_NULL_NAMES.contains(&simple) {
            Some(Nullness::NonNull)
        } else {
            None
        }
    }

    pub fn is_suppress(&self) -> bool {
        SUPPRESS_NAMES.contains(&self.simple_name())
    }

    pub fn is_hide(&self) -> bool {
        HIDE_NAMES.contains(&self.simple_name())
    }

    /// Whether the annotation matches `name`, given either qualified or simple.
    pub fn matches(&self, name: &str) -> bool {
        self.qualified_name == name || (!name.contains('.') && self.simple_name() == name)
    }

    /// String literal values among the arguments, unquoted.
    pub fn string_values(&self) -> Vec<String> {
        let Some(args) = &self.arguments else {
            return Vec::new();
        };
        let mut values = Vec::new();
        let mut chars = args.chars();
        while let Some(c) = chars.next() {
            if c != '"' {
                continue;
            }
            let mut value = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    _ => value.push(c),
                }
            }
            values.push(value);
        }
        values
    }

    /// Source form, optionally eliding well-known annotation packages.
    pub fn to_source(&self, omit_common_packages: bool) -> String {
        let name = if omit_common_packages {
            self.qualified_name
                .strip_prefix("androidx.annotation.")
                .or_else(|| self.qualified_name.strip_prefix("android.support.annotation."))
                .unwrap_or(&self.qualified_name)
        } else {
            &self.qualified_name
        };
        match &self.arguments {
            Some(args) => format!("@{}({})", name, args),
            None => format!("@{}", name),
        }
    }
}

/// Modifier bitset plus annotations.
///
/// Built up by a frontend, then moved into an item; items only hand out
/// shared references, so the list is frozen once the item is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierList {
    flags: u32,
    annotations: Vec<AnnotationItem>,
}

impl ModifierList {
    pub const PUBLIC: u32 = 1 << 0;
    pub const PROTECTED: u32 = 1 << 1;
    pub const PRIVATE: u32 = 1 << 2;
    pub const INTERNAL: u32 = 1 << 3;
    pub const STATIC: u32 = 1 << 4;
    pub const ABSTRACT: u32 = 1 << 5;
    pub const FINAL: u32 = 1 << 6;
    pub const NATIVE: u32 = 1 << 7;
    pub const SYNCHRONIZED: u32 = 1 << 8;
    pub const STRICT_FP: u32 = 1 << 9;
    pub const TRANSIENT: u32 = 1 << 10;
    pub const VOLATILE: u32 = 1 << 11;
    pub const DEFAULT: u32 = 1 << 12;
    pub const VARARG: u32 = 1 << 13;
    pub const SEALED: u32 = 1 << 14;
    pub const INFIX: u32 = 1 << 15;
    pub const OPERATOR: u32 = 1 << 16;
    pub const INLINE: u32 = 1 << 17;
    pub const SUSPEND: u32 = 1 << 18;
    pub const DEPRECATED: u32 = 1 << 19;

    /// Keywords in the order the writer emits them. `VARARG` has no keyword.
    pub const KEYWORDS: &'static [(&'static str, u32)] = &[
        ("public", Self::PUBLIC),
        ("protected", Self::PROTECTED),
        ("private", Self::PRIVATE),
        ("internal", Self::INTERNAL),
        ("deprecated", Self::DEPRECATED),
        ("static", Self::STATIC),
        ("abstract", Self::ABSTRACT),
        ("default", Self::DEFAULT),
        ("final", Self::FINAL),
        ("sealed", Self::SEALED),
        ("native", Self::NATIVE),
        ("synchronized", Self::SYNCHRONIZED),
        ("strictfp", Self::STRICT_FP),
        ("transient", Self::TRANSIENT),
        ("volatile", Self::VOLATILE),
        ("operator", Self::OPERATOR),
        ("infix", Self::INFIX),
        ("inline", Self::INLINE),
        ("suspend", Self::SUSPEND),
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Flag for a modifier keyword.
    pub fn flag_for_keyword(keyword: &str) -> Option<u32> {
        Self::KEYWORDS
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, flag)| *flag)
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    pub fn set(&mut self, flag: u32, value: bool) {
        if value {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    pub fn add_annotation(&mut self, annotation: AnnotationItem) {
        self.annotations.push(annotation);
    }

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn annotations(&self) -> &[AnnotationItem] {
        &self.annotations
    }

    pub fn visibility(&self) -> Visibility {
        if self.has(Self::PUBLIC) {
            Visibility::Public
        } else if self.has(Self::PROTECTED) {
            Visibility::Protected
        } else if self.has(Self::INTERNAL) {
            Visibility::Internal
        } else if self.has(Self::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::PackagePrivate
        }
    }

    pub fn is_public(&self) -> bool {
        self.has(Self::PUBLIC)
    }

    pub fn is_protected(&self) -> bool {
        self.has(Self::PROTECTED)
    }

    pub fn is_static(&self) -> bool {
        self.has(Self::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.has(Self::ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.has(Self::FINAL)
    }

    pub fn is_sealed(&self) -> bool {
        self.has(Self::SEALED)
    }

    pub fn is_vararg(&self) -> bool {
        self.has(Self::VARARG)
    }

    pub fn is_operator(&self) -> bool {
        self.has(Self::OPERATOR)
    }

    pub fn is_infix(&self) -> bool {
        self.has(Self::INFIX)
    }

    pub fn is_deprecated(&self) -> bool {
        self.has(Self::DEPRECATED)
    }

    /// First annotation declaring nullness.
    pub fn find_nullness_annotation(&self) -> Option<&AnnotationItem> {
        self.annotations.iter().find(|a| a.nullness().is_some())
    }

    pub fn nullness(&self) -> Option<Nullness> {
        self.find_nullness_annotation().and_then(AnnotationItem::nullness)
    }

    pub fn has_hide_annotation(&self) -> bool {
        self.annotations.iter().any(AnnotationItem::is_hide)
    }

    /// Whether any annotation matches one of `names`.
    pub fn has_any_annotation(&self, names: &[String]) -> bool {
        self.annotations
            .iter()
            .any(|a| names.iter().any(|n| a.matches(n)))
    }

    /// Values of `@SuppressLint` / `@Suppress` annotations.
    pub fn suppressed_values(&self) -> Vec<String> {
        self.annotations
            .iter()
            .filter(|a| a.is_suppress())
            .flat_map(AnnotationItem::string_values)
            .collect()
    }

    /// Keywords for the set flags, in writer order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::KEYWORDS
            .iter()
            .filter(move |(_, flag)| self.has(*flag))
            .map(|(keyword, _)| *keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip() {
        let mut modifiers = ModifierList::new();
        for keyword in ["final", "public", "static"] {
            let flag = ModifierList::flag_for_keyword(keyword).unwrap();
            modifiers.set(flag, true);
        }
        let keywords: Vec<_> = modifiers.keywords().collect();
        assert_eq!(keywords, vec!["public", "static", "final"]);
        assert!(ModifierList::flag_for_keyword("vararg").is_none());
    }

    #[test]
    fn test_visibility_order() {
        let public = ModifierList::new().with_flags(ModifierList::PUBLIC);
        let protected = ModifierList::new().with_flags(ModifierList::PROTECTED);
        assert!(protected.visibility() < public.visibility());
        assert_eq!(ModifierList::new().visibility(), Visibility::PackagePrivate);
    }

    #[test]
    fn test_nullness_annotations() {
        let mut modifiers = ModifierList::new();
        assert_eq!(modifiers.nullness(), None);
        modifiers.add_annotation(AnnotationItem::parse("@Deprecated").unwrap());
        modifiers.add_annotation(AnnotationItem::new(NULLABLE));
        assert_eq!(modifiers.nullness(), Some(Nullness::Nullable));
        assert_eq!(
            modifiers.find_nullness_annotation().map(|a| a.simple_name()),
            Some("Nullable")
        );
    }

    #[test]
    fn test_suppress_values() {
        let annotation =
            AnnotationItem::parse(r#"@android.annotation.SuppressLint({"RemovedMethod", "ChangedType:Changed \"x\""})"#)
                .unwrap();
        assert!(annotation.is_suppress());
        assert_eq!(
            annotation.string_values(),
            vec!["RemovedMethod".to_string(), "ChangedType:Changed \"x\"".to_string()]
        );
    }

    #[test]
    fn test_annotation_source() {
        let annotation = AnnotationItem::new(NON_NULL);
        assert_eq!(annotation.to_source(true), "@NonNull");
        assert_eq!(annotation.to_source(false), "@androidx.annotation.NonNull");
        assert!(AnnotationItem::parse("Nullable").is_err());
        assert!(AnnotationItem::parse("@").is_err());
    }
}
