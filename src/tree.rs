//! The resolved mapping model produced by the interpreter.
use indexmap::IndexMap;
use itertools::Itertools;
use serde_derive::Serialize;

/// Free-form `key="value"` pairs, kept in declaration order
pub type Metadata = IndexMap<String, String>;

/// A version specific obfuscated name
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AliasEntry {
    pub version: String,
    /// Empty for removed entries
    pub obfuscated_name: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "::std::ops::Not::not")]
    pub removed: bool
}
impl AliasEntry {
    #[inline]
    pub fn new<V: Into<String>, N: Into<String>>(version: V, obfuscated_name: N) -> AliasEntry {
        AliasEntry {
            version: version.into(),
            obfuscated_name: obfuscated_name.into(),
            metadata: Metadata::new(),
            removed: false
        }
    }
    #[inline]
    pub fn removed<V: Into<String>>(version: V) -> AliasEntry {
        AliasEntry {
            version: version.into(),
            obfuscated_name: String::new(),
            metadata: Metadata::new(),
            removed: true
        }
    }
    #[inline]
    pub fn with_metadata(mut self, metadata: Metadata) -> AliasEntry {
        self.metadata = metadata;
        self
    }
}

/// Anything carrying a per-version alias history.
pub trait Aliasable {
    fn aliases(&self) -> &[AliasEntry];
    fn original_name(&self) -> &str;
    /// The obfuscated name used when no version specific alias applies
    fn default_obfuscated_name(&self) -> &str;
    /// The non-removed alias declared for exactly this version.
    ///
    /// This only consults the entity's own aliases and never falls back.
    fn obfuscated_name_for_version(&self, version: Option<&str>) -> Option<&str> {
        let version = version?;
        self.aliases().iter()
            .find(|alias| alias.version == version && !alias.removed)
            .map(|alias| &*alias.obfuscated_name)
    }
    #[inline]
    fn resolve_obfuscated_name(&self, version: Option<&str>) -> &str {
        self.obfuscated_name_for_version(version)
            .unwrap_or_else(|| self.default_obfuscated_name())
    }
    fn live_aliases<'a>(&'a self) -> Box<dyn Iterator<Item=&'a AliasEntry> + 'a> {
        Box::new(self.aliases().iter().filter(|alias| !alias.removed))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MappingTree {
    pub package_name: String,
    /// Import alias to fully qualified name
    pub imports: IndexMap<String, String>,
    pub classes: Vec<ClassMapping>
}
impl MappingTree {
    /// Counts every class, including inner classes
    pub fn class_count(&self) -> usize {
        fn count(classes: &[ClassMapping]) -> usize {
            classes.iter().map(|class| 1 + count(&class.inner_classes)).sum()
        }
        count(&self.classes)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClassMapping {
    pub original_name: String,
    pub fallback_obfuscated_name: String,
    pub metadata: Metadata,
    pub methods: Vec<MethodMapping>,
    pub fields: Vec<FieldMapping>,
    pub inner_classes: Vec<ClassMapping>,
    pub aliases: Vec<AliasEntry>
}
impl ClassMapping {
    pub fn new<O: Into<String>, F: Into<String>>(original_name: O, fallback_obfuscated_name: F) -> ClassMapping {
        ClassMapping {
            original_name: original_name.into(),
            fallback_obfuscated_name: fallback_obfuscated_name.into(),
            metadata: Metadata::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            inner_classes: Vec::new(),
            aliases: Vec::new()
        }
    }
}
impl ClassMapping {
    /// Find a method by original name, versioned name, then default obfuscated name
    #[inline]
    pub fn find_method(&self, name: &str, version: Option<&str>) -> Option<&MethodMapping> {
        find_member(&self.methods, name, version)
    }
    /// Find a field by original name, versioned name, then default obfuscated name
    #[inline]
    pub fn find_field(&self, name: &str, version: Option<&str>) -> Option<&FieldMapping> {
        find_member(&self.fields, name, version)
    }
}
impl Aliasable for ClassMapping {
    #[inline]
    fn aliases(&self) -> &[AliasEntry] {
        &self.aliases
    }
    #[inline]
    fn original_name(&self) -> &str {
        &self.original_name
    }
    #[inline]
    fn default_obfuscated_name(&self) -> &str {
        &self.fallback_obfuscated_name
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MethodMapping {
    pub original_name: String,
    pub obfuscated_name: String,
    pub parameters: Vec<ResolvedParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javadoc: Option<String>,
    pub aliases: Vec<AliasEntry>,
    pub metadata: Metadata
}
impl MethodMapping {
    pub fn new<O: Into<String>, F: Into<String>>(original_name: O, obfuscated_name: F) -> MethodMapping {
        MethodMapping {
            original_name: original_name.into(),
            obfuscated_name: obfuscated_name.into(),
            parameters: Vec::new(),
            javadoc: None,
            aliases: Vec::new(),
            metadata: Metadata::new()
        }
    }
    /// The `name(type,type)` key that must be unique within a class
    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.original_name,
            self.parameters.iter().map(|param| &param.type_name).join(",")
        )
    }
}
impl Aliasable for MethodMapping {
    #[inline]
    fn aliases(&self) -> &[AliasEntry] {
        &self.aliases
    }
    #[inline]
    fn original_name(&self) -> &str {
        &self.original_name
    }
    #[inline]
    fn default_obfuscated_name(&self) -> &str {
        &self.obfuscated_name
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldMapping {
    pub original_name: String,
    pub obfuscated_name: String,
    pub aliases: Vec<AliasEntry>,
    pub metadata: Metadata
}
impl FieldMapping {
    pub fn new<O: Into<String>, F: Into<String>>(original_name: O, obfuscated_name: F) -> FieldMapping {
        FieldMapping {
            original_name: original_name.into(),
            obfuscated_name: obfuscated_name.into(),
            aliases: Vec::new(),
            metadata: Metadata::new()
        }
    }
}
impl Aliasable for FieldMapping {
    #[inline]
    fn aliases(&self) -> &[AliasEntry] {
        &self.aliases
    }
    #[inline]
    fn original_name(&self) -> &str {
        &self.original_name
    }
    #[inline]
    fn default_obfuscated_name(&self) -> &str {
        &self.obfuscated_name
    }
}

/// Every original name match beats every versioned match,
/// which beats every default obfuscated match.
fn find_member<'a, T: Aliasable>(members: &'a [T], name: &str, version: Option<&str>) -> Option<&'a T> {
    members.iter().find(|member| member.original_name() == name)
        .or_else(|| members.iter().find(|member| member.obfuscated_name_for_version(version) == Some(name)))
        .or_else(|| members.iter().find(|member| member.default_obfuscated_name() == name))
}

/// A parameter type after import resolution
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct ResolvedParameter {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "::std::ops::Not::not")]
    pub varargs: bool
}
impl ResolvedParameter {
    #[inline]
    pub fn new<T: Into<String>>(type_name: T, varargs: bool) -> ResolvedParameter {
        ResolvedParameter { type_name: type_name.into(), varargs }
    }
}
