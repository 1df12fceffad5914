//! Version aware name resolution over one or more mapping trees.
//!
//! A [MappingIndex] is built once and never changes afterwards,
//! every query takes the version it resolves against as a parameter.
//! [MappingLookup] pairs a shared index with the active version of one caller,
//! so changing the version of one session never affects another.
//!
//! Sources are ordered by priority: when two sources declare the same name,
//! the merged view answers with the earlier one.
//! The `_with_source` and `find_all_` queries expose which source answered.
//! Only top-level classes are indexed.
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::tree::{AliasEntry, Aliasable, ClassMapping, FieldMapping, MappingTree, MethodMapping};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
struct ClassRef {
    source: usize,
    index: usize
}

/// A class mapping together with the index of the source that declared it
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SourcedClass<'a> {
    pub source: usize,
    pub mapping: &'a ClassMapping
}

#[derive(Clone, Debug, Default)]
pub struct MappingIndex {
    sources: Vec<Arc<MappingTree>>,
    by_original: IndexMap<String, ClassRef>,
    by_obfuscated: IndexMap<String, ClassRef>,
    source_by_original: Vec<IndexMap<String, usize>>,
    source_by_obfuscated: Vec<IndexMap<String, usize>>
}
impl MappingIndex {
    pub fn new(sources: Vec<Arc<MappingTree>>) -> MappingIndex {
        let mut by_original = IndexMap::new();
        let mut by_obfuscated = IndexMap::new();
        let mut source_by_original = Vec::with_capacity(sources.len());
        let mut source_by_obfuscated = Vec::with_capacity(sources.len());
        for (source, tree) in sources.iter().enumerate() {
            let mut originals = IndexMap::with_capacity(tree.classes.len());
            let mut obfuscated = IndexMap::with_capacity(tree.classes.len());
            for (index, class) in tree.classes.iter().enumerate() {
                let class_ref = ClassRef { source, index };
                insert_first(&mut originals, &class.original_name, index);
                insert_first(&mut obfuscated, &class.fallback_obfuscated_name, index);
                if let Some(existing) = insert_first(&mut by_original, &class.original_name, class_ref) {
                    trace!(
                        "Class {} from source {} shadowed by source {}",
                        class.original_name, source, existing.source
                    );
                }
                if let Some(existing) = insert_first(&mut by_obfuscated, &class.fallback_obfuscated_name, class_ref) {
                    trace!(
                        "Obfuscated class {} from source {} shadowed by source {}",
                        class.fallback_obfuscated_name, source, existing.source
                    );
                }
            }
            source_by_original.push(originals);
            source_by_obfuscated.push(obfuscated);
        }
        debug!(
            "Indexed {} classes ({} obfuscated names) from {} sources",
            by_original.len(), by_obfuscated.len(), sources.len()
        );
        MappingIndex { sources, by_original, by_obfuscated, source_by_original, source_by_obfuscated }
    }
    pub fn from_trees<I: IntoIterator<Item=MappingTree>>(trees: I) -> MappingIndex {
        MappingIndex::new(trees.into_iter().map(Arc::new).collect())
    }
    /// Concatenate the sources of every index, keeping their relative priority
    pub fn merge(indexes: &[MappingIndex]) -> MappingIndex {
        MappingIndex::new(indexes.iter()
            .flat_map(|index| index.sources.iter().cloned())
            .collect())
    }
    #[inline]
    pub fn sources(&self) -> &[Arc<MappingTree>] {
        &self.sources
    }
    #[inline]
    fn class(&self, class_ref: ClassRef) -> &ClassMapping {
        &self.sources[class_ref.source].classes[class_ref.index]
    }
    /// Every indexed class in priority order
    pub fn classes<'a>(&'a self) -> impl Iterator<Item=SourcedClass<'a>> + 'a {
        self.sources.iter().enumerate().flat_map(|(source, tree)| {
            tree.classes.iter().map(move |mapping| SourcedClass { source, mapping })
        })
    }
    fn find_by_alias(&self, obfuscated: &str, version: Option<&str>) -> Option<SourcedClass<'_>> {
        version?;
        self.classes().find(|class| class.mapping.obfuscated_name_for_version(version) == Some(obfuscated))
    }
    fn resolve_original(&self, obfuscated: &str, version: Option<&str>) -> Option<SourcedClass<'_>> {
        self.find_by_alias(obfuscated, version).or_else(|| {
            self.by_obfuscated.get(obfuscated)
                .map(|&class_ref| self.sourced(class_ref))
        })
    }
    #[inline]
    fn sourced(&self, class_ref: ClassRef) -> SourcedClass<'_> {
        SourcedClass { source: class_ref.source, mapping: self.class(class_ref) }
    }
    /// Find the original name of the class obfuscated as `obfuscated`.
    ///
    /// With a version, a class whose alias for that version matches wins over
    /// a class whose default obfuscated name matches, even when the latter
    /// comes from an earlier source.
    pub fn find_original_class_name(&self, obfuscated: &str, version: Option<&str>) -> Option<&str> {
        self.find_original_class_name_with_source(obfuscated, version).map(|(name, _)| name)
    }
    pub fn find_original_class_name_with_source(
        &self, obfuscated: &str, version: Option<&str>
    ) -> Option<(&str, usize)> {
        self.resolve_original(obfuscated, version)
            .map(|class| (&*class.mapping.original_name, class.source))
    }
    pub fn find_obfuscated_class_name(&self, original: &str, version: Option<&str>) -> Option<&str> {
        self.find_obfuscated_class_name_with_source(original, version).map(|(name, _)| name)
    }
    pub fn find_obfuscated_class_name_with_source(
        &self, original: &str, version: Option<&str>
    ) -> Option<(&str, usize)> {
        self.by_original.get(original).map(|&class_ref| {
            (self.class(class_ref).resolve_obfuscated_name(version), class_ref.source)
        })
    }
    /// The original name of the class in every source that maps `obfuscated`
    pub fn find_all_original_class_names(&self, obfuscated: &str, version: Option<&str>) -> Vec<(&str, usize)> {
        (0..self.sources.len()).filter_map(|source| {
            let classes = &self.sources[source].classes;
            let by_alias = version.and_then(|_| {
                classes.iter().find(|class| class.obfuscated_name_for_version(version) == Some(obfuscated))
            });
            by_alias.or_else(|| {
                self.source_by_obfuscated[source].get(obfuscated).map(|&index| &classes[index])
            }).map(|class| (&*class.original_name, source))
        }).collect()
    }
    /// The obfuscated name of `original` in every source that declares it
    pub fn find_all_obfuscated_class_names(&self, original: &str, version: Option<&str>) -> Vec<(&str, usize)> {
        (0..self.sources.len()).filter_map(|source| {
            self.source_by_original[source].get(original).map(|&index| {
                let class = &self.sources[source].classes[index];
                (class.resolve_obfuscated_name(version), source)
            })
        }).collect()
    }
    /// One match per source, by original, default obfuscated or versioned name
    pub fn find_all_class_mappings(&self, name: &str, version: Option<&str>) -> Vec<SourcedClass<'_>> {
        self.sources.iter().enumerate().filter_map(|(source, tree)| {
            self.source_by_original[source].get(name)
                .or_else(|| self.source_by_obfuscated[source].get(name))
                .map(|&index| &tree.classes[index])
                .or_else(|| {
                    tree.classes.iter()
                        .find(|class| class.obfuscated_name_for_version(version) == Some(name))
                })
                .map(|mapping| SourcedClass { source, mapping })
        }).collect()
    }
    /// Resolve a class by original name, then default obfuscated name, then versioned name
    pub fn find_class_mapping(&self, name: &str, version: Option<&str>) -> Option<&ClassMapping> {
        self.by_original.get(name)
            .or_else(|| self.by_obfuscated.get(name))
            .map(|&class_ref| self.class(class_ref))
            .or_else(|| self.find_by_alias(name, version).map(|class| class.mapping))
    }
    pub fn find_method_mapping(&self, class: &str, method: &str, version: Option<&str>) -> Option<&MethodMapping> {
        self.find_class_mapping(class, version)?.find_method(method, version)
    }
    pub fn find_field_mapping(&self, class: &str, field: &str, version: Option<&str>) -> Option<&FieldMapping> {
        self.find_class_mapping(class, version)?.find_field(field, version)
    }
    /// Find the class that best matches `name`.
    ///
    /// Tiers, first hit wins:
    /// 1. the original name or the alias for `version` equals `name` (source order)
    /// 2. the merged original or default obfuscated name equals `name`
    /// 3. a case-insensitive substring of the original name,
    ///    the default obfuscated name or any live alias
    ///
    /// When several classes partially match, the first in source order is returned.
    pub fn find_best_class_mapping(&self, name: &str, version: Option<&str>) -> Option<&ClassMapping> {
        if version.is_some() {
            let exact = self.classes().find(|class| {
                class.mapping.original_name == name ||
                    class.mapping.obfuscated_name_for_version(version) == Some(name)
            });
            if let Some(class) = exact {
                return Some(class.mapping)
            }
        }
        if let Some(&class_ref) = self.by_original.get(name).or_else(|| self.by_obfuscated.get(name)) {
            return Some(self.class(class_ref))
        }
        let needle = name.to_lowercase();
        let matches = |candidate: &str| candidate.to_lowercase().contains(&needle);
        self.classes().map(|class| class.mapping).find(|class| {
            matches(&class.original_name) || matches(&class.fallback_obfuscated_name) ||
                class.live_aliases().any(|alias| matches(&alias.obfuscated_name))
        })
    }
    /// Every live alias declared for `version`, by classes and their members
    pub fn find_by_version(&self, version: &str) -> Vec<&AliasEntry> {
        self.aliases()
            .filter(|alias| alias.version == version)
            .collect()
    }
    /// Every version with at least one live alias, in first-seen order
    pub fn all_versions(&self) -> IndexSet<&str> {
        self.aliases().map(|alias| &*alias.version).collect()
    }
    fn aliases<'a>(&'a self) -> impl Iterator<Item=&'a AliasEntry> + 'a {
        self.classes().flat_map(|class| {
            let mapping = class.mapping;
            mapping.live_aliases()
                .chain(mapping.methods.iter().flat_map(|method| method.live_aliases()))
                .chain(mapping.fields.iter().flat_map(|field| field.live_aliases()))
        })
    }
}

/// Insert unless already present, returning the value that was kept instead
fn insert_first<V: Copy>(map: &mut IndexMap<String, V>, key: &str, value: V) -> Option<V> {
    if let Some(&existing) = map.get(key) {
        return Some(existing)
    }
    map.insert(key.to_owned(), value);
    None
}

/// A lookup session: a shared index plus the version this caller resolves against.
///
/// Cloning is cheap and the clone's version is independent.
#[derive(Clone, Debug, Default)]
pub struct MappingLookup {
    index: Arc<MappingIndex>,
    version: Option<String>
}
impl MappingLookup {
    #[inline]
    pub fn new(index: MappingIndex) -> MappingLookup {
        MappingLookup::shared(Arc::new(index))
    }
    #[inline]
    pub fn shared(index: Arc<MappingIndex>) -> MappingLookup {
        MappingLookup { index, version: None }
    }
    pub fn from_trees<I: IntoIterator<Item=MappingTree>>(trees: I) -> MappingLookup {
        MappingLookup::new(MappingIndex::from_trees(trees))
    }
    /// Merge the sources of every lookup, the result has no active version
    pub fn merge(lookups: &[MappingLookup]) -> MappingLookup {
        MappingLookup::new(MappingIndex::new(lookups.iter()
            .flat_map(|lookup| lookup.index.sources.iter().cloned())
            .collect()))
    }
    #[inline]
    pub fn index(&self) -> &MappingIndex {
        &self.index
    }
    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.version.as_ref().map(String::as_str)
    }
    #[inline]
    pub fn set_version(&mut self, version: Option<&str>) {
        self.version = version.map(String::from);
    }
    pub fn with_version(&self, version: Option<&str>) -> MappingLookup {
        MappingLookup { index: Arc::clone(&self.index), version: version.map(String::from) }
    }
    #[inline]
    pub fn find_original_class_name(&self, obfuscated: &str) -> Option<&str> {
        self.index.find_original_class_name(obfuscated, self.version())
    }
    #[inline]
    pub fn find_original_class_name_with_source(&self, obfuscated: &str) -> Option<(&str, usize)> {
        self.index.find_original_class_name_with_source(obfuscated, self.version())
    }
    #[inline]
    pub fn find_obfuscated_class_name(&self, original: &str) -> Option<&str> {
        self.index.find_obfuscated_class_name(original, self.version())
    }
    #[inline]
    pub fn find_obfuscated_class_name_with_source(&self, original: &str) -> Option<(&str, usize)> {
        self.index.find_obfuscated_class_name_with_source(original, self.version())
    }
    #[inline]
    pub fn find_all_original_class_names(&self, obfuscated: &str) -> Vec<(&str, usize)> {
        self.index.find_all_original_class_names(obfuscated, self.version())
    }
    #[inline]
    pub fn find_all_obfuscated_class_names(&self, original: &str) -> Vec<(&str, usize)> {
        self.index.find_all_obfuscated_class_names(original, self.version())
    }
    #[inline]
    pub fn find_all_class_mappings(&self, name: &str) -> Vec<SourcedClass<'_>> {
        self.index.find_all_class_mappings(name, self.version())
    }
    #[inline]
    pub fn find_class_mapping(&self, name: &str) -> Option<&ClassMapping> {
        self.index.find_class_mapping(name, self.version())
    }
    #[inline]
    pub fn find_method_mapping(&self, class: &str, method: &str) -> Option<&MethodMapping> {
        self.index.find_method_mapping(class, method, self.version())
    }
    #[inline]
    pub fn find_field_mapping(&self, class: &str, field: &str) -> Option<&FieldMapping> {
        self.index.find_field_mapping(class, field, self.version())
    }
    #[inline]
    pub fn find_best_class_mapping(&self, name: &str) -> Option<&ClassMapping> {
        self.index.find_best_class_mapping(name, self.version())
    }
    #[inline]
    pub fn find_by_version(&self, version: &str) -> Vec<&AliasEntry> {
        self.index.find_by_version(version)
    }
    #[inline]
    pub fn all_versions(&self) -> IndexSet<&str> {
        self.index.all_versions()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile;

    const FIRST: &str = r#"
        pkg com.example;
        class Foo <- a {
            aliases { v1 a1; removed v2; }
            md run(int) <- b { aliases { v1 b1; } }
            md stop <- c;
            fd count <- d { aliases { v1 d1; removed v3; } }
        }
        class Bar <- e {
            aliases { v0 e0; }
            class Inner <- i { }
        }
    "#;
    const SECOND: &str = r#"
        class Foo <- z { }
        class Qux <- a2 { aliases { v1 q1; } }
    "#;

    fn index() -> MappingIndex {
        MappingIndex::from_trees(vec![compile(FIRST).unwrap(), compile(SECOND).unwrap()])
    }

    #[test]
    fn obfuscated_class_names() {
        let index = index();
        assert_eq!(index.find_obfuscated_class_name("Foo", None), Some("a"));
        assert_eq!(index.find_obfuscated_class_name("Foo", Some("v1")), Some("a1"));
        // Removed in v2, so the default applies
        assert_eq!(index.find_obfuscated_class_name("Foo", Some("v2")), Some("a"));
        assert_eq!(index.find_obfuscated_class_name("Qux", None), Some("a2"));
        assert_eq!(index.find_obfuscated_class_name("Missing", None), None);
        assert_eq!(index.find_obfuscated_class_name_with_source("Qux", Some("v1")), Some(("q1", 1)));
        assert_eq!(
            index.find_all_obfuscated_class_names("Foo", Some("v1")),
            vec![("a1", 0), ("z", 1)]
        );
    }
    #[test]
    fn original_class_names() {
        let index = index();
        assert_eq!(index.find_original_class_name("a", None), Some("Foo"));
        assert_eq!(index.find_original_class_name("a1", Some("v1")), Some("Foo"));
        assert_eq!(index.find_original_class_name("a1", None), None);
        assert_eq!(index.find_original_class_name("q1", Some("v1")), Some("Qux"));
        assert_eq!(index.find_original_class_name_with_source("z", None), Some(("Foo", 1)));
        assert_eq!(index.find_original_class_name_with_source("e", Some("v1")), Some(("Bar", 0)));
        assert_eq!(index.find_all_original_class_names("a", None), vec![("Foo", 0)]);
        assert_eq!(index.find_all_original_class_names("q1", Some("v1")), vec![("Qux", 1)]);
    }
    #[test]
    fn class_mappings_across_sources() {
        let index = index();
        let all = index.find_all_class_mappings("Foo", None);
        assert_eq!(all.len(), 2);
        assert_eq!((all[0].source, &*all[0].mapping.fallback_obfuscated_name), (0, "a"));
        assert_eq!((all[1].source, &*all[1].mapping.fallback_obfuscated_name), (1, "z"));
        let all = index.find_all_class_mappings("e0", Some("v0"));
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].mapping.original_name, "Bar");
        assert!(index.find_all_class_mappings("e0", None).is_empty());
    }
    #[test]
    fn class_mapping_by_any_name() {
        let index = index();
        assert_eq!(index.find_class_mapping("Foo", None).map(|class| &*class.fallback_obfuscated_name), Some("a"));
        assert_eq!(index.find_class_mapping("e", None).map(|class| &*class.original_name), Some("Bar"));
        assert_eq!(index.find_class_mapping("a1", Some("v1")).map(|class| &*class.original_name), Some("Foo"));
        assert_eq!(index.find_class_mapping("a1", None), None);
        // Inner classes are not indexed
        assert_eq!(index.find_class_mapping("Inner", None), None);
    }
    #[test]
    fn member_mappings() {
        let index = index();
        let name = |method: Option<&MethodMapping>| method.map(|method| method.original_name.clone());
        assert_eq!(name(index.find_method_mapping("Foo", "run", None)), Some("run".into()));
        assert_eq!(name(index.find_method_mapping("Foo", "b1", Some("v1"))), Some("run".into()));
        assert_eq!(name(index.find_method_mapping("Foo", "b1", None)), None);
        assert_eq!(name(index.find_method_mapping("a", "c", None)), Some("stop".into()));
        assert_eq!(name(index.find_method_mapping("a1", "b", Some("v1"))), Some("run".into()));
        assert_eq!(name(index.find_method_mapping("Missing", "run", None)), None);
        let field = index.find_field_mapping("Foo", "d1", Some("v1"));
        assert_eq!(field.map(|field| &*field.original_name), Some("count"));
        // Removed in v3, only the default name matches
        let field = index.find_field_mapping("Foo", "d", Some("v3"));
        assert_eq!(field.map(|field| &*field.original_name), Some("count"));
        assert_eq!(index.find_field_mapping("Foo", "d1", Some("v3")), None);
    }
    #[test]
    fn member_tiers_span_the_whole_class() {
        let tree = compile("class A { md x <- y; md y <- z; fd f <- g { aliases { v1 h; } } fd h <- i; }").unwrap();
        let index = MappingIndex::from_trees(vec![tree]);
        let method = index.find_method_mapping("A", "y", None);
        assert_eq!(method.map(|method| &*method.obfuscated_name), Some("z"));
        let field = index.find_field_mapping("A", "h", Some("v1"));
        assert_eq!(field.map(|field| &*field.original_name), Some("h"));
        let field = index.find_field_mapping("A", "g", Some("v1"));
        assert_eq!(field.map(|field| &*field.original_name), Some("f"));
    }
    #[test]
    fn versioned_match_beats_exact_fallback() {
        let tree = compile("class Foo <- x { aliases { v1 bar; } } class Baz <- bar { }").unwrap();
        let index = MappingIndex::from_trees(vec![tree]);
        let best = index.find_best_class_mapping("bar", Some("v1"));
        assert_eq!(best.map(|class| &*class.original_name), Some("Foo"));
        let best = index.find_best_class_mapping("bar", None);
        assert_eq!(best.map(|class| &*class.original_name), Some("Baz"));
    }
    #[test]
    fn versioned_alias_beats_default_obfuscated_name() {
        let first = compile("class Bar <- b { }").unwrap();
        let second = compile("class Foo <- x { aliases { v1 b; } }").unwrap();
        let index = MappingIndex::from_trees(vec![first, second]);
        assert_eq!(index.find_original_class_name_with_source("b", Some("v1")), Some(("Foo", 1)));
        assert_eq!(index.find_original_class_name_with_source("b", Some("v2")), Some(("Bar", 0)));
        assert_eq!(index.find_original_class_name("b", None), Some("Bar"));
    }
    #[test]
    fn best_match_falls_back_to_substrings() {
        let index = index();
        let best = index.find_best_class_mapping("OO", None);
        assert_eq!(best.map(|class| &*class.fallback_obfuscated_name), Some("a"));
        let best = index.find_best_class_mapping("Q1", None);
        assert_eq!(best.map(|class| &*class.original_name), Some("Qux"));
        let best = index.find_best_class_mapping("z", None);
        assert_eq!(best.map(|class| &*class.original_name), Some("Foo"));
        assert_eq!(index.find_best_class_mapping("nothing", None), None);
    }
    #[test]
    fn versions() {
        let index = index();
        let names: Vec<&str> = index.find_by_version("v1").iter()
            .map(|alias| &*alias.obfuscated_name)
            .collect();
        assert_eq!(names, vec!["a1", "b1", "d1", "q1"]);
        assert!(index.find_by_version("v2").is_empty());
        assert_eq!(index.all_versions().into_iter().collect::<Vec<_>>(), vec!["v1", "v0"]);
    }
    #[test]
    fn merge_keeps_priority() {
        let first = MappingIndex::from_trees(vec![compile(FIRST).unwrap()]);
        let second = MappingIndex::from_trees(vec![compile(SECOND).unwrap()]);
        let merged = MappingIndex::merge(&[second, first]);
        assert_eq!(merged.sources().len(), 2);
        assert_eq!(merged.find_obfuscated_class_name_with_source("Foo", None), Some(("z", 0)));
        assert_eq!(merged.find_obfuscated_class_name_with_source("Bar", None), Some(("e", 1)));
    }
    #[test]
    fn sessions_are_independent() {
        let mut lookup = MappingLookup::new(index());
        assert_eq!(lookup.version(), None);
        let versioned = lookup.with_version(Some("v1"));
        assert_eq!(versioned.find_obfuscated_class_name("Foo"), Some("a1"));
        assert_eq!(lookup.find_obfuscated_class_name("Foo"), Some("a"));
        lookup.set_version(Some("v1"));
        assert_eq!(lookup.find_method_mapping("Foo", "b1").map(|method| &*method.original_name), Some("run"));
        lookup.set_version(None);
        assert_eq!(lookup.find_method_mapping("Foo", "b1"), None);
        let merged = MappingLookup::merge(&[versioned.clone(), versioned]);
        assert_eq!(merged.version(), None);
        assert_eq!(merged.index().sources().len(), 4);
        assert_eq!(merged.find_all_obfuscated_class_names("Foo").len(), 4);
    }
    #[test]
    fn empty_lookup_never_fails() {
        let lookup = MappingLookup::default().with_version(Some("v1"));
        assert_eq!(lookup.find_class_mapping("A"), None);
        assert_eq!(lookup.find_best_class_mapping("A"), None);
        assert!(lookup.find_all_class_mappings("A").is_empty());
        assert!(lookup.all_versions().is_empty());
    }
}
