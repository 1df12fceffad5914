use indexmap::IndexMap;
use log::trace;

use script::{Aliasable, ClassMapping, MappingLookup, MappingTree, MethodMapping};

use crate::{internal_name, original_class_name, obfuscated_class_name, method_descriptor};

/// Translates original JVM names into obfuscated ones through a lookup.
///
/// Classes are addressed by their internal names (`com/example/Foo`).
/// Anything without a mapping is returned unchanged.
pub struct NameRemapper {
    lookup: MappingLookup,
    /// Internal original name to the source and index of the class
    classes: IndexMap<String, (usize, usize)>
}
impl NameRemapper {
    pub fn new(lookup: MappingLookup) -> NameRemapper {
        let mut classes = IndexMap::new();
        for (source, tree) in lookup.index().sources().iter().enumerate() {
            for (index, class) in tree.classes.iter().enumerate() {
                classes.entry(internal_name(&original_class_name(tree, class)))
                    .or_insert((source, index));
            }
        }
        NameRemapper { lookup, classes }
    }
    #[inline]
    pub fn lookup(&self) -> &MappingLookup {
        &self.lookup
    }
    /// Switch the version that subsequent names are resolved against
    #[inline]
    pub fn use_version(&mut self, version: Option<&str>) {
        self.lookup.set_version(version);
    }
    fn class(&self, internal: &str) -> Option<(&MappingTree, &ClassMapping)> {
        let &(source, index) = self.classes.get(internal)?;
        let tree = &*self.lookup.index().sources()[source];
        Some((tree, &tree.classes[index]))
    }
    pub fn map_class(&self, internal: &str) -> String {
        match self.class(internal) {
            Some((tree, class)) => internal_name(&obfuscated_class_name(tree, class, self.lookup.version())),
            None => {
                trace!("No mapping for class {}", internal);
                internal.to_owned()
            }
        }
    }
    pub fn map_field(&self, owner: &str, name: &str) -> String {
        let version = self.lookup.version();
        self.class(owner)
            .and_then(|(_, class)| class.find_field(name, version))
            .map_or_else(|| name.to_owned(), |field| field.resolve_obfuscated_name(version).to_owned())
    }
    /// Map a method name, using the descriptor to tell overloads apart
    pub fn map_method(&self, owner: &str, name: &str, descriptor: &str) -> String {
        let version = self.lookup.version();
        self.class(owner)
            .and_then(|(_, class)| {
                find_overload(class, name, descriptor)
                    .or_else(|| class.find_method(name, version))
            })
            .map_or_else(|| name.to_owned(), |method| method.resolve_obfuscated_name(version).to_owned())
    }
    /// Map every class referenced by a field or method descriptor
    pub fn map_descriptor(&self, descriptor: &str) -> String {
        let mut result = String::with_capacity(descriptor.len());
        let mut remaining = descriptor;
        while let Some(start) = remaining.find('L') {
            result.push_str(&remaining[..=start]);
            let reference = &remaining[(start + 1)..];
            match reference.find(';') {
                Some(end) => {
                    result.push_str(&self.map_class(&reference[..end]));
                    result.push(';');
                    remaining = &reference[(end + 1)..];
                },
                None => {
                    // Malformed, keep the rest as is
                    result.push_str(reference);
                    remaining = "";
                }
            }
        }
        result.push_str(remaining);
        result
    }
}

fn find_overload<'a>(class: &'a ClassMapping, name: &str, descriptor: &str) -> Option<&'a MethodMapping> {
    let parameters = &descriptor[..descriptor.find(')')? + 1];
    class.methods.iter().find(|method| {
        method.original_name == name && method_descriptor(&method.parameters).starts_with(parameters)
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn remapper() -> NameRemapper {
        let first = script::compile(r#"
            pkg com.example;
            class Foo <- a {
                aliases { v1 b; }
                md run() <- c { aliases { v1 d; } }
                md run(int) <- e;
                md run(com.example.Foo) <- f;
                fd value <- g { aliases { v1 h; removed v2; } }
            }
            class Bar <- org.other.i { }
        "#).unwrap();
        let second = script::compile("pkg com.example; class Foo <- z { } class Baz <- y { }").unwrap();
        NameRemapper::new(MappingLookup::from_trees(vec![first, second]))
    }

    #[test]
    fn classes() {
        let mut remapper = remapper();
        assert_eq!(remapper.map_class("com/example/Foo"), "com/example/a");
        assert_eq!(remapper.map_class("com/example/Bar"), "org/other/i");
        assert_eq!(remapper.map_class("com/example/Baz"), "com/example/y");
        assert_eq!(remapper.map_class("com/example/Missing"), "com/example/Missing");
        assert_eq!(remapper.map_class("Foo"), "Foo");
        remapper.use_version(Some("v1"));
        assert_eq!(remapper.lookup().version(), Some("v1"));
        assert_eq!(remapper.map_class("com/example/Foo"), "com/example/b");
    }
    #[test]
    fn fields() {
        let mut remapper = remapper();
        assert_eq!(remapper.map_field("com/example/Foo", "value"), "g");
        assert_eq!(remapper.map_field("com/example/Foo", "other"), "other");
        assert_eq!(remapper.map_field("com/example/Missing", "value"), "value");
        remapper.use_version(Some("v1"));
        assert_eq!(remapper.map_field("com/example/Foo", "value"), "h");
        remapper.use_version(Some("v2"));
        assert_eq!(remapper.map_field("com/example/Foo", "value"), "g");
    }
    #[test]
    fn methods() {
        let mut remapper = remapper();
        assert_eq!(remapper.map_method("com/example/Foo", "run", "()V"), "c");
        assert_eq!(remapper.map_method("com/example/Foo", "run", "(I)V"), "e");
        assert_eq!(remapper.map_method("com/example/Foo", "run", "(Lcom/example/Foo;)V"), "f");
        // Unknown overloads fall back to the first method with that name
        assert_eq!(remapper.map_method("com/example/Foo", "run", "(J)V"), "c");
        assert_eq!(remapper.map_method("com/example/Foo", "stop", "()V"), "stop");
        remapper.use_version(Some("v1"));
        assert_eq!(remapper.map_method("com/example/Foo", "run", "()V"), "d");
    }
    #[test]
    fn descriptors() {
        let remapper = remapper();
        assert_eq!(
            remapper.map_descriptor("(ILcom/example/Foo;[Lcom/example/Bar;Ljava/lang/String;)Lcom/example/Baz;"),
            "(ILcom/example/a;[Lorg/other/i;Ljava/lang/String;)Lcom/example/y;"
        );
        assert_eq!(remapper.map_descriptor("J"), "J");
        assert_eq!(remapper.map_descriptor("Lcom/example/Foo"), "Lcom/example/Foo");
    }
}
