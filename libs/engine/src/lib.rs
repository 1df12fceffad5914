//! Consumers of compiled mapping trees.
//!
//! Two text formats are supported, selected by [EmitFormat]:
//! - `proguard` - `original -> obfuscated:` blocks with indented member lines
//! - `srg` - `CL:`/`FD:`/`MD:` lines using slash separated JVM names and descriptors
//!
//! Both emit the obfuscated names of an optional version,
//! falling back to the default obfuscated name when that version has no alias.
//! [NameRemapper] translates JVM internal names and descriptors through a lookup instead.
extern crate script;
extern crate failure;
extern crate failure_derive;
extern crate itertools;
extern crate indexmap;
extern crate log;
extern crate serde;

use std::io::{self, Write};

use script::{Aliasable, ClassMapping, MappingTree};

mod format;
mod proguard;
mod srg;
mod remap;

pub use self::format::{EmitFormat, InvalidFormat};
pub use self::proguard::ProguardEmitter;
pub use self::srg::{SrgEmitter, method_descriptor, type_descriptor};
pub use self::remap::NameRemapper;

/// Writes a mapping tree in some text format
pub trait MappingEmitter {
    fn emit(&self, tree: &MappingTree, version: Option<&str>, out: &mut dyn Write) -> io::Result<()>;
}

/// The package qualified original name of a top-level class
pub fn original_class_name(tree: &MappingTree, class: &ClassMapping) -> String {
    qualify(&tree.package_name, &class.original_name)
}

/// The obfuscated name of a top-level class for the given version.
///
/// Unqualified names are placed in the package of the tree.
pub fn obfuscated_class_name(tree: &MappingTree, class: &ClassMapping, version: Option<&str>) -> String {
    let name = class.resolve_obfuscated_name(version);
    if name.contains('.') {
        name.to_owned()
    } else {
        qualify(&tree.package_name, name)
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", package, name)
    }
}

/// Convert a dotted class name into its internal form
#[inline]
pub fn internal_name(name: &str) -> String {
    name.replace('.', "/")
}

#[cfg(test)]
mod test {
    use super::*;
    use script::AliasEntry;

    #[test]
    fn class_names() {
        let mut tree = MappingTree::default();
        let mut class = ClassMapping::new("MyClass", "a");
        class.aliases.push(AliasEntry::new("v1", "org.other.b"));
        assert_eq!(original_class_name(&tree, &class), "MyClass");
        assert_eq!(obfuscated_class_name(&tree, &class, None), "a");
        tree.package_name = "com.example".into();
        assert_eq!(original_class_name(&tree, &class), "com.example.MyClass");
        assert_eq!(obfuscated_class_name(&tree, &class, None), "com.example.a");
        assert_eq!(obfuscated_class_name(&tree, &class, Some("v1")), "org.other.b");
        assert_eq!(internal_name("org.other.b"), "org/other/b");
    }
}
