//! Lowers a parsed [MappingFile] into the resolved [MappingTree].
//!
//! Interpretation never fails.
//! Missing obfuscated names fall back to the original name.
use indexmap::IndexMap;

use crate::ast::*;
use crate::tree::{ClassMapping, FieldMapping, MappingTree, MethodMapping, ResolvedParameter};

pub struct Interpreter {
    imports: IndexMap<String, String>
}
impl Interpreter {
    pub fn new(imports: &[ImportDeclaration]) -> Interpreter {
        let mut map = IndexMap::with_capacity(imports.len());
        for import in imports {
            // Later imports replace earlier ones with the same key
            map.insert(import.key().to_owned(), import.path.clone());
        }
        Interpreter { imports: map }
    }
    #[inline]
    pub fn imports(&self) -> &IndexMap<String, String> {
        &self.imports
    }
    /// Resolve a type against the import table, exact matches only
    pub fn resolve_type<'a>(&'a self, name: &'a str) -> &'a str {
        self.imports.get(name).map_or(name, String::as_str)
    }
    pub fn class(&self, declaration: ClassDeclaration) -> ClassMapping {
        let ClassDeclaration {
            name, obfuscated_name, metadata, methods,
            fields, inner_classes, aliases
        } = declaration;
        let fallback_obfuscated_name = obfuscated_name.unwrap_or_else(|| name.clone());
        ClassMapping {
            original_name: name,
            fallback_obfuscated_name,
            metadata,
            methods: methods.into_iter().map(|method| self.method(method)).collect(),
            fields: fields.into_iter().map(|field| self.field(field)).collect(),
            inner_classes: inner_classes.into_iter().map(|class| self.class(class)).collect(),
            aliases
        }
    }
    pub fn method(&self, declaration: MethodDeclaration) -> MethodMapping {
        let MethodDeclaration { name, parameters, obfuscated_name, javadoc, aliases, metadata } = declaration;
        let parameters = parameters.iter()
            .map(|param| ResolvedParameter::new(self.resolve_type(&param.type_name), param.varargs))
            .collect();
        MethodMapping {
            obfuscated_name: obfuscated_name.unwrap_or_else(|| name.clone()),
            original_name: name,
            parameters,
            javadoc,
            aliases,
            metadata
        }
    }
    pub fn field(&self, declaration: FieldDeclaration) -> FieldMapping {
        let FieldDeclaration { name, obfuscated_name, aliases, metadata } = declaration;
        FieldMapping {
            obfuscated_name: obfuscated_name.unwrap_or_else(|| name.clone()),
            original_name: name,
            aliases,
            metadata
        }
    }
}

pub fn interpret(file: MappingFile) -> MappingTree {
    let MappingFile { package, imports, classes } = file;
    let interpreter = Interpreter::new(&imports);
    let classes = classes.into_iter()
        .map(|class| interpreter.class(class))
        .collect();
    MappingTree {
        package_name: package.map(|package| package.name).unwrap_or_default(),
        imports: interpreter.imports,
        classes
    }
}
