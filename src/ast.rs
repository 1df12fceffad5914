//! Syntax tree produced by the parser.
//!
//! The tree is transient: the interpreter consumes it to build a [MappingTree](crate::tree::MappingTree).
pub use crate::tree::{AliasEntry, Metadata};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MappingFile {
    pub package: Option<PackageDeclaration>,
    pub imports: Vec<ImportDeclaration>,
    pub classes: Vec<ClassDeclaration>
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageDeclaration {
    pub name: String
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportDeclaration {
    pub path: String,
    pub alias: Option<String>
}
impl ImportDeclaration {
    /// The name this import is referred to by
    pub fn key(&self) -> &str {
        match self.alias {
            Some(ref alias) => alias.as_str(),
            None => self.path.rsplit('.').next().unwrap_or(self.path.as_str())
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassDeclaration {
    pub name: String,
    pub obfuscated_name: Option<String>,
    pub metadata: Metadata,
    pub methods: Vec<MethodDeclaration>,
    pub fields: Vec<FieldDeclaration>,
    pub inner_classes: Vec<ClassDeclaration>,
    pub aliases: Vec<AliasEntry>
}
impl ClassDeclaration {
    pub fn add_member(&mut self, member: ClassMember) {
        match member {
            ClassMember::Method(method) => self.methods.push(method),
            ClassMember::Field(field) => self.fields.push(field),
            ClassMember::Class(class) => self.inner_classes.push(class),
            ClassMember::Aliases(aliases) => self.aliases.extend(aliases),
        }
    }
}

/// Anything that can appear inside a class body
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClassMember {
    Method(MethodDeclaration),
    Field(FieldDeclaration),
    Class(ClassDeclaration),
    Aliases(Vec<AliasEntry>)
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MethodDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub obfuscated_name: Option<String>,
    pub javadoc: Option<String>,
    pub aliases: Vec<AliasEntry>,
    pub metadata: Metadata
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub obfuscated_name: Option<String>,
    pub aliases: Vec<AliasEntry>,
    pub metadata: Metadata
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub type_name: String,
    pub varargs: bool
}
