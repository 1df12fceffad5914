//! Structural checks over a [MappingTree].
//!
//! Validation only reports problems, it never rejects a tree.
//! Every violation is collected instead of stopping at the first.
use std::fmt::{self, Display, Formatter};

use indexmap::IndexSet;
use serde_derive::Serialize;

use crate::tree::{AliasEntry, ClassMapping, MappingTree};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    DuplicateClass,
    DuplicateObfuscatedClass,
    DuplicateMethodSignature,
    DuplicateObfuscatedMethod,
    DuplicateField,
    DuplicateObfuscatedField,
    DuplicateVersion
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String
}
impl ValidationError {
    #[inline]
    pub fn new(kind: ValidationErrorKind, message: String) -> ValidationError {
        ValidationError { kind, message }
    }
}
impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validate the top-level classes of the tree.
///
/// Inner classes are not checked, use [validate_classes] to check them explicitly.
pub fn validate(tree: &MappingTree) -> Vec<ValidationError> {
    validate_classes(&tree.classes)
}

pub fn validate_classes(classes: &[ClassMapping]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut names = IndexSet::with_capacity(classes.len());
    let mut obfuscated_names = IndexSet::with_capacity(classes.len());
    for class in classes {
        if !names.insert(&*class.original_name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateClass,
                format!("Duplicate class name: {}", class.original_name)
            ));
        }
        if !obfuscated_names.insert(&*class.fallback_obfuscated_name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateObfuscatedClass,
                format!("Duplicate obfuscated class name: {}", class.fallback_obfuscated_name)
            ));
        }
        check_versions(&class.aliases, || format!("class {}", class.original_name), &mut errors);
        check_members(class, &mut errors);
    }
    errors
}

fn check_members(class: &ClassMapping, errors: &mut Vec<ValidationError>) {
    let mut signatures = IndexSet::with_capacity(class.methods.len());
    let mut obfuscated_methods = IndexSet::with_capacity(class.methods.len());
    for method in &class.methods {
        let signature = method.signature();
        if !signatures.insert(signature.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateMethodSignature,
                format!("Duplicate method signature in {}: {}", class.original_name, signature)
            ));
        }
        if !obfuscated_methods.insert(&*method.obfuscated_name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateObfuscatedMethod,
                format!("Duplicate obfuscated method name in {}: {}", class.original_name, method.obfuscated_name)
            ));
        }
        check_versions(
            &method.aliases,
            || format!("method {}.{}", class.original_name, method.original_name),
            errors
        );
    }
    let mut fields = IndexSet::with_capacity(class.fields.len());
    let mut obfuscated_fields = IndexSet::with_capacity(class.fields.len());
    for field in &class.fields {
        if !fields.insert(&*field.original_name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateField,
                format!("Duplicate field name in {}: {}", class.original_name, field.original_name)
            ));
        }
        if !obfuscated_fields.insert(&*field.obfuscated_name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateObfuscatedField,
                format!("Duplicate obfuscated field name in {}: {}", class.original_name, field.obfuscated_name)
            ));
        }
        check_versions(
            &field.aliases,
            || format!("field {}.{}", class.original_name, field.original_name),
            errors
        );
    }
}

/// One error for every alias that repeats an already declared version
fn check_versions<F>(aliases: &[AliasEntry], owner: F, errors: &mut Vec<ValidationError>)
    where F: Fn() -> String {
    let mut versions = IndexSet::with_capacity(aliases.len());
    for alias in aliases {
        if !versions.insert(&*alias.version) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateVersion,
                format!("Duplicate version {} in {}", alias.version, owner())
            ));
        }
    }
}
