use std::io::{self, Write};

use script::{Aliasable, MappingTree, ResolvedParameter};

use crate::{MappingEmitter, internal_name, original_class_name, obfuscated_class_name};

/// Emits `CL:`, `FD:` and `MD:` lines with internal names.
#[derive(Copy, Clone, Debug, Default)]
pub struct SrgEmitter;
impl MappingEmitter for SrgEmitter {
    fn emit(&self, tree: &MappingTree, version: Option<&str>, out: &mut dyn Write) -> io::Result<()> {
        for class in &tree.classes {
            let original = internal_name(&original_class_name(tree, class));
            let obfuscated = internal_name(&obfuscated_class_name(tree, class, version));
            writeln!(out, "CL: {} {}", obfuscated, original)?;
            for field in &class.fields {
                writeln!(
                    out, "FD: {}/{} {}/{}",
                    obfuscated, field.resolve_obfuscated_name(version),
                    original, field.original_name
                )?;
            }
            for method in &class.methods {
                let descriptor = method_descriptor(&method.parameters);
                writeln!(
                    out, "MD: {}/{} {} {}/{} {}",
                    obfuscated, method.resolve_obfuscated_name(version), descriptor,
                    original, method.original_name, descriptor
                )?;
            }
        }
        Ok(())
    }
}

/// The JVM descriptor of a method taking these parameters.
///
/// Return types aren't tracked, so they are always `V`.
pub fn method_descriptor(parameters: &[ResolvedParameter]) -> String {
    let mut result = String::from("(");
    for param in parameters {
        result.push_str(&type_descriptor(param));
    }
    result.push_str(")V");
    result
}

pub fn type_descriptor(param: &ResolvedParameter) -> String {
    let base = match &*param.type_name {
        "byte" => "B",
        "char" => "C",
        "double" => "D",
        "float" => "F",
        "int" => "I",
        "long" => "J",
        "short" => "S",
        "boolean" => "Z",
        "void" => "V",
        other => return format!(
            "{}L{};",
            if param.varargs { "[" } else { "" },
            internal_name(other)
        )
    };
    if param.varargs {
        format!("[{}", base)
    } else {
        base.to_owned()
    }
}
