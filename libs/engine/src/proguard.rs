use std::io::{self, Write};

use itertools::Itertools;

use script::{Aliasable, MappingTree, ResolvedParameter};

use crate::{MappingEmitter, original_class_name, obfuscated_class_name};

/// Emits `original -> obfuscated:` blocks.
///
/// Fields come before methods, and a blank line separates consecutive classes.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProguardEmitter;
impl MappingEmitter for ProguardEmitter {
    fn emit(&self, tree: &MappingTree, version: Option<&str>, out: &mut dyn Write) -> io::Result<()> {
        for (index, class) in tree.classes.iter().enumerate() {
            if index > 0 {
                writeln!(out)?;
            }
            writeln!(
                out, "{} -> {}:",
                original_class_name(tree, class),
                obfuscated_class_name(tree, class, version)
            )?;
            for field in &class.fields {
                writeln!(out, "    {} -> {}", field.original_name, field.resolve_obfuscated_name(version))?;
            }
            for method in &class.methods {
                writeln!(
                    out, "    {}({}) -> {}",
                    method.original_name,
                    method.parameters.iter().map(parameter_type).join(","),
                    method.resolve_obfuscated_name(version)
                )?;
            }
        }
        Ok(())
    }
}

fn parameter_type(param: &ResolvedParameter) -> String {
    if param.varargs {
        format!("{}...", param.type_name)
    } else {
        param.type_name.clone()
    }
}
