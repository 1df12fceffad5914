#[macro_use]
extern crate clap;
extern crate failure;
extern crate failure_derive;
extern crate env_logger;
extern crate log;
#[macro_use]
extern crate serde_json;
extern crate script;
extern crate engine;

use std::path::Path;
use std::io::{self, BufWriter, Write};
use std::fs::{self, File};
use std::process::exit;

use clap::ArgMatches;
use failure::Error;
use failure_derive::Fail;
use log::{debug, info};

use script::{compile, Aliasable, ClassMapping, MappingLookup, MappingTree};
use script::validate::validate;
use engine::EmitFormat;

fn app() -> clap::App<'static, 'static> {
    clap_app!(reguard =>
        (version: crate_version!())
        (author: crate_authors!())
        (about: crate_description!())
        (@setting SubcommandRequiredElseHelp)
        (@subcommand check =>
            (about: "Compile and validate mapping scripts")
            (@arg json: --json "Print the report as JSON")
            (@arg files: +required +multiple "The mapping scripts to check")
        )
        (@subcommand emit =>
            (about: "Emit mapping scripts in another format")
            (@arg format: -f --format +takes_value +required "The output format (proguard or srg)")
            (@arg alias: -a --alias +takes_value "The alias version to emit obfuscated names for")
            (@arg out: -o --out +takes_value "Write to this file instead of stdout")
            (@arg files: +required +multiple "The mapping scripts to emit")
        )
        (@subcommand dump =>
            (about: "Print the compiled mapping tree as JSON")
            (@arg file: +required "The mapping script to dump")
        )
        (@subcommand lookup =>
            (about: "Find the class best matching a name")
            (@arg alias: -a --alias +takes_value "The alias version to resolve names against")
            (@arg name: -n --name +takes_value +required "The class name to search for")
            (@arg member: -m --member +takes_value "A method or field name to find in the class")
            (@arg files: +required +multiple "The mapping scripts to search, highest priority first")
        )
        (@subcommand versions =>
            (about: "List every alias version the mapping scripts declare")
            (@arg files: +required +multiple "The mapping scripts to list")
        )
    )
}

fn main() -> Result<(), Error> {
    ::env_logger::init();
    let matches = app().get_matches();
    match matches.subcommand() {
        ("check", Some(matches)) => check(matches),
        ("emit", Some(matches)) => emit(matches),
        ("dump", Some(matches)) => dump(matches),
        ("lookup", Some(matches)) => lookup(matches),
        ("versions", Some(matches)) => versions(matches),
        _ => {
            // SubcommandRequiredElseHelp already rejected this
            app().print_help()?;
            exit(1);
        }
    }
}

fn check(matches: &ArgMatches) -> Result<(), Error> {
    let json = matches.is_present("json");
    let mut failed = false;
    let mut reports = Vec::new();
    for path in files(matches) {
        let source = read_source(path)?;
        match compile(&source) {
            Ok(tree) => {
                let errors = validate(&tree);
                debug!("Validated {}: {} problems", path, errors.len());
                failed |= !errors.is_empty();
                if json {
                    reports.push(json!({ "file": path, "errors": errors }));
                } else {
                    for error in &errors {
                        println!("{}: {}", path, error);
                    }
                }
            },
            Err(cause) => {
                failed = true;
                if json {
                    reports.push(json!({ "file": path, "error": cause.to_string() }));
                } else {
                    println!("{}: {}", path, cause);
                }
            }
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    if failed {
        exit(1);
    }
    Ok(())
}

fn emit(matches: &ArgMatches) -> Result<(), Error> {
    let format = value_t!(matches, "format", EmitFormat)
        .unwrap_or_else(|e| e.exit());
    let alias = matches.value_of("alias");
    let mut out: Box<dyn Write> = match matches.value_of("out") {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout())
    };
    let trees = files(matches)
        .map(load)
        .collect::<Result<Vec<_>, Error>>()?;
    format.emit_all(&trees, alias, &mut out)?;
    out.flush()?;
    Ok(())
}

fn dump(matches: &ArgMatches) -> Result<(), Error> {
    let path = matches.value_of("file").unwrap();
    let tree = load(path)?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn lookup(matches: &ArgMatches) -> Result<(), Error> {
    let name = matches.value_of("name").unwrap();
    let lookup = load_lookup(matches)?
        .with_version(matches.value_of("alias"));
    let version = lookup.version();
    let class = match lookup.find_best_class_mapping(name) {
        Some(class) => class,
        None => {
            eprintln!("No class matching {:?}", name);
            exit(1);
        }
    };
    println!("{} -> {}", class.original_name, class.resolve_obfuscated_name(version));
    if let Some(member) = matches.value_of("member") {
        let lines = member_lines(class, member, version);
        if lines.is_empty() {
            eprintln!("No member of {} matching {:?}", class.original_name, member);
            exit(1);
        }
        for line in lines {
            println!("    {}", line);
        }
    }
    Ok(())
}

/// Describe the method and field of the matched class named `member`
fn member_lines(class: &ClassMapping, member: &str, version: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(method) = class.find_method(member, version) {
        lines.push(format!("{} -> {}", method.signature(), method.resolve_obfuscated_name(version)));
    }
    if let Some(field) = class.find_field(member, version) {
        lines.push(format!("{} -> {}", field.original_name, field.resolve_obfuscated_name(version)));
    }
    lines
}

fn versions(matches: &ArgMatches) -> Result<(), Error> {
    let lookup = load_lookup(matches)?;
    for version in lookup.all_versions() {
        println!("{}", version);
    }
    Ok(())
}

fn files<'a>(matches: &'a ArgMatches) -> impl Iterator<Item=&'a str> + 'a {
    matches.values_of("files").into_iter().flat_map(|values| values)
}

fn load_lookup(matches: &ArgMatches) -> Result<MappingLookup, Error> {
    let trees = files(matches)
        .map(load)
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(MappingLookup::from_trees(trees))
}

fn read_source(path: &str) -> Result<String, Error> {
    fs::read_to_string(Path::new(path))
        .map_err(|cause| SourceError { path: path.into(), cause: cause.into() }.into())
}

fn load(path: &str) -> Result<MappingTree, Error> {
    let source = read_source(path)?;
    let tree = compile(&source)
        .map_err(|cause| SourceError { path: path.into(), cause: cause.into() })?;
    info!("Compiled {} ({} classes)", path, tree.class_count());
    Ok(tree)
}

#[derive(Debug, Fail)]
#[fail(display = "{}: {}", path, cause)]
pub struct SourceError {
    path: String,
    cause: Error
}
