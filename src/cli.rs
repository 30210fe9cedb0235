//! Minimal CLI: spec JSON → (java | describe | check)
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::codegen::{Codegen, GenOptions};
use crate::spec::SumTypeSpec;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Java sum types with exhaustive match builders from JSON specs
#[derive(Parser, Debug)]
#[command(name = "sumtype-gen")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate one Java compilation unit per spec
    Java(JavaOut),
    /// print the JSON plan of the generated API
    Describe(DescribeOut),
    /// validate specs the way `java` would, without writing anything
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more spec files. May be literal paths or quoted glob patterns.
    ///
    /// A file holds either a single spec object or an array of specs.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct JavaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output root; files land in `<out>/<package path>/<Name>.java` (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// omit Javadoc
    #[arg(long)]
    no_docs: bool,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

/// A spec together with the file it came from.
struct Loaded {
    source: PathBuf,
    spec: SumTypeSpec,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> anyhow::Result<Vec<Loaded>> {
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut loaded = Vec::new();
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {}", source_path.display()))?;
            let specs = parse_specs(&source).with_context(|| format!("failed to parse {}", source_path.display()))?;
            tracing::debug!(path = %source_path.display(), specs = specs.len(), "loaded");
            loaded.extend(specs.into_iter().map(|spec| Loaded { source: source_path.clone(), spec }));
        }
        Ok(loaded)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Java(target) => {
                let specs = target.input_settings.load()?;
                let options = GenOptions { indent: target.indent, docs: !target.no_docs };

                let results: Vec<(&Loaded, anyhow::Result<String>)> = specs
                    .par_iter()
                    .map(|loaded| {
                        let mut cg = Codegen::new(options.clone());
                        let result = cg
                            .emit(&loaded.spec)
                            .map(|()| cg.into_string())
                            .with_context(|| format!("{} ({})", loaded.spec.name, loaded.source.display()));
                        (loaded, result)
                    })
                    .collect();

                let mut failed = 0;
                for (loaded, result) in &results {
                    let java_src = match result {
                        Ok(x) => x,
                        Err(error) => {
                            failed += 1;
                            eprintln!("{} {error:#}", "✘".red());
                            continue;
                        }
                    };
                    match target.out.as_ref() {
                        Some(root) => {
                            let path = output_path(root, &loaded.spec);
                            write_file(&path, java_src)?;
                            eprintln!("{} {}", "✔".green(), path.display());
                        }
                        None => println!("{java_src}"),
                    }
                }
                summarize(failed, results.len())
            }
            Command::Describe(target) => {
                let specs = target.input_settings.load()?;
                let mut plans = Vec::with_capacity(specs.len());
                for loaded in &specs {
                    let plan = crate::describe::describe(&loaded.spec)
                        .with_context(|| format!("{} ({})", loaded.spec.name, loaded.source.display()))?;
                    plans.push(plan);
                }
                let plan_src = match plans.as_slice() {
                    [plan] => serde_json::to_string_pretty(plan)?,
                    _ => serde_json::to_string_pretty(&plans)?,
                };
                match target.out.as_ref() {
                    Some(out) => write_file(out, &plan_src),
                    None => {
                        println!("{plan_src}");
                        Ok(())
                    }
                }
            }
            Command::Check(target) => {
                let specs = target.input_settings.load()?;
                let mut failed = 0;
                for loaded in &specs {
                    match check_spec(&loaded.spec) {
                        Ok(()) => eprintln!("{} {}", "✔".green(), loaded.spec.name),
                        Err(error) => {
                            failed += 1;
                            eprintln!("{} {} ({}): {error}", "✘".red(), loaded.spec.name, loaded.source.display());
                        }
                    }
                }
                summarize(failed, specs.len())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// One spec object, or an array of them.
fn parse_specs(source: &str) -> anyhow::Result<Vec<SumTypeSpec>> {
    if source.trim_start().starts_with('[') {
        Ok(crate::path_de::from_str_with_path::<Vec<SumTypeSpec>>(source)?)
    } else {
        Ok(vec![crate::path_de::from_str_with_path::<SumTypeSpec>(source)?])
    }
}

/// Everything `java` would reject, without writing anything: the full
/// generation runs and its text is dropped.
fn check_spec(spec: &SumTypeSpec) -> Result<(), crate::error::GenError> {
    crate::codegen::generate(spec).map(drop)
}

/// `<root>/com/acme/Color.java` for `package com.acme`.
fn output_path(root: &Path, spec: &SumTypeSpec) -> PathBuf {
    let mut path = root.to_path_buf();
    if let Some(package) = spec.package.as_deref() {
        path.extend(package.split('.'));
    }
    path.push(format!("{}.java", spec.name));
    path
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn summarize(failed: usize, total: usize) -> anyhow::Result<()> {
    if failed > 0 {
        bail!("{failed} of {total} specs failed");
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
