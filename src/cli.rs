//! Minimal CLI: compile a template → (check | fill) JSON documents
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Namespace, Template, ValidateOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile a JSON template and check or fill JSON/NDJSON documents with it
#[derive(Parser, Debug)]
#[command(name = "json-template", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate documents and report each one
    Check(CheckOut),
    /// validate documents with defaults applied and print the result
    Fill(FillOut),
    /// compile the template and print its tree
    Compile(CompileOut),
}

#[derive(Args, Debug, Clone)]
struct TemplateSettings {
    /// JSON file holding the template definition
    #[arg(long, short)]
    template: PathBuf,

    /// JSON file of named types: {"types": {name: definition}, "aliases": {alias: name}}
    #[arg(long)]
    types: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    template_settings: TemplateSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// fill in defaults before checking (absent optional fields never fail)
    #[arg(long)]
    apply_defaults: bool,

    /// print a JSON report instead of one line per document
    #[arg(long)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct FillOut {
    #[command(flatten)]
    template_settings: TemplateSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    template_settings: TemplateSettings,
}

/// Contents of a `--types` file. Types are defined in file order, then aliases.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TypesFile {
    #[serde(default)]
    types: IndexMap<String, Value>,
    #[serde(default)]
    aliases: IndexMap<String, String>,
}

/// One input document, labelled for reporting.
#[derive(Debug)]
struct Document {
    source: String,
    value: Value,
}

#[derive(Serialize, Debug)]
struct Report<'a> {
    source: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypesFile {
    fn into_namespace(self) -> Result<Namespace> {
        let mut ns = Namespace::new();
        for (name, definition) in &self.types {
            ns.define_type(name, definition)
                .with_context(|| format!("failed to define type '{name}'"))?;
        }
        for (alias, name) in &self.aliases {
            ns.define_alias(alias, name)?;
        }
        Ok(ns)
    }
}

impl TemplateSettings {
    fn load(&self) -> Result<Template> {
        let ns = match self.types.as_ref() {
            Some(path) => read_json::<TypesFile>(path)?
                .into_namespace()
                .with_context(|| format!("invalid types file ({})", path.display()))?,
            None => Namespace::new(),
        };
        let definition = read_json::<Value>(&self.template)?;
        let template = ns
            .parse_template(&definition)
            .with_context(|| format!("invalid template ({})", self.template.display()))?;
        tracing::debug!(path = %self.template.display(), tag = %template.tag(), "compiled template");
        Ok(template)
    }
}

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = if source_path_str == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
                buf
            } else {
                std::fs::read_to_string(&source_path)
                    .with_context(|| format!("failed to read source file ({source_path_str})"))?
            };
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", line_no + 1);
                    documents.push(self.document(label, line)?);
                }
            } else {
                documents.push(self.document(source_path_str, &source)?);
            }
        }
        tracing::debug!(count = documents.len(), "loaded documents");
        Ok(documents)
    }

    fn document(&self, source: String, text: &str) -> Result<Document> {
        let value = crate::path_de::from_str_with_path::<Value>(text)
            .map_err(|e| anyhow!("failed to parse JSON ({source}): {e}"))?;
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {source}"))?,
        };
        Ok(Document { source, value })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Check(target) => {
                let template = target.template_settings.load()?;
                let documents = target.input_settings.load()?;
                let options = ValidateOptions { apply_defaults: target.apply_defaults };

                // templates are read-only, so documents validate in parallel
                let results: Vec<_> = documents
                    .into_par_iter()
                    .map(|doc| {
                        let outcome = template.validate_value(doc.value, options);
                        (doc.source, outcome.err().map(|e| e.to_string()))
                    })
                    .collect();

                let failed = results.iter().filter(|(_, error)| error.is_some()).count();
                if target.json {
                    let reports: Vec<Report<'_>> = results
                        .iter()
                        .map(|(source, error)| Report { source, ok: error.is_none(), error: error.clone() })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                } else {
                    for (source, error) in &results {
                        match error {
                            None => println!("{} {source}", "ok".green()),
                            Some(error) => println!("{} {source}: {error}", "FAIL".red().bold()),
                        }
                    }
                }
                if failed > 0 {
                    bail!("{failed} of {} document(s) failed validation", results.len());
                }
                Ok(())
            }
            Command::Fill(target) => {
                let template = target.template_settings.load()?;
                let ndjson = target.input_settings.ndjson;
                let documents = target.input_settings.load()?;

                let filled = documents
                    .into_par_iter()
                    .map(|doc| {
                        template
                            .validate_value(doc.value, ValidateOptions::apply_defaults())
                            .with_context(|| format!("validation failed ({})", doc.source))
                    })
                    .collect::<Result<Vec<_>>>()?;

                let rendered = if ndjson {
                    let lines = filled
                        .iter()
                        .map(serde_json::to_string)
                        .collect::<Result<Vec<_>, _>>()?;
                    lines.join("\n")
                } else if let [single] = filled.as_slice() {
                    serde_json::to_string_pretty(single)?
                } else {
                    serde_json::to_string_pretty(&filled)?
                };

                match target.out.as_ref() {
                    Some(out) => write_output(out, &rendered)?,
                    None => println!("{rendered}"),
                }
                Ok(())
            }
            Command::Compile(target) => {
                let template = target.template_settings.load()?;
                println!("{template:#?}");
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    crate::path_de::from_slice_with_path(&bytes)
        .map_err(|e| anyhow!("failed to parse JSON ({}): {e}", path.display()))
}

fn write_output(out: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
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
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path ('-' included)
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
