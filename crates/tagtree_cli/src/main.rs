//! Command-line collaborator for the tag tree engine.
//!
//! # Responsibility
//! - Load a JSON document, call one engine operation, print JSON results.
//! - Keep all file I/O and user interaction outside `tagtree_core`.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use tagtree_core::{
    color_class_of, core_version, default_log_level, init_logging, parse_tags, ping,
    strength_of, ConfirmationPrompt, Document, DocumentService, FilterMode,
};

fn cli() -> Command {
    let document_arg = || {
        Arg::new("document")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Path to a JSON document")
    };

    Command::new("tagtree")
        .version(core_version())
        .about("Inspect and edit tagged item trees")
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .global(true)
                .help("Absolute directory for rolling log files"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("trace|debug|info|warn|error"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("ping").about("Check core linkage"))
        .subcommand(
            Command::new("tags")
                .about("Parse a tag string")
                .arg(Arg::new("tags").required(true)),
        )
        .subcommand(
            Command::new("strength")
                .about("Resolve a relation label")
                .arg(Arg::new("label").required(true)),
        )
        .subcommand(
            Command::new("filter")
                .about("Filter a document by plain tags")
                .arg(document_arg())
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .action(ArgAction::Append)
                        .help("Active tag; repeat for several"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .default_value("or")
                        .help("and|or"),
                )
                .arg(
                    Arg::new("include-descendants")
                        .long("include-descendants")
                        .action(ArgAction::SetTrue)
                        .help("Keep whole subtrees under matching items"),
                ),
        )
        .subcommand(
            Command::new("incoming")
                .about("List relations pointing at an item")
                .arg(document_arg())
                .arg(Arg::new("title").required(true)),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename an item and rewrite relations to it")
                .arg(document_arg())
                .arg(Arg::new("old").required(true))
                .arg(Arg::new("new").required(true))
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Save the result back to the document file"),
                ),
        )
        .subcommand(
            Command::new("matrix")
                .about("Build the matrix described by a matrix item")
                .arg(document_arg())
                .arg(Arg::new("matrix-item-id").required(true)),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    if let Err(message) = setup_logging(&matches) {
        eprintln!("{message}");
        return ExitCode::FAILURE;
    }
    match run(&matches) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(matches: &ArgMatches) -> Result<(), String> {
    let Some(log_dir) = matches.get_one::<String>("log-dir") else {
        return Ok(());
    };
    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or(default_log_level().as_str());
    init_logging(level, log_dir).map_err(|err| err.to_string())
}

fn run(matches: &ArgMatches) -> Result<String, String> {
    match matches.subcommand() {
        Some(("ping", _)) => Ok(format!("tagtree_core ping={} version={}", ping(), core_version())),
        Some(("tags", args)) => to_json(&parse_tags(required(args, "tags")?)),
        Some(("strength", args)) => {
            let label = required(args, "label")?;
            to_json(&serde_json::json!({
                "strength": strength_of(label),
                "color_class": color_class_of(label),
            }))
        }
        Some(("filter", args)) => {
            let service = load_service(args)?;
            let tags: Vec<String> = args
                .get_many::<String>("tag")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let mode_arg = required(args, "mode")?;
            let mode = FilterMode::parse(mode_arg)
                .ok_or_else(|| format!("unsupported filter mode `{mode_arg}`; expected and|or"))?;
            to_json(&service.filter(&tags, mode, args.get_flag("include-descendants")))
        }
        Some(("incoming", args)) => {
            let service = load_service(args)?;
            let title = required(args, "title")?;
            let id = service
                .id_for_title(title)
                .ok_or_else(|| format!("no item titled `{title}`"))?
                .to_string();
            to_json(&service.incoming_of(&id).map_err(|err| err.to_string())?)
        }
        Some(("rename", args)) => {
            let mut service = load_service(args)?;
            let old = required(args, "old")?;
            let new = required(args, "new")?;
            let id = service
                .id_for_title(old)
                .ok_or_else(|| format!("no item titled `{old}`"))?
                .to_string();
            let outcome = service
                .rename_item(&id, new, &mut |_: &ConfirmationPrompt| true)
                .map_err(|err| err.to_string())?;
            if args.get_flag("write") {
                service
                    .document()
                    .save_to_path(document_path(args)?)
                    .map_err(|err| err.to_string())?;
            }
            to_json(&serde_json::json!({
                "item_id": id,
                "affected_relations": outcome.affected_relations,
                "rewritten_relations": outcome.rewritten_relations,
            }))
        }
        Some(("matrix", args)) => {
            let mut service = load_service(args)?;
            let matrix_item_id = required(args, "matrix-item-id")?;
            let matrix = service
                .build_matrix_from_config(matrix_item_id)
                .map_err(|err| err.to_string())?;
            to_json(matrix)
        }
        _ => Err("unknown command".to_string()),
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument `{name}`"))
}

fn document_path(args: &ArgMatches) -> Result<&PathBuf, String> {
    args.get_one::<PathBuf>("document")
        .ok_or_else(|| "missing argument `document`".to_string())
}

fn load_service(args: &ArgMatches) -> Result<DocumentService, String> {
    let document = Document::load_from_path(document_path(args)?).map_err(|err| err.to_string())?;
    Ok(DocumentService::new(document))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| err.to_string())
}
