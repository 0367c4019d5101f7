use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use kagapa_bloom::DictionaryExistenceIndex;
use kagapa_core::config::Config;
use kagapa_core::traits::DictionaryStore;
use kagapa_dictionary::{
    write_ranked_csv, BulkUploadService, MainDictionaryService, SortDocService, UserDictionaryService, WordInput,
};
use kagapa_store::MemoryStore;
use kagapa_text::{Document, DocumentFormat};

const USAGE: &str = "Usage: kagapa <command> [args...]
  rank <file|dir> [--out <dir>]
  upload <file|dir> [--added-by <name>]
  main add <words...> [--added-by <name>] | delete <words...> | get <word> | list [limit] [offset] [search] | increment <word>
  user add <words...> [--added-by <name>] | delete <words...> | approve <words...> [--admin <name>] | pending [limit] [offset]
  exists <word>
  bloom-stats";

fn parse_args() -> (String, Vec<String>) {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((cmd, rest)) = args.split_first() else { eprintln!("{USAGE}"); std::process::exit(1) };
    (cmd.clone(), rest.to_vec())
}

/// Remove `--name <value>` from `args`, returning the value.
fn take_flag(args: &mut Vec<String>, name: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == name)?;
    if pos + 1 >= args.len() { eprintln!("Error: {name} requires a value"); std::process::exit(1); }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

fn usize_arg(args: &[String], i: usize, default: usize) -> anyhow::Result<usize> {
    match args.get(i) {
        Some(s) => s.parse().map_err(|_| anyhow::anyhow!("expected a number, got {s:?}")),
        None => Ok(default),
    }
}

fn word_input(mut words: Vec<String>) -> WordInput {
    if words.len() == 1 { WordInput::Single(words.remove(0)) } else { WordInput::Batch(words) }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn DictionaryStore>> {
    let settings = config.store()?;
    let store = match settings.resolved_path(Path::new(".")) {
        Some(path) => {
            info!(path = %path.display(), compact_every = settings.compact_every, "Using dictionary snapshot");
            MemoryStore::open_with(&path, settings.compact_every)?
        }
        None => MemoryStore::in_memory(),
    };
    Ok(Arc::new(store))
}

/// A file as-is, or every supported document under a directory.
fn document_paths(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() { return vec![root.to_path_buf()]; }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| DocumentFormat::from_filename(&e.file_name().to_string_lossy()).is_ok())
        .map(|e| e.into_path())
        .collect()
}

fn write_csv(path: &Path, rows: &[kagapa_text::RankedToken]) -> anyhow::Result<()> {
    write_ranked_csv(BufWriter::new(File::create(path)?), rows)?;
    Ok(())
}

fn rank(mut args: Vec<String>) -> anyhow::Result<()> {
    let out_dir = take_flag(&mut args, "--out").map(PathBuf::from);
    let Some(target) = args.first().map(PathBuf::from) else { anyhow::bail!("rank needs a file or directory") };
    let service = SortDocService::default();
    let mut reports = Vec::new();
    for path in document_paths(&target) {
        let report = service.rank_document(&Document::from_path(&path)?);
        if let Some(dir) = &out_dir {
            fs::create_dir_all(dir)?;
            let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            write_csv(&dir.join(format!("{stem}_lowest.csv")), &report.lowest)?;
            write_csv(&dir.join(format!("{stem}_highest.csv")), &report.highest)?;
        }
        reports.push(report);
    }
    print_json(&reports)
}

fn upload(mut args: Vec<String>, store: Arc<dyn DictionaryStore>) -> anyhow::Result<()> {
    let added_by = take_flag(&mut args, "--added-by");
    let Some(target) = args.first().map(PathBuf::from) else { anyhow::bail!("upload needs a file or directory") };
    let paths = document_paths(&target);
    let service = BulkUploadService::new(store);

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );
    let mut reports = Vec::new();
    for path in &paths {
        pb.set_message(path.display().to_string());
        let doc = Document::from_path(path)?;
        reports.push(service.process_document(&doc, added_by.as_deref())?);
        pb.inc(1);
    }
    pb.finish_and_clear();
    print_json(&reports)
}

fn main_cmd(mut args: Vec<String>, dictionary: &MainDictionaryService) -> anyhow::Result<()> {
    if args.is_empty() { anyhow::bail!("main needs a subcommand\n{USAGE}"); }
    let sub = args.remove(0);
    match sub.as_str() {
        "add" => {
            let added_by = take_flag(&mut args, "--added-by");
            print_json(&dictionary.create(word_input(args), added_by.as_deref())?)
        }
        "delete" => print_json(&dictionary.delete(word_input(args))?),
        "get" => print_json(&dictionary.get_word(args.first().map_or("", String::as_str))?),
        "list" => {
            let (limit, offset) = (usize_arg(&args, 0, 100)?, usize_arg(&args, 1, 0)?);
            print_json(&dictionary.list(limit, offset, args.get(2).map(String::as_str))?)
        }
        "increment" => {
            let word = args.first().map_or("", String::as_str);
            print_json(&serde_json::json!({ "word": word, "incremented": dictionary.increment_frequency(word)? }))
        }
        other => anyhow::bail!("unknown main subcommand {other:?}\n{USAGE}"),
    }
}

fn user_cmd(mut args: Vec<String>, user: &UserDictionaryService) -> anyhow::Result<()> {
    if args.is_empty() { anyhow::bail!("user needs a subcommand\n{USAGE}"); }
    let sub = args.remove(0);
    match sub.as_str() {
        "add" => {
            let added_by = take_flag(&mut args, "--added-by");
            print_json(&user.add(word_input(args), added_by.as_deref())?)
        }
        "delete" => print_json(&user.delete(word_input(args))?),
        "approve" => {
            let admin = take_flag(&mut args, "--admin");
            print_json(&user.approve_and_move_to_main(word_input(args), admin.as_deref())?)
        }
        "pending" => print_json(&user.list_pending(usize_arg(&args, 0, 100)?, usize_arg(&args, 1, 0)?)?),
        other => anyhow::bail!("unknown user subcommand {other:?}\n{USAGE}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let (cmd, args) = parse_args();

    if cmd == "rank" { return rank(args); }

    let store = open_store(&config)?;
    let dictionary = MainDictionaryService::new(Arc::clone(&store), Arc::new(DictionaryExistenceIndex::new()));
    match cmd.as_str() {
        "upload" => upload(args, store),
        "main" => main_cmd(args, &dictionary),
        "user" => user_cmd(args, &UserDictionaryService::new(store)),
        "exists" => {
            let Some(word) = args.first() else { anyhow::bail!("exists needs a word") };
            dictionary.rebuild_index(&config.bloom()?)?;
            print_json(&serde_json::json!({ "word": word, "exists": dictionary.exists_fast(word)? }))
        }
        "bloom-stats" => {
            let report = dictionary.rebuild_index(&config.bloom()?)?;
            print_json(&serde_json::json!({ "rebuild": report, "stats": dictionary.index_stats() }))
        }
        _ => { eprintln!("{USAGE}"); std::process::exit(1) }
    }
}
