use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use kagapa_dictionary::{write_ranked_csv, SortDocService};
use kagapa_text::{Document, RankedToken};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(file) = args.first().map(PathBuf::from) else {
        eprintln!("Usage: kagapa-sort-doc <file.txt|file.docx> [out_dir]");
        std::process::exit(1)
    };
    let out_dir = args.get(1).map_or_else(|| PathBuf::from("."), PathBuf::from);

    let report = SortDocService::default().rank_document(&Document::from_path(&file)?);
    fs::create_dir_all(&out_dir)?;
    // file names keep only the first ten characters of the stem
    let stem: String = file.file_stem().map(|s| s.to_string_lossy().chars().take(10).collect()).unwrap_or_default();
    let lowest = out_dir.join(format!("{stem}_lowest.csv"));
    let highest = out_dir.join(format!("{stem}_highest.csv"));
    write_csv(&lowest, &report.lowest)?;
    write_csv(&highest, &report.highest)?;

    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "file": report.file,
        "total_word_count": report.total_word_count,
        "unique_word_count": report.unique_word_count,
        "min_word_length": report.min_word_length,
        "max_word_length": report.max_word_length,
        "lowest_csv": lowest.display().to_string(),
        "highest_csv": highest.display().to_string(),
    }))?);
    Ok(())
}

fn write_csv(path: &Path, rows: &[RankedToken]) -> anyhow::Result<()> {
    write_ranked_csv(BufWriter::new(File::create(path)?), rows)?;
    Ok(())
}
