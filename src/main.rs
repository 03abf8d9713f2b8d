//! unctb - a tool for extracting and decoding Star Resonance game data
//!
//! Usage:
//!   unctb info <meta.pkg>               - Show container index information
//!   unctb list <meta.pkg>               - List indexed entries
//!   unctb extract <meta.pkg> -o <dir>   - Extract and classify all blobs
//!   unctb locale-info <meta.pkg>        - Show localization table statistics
//!   unctb decode ...                    - Decode one dumped table to JSON
//!   unctb decode-dir ...                - Decode every dumped table in a directory

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use unctb::locale::LocalizationOverlay;
use unctb::pkg::{classify, BlobKind, PkgIndex};
use unctb::table::{PoolSet, TableDecoder, TableSchema};
use unctb::utils::{collect_files_with_ext, create_name_matcher, format_size, matches_filter};

#[derive(Parser)]
#[command(name = "unctb")]
#[command(version = "0.1.0")]
#[command(about = "Extract and decode Star Resonance .pkg containers and .ctb tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show container index information
    Info {
        /// Path to the meta.pkg index
        meta: PathBuf,
    },
    /// List indexed entries
    List {
        /// Path to the meta.pkg index
        meta: PathBuf,
    },
    /// Extract all blobs, classified by content magic
    Extract {
        /// Path to the meta.pkg index
        meta: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Also extract Unity asset bundles (default: skip)
        #[arg(short, long)]
        asset_bundles: bool,
    },
    /// Show localization table statistics for a language
    LocaleInfo {
        /// Path to the meta.pkg index
        meta: PathBuf,
        /// Language table to load (e.g. english, chinese)
        #[arg(short, long, default_value = "english")]
        language: String,
    },
    /// Decode one dumped table to JSON
    Decode {
        /// Row data blob
        #[arg(long)]
        rows: PathBuf,
        /// Schema sidecar JSON file
        #[arg(long)]
        schema: PathBuf,
        /// Directory holding the table's pool files
        #[arg(long)]
        pools: PathBuf,
        /// Localization blob for MLString kinds
        #[arg(long)]
        locale: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode every dumped table under a data directory
    DecodeDir {
        /// Directory of schema sidecar JSON files
        #[arg(long)]
        schemas: PathBuf,
        /// Directory of per-table dumps (one subdirectory per table)
        #[arg(long)]
        data: PathBuf,
        /// Output directory for JSON files
        #[arg(short, long, default_value = "Excels")]
        output: PathBuf,
        /// Only decode tables whose name matches this pattern
        #[arg(short, long)]
        filter: Option<String>,
        /// Localization blob for MLString kinds
        #[arg(long)]
        locale: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { meta } => show_info(&meta),
        Commands::List { meta } => list_entries(&meta),
        Commands::Extract {
            meta,
            output,
            asset_bundles,
        } => extract_all(&meta, &output, asset_bundles),
        Commands::LocaleInfo { meta, language } => show_locale_info(&meta, &language),
        Commands::Decode {
            rows,
            schema,
            pools,
            locale,
            output,
        } => decode_table(&rows, &schema, &pools, locale.as_deref(), output.as_deref()),
        Commands::DecodeDir {
            schemas,
            data,
            output,
            filter,
            locale,
        } => decode_dir(&schemas, &data, &output, filter.as_deref(), locale.as_deref()),
    }
}

fn open_pkg(meta: &Path) -> Result<PkgIndex> {
    PkgIndex::open(meta).with_context(|| format!("Failed to open {}", meta.display()))
}

fn show_info(meta: &Path) -> Result<()> {
    let pkg = open_pkg(meta)?;

    let mut per_container: BTreeMap<u16, (usize, u64)> = BTreeMap::new();
    for (_, entry) in pkg.entries() {
        let slot = per_container.entry(entry.container).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += entry.length as u64;
    }
    let total: u64 = per_container.values().map(|&(_, bytes)| bytes).sum();

    println!("PKG Index Info:");
    println!("  Entries: {}", pkg.len());
    println!("  Total size: {}", format_size(total));
    println!("  Containers:");
    for (container, (count, bytes)) in per_container {
        println!(
            "    m{}.pkg: {} entries, {}",
            container,
            count,
            format_size(bytes)
        );
    }
    Ok(())
}

fn list_entries(meta: &Path) -> Result<()> {
    let pkg = open_pkg(meta)?;

    let mut entries: Vec<_> = pkg.entries().collect();
    entries.sort_by_key(|&(key, _)| key);

    println!("{:>10}  {:>4}  {:>9}  {:>10}  {:>10}", "key", "type", "container", "offset", "size");
    for (key, entry) in entries {
        println!(
            "{:>10}  {:>4}  {:>9}  {:>10}  {:>10}",
            key,
            entry.kind,
            entry.container,
            entry.offset,
            format_size(entry.length as u64)
        );
    }
    Ok(())
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn extract_all(meta: &Path, output: &Path, asset_bundles: bool) -> Result<()> {
    let pkg = open_pkg(meta)?;

    let bundles_dir = output.join("bundles");
    let luas_dir = output.join("luas");
    let raw_dir = output.join("raw");
    fs::create_dir_all(&bundles_dir)?;
    fs::create_dir_all(&luas_dir)?;
    fs::create_dir_all(&raw_dir)?;

    println!("Extracting {} entries to {}...", pkg.len(), output.display());
    let pb = progress_bar(pkg.len() as u64);

    let mut written = 0u64;
    let mut skipped = 0u64;

    for (key, entry) in pkg.entries() {
        pb.inc(1);

        let data = match pkg.read_entry(entry) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Warning: Failed to read entry {}: {}", key, e);
                continue;
            }
        };

        let out_path = match classify(&data) {
            BlobKind::AssetBundle => {
                if !asset_bundles {
                    skipped += 1;
                    continue;
                }
                bundles_dir.join(format!("{}.ab", key))
            }
            BlobKind::Lua => luas_dir.join(format!("{}.luac", key)),
            BlobKind::Other => raw_dir.join(format!("{}.bin", key)),
        };

        if out_path.exists() {
            skipped += 1;
            continue;
        }

        fs::write(&out_path, &data)?;
        written += 1;
    }

    pb.finish_with_message("Done");
    println!("\nExtracted {} entries ({} skipped)", written, skipped);
    Ok(())
}

fn show_locale_info(meta: &Path, language: &str) -> Result<()> {
    let pkg = open_pkg(meta)?;

    let name = format!("{}.bytes", language);
    let data = pkg
        .read_by_name(&name)
        .with_context(|| format!("Failed to read localization blob {}", name))?;
    let overlay = LocalizationOverlay::parse(&data)
        .with_context(|| format!("Failed to parse localization blob {}", name))?;

    println!("Localization Info ({}):", language);
    println!("  Hash entries: {}", overlay.entry_count());
    println!("  Strings: {}", overlay.string_count());
    println!("  Flow conflicts: {}", overlay.flow_conflicts().len());
    println!("  Manual conflicts: {}", overlay.manual_conflicts().len());
    Ok(())
}

fn load_overlay(locale: Option<&Path>) -> Result<LocalizationOverlay> {
    match locale {
        Some(path) => {
            let data =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            LocalizationOverlay::parse(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
        None => Ok(LocalizationOverlay::empty()),
    }
}

fn decode_table(
    rows: &Path,
    schema: &Path,
    pools: &Path,
    locale: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let schema = TableSchema::load(schema)
        .with_context(|| format!("Failed to load schema {}", schema.display()))?;
    let pools = PoolSet::load_dir(pools)?;
    let overlay = load_overlay(locale)?;
    let data = fs::read(rows).with_context(|| format!("Failed to read {}", rows.display()))?;

    let decoder = TableDecoder::new(&schema, &pools, &overlay)?;
    let decoded = decoder.decode(&data)?;
    let json = serde_json::to_string_pretty(&decoded)?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!("Decoded {} rows of '{}' to {}", decoded.len(), schema.name, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn decode_dir(
    schemas: &Path,
    data: &Path,
    output: &Path,
    filter: Option<&str>,
    locale: Option<&Path>,
) -> Result<()> {
    let matcher = filter.map(create_name_matcher).transpose()?;
    let overlay = load_overlay(locale)?;
    fs::create_dir_all(output)?;

    let schema_files: Vec<PathBuf> = collect_files_with_ext(schemas, "json")?
        .into_iter()
        .filter(|path| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            matches_filter(stem, matcher.as_ref())
        })
        .collect();

    println!("Decoding {} tables to {}...", schema_files.len(), output.display());
    let pb = progress_bar(schema_files.len() as u64);

    // Tables are independent; pools and the overlay are read-only, so each
    // one can decode on its own worker.
    let decoded: u64 = schema_files
        .par_iter()
        .map(|schema_path| {
            pb.inc(1);
            match decode_one(schema_path, data, output, &overlay) {
                Ok(rows) => {
                    pb.println(format!(
                        "  {} ({} rows)",
                        schema_path.file_stem().and_then(|s| s.to_str()).unwrap_or("?"),
                        rows
                    ));
                    1
                }
                Err(e) => {
                    eprintln!("Warning: Failed to decode {}: {:#}", schema_path.display(), e);
                    0
                }
            }
        })
        .sum();

    pb.finish_with_message("Done");
    println!(
        "\nDecoded {} tables ({} failed)",
        decoded,
        schema_files.len() as u64 - decoded
    );
    Ok(())
}

fn decode_one(
    schema_path: &Path,
    data_dir: &Path,
    output: &Path,
    overlay: &LocalizationOverlay,
) -> Result<usize> {
    let schema = TableSchema::load(schema_path)?;
    let table_dir = data_dir.join(&schema.name);
    let pools = PoolSet::load_dir(&table_dir)?;
    let rows_path = table_dir.join("rows.bin");
    let data = fs::read(&rows_path)
        .with_context(|| format!("Failed to read {}", rows_path.display()))?;

    let decoder = TableDecoder::new(&schema, &pools, overlay)?;
    let decoded = decoder.decode(&data)?;

    let out_path = output.join(format!("{}.json", schema.name));
    fs::write(&out_path, serde_json::to_string_pretty(&decoded)?)?;
    Ok(decoded.len())
}
