//! ot: CLI for the Othello move-prediction sample store.
//!
//! Subcommands:
//! - ingest
//! - labels
//! - inspect
//! - stats
//! - batches

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use ot_core::config::Config;
use ot_core::square::square_to_class;
use ot_features::encode::plane_from_mask;
use ot_features::schema::BOARD_SIDE;
use ot_logging::{
    now_ms, write_manifest_atomic, IngestEventV1, NdjsonWriter, StoreManifestV1,
    STORE_MANIFEST_VERSION,
};
use ot_store::batch::BatchAssembler;
use ot_store::labels::LabelIndex;
use ot_store::record::RECORD_BYTES;
use ot_store::store::{ingest, SampleStore};

fn print_help() {
    eprintln!(
        r#"ot - Othello move-prediction sample store

USAGE:
    ot <COMMAND> [OPTIONS]

COMMANDS:
    ingest      Deduplicate a raw 17-byte sample stream into a store
    labels      Build the label index for a store
    inspect     Print one sample of a store
    stats       Print store/label summary information
    batches     Dry-run batch assembly for a configured partition

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `ot <COMMAND> --help` for command-specific usage.
"#
    );
}

fn print_version() {
    println!("ot {}", env!("CARGO_PKG_VERSION"));
}

fn require_value(args: &[String], i: usize, flag: &str) -> String {
    if i + 1 >= args.len() {
        eprintln!("Missing value for {}", flag);
        process::exit(1);
    }
    args[i + 1].clone()
}

/// Algebraic square name: file from the low 3 bits, rank from the high 3.
fn square_name(sq: u8) -> String {
    format!("{}{}", (b'a' + (sq & 7)) as char, (sq >> 3) + 1)
}

fn cmd_ingest(args: &[String]) {
    let mut input: Option<String> = None;
    let mut out: Option<String> = None;
    let mut manifest = false;
    let mut log: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ot ingest

USAGE:
    ot ingest --input <raw> --out <store> [--manifest] [--log <events.ndjson>]

OPTIONS:
    --input <raw>           Raw 17-byte (state, action) stream
    --out <store>           Deduplicated store file to write
    --manifest              Also write <store>.meta.json
    --log <events.ndjson>   Append an ingest summary event
"#
                );
                return;
            }
            "--input" => {
                input = Some(require_value(args, i, "--input"));
                i += 2;
            }
            "--out" => {
                out = Some(require_value(args, i, "--out"));
                i += 2;
            }
            "--manifest" => {
                manifest = true;
                i += 1;
            }
            "--log" => {
                log = Some(require_value(args, i, "--log"));
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `ot ingest`: {}", other);
                eprintln!("Run `ot ingest --help` for usage.");
                process::exit(1);
            }
        }
    }

    let (Some(input), Some(out)) = (input, out) else {
        eprintln!("ot ingest requires --input and --out");
        process::exit(1);
    };
    let input = PathBuf::from(input);
    let out = PathBuf::from(out);

    let summary = match ingest(&input, &out) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ingest failed: {}", e);
            process::exit(1);
        }
    };

    println!("Records read:  {}", summary.records_read);
    println!("Distinct:      {}", summary.distinct);
    println!("Duplicates:    {}", summary.duplicates);

    if manifest {
        let store_hash = match ot_logging::hash_file(&out) {
            Ok(h) => Some(h),
            Err(e) => {
                eprintln!("failed to hash store: {}", e);
                process::exit(1);
            }
        };
        let m = StoreManifestV1 {
            store_manifest_version: STORE_MANIFEST_VERSION,
            created_ts_ms: now_ms(),
            record_bytes: RECORD_BYTES as u32,
            num_records: summary.distinct,
            records_read: summary.records_read,
            duplicates: summary.duplicates,
            input: input.display().to_string(),
            store_hash,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let meta_path = format!("{}.meta.json", out.display());
        if let Err(e) = write_manifest_atomic(&meta_path, &m) {
            eprintln!("failed to write manifest: {:?}", e);
            process::exit(1);
        }
        println!("Manifest:      {}", meta_path);
    }

    if let Some(log) = log {
        let result = NdjsonWriter::open_append(&log).and_then(|mut w| {
            w.write_event(&IngestEventV1 {
                event: "ingest_done",
                ts_ms: now_ms(),
                records_read: summary.records_read,
                distinct: summary.distinct,
                duplicates: summary.duplicates,
            })?;
            w.flush()
        });
        if let Err(e) = result {
            eprintln!("failed to write event log: {:?}", e);
            process::exit(1);
        }
    }
}

fn cmd_labels(args: &[String]) {
    let mut store_path: Option<String> = None;
    let mut out: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ot labels

USAGE:
    ot labels --store <store> --out <labels>

OPTIONS:
    --store <store>     Deduplicated store file
    --out <labels>      Label index file to write (plus <labels>.meta.json)
"#
                );
                return;
            }
            "--store" => {
                store_path = Some(require_value(args, i, "--store"));
                i += 2;
            }
            "--out" => {
                out = Some(require_value(args, i, "--out"));
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `ot labels`: {}", other);
                eprintln!("Run `ot labels --help` for usage.");
                process::exit(1);
            }
        }
    }

    let (Some(store_path), Some(out)) = (store_path, out) else {
        eprintln!("ot labels requires --store and --out");
        process::exit(1);
    };
    let store_path = PathBuf::from(store_path);
    let out = PathBuf::from(out);

    let result = (|| {
        let store = SampleStore::open(&store_path)?;
        let index = LabelIndex::build(&store)?;
        let store_hash = ot_logging::hash_file(&store_path)?;
        index.save(&out, Some(store_hash))?;
        Ok::<u64, ot_store::StoreError>(index.len())
    })();
    match result {
        Ok(n) => println!("Labeled {} samples -> {}", n, out.display()),
        Err(e) => {
            eprintln!("labels failed: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_inspect(args: &[String]) {
    let mut store_path: Option<String> = None;
    let mut ordinal: Option<u64> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ot inspect

USAGE:
    ot inspect --store <store> --ordinal <n>

OPTIONS:
    --store <store>     Deduplicated store file
    --ordinal <n>       0-based sample position
"#
                );
                return;
            }
            "--store" => {
                store_path = Some(require_value(args, i, "--store"));
                i += 2;
            }
            "--ordinal" => {
                let v = require_value(args, i, "--ordinal");
                ordinal = Some(v.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid --ordinal value: {}", v);
                    process::exit(1);
                }));
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `ot inspect`: {}", other);
                eprintln!("Run `ot inspect --help` for usage.");
                process::exit(1);
            }
        }
    }

    let (Some(store_path), Some(ordinal)) = (store_path, ordinal) else {
        eprintln!("ot inspect requires --store and --ordinal");
        process::exit(1);
    };

    let result = (|| {
        let store = SampleStore::open(Path::new(&store_path))?;
        store.read_at(ordinal)
    })();
    let sample = match result {
        Ok(s) => s,
        Err(e) => {
            eprintln!("inspect failed: {}", e);
            process::exit(1);
        }
    };

    println!("Ordinal:  {}", ordinal);
    println!("Black:    {:#018x}", sample.black);
    println!("White:    {:#018x}", sample.white);
    match square_to_class(sample.mv) {
        Ok(class) => println!(
            "Move:     {} ({}) -> class {}",
            sample.mv,
            square_name(sample.mv),
            class
        ),
        Err(_) => println!("Move:     {} (invalid square!)", sample.mv),
    }

    println!();
    let black = plane_from_mask(sample.black);
    let white = plane_from_mask(sample.white);
    for row in 0..BOARD_SIDE {
        let mut line = format!("{} ", BOARD_SIDE - row);
        for col in 0..BOARD_SIDE {
            let c = match (black[row][col], white[row][col]) {
                (1, _) => 'x',
                (_, 1) => 'o',
                _ => '.',
            };
            line.push(c);
            line.push(' ');
        }
        println!("{}", line);
    }
    println!("  a b c d e f g h");
}

fn cmd_stats(args: &[String]) {
    let mut store_path: Option<String> = None;
    let mut labels_path: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ot stats

USAGE:
    ot stats --store <store> [--labels <labels>]

OPTIONS:
    --store <store>     Deduplicated store file
    --labels <labels>   Label index to pair-check and summarize
"#
                );
                return;
            }
            "--store" => {
                store_path = Some(require_value(args, i, "--store"));
                i += 2;
            }
            "--labels" => {
                labels_path = Some(require_value(args, i, "--labels"));
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `ot stats`: {}", other);
                eprintln!("Run `ot stats --help` for usage.");
                process::exit(1);
            }
        }
    }

    let Some(store_path) = store_path else {
        eprintln!("ot stats requires --store");
        process::exit(1);
    };

    let store = match SampleStore::open(Path::new(&store_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("stats failed: {}", e);
            process::exit(1);
        }
    };
    println!("Store:    {}", store_path);
    println!("Records:  {}", store.len());
    println!("Bytes:    {}", store.len() * RECORD_BYTES as u64);

    if let Some(labels_path) = labels_path {
        let result = (|| {
            let (index, meta) = LabelIndex::load(Path::new(&labels_path))?;
            index.verify_pairing(&store)?;
            Ok::<_, ot_store::StoreError>((index, meta))
        })();
        let (index, meta) = match result {
            Ok(v) => v,
            Err(e) => {
                eprintln!("stats failed: {}", e);
                process::exit(1);
            }
        };
        println!("Labels:   {} entries (paired)", index.len());
        if let Some(hash) = meta.store_hash {
            println!("Built on: {}", hash);
        }

        let hist = index.histogram();
        let mut argmax = 0usize;
        let mut max = 0u64;
        for (class, &n) in hist.iter().enumerate() {
            if n > max {
                max = n;
                argmax = class;
            }
        }
        println!("Classes:  {} distinct", hist.iter().filter(|&&n| n > 0).count());
        println!("Top:      class {} x{}", argmax, max);
    }
}

fn cmd_batches(args: &[String]) {
    let mut config_path: Option<String> = None;
    let mut partition = "train".to_string();
    let mut epochs: u64 = 1;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"ot batches

USAGE:
    ot batches --config <cfg.yaml> [--partition train|eval] [--epochs N]

OPTIONS:
    --config <cfg.yaml>     Dataset configuration
    --partition <name>      Partition to assemble (default: train)
    --epochs N              Epochs to dry-run (default: 1)
"#
                );
                return;
            }
            "--config" => {
                config_path = Some(require_value(args, i, "--config"));
                i += 2;
            }
            "--partition" => {
                partition = require_value(args, i, "--partition");
                i += 2;
            }
            "--epochs" => {
                let v = require_value(args, i, "--epochs");
                epochs = v.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid --epochs value: {}", v);
                    process::exit(1);
                });
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `ot batches`: {}", other);
                eprintln!("Run `ot batches --help` for usage.");
                process::exit(1);
            }
        }
    }

    let Some(config_path) = config_path else {
        eprintln!("ot batches requires --config");
        process::exit(1);
    };

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("batches failed: {}", e);
            process::exit(1);
        }
    };
    let range = match partition.as_str() {
        "train" => config.partitions.train,
        "eval" => config.partitions.eval,
        other => {
            eprintln!("Unknown partition: {}", other);
            process::exit(1);
        }
    };
    let Some(range) = range else {
        eprintln!("Partition '{}' is not configured", partition);
        process::exit(1);
    };

    let result = (|| {
        let store = SampleStore::open(Path::new(&config.dataset.store))?;
        let (labels, _meta) = LabelIndex::load(Path::new(&config.dataset.labels))?;
        let mut asm =
            BatchAssembler::new(&store, &labels, range.ordinals(), &config.batching)?;
        println!(
            "Partition '{}': {} ordinals, {} batches of {} per epoch",
            partition,
            range.len(),
            asm.batches_per_epoch(),
            config.batching.batch_size
        );
        for epoch in 0..epochs {
            let mut batches = 0u64;
            let mut samples = 0u64;
            for batch in asm.epoch() {
                let batch = batch?;
                batches += 1;
                samples += batch.len() as u64;
            }
            println!("Epoch {}: {} batches, {} samples", epoch, batches, samples);
        }
        Ok::<(), ot_store::StoreError>(())
    })();
    if let Err(e) = result {
        eprintln!("batches failed: {}", e);
        process::exit(1);
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        process::exit(1);
    }

    match args[1].as_str() {
        "-h" | "--help" => print_help(),
        "-V" | "--version" => print_version(),
        "ingest" => cmd_ingest(&args[2..]),
        "labels" => cmd_labels(&args[2..]),
        "inspect" => cmd_inspect(&args[2..]),
        "stats" => cmd_stats(&args[2..]),
        "batches" => cmd_batches(&args[2..]),
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            process::exit(1);
        }
    }
}
