//! Convert every fixture document to each output form and report sizes.

use libwexpr::{encode, parse, read_binary_file, write_binary_file, Style};
use std::fs;
use std::path::Path;

fn main() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
        .join("wexpr");

    let mut passed = 0;
    let mut failed = 0;

    let mut paths: Vec<_> = fs::read_dir(&test_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map(|e| e == "wexpr").unwrap_or(false))
        .collect();
    paths.sort();

    for path in paths {
        let source = fs::read_to_string(&path).unwrap();
        let basename = path.file_stem().unwrap().to_str().unwrap();

        let expr = match parse(&source) {
            Ok(expr) => expr,
            Err(e) => {
                failed += 1;
                println!("Parse error for {}: {}", basename, e);
                continue;
            }
        };

        let mini = encode(&expr, Style::Compact).unwrap();
        let pretty = encode(&expr, Style::HumanReadable).unwrap();
        let binary = write_binary_file(&expr).unwrap();

        if read_binary_file(&binary).unwrap() == expr {
            passed += 1;
        } else {
            failed += 1;
            println!("FAIL: {} binary round trip", basename);
        }

        println!(
            "{:<16} source {:>5}  mini {:>5}  pretty {:>5}  binary {:>5}",
            basename,
            source.len(),
            mini.len(),
            pretty.len(),
            binary.len()
        );
    }

    println!("\nResults: {} passed, {} failed", passed, failed);
}
