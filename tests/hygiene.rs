//! Hygiene: source scans for patterns the engine must not ship.
//!
//! The engine runs inside someone else's application. A panic takes the host
//! plugin down with it and a stray `println!` lands in the user's console, so
//! both have a budget of zero. Budgets only ever go down.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

// Panics.
const MAX_UNWRAP: usize = 0;
const MAX_EXPECT: usize = 0;
const MAX_PANIC: usize = 0;
const MAX_UNREACHABLE: usize = 0;
const MAX_TODO: usize = 0;
const MAX_UNIMPLEMENTED: usize = 0;

// Silent loss.
const MAX_SILENT_DISCARD: usize = 0;
const MAX_DOT_OK: usize = 0;

// Output goes through `tracing`.
const MAX_PRINT: usize = 0;

// Style / structure.
const MAX_ALLOW_DEAD_CODE: usize = 0;

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`; `*_test.rs` files are skipped.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

/// Per-file count of lines containing any of `patterns`. Comment lines are ignored.
fn count_in_source(files: &[SourceFile], patterns: &[&str]) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| patterns.iter().any(|p| line.contains(p)))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn assert_budget(label: &str, patterns: &[&str], max: usize) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the crate root");
    let hits = count_in_source(&files, patterns);
    let count: usize = hits.iter().map(|(_, c)| c).sum();
    let listing = hits.iter().map(|(path, c)| format!("  {path}: {c}")).collect::<Vec<_>>().join("\n");
    assert!(count <= max, "{label} budget exceeded: found {count}, max {max}.\n{listing}");
}

#[test]
fn unwrap_budget() {
    assert_budget(".unwrap()", &[".unwrap()"], MAX_UNWRAP);
}

#[test]
fn expect_budget() {
    assert_budget(".expect()", &[".expect("], MAX_EXPECT);
}

#[test]
fn panic_budget() {
    assert_budget("panic!()", &["panic!("], MAX_PANIC);
}

#[test]
fn unreachable_budget() {
    assert_budget("unreachable!()", &["unreachable!("], MAX_UNREACHABLE);
}

#[test]
fn todo_budget() {
    assert_budget("todo!()", &["todo!("], MAX_TODO);
}

#[test]
fn unimplemented_budget() {
    assert_budget("unimplemented!()", &["unimplemented!("], MAX_UNIMPLEMENTED);
}

#[test]
fn silent_discard_budget() {
    assert_budget("let _ =", &["let _ ="], MAX_SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    assert_budget(".ok()", &[".ok()"], MAX_DOT_OK);
}

#[test]
fn print_budget() {
    assert_budget("print macros", &["println!(", "eprintln!(", "dbg!("], MAX_PRINT);
}

#[test]
fn allow_dead_code_budget() {
    assert_budget("#[allow(dead_code)]", &["#[allow(dead_code)]"], MAX_ALLOW_DEAD_CODE);
}
