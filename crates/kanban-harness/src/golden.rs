#![forbid(unsafe_code)]

//! Golden board snapshots.
//!
//! A board is rendered as one line per column, `id: item item ...`, and
//! compared against `tests/snapshots/<name>.snap` under the calling crate.
//! Run with `BLESS=1` to create or update snapshot files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use kanban_dnd::Board;

/// Plain-text rendering of a board.
///
/// ```
/// use kanban_harness::{fixture, golden::board_to_text};
///
/// let board = fixture::board(&[("todo", &["T1", "T2"]), ("done", &[])]);
/// assert_eq!(board_to_text(&board), "todo: T1 T2\ndone:");
/// ```
#[must_use]
pub fn board_to_text(board: &Board) -> String {
    let mut out = String::new();
    for (i, column) in board.columns().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}:", column.id());
        for item in column.items() {
            let _ = write!(out, " {item}");
        }
    }
    out
}

/// Line-by-line diff. ` ` same, `-` only in `expected`, `+` only in
/// `actual`. Empty when the inputs match.
#[must_use]
pub fn diff_text(expected: &str, actual: &str) -> String {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let mut out = String::new();
    let mut has_diff = false;

    for i in 0..expected_lines.len().max(actual_lines.len()) {
        match (expected_lines.get(i), actual_lines.get(i)) {
            (Some(e), Some(a)) if e == a => {
                let _ = writeln!(out, " {e}");
            }
            (e, a) => {
                if let Some(e) = e {
                    let _ = writeln!(out, "-{e}");
                }
                if let Some(a) = a {
                    let _ = writeln!(out, "+{a}");
                }
                has_diff = true;
            }
        }
    }

    if has_diff { out } else { String::new() }
}

fn snapshot_path(base_dir: &Path, name: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"))
}

fn is_bless() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Assert that `board` matches the stored snapshot `name`.
///
/// Trailing whitespace is ignored on both sides.
///
/// # Panics
///
/// If the snapshot is missing (without `BLESS=1`) or differs.
pub fn assert_board_snapshot(name: &str, board: &Board, base_dir: &str) {
    let path = snapshot_path(Path::new(base_dir), name);
    let actual = board_to_text(board);

    if is_bless() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create snapshot directory");
        }
        std::fs::write(&path, &actual).expect("failed to write snapshot");
        return;
    }

    let trim = |text: &str| {
        text.lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    };

    match std::fs::read_to_string(&path) {
        Ok(expected) => {
            let (expected, actual) = (trim(&expected), trim(&actual));
            if expected != actual {
                let diff = diff_text(&expected, &actual);
                panic!(
                    "\n=== Board snapshot mismatch: '{name}' ===\nFile: {}\n\
                     Set BLESS=1 to update.\n\nDiff (- expected, + actual):\n{diff}",
                    path.display()
                );
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            panic!(
                "\n=== No board snapshot found: '{name}' ===\nExpected at: {}\n\
                 Run with BLESS=1 to create it.\n\nActual board:\n{actual}",
                path.display()
            );
        }
        Err(e) => panic!("Failed to read snapshot '{}': {e}", path.display()),
    }
}

/// [`assert_board_snapshot`] rooted at the calling crate's manifest dir.
#[macro_export]
macro_rules! assert_board_snapshot {
    ($name:expr, $board:expr) => {
        $crate::golden::assert_board_snapshot($name, $board, env!("CARGO_MANIFEST_DIR"))
    };
}
