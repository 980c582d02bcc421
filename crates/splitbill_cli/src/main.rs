//! CLI entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `splitbill_core` linkage.
//! - Print the summary of a persisted bill when given a DB path.
//!
//! Usage: `splitbill_cli [db_path]`

use splitbill_core::db::open_db;
use splitbill_core::{render_text, BillStore, BillView, Screen, SqliteKeyValueStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("splitbill_core ping={}", splitbill_core::ping());
    println!("splitbill_core version={}", splitbill_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut view = BillView::new(BillStore::new(SqliteKeyValueStore::new(&conn)));
    view.load();
    if let Some(warning) = view.store().load_warning() {
        eprintln!("warning: {warning}");
    }
    if let Screen::Ready(summary) = view.screen() {
        print!("{}", render_text(summary));
    }
    ExitCode::SUCCESS
}
