use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(err) = reconcile_report::app::run_cli() {
        eprintln!("{} {}", "error:".red().bold(), err);
        exit(1);
    }
}
