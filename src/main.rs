// Tue Jan 13 2026 - Alex

use clap::Parser;
use struct_offsets::ui::{Args, CommandHandler, UIManager};

fn main() {
    let args = Args::parse();

    if let Err(e) = CommandHandler::new().execute(args) {
        UIManager::new().error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
