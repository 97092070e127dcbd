//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = roadfeed_cli::run() {
        eprintln!("roadfeed: {err}");
        std::process::exit(1);
    }
}
