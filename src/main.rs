fn main() {
    if let Err(err) = nexus::cli::main() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
