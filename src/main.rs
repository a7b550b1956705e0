fn main() {
    if let Err(e) = dimfuse::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
