// Main entry point that forwards to the collapsar-app binary
fn main() {
    // Exit with the same code as the app
    std::process::exit(match collapsar_app::main() {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    });
}
