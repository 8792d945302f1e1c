fn main() {
    if let Err(err) = glider_chess::uci::uci_top::run_stdio_loop() {
        eprintln!("uci loop failed: {err}");
        std::process::exit(1);
    }
}
