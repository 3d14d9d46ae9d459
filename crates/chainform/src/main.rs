fn main() {
    if let Err(err) = chainform::cli::main() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
