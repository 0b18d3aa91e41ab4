fn main() {
    if let Err(error) = shalconv_rs_lib::run_initialization() {
        eprintln!("Initialization step failed: {}", error);
        std::process::exit(1);
    }
}
