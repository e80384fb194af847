pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        println!("Verbose: {}", msg);
    }
}

pub fn log_warning(msg: &str) {
    eprintln!("Warning: {}", msg);
}

pub fn log_error(msg: &str) {
    eprintln!("Error: {}", msg);
}
