fn main() {
    if let Err(err) = course_catalog::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
