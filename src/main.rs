fn main() {
    if let Err(err) = pansy_timeline::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
