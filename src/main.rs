use std::process::exit;

fn main() {
    if let Err(err) = trailmark::run() {
        eprintln!("error: {err}");
        exit(1);
    }
}
