//! The Regex style needs a pattern.
use obscura::Mask;

#[derive(Mask)]
struct Record {
    #[mask(style = Regex)]
    body: String,
}

fn main() {}
