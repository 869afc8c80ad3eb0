//! Name-value syntax is not supported.
use obscura::Mask;

#[derive(Mask)]
struct Record {
    #[mask = "Full"]
    secret: String,
}

fn main() {}
