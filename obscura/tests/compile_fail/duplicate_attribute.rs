//! Only one #[mask] attribute per field.
use obscura::Mask;

#[derive(Mask)]
struct Record {
    #[mask(skip)]
    #[mask(style = Full)]
    secret: String,
}

fn main() {}
