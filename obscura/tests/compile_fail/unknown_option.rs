//! Unknown attribute keys are rejected.
use obscura::Mask;

#[derive(Mask)]
struct Record {
    #[mask(style = Full, colour = 1)]
    secret: String,
}

fn main() {}
