//! `skip` cannot carry policy options.
use obscura::Mask;

#[derive(Mask)]
struct Record {
    #[mask(skip, style = Full)]
    secret: String,
}

fn main() {}
