//! A policy on a non-text field is rejected.
use obscura::Mask;

#[derive(Mask)]
struct Record {
    #[mask(style = Full)]
    count: u32,
}

fn main() {}
