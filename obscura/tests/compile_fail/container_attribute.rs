//! Policies are declared on fields, not on types.
use obscura::Mask;

#[derive(Mask)]
#[mask(style = Full)]
struct Record {
    email: String,
}

fn main() {}
