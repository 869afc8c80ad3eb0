//! Types with lifetime parameters cannot be masked in place.
use obscura::Mask;

#[derive(Mask)]
struct Record<'a> {
    name: &'a str,
}

fn main() {}
