//! Unions are rejected.
use obscura::Mask;

#[derive(Mask)]
union Bits {
    a: u32,
    b: f32,
}

fn main() {}
