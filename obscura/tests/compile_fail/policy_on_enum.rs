//! Enums are never text, so a policy on an enum field is rejected.
use obscura::Mask;

enum Role {
    Admin,
    Member,
}

#[derive(Mask)]
struct Account {
    #[mask(style = Full)]
    role: Role,
}

fn main() {}
