pub mod candidate;
pub mod center;
pub mod filiere;
pub mod stats;
