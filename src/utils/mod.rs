pub mod auth;
pub mod clock;
pub mod hash;
pub mod pagination;
pub mod random;
pub mod sniff;
