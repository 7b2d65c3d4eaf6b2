// handlers/mod.rs - Public (no auth) and protected (JWT auth) endpoints

pub mod protected;
pub mod public;
