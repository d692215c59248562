// Job–candidate match scoring.
// Repositories load snapshots; the engine is pure and shared by the single
// and batch call shapes.

pub mod engine;
pub mod factors;
pub mod handlers;
pub mod repository;
pub mod service;
