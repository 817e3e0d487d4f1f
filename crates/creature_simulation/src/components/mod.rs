//! Базовые данные существа
//!
//! - health: HP с инвариантом 0 ≤ current ≤ max
//! - stats: StatBlock (derived модификаторы из баффов)

pub mod health;
pub mod stats;

pub use health::*;
pub use stats::*;
