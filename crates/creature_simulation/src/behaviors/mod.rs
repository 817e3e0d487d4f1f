//! Готовые `CreatureBehavior` реализации

pub mod sparring;

pub use sparring::{
    sparring_hitboxes, track_rivals, Rival, Sparring, SparringAction, SparringPlugin, HOP_TAG,
};
