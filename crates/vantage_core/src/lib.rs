//! Vantage gameplay code
//!
//! Obstacle registry, cached line-of-sight, cover evaluation and the
//! damage-resolution pipeline for a grid battlefield. The host drives
//! everything through [`battlefield::Battlefield`] and a per-tick
//! `advance` call; rendering, pathfinding and turn flow live elsewhere.

pub mod prelude;

pub mod battlefield;
pub mod blueprints;
pub mod cell;
pub mod combat;
pub mod cover;
pub mod events;
pub mod obstacle;
pub mod rules;
pub mod sight;

#[cfg(test)]
mod test;

/// Used to tell serde to not serialize default fields.
/// In combination with marking fields as default results in serde not serializing default fields
/// and setting as the default value fields if during deserialization the field is not present.
fn is_default<T: Default + PartialEq>(t: &T) -> bool {
    t == &T::default()
}
