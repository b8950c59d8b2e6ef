//! The Blender (spec §4.3): market-implied conversion plus the seven-set
//! generator A through G.

pub mod market;
pub mod sets;

pub use sets::{build_sets, BlendedSets};
