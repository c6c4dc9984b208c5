pub mod assets;
pub mod model;

pub use assets::{Asset, asset_for};
pub use model::{Blueprint, Resource, Resources};
