//! Vector index over wardrobe item descriptions.

pub mod vector;
