//! Threadmark domain core.
//!
//! Everything in this crate is pure: placement zones and their calibration
//! tables, the typed customization record, the geometry resolver that turns
//! a placement into a decal transform, the print-measurement converter, the
//! authoring reducer, screenshot naming, and cart/order matching. Nothing
//! here touches the network, the database, or a renderer.

pub mod authoring;
pub mod customization;
pub mod error;
pub mod geometry;
pub mod matching;
pub mod measurement;
pub mod orders;
pub mod screenshots;
pub mod types;
pub mod zone;
