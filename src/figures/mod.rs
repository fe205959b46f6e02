//! Figure builders for the map and bar-chart displays.
//!
//! Figures are plain serializable values; drawing them is left to whatever
//! front end reads the written files.

mod bar;
mod color;
mod map;

pub use bar::{Bar, BarChart, bar_chart, bar_title};
pub use color::{SUNSET_NAME, normalize, sunset};
pub use map::{SIZE_MAX, map_title, scatter_map};
