//! Parsers for the map points feed.
//!
//! - [`point_parser`]: Lenient per-entry parsing of a time slice feed
//!
//! # Example
//!
//! ```no_run
//! use marine_map::parsing::point_parser::parse_points_file;
//! use std::path::Path;
//!
//! let report = parse_points_file(Path::new("data/map_data_t1.json"))
//!     .expect("Failed to parse feed");
//! println!("{} points, {} skipped", report.points.len(), report.skipped.len());
//! ```

pub mod point_parser;


pub use point_parser::{parse_points_file, parse_points_str, PointParseReport, SkippedPoint};
