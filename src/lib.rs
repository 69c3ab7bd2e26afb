// Copyright ⓒ 2023 SilverSixpence
// Licensed under the MIT license
// (see LICENSE or <http://opensource.org/licenses/MIT>) All files in the project carrying such
// notice may not be copied, modified, or distributed except according to those terms.

//! # Offline compiler for point-in-polygon country lookup tables
//!
//! Compiles a geospatial point-in-polygon query — "which country contains
//! this (latitude, longitude)?" — into a self-contained lookup table
//! embedded in a generated source header. Correctness is defined only on a
//! quantized integer lattice whose resolution is chosen at build time.
//!
//! ## What is contained in this code
//!
//! The core is the sparse-quadtree compilation pipeline: coordinate
//! quantization ([`quantize`]), the prove-or-split tree builder ([`builder`])
//! that recursively proves rectangles uniform against an [`oracle::Oracle`]
//! and otherwise subdivides, a compact byte-stream [`serialize`]r, and a
//! [`runtime`] traversal that reproduces the lookup bit-for-bit. A dense
//! [`country`] table maps country ids to ISO codes and back.
//!
//! Surrounding the core: [`config`] (TOML-backed build configuration),
//! [`io`] (blob file read/write helpers), and [`codegen`] (the Rust-only
//! instance of the code-generator role described by the design).
//!
//! ## How this code can be used
//!
//! There is both a Rust API and a CLI; CLI details are in `cli.rs`.
//!
//! ### Rust API
//!
//! ```
//! use quadgeo::builder::TreeBuilder;
//! use quadgeo::oracle::UniformOracle;
//! use quadgeo::quantize::Precision;
//! use quadgeo::country::{CountryTable, IsoCode};
//! use quadgeo::geometry::Rectangle;
//!
//! let precision = Precision::from_u8(0);
//! let oracle = UniformOracle { id: 7 };
//!
//! let tree = TreeBuilder::new()
//!     .with_precision(precision)
//!     .build_using_single_threaded_algorithm(&oracle)
//!     .unwrap();
//!
//! let table = CountryTable::new(vec![IsoCode::EMPTY, IsoCode::from_str("XXX").unwrap()]).unwrap();
//! let root_rect = Rectangle::root(precision.x_max(), precision.y_max());
//! let blob = quadgeo::serialize::serialize(&tree, root_rect, precision, &table);
//!
//! let decoded = quadgeo::runtime::Table::decode(&blob).unwrap();
//! assert_eq!(decoded.lookup(12.0, 34.0).unwrap(), 7);
//! ```

pub mod quantize;
pub mod geometry;
pub mod oracle;
pub mod node;

mod hasher;
pub use hasher::Hasher;

pub mod sampling;
pub mod builder;
pub mod serialize;
pub mod runtime;
pub mod country;

pub mod config;
pub mod io;
pub mod codegen;

pub mod cli;
