//!
//! # Contour tools
//!
//! Extraction, rasterisation, smoothing and interpolation of 2D/3D contours
//! from discrete voxel grids (binary masks) representing segmentations.
//!
#![ cfg_attr( doc, doc = include_str!( concat!( env!( "CARGO_MANIFEST_DIR" ), "/", "readme.md" ) ) ) ]

use mod_interface::mod_interface;

mod private {}

mod_interface!
{
  /// Fixed constants named by the core.
  layer constants;

  /// Error kinds and the crate-wide `Result` alias.
  layer error;

  /// Plain geometric value types : fractional/integer points, direction matrices.
  layer geometry;

  /// Inclusive index-space bounding boxes.
  layer region;

  /// Dense 2D/3D voxel arrays with spacing, origin and direction.
  layer grid;

  /// `ContourPolygon`, `PolygonPoints`, `InnerOuterPolygon`, `VoxelCounts`.
  layer polygon;

  /// Scanline rasterisation, point-in-polygon, flood fill.
  layer fill;

  /// 8-neighbour boundary walk and nested hole/insert discovery.
  layer extract;

  /// Turtle-graphics contour smoothing and parent/child splicing.
  layer smooth;

  /// Axial/coronal/sagittal plane extraction from a 3D volume.
  layer slice;

  /// Thread-safe slice-index -> polygon-list container.
  layer contours_per_slice;

  /// Between-slice linear polygon interpolation.
  layer interpolate;

  /// Chamfer Euclidean distance transform.
  layer distance;

  /// Ellipsoidal structuring element, dilation/erosion.
  layer morphology;

  /// Per-voxel mean/std/volume statistics over a mask.
  layer stats;

  /// Named collaborator seams (convolution, thread pool).
  layer collaborators;
}
