//!
//! # Constants
//!
//! Fixed values named by the core. None of these are configurable at runtime ;
//! callers who need a different value must fork the behaviour, not parametrize it.
//!

mod private
{
  /// Foreground voxel value in a binary mask.
  pub const FG : u8 = 1;

  /// Background voxel value in a binary mask.
  pub const BG : u8 = 0;

  /// Default maximum polygon nesting level explored by the extractor.
  pub const DEFAULT_MAX_NESTING : u32 = 6;

  /// Scanline epsilon used by the polygon filler's dual-intersection scheme.
  pub const FILL_EPSILON : f64 = 0.01;

  /// Colinearity / coincidence tolerance (squared length) used when removing
  /// redundant points from a smoothed contour.
  pub const REDUNDANT_POINT_TOLERANCE_SQ : f64 = 0.0;

  /// Maximum allowed gap between the smoother's first and last emitted point,
  /// above `1.0`, before the smoother fails with `InvalidState`.
  pub const GAP_TOLERANCE : f64 = 0.01;

  /// Default shift applied by `Smoothing::None` so that pixel centres land on
  /// integer coordinates.
  pub const DEFAULT_OUTER_EDGE_SHIFT : f64 = -0.5;
}

crate::mod_interface!
{
  own use
  {
    FG,
    BG,
    DEFAULT_MAX_NESTING,
    FILL_EPSILON,
    REDUNDANT_POINT_TOLERANCE_SQ,
    GAP_TOLERANCE,
    DEFAULT_OUTER_EDGE_SHIFT,
  };
}
