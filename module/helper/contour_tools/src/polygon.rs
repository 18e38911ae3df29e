//!
//! # Polygon value types
//!
//! `ContourPolygon` is the public, fractional-point result type. `PolygonPoints`
//! is the extractor's intermediate integer-point type, carrying the bookkeeping
//! (voxel counts, parent id, nesting level) needed to assemble `InnerOuterPolygon`
//! groups. Both are immutable value types ; nothing here mutates after construction.
//!

mod private
{
  use crate::*;
  use geometry::{ Point2, IVec2 };

  /// Per-polygon tally of voxels painted `foreground` versus any other value,
  /// accumulated while the filler paints a traced boundary's interior.
  #[ derive( Debug, Default, Clone, Copy, PartialEq, Eq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct VoxelCounts
  {
    /// Voxels matching the extractor's foreground id.
    pub foreground : u64,
    /// Voxels not matching the foreground id (background, or a different label).
    pub other : u64,
  }

  impl VoxelCounts
  {
    /// Adds `rhs`'s counts into `self`.
    #[ inline ]
    pub fn accumulate( &mut self, rhs : Self )
    {
      self.foreground += rhs.foreground;
      self.other += rhs.other;
    }
  }

  /// Monotonically increasing identifier for a traced polygon within one
  /// extraction run. `0` is reserved for "no polygon".
  #[ derive( Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct PolygonId( pub u16 );

  impl PolygonId
  {
    /// The reserved "no polygon" sentinel.
    pub const NONE : Self = Self( 0 );

    /// Whether this id is the reserved sentinel.
    #[ inline ]
    pub fn is_none( self ) -> bool
    {
      self == Self::NONE
    }
  }

  /// An immutable ordered set of fractional 2D points plus the pixel count the
  /// boundary encloses. First and last points are implicitly joined ; the
  /// assumed fill rule is even-odd.
  #[ derive( Debug, Clone, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct ContourPolygon
  {
    points : Vec< Point2 >,
    region_area_pixels : u64,
  }

  impl ContourPolygon
  {
    /// Builds a polygon from its ordered points and enclosed pixel count.
    #[ inline ]
    pub fn new( points : Vec< Point2 >, region_area_pixels : u64 ) -> Self
    {
      Self { points, region_area_pixels }
    }

    /// The ordered points. First and last are implicitly joined.
    #[ inline ]
    pub fn points( &self ) -> &[ Point2 ]
    {
      &self.points
    }

    /// Number of voxels the polygon's interior encloses, as recorded by whatever
    /// produced it (typically the filler's painted-pixel tally).
    #[ inline ]
    pub fn region_area_pixels( &self ) -> u64
    {
      self.region_area_pixels
    }

    /// Number of vertices.
    #[ inline ]
    pub fn len( &self ) -> usize
    {
      self.points.len()
    }

    /// Whether the polygon has no vertices.
    #[ inline ]
    pub fn is_empty( &self ) -> bool
    {
      self.points.is_empty()
    }
  }

  /// The extractor's intermediate integer-point polygon, carrying the
  /// nesting/parent bookkeeping `ContourPolygon` does not need.
  #[ derive( Debug, Clone, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct PolygonPoints
  {
    id : PolygonId,
    points : Vec< IVec2 >,
    voxel_counts : VoxelCounts,
    inside_of_polygon : PolygonId,
    is_inner_contour : bool,
    start_point_minimum_y : IVec2,
    nesting_level : u32,
  }

  impl PolygonPoints
  {
    /// Builds a new traced polygon. `inside_of_polygon` is `PolygonId::NONE` for
    /// a top-level outer polygon.
    #[ allow( clippy::too_many_arguments ) ]
    #[ inline ]
    pub fn new
    (
      id : PolygonId,
      points : Vec< IVec2 >,
      voxel_counts : VoxelCounts,
      inside_of_polygon : PolygonId,
      is_inner_contour : bool,
      start_point_minimum_y : IVec2,
      nesting_level : u32,
    ) -> Self
    {
      Self { id, points, voxel_counts, inside_of_polygon, is_inner_contour, start_point_minimum_y, nesting_level }
    }

    /// This polygon's own id.
    #[ inline ]
    pub fn id( &self ) -> PolygonId { self.id }

    /// The closed integer boundary, in walk order.
    #[ inline ]
    pub fn points( &self ) -> &[ IVec2 ] { &self.points }

    /// Foreground/other voxel tally over the boundary and enclosed interior.
    #[ inline ]
    pub fn voxel_counts( &self ) -> VoxelCounts { self.voxel_counts }

    /// Parent polygon id ; `PolygonId::NONE` for a top-level outer polygon.
    #[ inline ]
    pub fn inside_of_polygon( &self ) -> PolygonId { self.inside_of_polygon }

    /// `true` iff this boundary was traced as a hole (counter-clockwise).
    #[ inline ]
    pub fn is_inner_contour( &self ) -> bool { self.is_inner_contour }

    /// The seed pixel used to start the walk ; needed by the smoother's
    /// parent/child splice step.
    #[ inline ]
    pub fn start_point_minimum_y( &self ) -> IVec2 { self.start_point_minimum_y }

    /// `0` = top-level outer, `1` = hole, `2` = insert, …
    #[ inline ]
    pub fn nesting_level( &self ) -> u32 { self.nesting_level }

    /// Nesting parity : a polygon at level `k` is an inner
    /// contour iff `k` is odd.
    #[ inline ]
    pub fn nesting_parity_holds( &self ) -> bool
    {
      self.is_inner_contour == ( self.nesting_level % 2 == 1 )
    }
  }

  /// One outer `PolygonPoints` plus its directly nested inner (hole) polygons.
  /// Every inner polygon has `nesting_level() == outer.nesting_level() + 1`.
  #[ derive( Debug, Clone, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct InnerOuterPolygon
  {
    outer : PolygonPoints,
    inners : Vec< PolygonPoints >,
  }

  impl InnerOuterPolygon
  {
    /// Builds a group from an outer boundary and its holes.
    #[ inline ]
    pub fn new( outer : PolygonPoints, inners : Vec< PolygonPoints > ) -> Self
    {
      Self { outer, inners }
    }

    /// The outer boundary.
    #[ inline ]
    pub fn outer( &self ) -> &PolygonPoints { &self.outer }

    /// The directly nested holes.
    #[ inline ]
    pub fn inners( &self ) -> &[ PolygonPoints ] { &self.inners }
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;

    #[ test ]
    fn polygon_id_none_is_zero()
    {
      assert_eq!( PolygonId::NONE.0, 0 );
      assert!( PolygonId::NONE.is_none() );
      assert!( !PolygonId( 1 ).is_none() );
    }

    #[ test ]
    fn voxel_counts_accumulate_sums_fields()
    {
      let mut a = VoxelCounts { foreground : 3, other : 1 };
      a.accumulate( VoxelCounts { foreground : 2, other : 5 } );
      assert_eq!( a, VoxelCounts { foreground : 5, other : 6 } );
    }

    #[ test ]
    fn nesting_parity_matches_inner_flag()
    {
      let p = PolygonPoints::new
      (
        PolygonId( 1 ), vec![], VoxelCounts::default(), PolygonId::NONE,
        true, IVec2::new( 0, 0 ), 1,
      );
      assert!( p.nesting_parity_holds() );

      let q = PolygonPoints::new
      (
        PolygonId( 2 ), vec![], VoxelCounts::default(), PolygonId::NONE,
        false, IVec2::new( 0, 0 ), 1,
      );
      assert!( !q.nesting_parity_holds() );
    }

    #[ test ]
    fn contour_polygon_exposes_points_and_area()
    {
      let poly = ContourPolygon::new( vec![ Point2::new( 0.0, 0.0 ), Point2::new( 1.0, 0.0 ) ], 4 );
      assert_eq!( poly.len(), 2 );
      assert_eq!( poly.region_area_pixels(), 4 );
      assert!( !poly.is_empty() );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    VoxelCounts,
    PolygonId,
    ContourPolygon,
    PolygonPoints,
    InnerOuterPolygon,
  };
}
