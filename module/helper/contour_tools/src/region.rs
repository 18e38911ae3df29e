//!
//! # Regions
//!
//! Inclusive min/max bounding boxes in grid-index space, in 2 and 3 dimensions.
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };

  /// An inclusive axis-aligned bounding box over a 2D grid's index space.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct Region2D
  {
    /// Inclusive minimum X.
    pub min_x : i64,
    /// Inclusive minimum Y.
    pub min_y : i64,
    /// Inclusive maximum X.
    pub max_x : i64,
    /// Inclusive maximum Y.
    pub max_y : i64,
  }

  impl Region2D
  {
    /// The canonical empty region : `(0, -1)` on every axis.
    pub const EMPTY : Self = Self { min_x : 0, max_x : -1, min_y : 0, max_y : -1 };

    /// Creates a region from explicit inclusive bounds.
    #[ inline ]
    pub fn new( min_x : i64, min_y : i64, max_x : i64, max_y : i64 ) -> Self
    {
      Self { min_x, min_y, max_x, max_y }
    }

    /// A region is empty iff any axis has `max < min`.
    #[ inline ]
    pub fn is_empty( &self ) -> bool
    {
      self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Number of covered cells ; `0` for an empty region.
    #[ inline ]
    pub fn size( &self ) -> u64
    {
      if self.is_empty()
      {
        return 0;
      }
      ( self.max_x - self.min_x + 1 ) as u64 * ( self.max_y - self.min_y + 1 ) as u64
    }

    /// Whether `(x, y)` falls inside the (inclusive) bounds.
    #[ inline ]
    pub fn contains( &self, x : i64, y : i64 ) -> bool
    {
      !self.is_empty()
      && x >= self.min_x && x <= self.max_x
      && y >= self.min_y && y <= self.max_y
    }

    /// Whether `self` is fully contained in `other`.
    ///
    /// # Errors
    /// Fails with `InvalidState` if either region is empty.
    pub fn inside_of( &self, other : &Self ) -> Result< bool >
    {
      if self.is_empty() || other.is_empty()
      {
        return Err( Error::invalid_state( "inside_of on an empty region" ) );
      }
      Ok
      (
        self.min_x >= other.min_x && self.max_x <= other.max_x
        && self.min_y >= other.min_y && self.max_y <= other.max_y
      )
    }

    /// Expands the region by a margin in each axis, clamped to `bounds`.
    #[ must_use ]
    pub fn dilate( &self, margin_x : i64, margin_y : i64, bounds : &Self ) -> Self
    {
      if self.is_empty()
      {
        return *self;
      }
      Self::new
      (
        ( self.min_x - margin_x ).max( bounds.min_x ),
        ( self.min_y - margin_y ).max( bounds.min_y ),
        ( self.max_x + margin_x ).min( bounds.max_x ),
        ( self.max_y + margin_y ).min( bounds.max_y ),
      )
    }
  }

  /// An inclusive axis-aligned bounding box over a 3D grid's index space.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct Region3D
  {
    /// Inclusive minimum X.
    pub min_x : i64,
    /// Inclusive minimum Y.
    pub min_y : i64,
    /// Inclusive minimum Z.
    pub min_z : i64,
    /// Inclusive maximum X.
    pub max_x : i64,
    /// Inclusive maximum Y.
    pub max_y : i64,
    /// Inclusive maximum Z.
    pub max_z : i64,
  }

  impl Region3D
  {
    /// The canonical empty region : `(0, -1)` on every axis.
    pub const EMPTY : Self = Self
    {
      min_x : 0, max_x : -1,
      min_y : 0, max_y : -1,
      min_z : 0, max_z : -1,
    };

    /// Creates a region from explicit inclusive bounds.
    #[ inline ]
    pub fn new( min_x : i64, min_y : i64, min_z : i64, max_x : i64, max_y : i64, max_z : i64 ) -> Self
    {
      Self { min_x, min_y, min_z, max_x, max_y, max_z }
    }

    /// A region is empty iff any axis has `max < min`.
    #[ inline ]
    pub fn is_empty( &self ) -> bool
    {
      self.max_x < self.min_x || self.max_y < self.min_y || self.max_z < self.min_z
    }

    /// Number of covered cells ; `0` for an empty region.
    #[ inline ]
    pub fn size( &self ) -> u64
    {
      if self.is_empty()
      {
        return 0;
      }
      ( self.max_x - self.min_x + 1 ) as u64
      * ( self.max_y - self.min_y + 1 ) as u64
      * ( self.max_z - self.min_z + 1 ) as u64
    }

    /// Whether `(x, y, z)` falls inside the (inclusive) bounds.
    #[ inline ]
    pub fn contains( &self, x : i64, y : i64, z : i64 ) -> bool
    {
      !self.is_empty()
      && x >= self.min_x && x <= self.max_x
      && y >= self.min_y && y <= self.max_y
      && z >= self.min_z && z <= self.max_z
    }

    /// Whether `self` is fully contained in `other`.
    ///
    /// # Errors
    /// Fails with `InvalidState` if either region is empty.
    pub fn inside_of( &self, other : &Self ) -> Result< bool >
    {
      if self.is_empty() || other.is_empty()
      {
        return Err( Error::invalid_state( "inside_of on an empty region" ) );
      }
      Ok
      (
        self.min_x >= other.min_x && self.max_x <= other.max_x
        && self.min_y >= other.min_y && self.max_y <= other.max_y
        && self.min_z >= other.min_z && self.max_z <= other.max_z
      )
    }

    /// Expands the region by a margin in each axis, clamped to `bounds`.
    #[ must_use ]
    pub fn dilate( &self, margin_x : i64, margin_y : i64, margin_z : i64, bounds : &Self ) -> Self
    {
      if self.is_empty()
      {
        return *self;
      }
      Self::new
      (
        ( self.min_x - margin_x ).max( bounds.min_x ),
        ( self.min_y - margin_y ).max( bounds.min_y ),
        ( self.min_z - margin_z ).max( bounds.min_z ),
        ( self.max_x + margin_x ).min( bounds.max_x ),
        ( self.max_y + margin_y ).min( bounds.max_y ),
        ( self.max_z + margin_z ).min( bounds.max_z ),
      )
    }

    /// Projects out the Z axis, keeping the X/Y bounds.
    #[ inline ]
    pub fn xy( &self ) -> Region2D
    {
      Region2D::new( self.min_x, self.min_y, self.max_x, self.max_y )
    }
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;

    #[ test ]
    fn empty_region_has_zero_size()
    {
      assert_eq!( Region2D::EMPTY.size(), 0 );
      assert!( Region2D::EMPTY.is_empty() );
    }

    #[ test ]
    fn inside_of_is_true_for_self()
    {
      let r = Region2D::new( 0, 0, 4, 4 );
      assert!( r.inside_of( &r ).unwrap() );
    }

    #[ test ]
    fn inside_of_on_empty_region_errors()
    {
      let r = Region2D::new( 0, 0, 4, 4 );
      assert!( Region2D::EMPTY.inside_of( &r ).is_err() );
      assert!( r.inside_of( &Region2D::EMPTY ).is_err() );
    }

    #[ test ]
    fn dilate_grows_bounds_and_clamps()
    {
      let bounds = Region2D::new( 0, 0, 10, 10 );
      let r = Region2D::new( 2, 2, 4, 4 );
      let d = r.dilate( 1, 1, &bounds );
      assert_eq!( d, Region2D::new( 1, 1, 5, 5 ) );

      let edge = Region2D::new( 0, 0, 1, 1 );
      let d2 = edge.dilate( 3, 3, &bounds );
      assert_eq!( d2, Region2D::new( 0, 0, 4, 4 ) );
    }

    #[ test ]
    fn dilate_by_zero_is_identity()
    {
      let bounds = Region3D::new( 0, 0, 0, 10, 10, 10 );
      let r = Region3D::new( 2, 2, 2, 4, 4, 4 );
      assert_eq!( r.dilate( 0, 0, 0, &bounds ), r );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    Region2D,
    Region3D,
  };
}
