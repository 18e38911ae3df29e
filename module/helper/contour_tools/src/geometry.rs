//!
//! # Geometric primitives
//!
//! Small value types shared by every component : fractional 2D points and
//! integer 2D/3D grid coordinates. Kept deliberately plain (no generic CG
//! vector machinery) because `ContourPolygon` point equality is strict
//! (see design notes) and the extractor hashes integer coordinates in tight
//! loops.
//!

mod private
{
  use std::ops::{ Add, Sub, Mul };

  /// A fractional 2D point, in grid-local coordinates.
  #[ derive( Debug, Default, Clone, Copy, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct Point2
  {
    /// X coordinate.
    pub x : f64,
    /// Y coordinate.
    pub y : f64,
  }

  impl Point2
  {
    /// Creates a new point.
    #[ inline ]
    pub fn new( x : f64, y : f64 ) -> Self
    {
      Self { x, y }
    }

    /// Squared Euclidean distance between two points.
    #[ inline ]
    pub fn distance_squared( &self, other : &Self ) -> f64
    {
      let dx = self.x - other.x;
      let dy = self.y - other.y;
      dx * dx + dy * dy
    }

    /// Euclidean distance between two points.
    #[ inline ]
    pub fn distance( &self, other : &Self ) -> f64
    {
      self.distance_squared( other ).sqrt()
    }

    /// Rotates the vector `(x, y)` left by 90 degrees : `(x, y) -> (-y, x)`.
    #[ inline ]
    #[ must_use ]
    pub fn rotate_left( self ) -> Self
    {
      Self::new( -self.y, self.x )
    }

    /// Rotates the vector `(x, y)` right by 90 degrees : `(x, y) -> (y, -x)`.
    #[ inline ]
    #[ must_use ]
    pub fn rotate_right( self ) -> Self
    {
      Self::new( self.y, -self.x )
    }
  }

  impl Add for Point2
  {
    type Output = Self;
    #[ inline ]
    fn add( self, rhs : Self ) -> Self
    {
      Self::new( self.x + rhs.x, self.y + rhs.y )
    }
  }

  impl Sub for Point2
  {
    type Output = Self;
    #[ inline ]
    fn sub( self, rhs : Self ) -> Self
    {
      Self::new( self.x - rhs.x, self.y - rhs.y )
    }
  }

  impl Mul< f64 > for Point2
  {
    type Output = Self;
    #[ inline ]
    fn mul( self, rhs : f64 ) -> Self
    {
      Self::new( self.x * rhs, self.y * rhs )
    }
  }

  impl From< ( i64, i64 ) > for Point2
  {
    #[ inline ]
    fn from( ( x, y ) : ( i64, i64 ) ) -> Self
    {
      Self::new( x as f64, y as f64 )
    }
  }

  /// A fractional 3D point, in physical space.
  #[ derive( Debug, Default, Clone, Copy, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct Point3
  {
    /// X coordinate.
    pub x : f64,
    /// Y coordinate.
    pub y : f64,
    /// Z coordinate.
    pub z : f64,
  }

  impl Point3
  {
    /// Creates a new point.
    #[ inline ]
    pub fn new( x : f64, y : f64, z : f64 ) -> Self
    {
      Self { x, y, z }
    }
  }

  /// A 3x3 direction cosine matrix mapping grid axes to physical axes.
  ///
  /// Row-major ; see `Direction2` for why this is a plain array instead of
  /// `ndarray_cg::Mat3`.
  #[ derive( Debug, Clone, Copy, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct Direction3
  {
    rows : [ [ f64 ; 3 ] ; 3 ],
  }

  impl Direction3
  {
    /// The identity direction : grid axes coincide with physical axes.
    #[ inline ]
    pub fn identity() -> Self
    {
      Self { rows : [ [ 1.0, 0.0, 0.0 ], [ 0.0, 1.0, 0.0 ], [ 0.0, 0.0, 1.0 ] ] }
    }

    /// Builds a direction matrix from explicit row-major entries.
    #[ inline ]
    pub fn from_rows( rows : [ [ f64 ; 3 ] ; 3 ] ) -> Self
    {
      Self { rows }
    }

    /// Applies the matrix to a vector : `self * (x, y, z)`.
    #[ inline ]
    pub fn apply( &self, x : f64, y : f64, z : f64 ) -> ( f64, f64, f64 )
    {
      (
        self.rows[ 0 ][ 0 ] * x + self.rows[ 0 ][ 1 ] * y + self.rows[ 0 ][ 2 ] * z,
        self.rows[ 1 ][ 0 ] * x + self.rows[ 1 ][ 1 ] * y + self.rows[ 1 ][ 2 ] * z,
        self.rows[ 2 ][ 0 ] * x + self.rows[ 2 ][ 1 ] * y + self.rows[ 2 ][ 2 ] * z,
      )
    }

    /// Projects out the row/column belonging to `axis` (0 = X, 1 = Y, 2 = Z),
    /// producing the 2x2 direction for a plane orthogonal to that axis.
    #[ inline ]
    pub fn drop_axis( &self, axis : usize ) -> Direction2
    {
      let keep : Vec< usize > = ( 0..3 ).filter( | &a | a != axis ).collect();
      Direction2::from_rows
      (
        [
          [ self.rows[ keep[ 0 ] ][ keep[ 0 ] ], self.rows[ keep[ 0 ] ][ keep[ 1 ] ] ],
          [ self.rows[ keep[ 1 ] ][ keep[ 0 ] ], self.rows[ keep[ 1 ] ][ keep[ 1 ] ] ],
        ]
      )
    }
  }

  impl Default for Direction3
  {
    #[ inline ]
    fn default() -> Self
    {
      Self::identity()
    }
  }

  /// An integer 2D grid coordinate.
  #[ derive( Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct IVec2
  {
    /// X coordinate.
    pub x : i64,
    /// Y coordinate.
    pub y : i64,
  }

  impl IVec2
  {
    /// Creates a new integer coordinate.
    #[ inline ]
    pub fn new( x : i64, y : i64 ) -> Self
    {
      Self { x, y }
    }
  }

  impl Add for IVec2
  {
    type Output = Self;
    #[ inline ]
    fn add( self, rhs : Self ) -> Self
    {
      Self::new( self.x + rhs.x, self.y + rhs.y )
    }
  }

  impl Sub for IVec2
  {
    type Output = Self;
    #[ inline ]
    fn sub( self, rhs : Self ) -> Self
    {
      Self::new( self.x - rhs.x, self.y - rhs.y )
    }
  }

  impl From< IVec2 > for Point2
  {
    #[ inline ]
    fn from( v : IVec2 ) -> Self
    {
      Self::new( v.x as f64, v.y as f64 )
    }
  }

  /// A 2x2 direction cosine matrix mapping grid axes to physical axes.
  ///
  /// Row-major, applied as `physical = direction * (spacing .* index)`. Kept as
  /// a plain array rather than reusing `ndarray_cg::Mat2` : the retrieved copy
  /// of that crate ships `Mat<_, _, _, DescriptorOrderColumnMajor>` (the type
  /// used for `F64x2x2`/`F64x3x3`) without the `access_column_major` module
  /// that would give it scalar-level indexing, so there is no generic way to
  /// read a row out of it today.
  #[ derive( Debug, Clone, Copy, PartialEq ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct Direction2
  {
    rows : [ [ f64 ; 2 ] ; 2 ],
  }

  impl Direction2
  {
    /// The identity direction : grid axes coincide with physical axes.
    #[ inline ]
    pub fn identity() -> Self
    {
      Self { rows : [ [ 1.0, 0.0 ], [ 0.0, 1.0 ] ] }
    }

    /// Builds a direction matrix from explicit row-major entries.
    #[ inline ]
    pub fn from_rows( rows : [ [ f64 ; 2 ] ; 2 ] ) -> Self
    {
      Self { rows }
    }

    /// Applies the matrix to a vector : `self * (x, y)`.
    #[ inline ]
    pub fn apply( &self, x : f64, y : f64 ) -> ( f64, f64 )
    {
      (
        self.rows[ 0 ][ 0 ] * x + self.rows[ 0 ][ 1 ] * y,
        self.rows[ 1 ][ 0 ] * x + self.rows[ 1 ][ 1 ] * y,
      )
    }
  }

  impl Default for Direction2
  {
    #[ inline ]
    fn default() -> Self
    {
      Self::identity()
    }
  }

  /// An integer 3D grid coordinate.
  #[ derive( Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord ) ]
  #[ cfg_attr( feature = "serde1", derive( serde::Serialize, serde::Deserialize ) ) ]
  pub struct IVec3
  {
    /// X coordinate.
    pub x : i64,
    /// Y coordinate.
    pub y : i64,
    /// Z coordinate.
    pub z : i64,
  }

  impl IVec3
  {
    /// Creates a new integer coordinate.
    #[ inline ]
    pub fn new( x : i64, y : i64, z : i64 ) -> Self
    {
      Self { x, y, z }
    }
  }

  impl Add for IVec3
  {
    type Output = Self;
    #[ inline ]
    fn add( self, rhs : Self ) -> Self
    {
      Self::new( self.x + rhs.x, self.y + rhs.y, self.z + rhs.z )
    }
  }

  impl Sub for IVec3
  {
    type Output = Self;
    #[ inline ]
    fn sub( self, rhs : Self ) -> Self
    {
      Self::new( self.x - rhs.x, self.y - rhs.y, self.z - rhs.z )
    }
  }
}

crate::mod_interface!
{
  own use
  {
    Point2,
    Point3,
    IVec2,
    IVec3,
    Direction2,
    Direction3,
  };
}
