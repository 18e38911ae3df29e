//!
//! # Grid primitives
//!
//! Dense rectangular 2D/3D arrays with spacing, origin, orientation, and the
//! operations (`crop`, `map`, `paste_onto`, region queries, parallel iteration)
//! every higher-level component builds on.
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };
  use geometry::{ Point2, Point3, Direction2, Direction3 };
  use region::{ Region2D, Region3D };

  /// A dense 2D array of `T`, row-major, with physical spacing/origin/direction.
  #[ derive( Debug, Clone, PartialEq ) ]
  pub struct Grid2D< T >
  {
    dim_x : usize,
    dim_y : usize,
    spacing_x : f64,
    spacing_y : f64,
    origin : Point2,
    direction : Direction2,
    buffer : Vec< T >,
  }

  impl< T > Grid2D< T >
  where
    T : Clone + Default,
  {
    /// Creates a grid of the given dimensions, filled with `T::default()`.
    ///
    /// # Errors
    /// Fails with `InvalidArgument` if either spacing is not positive.
    pub fn new( dim_x : usize, dim_y : usize, spacing_x : f64, spacing_y : f64, origin : Point2, direction : Direction2 ) -> Result< Self >
    {
      if spacing_x <= 0.0 || spacing_y <= 0.0
      {
        return Err( Error::invalid_argument( "grid spacing must be positive" ) );
      }
      Ok( Self
      {
        dim_x, dim_y, spacing_x, spacing_y, origin, direction,
        buffer : vec![ T::default() ; dim_x * dim_y ],
      } )
    }

    /// Creates a grid with the same geometry as `self` but a (possibly
    /// different) element type `U`, filled with `U::default()`.
    pub fn create_same_size< U >( &self ) -> Grid2D< U >
    where
      U : Clone + Default,
    {
      Grid2D
      {
        dim_x : self.dim_x, dim_y : self.dim_y,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y,
        origin : self.origin, direction : self.direction,
        buffer : vec![ U::default() ; self.dim_x * self.dim_y ],
      }
    }
  }

  impl< T > Grid2D< T >
  {
    /// Width in voxels.
    #[ inline ]
    pub fn dim_x( &self ) -> usize { self.dim_x }

    /// Height in voxels.
    #[ inline ]
    pub fn dim_y( &self ) -> usize { self.dim_y }

    /// X spacing, in physical units.
    #[ inline ]
    pub fn spacing_x( &self ) -> f64 { self.spacing_x }

    /// Y spacing, in physical units.
    #[ inline ]
    pub fn spacing_y( &self ) -> f64 { self.spacing_y }

    /// Grid origin, in physical space.
    #[ inline ]
    pub fn origin( &self ) -> Point2 { self.origin }

    /// Direction cosine matrix mapping grid axes to physical axes.
    #[ inline ]
    pub fn direction( &self ) -> Direction2 { self.direction }

    /// Raw flat buffer, row-major : `i = x + y * dim_x`.
    #[ inline ]
    pub fn buffer( &self ) -> &[ T ] { &self.buffer }

    /// Mutable raw flat buffer.
    #[ inline ]
    pub fn buffer_mut( &mut self ) -> &mut [ T ] { &mut self.buffer }

    /// Whether the grid has zero voxels.
    #[ inline ]
    pub fn is_empty( &self ) -> bool { self.dim_x == 0 || self.dim_y == 0 }

    /// The full in-bounds region of this grid.
    #[ inline ]
    pub fn full_region( &self ) -> Region2D
    {
      if self.is_empty()
      {
        return Region2D::EMPTY;
      }
      Region2D::new( 0, 0, self.dim_x as i64 - 1, self.dim_y as i64 - 1 )
    }

    /// Row-major linear index for `(x, y)`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `(x, y)` falls outside the grid.
    #[ inline ]
    pub fn linear_index( &self, x : i64, y : i64 ) -> Result< usize >
    {
      if x < 0 || y < 0 || x as usize >= self.dim_x || y as usize >= self.dim_y
      {
        return Err( Error::out_of_range( format!( "({x}, {y}) outside grid {}x{}", self.dim_x, self.dim_y ) ) );
      }
      Ok( x as usize + y as usize * self.dim_x )
    }

    /// Inverse of `linear_index` : recovers `(x, y)` from a flat index.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `i` is not a valid index into the buffer.
    #[ inline ]
    pub fn coordinates( &self, i : usize ) -> Result< ( i64, i64 ) >
    {
      if i >= self.buffer.len()
      {
        return Err( Error::out_of_range( format!( "index {i} outside buffer of length {}", self.buffer.len() ) ) );
      }
      let y = i / self.dim_x;
      let x = i % self.dim_x;
      Ok( ( x as i64, y as i64 ) )
    }

    /// Reads the element at `(x, y)`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `(x, y)` falls outside the grid.
    #[ inline ]
    pub fn get( &self, x : i64, y : i64 ) -> Result< &T >
    {
      let i = self.linear_index( x, y )?;
      Ok( &self.buffer[ i ] )
    }

    /// Writes the element at `(x, y)`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `(x, y)` falls outside the grid.
    #[ inline ]
    pub fn set( &mut self, x : i64, y : i64, value : T ) -> Result< () >
    {
      let i = self.linear_index( x, y )?;
      self.buffer[ i ] = value;
      Ok( () )
    }

    /// Converts a grid-index point to physical space, honouring spacing,
    /// origin and direction.
    pub fn index_to_physical( &self, x : f64, y : f64 ) -> Point2
    {
      let ( dx, dy ) = self.direction.apply( x * self.spacing_x, y * self.spacing_y );
      Point2::new( self.origin.x + dx, self.origin.y + dy )
    }
  }

  impl< T > Grid2D< T >
  where
    T : Clone,
  {
    /// Extracts the sub-grid covering `region`, translating the origin by the
    /// region's minimum voxel.
    ///
    /// # Errors
    /// Fails with `InvalidArgument` if `region` is empty or not inside the grid.
    pub fn crop( &self, region : &Region2D ) -> Result< Self >
    {
      if region.is_empty() || region.inside_of( &self.full_region() ) != Ok( true )
      {
        return Err( Error::invalid_argument( "crop region is empty or outside the grid" ) );
      }
      let new_dim_x = ( region.max_x - region.min_x + 1 ) as usize;
      let new_dim_y = ( region.max_y - region.min_y + 1 ) as usize;
      let mut buffer = Vec::with_capacity( new_dim_x * new_dim_y );
      for y in region.min_y..=region.max_y
      {
        for x in region.min_x..=region.max_x
        {
          buffer.push( self.get( x, y )?.clone() );
        }
      }
      let origin = self.index_to_physical( region.min_x as f64, region.min_y as f64 );
      Ok( Self
      {
        dim_x : new_dim_x, dim_y : new_dim_y,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y,
        origin, direction : self.direction,
        buffer,
      } )
    }

    /// Copies `self`'s buffer onto `dest`, anchored at `(start_x, start_y)` in
    /// `dest`'s index space. Only the intersection of `self` and `dest` (the
    /// anchor may place part or all of `self` outside `dest`) is copied.
    pub fn paste_onto( &self, dest : &mut Self, start_x : i64, start_y : i64 )
    {
      for sy in 0..self.dim_y as i64
      {
        let dy = start_y + sy;
        if dy < 0 || dy as usize >= dest.dim_y
        {
          continue;
        }
        for sx in 0..self.dim_x as i64
        {
          let dx = start_x + sx;
          if dx < 0 || dx as usize >= dest.dim_x
          {
            continue;
          }
          let value = self.get( sx, sy ).expect( "sx, sy are within self by construction" ).clone();
          dest.set( dx, dy, value ).expect( "dx, dy checked above" );
        }
      }
    }
  }

  impl< T > Grid2D< T >
  {
    /// Builds a new grid of (possibly different) element type `U` by applying
    /// `f` to every element.
    pub fn map< U >( &self, f : impl Fn( &T ) -> U ) -> Grid2D< U >
    {
      Grid2D
      {
        dim_x : self.dim_x, dim_y : self.dim_y,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y,
        origin : self.origin, direction : self.direction,
        buffer : self.buffer.iter().map( f ).collect(),
      }
    }

    /// As `map`, but `f` also receives the `(x, y)` of each element.
    pub fn map_indexed< U >( &self, f : impl Fn( i64, i64, &T ) -> U ) -> Grid2D< U >
    {
      let mut buffer = Vec::with_capacity( self.buffer.len() );
      for y in 0..self.dim_y as i64
      {
        for x in 0..self.dim_x as i64
        {
          buffer.push( f( x, y, &self.buffer[ x as usize + y as usize * self.dim_x ] ) );
        }
      }
      Grid2D
      {
        dim_x : self.dim_x, dim_y : self.dim_y,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y,
        origin : self.origin, direction : self.direction,
        buffer,
      }
    }
  }

  impl< T > Grid2D< T >
  where
    T : PartialOrd + Copy,
  {
    /// Smallest region enclosing every voxel `>= threshold` ; the canonical
    /// empty region if none meet the threshold.
    pub fn interest_region( &self, threshold : T ) -> Region2D
    {
      let mut min_x = i64::MAX;
      let mut min_y = i64::MAX;
      let mut max_x = i64::MIN;
      let mut max_y = i64::MIN;
      for y in 0..self.dim_y as i64
      {
        for x in 0..self.dim_x as i64
        {
          if self.buffer[ x as usize + y as usize * self.dim_x ] >= threshold
          {
            min_x = min_x.min( x ); max_x = max_x.max( x );
            min_y = min_y.min( y ); max_y = max_y.max( y );
          }
        }
      }
      if max_x < min_x
      {
        Region2D::EMPTY
      }
      else
      {
        Region2D::new( min_x, min_y, max_x, max_y )
      }
    }
  }

  impl< T > Grid2D< T >
  where
    T : PartialEq + Copy,
  {
    /// Bounding box of all voxels equal to `foreground`.
    #[ inline ]
    pub fn bounding_box( &self, foreground : T ) -> Region2D
    {
      let mut min_x = i64::MAX;
      let mut min_y = i64::MAX;
      let mut max_x = i64::MIN;
      let mut max_y = i64::MIN;
      for y in 0..self.dim_y as i64
      {
        for x in 0..self.dim_x as i64
        {
          if self.buffer[ x as usize + y as usize * self.dim_x ] == foreground
          {
            min_x = min_x.min( x ); max_x = max_x.max( x );
            min_y = min_y.min( y ); max_y = max_y.max( y );
          }
        }
      }
      if max_x < min_x
      {
        Region2D::EMPTY
      }
      else
      {
        Region2D::new( min_x, min_y, max_x, max_y )
      }
    }
  }

  impl< T > Grid2D< T >
  where
    T : Send + Sync,
  {
    /// Invokes `action` on every `(x, y, &mut value)`, with rows distributed
    /// across the collaborator thread pool when `parallel` is enabled.
    pub fn parallel_iterate( &mut self, action : impl Fn( i64, i64, &mut T ) + Sync )
    {
      let dim_x = self.dim_x;
      #[ cfg( feature = "parallel" ) ]
      {
        use rayon::prelude::*;
        self.buffer.par_chunks_mut( dim_x.max( 1 ) ).enumerate().for_each( | ( y, row ) |
        {
          for ( x, value ) in row.iter_mut().enumerate()
          {
            action( x as i64, y as i64, value );
          }
        } );
      }
      #[ cfg( not( feature = "parallel" ) ) ]
      {
        for ( i, value ) in self.buffer.iter_mut().enumerate()
        {
          let x = ( i % dim_x ) as i64;
          let y = ( i / dim_x ) as i64;
          action( x, y, value );
        }
      }
    }
  }

  /// A dense 3D array of `T`, row-major : `i = x + y * dim_x + z * dim_x * dim_y`.
  #[ derive( Debug, Clone, PartialEq ) ]
  pub struct Grid3D< T >
  {
    dim_x : usize,
    dim_y : usize,
    dim_z : usize,
    spacing_x : f64,
    spacing_y : f64,
    spacing_z : f64,
    origin : Point3,
    direction : Direction3,
    buffer : Vec< T >,
  }

  impl< T > Grid3D< T >
  where
    T : Clone + Default,
  {
    /// Creates a grid of the given dimensions, filled with `T::default()`.
    ///
    /// # Errors
    /// Fails with `InvalidArgument` if any spacing is not positive.
    pub fn new
    (
      dim_x : usize, dim_y : usize, dim_z : usize,
      spacing_x : f64, spacing_y : f64, spacing_z : f64,
      origin : Point3, direction : Direction3,
    ) -> Result< Self >
    {
      if spacing_x <= 0.0 || spacing_y <= 0.0 || spacing_z <= 0.0
      {
        return Err( Error::invalid_argument( "grid spacing must be positive" ) );
      }
      Ok( Self
      {
        dim_x, dim_y, dim_z, spacing_x, spacing_y, spacing_z, origin, direction,
        buffer : vec![ T::default() ; dim_x * dim_y * dim_z ],
      } )
    }

    /// Creates a grid with the same geometry as `self` but element type `U`.
    pub fn create_same_size< U >( &self ) -> Grid3D< U >
    where
      U : Clone + Default,
    {
      Grid3D
      {
        dim_x : self.dim_x, dim_y : self.dim_y, dim_z : self.dim_z,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y, spacing_z : self.spacing_z,
        origin : self.origin, direction : self.direction,
        buffer : vec![ U::default() ; self.dim_x * self.dim_y * self.dim_z ],
      }
    }
  }

  impl< T > Grid3D< T >
  {
    /// Width in voxels.
    #[ inline ]
    pub fn dim_x( &self ) -> usize { self.dim_x }
    /// Height in voxels.
    #[ inline ]
    pub fn dim_y( &self ) -> usize { self.dim_y }
    /// Depth in voxels.
    #[ inline ]
    pub fn dim_z( &self ) -> usize { self.dim_z }
    /// X spacing, in physical units.
    #[ inline ]
    pub fn spacing_x( &self ) -> f64 { self.spacing_x }
    /// Y spacing, in physical units.
    #[ inline ]
    pub fn spacing_y( &self ) -> f64 { self.spacing_y }
    /// Z spacing, in physical units.
    #[ inline ]
    pub fn spacing_z( &self ) -> f64 { self.spacing_z }
    /// Grid origin, in physical space.
    #[ inline ]
    pub fn origin( &self ) -> Point3 { self.origin }
    /// Direction cosine matrix mapping grid axes to physical axes.
    #[ inline ]
    pub fn direction( &self ) -> Direction3 { self.direction }
    /// Raw flat buffer, row-major : `i = x + y * dim_x + z * dim_x * dim_y`.
    #[ inline ]
    pub fn buffer( &self ) -> &[ T ] { &self.buffer }
    /// Mutable raw flat buffer.
    #[ inline ]
    pub fn buffer_mut( &mut self ) -> &mut [ T ] { &mut self.buffer }
    /// Whether the grid has zero voxels.
    #[ inline ]
    pub fn is_empty( &self ) -> bool { self.dim_x == 0 || self.dim_y == 0 || self.dim_z == 0 }

    /// The full in-bounds region of this grid.
    #[ inline ]
    pub fn full_region( &self ) -> Region3D
    {
      if self.is_empty()
      {
        return Region3D::EMPTY;
      }
      Region3D::new( 0, 0, 0, self.dim_x as i64 - 1, self.dim_y as i64 - 1, self.dim_z as i64 - 1 )
    }

    /// Row-major linear index for `(x, y, z)`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `(x, y, z)` falls outside the grid.
    #[ inline ]
    pub fn linear_index( &self, x : i64, y : i64, z : i64 ) -> Result< usize >
    {
      if x < 0 || y < 0 || z < 0
      || x as usize >= self.dim_x || y as usize >= self.dim_y || z as usize >= self.dim_z
      {
        return Err( Error::out_of_range( format!( "({x}, {y}, {z}) outside grid {}x{}x{}", self.dim_x, self.dim_y, self.dim_z ) ) );
      }
      Ok( x as usize + y as usize * self.dim_x + z as usize * self.dim_x * self.dim_y )
    }

    /// Inverse of `linear_index`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `i` is not a valid index into the buffer.
    #[ inline ]
    pub fn coordinates( &self, i : usize ) -> Result< ( i64, i64, i64 ) >
    {
      if i >= self.buffer.len()
      {
        return Err( Error::out_of_range( format!( "index {i} outside buffer of length {}", self.buffer.len() ) ) );
      }
      let plane = self.dim_x * self.dim_y;
      let z = i / plane;
      let rem = i % plane;
      let y = rem / self.dim_x;
      let x = rem % self.dim_x;
      Ok( ( x as i64, y as i64, z as i64 ) )
    }

    /// Reads the element at `(x, y, z)`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `(x, y, z)` falls outside the grid.
    #[ inline ]
    pub fn get( &self, x : i64, y : i64, z : i64 ) -> Result< &T >
    {
      let i = self.linear_index( x, y, z )?;
      Ok( &self.buffer[ i ] )
    }

    /// Writes the element at `(x, y, z)`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `(x, y, z)` falls outside the grid.
    #[ inline ]
    pub fn set( &mut self, x : i64, y : i64, z : i64, value : T ) -> Result< () >
    {
      let i = self.linear_index( x, y, z )?;
      self.buffer[ i ] = value;
      Ok( () )
    }

    /// Converts a grid-index point to physical space, honouring spacing,
    /// origin and direction.
    pub fn index_to_physical( &self, x : f64, y : f64, z : f64 ) -> Point3
    {
      let ( dx, dy, dz ) = self.direction.apply( x * self.spacing_x, y * self.spacing_y, z * self.spacing_z );
      Point3::new( self.origin.x + dx, self.origin.y + dy, self.origin.z + dz )
    }
  }

  impl< T > Grid3D< T >
  where
    T : Clone,
  {
    /// Extracts the sub-grid covering `region`, translating the origin by the
    /// region's minimum voxel.
    ///
    /// # Errors
    /// Fails with `InvalidArgument` if `region` is empty or not inside the grid.
    pub fn crop( &self, region : &Region3D ) -> Result< Self >
    {
      if region.is_empty() || region.inside_of( &self.full_region() ) != Ok( true )
      {
        return Err( Error::invalid_argument( "crop region is empty or outside the grid" ) );
      }
      let new_dim_x = ( region.max_x - region.min_x + 1 ) as usize;
      let new_dim_y = ( region.max_y - region.min_y + 1 ) as usize;
      let new_dim_z = ( region.max_z - region.min_z + 1 ) as usize;
      let mut buffer = Vec::with_capacity( new_dim_x * new_dim_y * new_dim_z );
      for z in region.min_z..=region.max_z
      {
        for y in region.min_y..=region.max_y
        {
          for x in region.min_x..=region.max_x
          {
            buffer.push( self.get( x, y, z )?.clone() );
          }
        }
      }
      let origin = self.index_to_physical( region.min_x as f64, region.min_y as f64, region.min_z as f64 );
      Ok( Self
      {
        dim_x : new_dim_x, dim_y : new_dim_y, dim_z : new_dim_z,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y, spacing_z : self.spacing_z,
        origin, direction : self.direction,
        buffer,
      } )
    }

    /// Copies `self`'s buffer onto `dest`, anchored at `(start_x, start_y, start_z)`.
    /// Only the intersection is copied ; the anchor may place part of `self`
    /// outside `dest`, including a negative start.
    pub fn paste_onto( &self, dest : &mut Self, start_x : i64, start_y : i64, start_z : i64 )
    {
      for sz in 0..self.dim_z as i64
      {
        let dz = start_z + sz;
        if dz < 0 || dz as usize >= dest.dim_z
        {
          continue;
        }
        for sy in 0..self.dim_y as i64
        {
          let dy = start_y + sy;
          if dy < 0 || dy as usize >= dest.dim_y
          {
            continue;
          }
          for sx in 0..self.dim_x as i64
          {
            let dx = start_x + sx;
            if dx < 0 || dx as usize >= dest.dim_x
            {
              continue;
            }
            let value = self.get( sx, sy, sz ).expect( "sx, sy, sz are within self by construction" ).clone();
            dest.set( dx, dy, dz, value ).expect( "dx, dy, dz checked above" );
          }
        }
      }
    }
  }

  impl< T > Grid3D< T >
  {
    /// Builds a new grid of (possibly different) element type `U` by applying
    /// `f` to every element.
    pub fn map< U >( &self, f : impl Fn( &T ) -> U ) -> Grid3D< U >
    {
      Grid3D
      {
        dim_x : self.dim_x, dim_y : self.dim_y, dim_z : self.dim_z,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y, spacing_z : self.spacing_z,
        origin : self.origin, direction : self.direction,
        buffer : self.buffer.iter().map( f ).collect(),
      }
    }

    /// As `map`, but `f` also receives the `(x, y, z)` of each element.
    pub fn map_indexed< U >( &self, f : impl Fn( i64, i64, i64, &T ) -> U ) -> Grid3D< U >
    {
      let plane = self.dim_x * self.dim_y;
      let mut buffer = Vec::with_capacity( self.buffer.len() );
      for z in 0..self.dim_z as i64
      {
        for y in 0..self.dim_y as i64
        {
          for x in 0..self.dim_x as i64
          {
            let i = x as usize + y as usize * self.dim_x + z as usize * plane;
            buffer.push( f( x, y, z, &self.buffer[ i ] ) );
          }
        }
      }
      Grid3D
      {
        dim_x : self.dim_x, dim_y : self.dim_y, dim_z : self.dim_z,
        spacing_x : self.spacing_x, spacing_y : self.spacing_y, spacing_z : self.spacing_z,
        origin : self.origin, direction : self.direction,
        buffer,
      }
    }
  }

  impl< T > Grid3D< T >
  where
    T : PartialOrd + Copy,
  {
    /// Smallest region enclosing every voxel `>= threshold` ; the canonical
    /// empty region if none meet the threshold.
    pub fn interest_region( &self, threshold : T ) -> Region3D
    {
      let mut min = ( i64::MAX, i64::MAX, i64::MAX );
      let mut max = ( i64::MIN, i64::MIN, i64::MIN );
      let plane = self.dim_x * self.dim_y;
      for z in 0..self.dim_z as i64
      {
        for y in 0..self.dim_y as i64
        {
          for x in 0..self.dim_x as i64
          {
            let i = x as usize + y as usize * self.dim_x + z as usize * plane;
            if self.buffer[ i ] >= threshold
            {
              min = ( min.0.min( x ), min.1.min( y ), min.2.min( z ) );
              max = ( max.0.max( x ), max.1.max( y ), max.2.max( z ) );
            }
          }
        }
      }
      if max.0 < min.0
      {
        Region3D::EMPTY
      }
      else
      {
        Region3D::new( min.0, min.1, min.2, max.0, max.1, max.2 )
      }
    }
  }

  impl< T > Grid3D< T >
  where
    T : PartialEq + Copy,
  {
    /// Bounding box of all voxels equal to `foreground`.
    pub fn bounding_box( &self, foreground : T ) -> Region3D
    {
      let mut min = ( i64::MAX, i64::MAX, i64::MAX );
      let mut max = ( i64::MIN, i64::MIN, i64::MIN );
      let plane = self.dim_x * self.dim_y;
      for z in 0..self.dim_z as i64
      {
        for y in 0..self.dim_y as i64
        {
          for x in 0..self.dim_x as i64
          {
            let i = x as usize + y as usize * self.dim_x + z as usize * plane;
            if self.buffer[ i ] == foreground
            {
              min = ( min.0.min( x ), min.1.min( y ), min.2.min( z ) );
              max = ( max.0.max( x ), max.1.max( y ), max.2.max( z ) );
            }
          }
        }
      }
      if max.0 < min.0
      {
        Region3D::EMPTY
      }
      else
      {
        Region3D::new( min.0, min.1, min.2, max.0, max.1, max.2 )
      }
    }
  }

  impl< T > Grid3D< T >
  where
    T : Send + Sync,
  {
    /// Invokes `action` on every `(x, y, z, &mut value)`, with Z slices
    /// distributed across the collaborator thread pool when `parallel` is
    /// enabled.
    pub fn parallel_iterate_slices( &mut self, action : impl Fn( i64, i64, i64, &mut T ) + Sync )
    {
      let dim_x = self.dim_x;
      let dim_y = self.dim_y;
      let plane = dim_x * dim_y;
      #[ cfg( feature = "parallel" ) ]
      {
        use rayon::prelude::*;
        self.buffer.par_chunks_mut( plane.max( 1 ) ).enumerate().for_each( | ( z, slice ) |
        {
          for ( i, value ) in slice.iter_mut().enumerate()
          {
            let x = ( i % dim_x ) as i64;
            let y = ( i / dim_x ) as i64;
            action( x, y, z as i64, value );
          }
        } );
      }
      #[ cfg( not( feature = "parallel" ) ) ]
      {
        for ( i, value ) in self.buffer.iter_mut().enumerate()
        {
          let z = ( i / plane ) as i64;
          let rem = i % plane;
          let x = ( rem % dim_x ) as i64;
          let y = ( rem / dim_x ) as i64;
          action( x, y, z, value );
        }
      }
    }
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;

    fn identity2() -> Direction2
    {
      Direction2::identity()
    }

    #[ test ]
    fn new_grid_has_product_buffer_length()
    {
      let g = Grid2D::< u8 >::new( 4, 3, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      assert_eq!( g.buffer().len(), 12 );
    }

    #[ test ]
    fn linear_index_roundtrips_with_coordinates()
    {
      let g = Grid2D::< u8 >::new( 5, 7, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      for y in 0..7
      {
        for x in 0..5
        {
          let i = g.linear_index( x, y ).unwrap();
          assert_eq!( g.coordinates( i ).unwrap(), ( x, y ) );
        }
      }
    }

    #[ test ]
    fn out_of_range_index_errors()
    {
      let g = Grid2D::< u8 >::new( 2, 2, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      assert!( g.get( 2, 0 ).is_err() );
      assert!( g.get( -1, 0 ).is_err() );
    }

    #[ test ]
    fn crop_translates_origin_and_copies_values()
    {
      let mut g = Grid2D::< u8 >::new( 4, 4, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      for y in 0..4
      {
        for x in 0..4
        {
          g.set( x, y, ( x + y * 4 ) as u8 ).unwrap();
        }
      }
      let region = Region2D::new( 1, 1, 2, 2 );
      let cropped = g.crop( &region ).unwrap();
      assert_eq!( cropped.dim_x(), 2 );
      assert_eq!( cropped.dim_y(), 2 );
      assert_eq!( *cropped.get( 0, 0 ).unwrap(), *g.get( 1, 1 ).unwrap() );
      assert_eq!( cropped.origin(), Point2::new( 1.0, 1.0 ) );
    }

    #[ test ]
    fn paste_onto_clips_negative_and_overflowing_anchors()
    {
      let mut src = Grid2D::< u8 >::new( 3, 3, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      for i in 0..9 { src.buffer_mut()[ i ] = 1; }
      let mut dest = Grid2D::< u8 >::new( 2, 2, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      src.paste_onto( &mut dest, -1, -1 );
      // only src's (1,1)..(2,2) land inside dest's (0,0)..(1,1)
      assert_eq!( *dest.get( 0, 0 ).unwrap(), 1 );
      assert_eq!( *dest.get( 1, 1 ).unwrap(), 1 );
    }

    #[ test ]
    fn bounding_box_is_empty_region_without_foreground()
    {
      let g = Grid2D::< u8 >::new( 3, 3, 1.0, 1.0, Point2::default(), identity2() ).unwrap();
      assert!( g.bounding_box( 1 ).is_empty() );
    }

    #[ test ]
    fn map_preserves_geometry()
    {
      let g = Grid2D::< u8 >::new( 3, 2, 2.0, 3.0, Point2::new( 1.0, 2.0 ), identity2() ).unwrap();
      let mapped = g.map( | v | i32::from( *v ) + 1 );
      assert_eq!( mapped.dim_x(), 3 );
      assert_eq!( mapped.dim_y(), 2 );
      assert_eq!( mapped.spacing_x(), 2.0 );
      assert_eq!( mapped.origin(), Point2::new( 1.0, 2.0 ) );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    Grid2D,
    Grid3D,
  };
}
