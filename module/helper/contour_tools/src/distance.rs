//!
//! # Euclidean distance transform
//!
//! A two-pass 3x3x3 chamfer distance transform restricted to a region of
//! interest. Implemented once, over `Grid3D`, with the 2D variant a
//! thin wrapper that lifts a `Grid2D` into a depth-1 volume : every offset with
//! a non-zero Z component then always lands outside the ROI's single Z layer
//! and is skipped, so the 3D pass degenerates to the 3x3 neighbourhood for
//! free without a second implementation to keep in sync.
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };
  use geometry::{ Direction3, Point3 };
  use grid::{ Grid2D, Grid3D };
  use region::{ Region2D, Region3D };

  /// The 26 non-zero offsets of a 3x3x3 neighbourhood, plus the physical
  /// distance each represents once scaled by spacing.
  fn offsets( spacing_x : f64, spacing_y : f64, spacing_z : f64 ) -> Vec< ( i64, i64, i64, f64 ) >
  {
    let mut out = Vec::with_capacity( 26 );
    for dz in -1_i64..=1
    {
      for dy in -1_i64..=1
      {
        for dx in -1_i64..=1
        {
          if dx == 0 && dy == 0 && dz == 0
          {
            continue;
          }
          let len = ( ( dx as f64 * spacing_x ).powi( 2 ) + ( dy as f64 * spacing_y ).powi( 2 ) + ( dz as f64 * spacing_z ).powi( 2 ) ).sqrt();
          out.push( ( dx, dy, dz, len ) );
        }
      }
    }
    out
  }

  /// Whether `(dx, dy, dz)` comes before the origin in raster scan order
  /// (ascending Z, then Y, then X) — the "past" half of the neighbourhood the
  /// forward pass reads from.
  #[ inline ]
  fn is_past( dx : i64, dy : i64, dz : i64 ) -> bool
  {
    ( dz, dy, dx ) < ( 0, 0, 0 )
  }

  /// Runs `iterations` forward+backward chamfer sweeps over `dist`, confined
  /// to `roi`, using the offset/distance pairs of `offsets`.
  fn chamfer_sweeps( dist : &mut Grid3D< f64 >, roi : &Region3D, offsets : &[ ( i64, i64, i64, f64 ) ], iterations : u32 )
  {
    let past : Vec< _ > = offsets.iter().copied().filter( | &( dx, dy, dz, _ ) | is_past( dx, dy, dz ) ).collect();
    let future : Vec< _ > = past.iter().map( | &( dx, dy, dz, len ) | ( -dx, -dy, -dz, len ) ).collect();

    for _ in 0..iterations.max( 1 )
    {
      for z in roi.min_z..=roi.max_z
      {
        for y in roi.min_y..=roi.max_y
        {
          for x in roi.min_x..=roi.max_x
          {
            relax( dist, roi, x, y, z, &past );
          }
        }
      }
      for z in ( roi.min_z..=roi.max_z ).rev()
      {
        for y in ( roi.min_y..=roi.max_y ).rev()
        {
          for x in ( roi.min_x..=roi.max_x ).rev()
          {
            relax( dist, roi, x, y, z, &future );
          }
        }
      }
    }
  }

  fn relax( dist : &mut Grid3D< f64 >, roi : &Region3D, x : i64, y : i64, z : i64, offsets : &[ ( i64, i64, i64, f64 ) ] )
  {
    let mut best = *dist.get( x, y, z ).expect( "(x,y,z) is within roi, which is within the grid" );
    for &( dx, dy, dz, len ) in offsets
    {
      let ( nx, ny, nz ) = ( x + dx, y + dy, z + dz );
      if !roi.contains( nx, ny, nz )
      {
        continue;
      }
      let candidate = *dist.get( nx, ny, nz ).expect( "checked by roi.contains" ) + len;
      if candidate < best
      {
        best = candidate;
      }
    }
    dist.set( x, y, z, best ).expect( "(x,y,z) is within roi, which is within the grid" );
  }

  /// Computes the chamfer distance-to-foreground transform of `mask` over
  /// `roi`, repeating the forward/backward sweep `iterations` times (`0`
  /// behaves as `1`). Voxels outside `roi` keep their initial value and should
  /// not be read by the caller.
  ///
  /// # Errors
  /// Fails with `OutOfRange` if `roi` is not inside `mask` (an empty `roi`
  /// defaults to the mask's full region instead of failing).
  pub fn distance_transform( mask : &Grid3D< u8 >, foreground : u8, roi : &Region3D, iterations : u32 ) -> Result< Grid3D< f64 > >
  {
    let full = mask.full_region();
    let roi = if roi.is_empty() { full } else { *roi };
    if roi.inside_of( &full ) != Ok( true )
    {
      return Err( Error::out_of_range( "distance transform roi is not inside the mask" ) );
    }

    let mut dist = mask.map( | &v | if v == foreground { 0.0 } else { f64::INFINITY } );
    let table = offsets( mask.spacing_x(), mask.spacing_y(), mask.spacing_z() );
    chamfer_sweeps( &mut dist, &roi, &table, iterations );
    Ok( dist )
  }

  /// 2D counterpart of `distance_transform`, implemented by lifting `mask`
  /// into a depth-1 `Grid3D` and dropping back to a plane afterwards.
  ///
  /// # Errors
  /// See `distance_transform`.
  pub fn distance_transform_2d( mask : &Grid2D< u8 >, foreground : u8, roi : &Region2D, iterations : u32 ) -> Result< Grid2D< f64 > >
  {
    let mut volume = Grid3D::< u8 >::new
    (
      mask.dim_x(), mask.dim_y(), 1,
      mask.spacing_x(), mask.spacing_y(), 1.0,
      Point3::new( mask.origin().x, mask.origin().y, 0.0 ), Direction3::identity(),
    )?;
    for y in 0..mask.dim_y() as i64
    {
      for x in 0..mask.dim_x() as i64
      {
        volume.set( x, y, 0, *mask.get( x, y )? )?;
      }
    }
    let roi3 = if roi.is_empty()
    {
      Region3D::EMPTY
    }
    else
    {
      Region3D::new( roi.min_x, roi.min_y, 0, roi.max_x, roi.max_y, 0 )
    };
    let dist3 = distance_transform( &volume, foreground, &roi3, iterations )?;

    let mut out = Grid2D::< f64 >::new( mask.dim_x(), mask.dim_y(), mask.spacing_x(), mask.spacing_y(), mask.origin(), mask.direction() )?;
    for y in 0..mask.dim_y() as i64
    {
      for x in 0..mask.dim_x() as i64
      {
        out.set( x, y, *dist3.get( x, y, 0 )? )?;
      }
    }
    Ok( out )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::{ Direction2, Point2 };

    fn mask_with_center_fg( dim : usize ) -> Grid2D< u8 >
    {
      let mut g = Grid2D::< u8 >::new( dim, dim, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
      let c = dim as i64 / 2;
      g.set( c, c, 1 ).unwrap();
      g
    }

    #[ test ]
    fn foreground_voxel_has_zero_distance()
    {
      let mask = mask_with_center_fg( 5 );
      let dist = distance_transform_2d( &mask, 1, &Region2D::EMPTY, 1 ).unwrap();
      assert_eq!( *dist.get( 2, 2 ).unwrap(), 0.0 );
    }

    #[ test ]
    fn axis_neighbour_distance_equals_spacing()
    {
      let mask = mask_with_center_fg( 5 );
      let dist = distance_transform_2d( &mask, 1, &Region2D::EMPTY, 1 ).unwrap();
      assert!( ( *dist.get( 3, 2 ).unwrap() - 1.0 ).abs() < 1e-9 );
    }

    #[ test ]
    fn diagonal_distance_is_sqrt_two_scaled_by_spacing()
    {
      let mut g = Grid2D::< u8 >::new( 5, 5, 2.0, 3.0, Point2::default(), Direction2::identity() ).unwrap();
      g.set( 2, 2, 1 ).unwrap();
      let dist = distance_transform_2d( &g, 1, &Region2D::EMPTY, 1 ).unwrap();
      let expected = ( 4.0_f64 + 9.0 ).sqrt();
      assert!( ( *dist.get( 3, 3 ).unwrap() - expected ).abs() < 1e-6 );
    }

    #[ test ]
    fn roi_outside_mask_errors()
    {
      let mask = mask_with_center_fg( 5 );
      let bad_roi = Region2D::new( 0, 0, 10, 10 );
      assert!( distance_transform_2d( &mask, 1, &bad_roi, 1 ).is_err() );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    distance_transform,
    distance_transform_2d,
  };
}
