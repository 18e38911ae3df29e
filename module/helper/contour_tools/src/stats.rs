//!
//! # Contour statistics
//!
//! Mean, standard deviation and physical volume of an image's foreground
//! voxels, accumulated with Welford's online algorithm so the running
//! variance never needs to subtract two large sums (the catastrophic
//! cancellation a naive two-pass mean/variance computation suffers from).
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };
  use grid::Grid3D;

  /// Summary statistics of an image restricted to a mask's foreground voxels
  /// .
  #[ derive( Debug, Clone, Copy, PartialEq ) ]
  pub struct Stats
  {
    /// Arithmetic mean of the foreground voxel values.
    pub mean : f64,
    /// Population standard deviation of the foreground voxel values.
    pub std_dev : f64,
    /// Physical volume of the foreground, in cubic centimetres.
    pub volume_cc : f64,
  }

  /// Computes `Stats` over `image`'s voxels wherever `mask` reads `foreground`,
  /// in a single pass using Welford's algorithm (mean and M2 updated
  /// incrementally, variance derived only at the end).
  ///
  /// An all-background mask is legal input : `mean` and `std_dev` both read
  /// `0.0` and `volume_cc` reads `0.0`, rather than failing.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if `image` and `mask` have different
  /// dimensions.
  pub fn compute( image : &Grid3D< f64 >, mask : &Grid3D< u8 >, foreground : u8 ) -> Result< Stats >
  {
    if ( image.dim_x(), image.dim_y(), image.dim_z() ) != ( mask.dim_x(), mask.dim_y(), mask.dim_z() )
    {
      return Err( Error::invalid_argument( "stats::compute requires image and mask to share dimensions" ) );
    }

    let mut count = 0_u64;
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;

    for z in 0..mask.dim_z() as i64
    {
      for y in 0..mask.dim_y() as i64
      {
        for x in 0..mask.dim_x() as i64
        {
          if *mask.get( x, y, z )? != foreground
          {
            continue;
          }
          let value = *image.get( x, y, z )?;
          count += 1;
          let delta = value - mean;
          mean += delta / count as f64;
          let delta2 = value - mean;
          m2 += delta * delta2;
        }
      }
    }

    if count == 0
    {
      return Ok( Stats { mean : 0.0, std_dev : 0.0, volume_cc : 0.0 } );
    }

    let variance = m2 / count as f64;
    let voxel_volume_mm3 = mask.spacing_x() * mask.spacing_y() * mask.spacing_z();
    let volume_cc = count as f64 * voxel_volume_mm3 / 1000.0;

    Ok( Stats { mean, std_dev : variance.sqrt(), volume_cc } )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::{ Direction3, Point3 };

    fn grids( values : &[ f64 ], mask_values : &[ u8 ] ) -> ( Grid3D< f64 >, Grid3D< u8 > )
    {
      let mut image = Grid3D::< f64 >::new( 4, 1, 1, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
      let mut mask = Grid3D::< u8 >::new( 4, 1, 1, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
      for ( i, &v ) in values.iter().enumerate()
      {
        image.set( i as i64, 0, 0, v ).unwrap();
      }
      for ( i, &v ) in mask_values.iter().enumerate()
      {
        mask.set( i as i64, 0, 0, v ).unwrap();
      }
      ( image, mask )
    }

    #[ test ]
    fn mean_and_std_dev_of_known_values()
    {
      // Foreground values {20, 0, 0, 20} : mean 10, population std dev 10.
      let ( image, mask ) = grids( &[ 20.0, 0.0, 0.0, 20.0 ], &[ 1, 1, 1, 1 ] );
      let stats = compute( &image, &mask, 1 ).unwrap();
      assert!( ( stats.mean - 10.0 ).abs() < 1e-9 );
      assert!( ( stats.std_dev - 10.0 ).abs() < 1e-9 );
    }

    #[ test ]
    fn volume_cc_scales_with_spacing_and_count()
    {
      let mut image = Grid3D::< f64 >::new( 2, 2, 2, 2.0, 2.0, 2.0, Point3::default(), Direction3::identity() ).unwrap();
      let mut mask = Grid3D::< u8 >::new( 2, 2, 2, 2.0, 2.0, 2.0, Point3::default(), Direction3::identity() ).unwrap();
      for z in 0..2
      {
        for y in 0..2
        {
          for x in 0..2
          {
            image.set( x, y, z, 1.0 ).unwrap();
            mask.set( x, y, z, 1 ).unwrap();
          }
        }
      }
      let stats = compute( &image, &mask, 1 ).unwrap();
      // 8 voxels * 8 mm^3 each = 64 mm^3 = 0.064 cc.
      assert!( ( stats.volume_cc - 0.064 ).abs() < 1e-9 );
    }

    #[ test ]
    fn mismatched_dimensions_error()
    {
      let image = Grid3D::< f64 >::new( 4, 1, 1, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
      let mask = Grid3D::< u8 >::new( 3, 1, 1, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
      assert!( compute( &image, &mask, 1 ).is_err() );
    }

    #[ test ]
    fn no_foreground_voxels_yields_zeroed_stats()
    {
      let ( image, mask ) = grids( &[ 1.0, 2.0, 3.0, 4.0 ], &[ 0, 0, 0, 0 ] );
      let stats = compute( &image, &mask, 1 ).unwrap();
      assert_eq!( stats.mean, 0.0 );
      assert_eq!( stats.std_dev, 0.0 );
      assert_eq!( stats.volume_cc, 0.0 );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    Stats,
    compute,
  };
}
