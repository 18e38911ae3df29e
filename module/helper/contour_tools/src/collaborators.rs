//!
//! # Collaborator seams
//!
//! Named traits the rest of the crate is written against instead of calling
//! `rayon` directly everywhere, so a caller embedding this crate in a context
//! with its own thread pool (or none at all) can swap the implementation in
//! one place (no concrete concurrency API is mandated).
//!

mod private
{
  use crate::*;
  use geometry::Direction2;
  use grid::Grid2D;

  /// Runs an index-indexed action over `0..len`, in parallel or not depending
  /// on the implementation.
  pub trait ParallelFor : Send + Sync
  {
    /// Invokes `action(i)` for every `i` in `0..len`. Implementations may run
    /// these concurrently ; `action` must tolerate being called from any
    /// thread and in any order.
    fn for_each( &self, len : usize, action : &( dyn Fn( usize ) + Sync ) );
  }

  /// The crate's default `ParallelFor`, backed by the global `rayon` pool when
  /// the `parallel` feature is enabled, and a plain sequential loop otherwise.
  #[ derive( Debug, Clone, Copy, Default ) ]
  pub struct RayonParallelFor;

  impl ParallelFor for RayonParallelFor
  {
    fn for_each( &self, len : usize, action : &( dyn Fn( usize ) + Sync ) )
    {
      #[ cfg( feature = "parallel" ) ]
      {
        use rayon::prelude::*;
        ( 0..len ).into_par_iter().for_each( | i | action( i ) );
      }
      #[ cfg( not( feature = "parallel" ) ) ]
      {
        ( 0..len ).for_each( | i | action( i ) );
      }
    }
  }

  /// A 2D grid that can be convolved with a pair of 1D kernels, one per axis.
  /// Reserved for callers that want to pre-smooth a mask or a distance field
  /// before contour extraction ; nothing in this crate's own pipeline
  /// currently needs it.
  pub trait SeparableConvolve
  {
    /// Convolves `self` with `kernel_x` along rows and `kernel_y` along
    /// columns, clamping reads at the border (edge-replicate).
    fn convolve_separable( &self, kernel_x : &[ f64 ], kernel_y : &[ f64 ] ) -> Self;
  }

  impl SeparableConvolve for Grid2D< f64 >
  {
    fn convolve_separable( &self, kernel_x : &[ f64 ], kernel_y : &[ f64 ] ) -> Self
    {
      let horizontal = convolve_axis( self, kernel_x, true );
      convolve_axis( &horizontal, kernel_y, false )
    }
  }

  fn convolve_axis( grid : &Grid2D< f64 >, kernel : &[ f64 ], along_x : bool ) -> Grid2D< f64 >
  {
    if kernel.is_empty()
    {
      return grid.clone();
    }
    let radius = ( kernel.len() / 2 ) as i64;
    grid.map_indexed( | x, y, _ |
    {
      let mut acc = 0.0;
      for ( k, &weight ) in kernel.iter().enumerate()
      {
        let offset = k as i64 - radius;
        let ( sx, sy ) = if along_x { ( x + offset, y ) } else { ( x, y + offset ) };
        let sx = sx.clamp( 0, grid.dim_x() as i64 - 1 );
        let sy = sy.clamp( 0, grid.dim_y() as i64 - 1 );
        acc += weight * grid.get( sx, sy ).expect( "clamped into bounds" );
      }
      acc
    } )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::Point2;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    #[ test ]
    fn rayon_parallel_for_visits_every_index()
    {
      let count = AtomicUsize::new( 0 );
      RayonParallelFor.for_each( 100, &| _ | { count.fetch_add( 1, Ordering::SeqCst ); } );
      assert_eq!( count.load( Ordering::SeqCst ), 100 );
    }

    #[ test ]
    fn box_kernel_convolution_averages_a_constant_grid()
    {
      let mut g = Grid2D::< f64 >::new( 4, 4, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
      g.parallel_iterate( | _, _, v | *v = 2.0 );
      let smoothed = g.convolve_separable( &[ 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0 ], &[ 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0 ] );
      for y in 0..4
      {
        for x in 0..4
        {
          assert!( ( *smoothed.get( x, y ).unwrap() - 2.0 ).abs() < 1e-9 );
        }
      }
    }
  }
}

crate::mod_interface!
{
  own use
  {
    ParallelFor,
    RayonParallelFor,
    SeparableConvolve,
  };
}
