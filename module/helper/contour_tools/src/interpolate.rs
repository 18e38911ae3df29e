//!
//! # Linear interpolator
//!
//! Generates polygons on the slices strictly between two "locked" slices by
//! point-resampling and linearly blending their polygon lists. The
//! nearest-polygon correspondence step lets a caller interpolate between
//! slices whose polygon counts differ (a hole appearing/disappearing between
//! locked slices, say) without first reconciling the lists by hand.
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };
  use extract::polygons_with_holes_default;
  use fill::fill;
  use geometry::{ Direction2, Point2 };
  use grid::Grid2D;
  use polygon::ContourPolygon;
  use smooth::{ smooth, Smoothing };

  /// Index of the polygon in `candidates` whose first point is closest to
  /// `target`'s first point (squared Euclidean distance).
  ///
  /// Returns `None` if `candidates` is empty or `target` has no points.
  fn closest_by_first_point( target : &ContourPolygon, candidates : &[ ContourPolygon ] ) -> Option< usize >
  {
    let anchor = *target.points().first()?;
    candidates.iter().enumerate()
      .filter_map( | ( i, c ) | c.points().first().map( | &p | ( i, anchor.distance_squared( &p ) ) ) )
      .min_by( | a, b | a.1.partial_cmp( &b.1 ).expect( "distances are never NaN" ) )
      .map( | ( i, _ ) | i )
  }

  /// Blends `min_poly` (at `min_z`) and `max_poly` (at `max_z`) onto
  /// `target_z`. Output length is the shorter polygon's point
  /// count ; the longer polygon is resampled onto that length by nearest-index
  /// mapping, so equal-length inputs reduce to an exact componentwise blend
  /// .
  fn blend_pair( min_z : i64, min_poly : &ContourPolygon, max_z : i64, max_poly : &ContourPolygon, target_z : i64 ) -> ContourPolygon
  {
    let d = ( target_z - min_z ) as f64 / ( max_z - min_z ) as f64;
    let min_pts = min_poly.points();
    let max_pts = max_poly.points();
    let region_area = ( ( 1.0 - d ) * min_poly.region_area_pixels() as f64 + d * max_poly.region_area_pixels() as f64 ).round() as u64;

    let points = if min_pts.len() <= max_pts.len()
    {
      let short_len = min_pts.len();
      let long_len = max_pts.len();
      ( 1..=short_len ).map( | i |
      {
        let j = ( ( i * long_len ) as f64 / short_len as f64 ).round() as usize;
        let j = j.clamp( 1, long_len.max( 1 ) );
        lerp( min_pts[ i - 1 ], max_pts[ j - 1 ], d )
      } ).collect()
    }
    else
    {
      let short_len = max_pts.len();
      let long_len = min_pts.len();
      ( 1..=short_len ).map( | i |
      {
        let j = ( ( i * long_len ) as f64 / short_len as f64 ).round() as usize;
        let j = j.clamp( 1, long_len.max( 1 ) );
        lerp( min_pts[ j - 1 ], max_pts[ i - 1 ], d )
      } ).collect()
    };

    ContourPolygon::new( points, region_area )
  }

  #[ inline ]
  fn lerp( a : Point2, b : Point2, d : f64 ) -> Point2
  {
    Point2::new( a.x + ( b.x - a.x ) * d, a.y + ( b.y - a.y ) * d )
  }

  /// Produces the interpolated polygon list for `target_z`, a slice strictly
  /// between the two locked slices `min_z`/`max_z`.
  ///
  /// # Errors
  /// Fails with `OutOfRange` if `target_z` is not strictly between `min_z` and
  /// `max_z`. Fails with `InvalidArgument` if either input list is empty.
  pub fn interpolate_pair
  (
    min_z : i64, min_polys : &[ ContourPolygon ],
    max_z : i64, max_polys : &[ ContourPolygon ],
    target_z : i64,
  ) -> Result< Vec< ContourPolygon > >
  {
    if min_z == max_z || target_z <= min_z.min( max_z ) || target_z >= min_z.max( max_z )
    {
      return Err( Error::out_of_range( format!( "target slice {target_z} is not strictly between {min_z} and {max_z}" ) ) );
    }
    if min_polys.is_empty() || max_polys.is_empty()
    {
      return Err( Error::invalid_argument( "interpolate_pair requires both slices to have at least one polygon" ) );
    }

    // The "more polygons" list drives the nearest-neighbour correspondence
    // ; whichever physical slice that is does not affect the
    // blend weight, which is always anchored to the true min_z/max_z.
    let ( bigger, bigger_is_min ) = if min_polys.len() >= max_polys.len() { ( min_polys, true ) } else { ( max_polys, false ) };
    let smaller = if bigger_is_min { max_polys } else { min_polys };

    bigger.iter().map( | big_poly |
    {
      let match_index = closest_by_first_point( big_poly, smaller )
        .ok_or_else( || Error::invalid_argument( "polygon with no points cannot be matched for interpolation" ) )?;
      let small_poly = &smaller[ match_index ];
      let ( min_poly, max_poly ) = if bigger_is_min { ( big_poly, small_poly ) } else { ( small_poly, big_poly ) };
      Ok( blend_pair( min_z, min_poly, max_z, max_poly, target_z ) )
    } ).collect()
  }

  /// Runs `interpolate_pair` over every pair of adjacent locked slices in
  /// `contours`, for every integer slice strictly between them, and returns
  /// the union of the locked slices plus the generated ones.
  ///
  /// # Errors
  /// Fails with `InvalidState` if `contours` is empty. Propagates any
  /// `interpolate_pair` failure for an individual pair.
  pub fn linear_interpolate( contours : &contours_per_slice::ContoursPerSlice ) -> Result< std::collections::HashMap< i64, Vec< ContourPolygon > > >
  {
    let locked = contours.slices_with_contours();
    if locked.is_empty()
    {
      return Err( Error::invalid_state( "linear_interpolate on an empty container" ) );
    }
    log::debug!( "linear_interpolate : {} locked slices", locked.len() );
    let mut out = std::collections::HashMap::new();
    for &z in &locked
    {
      out.insert( z, contours.contours_for_slice( z ).expect( "z came from slices_with_contours" ) );
    }
    for pair in locked.windows( 2 )
    {
      let ( lo, hi ) = ( pair[ 0 ], pair[ 1 ] );
      if hi - lo < 2
      {
        continue;
      }
      let lo_polys = contours.contours_for_slice( lo ).expect( "lo came from slices_with_contours" );
      let hi_polys = contours.contours_for_slice( hi ).expect( "hi came from slices_with_contours" );
      for z in ( lo + 1 )..hi
      {
        log::trace!( "linear_interpolate : blending slice {z} between locked {lo} and {hi}" );
        let blended = interpolate_pair( lo, &lo_polys, hi, &hi_polys, z )?;
        out.insert( z, blended );
      }
    }
    Ok( out )
  }

  /// Re-rasterises `polygons` onto a scratch mask of the given geometry and
  /// re-extracts its contours, guaranteeing a legal, non-self-intersecting
  /// polygon set for that slice. This is a
  /// stabilising post-pass, not applied by `interpolate_pair`/
  /// `linear_interpolate` directly : re-extraction only reproduces its input
  /// exactly under fixpoint conditions (pixel-aligned,
  /// non-self-intersecting input), and flattens nested holes into top-level
  /// outer rings, which callers that need the raw blended geometry (e.g. to
  /// check the midpoint blend directly) must not have it applied underneath them.
  ///
  /// # Errors
  /// Propagates grid construction failures (non-positive spacing).
  #[ allow( clippy::too_many_arguments ) ]
  pub fn stabilize
  (
    polygons : &[ ContourPolygon ],
    dim_x : usize, dim_y : usize,
    spacing_x : f64, spacing_y : f64,
    origin : Point2, direction : Direction2,
  ) -> Result< Vec< ContourPolygon > >
  {
    let mut mask = Grid2D::< u8 >::new( dim_x, dim_y, spacing_x, spacing_y, origin, direction )?;
    for polygon in polygons
    {
      fill( polygon, &mut mask, 1_u8 );
    }
    let groups = polygons_with_holes_default( &mask, 1 )?;
    groups.iter().map( | group | smooth( group.outer(), Smoothing::None ) ).collect()
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;

    fn square( half : f64, area : u64 ) -> ContourPolygon
    {
      ContourPolygon::new
      (
        vec!
        [
          Point2::new( -half, -half ), Point2::new( half, -half ),
          Point2::new( half, half ), Point2::new( -half, half ),
        ],
        area,
      )
    }

    #[ test ]
    fn identical_slices_interpolate_to_the_same_polygon()
    {
      let poly = square( 2.0, 16 );
      let result = interpolate_pair( 1, &[ poly.clone() ], 3, &[ poly.clone() ], 2 ).unwrap();
      assert_eq!( result.len(), 1 );
      for ( a, b ) in result[ 0 ].points().iter().zip( poly.points() )
      {
        assert!( a.distance( b ) < 1e-6, "{a:?} vs {b:?}" );
      }
    }

    #[ test ]
    fn equal_length_polygons_blend_to_componentwise_mean_at_midpoint()
    {
      let min_poly = square( 1.0, 4 );
      let max_poly = square( 3.0, 36 );
      let result = interpolate_pair( 0, &[ min_poly.clone() ], 4, &[ max_poly.clone() ], 2 ).unwrap();
      for ( ( out, a ), b ) in result[ 0 ].points().iter().zip( min_poly.points() ).zip( max_poly.points() )
      {
        let expected = Point2::new( ( a.x + b.x ) / 2.0, ( a.y + b.y ) / 2.0 );
        assert!( out.distance( &expected ) < 1e-9 );
      }
    }

    #[ test ]
    fn target_not_strictly_between_errors()
    {
      let poly = square( 1.0, 4 );
      assert!( interpolate_pair( 1, &[ poly.clone() ], 3, &[ poly.clone() ], 3 ).is_err() );
      assert!( interpolate_pair( 1, &[ poly.clone() ], 3, &[ poly ], 1 ).is_err() );
    }

    #[ test ]
    fn empty_polygon_list_errors()
    {
      let poly = square( 1.0, 4 );
      assert!( interpolate_pair( 1, &[], 3, &[ poly ], 2 ).is_err() );
    }

    #[ test ]
    fn stabilize_round_trips_a_pixel_aligned_square()
    {
      let poly = ContourPolygon::new
      (
        vec!
        [
          Point2::new( 1.0, 1.0 ), Point2::new( 5.0, 1.0 ),
          Point2::new( 5.0, 5.0 ), Point2::new( 1.0, 5.0 ),
        ],
        16,
      );
      let out = stabilize( &[ poly ], 8, 8, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
      assert_eq!( out.len(), 1 );
      assert!( !out[ 0 ].is_empty() );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    interpolate_pair,
    linear_interpolate,
    stabilize,
  };
}
