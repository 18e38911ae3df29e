//! End-to-end scenarios chaining the crate's modules through its public API,
//! rather than exercising one module in isolation (see each module's own
//! `#[cfg(test)]` unit tests for that).

#[ cfg( test ) ]
mod tests
{
  use contour_tools::distance::distance_transform_2d;
  use contour_tools::error::Error;
  use contour_tools::extract::polygons_with_holes_default;
  use contour_tools::fill::{ fill, point_in_polygon };
  use contour_tools::geometry::{ Direction2, Direction3, Point2, Point3 };
  use contour_tools::grid::{ Grid2D, Grid3D };
  use contour_tools::interpolate::interpolate_pair;
  use contour_tools::polygon::ContourPolygon;
  use contour_tools::region::Region2D;
  use contour_tools::smooth::{ smooth, splice_all, Smoothing };
  use contour_tools::stats;

  fn grid_from_rows( rows : &[ &[ u8 ] ] ) -> Grid2D< u8 >
  {
    let dim_y = rows.len();
    let dim_x = rows[ 0 ].len();
    let mut g = Grid2D::< u8 >::new( dim_x, dim_y, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
    for ( y, row ) in rows.iter().enumerate()
    {
      for ( x, &v ) in row.iter().enumerate()
      {
        g.set( x as i64, y as i64, v ).unwrap();
      }
    }
    g
  }

  /// A single-pixel mask smooths to the unit diamond, through the full
  /// extract -> smooth pipeline rather than a hand-built `PolygonPoints`.
  #[ test ]
  fn single_pixel_mask_smooths_to_unit_diamond()
  {
    let mask = grid_from_rows( &[ &[ 0, 0, 0 ], &[ 0, 1, 0 ], &[ 0, 0, 0 ] ] );
    let groups = polygons_with_holes_default( &mask, 1 ).unwrap();
    assert_eq!( groups.len(), 1 );
    let smoothed = smooth( groups[ 0 ].outer(), Smoothing::Small ).unwrap();

    assert_eq!( smoothed.region_area_pixels(), 1 );
    let expected =
    [
      Point2::new( 1.5, 0.5 ), Point2::new( 0.5, 1.5 ),
      Point2::new( -0.5, 0.5 ), Point2::new( 0.5, -0.5 ),
    ];
    for e in expected
    {
      assert!
      (
        smoothed.points().iter().any( | p | p.distance( &e ) < 1e-3 ),
        "missing {e:?} in {:?}", smoothed.points(),
      );
    }
  }

  fn square_with_hole_mask() -> Grid2D< u8 >
  {
    // 7x7, FG on [1..5]x[1..5] minus the [2..4]x[2..4] hole.
    let mut rows = vec![ vec![ 0_u8 ; 7 ] ; 7 ];
    for y in 1..=5
    {
      for x in 1..=5
      {
        rows[ y ][ x ] = 1;
      }
    }
    for y in 2..=4
    {
      for x in 2..=4
      {
        rows[ y ][ x ] = 0;
      }
    }
    let row_refs : Vec< &[ u8 ] > = rows.iter().map( Vec::as_slice ).collect();
    grid_from_rows( &row_refs )
  }

  /// A square with a square hole punched out of its middle extracts to one
  /// outer ring with exactly one inner (hole) ring, through the public API.
  #[ test ]
  fn square_with_hole_yields_outer_and_one_inner()
  {
    let mask = square_with_hole_mask();
    let groups = polygons_with_holes_default( &mask, 1 ).unwrap();
    assert_eq!( groups.len(), 1 );
    assert_eq!( groups[ 0 ].outer().points().len(), 16 );
    assert_eq!( groups[ 0 ].outer().voxel_counts().other, 9 );
    assert_eq!( groups[ 0 ].inners().len(), 1 );
  }

  /// Even-odd fill on a self-touching "bowtie" pentagon. Hand-verified
  /// against the scanline state machine : at `y = 2` (the pinch height) the
  /// carved-out triangle has zero width, so the whole row is inside ; at
  /// `y = 3` the triangle has opened up, so the middle column is excluded
  /// while both side columns are painted once each.
  #[ test ]
  fn fill_via_even_odd_on_a_self_touching_bowtie()
  {
    let bowtie = ContourPolygon::new
    (
      vec!
      [
        Point2::new( 0.0, 0.0 ), Point2::new( 4.0, 0.0 ),
        Point2::new( 4.0, 4.0 ), Point2::new( 2.0, 2.0 ), Point2::new( 0.0, 4.0 ),
      ],
      0,
    );
    let mut grid = Grid2D::< u8 >::new( 5, 5, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
    fill( &bowtie, &mut grid, 1 );

    for x in 0..5
    {
      assert_eq!( *grid.get( x, 2 ).unwrap(), 1, "row y=2 column {x} should be fully painted at the zero-width pinch" );
    }
    assert_eq!( *grid.get( 0, 3 ).unwrap(), 1 );
    assert_eq!( *grid.get( 1, 3 ).unwrap(), 1 );
    assert_eq!( *grid.get( 2, 3 ).unwrap(), 0, "the carved-out triangle must not be painted at y=3" );
    assert_eq!( *grid.get( 3, 3 ).unwrap(), 1 );
    assert_eq!( *grid.get( 4, 3 ).unwrap(), 1 );
  }

  /// Extracting, smoothing and splicing the square-with-hole mask, then
  /// filling the result back, reproduces the original mask pixel-for-pixel.
  #[ test ]
  fn inner_outer_splice_preserves_area()
  {
    let mask = square_with_hole_mask();
    let groups = polygons_with_holes_default( &mask, 1 ).unwrap();
    let group = &groups[ 0 ];

    let outer = smooth( group.outer(), Smoothing::None ).unwrap();
    let inners : Vec< ContourPolygon > = group.inners().iter().map( | p | smooth( p, Smoothing::None ).unwrap() ).collect();
    let spliced = splice_all( &outer, &inners ).unwrap();

    let mut rebuilt = mask.create_same_size::< u8 >();
    fill( &spliced, &mut rebuilt, 1 );

    assert_eq!( rebuilt, mask );
  }

  /// Interpolating two identical single-polygon slices at the exact
  /// midpoint returns the same polygon, pointwise.
  #[ test ]
  fn linear_interpolation_of_identical_slices_returns_the_input()
  {
    let square = ContourPolygon::new
    (
      vec!
      [
        Point2::new( 1.0, 1.0 ), Point2::new( 3.0, 1.0 ),
        Point2::new( 3.0, 3.0 ), Point2::new( 1.0, 3.0 ),
      ],
      4,
    );
    let result = interpolate_pair( 1, &[ square.clone() ], 3, &[ square.clone() ], 2 ).unwrap();
    assert_eq!( result.len(), 1 );
    for ( a, b ) in result[ 0 ].points().iter().zip( square.points() )
    {
      assert!( a.distance( b ) < 1e-6 );
    }
  }

  /// Mean, population standard deviation and cc volume over a small
  /// hand-worked 3x3x1 image and mask.
  #[ test ]
  fn contour_statistics_over_a_hand_worked_example()
  {
    let values : [ f64 ; 9 ] = [ 10.0, 10.0, 10.0, 10.0, 20.0, 0.0, 10.0, 0.0, 20.0 ];
    let mask_values : [ u8 ; 9 ] = [ 0, 0, 0, 0, 1, 1, 0, 1, 1 ];

    let mut image = Grid3D::< f64 >::new( 3, 3, 1, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
    let mut mask = Grid3D::< u8 >::new( 3, 3, 1, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
    for y in 0..3_i64
    {
      for x in 0..3_i64
      {
        let i = ( x + y * 3 ) as usize;
        image.set( x, y, 0, values[ i ] ).unwrap();
        mask.set( x, y, 0, mask_values[ i ] ).unwrap();
      }
    }

    let result = stats::compute( &image, &mask, 1 ).unwrap();
    assert!( ( result.mean - 10.0 ).abs() < 1e-9 );
    assert!( ( result.std_dev - 10.0 ).abs() < 1e-9 );
    assert!( ( result.volume_cc - 0.004 ).abs() < 1e-9 );
  }

  /// Every grid transform preserves `dimX*dimY` (`dimZ` for the 3D case)
  /// and keeps the backing buffer's length in sync.
  #[ test ]
  fn grid_geometry_is_preserved_across_map_and_crop()
  {
    let mask = square_with_hole_mask();
    let mapped = mask.map( | &v | v * 2 );
    assert_eq!( mapped.dim_x() * mapped.dim_y(), mapped.buffer().len() );
    assert_eq!( mapped.dim_x(), mask.dim_x() );
    assert_eq!( mapped.dim_y(), mask.dim_y() );

    let region = Region2D::new( 1, 1, 5, 5 );
    let cropped = mask.crop( &region ).unwrap();
    assert_eq!( cropped.dim_x(), 5 );
    assert_eq!( cropped.dim_y(), 5 );
    assert_eq!( cropped.buffer().len(), 25 );
  }

  /// `fill`'s painted count agrees with summing `point_in_polygon` over
  /// every pixel centre of a simple convex polygon.
  #[ test ]
  fn fill_agrees_with_point_in_polygon()
  {
    let square = ContourPolygon::new
    (
      vec!
      [
        Point2::new( 1.0, 1.0 ), Point2::new( 4.0, 1.0 ),
        Point2::new( 4.0, 4.0 ), Point2::new( 1.0, 4.0 ),
      ],
      0,
    );
    let mut grid = Grid2D::< u8 >::new( 6, 6, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
    let painted = fill( &square, &mut grid, 1 );

    let mut agreeing = 0_u64;
    for y in 0..6_i64
    {
      for x in 0..6_i64
      {
        let centre = Point2::new( x as f64 + 0.5, y as f64 + 0.5 );
        if point_in_polygon( centre, square.points(), None ) > 0
        {
          agreeing += 1;
        }
      }
    }
    assert_eq!( painted, agreeing );
  }

  /// Distance transform, morphology and mean/stdDev/volume statistics all
  /// consume the same `Grid3D`/`Grid2D` geometry ; this exercises them in
  /// sequence on one mask rather than only standalone.
  #[ test ]
  fn distance_transform_chains_with_fill_output()
  {
    let mask = square_with_hole_mask();
    let dist = distance_transform_2d( &mask, 1, &Region2D::EMPTY, 2 ).unwrap();
    assert_eq!( *dist.get( 1, 1 ).unwrap(), 0.0, "(1,1) is foreground, inside the outer square" );
    assert!( *dist.get( 3, 3 ).unwrap() > 0.0, "(3,3) is the hole's centre, which is background" );
  }

  /// `Error`'s builder functions stay reachable through the crate's public
  /// API from outside the crate (not just `mod private` internals).
  #[ test ]
  fn error_builders_are_public()
  {
    let error = Error::invalid_argument( "example" );
    assert!( error.to_string().contains( "example" ) );
  }
}
