//!
//! # Polygon filler
//!
//! Scanline rasterisation of fractional polygons onto a grid, using the
//! dual-epsilon intersection scheme : classical active-edge tables are rejected
//! because this crate's polygons routinely have vertices lying exactly on
//! integer scanlines (every contour the extractor produces does), which active-
//! edge tables handle inconsistently. Also : winding-number point-in-polygon,
//! scanline-stack flood fill of holes, and a fill variant that tallies
//! foreground/other voxel counts against a second grid as it paints.
//!

mod private
{
  use crate::*;
  use constants::FILL_EPSILON;
  use error::{ Error, Result };
  use geometry::Point2;
  use grid::Grid2D;
  use polygon::{ ContourPolygon, VoxelCounts };
  use region::Region2D;

  /// One scanline crossing : the x position and which epsilon offset produced
  /// it (`true` for `y + eps`, `false` for `y - eps`).
  #[ derive( Debug, Clone, Copy ) ]
  struct Crossing
  {
    x : f64,
    high : bool,
  }

  /// Computes the edge crossings of `points` (a closed polygon) against both
  /// `y + eps` and `y - eps`.
  fn scanline_crossings( points : &[ Point2 ], y : i64 ) -> Vec< Crossing >
  {
    let eps = FILL_EPSILON;
    let n = points.len();
    let mut crossings = Vec::new();
    if n < 2
    {
      return crossings;
    }
    for i in 0..n
    {
      let p_i = points[ i ];
      let p_j = points[ ( i + 1 ) % n ];
      if p_i.y == p_j.y
      {
        continue;
      }
      for &( high, y_star ) in &[ ( true, y as f64 + eps ), ( false, y as f64 - eps ) ]
      {
        let cond_a = p_i.y < y_star && y_star <= p_j.y;
        let cond_b = p_j.y < y_star && y_star <= p_i.y;
        if cond_a ^ cond_b
        {
          let x = p_i.x + ( y_star - p_i.y ) * ( p_j.x - p_i.x ) / ( p_j.y - p_i.y );
          crossings.push( Crossing { x, high } );
        }
      }
    }
    crossings
  }

  /// Runs the four-state machine over one scanline's sorted
  /// crossings, returning merged `(start, end)` span endpoints. The state is
  /// `(low, high)` : whether `y - eps` / `y + eps` are currently inside. A span
  /// is open whenever `low || high` (Bottom, Top or Inside all paint ; only
  /// Background does not), which is what lets a boundary that lies exactly on
  /// the scanline still contribute pixels.
  fn merge_spans( mut crossings : Vec< Crossing > ) -> Vec< ( f64, f64 ) >
  {
    crossings.sort_by( | a, b | a.x.partial_cmp( &b.x ).expect( "crossing x is never NaN" ) );
    let mut spans = Vec::new();
    let mut low = false;
    let mut high = false;
    let mut span_start : Option< f64 > = None;
    let mut i = 0;
    while i < crossings.len()
    {
      let x = crossings[ i ].x;
      let mut j = i;
      while j < crossings.len() && ( crossings[ j ].x - x ).abs() < 1e-9
      {
        if crossings[ j ].high { high = !high; } else { low = !low; }
        j += 1;
      }
      let inside_now = low || high;
      match ( span_start, inside_now )
      {
        ( None, true ) => span_start = Some( x ),
        ( Some( start ), false ) =>
        {
          spans.push( ( start, x ) );
          span_start = None;
        },
        _ => {},
      }
      i = j;
    }
    // A closed polygon always returns to Background ; an unterminated span
    // here would mean the caller passed an open point list. Drop it rather
    // than paint to infinity.
    spans
  }

  /// Integer column range `[ceil(a - eps), floor(b + eps)]` for a merged span,
  /// clamped to `[0, dim_x - 1]`.
  fn span_columns( a : f64, b : f64, dim_x : usize ) -> std::ops::RangeInclusive< i64 >
  {
    let eps = FILL_EPSILON;
    let lo = ( a - eps ).ceil() as i64;
    let hi = ( b + eps ).floor() as i64;
    lo.max( 0 )..=hi.min( dim_x as i64 - 1 )
  }

  /// Rows of the polygon's fractional bounding box, clamped to the grid.
  fn scan_rows( points : &[ Point2 ], dim_y : usize ) -> std::ops::RangeInclusive< i64 >
  {
    if points.is_empty() || dim_y == 0
    {
      return 0..=-1;
    }
    let min_y = points.iter().map( | p | p.y ).fold( f64::INFINITY, f64::min );
    let max_y = points.iter().map( | p | p.y ).fold( f64::NEG_INFINITY, f64::max );
    let lo = min_y.floor() as i64;
    let hi = max_y.ceil() as i64;
    lo.max( 0 )..=hi.min( dim_y as i64 - 1 )
  }

  /// Paints `polygon`'s interior onto `grid` with `value`, using the exact
  /// exact scanline fill rule. Returns the number of voxels painted.
  pub fn fill< T >( polygon : &ContourPolygon, grid : &mut Grid2D< T >, value : T ) -> u64
  where
    T : Clone + PartialEq,
  {
    let mut painted = 0_u64;
    let dim_x = grid.dim_x();
    for y in scan_rows( polygon.points(), grid.dim_y() )
    {
      let spans = merge_spans( scanline_crossings( polygon.points(), y ) );
      for ( a, b ) in spans
      {
        for x in span_columns( a, b, dim_x )
        {
          if grid.set( x, y, value.clone() ).is_ok()
          {
            painted += 1;
          }
        }
      }
    }
    painted
  }

  /// As `fill`, but also tallies `(foreground, other)` voxel counts by
  /// consulting `source` at every newly painted index (used by the extractor to
  /// build `VoxelCounts`).
  pub fn fill_with_counts< T >
  (
    polygon : &ContourPolygon,
    grid : &mut Grid2D< T >,
    value : T,
    source : &Grid2D< u8 >,
    foreground : u8,
  ) -> ( u64, VoxelCounts )
  where
    T : Clone + PartialEq,
  {
    let mut painted = 0_u64;
    let mut counts = VoxelCounts::default();
    let dim_x = grid.dim_x();
    for y in scan_rows( polygon.points(), grid.dim_y() )
    {
      let spans = merge_spans( scanline_crossings( polygon.points(), y ) );
      for ( a, b ) in spans
      {
        for x in span_columns( a, b, dim_x )
        {
          if grid.set( x, y, value.clone() ).is_ok()
          {
            painted += 1;
            match source.get( x, y )
            {
              Ok( &v ) if v == foreground => counts.foreground += 1,
              _ => counts.other += 1,
            }
          }
        }
      }
    }
    ( painted, counts )
  }

  /// Squared distance from `point` to the segment `a..b`.
  fn distance_to_segment_squared( point : Point2, a : Point2, b : Point2 ) -> f64
  {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0
    {
      return point.distance_squared( &a );
    }
    let t = ( ( point.x - a.x ) * ab.x + ( point.y - a.y ) * ab.y ) / len_sq;
    let t = t.clamp( 0.0, 1.0 );
    let closest = Point2::new( a.x + ab.x * t, a.y + ab.y * t );
    point.distance_squared( &closest )
  }

  /// `2 * signed area` of the triangle `(p0, p1, point)` ; used by the winding
  /// number test to tell which side of an edge `point` is on.
  fn is_left( p0 : Point2, p1 : Point2, point : Point2 ) -> f64
  {
    ( p1.x - p0.x ) * ( point.y - p0.y ) - ( point.x - p0.x ) * ( p1.y - p0.y )
  }

  /// Tolerance (squared distance) within which a point is considered to lie on
  /// a polygon edge by `point_in_polygon`.
  const ON_SEGMENT_EPSILON_SQ : f64 = 1e-9;

  /// Winding-number point-in-polygon test : `-1` outside, `0` on the boundary,
  /// `+1` inside. `bbox` is an optional fast-reject bounding rectangle.
  pub fn point_in_polygon( point : Point2, points : &[ Point2 ], bbox : Option< ( Point2, Point2 ) > ) -> i32
  {
    if let Some( ( min, max ) ) = bbox
    {
      if point.x < min.x || point.x > max.x || point.y < min.y || point.y > max.y
      {
        return -1;
      }
    }
    let n = points.len();
    if n < 3
    {
      return -1;
    }
    let mut winding = 0_i32;
    for i in 0..n
    {
      let p1 = points[ i ];
      let p2 = points[ ( i + 1 ) % n ];
      if distance_to_segment_squared( point, p1, p2 ) <= ON_SEGMENT_EPSILON_SQ
      {
        return 0;
      }
      if p1.y <= point.y
      {
        if p2.y > point.y && is_left( p1, p2, point ) > 0.0
        {
          winding += 1;
        }
      }
      else if p2.y <= point.y && is_left( p1, p2, point ) < 0.0
      {
        winding -= 1;
      }
    }
    if winding != 0 { 1 } else { -1 }
  }

  /// Flood-fills every background region of `grid` within the bounding box of
  /// `foreground` that is not connected to that box's perimeter, turning it
  /// into foreground.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if `foreground == background`.
  pub fn flood_fill_holes( grid : &mut Grid2D< u8 >, foreground : u8, background : u8 ) -> Result< () >
  {
    if foreground == background
    {
      return Err( Error::invalid_argument( "flood_fill_holes requires foreground != background" ) );
    }
    let bbox = grid.bounding_box( foreground );
    if bbox.is_empty()
    {
      return Ok( () );
    }
    let temp = ( 0_u16..=255 ).map( | v | v as u8 ).find( | &v | v != foreground && v != background )
      .expect( "u8 has 256 values ; at most two are excluded" );

    let mut stack : Vec< ( i64, i64 ) > = Vec::new();
    for x in bbox.min_x..=bbox.max_x
    {
      stack.push( ( x, bbox.min_y ) );
      stack.push( ( x, bbox.max_y ) );
    }
    for y in bbox.min_y..=bbox.max_y
    {
      stack.push( ( bbox.min_x, y ) );
      stack.push( ( bbox.max_x, y ) );
    }

    while let Some( ( x, y ) ) = stack.pop()
    {
      if !bbox.contains( x, y )
      {
        continue;
      }
      if *grid.get( x, y ).expect( "in bounds : checked by bbox.contains" ) != background
      {
        continue;
      }
      // Find the contiguous background span on row y containing x.
      let mut x1 = x;
      while x1 - 1 >= bbox.min_x && *grid.get( x1 - 1, y ).expect( "in bbox" ) == background
      {
        x1 -= 1;
      }
      let mut x2 = x;
      while x2 + 1 <= bbox.max_x && *grid.get( x2 + 1, y ).expect( "in bbox" ) == background
      {
        x2 += 1;
      }
      for sx in x1..=x2
      {
        grid.set( sx, y, temp ).expect( "in bbox" );
      }
      for ny in [ y - 1, y + 1 ]
      {
        if ny < bbox.min_y || ny > bbox.max_y
        {
          continue;
        }
        let mut sx = x1;
        while sx <= x2
        {
          if *grid.get( sx, ny ).expect( "in bbox" ) == background
          {
            stack.push( ( sx, ny ) );
            // Skip the rest of this span on the next row ; a fresh seed per
            // span is enough, and `stack` will re-discover the whole span.
            while sx <= x2 && *grid.get( sx, ny ).expect( "in bbox" ) == background
            {
              sx += 1;
            }
          }
          else
          {
            sx += 1;
          }
        }
      }
    }

    for y in bbox.min_y..=bbox.max_y
    {
      for x in bbox.min_x..=bbox.max_x
      {
        let cell = grid.get( x, y ).expect( "in bbox" );
        let next = if *cell == temp { background } else { foreground };
        grid.set( x, y, next ).expect( "in bbox" );
      }
    }
    Ok( () )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::Direction2;

    fn square_grid( dim : usize ) -> Grid2D< u8 >
    {
      Grid2D::new( dim, dim, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap()
    }

    fn unit_square_centred_at( cx : f64, cy : f64, half : f64 ) -> ContourPolygon
    {
      ContourPolygon::new
      (
        vec!
        [
          Point2::new( cx - half, cy - half ),
          Point2::new( cx + half, cy - half ),
          Point2::new( cx + half, cy + half ),
          Point2::new( cx - half, cy + half ),
        ],
        0,
      )
    }

    #[ test ]
    fn fill_axis_aligned_square_paints_expected_pixels()
    {
      // A square with corners at (1,1) and (5,5) should paint pixel columns
      // and rows 1..=4 (pixel centres 1,2,3,4 fall strictly inside ; 5 is the
      // far edge and is excluded because it is the span's open end).
      let mut grid = square_grid( 8 );
      let poly = ContourPolygon::new
      (
        vec!
        [
          Point2::new( 1.0, 1.0 ),
          Point2::new( 5.0, 1.0 ),
          Point2::new( 5.0, 5.0 ),
          Point2::new( 1.0, 5.0 ),
        ],
        16,
      );
      let painted = fill( &poly, &mut grid, 1_u8 );
      assert_eq!( painted, 16 );
      for y in 1..5
      {
        for x in 1..5
        {
          assert_eq!( *grid.get( x, y ).unwrap(), 1, "expected ({x},{y}) painted" );
        }
      }
      assert_eq!( *grid.get( 5, 5 ).unwrap(), 0 );
      assert_eq!( *grid.get( 0, 0 ).unwrap(), 0 );
    }

    #[ test ]
    fn point_in_polygon_agrees_with_fill_for_small_square()
    {
      let poly = unit_square_centred_at( 2.0, 2.0, 1.5 );
      let mut grid = square_grid( 5 );
      let painted = fill( &poly, &mut grid, 1_u8 );
      let mut counted = 0_u64;
      for y in 0..5_i64
      {
        for x in 0..5_i64
        {
          let centre = Point2::new( x as f64, y as f64 );
          if point_in_polygon( centre, poly.points(), None ) >= 0
          {
            counted += 1;
          }
        }
      }
      assert_eq!( painted, counted );
    }

    #[ test ]
    fn point_in_polygon_bbox_pretest_rejects_outside()
    {
      let poly = unit_square_centred_at( 2.0, 2.0, 1.0 );
      let bbox = ( Point2::new( 1.0, 1.0 ), Point2::new( 3.0, 3.0 ) );
      assert_eq!( point_in_polygon( Point2::new( 10.0, 10.0 ), poly.points(), Some( bbox ) ), -1 );
    }

    #[ test ]
    fn flood_fill_turns_enclosed_background_into_foreground()
    {
      // A 5x5 ring of foreground with a single background pixel hole at (2,2).
      let mut grid = square_grid( 5 );
      for y in 1..=3_i64
      {
        for x in 1..=3_i64
        {
          grid.set( x, y, 1 ).unwrap();
        }
      }
      grid.set( 2, 2, 0 ).unwrap();
      flood_fill_holes( &mut grid, 1, 0 ).unwrap();
      assert_eq!( *grid.get( 2, 2 ).unwrap(), 1 );
      // Outside the ring stays background.
      assert_eq!( *grid.get( 0, 0 ).unwrap(), 0 );
    }

    #[ test ]
    fn flood_fill_rejects_equal_foreground_and_background()
    {
      let mut grid = square_grid( 3 );
      assert!( flood_fill_holes( &mut grid, 1, 1 ).is_err() );
    }

    #[ test ]
    fn fill_with_counts_tallies_against_source()
    {
      let mut mask = square_grid( 4 );
      mask.set( 1, 1, 1 ).unwrap();
      let mut marks = square_grid( 4 );
      let poly = ContourPolygon::new
      (
        vec!
        [
          Point2::new( 0.0, 0.0 ),
          Point2::new( 3.0, 0.0 ),
          Point2::new( 3.0, 3.0 ),
          Point2::new( 0.0, 3.0 ),
        ],
        9,
      );
      let ( painted, counts ) = fill_with_counts( &poly, &mut marks, 1_u8, &mask, 1 );
      assert_eq!( painted, 9 );
      assert_eq!( counts.foreground, 1 );
      assert_eq!( counts.other, 8 );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    fill,
    fill_with_counts,
    point_in_polygon,
    flood_fill_holes,
  };
}
