//!
//! # Contour smoother
//!
//! Turns the extractor's closed integer pixel walk into a fractional polygon a
//! caller can render or re-rasterise. `Smoothing::None` produces the raw
//! outer-edge path (one corner offset per boundary pixel, shifted so pixel
//! centres land on whole coordinates) ; `Smoothing::Small` additionally
//! collapses short zigzags using a turn-string pattern table before applying
//! the same shift and dropping redundant points. [`splice`] stitches a hole
//! polygon into its outer ring through a zero-width vertical slit, so the pair
//! can travel as one simple ring where a caller needs exactly that.
//!

mod private
{
  use crate::*;
  use constants::{ DEFAULT_OUTER_EDGE_SHIFT, GAP_TOLERANCE, REDUNDANT_POINT_TOLERANCE_SQ };
  use error::{ Error, Result };
  use geometry::{ IVec2, Point2 };
  use polygon::{ ContourPolygon, PolygonPoints };

  /// The 8 Moore step directions, clockwise starting at `(+1, 0)` — the same
  /// compass frame `extract` walks pixels in, so a step between two
  /// consecutive boundary pixels is always exactly one of these.
  const DIRS8 : [ ( i64, i64 ) ; 8 ] =
  [
    ( 1, 0 ), ( 1, 1 ), ( 0, 1 ), ( -1, 1 ),
    ( -1, 0 ), ( -1, -1 ), ( 0, -1 ), ( 1, -1 ),
  ];

  /// How the extractor's integer boundary walk is turned into a fractional
  /// outer-edge path.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
  pub enum Smoothing
  {
    /// One corner offset per boundary pixel ; no simplification.
    None,
    /// `None`'s path, rounded, with short zigzag turns collapsed.
    Small,
  }

  fn dir_index( d : ( i64, i64 ) ) -> usize
  {
    DIRS8.iter().position( | &e | e == d ).unwrap_or( 0 )
  }

  /// Every pixel square has 8 ring positions — 4 edge midpoints and 4 corners,
  /// interleaved in the same clockwise order as `DIRS8` at half scale. Walking
  /// the outer (clockwise) or inner (counter-clockwise) ring from the point you
  /// entered the pixel through to the point you leave it through is what turns
  /// a chain-code step into "one to three corner offsets".
  fn ring_points( center : Point2, d_in : ( i64, i64 ), d_out : ( i64, i64 ), is_inner : bool, shift : f64 ) -> Vec< Point2 >
  {
    let idx_in = dir_index( d_in );
    let idx_out = dir_index( d_out );
    // Clockwise (outer) ring index for step direction idx is (idx - 2) mod 8 ;
    // counter-clockwise (inner) is the mirror, (idx + 2) mod 8.
    let ( entry, exit, step ) : ( i64, i64, i64 ) = if is_inner
    {
      ( ( ( idx_in as i64 + 2 ) % 8 ), ( ( idx_out as i64 + 2 ) % 8 ), -1 )
    }
    else
    {
      ( ( ( idx_in as i64 + 6 ) % 8 ), ( ( idx_out as i64 + 6 ) % 8 ), 1 )
    };
    let span = if step > 0 { ( exit - entry ).rem_euclid( 8 ) } else { ( entry - exit ).rem_euclid( 8 ) };
    let mut out = Vec::with_capacity( ( span + 1 ) as usize );
    let mut k = entry;
    for _ in 0..=span
    {
      let kk = k.rem_euclid( 8 ) as usize;
      let ( rx, ry ) = DIRS8[ kk ];
      out.push( Point2::new( center.x + 0.5 * rx as f64 + shift, center.y + 0.5 * ry as f64 + shift ) );
      k += step;
    }
    out
  }

  /// Drops the fake leading pixel of a hole walk (the `(x, y - 1)` start
  /// trick) so the ring walk below never sees it.
  fn effective_points( points : &[ IVec2 ], is_inner : bool ) -> Vec< IVec2 >
  {
    if is_inner && points.len() > 1
    {
      points[ 1.. ].to_vec()
    }
    else
    {
      points.to_vec()
    }
  }

  /// Builds the corner-offset outer-edge path over a closed ring
  /// of pixel centres, shifting every emitted point by `shift` on both axes.
  fn outer_edge_path( points : &[ IVec2 ], is_inner : bool, shift : f64 ) -> Vec< Point2 >
  {
    let n = points.len();
    if n < 2
    {
      return points.iter().map( | &p | Point2::new( p.x as f64 + shift, p.y as f64 + shift ) ).collect();
    }
    let mut out = Vec::new();
    for i in 0..n
    {
      let prev = points[ ( i + n - 1 ) % n ];
      let cur = points[ i ];
      let next = points[ ( i + 1 ) % n ];
      let d_in = ( cur.x - prev.x, cur.y - prev.y );
      let d_out = ( next.x - cur.x, next.y - cur.y );
      out.extend( ring_points( Point2::from( cur ), d_in, d_out, is_inner, shift ) );
    }
    out
  }

  /// The diamond a single foreground pixel smooths to — there is no corner to
  /// round, so this bypasses the ring walk entirely.
  fn single_pixel_diamond( p : IVec2, shift : f64 ) -> Vec< Point2 >
  {
    let c = Point2::new( p.x as f64 + shift, p.y as f64 + shift );
    vec!
    [
      Point2::new( c.x + 1.0, c.y ),
      Point2::new( c.x, c.y + 1.0 ),
      Point2::new( c.x - 1.0, c.y ),
      Point2::new( c.x, c.y - 1.0 ),
    ]
  }

  fn gap( points : &[ Point2 ] ) -> f64
  {
    match ( points.first(), points.last() )
    {
      ( Some( a ), Some( b ) ) => a.distance( b ),
      _ => 0.0,
    }
  }

  fn check_gap( points : &[ Point2 ] ) -> Result< () >
  {
    if gap( points ) > 1.0 + GAP_TOLERANCE
    {
      return Err( Error::invalid_state( "smoother's first and last points do not close within tolerance" ) );
    }
    Ok( () )
  }

  /// `F`/`L`/`R` turn classification between two unit chain-code steps.
  fn turn_char( prev : ( i64, i64 ), cur : ( i64, i64 ) ) -> char
  {
    let prev = Point2::new( prev.0 as f64, prev.1 as f64 );
    let cur = Point2::new( cur.0 as f64, cur.1 as f64 );
    if cur == prev { 'F' }
    else if cur == prev.rotate_left() { 'L' }
    else if cur == prev.rotate_right() { 'R' }
    else { 'X' }
  }

  /// Derives the cyclic turn string for a closed sequence of integer points
  /// already reduced to unit steps (no two consecutive points coincide).
  fn turn_string( points : &[ IVec2 ] ) -> Vec< char >
  {
    let n = points.len();
    ( 0..n ).map( | i |
    {
      let prev = points[ ( i + n - 1 ) % n ];
      let cur = points[ i ];
      let next = points[ ( i + 1 ) % n ];
      let d_prev = ( cur.x - prev.x, cur.y - prev.y );
      let d_next = ( next.x - cur.x, next.y - cur.y );
      turn_char( d_prev, d_next )
    } ).collect()
  }

  /// Priority-ordered patterns substituted over the turn string, longest and
  /// most specific first so a catch-all single `R`/`L` never pre-empts a
  /// longer run it is also a prefix of.
  const PATTERNS : [ &str ; 8 ] = [ "FRF", "FLF", "RFL", "LFR", "RL", "LR", "R", "L" ];

  /// Replacement points for one pattern, in the edge-relative frame `(x, y)`
  /// where `x` scales the edge normal `d1` and `y` scales the edge direction
  /// `d0`. Same order and priority as `PATTERNS`.
  fn pattern_fragment( pattern : &str ) -> &'static [ ( f64, f64 ) ]
  {
    match pattern
    {
      "FRF" => &[ ( 0.0, -0.5 ), ( 0.0, 0.1 ), ( -0.9, 1.0 ), ( -1.5, 1.0 ) ],
      "FLF" => &[ ( 0.0, -0.5 ), ( 0.0, 0.1 ), ( 0.9, 1.0 ), ( 1.5, 1.0 ) ],
      "RFL" => &[ ( 0.0, -0.5 ), ( -2.0, 0.5 ) ],
      "LFR" => &[ ( 0.0, -0.5 ), ( 2.0, 0.5 ) ],
      "RL" => &[ ( 0.0, -0.5 ), ( -1.0, 0.5 ) ],
      "LR" => &[ ( 0.0, -0.5 ), ( 1.0, 0.5 ) ],
      "R" => &[ ( 0.0, -0.5 ), ( -0.5, 0.0 ) ],
      "L" => &[ ( 0.0, -0.5 ), ( 0.5, 0.0 ) ],
      _ => &[],
    }
  }

  #[ derive( Clone, Copy ) ]
  enum Slot
  {
    Unassigned,
    Fragment( &'static [ ( f64, f64 ) ] ),
    Empty,
  }

  /// Replaces every matched turn-string run with its table fragment,
  /// transformed into the world frame at the match's anchor point. A position
  /// whose turn is never part of any match (an interior `F` on a long
  /// straight run) contributes no point — the straight edge it lies on is
  /// unaffected by dropping interior colinear points.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if a displacement is neither a repeat of
  /// the previous direction nor a 90-degree turn from it (a degenerate
  /// contour the turn-string representation cannot encode).
  fn substitute_patterns( points : &[ IVec2 ] ) -> Result< Vec< Point2 > >
  {
    let n = points.len();
    if n == 0
    {
      return Ok( Vec::new() );
    }
    let turns = turn_string( points );
    if let Some( i ) = turns.iter().position( | &c | c == 'X' )
    {
      return Err( Error::invalid_argument( format!( "degenerate turn at position {i} : displacement is neither forward nor a 90-degree turn" ) ) );
    }
    let mut slots = vec![ Slot::Unassigned ; n ];

    for pattern in PATTERNS
    {
      let len = pattern.len();
      if len > n
      {
        continue;
      }
      let chars : Vec< char > = pattern.chars().collect();
      for start in 0..n
      {
        if ( 0..len ).any( | k | !matches!( slots[ ( start + k ) % n ], Slot::Unassigned ) )
        {
          continue;
        }
        let is_match = ( 0..len ).all( | k | turns[ ( start + k ) % n ] == chars[ k ] );
        if !is_match
        {
          continue;
        }
        slots[ start ] = Slot::Fragment( pattern_fragment( pattern ) );
        for k in 1..len
        {
          slots[ ( start + k ) % n ] = Slot::Empty;
        }
      }
    }

    let mut out = Vec::new();
    for i in 0..n
    {
      let Slot::Fragment( fragment ) = slots[ i ] else { continue };
      let cur = Point2::from( points[ i ] );
      let next = Point2::from( points[ ( i + 1 ) % n ] );
      let raw = Point2::new( next.x - cur.x, next.y - cur.y );
      let mag = ( raw.x * raw.x + raw.y * raw.y ).sqrt();
      let d0 = if mag > 0.0 { Point2::new( raw.x / mag, raw.y / mag ) } else { Point2::new( 1.0, 0.0 ) };
      let d1 = Point2::new( -d0.y, d0.x );
      for &( fx, fy ) in fragment
      {
        out.push( Point2::new( cur.x + fx * d1.x + fy * d0.x, cur.y + fx * d1.y + fy * d0.y ) );
      }
    }
    Ok( out )
  }

  fn remove_redundant( points : &[ Point2 ] ) -> Vec< Point2 >
  {
    if points.len() < 3
    {
      return points.to_vec();
    }
    let mut kept : Vec< Point2 > = Vec::with_capacity( points.len() );
    for &p in points
    {
      if kept.last().is_some_and( | &last : &Point2 | last.distance_squared( &p ) <= REDUNDANT_POINT_TOLERANCE_SQ )
      {
        continue;
      }
      kept.push( p );
    }
    if kept.len() > 1 && kept.first().is_some_and( | &first : &Point2 | first.distance_squared( kept.last().unwrap() ) <= REDUNDANT_POINT_TOLERANCE_SQ )
    {
      kept.pop();
    }
    let n = kept.len();
    if n < 3
    {
      return kept;
    }
    let mut simplified = Vec::with_capacity( n );
    for i in 0..n
    {
      let prev = kept[ ( i + n - 1 ) % n ];
      let cur = kept[ i ];
      let next = kept[ ( i + 1 ) % n ];
      let cross = ( cur.x - prev.x ) * ( next.y - prev.y ) - ( cur.y - prev.y ) * ( next.x - prev.x );
      if cross * cross > REDUNDANT_POINT_TOLERANCE_SQ
      {
        simplified.push( cur );
      }
    }
    if simplified.len() < 3 { kept } else { simplified }
  }

  /// Smooths one traced polygon into a fractional [`ContourPolygon`].
  ///
  /// # Errors
  /// Fails with `InvalidState` if the resulting path's first and last points
  /// do not close within `1.0 + GAP_TOLERANCE`.
  pub fn smooth( polygon : &PolygonPoints, mode : Smoothing ) -> Result< ContourPolygon >
  {
    let area = polygon.voxel_counts().foreground + polygon.voxel_counts().other;
    let pts = effective_points( polygon.points(), polygon.is_inner_contour() );

    if pts.len() <= 1
    {
      let diamond = pts.first().map_or_else( Vec::new, | &p | single_pixel_diamond( p, DEFAULT_OUTER_EDGE_SHIFT ) );
      check_gap( &diamond )?;
      return Ok( ContourPolygon::new( diamond, area ) );
    }

    match mode
    {
      Smoothing::None =>
      {
        let path = outer_edge_path( &pts, polygon.is_inner_contour(), DEFAULT_OUTER_EDGE_SHIFT );
        check_gap( &path )?;
        Ok( ContourPolygon::new( path, area ) )
      }
      Smoothing::Small =>
      {
        let raw = outer_edge_path( &pts, polygon.is_inner_contour(), 0.0 );
        check_gap( &raw )?;
        let mut rounded : Vec< IVec2 > = raw.iter().map( | p | IVec2::new( p.x.round() as i64, p.y.round() as i64 ) ).collect();
        rounded.dedup();
        if rounded.len() > 1 && rounded.first() == rounded.last()
        {
          rounded.pop();
        }
        let collapsed = substitute_patterns( &rounded )?;
        let shifted : Vec< Point2 > = collapsed.iter().map( | p | Point2::new( p.x - 0.5, p.y - 0.5 ) ).collect();
        let cleaned = remove_redundant( &shifted );
        Ok( ContourPolygon::new( cleaned, area ) )
      }
    }
  }

  /// Finds the outer edge crossing `x == sx`, closest in `y` to `sy`.
  fn nearest_crossing( points : &[ Point2 ], sx : f64, sy : f64 ) -> Option< ( usize, f64 ) >
  {
    let n = points.len();
    let mut best : Option< ( usize, f64 ) > = None;
    for i in 0..n
    {
      let a = points[ i ];
      let b = points[ ( i + 1 ) % n ];
      let ( lo, hi ) = if a.x <= b.x { ( a.x, b.x ) } else { ( b.x, a.x ) };
      if sx < lo || sx > hi || ( a.x - b.x ).abs() < f64::EPSILON
      {
        continue;
      }
      let t = ( sx - a.x ) / ( b.x - a.x );
      let y = a.y + t * ( b.y - a.y );
      if best.map_or( true, | ( _, by ) | ( y - sy ).abs() < ( by - sy ).abs() )
      {
        best = Some( ( i, y ) );
      }
    }
    best
  }

  /// Stitches `inner` into `outer` through a zero-width vertical slit at
  /// `inner`'s first point's X coordinate, producing one simple ring that
  /// carries both boundaries. Repeat per hole to splice more than one.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if `outer` has no edge crossing the vertical
  /// line through `inner`'s first point.
  pub fn splice( outer : &ContourPolygon, inner : &ContourPolygon ) -> Result< ContourPolygon >
  {
    let Some( &connection ) = inner.points().first() else
    {
      return Ok( outer.clone() );
    };
    let ( edge_i, crossing_y ) = nearest_crossing( outer.points(), connection.x, connection.y )
      .ok_or_else( || Error::invalid_argument( "outer ring has no edge crossing the hole's connection column" ) )?;
    let bridge = Point2::new( connection.x, crossing_y );

    let mut points = Vec::with_capacity( outer.len() + inner.len() + 4 );
    points.extend_from_slice( &outer.points()[ 0..=edge_i ] );
    points.push( bridge );
    points.push( connection );
    points.extend_from_slice( &inner.points()[ 1.. ] );
    points.push( connection );
    points.push( bridge );
    points.extend_from_slice( &outer.points()[ edge_i + 1.. ] );

    Ok( ContourPolygon::new( points, outer.region_area_pixels() + inner.region_area_pixels() ) )
  }

  /// Folds [`splice`] over every inner polygon, in order.
  ///
  /// # Errors
  /// See [`splice`].
  pub fn splice_all( outer : &ContourPolygon, inners : &[ ContourPolygon ] ) -> Result< ContourPolygon >
  {
    inners.iter().try_fold( outer.clone(), | acc, inner | splice( &acc, inner ) )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use polygon::VoxelCounts;

    #[ test ]
    fn single_pixel_smooths_to_unit_diamond()
    {
      let pts = PolygonPoints::new
      (
        polygon::PolygonId( 1 ), vec![ IVec2::new( 1, 1 ) ],
        VoxelCounts { foreground : 1, other : 0 }, polygon::PolygonId::NONE,
        false, IVec2::new( 1, 1 ), 0,
      );
      let out = smooth( &pts, Smoothing::Small ).unwrap();
      assert_eq!( out.region_area_pixels(), 1 );
      let expected =
      [
        Point2::new( 1.5, 0.5 ), Point2::new( 0.5, 1.5 ),
        Point2::new( -0.5, 0.5 ), Point2::new( 0.5, -0.5 ),
      ];
      for e in expected
      {
        assert!( out.points().iter().any( | p | p.distance_squared( &e ) < 1e-9 ), "missing {e:?} in {:?}", out.points() );
      }
    }

    #[ test ]
    fn none_mode_path_closes_within_gap_tolerance()
    {
      // A 2x2 solid square's outer walk.
      let boundary = vec!
      [
        IVec2::new( 0, 0 ), IVec2::new( 1, 0 ), IVec2::new( 1, 1 ), IVec2::new( 0, 1 ),
      ];
      let pts = PolygonPoints::new
      (
        polygon::PolygonId( 1 ), boundary, VoxelCounts { foreground : 4, other : 0 },
        polygon::PolygonId::NONE, false, IVec2::new( 0, 0 ), 0,
      );
      let out = smooth( &pts, Smoothing::None ).unwrap();
      assert!( !out.is_empty() );
      let first = *out.points().first().unwrap();
      let last = *out.points().last().unwrap();
      assert!( first.distance( &last ) <= 1.0 + GAP_TOLERANCE );
    }

    #[ test ]
    fn splice_preserves_total_region_area()
    {
      let outer = ContourPolygon::new
      (
        vec!
        [
          Point2::new( 0.0, 0.0 ), Point2::new( 4.0, 0.0 ),
          Point2::new( 4.0, 4.0 ), Point2::new( 0.0, 4.0 ),
        ],
        16,
      );
      let inner = ContourPolygon::new
      (
        vec!
        [
          Point2::new( 1.0, 1.0 ), Point2::new( 1.0, 2.0 ),
          Point2::new( 2.0, 2.0 ), Point2::new( 2.0, 1.0 ),
        ],
        4,
      );
      let spliced = splice( &outer, &inner ).unwrap();
      assert_eq!( spliced.region_area_pixels(), 20 );
      // outer and inner points once each, plus the connection point and the
      // bridge point each appearing twice (the two slit walls).
      assert_eq!( spliced.len(), outer.len() + inner.len() + 3 );
    }

    #[ test ]
    fn splice_rejects_column_outer_does_not_cross()
    {
      let outer = ContourPolygon::new
      (
        vec!
        [
          Point2::new( 0.0, 0.0 ), Point2::new( 2.0, 0.0 ),
          Point2::new( 2.0, 2.0 ), Point2::new( 0.0, 2.0 ),
        ],
        4,
      );
      let inner = ContourPolygon::new( vec![ Point2::new( 5.0, 1.0 ), Point2::new( 5.0, 1.5 ) ], 0 );
      assert!( splice( &outer, &inner ).is_err() );
    }

    #[ test ]
    fn turn_string_classifies_straight_and_turning_square()
    {
      let square = vec![ IVec2::new( 0, 0 ), IVec2::new( 1, 0 ), IVec2::new( 1, 1 ), IVec2::new( 0, 1 ) ];
      let turns = turn_string( &square );
      assert_eq!( turns.len(), 4 );
      assert!( turns.iter().all( | &c | c == 'R' || c == 'L' ) );
    }

    #[ test ]
    fn substitute_patterns_emits_two_points_per_lone_corner()
    {
      // Every corner of a closed rectilinear square is a lone `R` (no adjacent
      // turn to fold into a longer pattern), so each should fall through to
      // the single-`R` fragment : two emitted points per corner.
      let square = vec![ IVec2::new( 0, 0 ), IVec2::new( 2, 0 ), IVec2::new( 2, 2 ), IVec2::new( 0, 2 ) ];
      let out = substitute_patterns( &square ).unwrap();
      assert_eq!( out.len(), 8 );
    }

    #[ test ]
    fn substitute_patterns_rejects_a_diagonal_step()
    {
      let degenerate = vec![ IVec2::new( 0, 0 ), IVec2::new( 1, 1 ), IVec2::new( 2, 0 ) ];
      assert!( substitute_patterns( &degenerate ).is_err() );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    Smoothing,
    smooth,
    splice,
    splice_all,
  };
}
