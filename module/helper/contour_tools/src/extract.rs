//!
//! # Contour extractor
//!
//! Moore-neighbour boundary tracing in 8-connectivity, plus the worklist that
//! turns one trace into a full nested hierarchy of outer/hole/insert polygons.
//! The central trick that keeps outer, hole and insert tracing a single
//! piece of code: every nested trace is "confined" to the parent's marked
//! region, and whether a trace goes clockwise from a real seed (an even nesting
//! level — top-level outers and inserts, which are solid foreground blobs) or
//! counter-clockwise from a fake seed one row above a background pixel (an odd
//! nesting level — holes) is decided purely by the new polygon's nesting level
//! parity.
//!

mod private
{
  use crate::*;
  use std::collections::{ HashMap, VecDeque };
  use std::sync::Mutex;
  use collaborators::{ ParallelFor, RayonParallelFor };
  use constants::{ BG, DEFAULT_MAX_NESTING, FG };
  use error::{ Error, Result };
  use fill::fill_with_counts;
  use geometry::{ IVec2, Point2 };
  use grid::Grid2D;
  use polygon::{ ContourPolygon, InnerOuterPolygon, PolygonId, PolygonPoints, VoxelCounts };

  /// The 8 Moore neighbours, clockwise starting at `(+1, 0)` (image convention,
  /// Y increasing downward).
  const DIRS8 : [ ( i64, i64 ) ; 8 ] =
  [
    ( 1, 0 ), ( 1, 1 ), ( 0, 1 ), ( -1, 1 ),
    ( -1, 0 ), ( -1, -1 ), ( 0, -1 ), ( 1, -1 ),
  ];

  /// Walks a closed boundary in 8-connectivity, starting at `start` with
  /// `search_index` as the initial neighbour-search offset into `DIRS8`.
  /// `is_member` decides whether a candidate pixel belongs to the boundary
  /// being traced. Returns the ordered, closed list of visited pixels ; a
  /// single-element result means no neighbour qualified (degenerate 1-pixel
  /// region).
  fn trace_boundary( start : IVec2, search_index : usize, is_member : impl Fn( IVec2 ) -> bool, max_steps : usize ) -> Vec< IVec2 >
  {
    let mut boundary = vec![ start ];
    let mut current = start;
    let mut index = search_index;
    for _ in 0..max_steps
    {
      let mut found = None;
      for k in 0..8
      {
        let idx = ( index + k ) % 8;
        let ( dx, dy ) = DIRS8[ idx ];
        let candidate = IVec2::new( current.x + dx, current.y + dy );
        if is_member( candidate )
        {
          found = Some( ( candidate, idx ) );
          break;
        }
      }
      let Some( ( next, idx ) ) = found else { break };
      if next == start
      {
        break;
      }
      boundary.push( next );
      current = next;
      index = ( idx + 6 ) % 8;
    }
    boundary
  }

  /// Whether nesting level `level` is traced clockwise from a real seed
  /// (`true`) — top-level outers and inserts — or counter-clockwise from a
  /// fake seed (`false`) — holes.
  #[ inline ]
  fn is_outer_style( level : u32 ) -> bool
  {
    level % 2 == 0
  }

  /// Marks `boundary`'s interior (and rim) as `id` and tallies foreground/other
  /// against `expected`. A single-pixel boundary has no area for the scanline
  /// filler to find an edge in, so it is counted directly.
  fn fill_and_count
  (
    boundary : &[ IVec2 ],
    marks : &mut Grid2D< u16 >,
    id : u16,
    mask : &Grid2D< u8 >,
    expected : u8,
  ) -> Result< VoxelCounts >
  {
    if let [ p ] = *boundary
    {
      marks.set( p.x, p.y, id )?;
      let counts = if *mask.get( p.x, p.y )? == expected
      {
        VoxelCounts { foreground : 1, other : 0 }
      }
      else
      {
        VoxelCounts { foreground : 0, other : 1 }
      };
      return Ok( counts );
    }
    let poly = ContourPolygon::new( boundary.iter().map( | &v | Point2::from( v ) ).collect(), 0 );
    let ( _, counts ) = fill_with_counts( &poly, marks, id, mask, expected );
    Ok( counts )
  }

  /// Finds the first pixel (row-major) inside `polygon`'s bounding box that is
  /// marked as belonging to `owner` but whose mask value differs from
  /// `expected` — the seed for a nested trace.
  fn find_anomaly
  (
    points : &[ IVec2 ],
    marks : &Grid2D< u16 >,
    mask : &Grid2D< u8 >,
    owner : PolygonId,
    expected : u8,
  ) -> Option< IVec2 >
  {
    let min_x = points.iter().map( | p | p.x ).min()?;
    let max_x = points.iter().map( | p | p.x ).max()?;
    let min_y = points.iter().map( | p | p.y ).min()?;
    let max_y = points.iter().map( | p | p.y ).max()?;
    for y in min_y..=max_y
    {
      for x in min_x..=max_x
      {
        if *marks.get( x, y ).ok()? == owner.0 && *mask.get( x, y ).ok()? != expected
        {
          return Some( IVec2::new( x, y ) );
        }
      }
    }
    None
  }

  /// Extracts the full nested hierarchy of polygons from a binary 2D slice
  /// with an explicit first polygon id and nesting bound.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if `first_new_polygon_id == 0` (reserved for
  /// "no polygon").
  pub fn polygons_with_holes
  (
    mask : &Grid2D< u8 >,
    foreground : u8,
    first_new_polygon_id : u16,
    max_nesting : u32,
  ) -> Result< Vec< InnerOuterPolygon > >
  {
    if first_new_polygon_id == 0
    {
      return Err( Error::invalid_argument( "first new polygon id must not be 0" ) );
    }

    let dim_x = mask.dim_x();
    let dim_y = mask.dim_y();
    let max_steps = dim_x * dim_y * 8 + 8;
    let mut marks = Grid2D::< u16 >::new
    (
      dim_x, dim_y, mask.spacing_x(), mask.spacing_y(), mask.origin(), mask.direction(),
    )?;

    let mut next_id = first_new_polygon_id;
    let mut arena : HashMap< PolygonId, PolygonPoints > = HashMap::new();
    let mut children_of : HashMap< PolygonId, Vec< PolygonId > > = HashMap::new();
    let mut worklist : VecDeque< PolygonId > = VecDeque::new();

    for y in 0..dim_y as i64
    {
      for x in 0..dim_x as i64
      {
        if *marks.get( x, y )? != PolygonId::NONE.0 || *mask.get( x, y )? != foreground
        {
          continue;
        }
        let start = IVec2::new( x, y );
        let is_member = | c : IVec2 |
        {
          c.x >= 0 && c.y >= 0 && ( c.x as usize ) < dim_x && ( c.y as usize ) < dim_y
          && *marks.get( c.x, c.y ).expect( "bounds checked above" ) == PolygonId::NONE.0
          && *mask.get( c.x, c.y ).expect( "bounds checked above" ) == foreground
        };
        let boundary = trace_boundary( start, 0, is_member, max_steps );
        let id = PolygonId( next_id );
        next_id += 1;
        let counts = fill_and_count( &boundary, &mut marks, id.0, mask, foreground )?;
        let points = PolygonPoints::new( id, boundary, counts, PolygonId::NONE, false, start, 0 );
        arena.insert( id, points );
        worklist.push_back( id );
      }
    }

    while let Some( id ) = worklist.pop_front()
    {
      let parent = arena.get( &id ).expect( "every queued id was inserted into arena" ).clone();
      if parent.voxel_counts().other == 0 || parent.nesting_level() >= max_nesting
      {
        continue;
      }
      let child_level = parent.nesting_level() + 1;
      let parent_expected = if is_outer_style( parent.nesting_level() ) { foreground } else { BG };
      let child_expected = if is_outer_style( child_level ) { foreground } else { BG };

      let Some( anomaly ) = find_anomaly( parent.points(), &marks, mask, id, parent_expected ) else { continue };

      let ( start, search_index ) = if is_outer_style( child_level )
      {
        ( anomaly, 0 )
      }
      else
      {
        ( IVec2::new( anomaly.x, anomaly.y - 1 ), 2 )
      };
      let is_member = | c : IVec2 |
      {
        c.x >= 0 && c.y >= 0 && ( c.x as usize ) < dim_x && ( c.y as usize ) < dim_y
        && *marks.get( c.x, c.y ).expect( "bounds checked above" ) == id.0
        && *mask.get( c.x, c.y ).expect( "bounds checked above" ) == child_expected
      };
      let boundary = trace_boundary( start, search_index, is_member, max_steps );
      let child_id = PolygonId( next_id );
      next_id += 1;
      let counts = fill_and_count( &boundary, &mut marks, child_id.0, mask, child_expected )?;
      let is_inner = !is_outer_style( child_level );
      let child = PolygonPoints::new( child_id, boundary, counts, id, is_inner, start, child_level );
      arena.insert( child_id, child );
      children_of.entry( id ).or_default().push( child_id );
      worklist.push_back( child_id );
      worklist.push_back( id );
    }

    let mut outers : Vec< PolygonId > = arena.values()
      .filter( | p | is_outer_style( p.nesting_level() ) )
      .map( PolygonPoints::id )
      .collect();
    outers.sort_by_key( | id | id.0 );

    Ok
    (
      outers.into_iter().map( | id |
      {
        let outer = arena.get( &id ).expect( "id came from arena" ).clone();
        let inners = children_of.get( &id ).map( | ids |
        {
          let mut v : Vec< PolygonPoints > = ids.iter().map( | cid | arena.get( cid ).expect( "child id came from arena" ).clone() ).collect();
          v.sort_by_key( PolygonPoints::id );
          v
        } ).unwrap_or_default();
        InnerOuterPolygon::new( outer, inners )
      } ).collect()
    )
  }

  /// `polygons_with_holes` with `first_new_polygon_id = 1` and
  /// `max_nesting = DEFAULT_MAX_NESTING`.
  ///
  /// # Errors
  /// See `polygons_with_holes` ; cannot fail with these defaults.
  pub fn polygons_with_holes_default( mask : &Grid2D< u8 >, foreground : u8 ) -> Result< Vec< InnerOuterPolygon > >
  {
    polygons_with_holes( mask, foreground, 1, DEFAULT_MAX_NESTING )
  }

  /// Tunables for a batch extraction run, mirroring
  /// the pack's `vectorizer::layers::config::Config` shape : a plain struct with
  /// a `Default` impl carrying the core's own constants.
  #[ derive( Debug, Clone, Copy ) ]
  pub struct ExtractConfig
  {
    /// Foreground voxel value (`FG` by default).
    pub foreground : u8,
    /// Nesting bound passed to `polygons_with_holes` (`DEFAULT_MAX_NESTING`
    /// by default).
    pub max_nesting : u32,
  }

  impl Default for ExtractConfig
  {
    fn default() -> Self
    {
      Self { foreground : FG, max_nesting : DEFAULT_MAX_NESTING }
    }
  }

  /// How a caller folds a batch's per-slice results (partial-failure
  /// policy). The core itself always computes every slice regardless of this
  /// choice — computing "fail fast" inside the core would require an ordering
  /// guarantee the concurrency model does not make — this only governs how
  /// `apply` consumes the already-computed batch.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
  pub enum FailPolicy
  {
    /// Stop folding at (and drop) the first failing slice and everything after
    /// it, even if later slices in the batch succeeded.
    FailFast,
    /// Keep every slice that succeeded, regardless of where failures fall.
    RunToCompletion,
  }

  impl FailPolicy
  {
    /// Folds a batch's `(index, Result<...>)` pairs down to the slices this
    /// policy keeps, in `results`' original order.
    pub fn apply( self, results : Vec< ( i64, Result< Vec< PolygonPoints > > ) > ) -> Vec< ( i64, Vec< PolygonPoints > ) >
    {
      match self
      {
        Self::RunToCompletion => results.into_iter().filter_map( | ( z, r ) | r.ok().map( | p | ( z, p ) ) ).collect(),
        Self::FailFast => results.into_iter()
          .take_while( | ( _, r ) | r.is_ok() )
          .map( | ( z, r ) | ( z, r.expect( "take_while guards Ok" ) ) )
          .collect(),
      }
    }
  }

  /// Flattens one slice's nested hierarchy into a single list : the outer
  /// polygon of every group followed by its inner polygons, in the order
  /// `polygons_with_holes` returned the groups.
  fn flatten_groups( groups : Vec< InnerOuterPolygon > ) -> Vec< PolygonPoints >
  {
    groups.into_iter().flat_map( | g |
    {
      let ( outer, inners ) = ( g.outer().clone(), g.inners().to_vec() );
      std::iter::once( outer ).chain( inners )
    } ).collect()
  }

  /// Runs `polygons_with_holes` independently over every `(index, mask)` pair
  /// of `slices`, distributed across the collaborator thread pool, collecting
  /// one outcome per slice without aborting the batch when one slice fails.
  /// Output order matches `slices`' order ; use `FailPolicy::apply` to
  /// fold the result down to the slices a caller actually wants.
  pub fn extract_batch( slices : &[ ( i64, Grid2D< u8 > ) ], config : &ExtractConfig ) -> Vec< ( i64, Result< Vec< PolygonPoints > > ) >
  {
    log::debug!( "extract_batch : {} slices, max_nesting = {}", slices.len(), config.max_nesting );
    let slots : Vec< Mutex< Option< ( i64, Result< Vec< PolygonPoints > > ) > > > = ( 0..slices.len() ).map( | _ | Mutex::new( None ) ).collect();
    RayonParallelFor.for_each( slices.len(), &| i |
    {
      let ( index, mask ) = &slices[ i ];
      log::trace!( "extract_batch : tracing slice {index}" );
      let result = polygons_with_holes( mask, config.foreground, 1, config.max_nesting ).map( flatten_groups );
      if let Err( ref e ) = result
      {
        log::trace!( "extract_batch : slice {index} failed : {e}" );
      }
      *slots[ i ].lock().expect( "not poisoned : polygons_with_holes never panics" ) = Some( ( *index, result ) );
    } );
    slots.into_iter().map( | slot | slot.into_inner().expect( "not poisoned" ).expect( "every index was visited" ) ).collect()
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::Direction2;

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

    #[ test ]
    fn rejects_zero_first_id()
    {
      let g = Grid2D::< u8 >::new( 2, 2, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
      assert!( polygons_with_holes( &g, 1, 0, 6 ).is_err() );
    }

    #[ test ]
    fn single_pixel_mask_produces_one_pixel_walk()
    {
      let mask = grid_from_rows( &[ &[ 0, 0, 0 ], &[ 0, 1, 0 ], &[ 0, 0, 0 ] ] );
      let result = polygons_with_holes_default( &mask, 1 ).unwrap();
      assert_eq!( result.len(), 1 );
      let outer = result[ 0 ].outer();
      assert_eq!( outer.points(), &[ IVec2::new( 1, 1 ) ] );
      assert_eq!( outer.nesting_level(), 0 );
      assert!( !outer.is_inner_contour() );
      assert!( result[ 0 ].inners().is_empty() );
    }

    #[ test ]
    fn square_with_hole_yields_outer_and_one_inner()
    {
      // 7x7, FG on [1..5]x[1..5] minus the [2..4]x[2..4] hole : 16 rim pixels.
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
      let mask = grid_from_rows( &row_refs );

      let result = polygons_with_holes_default( &mask, 1 ).unwrap();
      assert_eq!( result.len(), 1 );
      let group = &result[ 0 ];
      assert_eq!( group.outer().points().len(), 16 );
      assert_eq!( group.outer().voxel_counts().other, 9 );
      assert_eq!( group.inners().len(), 1 );
      let inner = &group.inners()[ 0 ];
      assert!( inner.is_inner_contour() );
      assert_eq!( inner.nesting_level(), 1 );
    }

    #[ test ]
    fn nesting_parity_holds_for_every_discovered_polygon()
    {
      let mut rows = vec![ vec![ 0_u8 ; 7 ] ; 7 ];
      for y in 1..=5 { for x in 1..=5 { rows[ y ][ x ] = 1; } }
      for y in 2..=4 { for x in 2..=4 { rows[ y ][ x ] = 0; } }
      let row_refs : Vec< &[ u8 ] > = rows.iter().map( Vec::as_slice ).collect();
      let mask = grid_from_rows( &row_refs );
      let result = polygons_with_holes_default( &mask, 1 ).unwrap();
      for group in &result
      {
        assert!( group.outer().nesting_parity_holds() );
        for inner in group.inners()
        {
          assert!( inner.nesting_parity_holds() );
        }
      }
    }

    fn single_pixel_mask( at : ( i64, i64 ), dim : usize ) -> Grid2D< u8 >
    {
      let mut g = Grid2D::< u8 >::new( dim, dim, 1.0, 1.0, Point2::default(), Direction2::identity() ).unwrap();
      g.set( at.0, at.1, 1 ).unwrap();
      g
    }

    #[ test ]
    fn extract_batch_runs_every_slice_and_preserves_order()
    {
      let slices = vec!
      [
        ( 5_i64, single_pixel_mask( ( 1, 1 ), 3 ) ),
        ( 2_i64, single_pixel_mask( ( 0, 0 ), 3 ) ),
      ];
      let results = extract_batch( &slices, &ExtractConfig::default() );
      assert_eq!( results.iter().map( | ( z, _ ) | *z ).collect::< Vec< _ > >(), vec![ 5, 2 ] );
      for ( _, result ) in &results
      {
        assert_eq!( result.as_ref().unwrap().len(), 1 );
      }
    }

    #[ test ]
    fn fail_policy_run_to_completion_keeps_every_success()
    {
      let results = vec!
      [
        ( 0_i64, Ok( vec![] ) ),
        ( 1_i64, Err( Error::invalid_state( "boom" ) ) ),
        ( 2_i64, Ok( vec![] ) ),
      ];
      let kept = FailPolicy::RunToCompletion.apply( results );
      assert_eq!( kept.iter().map( | ( z, _ ) | *z ).collect::< Vec< _ > >(), vec![ 0, 2 ] );
    }

    #[ test ]
    fn fail_policy_fail_fast_stops_at_first_error()
    {
      let results = vec!
      [
        ( 0_i64, Ok( vec![] ) ),
        ( 1_i64, Err( Error::invalid_state( "boom" ) ) ),
        ( 2_i64, Ok( vec![] ) ),
      ];
      let kept = FailPolicy::FailFast.apply( results );
      assert_eq!( kept.iter().map( | ( z, _ ) | *z ).collect::< Vec< _ > >(), vec![ 0 ] );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    polygons_with_holes,
    polygons_with_holes_default,
    ExtractConfig,
    FailPolicy,
    extract_batch,
  };
}
