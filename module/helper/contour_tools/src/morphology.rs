//!
//! # Morphology
//!
//! Ellipsoidal structuring-element dilation and erosion. The
//! ellipsoid's surface offsets are cached once and reused by the "surface
//! only" fast paths : painting a convex SE's surface offsets at every surface
//! voxel of the input covers the same voxels as painting the full SE at every
//! foreground voxel, because any point the full SE would reach from an
//! interior voxel is already reached from some boundary voxel on the way to
//! it, or is already foreground itself.
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };
  use geometry::IVec3;
  use grid::Grid3D;
  use std::collections::HashSet;

  /// An ellipsoidal binary structuring element, built from half-sizes in
  /// voxels.
  #[ derive( Debug, Clone ) ]
  pub struct StructuringElement
  {
    half : IVec3,
    offsets : Vec< IVec3 >,
    surface_offsets : Vec< IVec3 >,
  }

  impl StructuringElement
  {
    /// Builds the ellipsoid of half-sizes `(nx, ny, nz)` voxels (diameter
    /// `2n+1` per axis). A zero half-size is treated as `1` inside the
    /// implicit-form inequality only, so the axis stays flat (diameter 1)
    /// while the other axes' extents are unaffected.
    ///
    /// # Errors
    /// Fails with `InvalidArgument` if any half-size is negative.
    pub fn ellipsoid( nx : i64, ny : i64, nz : i64 ) -> Result< Self >
    {
      if nx < 0 || ny < 0 || nz < 0
      {
        return Err( Error::invalid_argument( "structuring element half-sizes must be non-negative" ) );
      }
      let enx = i128::from( if nx == 0 { 1 } else { nx } );
      let eny = i128::from( if ny == 0 { 1 } else { ny } );
      let enz = i128::from( if nz == 0 { 1 } else { nz } );
      let rhs = ( enx * eny * enz ).pow( 2 );

      let mut offsets = Vec::new();
      for z in -nz..=nz
      {
        for y in -ny..=ny
        {
          for x in -nx..=nx
          {
            let lhs = i128::from( x ).pow( 2 ) * ( eny * enz ).pow( 2 )
              + i128::from( y ).pow( 2 ) * ( enx * enz ).pow( 2 )
              + i128::from( z ).pow( 2 ) * ( enx * eny ).pow( 2 );
            if lhs <= rhs
            {
              offsets.push( IVec3::new( x, y, z ) );
            }
          }
        }
      }

      let set : HashSet< IVec3 > = offsets.iter().copied().collect();
      const FACE_NEIGHBOURS : [ ( i64, i64, i64 ) ; 6 ] = [ ( 1, 0, 0 ), ( -1, 0, 0 ), ( 0, 1, 0 ), ( 0, -1, 0 ), ( 0, 0, 1 ), ( 0, 0, -1 ) ];
      let surface_offsets = offsets.iter().copied().filter( | &o |
      {
        FACE_NEIGHBOURS.iter().any( | &( dx, dy, dz ) | !set.contains( &IVec3::new( o.x + dx, o.y + dy, o.z + dz ) ) )
      } ).collect();

      Ok( Self { half : IVec3::new( nx, ny, nz ), offsets, surface_offsets } )
    }

    /// Every offset (from the ellipsoid's centre) that is foreground.
    #[ inline ]
    pub fn offsets( &self ) -> &[ IVec3 ] { &self.offsets }

    /// Offsets with at least one background 1-connected neighbour, or that lie
    /// on the mask's own edge.
    #[ inline ]
    pub fn surface_offsets( &self ) -> &[ IVec3 ] { &self.surface_offsets }

    /// Half-sizes this element was built from.
    #[ inline ]
    pub fn half_sizes( &self ) -> IVec3 { self.half }
  }

  fn half_sizes_voxels( margin_mm : ( f64, f64, f64 ), mask : &Grid3D< u8 > ) -> Result< ( i64, i64, i64 ) >
  {
    let ( mx, my, mz ) = margin_mm;
    if mx < 0.0 || my < 0.0 || mz < 0.0
    {
      return Err( Error::invalid_argument( "morphology margins must be non-negative" ) );
    }
    Ok
    (
      (
        ( mx / mask.spacing_x() ).round() as i64,
        ( my / mask.spacing_y() ).round() as i64,
        ( mz / mask.spacing_z() ).round() as i64,
      )
    )
  }

  fn paint_offsets
  (
    input : &Grid3D< u8 >, out : &mut Grid3D< u8 >, foreground : u8, background : u8,
    restriction : Option< &Grid3D< u8 > >, seeds : impl Iterator< Item = ( i64, i64, i64 ) >, offsets : &[ IVec3 ],
  ) -> Result< () >
  {
    for ( x, y, z ) in seeds
    {
      if *input.get( x, y, z )? != foreground
      {
        continue;
      }
      for offset in offsets
      {
        let ( tx, ty, tz ) = ( x + offset.x, y + offset.y, z + offset.z );
        if out.linear_index( tx, ty, tz ).is_err()
        {
          continue;
        }
        if let Some( restriction ) = restriction
        {
          if *restriction.get( tx, ty, tz )? == background
          {
            continue;
          }
        }
        out.set( tx, ty, tz, foreground )?;
      }
    }
    Ok( () )
  }

  fn all_voxels( mask : &Grid3D< u8 > ) -> impl Iterator< Item = ( i64, i64, i64 ) > + '_
  {
    ( 0..mask.dim_z() as i64 ).flat_map( move | z |
      ( 0..mask.dim_y() as i64 ).flat_map( move | y | ( 0..mask.dim_x() as i64 ).map( move | x | ( x, y, z ) ) ) )
  }

  /// Whether `(x, y, z)` is a surface voxel of `mask`'s foreground : it has a
  /// 1-connected background neighbour, or lies on the grid's own edge.
  fn is_surface_voxel( mask : &Grid3D< u8 >, foreground : u8, x : i64, y : i64, z : i64 ) -> bool
  {
    const FACE_NEIGHBOURS : [ ( i64, i64, i64 ) ; 6 ] = [ ( 1, 0, 0 ), ( -1, 0, 0 ), ( 0, 1, 0 ), ( 0, -1, 0 ), ( 0, 0, 1 ), ( 0, 0, -1 ) ];
    FACE_NEIGHBOURS.iter().any( | &( dx, dy, dz ) |
    {
      match mask.get( x + dx, y + dy, z + dz )
      {
        Ok( &v ) => v != foreground,
        Err( _ ) => true,
      }
    } )
  }

  /// Dilates `mask` by physical margins `(mx, my, mz)` mm, painting every
  /// foreground voxel's full structuring element onto a copy of `mask`. A
  /// `restriction` mask, if given, blocks painting wherever it reads
  /// `background`.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if any margin is negative.
  pub fn dilate( mask : &Grid3D< u8 >, margin_mm : ( f64, f64, f64 ), foreground : u8, background : u8, restriction : Option< &Grid3D< u8 > > ) -> Result< Grid3D< u8 > >
  {
    let ( nx, ny, nz ) = half_sizes_voxels( margin_mm, mask )?;
    log::debug!( "dilate : margins {margin_mm:?} -> half-sizes ({nx}, {ny}, {nz})" );
    let se = StructuringElement::ellipsoid( nx, ny, nz )?;
    let mut out = mask.clone();
    paint_offsets( mask, &mut out, foreground, background, restriction, all_voxels( mask ), se.offsets() )?;
    Ok( out )
  }

  /// As `dilate`, but only paints the structuring element's surface offsets,
  /// seeded only from the input's own surface voxels — the documented fast
  /// path, equivalent to `dilate` for a connected input (see module
  /// doc comment).
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if any margin is negative.
  pub fn dilate_surface_only( mask : &Grid3D< u8 >, margin_mm : ( f64, f64, f64 ), foreground : u8, background : u8, restriction : Option< &Grid3D< u8 > > ) -> Result< Grid3D< u8 > >
  {
    let ( nx, ny, nz ) = half_sizes_voxels( margin_mm, mask )?;
    let se = StructuringElement::ellipsoid( nx, ny, nz )?;
    let mut out = mask.clone();
    let seeds : Vec< _ > = all_voxels( mask ).filter( | &( x, y, z ) | *mask.get( x, y, z ).expect( "from all_voxels" ) == foreground && is_surface_voxel( mask, foreground, x, y, z ) ).collect();
    log::debug!( "dilate_surface_only : {} surface seed voxels, half-sizes ({nx}, {ny}, {nz})", seeds.len() );
    paint_offsets( mask, &mut out, foreground, background, restriction, seeds.into_iter(), se.surface_offsets() )?;
    Ok( out )
  }

  /// Erodes `mask` by physical margins `(mx, my, mz)` mm : dilates the
  /// complement by the same element and flips the result back.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if any margin is negative.
  pub fn erode( mask : &Grid3D< u8 >, margin_mm : ( f64, f64, f64 ), foreground : u8, background : u8, restriction : Option< &Grid3D< u8 > > ) -> Result< Grid3D< u8 > >
  {
    let complement = mask.map( | &v | if v == foreground { background } else { foreground } );
    let dilated = dilate( &complement, margin_mm, foreground, background, restriction )?;
    Ok( dilated.map( | &v | if v == foreground { background } else { foreground } ) )
  }

  /// Surface-only fast path of `erode`, via `dilate_surface_only` on the
  /// complement.
  ///
  /// # Errors
  /// Fails with `InvalidArgument` if any margin is negative.
  pub fn erode_surface_only( mask : &Grid3D< u8 >, margin_mm : ( f64, f64, f64 ), foreground : u8, background : u8, restriction : Option< &Grid3D< u8 > > ) -> Result< Grid3D< u8 > >
  {
    let complement = mask.map( | &v | if v == foreground { background } else { foreground } );
    let dilated = dilate_surface_only( &complement, margin_mm, foreground, background, restriction )?;
    Ok( dilated.map( | &v | if v == foreground { background } else { foreground } ) )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::{ Direction3, Point3 };

    fn single_voxel_mask() -> Grid3D< u8 >
    {
      let mut g = Grid3D::< u8 >::new( 9, 9, 9, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
      g.set( 4, 4, 4, 1 ).unwrap();
      g
    }

    #[ test ]
    fn ellipsoid_zero_radii_is_a_single_point()
    {
      let se = StructuringElement::ellipsoid( 0, 0, 0 ).unwrap();
      assert_eq!( se.offsets(), &[ IVec3::new( 0, 0, 0 ) ] );
    }

    #[ test ]
    fn ellipsoid_flattens_zero_radius_axis()
    {
      let se = StructuringElement::ellipsoid( 2, 2, 0 ).unwrap();
      assert!( se.offsets().iter().all( | o | o.z == 0 ) );
      assert!( se.offsets().len() > 1 );
    }

    #[ test ]
    fn dilate_by_zero_margin_is_identity()
    {
      let mask = single_voxel_mask();
      let dilated = dilate( &mask, ( 0.0, 0.0, 0.0 ), 1, 0, None ).unwrap();
      assert_eq!( dilated, mask );
    }

    #[ test ]
    fn dilate_then_erode_recovers_input_away_from_border()
    {
      let mask = single_voxel_mask();
      let dilated = dilate( &mask, ( 1.0, 1.0, 1.0 ), 1, 0, None ).unwrap();
      let eroded = erode( &dilated, ( 1.0, 1.0, 1.0 ), 1, 0, None ).unwrap();
      assert_eq!( eroded, mask );
    }

    #[ test ]
    fn dilate_surface_only_matches_dilate_for_single_voxel()
    {
      let mask = single_voxel_mask();
      let full = dilate( &mask, ( 2.0, 2.0, 2.0 ), 1, 0, None ).unwrap();
      let fast = dilate_surface_only( &mask, ( 2.0, 2.0, 2.0 ), 1, 0, None ).unwrap();
      assert_eq!( full, fast );
    }

    #[ test ]
    fn restriction_mask_blocks_painting()
    {
      let mask = single_voxel_mask();
      let mut restriction = mask.create_same_size::< u8 >();
      // Only allow painting at the centre voxel itself.
      restriction.set( 4, 4, 4, 1 ).unwrap();
      let dilated = dilate( &mask, ( 1.0, 1.0, 1.0 ), 1, 0, Some( &restriction ) ).unwrap();
      assert_eq!( dilated, mask );
    }

    #[ test ]
    fn negative_margin_errors()
    {
      let mask = single_voxel_mask();
      assert!( dilate( &mask, ( -1.0, 0.0, 0.0 ), 1, 0, None ).is_err() );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    StructuringElement,
    dilate,
    dilate_surface_only,
    erode,
    erode_surface_only,
  };
}
