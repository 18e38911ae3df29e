//!
//! # Slice operations
//!
//! Extracts axial (XY), coronal (XZ) and sagittal (YZ) 2D planes out of a 3D
//! volume, deriving the slice's dimensions, spacing, origin and 2x2
//! direction from the parent volume's geometry rather than recomputing them
//! ad hoc at every call site.
//!

mod private
{
  use crate::*;
  use collaborators::{ ParallelFor, RayonParallelFor };
  use error::{ Error, Result };
  use geometry::Point2;
  use grid::{ Grid2D, Grid3D };
  use std::sync::Mutex;

  /// The plane a slice is cut along, named the way the rest of this crate's
  /// domain (medical segmentation) names them rather than by bare axis index.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
  pub enum Orientation
  {
    /// XY plane, cut perpendicular to Z.
    Axial,
    /// XZ plane, cut perpendicular to Y.
    Coronal,
    /// YZ plane, cut perpendicular to X.
    Sagittal,
  }

  impl Orientation
  {
    /// Index of the axis a slice of this orientation is perpendicular to
    /// (0 = X, 1 = Y, 2 = Z).
    #[ inline ]
    pub fn fixed_axis( self ) -> usize
    {
      match self
      {
        Self::Axial => 2,
        Self::Coronal => 1,
        Self::Sagittal => 0,
      }
    }
  }

  /// Number of slices available along `orientation`'s fixed axis.
  pub fn slice_count< T >( volume : &Grid3D< T >, orientation : Orientation ) -> usize
  {
    match orientation
    {
      Orientation::Axial => volume.dim_z(),
      Orientation::Coronal => volume.dim_y(),
      Orientation::Sagittal => volume.dim_x(),
    }
  }

  /// Extracts the 2D plane of `volume` at `index` along `orientation`'s fixed
  /// axis, deriving dimensions, spacing, origin and direction from the volume.
  ///
  /// # Errors
  /// Fails with `OutOfRange` if `index` is outside the volume along that axis.
  pub fn extract_slice< T >( volume : &Grid3D< T >, orientation : Orientation, index : i64 ) -> Result< Grid2D< T > >
  where
    T : Clone + Default,
  {
    let count = slice_count( volume, orientation ) as i64;
    if index < 0 || index >= count
    {
      return Err( Error::out_of_range( format!( "slice index {index} outside volume ({count} slices along this axis)" ) ) );
    }

    let direction = volume.direction().drop_axis( orientation.fixed_axis() );
    match orientation
    {
      Orientation::Axial =>
      {
        let origin = volume.index_to_physical( 0.0, 0.0, index as f64 );
        let mut out = Grid2D::< T >::new( volume.dim_x(), volume.dim_y(), volume.spacing_x(), volume.spacing_y(), origin2( origin ), direction )?;
        for y in 0..volume.dim_y() as i64
        {
          for x in 0..volume.dim_x() as i64
          {
            out.set( x, y, volume.get( x, y, index )?.clone() )?;
          }
        }
        Ok( out )
      }
      Orientation::Coronal =>
      {
        let origin = volume.index_to_physical( 0.0, index as f64, 0.0 );
        let mut out = Grid2D::< T >::new( volume.dim_x(), volume.dim_z(), volume.spacing_x(), volume.spacing_z(), origin2( origin ), direction )?;
        for z in 0..volume.dim_z() as i64
        {
          for x in 0..volume.dim_x() as i64
          {
            out.set( x, z, volume.get( x, index, z )?.clone() )?;
          }
        }
        Ok( out )
      }
      Orientation::Sagittal =>
      {
        let origin = volume.index_to_physical( index as f64, 0.0, 0.0 );
        let mut out = Grid2D::< T >::new( volume.dim_y(), volume.dim_z(), volume.spacing_y(), volume.spacing_z(), origin2( origin ), direction )?;
        for z in 0..volume.dim_z() as i64
        {
          for y in 0..volume.dim_y() as i64
          {
            out.set( y, z, volume.get( index, y, z )?.clone() )?;
          }
        }
        Ok( out )
      }
    }
  }

  /// A 3D physical point has no direct `Point2` conversion (the planes don't
  /// share an axis naming), so slices simply drop the fixed axis' reading.
  #[ inline ]
  fn origin2( p : geometry::Point3 ) -> Point2
  {
    Point2::new( p.x, p.y )
  }

  /// Extracts every slice of `volume` along `orientation`, in ascending index
  /// order, distributed across the collaborator thread pool (`ParallelFor`).
  ///
  /// # Errors
  /// Never fails for a valid `volume` : every produced index is in range by
  /// construction.
  pub fn extract_all_slices< T >( volume : &Grid3D< T >, orientation : Orientation ) -> Result< Vec< Grid2D< T > > >
  where
    T : Clone + Default + Send + Sync,
  {
    let count = slice_count( volume, orientation );
    let slots : Vec< Mutex< Option< Result< Grid2D< T > > > > > = ( 0..count ).map( | _ | Mutex::new( None ) ).collect();
    RayonParallelFor.for_each( count, &| i |
    {
      let result = extract_slice( volume, orientation, i as i64 );
      *slots[ i ].lock().expect( "not poisoned : extract_slice never panics" ) = Some( result );
    } );
    slots.into_iter().map( | slot | slot.into_inner().expect( "not poisoned" ).expect( "every index was visited" ) ).collect()
  }

  /// Reverses `volume` along `axis` (0 = X, 1 = Y, 2 = Z), keeping spacing,
  /// origin and direction unchanged — callers needing the origin to track the
  /// flip must translate it themselves, symmetrically to how `crop` does for
  /// region extraction.
  fn mirror_axis< T >( volume : &Grid3D< T >, axis : usize ) -> Grid3D< T >
  where
    T : Clone,
  {
    volume.map_indexed( | x, y, z, _ |
    {
      let ( sx, sy, sz ) = match axis
      {
        0 => ( volume.dim_x() as i64 - 1 - x, y, z ),
        1 => ( x, volume.dim_y() as i64 - 1 - y, z ),
        _ => ( x, y, volume.dim_z() as i64 - 1 - z ),
      };
      volume.get( sx, sy, sz ).expect( "mirrored coordinate stays in bounds" ).clone()
    } )
  }

  /// Mirrors `volume` across the sagittal (X) axis. Applying this twice
  /// returns the original volume.
  pub fn mirror_sagittal< T >( volume : &Grid3D< T > ) -> Grid3D< T >
  where
    T : Clone,
  {
    mirror_axis( volume, 0 )
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::{ Direction3, Point3 };

    fn volume_3x3x2() -> Grid3D< u8 >
    {
      let mut v = Grid3D::< u8 >::new( 3, 3, 2, 1.0, 1.0, 1.0, Point3::default(), Direction3::identity() ).unwrap();
      for i in 0..v.buffer().len()
      {
        v.buffer_mut()[ i ] = i as u8;
      }
      v
    }

    #[ test ]
    fn axial_slice_matches_volume_plane()
    {
      let v = volume_3x3x2();
      let s = extract_slice( &v, Orientation::Axial, 1 ).unwrap();
      assert_eq!( s.dim_x(), 3 );
      assert_eq!( s.dim_y(), 3 );
      for y in 0..3
      {
        for x in 0..3
        {
          assert_eq!( *s.get( x, y ).unwrap(), *v.get( x, y, 1 ).unwrap() );
        }
      }
    }

    #[ test ]
    fn sagittal_slice_dimensions_are_yz()
    {
      let v = volume_3x3x2();
      let s = extract_slice( &v, Orientation::Sagittal, 0 ).unwrap();
      assert_eq!( s.dim_x(), 3 ); // dim_y of volume
      assert_eq!( s.dim_y(), 2 ); // dim_z of volume
    }

    #[ test ]
    fn out_of_range_index_errors()
    {
      let v = volume_3x3x2();
      assert!( extract_slice( &v, Orientation::Axial, 2 ).is_err() );
      assert!( extract_slice( &v, Orientation::Axial, -1 ).is_err() );
    }

    #[ test ]
    fn extract_all_slices_covers_every_index()
    {
      let v = volume_3x3x2();
      let slices = extract_all_slices( &v, Orientation::Axial ).unwrap();
      assert_eq!( slices.len(), 2 );
    }

    #[ test ]
    fn sagittal_mirror_twice_is_identity()
    {
      let v = volume_3x3x2();
      let mirrored_twice = mirror_sagittal( &mirror_sagittal( &v ) );
      assert_eq!( mirrored_twice, v );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    Orientation,
    slice_count,
    extract_slice,
    extract_all_slices,
    mirror_sagittal,
  };
}
