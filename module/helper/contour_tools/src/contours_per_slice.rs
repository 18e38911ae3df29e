//!
//! # Per-slice contour container
//!
//! The one shared-mutable structure in this crate : an ordered mapping
//! from slice index to a list of `ContourPolygon`, safe to read and bulk-write
//! from multiple threads, firing a single coarse "reset" notification per
//! mutation.
//!

mod private
{
  use crate::*;
  use error::{ Error, Result };
  use polygon::ContourPolygon;
  use std::collections::HashMap;
  use std::panic::AssertUnwindSafe;
  use std::sync::RwLock;

  /// The single notification kind fired by a mutation. Coarse by design : callers that need finer-grained deltas must diff two
  /// snapshots themselves.
  #[ derive( Debug, Clone, Copy, PartialEq, Eq ) ]
  pub enum ContoursPerSliceEvent
  {
    /// The container's contents changed ; re-read via `slices_with_contours`.
    Reset,
  }

  type Observer = Box< dyn Fn( ContoursPerSliceEvent ) + Send + Sync >;

  struct Inner
  {
    slices : HashMap< i64, Vec< ContourPolygon > >,
    observers : Vec< Observer >,
  }

  /// A thread-safe slice-index -> polygon-list map.
  ///
  /// All accesses take the container's single `RwLock` ; observer callbacks run
  /// while the write lock is held, so they must be short and must not re-enter
  /// the container.
  pub struct ContoursPerSlice
  {
    inner : RwLock< Inner >,
  }

  impl Default for ContoursPerSlice
  {
    #[ inline ]
    fn default() -> Self
    {
      Self::new()
    }
  }

  impl ContoursPerSlice
  {
    /// Creates an empty container.
    #[ inline ]
    pub fn new() -> Self
    {
      Self { inner : RwLock::new( Inner { slices : HashMap::new(), observers : Vec::new() } ) }
    }

    /// Registers an observer invoked (with the lock held) after every mutation.
    pub fn subscribe( &self, observer : impl Fn( ContoursPerSliceEvent ) + Send + Sync + 'static )
    {
      self.inner.write().expect( "lock not poisoned : observer panics are caught" ).observers.push( Box::new( observer ) );
    }

    /// Slice indices currently holding at least one polygon, in a snapshot
    /// taken under the lock. Enumeration order is unspecified beyond this.
    pub fn slices_with_contours( &self ) -> Vec< i64 >
    {
      let guard = self.inner.read().expect( "lock not poisoned" );
      let mut keys : Vec< i64 > = guard.slices.keys().copied().collect();
      keys.sort_unstable();
      keys
    }

    /// Number of slices holding at least one non-empty polygon list.
    #[ inline ]
    pub fn slice_count( &self ) -> usize
    {
      self.inner.read().expect( "lock not poisoned" ).slices.len()
    }

    /// Whether `index` currently holds a non-empty polygon list.
    #[ inline ]
    pub fn contains_key( &self, index : i64 ) -> bool
    {
      self.inner.read().expect( "lock not poisoned" ).slices.contains_key( &index )
    }

    /// The polygon list at `index`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `index` holds no entry.
    pub fn contours_for_slice( &self, index : i64 ) -> Result< Vec< ContourPolygon > >
    {
      self.try_contours_for_slice( index )
        .ok_or_else( || Error::out_of_range( format!( "no contours recorded for slice {index}" ) ) )
    }

    /// As `contours_for_slice`, but returns `None` instead of failing.
    pub fn try_contours_for_slice( &self, index : i64 ) -> Option< Vec< ContourPolygon > >
    {
      self.inner.read().expect( "lock not poisoned" ).slices.get( &index ).cloned()
    }

    /// The smallest and largest slice index currently holding contours.
    ///
    /// # Errors
    /// Fails with `InvalidState` if the container is empty.
    pub fn min_max_slices( &self ) -> Result< ( i64, i64 ) >
    {
      let guard = self.inner.read().expect( "lock not poisoned" );
      let min = guard.slices.keys().min().copied();
      let max = guard.slices.keys().max().copied();
      match ( min, max )
      {
        ( Some( lo ), Some( hi ) ) => Ok( ( lo, hi ) ),
        _ => Err( Error::invalid_state( "min_max_slices on an empty container" ) ),
      }
    }

    /// Atomically clears the container, then copies every non-empty entry of
    /// `other` in. Fires one `Reset` notification.
    pub fn replace( &self, other : &HashMap< i64, Vec< ContourPolygon > > )
    {
      let mut guard = self.inner.write().expect( "lock not poisoned" );
      guard.slices.clear();
      for ( &index, polys ) in other
      {
        if !polys.is_empty()
        {
          guard.slices.insert( index, polys.clone() );
        }
      }
      notify( &mut guard, ContoursPerSliceEvent::Reset );
    }

    /// For each entry of `other` : inserts/overwrites a non-empty list, or
    /// removes the key entirely if `other`'s list for it is empty. Fires one
    /// `Reset` notification.
    pub fn append( &self, other : &HashMap< i64, Vec< ContourPolygon > > )
    {
      let mut guard = self.inner.write().expect( "lock not poisoned" );
      for ( &index, polys ) in other
      {
        if polys.is_empty()
        {
          guard.slices.remove( &index );
        }
        else
        {
          guard.slices.insert( index, polys.clone() );
        }
      }
      notify( &mut guard, ContoursPerSliceEvent::Reset );
    }
  }

  /// Invokes every observer, isolating a panicking observer from the rest and
  /// from poisoning the lock (observer failure is otherwise unhandled).
  fn notify( guard : &mut Inner, event : ContoursPerSliceEvent )
  {
    for observer in &guard.observers
    {
      let result = std::panic::catch_unwind( AssertUnwindSafe( || observer( event ) ) );
      if result.is_err()
      {
        log::error!( "ContoursPerSlice observer panicked; ignoring" );
      }
    }
  }

  #[ cfg( test ) ]
  mod tests
  {
    use super::*;
    use geometry::Point2;
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use std::sync::Arc;

    fn poly() -> ContourPolygon
    {
      ContourPolygon::new( vec![ Point2::new( 0.0, 0.0 ), Point2::new( 1.0, 0.0 ), Point2::new( 1.0, 1.0 ) ], 1 )
    }

    #[ test ]
    fn replace_keeps_only_non_empty_entries()
    {
      let container = ContoursPerSlice::new();
      let mut data = HashMap::new();
      data.insert( 0, vec![ poly() ] );
      data.insert( 1, vec![] );
      container.replace( &data );
      assert!( container.contains_key( 0 ) );
      assert!( !container.contains_key( 1 ) );
      assert_eq!( container.slice_count(), 1 );
    }

    #[ test ]
    fn append_overwrites_and_removes_empty()
    {
      let container = ContoursPerSlice::new();
      let mut initial = HashMap::new();
      initial.insert( 0, vec![ poly() ] );
      initial.insert( 1, vec![ poly() ] );
      container.replace( &initial );

      let mut delta = HashMap::new();
      delta.insert( 1, vec![] );
      delta.insert( 2, vec![ poly(), poly() ] );
      container.append( &delta );

      assert!( container.contains_key( 0 ) );
      assert!( !container.contains_key( 1 ) );
      assert_eq!( container.contours_for_slice( 2 ).unwrap().len(), 2 );
    }

    #[ test ]
    fn missing_slice_errors()
    {
      let container = ContoursPerSlice::new();
      assert!( container.contours_for_slice( 5 ).is_err() );
      assert!( container.try_contours_for_slice( 5 ).is_none() );
    }

    #[ test ]
    fn min_max_on_empty_errors()
    {
      let container = ContoursPerSlice::new();
      assert!( container.min_max_slices().is_err() );
    }

    #[ test ]
    fn min_max_reports_bounds()
    {
      let container = ContoursPerSlice::new();
      let mut data = HashMap::new();
      data.insert( -2, vec![ poly() ] );
      data.insert( 5, vec![ poly() ] );
      container.replace( &data );
      assert_eq!( container.min_max_slices().unwrap(), ( -2, 5 ) );
    }

    #[ test ]
    fn observer_fires_once_per_mutation()
    {
      let container = ContoursPerSlice::new();
      let count = Arc::new( AtomicUsize::new( 0 ) );
      let count_clone = Arc::clone( &count );
      container.subscribe( move | _ | { count_clone.fetch_add( 1, Ordering::SeqCst ); } );
      let mut data = HashMap::new();
      data.insert( 0, vec![ poly() ] );
      container.replace( &data );
      container.append( &data );
      assert_eq!( count.load( Ordering::SeqCst ), 2 );
    }

    #[ test ]
    fn panicking_observer_does_not_poison_lock()
    {
      let container = ContoursPerSlice::new();
      container.subscribe( | _ | panic!( "misbehaving observer" ) );
      let mut data = HashMap::new();
      data.insert( 0, vec![ poly() ] );
      container.replace( &data );
      assert!( container.contains_key( 0 ) );
    }
  }
}

crate::mod_interface!
{
  own use
  {
    ContoursPerSlice,
    ContoursPerSliceEvent,
  };
}
