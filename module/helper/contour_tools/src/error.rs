//!
//! # Errors
//!

mod private
{
  use thiserror::Error;
  use std::borrow::Cow;

  /// Error kinds surfaced by every operation in this crate.
  ///
  /// Propagation is flat : the core never retries internally and never aborts a
  /// batch of independent slices because one of them failed (see
  /// `extract::FailPolicy`).
  #[ derive( Debug, Error ) ]
  pub enum Error
  {
    /// Null/empty input where not allowed, mismatched array lengths, a reserved
    /// sentinel value used where forbidden, or a value combination the caller
    /// must not produce.
    #[ error( "Invalid argument: `{0}`" ) ]
    InvalidArgument( Cow< 'static, str > ),

    /// An index or slice position outside the bounds the operation requires.
    #[ error( "Out of range: `{0}`" ) ]
    OutOfRange( Cow< 'static, str > ),

    /// The operation reached a state it cannot recover from given its inputs,
    /// e.g. the smoother failing to close a contour.
    #[ error( "Invalid state: `{0}`" ) ]
    InvalidState( Cow< 'static, str > ),

    /// A requested mode or variant is not implemented by this build.
    #[ error( "Not supported: `{0}`" ) ]
    NotSupported( Cow< 'static, str > ),
  }

  impl Error
  {
    /// Builds an `InvalidArgument` error from anything convertible to a
    /// `Cow<'static, str>`.
    #[ inline ]
    pub fn invalid_argument( msg : impl Into< Cow< 'static, str > > ) -> Self
    {
      Self::InvalidArgument( msg.into() )
    }

    /// Builds an `OutOfRange` error.
    #[ inline ]
    pub fn out_of_range( msg : impl Into< Cow< 'static, str > > ) -> Self
    {
      Self::OutOfRange( msg.into() )
    }

    /// Builds an `InvalidState` error.
    #[ inline ]
    pub fn invalid_state( msg : impl Into< Cow< 'static, str > > ) -> Self
    {
      Self::InvalidState( msg.into() )
    }

    /// Builds a `NotSupported` error.
    #[ inline ]
    pub fn not_supported( msg : impl Into< Cow< 'static, str > > ) -> Self
    {
      Self::NotSupported( msg.into() )
    }
  }

  /// Crate-wide result alias.
  pub type Result< T > = core::result::Result< T, Error >;
}

crate::mod_interface!
{
  own use
  {
    Error,
    Result,
  };
}
