use crate::internal::Sealed;

macro_rules! markers {
    { $( $(#[$meta:meta])* $ident:ident, )* } => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $ident;
        impl Sealed for $ident {}
        impl Marker for $ident {}
    )*};
}

markers! {
    /// Untyped identifier, mostly for tests.
    AnyMarker,
    RoleMarker,
    UserMarker,
}

/// Restricts which types can be used as the generic of [`Id`].
///
/// [`Id`]: super::Id
pub trait Marker: Sealed {}
