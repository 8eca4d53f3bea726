/// For naming a new enum, passing in what type it converts to and
/// from, and providing a mapping from variants to expressions (such
/// as `libc` consts or kernel header values) that will ultimately be
/// written to or read from the wire.
///
/// # Usage
///
/// ```
/// wifi_scan::impl_var!(
///     /// Attributes of a made-up family.
///     pub MyAttrs, u16,
///     Id => 16u16,
///     Name => 17u16
/// );
///
/// assert_eq!(u16::from(MyAttrs::Name), 17);
/// assert_eq!(MyAttrs::from(99u16), MyAttrs::UnrecognizedVariant(99));
/// ```
///
/// Values the kernel sends that have no matching variant are kept in
/// `UnrecognizedVariant` rather than rejected so newer kernels do not
/// break parsing.
#[macro_export]
macro_rules! impl_var {
    (
        $( #[$outer:meta] )*
        $vis:vis $name:ident, $ty:ty,
        $(
            $( #[cfg($meta:meta)] )*
            $var:ident => $val:expr
        ),*
    ) => (
        $(#[$outer])*
        #[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        $vis enum $name {
            $(
                $(
                    #[cfg($meta)]
                )*
                #[allow(missing_docs)]
                $var,
            )*
            /// Variant that signifies an invalid value while
            /// deserializing
            UnrecognizedVariant($ty),
        }

        impl $name {
            /// Returns true if no variant corresponds to the value
            /// it was parsed from
            pub fn is_unrecognized(&self) -> bool {
                matches!(*self, $name::UnrecognizedVariant(_))
            }
        }

        impl From<$ty> for $name {
            fn from(v: $ty) -> Self {
                match v {
                    $(
                        $(
                            #[cfg($meta)]
                        )*
                        i if i == $val => $name::$var,
                    )*
                    i => $name::UnrecognizedVariant(i)
                }
            }
        }

        impl From<$name> for $ty {
            fn from(v: $name) -> Self {
                match v {
                    $(
                        $(
                            #[cfg($meta)]
                        )*
                        $name::$var => $val,
                    )*
                    $name::UnrecognizedVariant(i) => i,
                }
            }
        }

        impl<'a> From<&'a $name> for $ty {
            fn from(v: &'a $name) -> Self {
                <$ty>::from(*v)
            }
        }
    );
}
