// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`]: `Display` impl mapping enum variants to string literals
//! - [`keyword_enum!`]: fieldless enum with `as_str`, `ALL`, `Display`, and
//!   case-sensitive `FromStr` over a fixed keyword list

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Unit variants match directly; data-carrying variants use `(..)` to ignore fields.
///
/// ```ignore
/// mon_core::simple_display! {
///     MyEnum {
///         Foo => "foo",
///         Bar(..) => "bar",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Generate a fixed keyword enum.
///
/// Produces the enum itself, an `ALL` slice in declaration order, `as_str()`,
/// a `Display` impl via [`simple_display!`], and a `parse_keyword()` lookup
/// that returns `None` for anything outside the list.
///
/// ```ignore
/// mon_core::keyword_enum! {
///     /// Known tables
///     pub enum Table {
///         Hosts => "hosts",
///         Services => "services",
///     }
/// }
/// ```
#[macro_export]
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $str:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every keyword, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $str, )+
                }
            }

            pub fn parse_keyword(s: &str) -> Option<Self> {
                match s {
                    $( $str => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        $crate::simple_display! {
            $name { $( $variant => $str, )+ }
        }
    };
}
