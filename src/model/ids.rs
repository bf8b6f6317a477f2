//! Newtype identifiers.
//!
//! Defines an integer-backed id wrapper and generates the boilerplate every
//! id type needs: `Display`, `From` conversions in both directions, and a
//! `value()` accessor. Keeps ids from being accidentally interchangeable
//! with each other or with a raw integer at a call site.
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::From<u64> for $name {
            fn from(v: u64) -> Self {
                $name(v)
            }
        }

        impl ::std::convert::From<$name> for u64 {
            fn from(v: $name) -> Self {
                v.0
            }
        }
    };
}

define_id_type!(PersonId);
define_id_type!(TemplateId);
define_id_type!(RunId);
define_id_type!(ConstraintId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_through_raw_value() {
        let id = PersonId::new(42);
        let raw: u64 = id.into();
        assert_eq!(raw, 42);
        assert_eq!(PersonId::from(raw), id);
    }

    #[test]
    fn id_displays_as_raw_value() {
        assert_eq!(TemplateId::new(7).to_string(), "7");
    }
}
