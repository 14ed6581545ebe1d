use core::fmt;
use core::num::NonZeroU32;

macro_rules! table_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Index `index` of its table, stored as index + 1.
            pub fn from_index(index: usize) -> Self {
                let raw = u32::try_from(index)
                    .unwrap_or(u32::MAX - 1)
                    .saturating_add(1);
                Self(NonZeroU32::MIN.saturating_add(raw - 1))
            }

            pub fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " #{}"), self.index())
            }
        }
    };
}

table_id!(
    /// Position of a product species in a `SpeciesTable`.
    SpeciesId,
    "species"
);
table_id!(
    /// Position of a reactant in a `PropellantTable`.
    PropellantId,
    "propellant"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for i in [0_usize, 1, 2, 42, 10_000] {
            assert_eq!(SpeciesId::from_index(i).index(), i);
            assert_eq!(PropellantId::from_index(i).index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<SpeciesId>(),
            core::mem::size_of::<Option<SpeciesId>>()
        );
    }

    #[test]
    fn display_names_the_table() {
        assert_eq!(PropellantId::from_index(3).to_string(), "propellant #3");
    }
}
