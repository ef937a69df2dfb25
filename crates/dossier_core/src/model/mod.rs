//! Domain entities, their storage rows, and the row mappers between them.
//!
//! # Responsibility
//! - Define the canonical records used by repositories and services.
//! - Convert flat storage rows into rich domain values without I/O.
//!
//! # Invariants
//! - Every entity is identified by a store-assigned `EntityId`.
//! - Row types only hold storage primitives; entities never do string dates.
//!
//! # See also
//! - `repo::base_repo` for how rows are fetched and mapped.

/// Declares an enum stored as a text label.
///
/// Reading is total: text outside the known labels maps to `Other` and
/// keeps the stored value verbatim, so a row written by another client
/// never fails a listing. Serde uses the same label as storage.
macro_rules! stored_label_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$variant_meta])* $variant,)+
            /// Stored label outside the known set, kept as written.
            Other(String),
        }

        impl $name {
            pub const KNOWN: &'static [Self] = &[$(Self::$variant),+];

            /// Storage label.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(value) => value.as_str(),
                }
            }

            /// Maps a stored label; never fails.
            pub fn from_db(value: &str) -> Self {
                match value {
                    $($label => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_db(&value))
            }
        }
    };
}

pub mod antecedent;
pub mod medical_record;
pub mod patient;
pub mod row;
pub mod user;

/// Store-assigned primary key shared by all entities.
pub type EntityId = i64;
