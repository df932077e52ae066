//! Record kinds and their per-kind field sets.
//!
//! # Responsibility
//! - Define the closed set of record types the shell knows about.
//! - Map class names to kinds and kinds to default field sets.
//!
//! # Invariants
//! - Class-name lookup is exact and case-sensitive.
//! - Every kind has exactly one registry entry.
//! - Declared field values are strings; no type coercion happens here.

use serde::{Deserialize, Serialize};

/// Closed set of record types.
///
/// Serialized by class name (`"User"`, `"Place"`, ...), which is also the
/// prefix of every store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    BaseModel,
    User,
    Place,
    State,
    City,
    Amenity,
    Review,
}

type BodyConstructor = fn() -> RecordBody;

/// Class name -> kind, in listing order.
static REGISTRY: &[(&str, RecordKind)] = &[
    ("BaseModel", RecordKind::BaseModel),
    ("User", RecordKind::User),
    ("Place", RecordKind::Place),
    ("State", RecordKind::State),
    ("City", RecordKind::City),
    ("Amenity", RecordKind::Amenity),
    ("Review", RecordKind::Review),
];

fn base_model_body() -> RecordBody {
    RecordBody::BaseModel
}

fn user_body() -> RecordBody {
    RecordBody::User(User::default())
}

fn place_body() -> RecordBody {
    RecordBody::Place(Place::default())
}

fn state_body() -> RecordBody {
    RecordBody::State(State::default())
}

fn city_body() -> RecordBody {
    RecordBody::City(City::default())
}

fn amenity_body() -> RecordBody {
    RecordBody::Amenity(Amenity::default())
}

fn review_body() -> RecordBody {
    RecordBody::Review(Review::default())
}

impl RecordKind {
    /// Resolves a class name (e.g. `"User"`) to its kind.
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(entry_name, _)| *entry_name == name)
            .map(|(_, kind)| *kind)
    }

    /// Class name used in store keys, the `__class__` tag and output.
    pub fn name(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::Place => "Place",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Review => "Review",
        }
    }

    /// All kinds in registry order.
    pub fn all() -> impl Iterator<Item = RecordKind> {
        REGISTRY.iter().map(|(_, kind)| *kind)
    }

    /// Default body constructor for this kind.
    fn constructor(self) -> BodyConstructor {
        match self {
            Self::BaseModel => base_model_body,
            Self::User => user_body,
            Self::Place => place_body,
            Self::State => state_body,
            Self::City => city_body,
            Self::Amenity => amenity_body,
            Self::Review => review_body,
        }
    }
}

macro_rules! field_set {
    ($(#[$meta:meta])* $name:ident { $($field:ident = $default:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: String,)*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: String::from($default),)*
                }
            }
        }

        impl $name {
            /// Declared field names in wire order.
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

            pub fn get(&self, name: &str) -> Option<&str> {
                match name {
                    $(stringify!($field) => Some(self.$field.as_str()),)*
                    _ => None,
                }
            }

            pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
                match name {
                    $(stringify!($field) => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

field_set!(
    /// Account holder.
    User {
        email = "",
        password = "",
        first_name = "",
        last_name = "",
    }
);

field_set!(
    /// Rentable place. Numeric fields keep their textual form.
    Place {
        city_id = "",
        user_id = "",
        name = "",
        description = "",
        number_rooms = "0",
        number_bathrooms = "0",
        max_guest = "0",
        price_by_night = "0",
        latitude = "0.0",
        longitude = "0.0",
    }
);

field_set!(State { name = "" });

field_set!(City {
    state_id = "",
    name = "",
});

field_set!(Amenity { name = "" });

field_set!(Review {
    place_id = "",
    user_id = "",
    text = "",
});

/// Kind-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    BaseModel,
    User(User),
    Place(Place),
    State(State),
    City(City),
    Amenity(Amenity),
    Review(Review),
}

impl RecordBody {
    /// Builds the default body for `kind`.
    pub fn new(kind: RecordKind) -> Self {
        (kind.constructor())()
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::BaseModel => RecordKind::BaseModel,
            Self::User(_) => RecordKind::User,
            Self::Place(_) => RecordKind::Place,
            Self::State(_) => RecordKind::State,
            Self::City(_) => RecordKind::City,
            Self::Amenity(_) => RecordKind::Amenity,
            Self::Review(_) => RecordKind::Review,
        }
    }

    /// Declared field names for this body's kind.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::BaseModel => &[],
            Self::User(_) => User::FIELDS,
            Self::Place(_) => Place::FIELDS,
            Self::State(_) => State::FIELDS,
            Self::City(_) => City::FIELDS,
            Self::Amenity(_) => Amenity::FIELDS,
            Self::Review(_) => Review::FIELDS,
        }
    }

    /// Reads a declared field.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            Self::BaseModel => None,
            Self::User(fields) => fields.get(name),
            Self::Place(fields) => fields.get(name),
            Self::State(fields) => fields.get(name),
            Self::City(fields) => fields.get(name),
            Self::Amenity(fields) => fields.get(name),
            Self::Review(fields) => fields.get(name),
        }
    }

    /// Mutable access to a declared field; `None` for undeclared names.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match self {
            Self::BaseModel => None,
            Self::User(fields) => fields.field_mut(name),
            Self::Place(fields) => fields.field_mut(name),
            Self::State(fields) => fields.field_mut(name),
            Self::City(fields) => fields.field_mut(name),
            Self::Amenity(fields) => fields.field_mut(name),
            Self::Review(fields) => fields.field_mut(name),
        }
    }
}
