//! Headers keyed by an enum
//!
//! A [`ColumnEnum`] lists its members in declaration order together with
//! their identifiers and discriminants. The header picks one of three lookup
//! strategies when it is built:
//!
//! - `Raw`: the discriminant of every key is already its column position
//! - `Array`: discriminants are exactly `0..N` but columns are reordered
//! - `Map`: anything else (gaps, negative values)

use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;
use tabula_core::{Error, Result};

use crate::header::Header;
use crate::name::required_names;

mod sealed {
    pub trait Sealed {}
}

/// Integer types allowed as enum discriminants
pub trait Discriminant: sealed::Sealed + Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// Widen to `i64`
    fn to_i64(self) -> i64;
}

macro_rules! impl_discriminant {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl Discriminant for $t {
                #[inline]
                fn to_i64(self) -> i64 {
                    i64::from(self)
                }
            }
        )*
    };
}

impl_discriminant!(i8, u8, i16, u16, i32, u32);

/// An enum whose members name CSV columns
///
/// Usually implemented with [`column_enum!`](crate::column_enum).
pub trait ColumnEnum: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Underlying integer type
    type Repr: Discriminant;

    /// All members, in declaration order
    const MEMBERS: &'static [Self];

    /// The member's identifier
    fn name(self) -> &'static str;

    /// The member's integer value
    fn discriminant(self) -> Self::Repr;
}

/// Define a field-less enum and implement [`ColumnEnum`] for it
///
/// ```rust
/// use tabula_header::{column_enum, ColumnEnum};
///
/// column_enum! {
///     pub enum Rifle: u8 {
///         Manufacturer,
///         Name,
///         Cartridge = 5,
///     }
/// }
///
/// assert_eq!(Rifle::MEMBERS.len(), 3);
/// assert_eq!(Rifle::Cartridge.name(), "Cartridge");
/// assert_eq!(Rifle::Cartridge.discriminant(), 5);
/// ```
#[macro_export]
macro_rules! column_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident $(= $value:expr)? ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant $(= $value)? ),+
        }

        impl $crate::ColumnEnum for $name {
            type Repr = $repr;

            const MEMBERS: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }

            fn discriminant(self) -> $repr {
                self as $repr
            }
        }
    };
}

/// Check that `E` can key a header: at least one member, unique
/// discriminants and unique identifiers
pub fn validate_column_enum<E: ColumnEnum>() -> Result<()> {
    let type_name = std::any::type_name::<E>();

    if E::MEMBERS.is_empty() {
        return Err(Error::InvalidColumnEnum(format!("{type_name} has no members")));
    }

    let mut values = AHashMap::with_capacity(E::MEMBERS.len());
    let mut names = AHashMap::with_capacity(E::MEMBERS.len());
    for &member in E::MEMBERS {
        if let Some(previous) = values.insert(member.discriminant(), member) {
            return Err(Error::InvalidColumnEnum(format!(
                "{type_name}::{} and {type_name}::{} share the value {}",
                previous.name(),
                member.name(),
                member.discriminant()
            )));
        }
        if names.insert(member.name(), member).is_some() {
            return Err(Error::InvalidColumnEnum(format!(
                "{type_name} lists {} more than once",
                member.name()
            )));
        }
    }

    Ok(())
}

/// Which lookup an [`EnumHeader`] uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStrategy {
    /// Discriminant is the column position
    Raw,
    /// Discriminant indexes a position table
    Array,
    /// Hash map from member to position
    Map,
}

#[derive(Debug, Clone)]
enum EnumLookup<E> {
    Raw,
    Array(Box<[usize]>),
    Map(AHashMap<E, usize>),
}

impl<E: ColumnEnum> EnumLookup<E> {
    /// Pick the cheapest lookup for `columns` (members in column order)
    fn build(columns: &[E]) -> Self {
        let len = columns.len();
        let dense = columns
            .iter()
            .all(|c| usize::try_from(c.discriminant().to_i64()).map_or(false, |d| d < len));

        if !dense {
            return EnumLookup::Map(Self::map(columns));
        }

        let raw = columns
            .iter()
            .enumerate()
            .all(|(i, c)| c.discriminant().to_i64() == i as i64);
        if raw {
            return EnumLookup::Raw;
        }

        let mut positions = vec![0; len];
        for (i, c) in columns.iter().enumerate() {
            positions[c.discriminant().to_i64() as usize] = i;
        }
        EnumLookup::Array(positions.into_boxed_slice())
    }

    fn map(columns: &[E]) -> AHashMap<E, usize> {
        columns.iter().enumerate().map(|(i, &c)| (c, i)).collect()
    }

    fn index_of(&self, key: E, len: usize) -> Option<usize> {
        match self {
            EnumLookup::Raw => usize::try_from(key.discriminant().to_i64())
                .ok()
                .filter(|&i| i < len),
            EnumLookup::Array(positions) => usize::try_from(key.discriminant().to_i64())
                .ok()
                .and_then(|d| positions.get(d).copied()),
            EnumLookup::Map(map) => map.get(&key).copied(),
        }
    }

    fn strategy(&self) -> LookupStrategy {
        match self {
            EnumLookup::Raw => LookupStrategy::Raw,
            EnumLookup::Array(_) => LookupStrategy::Array,
            EnumLookup::Map(_) => LookupStrategy::Map,
        }
    }
}

/// Header whose columns are identified by enum members
///
/// ```rust
/// use tabula_header::{column_enum, EnumHeader, Header, LookupStrategy};
///
/// column_enum! {
///     enum Rifle: u8 { Manufacturer, Name }
/// }
///
/// let header = EnumHeader::<Rifle>::with_names(["Name", "Manufacturer"])?;
/// assert_eq!(header.index_of(&Rifle::Manufacturer), Some(1));
/// assert_eq!(header.strategy(), LookupStrategy::Array);
/// # Ok::<(), tabula_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct EnumHeader<E: ColumnEnum> {
    names: Vec<String>,
    columns: Vec<E>,
    lookup: EnumLookup<E>,
}

impl<E: ColumnEnum> EnumHeader<E> {
    /// Header with one column per member, in declaration order
    pub fn new() -> Result<Self> {
        validate_column_enum::<E>()?;
        Ok(Self::from_columns(E::MEMBERS.to_vec()))
    }

    /// Header with explicit column order
    ///
    /// `names` must list every member identifier exactly once.
    pub fn with_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_column_enum::<E>()?;

        let by_name: AHashMap<&str, E> = E::MEMBERS.iter().map(|&m| (m.name(), m)).collect();
        let mut columns = Vec::with_capacity(E::MEMBERS.len());

        for name in names {
            let name = name.as_ref();
            let member = by_name.get(name).copied().ok_or_else(|| {
                Error::InvalidHeader(format!(
                    "'{name}' is not a member of {}",
                    std::any::type_name::<E>()
                ))
            })?;
            if columns.contains(&member) {
                return Err(Error::InvalidHeader(format!("duplicate column name '{name}'")));
            }
            columns.push(member);
        }

        if columns.len() != E::MEMBERS.len() {
            let missing: Vec<&str> = E::MEMBERS
                .iter()
                .filter(|m| !columns.contains(m))
                .map(|m| m.name())
                .collect();
            return Err(Error::InvalidHeader(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self::from_columns(columns))
    }

    /// Header from a parsed record; null names are rejected
    pub fn from_record(record: &[Option<String>]) -> Result<Self> {
        Self::with_names(required_names(record)?)
    }

    fn from_columns(columns: Vec<E>) -> Self {
        let lookup = EnumLookup::build(&columns);
        log::debug!(
            "{} header uses {:?} lookup",
            std::any::type_name::<E>(),
            lookup.strategy()
        );
        Self {
            names: columns.iter().map(|c| c.name().to_owned()).collect(),
            columns,
            lookup,
        }
    }

    /// Members in column order
    pub fn columns(&self) -> &[E] {
        &self.columns
    }

    /// The lookup chosen at construction
    pub fn strategy(&self) -> LookupStrategy {
        self.lookup.strategy()
    }
}

impl<E: ColumnEnum> Header for EnumHeader<E> {
    type Key = E;

    fn names(&self) -> &[String] {
        &self.names
    }

    fn index_of(&self, key: &E) -> Option<usize> {
        self.lookup.index_of(*key, self.columns.len())
    }

    fn describe_key(&self, key: &E) -> String {
        key.name().to_owned()
    }
}
