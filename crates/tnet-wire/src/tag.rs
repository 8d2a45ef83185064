use crate::error::WireError;

/// The one-byte type tag that closes every TNET string.
///
/// ```text
/// ┌──────┬─────────┬────────────────────────────────────────┐
/// │ Byte │ Tag     │ Payload                                │
/// ├──────┼─────────┼────────────────────────────────────────┤
/// │ ,    │ String  │ raw bytes                              │
/// │ #    │ Integer │ ASCII base-10 signed integer           │
/// │ ^    │ Float   │ ASCII base-10 float                    │
/// │ !    │ Boolean │ `true` or `false`                      │
/// │ ~    │ Null    │ empty                                  │
/// │ ]    │ List    │ concatenated nested TNET strings       │
/// │ }    │ Dict    │ concatenated key/value TNET strings    │
/// └──────┴─────────┴────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    List,
    Dict,
}

impl Tag {
    /// All tags, in wire-byte order of the table above.
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Integer,
        Self::Float,
        Self::Boolean,
        Self::Null,
        Self::List,
        Self::Dict,
    ];

    /// Map a wire byte to its tag.
    ///
    /// # Errors
    ///
    /// [`WireError::UnknownTag`] if `byte` is outside the tag set. `offset`
    /// is recorded in the error only.
    pub fn from_byte(byte: u8, offset: usize) -> Result<Self, WireError> {
        match byte {
            b',' => Ok(Self::String),
            b'#' => Ok(Self::Integer),
            b'^' => Ok(Self::Float),
            b'!' => Ok(Self::Boolean),
            b'~' => Ok(Self::Null),
            b']' => Ok(Self::List),
            b'}' => Ok(Self::Dict),
            _ => Err(WireError::UnknownTag { byte, offset }),
        }
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::String => b',',
            Self::Integer => b'#',
            Self::Float => b'^',
            Self::Boolean => b'!',
            Self::Null => b'~',
            Self::List => b']',
            Self::Dict => b'}',
        }
    }
}
