//! Legacy VTK format constants and header types.

/// First line of every legacy file starts with this.
pub const HEADER_MAGIC: &str = "# vtk DataFile Version";

/// Maximum length of the title line, per the format.
pub const MAX_TITLE_LEN: usize = 256;

/// Payload encoding declared on the third header line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    /// Big-endian binary payloads.
    Binary,
}

impl Encoding {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        if kw.eq_ignore_ascii_case("ASCII") {
            Some(Self::Ascii)
        } else if kw.eq_ignore_ascii_case("BINARY") {
            Some(Self::Binary)
        } else {
            None
        }
    }
}

/// Dataset structures the importer understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    UnstructuredGrid,
    PolyData,
}

impl DatasetKind {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        if kw.eq_ignore_ascii_case("UNSTRUCTURED_GRID") {
            Some(Self::UnstructuredGrid)
        } else if kw.eq_ignore_ascii_case("POLYDATA") {
            Some(Self::PolyData)
        } else {
            None
        }
    }
}

/// Element type of a data block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    UnsignedChar,
    Char,
    UnsignedShort,
    Short,
    UnsignedInt,
    Int,
    UnsignedLong,
    Long,
    Int64,
    UInt64,
    IdType,
    Float,
    Double,
}

impl ScalarType {
    /// Parse a data type keyword. `bit` is not supported.
    pub fn from_keyword(kw: &str) -> Option<Self> {
        let ty = match kw.to_ascii_lowercase().as_str() {
            "unsigned_char" => Self::UnsignedChar,
            "char" | "signed_char" => Self::Char,
            "unsigned_short" => Self::UnsignedShort,
            "short" => Self::Short,
            "unsigned_int" => Self::UnsignedInt,
            "int" => Self::Int,
            "unsigned_long" => Self::UnsignedLong,
            "long" => Self::Long,
            "vtktypeint64" => Self::Int64,
            "vtktypeuint64" => Self::UInt64,
            "vtkidtype" => Self::IdType,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        };
        Some(ty)
    }

    /// Size of one element in a binary payload.
    pub fn byte_size(self) -> usize {
        match self {
            Self::UnsignedChar | Self::Char => 1,
            Self::UnsignedShort | Self::Short => 2,
            Self::UnsignedInt | Self::Int | Self::IdType | Self::Float => 4,
            Self::UnsignedLong | Self::Long | Self::Int64 | Self::UInt64 | Self::Double => 8,
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

/// Parsed file header.
#[derive(Clone, Debug, PartialEq)]
pub struct VtkHeader {
    /// Version from the first line, e.g. "3.0" or "5.1".
    pub version: String,
    pub title: String,
    pub encoding: Encoding,
    pub dataset: DatasetKind,
}

/// Decode `%xx` escapes used by the legacy writer for array names.
pub fn decode_name(raw: &str) -> String {
    if !raw.contains('%') {
        return raw.to_string();
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types() {
        assert_eq!(ScalarType::from_keyword("FLOAT"), Some(ScalarType::Float));
        assert_eq!(ScalarType::from_keyword("vtktypeint64"), Some(ScalarType::Int64));
        assert_eq!(ScalarType::from_keyword("bit"), None);
        assert_eq!(ScalarType::Double.byte_size(), 8);
        assert_eq!(ScalarType::IdType.byte_size(), 4);
        assert!(ScalarType::Float.is_float());
        assert!(!ScalarType::Int.is_float());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(Encoding::from_keyword("binary"), Some(Encoding::Binary));
        assert_eq!(Encoding::from_keyword("XML"), None);
        assert_eq!(
            DatasetKind::from_keyword("unstructured_grid"),
            Some(DatasetKind::UnstructuredGrid)
        );
        assert_eq!(DatasetKind::from_keyword("STRUCTURED_POINTS"), None);
    }

    #[test]
    fn test_decode_name() {
        assert_eq!(decode_name("pressure"), "pressure");
        assert_eq!(decode_name("Wall%20Shear"), "Wall Shear");
        assert_eq!(decode_name("100%"), "100%");
        assert_eq!(decode_name("a%zzb"), "a%zzb");
    }
}
