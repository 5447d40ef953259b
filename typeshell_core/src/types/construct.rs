use log::trace;
use typeshell_config::{LIST_SEPARATOR, MAX_TYPE_DEPTH};

use super::{Primitive, TypeDescriptor, Value};
use crate::error::ConstructError;
use crate::split::{split_list, QUOTES};

/// Builds a value of type `ty` from `text`.
///
/// # Errors
/// Returns a [`ConstructError`] describing the first piece of text that does
/// not fit its type, or [`ConstructError::TooDeep`] if `ty` nests deeper
/// than [`MAX_TYPE_DEPTH`].
pub fn construct(ty: &TypeDescriptor, text: &str) -> Result<Value, ConstructError> {
    construct_at(ty, text, 0)
}

/// Strips one `open`..`close` pair wrapping the whole text. `[1],[2]` starts
/// and ends with brackets that belong to different groups and stays as is.
pub(crate) fn strip_wrapping(text: &str, open: char, close: char) -> &str {
    let Some(inner) = text.strip_prefix(open).and_then(|inner| inner.strip_suffix(close)) else {
        return text;
    };
    if closing_offset(text, open, close) == Some(text.len() - close.len_utf8()) {
        inner
    } else {
        text
    }
}

/// Byte offset of the `close` matching the `open` that starts `text`.
/// Nested `open`..`close` pairs are counted, quoted text is skipped.
fn closing_offset(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (at, ch) in text.char_indices() {
        if let Some(closer) = quote {
            if ch == closer {
                quote = None;
            }
        } else if let Some(&(_, closer)) = QUOTES.iter().find(|(opener, _)| *opener == ch) {
            quote = Some(closer);
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(at);
            }
        }
    }
    None
}

fn construct_at(ty: &TypeDescriptor, text: &str, depth: usize) -> Result<Value, ConstructError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ConstructError::TooDeep { limit: MAX_TYPE_DEPTH });
    }

    match ty {
        TypeDescriptor::Primitive(primitive) => parse_primitive(*primitive, text),

        TypeDescriptor::Enum(enum_ty) => match enum_ty.find(text) {
            Some(member) => Ok(Value::Enum(member.name.clone())),
            None => {
                let names: Vec<&str> = enum_ty.members.iter().map(|m| m.name.as_str()).collect();
                Err(ConstructError::invalid(
                    &enum_ty.name,
                    text,
                    format!("expected one of: {}", names.join(", ")),
                ))
            }
        },

        TypeDescriptor::List(elem) => {
            let body = strip_wrapping(text, '[', ']');
            if body.is_empty() {
                return Ok(Value::List(Vec::new()));
            }
            split_list(body, LIST_SEPARATOR, false)?
                .into_iter()
                .map(|piece| construct_at(elem, piece, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }

        TypeDescriptor::Tuple(elems) => {
            let body = strip_wrapping(text, '(', ')');
            let pieces = if body.is_empty() && elems.is_empty() {
                Vec::new()
            } else {
                split_list(body, LIST_SEPARATOR, false)?
            };
            if pieces.len() != elems.len() {
                return Err(ConstructError::ArityMismatch {
                    expected: elems.len(),
                    got: pieces.len(),
                });
            }
            elems
                .iter()
                .zip(pieces)
                .map(|(elem, piece)| construct_at(elem, piece, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple)
        }

        TypeDescriptor::Union(alts) => {
            for alt in alts {
                match construct_at(alt, text, depth + 1) {
                    Ok(value) => return Ok(value),
                    Err(err @ ConstructError::TooDeep { .. }) => return Err(err),
                    Err(err) => trace!("{alt} rejected {text:?}: {err}"),
                }
            }
            Err(ConstructError::NoAlternative {
                type_name: ty.to_string(),
                text: text.to_string(),
            })
        }

        TypeDescriptor::Custom(custom) => custom.parse(text),
    }
}

/// Parses an integer with an optional sign and `0x`/`0o`/`0b` radix prefix.
fn parse_i128(text: &str) -> Option<i128> {
    if let Some(digits) = text.strip_prefix('-') {
        0i128.checked_sub_unsigned(parse_magnitude(digits)?)
    } else {
        i128::try_from(parse_u128(text)?).ok()
    }
}

fn parse_u128(text: &str) -> Option<u128> {
    parse_magnitude(text.strip_prefix('+').unwrap_or(text))
}

fn parse_magnitude(text: &str) -> Option<u128> {
    let (digits, radix) = if let Some(rest) = text.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = text.strip_prefix("0b") {
        (rest, 2)
    } else {
        (text, 10)
    };
    // from_str_radix accepts a leading '+' of its own
    if digits.starts_with(['+', '-']) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok()
}

fn parse_hexstr(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() || text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

macro_rules! signed {
    ($text:expr, $ty:ty) => {
        parse_i128($text)
            .filter(|v| <$ty>::try_from(*v).is_ok())
            .map(Value::Int)
    };
}

macro_rules! unsigned {
    ($text:expr, $ty:ty) => {
        parse_u128($text)
            .filter(|v| <$ty>::try_from(*v).is_ok())
            .map(Value::UInt)
    };
}

fn parse_primitive(primitive: Primitive, text: &str) -> Result<Value, ConstructError> {
    let parsed = match primitive {
        Primitive::Bool => Some(Value::Bool(!matches!(text, "" | "0" | "false" | "False"))),
        Primitive::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Some(Value::Char(ch)),
                _ => None,
            }
        }
        Primitive::Str => Some(Value::Str(text.to_string())),
        Primitive::Bytes => text.is_ascii().then(|| Value::Bytes(text.as_bytes().to_vec())),
        Primitive::HexStr => parse_hexstr(text).map(Value::Bytes),
        Primitive::I8 => signed!(text, i8),
        Primitive::I16 => signed!(text, i16),
        Primitive::I32 => signed!(text, i32),
        Primitive::I64 => signed!(text, i64),
        Primitive::I128 => parse_i128(text).map(Value::Int),
        Primitive::Isize => signed!(text, isize),
        Primitive::U8 => unsigned!(text, u8),
        Primitive::U16 => unsigned!(text, u16),
        Primitive::U32 => unsigned!(text, u32),
        Primitive::U64 => unsigned!(text, u64),
        Primitive::U128 => parse_u128(text).map(Value::UInt),
        Primitive::Usize => unsigned!(text, usize),
        Primitive::F32 => text.parse::<f32>().ok().map(|v| Value::Float(f64::from(v))),
        Primitive::F64 => text.parse::<f64>().ok().map(Value::Float),
    };

    parsed.ok_or_else(|| ConstructError::invalid(primitive.name(), text, expectation(primitive)))
}

fn expectation(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Char => "expected exactly one character",
        Primitive::Bytes => "expected ASCII text",
        Primitive::HexStr => "expected an even number of hex digits",
        Primitive::F32 | Primitive::F64 => "expected a number",
        Primitive::Bool | Primitive::Str => "unexpected text",
        _ => "expected an integer in range",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomType, EnumType};

    fn list_of(elem: Primitive) -> TypeDescriptor {
        TypeDescriptor::list(elem.into())
    }

    #[test]
    fn test_bool_is_not_truthiness() {
        let ty = TypeDescriptor::from(Primitive::Bool);
        for falsy in ["", "0", "false", "False"] {
            assert_eq!(construct(&ty, falsy), Ok(Value::Bool(false)));
        }
        for truthy in ["1", "true", "FALSE", "no", "off"] {
            assert_eq!(construct(&ty, truthy), Ok(Value::Bool(true)));
        }
    }

    #[test]
    fn test_integers_with_prefixes_and_ranges() {
        let u8_ty = TypeDescriptor::from(Primitive::U8);
        assert_eq!(construct(&u8_ty, "0xff"), Ok(Value::UInt(255)));
        assert_eq!(construct(&u8_ty, "0b101"), Ok(Value::UInt(5)));
        assert!(construct(&u8_ty, "256").is_err());
        assert!(construct(&u8_ty, "-1").is_err());

        let i8_ty = TypeDescriptor::from(Primitive::I8);
        assert_eq!(construct(&i8_ty, "-128"), Ok(Value::Int(-128)));
        assert_eq!(construct(&i8_ty, "-0x10"), Ok(Value::Int(-16)));
        assert!(construct(&i8_ty, "128").is_err());
        assert!(construct(&i8_ty, "0x-1").is_err());

        let i128_ty = TypeDescriptor::from(Primitive::I128);
        assert_eq!(
            construct(&i128_ty, &i128::MIN.to_string()),
            Ok(Value::Int(i128::MIN))
        );
    }

    #[test]
    fn test_char_bytes_hexstr() {
        let char_ty = TypeDescriptor::from(Primitive::Char);
        assert_eq!(construct(&char_ty, "ż"), Ok(Value::Char('ż')));
        assert!(construct(&char_ty, "ab").is_err());
        assert!(construct(&char_ty, "").is_err());

        let bytes_ty = TypeDescriptor::from(Primitive::Bytes);
        assert_eq!(construct(&bytes_ty, "ab"), Ok(Value::Bytes(b"ab".to_vec())));
        assert!(construct(&bytes_ty, "żółw").is_err());

        let hex_ty = TypeDescriptor::from(Primitive::HexStr);
        assert_eq!(
            construct(&hex_ty, "AABBF3C6"),
            Ok(Value::Bytes(vec![0xAA, 0xBB, 0xF3, 0xC6]))
        );
        assert!(construct(&hex_ty, "ABC").is_err());
        assert!(construct(&hex_ty, "zz").is_err());
    }

    #[test]
    fn test_list() {
        let ty = list_of(Primitive::I32);
        let expected = Value::List(vec![Value::Int(3), Value::Int(42)]);
        assert_eq!(construct(&ty, "[3,42]"), Ok(expected.clone()));
        assert_eq!(construct(&ty, "3,42"), Ok(expected));
        assert_eq!(construct(&ty, "[]"), Ok(Value::List(Vec::new())));
        assert_eq!(construct(&ty, ""), Ok(Value::List(Vec::new())));
        assert!(matches!(
            construct(&ty, "[3,x]"),
            Err(ConstructError::Invalid { .. })
        ));
    }

    #[test]
    fn test_nested_list_keeps_groups() {
        let ty = TypeDescriptor::list(list_of(Primitive::U8));
        assert_eq!(
            construct(&ty, "[[1,2],[3]]"),
            Ok(Value::List(vec![
                Value::List(vec![Value::UInt(1), Value::UInt(2)]),
                Value::List(vec![Value::UInt(3)]),
            ]))
        );
    }

    #[test]
    fn test_unwrapped_groups_are_not_stripped() {
        let lists = TypeDescriptor::list(list_of(Primitive::U8));
        assert_eq!(
            construct(&lists, "[1],[2]"),
            Ok(Value::List(vec![
                Value::List(vec![Value::UInt(1)]),
                Value::List(vec![Value::UInt(2)]),
            ]))
        );

        let pair = || TypeDescriptor::Tuple(vec![Primitive::U8.into(), Primitive::U8.into()]);
        let pairs = TypeDescriptor::Tuple(vec![pair(), pair()]);
        assert_eq!(
            construct(&pairs, "(1,2),(3,4)"),
            Ok(Value::Tuple(vec![
                Value::Tuple(vec![Value::UInt(1), Value::UInt(2)]),
                Value::Tuple(vec![Value::UInt(3), Value::UInt(4)]),
            ]))
        );
        assert_eq!(
            construct(&pairs, "((1,2),(3,4))"),
            construct(&pairs, "(1,2),(3,4)")
        );
    }

    #[test]
    fn test_strip_wrapping() {
        assert_eq!(strip_wrapping("[1,2]", '[', ']'), "1,2");
        assert_eq!(strip_wrapping("[[1],[2]]", '[', ']'), "[1],[2]");
        assert_eq!(strip_wrapping("[1],[2]", '[', ']'), "[1],[2]");
        assert_eq!(strip_wrapping("[\"]\",x]", '[', ']'), "\"]\",x");
        assert_eq!(strip_wrapping("[]", '[', ']'), "");
        assert_eq!(strip_wrapping("1,2", '[', ']'), "1,2");
    }

    #[test]
    fn test_tuple_arity() {
        let ty = TypeDescriptor::Tuple(vec![Primitive::F64.into(), Primitive::Str.into()]);
        assert_eq!(
            construct(&ty, "(3,foo)"),
            Ok(Value::Tuple(vec![Value::Float(3.0), Value::Str("foo".into())]))
        );
        assert_eq!(
            construct(&ty, "(3,foo,bar)"),
            Err(ConstructError::ArityMismatch { expected: 2, got: 3 })
        );
        assert!(matches!(
            construct(&ty, "(3,foo"),
            Err(ConstructError::Tokenize(_))
        ));
    }

    #[test]
    fn test_union_first_success_wins() {
        let ty = TypeDescriptor::Union(vec![Primitive::F64.into(), Primitive::Str.into()]);
        assert_eq!(construct(&ty, "2.5"), Ok(Value::Float(2.5)));
        assert_eq!(construct(&ty, "test_arg"), Ok(Value::Str("test_arg".into())));

        let strict = TypeDescriptor::Union(vec![Primitive::U8.into(), Primitive::Bool.into()]);
        assert_eq!(construct(&strict, "7"), Ok(Value::UInt(7)));
        let ints = TypeDescriptor::Union(vec![Primitive::U8.into(), Primitive::I8.into()]);
        assert_eq!(
            construct(&ints, "x"),
            Err(ConstructError::NoAlternative {
                type_name: "Union[u8, i8]".into(),
                text: "x".into(),
            })
        );
    }

    #[test]
    fn test_enum_by_member_name() {
        let ty = TypeDescriptor::from(EnumType::new("Color").member("Red", "1").member("Blue", "2"));
        assert_eq!(construct(&ty, "Blue"), Ok(Value::Enum("Blue".into())));
        assert!(construct(&ty, "1").is_err());
    }

    struct Upper;

    impl CustomType for Upper {
        fn name(&self) -> &str {
            "Upper"
        }

        fn parse(&self, text: &str) -> Result<Value, ConstructError> {
            if text.is_empty() {
                return Err(ConstructError::invalid("Upper", text, "empty"));
            }
            Ok(Value::Str(text.to_uppercase()))
        }
    }

    #[test]
    fn test_custom_parse_hook() {
        let ty = TypeDescriptor::list(TypeDescriptor::custom(Upper));
        assert_eq!(
            construct(&ty, "ab,c"),
            Ok(Value::List(vec![Value::Str("AB".into()), Value::Str("C".into())]))
        );
        assert!(construct(&ty, "ab,").is_err());
    }

    #[test]
    fn test_depth_cap() {
        let mut ty = TypeDescriptor::from(Primitive::U8);
        for _ in 0..=MAX_TYPE_DEPTH {
            ty = TypeDescriptor::Union(vec![ty]);
        }
        assert_eq!(
            construct(&ty, "1"),
            Err(ConstructError::TooDeep { limit: MAX_TYPE_DEPTH })
        );
    }
}
