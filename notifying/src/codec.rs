use crate::error::ParseError;

/// Conversion between a cell's value and the text carried by notifications and inbound updates.
///
/// Implement this for your own types (enums, newtypes) to store them in a [`crate::ScalarCell`].
pub trait TextCodec: Sized {
    /// Parse inbound text. Surrounding whitespace is not significant.
    fn parse_text(text: &str) -> Result<Self, ParseError>;

    fn format_text(&self) -> String;
}

/// Everything a cell can hold: text-convertible and shareable across threads
pub trait CellValue: TextCodec + Send + Sync + 'static {}

impl<T> CellValue for T where T: TextCodec + Send + Sync + 'static {}

macro_rules! display_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TextCodec for $ty {
                fn parse_text(text: &str) -> Result<Self, ParseError> {
                    text.trim().parse::<$ty>().map_err(|_| ParseError::new::<$ty>(text))
                }
                fn format_text(&self) -> String { self.to_string() }
            }
        )*
    };
}

display_codec!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool);

impl TextCodec for char {
    fn parse_text(text: &str) -> Result<Self, ParseError> {
        let mut chars = text.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ParseError::new::<char>(text)),
        }
    }
    fn format_text(&self) -> String { self.to_string() }
}

impl TextCodec for String {
    // strings are taken verbatim; whitespace is part of the value
    fn parse_text(text: &str) -> Result<Self, ParseError> { Ok(text.to_string()) }
    fn format_text(&self) -> String { self.clone() }
}
