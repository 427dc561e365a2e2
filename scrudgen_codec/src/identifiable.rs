/// Anything that can expose the string form of its identifier.
///
/// Component types of a composite identifier are usually references to
/// related entities; the codec only ever looks at their identifiers.
pub trait Identifiable {
    fn identifier(&self) -> Option<String>;
}

/// Build a component back from its raw identifier segment.
///
/// Implementations may resolve the referenced entity, but must be a pure
/// function of the raw segment.
pub trait FromIdentifier: Sized {
    fn from_identifier(raw: &str) -> Self;
}

impl Identifiable for String {
    fn identifier(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Identifiable for str {
    fn identifier(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl<T: Identifiable + ?Sized> Identifiable for &T {
    fn identifier(&self) -> Option<String> {
        (**self).identifier()
    }
}

impl<T: Identifiable> Identifiable for Option<T> {
    fn identifier(&self) -> Option<String> {
        self.as_ref().and_then(Identifiable::identifier)
    }
}

macro_rules! impl_identifiable_display {
    ($($ty:ty),*) => {
        $(
            impl Identifiable for $ty {
                fn identifier(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_identifiable_display!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl FromIdentifier for String {
    fn from_identifier(raw: &str) -> Self {
        raw.to_string()
    }
}
