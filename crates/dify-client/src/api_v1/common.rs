/// Generates `with`-style setters for `Option<T>` fields of a request body.
///
/// Each setter takes `impl Into<T>` so callers can pass `&str` for string
/// fields and literals for numeric ones.
#[macro_export]
macro_rules! impl_optional_setters {
    ($target:ident, $($field:ident: $field_type:ty),* $(,)?) => {
        impl $target {
            $(
                pub fn $field(mut self, $field: impl Into<$field_type>) -> Self {
                    self.$field = Some($field.into());
                    self
                }
            )*
        }
    };
}
