/// A cursor-centered slice of a buffer's text, plus the absolute char offset
/// where it starts within the full text (spec.md §4.1 `getWindow`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub text: String,
    pub offset: usize,
}
