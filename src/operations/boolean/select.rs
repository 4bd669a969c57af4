/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

/// Decides whether a sub-segment should be emitted into the output.
///
/// `inside` is the parity state of the sub-segment relative to the *other*
/// region; `second_region` marks the B-vs-A pass.
///
/// | Operation            | A-derived segment | B-derived segment |
/// |----------------------|-------------------|-------------------|
/// | Union                | outside other     | outside other     |
/// | Intersection         | inside other      | inside other      |
/// | Difference (A-B)     | outside B         | inside A          |
/// | SymmetricDifference  | outside other     | outside other     |
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn should_emit(op: OpType, inside: bool, second_region: bool) -> bool {
    // Each arm is kept explicit so the table above can be read off the
    // match directly, even though some arms share the same body.
    match (op, second_region) {
        (OpType::Union, false) => !inside,
        (OpType::Union, true) => !inside,

        (OpType::Intersection, false) => inside,
        (OpType::Intersection, true) => inside,

        (OpType::Difference, false) => !inside,
        (OpType::Difference, true) => inside,

        (OpType::SymmetricDifference, false) => !inside,
        (OpType::SymmetricDifference, true) => !inside,
    }
}
