/// Domain layer for the engineering work-order hierarchy
///
/// Pure business logic: value objects, the forest arena, the classification
/// rule and the resolver. No I/O.
pub mod domain;
pub mod policies;
pub mod services;
