//! Shared primitive types used across the whole pipeline.

/// The complaint number. Treated as opaque text; the source mixes
/// numeric and non-numeric identifiers.
pub type ComplaintId = String;

/// A police precinct number.
pub type Precinct = u16;

/// A 1-based line number in the input file (line 1 is the header).
pub type LineNo = u64;
