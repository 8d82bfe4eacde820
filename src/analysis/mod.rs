/// Analysis layer: grouping, aggregation, and reflectivity derivation.
///
/// Every stage consumes an immutable input and produces a new immutable
/// output; derived structures are rebuilt from the dataset on each pass,
/// never updated incrementally.

pub mod grouping;
pub mod pipeline;
pub mod reflectivity;
