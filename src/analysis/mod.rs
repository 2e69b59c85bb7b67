/// Signal analysis over reconciled hourly series.
///
/// `hourly` aligns irregular station samples onto the hourly grid and
/// sharpens discrete extrema to sub-hour precision; `events` classifies
/// series into typed marine events; `windows` derives safe slack-water
/// activity windows around detected slacks.

pub mod events;
pub mod hourly;
pub mod windows;
