/*!
 * Exercise state: gap statuses, the published exercise segment and the
 * per-gap input model used by UI layers.
 */

pub mod gaps;
pub mod input;
pub mod store;

pub use gaps::{GapBook, GapStatus};
pub use input::{GapInput, InputOutcome, masked_word};
pub use store::{ExerciseStore, ExerciseView};
