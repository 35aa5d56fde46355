/*!
 * Terminal stand-in for a streaming site.
 *
 * - `transcript`: SRT loading
 * - `page`: a `HostPage` playing a transcript on a virtual clock
 * - `drill`: the interactive exercise loop used by the binary
 */

pub mod drill;
pub mod page;
pub mod transcript;

pub use drill::{Command, Drill, DrillOutput, DrillStats};
pub use page::{PageOptions, SimulatedPage};
pub use transcript::{Cue, Transcript};
