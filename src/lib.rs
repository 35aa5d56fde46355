/*!
 * # lingo-gapfy - fill-in-the-gap listening exercises over live captions
 *
 * A Rust library that watches the captions of a playing video, rebuilds
 * timed caption segments from the renderer's mutations and turns each
 * finished line into a fill-in-the-gap exercise.
 *
 * ## Features
 *
 * - Segment reconstruction that survives streamed words and re-created
 *   caption nodes
 * - Gap selection by word position and length
 * - Pause on each new exercise, resume once every gap is answered
 * - Replay of the line after a wrong answer
 * - Exercise reset when the learner seeks away
 * - A terminal drill playing SRT transcripts through a simulated player
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `host`: the interface to the page hosting the video
 * - `tokenizer`: splits segment text into text and gap tokens
 * - `segment`: timed segments and their stable identity
 * - `capture`: caption observation, capture retries, toggle watching
 * - `exercise`: gap statuses, the exercise store and gap inputs
 * - `replay`: seek-back-and-relisten
 * - `seek_guard`: detects seeks leaving the exercise
 * - `session`: the exercise state machine tying everything together
 * - `simulator`: SRT transcripts, a simulated page and the terminal drill
 * - `app_config`: configuration management
 * - `errors`: custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod capture;
pub mod errors;
pub mod exercise;
pub mod host;
pub mod replay;
pub mod seek_guard;
pub mod segment;
pub mod session;
pub mod simulator;
pub mod tokenizer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, HostError, ReplayError};
pub use exercise::{ExerciseView, GapStatus};
pub use host::{HostEvent, HostPage};
pub use replay::{ReplayOutcome, SkipReason};
pub use segment::Segment;
pub use session::{ExerciseSession, SessionNotification};
pub use tokenizer::{WordToken, tokenize};
