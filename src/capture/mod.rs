/*!
 * Caption capture.
 *
 * - `observer`: rebuilds timed segments from caption mutations
 * - `retry`: deferred attach attempts and restarts
 * - `toggle`: watches the host's native caption toggle
 */

pub mod observer;
pub mod retry;
pub mod toggle;

pub use observer::{CaptionObserver, CaptureUpdate};
pub use retry::{CaptureTimer, CaptureTimers, RetryPolicy};
pub use toggle::ToggleWatcher;
