// Simulated external world: the randomness capability backing unreliable
// remote reads, and the throttled dispatcher for outbound calls.

mod random;
mod throttle;

pub use random::*;
pub use throttle::*;
