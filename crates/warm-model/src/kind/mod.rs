mod channel;
pub use channel::Channel;

mod readiness;
pub use readiness::Readiness;
