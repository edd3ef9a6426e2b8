pub mod health;
pub mod timers;
pub mod unlock;
