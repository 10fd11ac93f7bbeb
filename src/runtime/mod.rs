//! Runtime Layer
//!
//! Async adapter that drives a [`QuizSession`](crate::game::QuizSession) with
//! a real tick source. This layer is the only place engine time is read from
//! a clock; all game logic runs through `game/`.

pub mod driver;

pub use driver::{DriverConfig, DriverError, PlayerCommand, SessionDriver};
