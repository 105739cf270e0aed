//! tdl2048 - TD(0) n-tuple network agent for sliding-tile puzzles
//!
//! A player learns a board value function made of eight 4-tuple lookup tables
//! (the four rows and four columns) by playing against a random tile-placing
//! environment and applying a backward TD(0) pass at the end of each episode.

pub mod action;
pub mod board;
pub mod config;
pub mod environment;
pub mod evaluator;
pub mod learning;
pub mod pattern;
pub mod player;
pub mod weight;

pub use action::Action;
pub use board::{Board, Direction, Reward};
pub use environment::RandomEnvironment;
pub use evaluator::Evaluator;
pub use player::TdPlayer;
