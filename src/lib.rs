//! Parley - Decision-Space Modeling and Multi-Criteria Analysis
//!
//! This crate is the computational backbone of a negotiation simulation
//! framework: it represents and enumerates the space of possible agreements,
//! and provides the game-theoretic primitives (Pareto frontier, Nash point,
//! normalization, difficulty indices) that negotiating agents and mechanisms
//! use to reason about which deals exist and which are efficient.

pub mod outcomes;
pub mod preferences;
