//! Integration tests for Layer 1: World
//!
//! Tests for world construction, lookup, and the ownership invariant.

mod building;
mod ownership;
