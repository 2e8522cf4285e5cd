//! Mock reader implementation for testing and development.
//!
//! This module provides a simulated swipe reader that can be controlled
//! programmatically without requiring physical hardware.

pub mod swiper;

pub use swiper::{MockConnector, MockSwiper, MockSwiperHandle};
