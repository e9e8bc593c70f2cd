//! Shape helpers.
use std::{fmt, io};

/// A point on the plane.
#[derive(Debug, Clone)]
pub struct Point { x: i32, y: i32 }

pub trait Shape {
    fn area(&self) -> f64;
}

impl Shape for Point {
    fn area(&self) -> f64 {
        let s = r#"}"#;
        0.0
    }
}

pub const ORIGIN: Point = Point { x: 0, y: 0 };

pub mod util {
    pub fn clamp(v: i32) -> i32 {
        v.max(0)
    }
}
