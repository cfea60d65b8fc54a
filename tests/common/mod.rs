#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use shared_owner::AsAny;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Names of destroyed values, in destruction order.
pub type DropLog = Rc<RefCell<Vec<&'static str>>>;

pub fn drop_log() -> DropLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Counts its own destruction.
#[derive(Debug)]
pub struct Tracked {
    pub value : i32,
    drops : Rc<Cell<usize>>
}

impl Tracked {
    pub fn new(value : i32, drops : &Rc<Cell<usize>>) -> Tracked {
        Tracked { value, drops : drops.clone() }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

pub trait Shape : AsAny {
    fn name(&self) -> &'static str;
    fn area(&self) -> f64;
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ShapeKind {
    Circle, Rectangle, Triangle
}

pub struct Circle {
    pub radius : f64,
    log : DropLog
}

pub struct Rectangle {
    pub width : f64,
    pub height : f64,
    log : DropLog
}

pub struct Triangle {
    pub base : f64,
    pub height : f64,
    log : DropLog
}

impl Circle {
    pub fn new(radius : f64, log : &DropLog) -> Circle {
        Circle { radius, log : log.clone() }
    }
}

impl Shape for Circle {
    fn name(&self) -> &'static str { "circle" }
    fn area(&self) -> f64 { std::f64::consts::PI * self.radius * self.radius }
}

impl Shape for Rectangle {
    fn name(&self) -> &'static str { "rectangle" }
    fn area(&self) -> f64 { self.width * self.height }
}

impl Shape for Triangle {
    fn name(&self) -> &'static str { "triangle" }
    fn area(&self) -> f64 { self.base * self.height / 2.0 }
}

impl Drop for Circle {
    fn drop(&mut self) {
        self.log.borrow_mut().push("circle");
    }
}

impl Drop for Rectangle {
    fn drop(&mut self) {
        self.log.borrow_mut().push("rectangle");
    }
}

impl Drop for Triangle {
    fn drop(&mut self) {
        self.log.borrow_mut().push("triangle");
    }
}

// Returns through an indirection; a bare `dyn Shape` value cannot be returned at all.
pub fn create_shape(kind : ShapeKind, log : &DropLog) -> Box<dyn Shape> {
    match kind {
        ShapeKind::Circle => Box::new(Circle::new(1.0, log)),
        ShapeKind::Rectangle => Box::new(Rectangle { width : 2.0, height : 3.0, log : log.clone() }),
        ShapeKind::Triangle => Box::new(Triangle { base : 4.0, height : 5.0, log : log.clone() }),
    }
}
