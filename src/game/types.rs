use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
  pub x: f32,
  pub y: f32,
}

#[derive(Debug, Clone)]
pub struct Segment {
  pub pos: Vec2,
  pub color: [u8; 3],
}

#[derive(Debug, Clone)]
pub struct Snake {
  pub id: u32,
  pub segments: Vec<Segment>,
  pub trail: VecDeque<Vec2>,
  pub speed: f32,
  pub boosting: bool,
  pub boost_ticks: u32,
  pub alive: bool,
  pub active: bool,
  pub is_bot: bool,
  pub heading: Vec2,
  pub viewport_width: f32,
  pub viewport_height: f32,
  pub pointer: Vec2,
}

#[derive(Debug, Clone)]
pub struct Food {
  pub pos: Vec2,
  pub value: f32,
  pub drop: bool,
  pub consumed: bool,
}

/// Entities a grid can bucket expose one representative point. Snakes are
/// keyed by their head, food by its own position; entities that should not be
/// indexed this tick (dead, consumed) report no anchor.
pub trait Anchored {
  fn anchor(&self) -> Option<Vec2>;
}

impl Anchored for Snake {
  fn anchor(&self) -> Option<Vec2> {
    if !self.alive {
      return None;
    }
    self.segments.first().map(|segment| segment.pos)
  }
}

impl Anchored for Food {
  fn anchor(&self) -> Option<Vec2> {
    if self.consumed {
      return None;
    }
    Some(self.pos)
  }
}

#[derive(Debug, Clone)]
pub struct SnakeView {
  pub id: u32,
  pub angle: f32,
  pub segments: Vec<Vec2>,
}

#[derive(Debug, Clone)]
pub struct FoodView {
  pub x: f32,
  pub y: f32,
  pub size: f32,
  pub drop: bool,
}
