use super::constants::{
  BASE_SPEED, DEFAULT_SEGMENT_COLOR, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, MAX_SPACING,
  SPACING_STIFFNESS, TARGET_SPACING, TRAIL_LENGTH_FACTOR,
};
use super::types::{Segment, Snake, Vec2};
use std::collections::VecDeque;

pub fn create_snake(id: u32, pos: Vec2, is_bot: bool) -> Snake {
  Snake {
    id,
    segments: vec![Segment {
      pos,
      color: DEFAULT_SEGMENT_COLOR,
    }],
    trail: VecDeque::new(),
    speed: BASE_SPEED,
    boosting: false,
    boost_ticks: 0,
    alive: true,
    active: true,
    is_bot,
    heading: Vec2 { x: 0.0, y: 0.0 },
    viewport_width: DEFAULT_VIEWPORT_WIDTH,
    viewport_height: DEFAULT_VIEWPORT_HEIGHT,
    pointer: Vec2 { x: 0.0, y: 0.0 },
  }
}

pub fn head_position(snake: &Snake) -> Option<Vec2> {
  snake.segments.first().map(|segment| segment.pos)
}

/// Append `amount` segments at the current tail position, cloning the tail
/// color. Relaxation spreads them out over the following ticks.
pub fn grow_snake(snake: &mut Snake, amount: usize) {
  let Some(tail) = snake.segments.last().cloned() else { return };
  for _ in 0..amount {
    snake.segments.push(tail.clone());
  }
}

/// Remove the tail segment and report its last position, keeping at least
/// `min_length` segments.
pub fn shed_tail_segment(snake: &mut Snake, min_length: usize) -> Option<Vec2> {
  if snake.segments.len() <= min_length {
    return None;
  }
  snake.segments.pop().map(|segment| segment.pos)
}

pub fn push_trail(snake: &mut Snake, pos: Vec2) {
  snake.trail.push_front(pos);
  if snake.trail.len() > snake.segments.len() * TRAIL_LENGTH_FACTOR {
    snake.trail.pop_back();
  }
}

/// Spring relaxation of the body toward the target inter-segment spacing.
/// Each pair gets a fractional correction along the separation vector; spacing
/// beyond the hard maximum snaps back half the excess so fast turns cannot
/// stretch the body without bound. Coincident pairs are left alone.
pub fn relax_segments(snake: &mut Snake) {
  for i in 1..snake.segments.len() {
    let prev = snake.segments[i - 1].pos;
    let curr = snake.segments[i].pos;

    let dx = curr.x - prev.x;
    let dy = curr.y - prev.y;
    let d = (dx * dx + dy * dy).sqrt();
    if d == 0.0 {
      continue;
    }

    let error = d - TARGET_SPACING;
    let nx = dx / d;
    let ny = dy / d;

    let mut x = curr.x - nx * error * SPACING_STIFFNESS;
    let mut y = curr.y - ny * error * SPACING_STIFFNESS;

    if d > MAX_SPACING {
      let extra = (d - MAX_SPACING) * 0.5;
      x -= nx * extra;
      y -= ny * extra;
    }

    snake.segments[i].pos = Vec2 { x, y };
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::math::dist;

  fn straight_snake(len: usize, spacing: f32) -> Snake {
    let mut snake = create_snake(1, Vec2 { x: 0.0, y: 0.0 }, false);
    snake.segments.clear();
    for i in 0..len {
      snake.segments.push(Segment {
        pos: Vec2 {
          x: i as f32 * spacing,
          y: 0.0,
        },
        color: DEFAULT_SEGMENT_COLOR,
      });
    }
    snake
  }

  #[test]
  fn grow_appends_at_tail_with_tail_color() {
    let mut snake = straight_snake(3, 10.0);
    snake.segments[2].color = [1, 2, 3];
    grow_snake(&mut snake, 2);

    assert_eq!(snake.segments.len(), 5);
    for segment in &snake.segments[3..] {
      assert_eq!(segment.pos, Vec2 { x: 20.0, y: 0.0 });
      assert_eq!(segment.color, [1, 2, 3]);
    }
  }

  #[test]
  fn shed_respects_minimum_length() {
    let mut snake = straight_snake(2, 10.0);
    assert_eq!(
      shed_tail_segment(&mut snake, 1),
      Some(Vec2 { x: 10.0, y: 0.0 })
    );
    assert_eq!(shed_tail_segment(&mut snake, 1), None);
    assert_eq!(snake.segments.len(), 1);
  }

  #[test]
  fn relax_is_stable_at_target_spacing() {
    let mut snake = straight_snake(5, TARGET_SPACING);
    relax_segments(&mut snake);
    for i in 1..snake.segments.len() {
      let d = dist(snake.segments[i - 1].pos, snake.segments[i].pos);
      assert!((d - TARGET_SPACING).abs() < 1e-4);
    }
  }

  #[test]
  fn relax_pulls_in_overstretched_pair() {
    let mut snake = straight_snake(2, 30.0);
    relax_segments(&mut snake);
    let d = dist(snake.segments[0].pos, snake.segments[1].pos);
    // 30 - (30-10)*0.35 - (30-14)*0.5 = 15
    assert!((d - 15.0).abs() < 1e-4);
  }

  #[test]
  fn relax_skips_coincident_segments() {
    let mut snake = straight_snake(3, 0.0);
    relax_segments(&mut snake);
    for segment in &snake.segments {
      assert!(segment.pos.x.is_finite() && segment.pos.y.is_finite());
      assert_eq!(segment.pos, Vec2 { x: 0.0, y: 0.0 });
    }
  }

  #[test]
  fn trail_is_capped_by_body_length() {
    let mut snake = straight_snake(2, 10.0);
    for i in 0..40 {
      push_trail(
        &mut snake,
        Vec2 {
          x: i as f32,
          y: 0.0,
        },
      );
    }
    assert!(snake.trail.len() <= snake.segments.len() * TRAIL_LENGTH_FACTOR + 1);
    assert_eq!(snake.trail.front().copied(), Some(Vec2 { x: 39.0, y: 0.0 }));
  }
}
