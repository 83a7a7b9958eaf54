use super::constants::{
  AMBIENT_FOOD_VALUE, BASE_SPEED, BOOST_MIN_LENGTH, BOOST_SHED_INTERVAL, BOT_QUOTA,
  BOT_RETIRE_LENGTH, COLLISION_COARSE_BOX, DROP_FOOD_VALUE, PICKUP_RADIUS, REQUIRED_FOODS,
  VIEW_PADDING, WORLD_HEIGHT, WORLD_WIDTH,
};
use super::math::{dist, heading_from_angle, normalize, random_heading, random_position};
use super::snake::{
  create_snake, grow_snake, head_position, push_trail, relax_segments, shed_tail_segment,
};
use super::spatial::{Bounds, SpatialIndex};
use super::types::{Food, FoodView, Snake, SnakeView, Vec2};

/// The authoritative world: every snake, every food, the spatial index and
/// the id counter. Owned by the scheduler; nothing else holds a mutable
/// reference across tick boundaries.
#[derive(Debug)]
pub struct World {
  pub snakes: Vec<Snake>,
  pub foods: Vec<Food>,
  pub spatial: SpatialIndex,
  pub food_floor: usize,
  pub bot_quota: usize,
  next_snake_id: u32,
}

impl World {
  pub fn new() -> Self {
    Self::with_limits(REQUIRED_FOODS, BOT_QUOTA)
  }

  pub fn with_limits(food_floor: usize, bot_quota: usize) -> Self {
    let mut world = Self {
      snakes: Vec::new(),
      foods: Vec::new(),
      spatial: SpatialIndex::new(),
      food_floor,
      bot_quota,
      next_snake_id: 1,
    };
    world.replenish_foods();
    world.ensure_bots();
    world.spatial.rebuild(&world.snakes, &world.foods);
    world
  }

  fn allocate_id(&mut self) -> u32 {
    let id = self.next_snake_id;
    self.next_snake_id += 1;
    id
  }

  pub fn spawn_human(&mut self) -> u32 {
    let id = self.allocate_id();
    let pos = random_position(WORLD_WIDTH, WORLD_HEIGHT);
    self.snakes.push(create_snake(id, pos, false));
    tracing::debug!(snake_id = id, "human snake spawned");
    id
  }

  fn spawn_bot(&mut self) {
    let id = self.allocate_id();
    let pos = random_position(WORLD_WIDTH, WORLD_HEIGHT);
    self.snakes.push(create_snake(id, pos, true));
  }

  pub fn snake_by_id(&self, id: u32) -> Option<&Snake> {
    self.snakes.iter().find(|snake| snake.id == id)
  }

  pub fn snake_by_id_mut(&mut self, id: u32) -> Option<&mut Snake> {
    self.snakes.iter_mut().find(|snake| snake.id == id)
  }

  /// Disconnect handling: the snake stays in the world and coasts on its
  /// frozen heading, it just stops taking steering updates.
  pub fn deactivate(&mut self, id: u32) {
    if let Some(snake) = self.snake_by_id_mut(id) {
      snake.active = false;
    }
  }

  fn unconsumed_food_count(&self) -> usize {
    self.foods.iter().filter(|food| !food.consumed).count()
  }

  fn replenish_foods(&mut self) {
    let mut supply = self.unconsumed_food_count();
    while supply < self.food_floor {
      self.foods.push(Food {
        pos: random_position(WORLD_WIDTH, WORLD_HEIGHT),
        value: AMBIENT_FOOD_VALUE,
        drop: false,
        consumed: false,
      });
      supply += 1;
    }
  }

  fn ensure_bots(&mut self) {
    let mut bots = self.snakes.iter().filter(|s| s.is_bot && s.alive).count();
    while bots < self.bot_quota {
      self.spawn_bot();
      bots += 1;
    }
  }

  /// One fixed-interval step. Structural changes (food replenish, bot quota
  /// backfill) commit at the boundary; the update pass then visits every
  /// snake present at its start exactly once, and the sweeps plus index
  /// rebuild run after the pass so no iterator is ever invalidated mid-tick.
  pub fn tick(&mut self) {
    self.replenish_foods();
    self.ensure_bots();

    for index in 0..self.snakes.len() {
      self.update_snake(index);
    }

    self.foods.retain(|food| !food.consumed);
    self.snakes.retain(|snake| snake.alive);
    self.spatial.rebuild(&self.snakes, &self.foods);
  }

  pub fn view_bounds_for(&self, snake_id: u32) -> Option<Bounds> {
    view_bounds_of(self.snake_by_id(snake_id)?)
  }

  fn nearest_visible_food(&self, index: usize) -> Option<Vec2> {
    let bounds = view_bounds_of(&self.snakes[index])?;
    let head = head_position(&self.snakes[index])?;
    let mut nearest: Option<(Vec2, f32)> = None;
    for food_index in self.spatial.query_foods(&bounds) {
      let food = &self.foods[food_index];
      if food.consumed {
        continue;
      }
      let d = dist(head, food.pos);
      match nearest {
        Some((_, best)) if d >= best => {}
        _ => nearest = Some((food.pos, d)),
      }
    }
    nearest.map(|(pos, _)| pos)
  }

  fn update_snake(&mut self, index: usize) {
    if !self.snakes[index].alive || self.snakes[index].segments.is_empty() {
      return;
    }

    // Bounds test on the head against the world extent.
    let head = self.snakes[index].segments[0].pos;
    if head.x <= 0.0 || head.x >= WORLD_WIDTH || head.y <= 0.0 || head.y >= WORLD_HEIGHT {
      self.disappear(index);
      return;
    }

    // Boost economics: every 5th boosted tick sheds the tail into drop food;
    // at the length floor the boost force-disables.
    let shed = {
      let snake = &mut self.snakes[index];
      if snake.boosting && snake.segments.len() > BOOST_MIN_LENGTH {
        snake.boost_ticks += 1;
        if snake.boost_ticks % BOOST_SHED_INTERVAL == 0 {
          shed_tail_segment(snake, BOOST_MIN_LENGTH)
        } else {
          None
        }
      } else {
        snake.boosting = false;
        snake.speed = BASE_SPEED;
        snake.boost_ticks = 0;
        None
      }
    };
    if let Some(pos) = shed {
      self.foods.push(Food {
        pos,
        value: DROP_FOOD_VALUE,
        drop: true,
        consumed: false,
      });
    }

    // Steering and head advance. Heading only changes while active; an
    // inactive snake coasts on its last heading.
    if self.snakes[index].is_bot {
      let target = self.nearest_visible_food(index);
      let snake = &mut self.snakes[index];
      let head = snake.segments[0].pos;
      let desired = match target {
        Some(food_pos) => {
          heading_from_angle((food_pos.y - head.y).atan2(food_pos.x - head.x))
        }
        None => random_heading(),
      };
      if snake.active {
        snake.heading = desired;
      }
      snake.segments[0].pos.x += snake.heading.x * snake.speed;
      snake.segments[0].pos.y += snake.heading.y * snake.speed;
      // Oversized bots stop steering and run off the board; the quota
      // backfills a fresh one.
      if snake.segments.len() >= BOT_RETIRE_LENGTH {
        snake.active = false;
      }
    } else {
      let snake = &mut self.snakes[index];
      let head = snake.segments[0].pos;
      let target_x = snake.pointer.x - (snake.viewport_width / 2.0 - head.x);
      let target_y = snake.pointer.y - (snake.viewport_height / 2.0 - head.y);
      let dx = target_x - head.x;
      let dy = target_y - head.y;
      let d = (dx * dx + dy * dy).sqrt();
      if d != 0.0 {
        if snake.active {
          snake.heading = normalize(Vec2 { x: dx, y: dy });
        }
        snake.segments[0].pos.x += snake.heading.x * snake.speed;
        snake.segments[0].pos.y += snake.heading.y * snake.speed;
      }
    }

    let head = self.snakes[index].segments[0].pos;
    push_trail(&mut self.snakes[index], head);
    relax_segments(&mut self.snakes[index]);

    let Some(bounds) = view_bounds_of(&self.snakes[index]) else { return };
    let head = self.snakes[index].segments[0].pos;

    // Food pickup inside the view rectangle.
    for food_index in self.spatial.query_foods(&bounds) {
      if self.foods[food_index].consumed {
        continue;
      }
      if dist(head, self.foods[food_index].pos) >= PICKUP_RADIUS {
        continue;
      }
      let value = self.foods[food_index].value;
      self.foods[food_index].consumed = true;
      grow_snake(&mut self.snakes[index], value as usize);
      if !self.foods[food_index].drop {
        // Recycle ambient food while supply sits at or below the floor;
        // above it the instance is retired so supply converges back down.
        if self.unconsumed_food_count() < self.food_floor {
          self.foods[food_index].pos = random_position(WORLD_WIDTH, WORLD_HEIGHT);
          self.foods[food_index].consumed = false;
        }
      }
    }

    // Body collision: coarse box reject per segment, then the exact radius
    // test against this head. First hit ends the snake's tick.
    let mut hit = false;
    for other_index in self.spatial.query_snakes(&bounds) {
      if other_index == index {
        continue;
      }
      let Some(other) = self.snakes.get(other_index) else { continue };
      if !other.alive {
        continue;
      }
      for segment in &other.segments {
        if (segment.pos.x - head.x).abs() > COLLISION_COARSE_BOX
          || (segment.pos.y - head.y).abs() > COLLISION_COARSE_BOX
        {
          continue;
        }
        if dist(head, segment.pos) < PICKUP_RADIUS {
          hit = true;
          break;
        }
      }
      if hit {
        break;
      }
    }
    if hit {
      self.scramble(index);
    }
  }

  /// Death by collision: every segment becomes a drop food at its last
  /// position.
  fn scramble(&mut self, index: usize) {
    let drops: Vec<Vec2> = self.snakes[index]
      .segments
      .iter()
      .map(|segment| segment.pos)
      .collect();
    let snake = &mut self.snakes[index];
    snake.segments.clear();
    snake.alive = false;
    tracing::debug!(snake_id = snake.id, is_bot = snake.is_bot, "snake scrambled");
    for pos in drops {
      self.foods.push(Food {
        pos,
        value: DROP_FOOD_VALUE,
        drop: true,
        consumed: false,
      });
    }
  }

  /// Death by bounds exit: segments are discarded, no food is produced.
  fn disappear(&mut self, index: usize) {
    let snake = &mut self.snakes[index];
    snake.segments.clear();
    snake.alive = false;
    tracing::debug!(snake_id = snake.id, is_bot = snake.is_bot, "snake left the world");
  }

  /// Snakes visible through `bounds`, or every live snake when the viewer has
  /// no view rectangle (a session whose snake is gone gets the full world).
  pub fn snake_views(&self, bounds: Option<&Bounds>) -> Vec<SnakeView> {
    let build = |snake: &Snake| -> Option<SnakeView> {
      if !snake.alive || snake.segments.is_empty() {
        return None;
      }
      Some(SnakeView {
        id: snake.id,
        angle: snake.heading.y.atan2(snake.heading.x),
        segments: snake.segments.iter().map(|segment| segment.pos).collect(),
      })
    };
    match bounds {
      Some(bounds) => self
        .spatial
        .query_snakes(bounds)
        .into_iter()
        .filter_map(|index| build(&self.snakes[index]))
        .collect(),
      None => self.snakes.iter().filter_map(build).collect(),
    }
  }

  pub fn food_views(&self, bounds: Option<&Bounds>) -> Vec<FoodView> {
    let build = |food: &Food| -> Option<FoodView> {
      if food.consumed {
        return None;
      }
      Some(FoodView {
        x: food.pos.x,
        y: food.pos.y,
        size: food.value,
        drop: food.drop,
      })
    };
    match bounds {
      Some(bounds) => self
        .spatial
        .query_foods(bounds)
        .into_iter()
        .filter_map(|index| build(&self.foods[index]))
        .collect(),
      None => self.foods.iter().filter_map(build).collect(),
    }
  }
}

/// The world-space rectangle a snake can see: its viewport centered on the
/// head, padded on every side.
fn view_bounds_of(snake: &Snake) -> Option<Bounds> {
  let head = snake.segments.first()?.pos;
  let half_w = snake.viewport_width / 2.0;
  let half_h = snake.viewport_height / 2.0;
  Some(Bounds {
    min_x: head.x - half_w - VIEW_PADDING,
    max_x: head.x + half_w + VIEW_PADDING,
    min_y: head.y - half_h - VIEW_PADDING,
    max_y: head.y + half_h + VIEW_PADDING,
  })
}
