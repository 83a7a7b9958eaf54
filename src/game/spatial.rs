use super::constants::{FOOD_LOAD_WEIGHT, INITIAL_CELL, MAX_CELL, MIN_CELL, WORLD_HEIGHT, WORLD_WIDTH};
use super::types::{Anchored, Food, Snake, Vec2};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct Bounds {
  pub min_x: f32,
  pub max_x: f32,
  pub min_y: f32,
  pub max_y: f32,
}

impl Bounds {
  pub fn contains(&self, p: Vec2) -> bool {
    p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
  }
}

type Grid = HashMap<(i32, i32), Vec<(usize, Vec2)>>;

/// Adaptive-resolution hash grid over snake heads and unconsumed food.
/// Rebuilt from scratch once per tick; queries run against the previous
/// rebuild, so callers re-check liveness at the returned indices.
#[derive(Debug)]
pub struct SpatialIndex {
  pub cell_size: f32,
  snakes_grid: Grid,
  foods_grid: Grid,
}

impl SpatialIndex {
  pub fn new() -> Self {
    Self {
      cell_size: INITIAL_CELL,
      snakes_grid: HashMap::new(),
      foods_grid: HashMap::new(),
    }
  }

  /// Estimate the ideal cell edge for the current load and blend it 50/50
  /// with the previous size so the grid does not resize abruptly tick to
  /// tick. Food is cheaper to bucket coarsely than agents, hence the reduced
  /// weight.
  pub fn compute_cell_size(&mut self, snake_count: usize, food_count: usize) {
    let area = WORLD_WIDTH * WORLD_HEIGHT;
    let load = snake_count as f32 + food_count as f32 * FOOD_LOAD_WEIGHT;
    let base = (area / load.max(1.0)).sqrt();
    let size = base.clamp(MIN_CELL, MAX_CELL);
    self.cell_size = (self.cell_size * 0.5 + size * 0.5).round();
  }

  fn cell_of(cell_size: f32, p: Vec2) -> (i32, i32) {
    ((p.x / cell_size).floor() as i32, (p.y / cell_size).floor() as i32)
  }

  fn fill<T: Anchored>(grid: &mut Grid, cell_size: f32, items: &[T]) {
    grid.clear();
    for (index, item) in items.iter().enumerate() {
      let Some(point) = item.anchor() else { continue };
      grid
        .entry(Self::cell_of(cell_size, point))
        .or_default()
        .push((index, point));
    }
  }

  pub fn rebuild(&mut self, snakes: &[Snake], foods: &[Food]) {
    self.compute_cell_size(snakes.len(), foods.len());
    Self::fill(&mut self.snakes_grid, self.cell_size, snakes);
    Self::fill(&mut self.foods_grid, self.cell_size, foods);
  }

  fn query_grid(grid: &Grid, cell_size: f32, bounds: &Bounds) -> Vec<usize> {
    let (min_cx, min_cy) = Self::cell_of(cell_size, Vec2 { x: bounds.min_x, y: bounds.min_y });
    let (max_cx, max_cy) = Self::cell_of(cell_size, Vec2 { x: bounds.max_x, y: bounds.max_y });
    let mut results = Vec::new();
    for cy in min_cy..=max_cy {
      for cx in min_cx..=max_cx {
        let Some(bucket) = grid.get(&(cx, cy)) else { continue };
        for &(index, point) in bucket {
          // Cells are coarser than the query rectangle; membership alone is
          // a superset, so the exact re-test is mandatory.
          if bounds.contains(point) {
            results.push(index);
          }
        }
      }
    }
    results
  }

  pub fn query_snakes(&self, bounds: &Bounds) -> Vec<usize> {
    Self::query_grid(&self.snakes_grid, self.cell_size, bounds)
  }

  pub fn query_foods(&self, bounds: &Bounds) -> Vec<usize> {
    Self::query_grid(&self.foods_grid, self.cell_size, bounds)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::math::random_position;
  use crate::game::snake::create_snake;

  fn ambient_food(x: f32, y: f32) -> Food {
    Food {
      pos: Vec2 { x, y },
      value: 2.0,
      drop: false,
      consumed: false,
    }
  }

  #[test]
  fn cell_size_blends_with_previous_estimate() {
    let mut index = SpatialIndex::new();
    assert_eq!(index.cell_size, 256.0);
    // sqrt(16_000_000 / 260) ~= 248, blended 50/50 with 256 -> 252.
    index.compute_cell_size(10, 1000);
    assert_eq!(index.cell_size, 252.0);
  }

  #[test]
  fn cell_size_is_clamped() {
    let mut index = SpatialIndex::new();
    index.compute_cell_size(0, 0);
    assert_eq!(index.cell_size, (256.0f32 * 0.5 + 512.0 * 0.5).round());

    let mut index = SpatialIndex::new();
    index.cell_size = 32.0;
    index.compute_cell_size(100_000, 0);
    assert_eq!(index.cell_size, 32.0);
  }

  #[test]
  fn query_matches_brute_force_for_random_placement() {
    let mut snakes = Vec::new();
    for id in 0..60u32 {
      snakes.push(create_snake(
        id,
        random_position(WORLD_WIDTH, WORLD_HEIGHT),
        true,
      ));
    }
    let mut foods = Vec::new();
    for _ in 0..400 {
      let p = random_position(WORLD_WIDTH, WORLD_HEIGHT);
      foods.push(ambient_food(p.x, p.y));
    }

    let mut index = SpatialIndex::new();
    index.rebuild(&snakes, &foods);

    let bounds = Bounds {
      min_x: 900.0,
      max_x: 2100.0,
      min_y: 700.0,
      max_y: 2600.0,
    };

    let mut queried = index.query_snakes(&bounds);
    queried.sort_unstable();
    let mut expected: Vec<usize> = snakes
      .iter()
      .enumerate()
      .filter(|(_, snake)| bounds.contains(snake.segments[0].pos))
      .map(|(i, _)| i)
      .collect();
    expected.sort_unstable();
    assert_eq!(queried, expected);

    let mut queried = index.query_foods(&bounds);
    queried.sort_unstable();
    let mut expected: Vec<usize> = foods
      .iter()
      .enumerate()
      .filter(|(_, food)| bounds.contains(food.pos))
      .map(|(i, _)| i)
      .collect();
    expected.sort_unstable();
    assert_eq!(queried, expected);
  }

  #[test]
  fn rebuild_skips_dead_snakes_and_consumed_food() {
    let mut snake = create_snake(1, Vec2 { x: 100.0, y: 100.0 }, false);
    snake.alive = false;
    let mut food = ambient_food(100.0, 100.0);
    food.consumed = true;

    let mut index = SpatialIndex::new();
    index.rebuild(&[snake], &[food]);

    let bounds = Bounds {
      min_x: 0.0,
      max_x: 200.0,
      min_y: 0.0,
      max_y: 200.0,
    };
    assert!(index.query_snakes(&bounds).is_empty());
    assert!(index.query_foods(&bounds).is_empty());
  }
}
