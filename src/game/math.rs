use super::types::Vec2;

pub fn dist(a: Vec2, b: Vec2) -> f32 {
  ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

pub fn length(v: Vec2) -> f32 {
  (v.x * v.x + v.y * v.y).sqrt()
}

pub fn normalize(v: Vec2) -> Vec2 {
  let len = length(v);
  if !len.is_finite() || len == 0.0 {
    return Vec2 { x: 0.0, y: 0.0 };
  }
  Vec2 {
    x: v.x / len,
    y: v.y / len,
  }
}

pub fn heading_from_angle(angle: f32) -> Vec2 {
  Vec2 {
    x: angle.cos(),
    y: angle.sin(),
  }
}

pub fn random_heading() -> Vec2 {
  let angle = rand::random::<f32>() * std::f32::consts::PI * 2.0;
  heading_from_angle(angle)
}

pub fn random_position(width: f32, height: f32) -> Vec2 {
  Vec2 {
    x: rand::random::<f32>() * width,
    y: rand::random::<f32>() * height,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_zero_vector_stays_zero() {
    let v = normalize(Vec2 { x: 0.0, y: 0.0 });
    assert_eq!(v.x, 0.0);
    assert_eq!(v.y, 0.0);
  }

  #[test]
  fn normalize_yields_unit_length() {
    let v = normalize(Vec2 { x: 3.0, y: -4.0 });
    assert!((length(v) - 1.0).abs() < 1e-6);
  }

  #[test]
  fn random_heading_is_unit() {
    for _ in 0..16 {
      assert!((length(random_heading()) - 1.0).abs() < 1e-5);
    }
  }
}
