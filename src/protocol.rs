use crate::game::types::{FoodView, SnakeView, Vec2};

pub const VERSION: u8 = 1;

pub const TYPE_SNAPSHOT: u8 = 1;
pub const TYPE_GESTURE: u8 = 2;
pub const TYPE_WINDOWSIZE: u8 = 3;
pub const TYPE_MOUSE: u8 = 4;

const FOOD_STRIDE: usize = 13;

#[derive(Debug, PartialEq)]
pub enum ClientMessage {
  WindowSize { width: f32, height: f32 },
  Gesture { boost: bool },
  Mouse { x: f32, y: f32 },
}

/// Defensive decode: anything short, unversioned or unknown is discarded
/// without touching any state; the connection stays open either way.
pub fn decode_client_message(data: &[u8]) -> Option<ClientMessage> {
  let mut reader = Reader::new(data);
  let version = reader.read_u8()?;
  if version != VERSION {
    return None;
  }
  let message_type = reader.read_u8()?;
  match message_type {
    TYPE_WINDOWSIZE => {
      let width = reader.read_f32()?;
      let height = reader.read_f32()?;
      Some(ClientMessage::WindowSize { width, height })
    }
    TYPE_GESTURE => {
      let flag = reader.read_u8()?;
      Some(ClientMessage::Gesture { boost: flag == 1 })
    }
    TYPE_MOUSE => {
      let x = reader.read_f32()?;
      let y = reader.read_f32()?;
      Some(ClientMessage::Mouse { x, y })
    }
    _ => None,
  }
}

pub fn encode_gesture(boost: bool) -> Vec<u8> {
  vec![VERSION, TYPE_GESTURE, u8::from(boost)]
}

fn snapshot_capacity(players: &[Vec2], snakes: &[SnakeView], foods: &[FoodView]) -> usize {
  let mut total = 1 + 1 + 4; // version + type + viewer id
  total += 4 + players.len() * 8;
  total += 4;
  for snake in snakes {
    total += 4 + 4 + 4 + snake.segments.len() * 8;
  }
  total += 4 + foods.len() * FOOD_STRIDE;
  total
}

/// Encode one visibility-filtered snapshot. The buffer length is computed up
/// front from every variable-length count, so the encode performs exactly one
/// allocation; a mismatch with the written length is an invariant violation.
pub fn encode_snapshot(
  viewer_id: u32,
  players: &[Vec2],
  snakes: &[SnakeView],
  foods: &[FoodView],
) -> Vec<u8> {
  let capacity = snapshot_capacity(players, snakes, foods);
  let mut encoder = Encoder::with_capacity(capacity);

  encoder.write_u8(VERSION);
  encoder.write_u8(TYPE_SNAPSHOT);
  encoder.write_u32(viewer_id);

  encoder.write_u32(players.len() as u32);
  for player in players {
    encoder.write_f32(player.x);
    encoder.write_f32(player.y);
  }

  encoder.write_u32(snakes.len() as u32);
  for snake in snakes {
    encoder.write_u32(snake.id);
    encoder.write_u32(snake.segments.len() as u32);
    encoder.write_f32(snake.angle);
    for segment in &snake.segments {
      encoder.write_f32(segment.x);
      encoder.write_f32(segment.y);
    }
  }

  encoder.write_u32(foods.len() as u32);
  for food in foods {
    encoder.write_f32(food.x);
    encoder.write_f32(food.y);
    encoder.write_f32(food.size);
    encoder.write_u8(u8::from(food.drop));
  }

  assert_eq!(
    encoder.len(),
    capacity,
    "snapshot length diverged from its precomputed size"
  );
  encoder.into_vec()
}

/// Big-endian byte writer; the whole wire format is network byte order.
pub struct Encoder {
  buffer: Vec<u8>,
}

impl Encoder {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      buffer: Vec::with_capacity(capacity),
    }
  }

  fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn into_vec(self) -> Vec<u8> {
    self.buffer
  }

  pub fn write_u8(&mut self, value: u8) {
    self.buffer.push(value);
  }

  pub fn write_u32(&mut self, value: u32) {
    self.buffer.extend_from_slice(&value.to_be_bytes());
  }

  pub fn write_f32(&mut self, value: f32) {
    self.buffer.extend_from_slice(&value.to_be_bytes());
  }
}

struct Reader<'a> {
  data: &'a [u8],
  offset: usize,
}

impl<'a> Reader<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, offset: 0 }
  }

  fn read_u8(&mut self) -> Option<u8> {
    let value = *self.data.get(self.offset)?;
    self.offset += 1;
    Some(value)
  }

  fn read_u32(&mut self) -> Option<u32> {
    let bytes = self.read_bytes::<4>()?;
    Some(u32::from_be_bytes(bytes))
  }

  fn read_f32(&mut self) -> Option<f32> {
    let bytes = self.read_bytes::<4>()?;
    Some(f32::from_be_bytes(bytes))
  }

  fn read_bytes<const N: usize>(&mut self) -> Option<[u8; N]> {
    if self.offset + N > self.data.len() {
      return None;
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&self.data[self.offset..self.offset + N]);
    self.offset += N;
    Some(out)
  }
}
