use super::constants::{BASE_SPEED, BOOST_SPEED, TICK_MS};
use super::types::Vec2;
use super::world::World;
use crate::protocol::{self, ClientMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Owns the world and the session table. Every mutation of the world goes
/// through the state mutex, either from the tick loop or from an inbound
/// message handler, so mutations only ever interleave, never overlap.
#[derive(Debug)]
pub struct Server {
  state: Mutex<ServerState>,
}

#[derive(Debug)]
struct SessionEntry {
  sender: UnboundedSender<Vec<u8>>,
  snake_id: u32,
  pointer: Option<Vec2>,
}

#[derive(Debug)]
struct ServerState {
  sessions: HashMap<String, SessionEntry>,
  world: World,
}

impl Server {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(ServerState {
        sessions: HashMap::new(),
        world: World::new(),
      }),
    }
  }

  /// Fixed-rate scheduler: update, rebuild the index, broadcast. Runs for the
  /// life of the process; with zero sessions the broadcast is a no-op and the
  /// bots keep playing.
  pub fn spawn_tick_loop(self: &Arc<Self>) {
    let server = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(std::time::Duration::from_millis(TICK_MS));
      loop {
        interval.tick().await;
        let mut state = server.state.lock().await;
        state.world.tick();
        state.broadcast_snapshots();
      }
    });
  }

  /// New connections get a freshly spawned snake and id immediately, before
  /// the next tick runs.
  pub async fn add_session(&self, sender: UnboundedSender<Vec<u8>>) -> String {
    let mut state = self.state.lock().await;
    let snake_id = state.world.spawn_human();
    let session_id = Uuid::new_v4().to_string();
    state.sessions.insert(
      session_id.clone(),
      SessionEntry {
        sender,
        snake_id,
        pointer: None,
      },
    );
    tracing::debug!(session_id = session_id.as_str(), snake_id, "client connected");
    session_id
  }

  pub async fn remove_session(&self, session_id: &str) {
    let mut state = self.state.lock().await;
    state.disconnect_session(session_id);
  }

  pub async fn handle_binary_message(&self, session_id: &str, data: &[u8]) {
    let Some(message) = protocol::decode_client_message(data) else { return };
    let mut state = self.state.lock().await;
    state.handle_message(session_id, message);
  }
}

impl ServerState {
  fn disconnect_session(&mut self, session_id: &str) {
    let Some(entry) = self.sessions.remove(session_id) else { return };
    // Synchronous deactivation: the snake starts coasting right away.
    self.world.deactivate(entry.snake_id);
    tracing::debug!(session_id, snake_id = entry.snake_id, "client disconnected");
  }

  fn handle_message(&mut self, session_id: &str, message: ClientMessage) {
    let Some(entry) = self.sessions.get_mut(session_id) else { return };
    match message {
      ClientMessage::WindowSize { width, height } => {
        if let Some(snake) = self.world.snake_by_id_mut(entry.snake_id) {
          snake.viewport_width = width;
          snake.viewport_height = height;
        }
      }
      ClientMessage::Mouse { x, y } => {
        entry.pointer = Some(Vec2 { x, y });
        if let Some(snake) = self.world.snake_by_id_mut(entry.snake_id) {
          snake.pointer = Vec2 { x, y };
        }
      }
      ClientMessage::Gesture { boost } => {
        if let Some(snake) = self.world.snake_by_id_mut(entry.snake_id) {
          snake.boosting = boost;
          snake.speed = if boost { BOOST_SPEED } else { BASE_SPEED };
        }
        self.broadcast_gesture(boost);
      }
    }
  }

  /// Gesture packets are rebroadcast verbatim to every connection as a
  /// side-effect notification.
  fn broadcast_gesture(&mut self, boost: bool) {
    let payload = protocol::encode_gesture(boost);
    self.broadcast(&payload);
  }

  /// One tailored snapshot per session. A session whose snake is gone gets
  /// the unfiltered world under its last viewer id.
  fn broadcast_snapshots(&mut self) {
    if self.sessions.is_empty() {
      return;
    }

    let players: Vec<Vec2> = self
      .sessions
      .values()
      .filter_map(|entry| entry.pointer)
      .collect();

    let mut stale = Vec::new();
    for (session_id, entry) in &self.sessions {
      let bounds = self.world.view_bounds_for(entry.snake_id);
      let snakes = self.world.snake_views(bounds.as_ref());
      let foods = self.world.food_views(bounds.as_ref());
      let payload = protocol::encode_snapshot(entry.snake_id, &players, &snakes, &foods);
      if entry.sender.send(payload).is_err() {
        stale.push(session_id.clone());
      }
    }
    for session_id in stale {
      self.disconnect_session(&session_id);
    }
  }

  fn broadcast(&mut self, payload: &[u8]) {
    let mut stale = Vec::new();
    for (session_id, entry) in &self.sessions {
      if entry.sender.send(payload.to_vec()).is_err() {
        stale.push(session_id.clone());
      }
    }
    for session_id in stale {
      self.disconnect_session(&session_id);
    }
  }
}
