//! Code-keyed room registry.

use std::collections::HashMap;

use rand::Rng;
use supergrid_protocol::{ROOM_CODE_LEN, RoomCode};

use crate::Room;

const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// All rooms of one namespace. The coordinator owns two of these —
/// registered-account rooms and guest rooms — so the two account id
/// spaces never meet in a seat assignment.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh room under a newly generated code and returns the
    /// code. Collisions are vanishingly rare at 26^5 codes, but the map
    /// stays the arbiter: a taken code is rerolled.
    pub fn create(&mut self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let raw: String = (0..ROOM_CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode::parse(&raw).expect("generated code is five lowercase letters");
            if self.rooms.contains_key(&code) {
                continue;
            }
            self.rooms.insert(code.clone(), Room::new(code.clone()));
            tracing::info!(room = %code, "room created");
            return code;
        }
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
