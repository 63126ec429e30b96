use std::collections::VecDeque;

/// Older notifications are dropped past this many
pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notifications {
    queue: VecDeque<Notification>, // push_back, pop_front
    next_id: u64,
}

impl Notifications {
    pub fn push(&mut self, level: Level, message: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push_back(Notification { id, level, message });
        while self.queue.len() > MAX_NOTIFICATIONS {
            self.queue.pop_front();
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.queue.retain(|n| n.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
