/// Order-preserving set of live entries with a round-robin cursor
///
/// Entries live in an arena indexed by their original position (their slot).
/// `live` lists the slots still in rotation, in original order; the cursor
/// indexes into `live`. Removing an entry drops its slot from `live` and
/// leaves the remaining order untouched.
#[derive(Debug)]
pub struct ActiveSet<T> {
    arena: Vec<Option<T>>,
    live: Vec<usize>,
    cursor: usize,
}

impl<T> ActiveSet<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let arena: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let live = (0..arena.len()).collect();
        Self {
            arena,
            live,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of entries the set was created with
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Slots still in rotation, in round-robin order
    pub fn live_slots(&self) -> &[usize] {
        &self.live
    }

    /// Slot and entry under the cursor
    pub fn current_mut(&mut self) -> Option<(usize, &mut T)> {
        let slot = *self.live.get(self.cursor)?;
        self.arena[slot].as_mut().map(|item| (slot, item))
    }

    /// Move the cursor to the next live entry
    pub fn advance(&mut self) {
        if !self.live.is_empty() {
            self.cursor = (self.cursor + 1) % self.live.len();
        }
        self.check();
    }

    /// Take the entry under the cursor out of rotation
    ///
    /// The cursor ends up on the entry that followed the removed one, which
    /// wraps to the front when the last live entry is removed.
    pub fn remove_current(&mut self) -> Option<(usize, T)> {
        if self.live.is_empty() {
            return None;
        }
        let slot = self.live.remove(self.cursor);
        self.cursor = if self.live.is_empty() {
            0
        } else {
            self.cursor % self.live.len()
        };
        self.check();
        self.arena[slot].take().map(|item| (slot, item))
    }

    fn check(&self) {
        debug_assert!(
            self.live.is_empty() || self.cursor < self.live.len(),
            "cursor {} out of range for {} live entries",
            self.cursor,
            self.live.len()
        );
    }
}
