//! Router history state

use crate::location::RouteLocation;

/// Direction of a committed navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Forward,
    Back,
    Replace,
}

/// A committed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
    pub from: RouteLocation,
    pub to: RouteLocation,
    pub direction: NavigationDirection,
    /// Value of [`RouterState::navigation_id`] after this change.
    pub navigation_id: u64,
}

/// History stack of resolved locations.
#[derive(Debug, Clone)]
pub struct RouterState {
    history: Vec<RouteLocation>,
    current: usize,
    /// Bumped on every committed navigation, so observers can tell a route
    /// change apart from other router updates.
    navigation_id: u64,
}

impl RouterState {
    /// History holding just `initial`.
    pub fn new(initial: RouteLocation) -> Self {
        Self {
            history: vec![initial],
            current: 0,
            navigation_id: 0,
        }
    }

    pub fn current(&self) -> &RouteLocation {
        &self.history[self.current]
    }

    pub fn navigation_id(&self) -> u64 {
        self.navigation_id
    }

    /// Push a location, dropping forward history.
    pub fn push(&mut self, to: RouteLocation) -> RouteChangeEvent {
        let from = self.current().clone();
        self.history.truncate(self.current + 1);
        self.history.push(to.clone());
        self.current += 1;
        self.commit(from, to, NavigationDirection::Forward)
    }

    /// Replace the current entry.
    pub fn replace(&mut self, to: RouteLocation) -> RouteChangeEvent {
        let from = self.current().clone();
        self.history[self.current] = to.clone();
        self.commit(from, to, NavigationDirection::Replace)
    }

    /// Move back one entry, replacing it with `to` (a guard may have
    /// rewritten the entry's query).
    pub fn back(&mut self, to: RouteLocation) -> Option<RouteChangeEvent> {
        if self.current == 0 {
            return None;
        }
        let from = self.current().clone();
        self.current -= 1;
        self.history[self.current] = to.clone();
        Some(self.commit(from, to, NavigationDirection::Back))
    }

    /// Move forward one entry, replacing it with `to`.
    pub fn forward(&mut self, to: RouteLocation) -> Option<RouteChangeEvent> {
        if self.current + 1 >= self.history.len() {
            return None;
        }
        let from = self.current().clone();
        self.current += 1;
        self.history[self.current] = to.clone();
        Some(self.commit(from, to, NavigationDirection::Forward))
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.history.len()
    }

    pub fn peek_back(&self) -> Option<&RouteLocation> {
        self.current.checked_sub(1).map(|i| &self.history[i])
    }

    pub fn peek_forward(&self) -> Option<&RouteLocation> {
        self.history.get(self.current + 1)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn commit(
        &mut self,
        from: RouteLocation,
        to: RouteLocation,
        direction: NavigationDirection,
    ) -> RouteChangeEvent {
        self.navigation_id += 1;
        RouteChangeEvent {
            from,
            to,
            direction,
            navigation_id: self.navigation_id,
        }
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new(RouteLocation::new("/"))
    }
}
